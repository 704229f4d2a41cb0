// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! First pass: label definition, directive handling, instruction sizing,
//! and partial encoding.

use super::*;

impl Assembler {
    /// Process one expanded source line. IC/DC advance as words are
    /// emitted; label operands only reserve their cells here.
    pub(super) fn first_pass_line(&mut self, text: &str) -> Result<(), AsmError> {
        let trimmed = text.trim_start();
        if trimmed.is_empty() || trimmed.starts_with(';') {
            return Ok(());
        }

        let (label, rest) = match read_label_prefix(trimmed) {
            Some(name) => {
                if !is_label_name(name) {
                    return Err(AsmError::new(
                        AsmErrorKind::Label,
                        "Invalid label name",
                        Some(name),
                    ));
                }
                if self.symbols.find(name).is_some() {
                    return Err(AsmError::new(
                        AsmErrorKind::Label,
                        &format!("Label {name} already defined"),
                        None,
                    ));
                }
                let (_, after) = split_first_token(trimmed);
                (Some(name), after.trim_start())
            }
            None => (None, trimmed),
        };

        // A label with nothing after it defines no symbol.
        if rest.is_empty() {
            return Ok(());
        }

        let (first, after) = split_first_token(rest);
        match directive(first) {
            DirectiveLookup::Unknown => Err(AsmError::new(
                AsmErrorKind::Directive,
                "Invalid directive",
                Some(first),
            )),
            DirectiveLookup::Known(kind) => self.first_pass_directive(kind, label, after),
            DirectiveLookup::NotDirective => self.first_pass_instruction(label, rest),
        }
    }

    fn first_pass_directive(
        &mut self,
        kind: DirectiveKind,
        label: Option<&str>,
        operands: &str,
    ) -> Result<(), AsmError> {
        match kind {
            DirectiveKind::Data => {
                if let Some(name) = label {
                    self.define_symbol(name, self.dc, SymbolKind::Data)?;
                }
                self.parse_data_values(operands)
            }
            DirectiveKind::String => {
                if let Some(name) = label {
                    self.define_symbol(name, self.dc, SymbolKind::Data)?;
                }
                self.parse_string_literal(operands)
            }
            DirectiveKind::Extern => {
                // A label prefix on .extern is tolerated and ignored; the
                // declared name is the directive operand.
                let (name, tail) = split_first_token(operands);
                if name.is_empty() {
                    return Err(AsmError::new(
                        AsmErrorKind::Directive,
                        "Missing label name for .extern directive",
                        None,
                    ));
                }
                if !is_label_name(name) {
                    return Err(AsmError::new(
                        AsmErrorKind::Directive,
                        "Invalid external label",
                        Some(name),
                    ));
                }
                if !tail.trim().is_empty() {
                    return Err(AsmError::new(
                        AsmErrorKind::Directive,
                        "Unexpected content after external label",
                        None,
                    ));
                }
                self.define_symbol(name, 0, SymbolKind::Extern)
            }
            DirectiveKind::Entry => {
                if label.is_some() {
                    return Err(AsmError::new(
                        AsmErrorKind::Directive,
                        "Cannot define label for .entry directive",
                        None,
                    ));
                }
                // Syntactic check only; promotion happens in the second
                // pass once every definition is known.
                let (name, tail) = split_first_token(operands);
                if name.is_empty() {
                    return Err(AsmError::new(
                        AsmErrorKind::Directive,
                        "Missing label name for .entry directive",
                        None,
                    ));
                }
                let bare = name.strip_prefix('&').unwrap_or(name);
                if !is_label_name(bare) {
                    return Err(AsmError::new(
                        AsmErrorKind::Directive,
                        "Invalid entry label",
                        Some(name),
                    ));
                }
                if !tail.trim().is_empty() {
                    return Err(AsmError::new(
                        AsmErrorKind::Directive,
                        "Unexpected content after entry label",
                        None,
                    ));
                }
                Ok(())
            }
        }
    }

    fn first_pass_instruction(&mut self, label: Option<&str>, line: &str) -> Result<(), AsmError> {
        if let Some(name) = label {
            self.define_symbol(name, self.ic, SymbolKind::Code)?;
        }

        let (mnemonic, operand_text) = read_mnemonic(line);
        let Some(op) = lookup(mnemonic) else {
            return Err(AsmError::new(
                AsmErrorKind::Instruction,
                "Invalid operation",
                Some(mnemonic),
            ));
        };

        let operands = parse_operands(operand_text)?;
        check_arity(op.mnemonic, op.operands, operands.len())?;

        let mut modes = Vec::with_capacity(operands.len());
        for operand in &operands {
            let mode = classify(operand).map_err(|err| operand_error(operand, err))?;
            modes.push(mode);
        }

        // Relative addressing never reaches past the jump group.
        if modes
            .iter()
            .any(|mode| matches!(mode, AddressMode::Relative(_)))
            && op.opcode != JUMP_OPCODE
        {
            return Err(AsmError::new(
                AsmErrorKind::Instruction,
                "Relative addressing mode (&) can only be used with jump instructions (jmp, bne, jsr)",
                None,
            ));
        }

        let word = match modes.as_slice() {
            [] => InstructionWord::new(op.opcode, op.func, 0, 0, 0, 0),
            [only] if op.opcode == PRN_OPCODE => {
                InstructionWord::new(op.opcode, op.func, only.mode_bits(), only.register(), 0, 0)
            }
            [only] => {
                InstructionWord::new(op.opcode, op.func, 0, 0, only.mode_bits(), only.register())
            }
            [src, dest] => InstructionWord::new(
                op.opcode,
                op.func,
                src.mode_bits(),
                src.register(),
                dest.mode_bits(),
                dest.register(),
            ),
            _ => unreachable!("arity checked above"),
        };

        let ic_at_start = self.ic;
        let index = (ic_at_start - IC_START) as usize;
        self.push_code(MachineCell::Instruction { word, len: 1 })?;
        self.ic += 1;

        for mode in &modes {
            match mode {
                AddressMode::Register(_) => {}
                AddressMode::Immediate(value) => {
                    self.push_code(MachineCell::Operand(DataWord::new(*value, Are::Absolute)))?;
                    self.ic += 1;
                }
                AddressMode::Direct(_) | AddressMode::Relative(_) => {
                    self.reserve_code()?;
                    self.ic += 1;
                }
            }
        }

        self.code
            .set_instruction_len(index, (self.ic - ic_at_start) as u8);
        Ok(())
    }

    fn parse_data_values(&mut self, text: &str) -> Result<(), AsmError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AsmError::new(
                AsmErrorKind::Directive,
                "Empty .data directive",
                None,
            ));
        }

        let pieces: Vec<&str> = text.split(',').collect();
        let last = pieces.len() - 1;
        for (ix, piece) in pieces.iter().enumerate() {
            let token = piece.trim();
            if token.is_empty() {
                let msg = if ix == last {
                    "Trailing comma with no number"
                } else if ix == 0 {
                    "Missing number before comma"
                } else {
                    "Multiple consecutive commas found"
                };
                return Err(AsmError::new(AsmErrorKind::Directive, msg, None));
            }
            if token.split_whitespace().count() > 1 {
                return Err(AsmError::new(
                    AsmErrorKind::Directive,
                    "Expected comma between numbers",
                    None,
                ));
            }
            if matches!(token, "+" | "-") {
                return Err(AsmError::new(
                    AsmErrorKind::Directive,
                    &format!("Sign '{token}' without a number"),
                    None,
                ));
            }
            if !is_integer_literal(token) {
                return Err(AsmError::new(
                    AsmErrorKind::Directive,
                    &format!(
                        "Invalid number '{token}' - only digits allowed (with optional +/- prefix)"
                    ),
                    None,
                ));
            }
            let value: i64 = token.parse().map_err(|_| {
                AsmError::new(
                    AsmErrorKind::Directive,
                    &format!("Number conversion failed for '{token}'"),
                    None,
                )
            })?;
            self.push_data(value as i32)?;
        }
        Ok(())
    }

    fn parse_string_literal(&mut self, text: &str) -> Result<(), AsmError> {
        let text = text.trim();
        let Some(rest) = text.strip_prefix('"') else {
            return Err(AsmError::new(
                AsmErrorKind::Directive,
                "String must begin with quote",
                None,
            ));
        };
        let Some(close) = rest.find('"') else {
            return Err(AsmError::new(
                AsmErrorKind::Directive,
                "String must end with quote",
                None,
            ));
        };
        for c in rest[..close].chars() {
            self.push_data(c as i32)?;
        }
        self.push_data(0)?;

        if !rest[close + 1..].trim().is_empty() {
            return Err(AsmError::new(
                AsmErrorKind::Directive,
                "Unexpected content after string",
                None,
            ));
        }
        Ok(())
    }

    fn define_symbol(&mut self, name: &str, address: u32, kind: SymbolKind) -> Result<(), AsmError> {
        self.symbols.insert(name, address, kind).map_err(|_| {
            AsmError::new(
                AsmErrorKind::Label,
                &format!("Label {name} already defined"),
                None,
            )
        })
    }

    fn push_code(&mut self, cell: MachineCell) -> Result<(), AsmError> {
        self.code.push(cell).map_err(|e| {
            AsmError::new(
                AsmErrorKind::Capacity,
                &format!("Code image overflow, capacity is {} cells", e.capacity),
                None,
            )
        })
    }

    fn reserve_code(&mut self) -> Result<(), AsmError> {
        self.code.reserve().map_err(|e| {
            AsmError::new(
                AsmErrorKind::Capacity,
                &format!("Code image overflow, capacity is {} cells", e.capacity),
                None,
            )
        })
    }

    fn push_data(&mut self, value: i32) -> Result<(), AsmError> {
        self.data
            .push(value)
            .map_err(|e| {
                AsmError::new(
                    AsmErrorKind::Capacity,
                    &format!("Data image overflow, capacity is {} cells", e.capacity),
                    None,
                )
            })
            .map(|()| {
                self.dc += 1;
            })
    }
}

/// Read a mnemonic: at most [`MAX_OP_LEN`] characters, stopping at
/// whitespace. The remainder of the line is the operand field.
pub(super) fn read_mnemonic(line: &str) -> (&str, &str) {
    let line = line.trim_start();
    let bytes = line.as_bytes();
    let mut len = 0;
    while len < bytes.len() && len < MAX_OP_LEN && !bytes[len].is_ascii_whitespace() {
        len += 1;
    }
    (&line[..len], &line[len..])
}

/// Split an operand field on commas into bare tokens.
pub(super) fn parse_operands(text: &str) -> Result<Vec<&str>, AsmError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let pieces: Vec<&str> = text.split(',').collect();
    let last = pieces.len() - 1;
    let mut operands = Vec::with_capacity(pieces.len());
    for (ix, piece) in pieces.iter().enumerate() {
        let token = piece.trim();
        if token.is_empty() {
            let msg = if ix == 0 {
                "Missing operand before comma"
            } else if ix == last {
                "Trailing comma in operand list"
            } else {
                "Multiple consecutive commas found"
            };
            return Err(AsmError::new(AsmErrorKind::Operand, msg, None));
        }
        if token.split_whitespace().count() > 1 {
            return Err(AsmError::new(
                AsmErrorKind::Operand,
                "Expected comma between operands",
                Some(token),
            ));
        }
        operands.push(token);
    }
    Ok(operands)
}

pub(super) fn check_arity(mnemonic: &str, expected: u8, got: usize) -> Result<(), AsmError> {
    if got == expected as usize {
        return Ok(());
    }
    let msg = match expected {
        0 => format!("Operation '{mnemonic}' does not accept any operands"),
        1 => format!("Operation '{mnemonic}' requires exactly one operand, got {got}"),
        _ => format!("Operation '{mnemonic}' requires exactly two operands, got {got}"),
    };
    Err(AsmError::new(AsmErrorKind::Instruction, &msg, None))
}

/// Turn a classification failure into a line diagnostic.
pub(super) fn operand_error(operand: &str, err: ClassifyError) -> AsmError {
    match err {
        ClassifyError::InvalidRegister => AsmError::new(
            AsmErrorKind::Operand,
            &format!("Invalid register '{operand}', must be r0-r7"),
            None,
        ),
        ClassifyError::Malformed => {
            if let Some(literal) = operand.strip_prefix('#') {
                if literal.is_empty() {
                    AsmError::new(AsmErrorKind::Operand, "Missing number after #", None)
                } else {
                    AsmError::new(
                        AsmErrorKind::Operand,
                        &format!("Invalid immediate value '{literal}', must be a valid number"),
                        None,
                    )
                }
            } else if let Some(label) = operand.strip_prefix('&') {
                AsmError::new(
                    AsmErrorKind::Operand,
                    &format!("Invalid label '{label}' for relative addressing"),
                    None,
                )
            } else {
                AsmError::new(AsmErrorKind::Operand, "Invalid operand", Some(operand))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pass1(src: &[&str]) -> Result<Assembler, AsmError> {
        let mut asm = Assembler::new(1200);
        for line in src {
            asm.first_pass_line(line)?;
        }
        Ok(asm)
    }

    fn encoded(asm: &Assembler, index: usize) -> u32 {
        asm.code.cells()[index].expect("cell filled").encode()
    }

    #[test]
    fn blank_and_comment_lines_are_ignored() {
        let asm = pass1(&["", "   ", "; comment", "  ; indented"]).unwrap();
        assert_eq!(asm.code.len(), 0);
        assert_eq!(asm.data.len(), 0);
    }

    #[test]
    fn stop_occupies_one_absolute_cell() {
        let asm = pass1(&["stop"]).unwrap();
        assert_eq!(asm.code.len(), 1);
        assert_eq!(encoded(&asm, 0), 0x3c0004);
        assert_eq!(asm.code.instruction_len(0), Some(1));
    }

    #[test]
    fn mov_immediate_sizes_to_two_cells() {
        let asm = pass1(&["mov #5, r1"]).unwrap();
        assert_eq!(asm.code.len(), 2);
        assert_eq!(asm.code.instruction_len(0), Some(2));
        assert_eq!(encoded(&asm, 1), (5 << 3) | 4);
        assert_eq!(asm.ic, 102);
    }

    #[test]
    fn direct_operands_reserve_their_cells() {
        let asm = pass1(&["mov X, Y"]).unwrap();
        assert_eq!(asm.code.len(), 3);
        assert_eq!(asm.code.instruction_len(0), Some(3));
        assert_eq!(asm.code.unfilled(), vec![1, 2]);
    }

    #[test]
    fn two_register_operands_fit_in_one_cell() {
        let asm = pass1(&["add r1, r2"]).unwrap();
        assert_eq!(asm.code.len(), 1);
        let word = encoded(&asm, 0);
        assert_eq!((word >> 18) & 0x3f, 2);
        assert_eq!((word >> 16) & 0x3, 3);
        assert_eq!((word >> 13) & 0x7, 1);
        assert_eq!((word >> 11) & 0x3, 3);
        assert_eq!((word >> 8) & 0x7, 2);
        assert_eq!((word >> 3) & 0x1f, 1);
    }

    #[test]
    fn prn_routes_its_operand_through_source_fields() {
        let asm = pass1(&["prn r3"]).unwrap();
        let word = encoded(&asm, 0);
        assert_eq!((word >> 16) & 0x3, 3, "source mode");
        assert_eq!((word >> 13) & 0x7, 3, "source register");
        assert_eq!((word >> 11) & 0x3, 0, "destination mode");

        let asm = pass1(&["inc r3"]).unwrap();
        let word = encoded(&asm, 0);
        assert_eq!((word >> 16) & 0x3, 0, "source mode");
        assert_eq!((word >> 11) & 0x3, 3, "destination mode");
        assert_eq!((word >> 8) & 0x7, 3, "destination register");
    }

    #[test]
    fn labels_are_defined_at_current_counters() {
        let asm = pass1(&["MAIN: mov #1, r1", "X: .data 4", "Y: .string \"ab\""]).unwrap();
        assert_eq!(asm.symbols.find("MAIN").unwrap().address, 100);
        assert_eq!(asm.symbols.find("MAIN").unwrap().kind, SymbolKind::Code);
        assert_eq!(asm.symbols.find("X").unwrap().address, 0);
        assert_eq!(asm.symbols.find("X").unwrap().kind, SymbolKind::Data);
        assert_eq!(asm.symbols.find("Y").unwrap().address, 1);
    }

    #[test]
    fn duplicate_label_is_rejected() {
        let err = pass1(&["A: stop", "A: stop"]).unwrap_err();
        assert_eq!(err.message(), "Label A already defined");
    }

    #[test]
    fn invalid_label_is_rejected() {
        let err = pass1(&["2nd: stop"]).unwrap_err();
        assert_eq!(err.message(), "Invalid label name: 2nd");
    }

    #[test]
    fn bare_label_defines_nothing() {
        let asm = pass1(&["MAIN:", "MAIN: stop"]).unwrap();
        assert_eq!(asm.symbols.find("MAIN").unwrap().address, 100);
    }

    #[test]
    fn data_values_accept_signs_and_reject_junk() {
        let asm = pass1(&[".data 1, -2, +3"]).unwrap();
        assert_eq!(asm.data.values(), &[1, -2, 3]);
        assert_eq!(asm.dc, 3);

        let err = pass1(&[".data 1, 2x"]).unwrap_err();
        assert_eq!(
            err.message(),
            "Invalid number '2x' - only digits allowed (with optional +/- prefix)"
        );
        let err = pass1(&[".data -"]).unwrap_err();
        assert_eq!(err.message(), "Sign '-' without a number");
    }

    #[test]
    fn data_comma_shapes_are_rejected_precisely() {
        let err = pass1(&[".data"]).unwrap_err();
        assert_eq!(err.message(), "Empty .data directive");
        let err = pass1(&[".data 1,,2"]).unwrap_err();
        assert_eq!(err.message(), "Multiple consecutive commas found");
        let err = pass1(&[".data 1, 2,"]).unwrap_err();
        assert_eq!(err.message(), "Trailing comma with no number");
        let err = pass1(&[".data 1 2"]).unwrap_err();
        assert_eq!(err.message(), "Expected comma between numbers");
    }

    #[test]
    fn string_appends_codepoints_and_terminator() {
        let asm = pass1(&["MSG: .string \"Hi\""]).unwrap();
        assert_eq!(asm.data.values(), &[0x48, 0x69, 0]);
        assert_eq!(asm.dc, 3);
    }

    #[test]
    fn string_quoting_errors() {
        let err = pass1(&[".string Hi"]).unwrap_err();
        assert_eq!(err.message(), "String must begin with quote");
        let err = pass1(&[".string \"Hi"]).unwrap_err();
        assert_eq!(err.message(), "String must end with quote");
        let err = pass1(&[".string \"Hi\" junk"]).unwrap_err();
        assert_eq!(err.message(), "Unexpected content after string");
    }

    #[test]
    fn extern_declares_at_address_zero() {
        let asm = pass1(&[".extern K"]).unwrap();
        let k = asm.symbols.find("K").unwrap();
        assert_eq!((k.address, k.kind), (0, SymbolKind::Extern));
    }

    #[test]
    fn extern_label_prefix_is_ignored() {
        let asm = pass1(&["IGNORED: .extern K"]).unwrap();
        assert!(asm.symbols.find("IGNORED").is_none());
        assert!(asm.symbols.find("K").is_some());
    }

    #[test]
    fn entry_refuses_a_label_prefix() {
        let err = pass1(&["L: .entry MAIN"]).unwrap_err();
        assert_eq!(err.message(), "Cannot define label for .entry directive");
    }

    #[test]
    fn entry_is_deferred_but_syntax_checked() {
        let asm = pass1(&[".entry MAIN"]).unwrap();
        assert!(asm.symbols.is_empty());
        let err = pass1(&[".entry 2bad"]).unwrap_err();
        assert_eq!(err.message(), "Invalid entry label: 2bad");
        let err = pass1(&[".entry"]).unwrap_err();
        assert_eq!(err.message(), "Missing label name for .entry directive");
    }

    #[test]
    fn unknown_directive_is_fatal_for_the_line() {
        let err = pass1(&[".bogus 1"]).unwrap_err();
        assert_eq!(err.message(), "Invalid directive: .bogus");
    }

    #[test]
    fn unknown_operation_is_rejected() {
        let err = pass1(&["mvo r1, r2"]).unwrap_err();
        assert_eq!(err.message(), "Invalid operation: mvo");
    }

    #[test]
    fn mnemonic_reading_stops_after_four_characters() {
        // A five-character word reads as a four-character mnemonic plus an
        // unexpected operand.
        let err = pass1(&["stopx"]).unwrap_err();
        assert_eq!(
            err.message(),
            "Operation 'stop' does not accept any operands"
        );
    }

    #[test]
    fn arity_violations_name_the_mnemonic_and_counts() {
        let err = pass1(&["mov r1"]).unwrap_err();
        assert_eq!(
            err.message(),
            "Operation 'mov' requires exactly two operands, got 1"
        );
        let err = pass1(&["inc r1, r2"]).unwrap_err();
        assert_eq!(
            err.message(),
            "Operation 'inc' requires exactly one operand, got 2"
        );
        let err = pass1(&["rts r1"]).unwrap_err();
        assert_eq!(err.message(), "Operation 'rts' does not accept any operands");
    }

    #[test]
    fn invalid_register_aborts_the_line() {
        let err = pass1(&["mov r8, r1"]).unwrap_err();
        assert_eq!(err.message(), "Invalid register 'r8', must be r0-r7");
    }

    #[test]
    fn immediate_errors_are_specific() {
        let err = pass1(&["mov #, r1"]).unwrap_err();
        assert_eq!(err.message(), "Missing number after #");
        let err = pass1(&["mov #x5, r1"]).unwrap_err();
        assert_eq!(
            err.message(),
            "Invalid immediate value 'x5', must be a valid number"
        );
    }

    #[test]
    fn relative_outside_the_jump_group_is_rejected() {
        let err = pass1(&["mov &X, r1"]).unwrap_err();
        assert!(err.message().contains("jump instructions"));
        // And the instruction cell was never emitted.
        let asm = pass1(&["jmp &X"]).unwrap();
        assert_eq!(asm.code.len(), 2);
    }

    #[test]
    fn operand_comma_shapes_are_rejected() {
        let err = pass1(&["mov r1,, r2"]).unwrap_err();
        assert_eq!(err.message(), "Multiple consecutive commas found");
        let err = pass1(&["mov r1, r2,"]).unwrap_err();
        assert_eq!(err.message(), "Trailing comma in operand list");
        let err = pass1(&["mov r1 r2"]).unwrap_err();
        assert_eq!(err.message(), "Expected comma between operands: r1 r2");
    }
}
