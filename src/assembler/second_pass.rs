// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Second pass: symbol resolution, ARE assignment, entry promotion, and
//! external reference recording.

use super::first_pass::{operand_error, parse_operands, read_mnemonic};
use super::*;

impl Assembler {
    /// Re-process one expanded source line against the completed symbol
    /// table. The code image gains no cells here; reserved slots are
    /// filled in place and IC advances by each instruction's length tag.
    pub(super) fn second_pass_line(&mut self, text: &str) -> Result<(), AsmError> {
        let trimmed = text.trim_start();
        if trimmed.is_empty() || trimmed.starts_with(';') {
            return Ok(());
        }

        let rest = match read_label_prefix(trimmed) {
            Some(_) => split_first_token(trimmed).1.trim_start(),
            None => trimmed,
        };
        if rest.is_empty() {
            return Ok(());
        }

        let (first, after) = split_first_token(rest);
        if first.starts_with('.') {
            if directive(first) == DirectiveLookup::Known(DirectiveKind::Entry) {
                return self.promote_entry(after);
            }
            // .data/.string/.extern were fully handled in the first pass.
            return Ok(());
        }

        self.resolve_instruction_line(rest)
    }

    fn promote_entry(&mut self, operands: &str) -> Result<(), AsmError> {
        let (name, _) = split_first_token(operands);
        if name.is_empty() {
            return Err(AsmError::new(
                AsmErrorKind::Directive,
                "Missing label name for .entry directive",
                None,
            ));
        }
        // Tolerate a relative-style spelling of the operand.
        let name = name.strip_prefix('&').unwrap_or(name);
        match self.symbols.promote_to_entry(name) {
            Ok(()) => Ok(()),
            Err(PromoteError::AlreadyExtern) => Err(AsmError::new(
                AsmErrorKind::Symbol,
                &format!("Symbol {name} cannot be both external and entry"),
                None,
            )),
            Err(PromoteError::Undefined) => Err(AsmError::new(
                AsmErrorKind::Symbol,
                &format!("Undefined symbol {name} for .entry"),
                None,
            )),
        }
    }

    fn resolve_instruction_line(&mut self, line: &str) -> Result<(), AsmError> {
        let index = (self.ic - IC_START) as usize;
        let len = self.code.instruction_len(index).ok_or_else(|| {
            AsmError::new(
                AsmErrorKind::Assembler,
                "Code image out of step with source",
                None,
            )
        })?;

        let (mnemonic, operand_text) = read_mnemonic(line);
        let Some(op) = lookup(mnemonic) else {
            return Err(AsmError::new(
                AsmErrorKind::Instruction,
                "Invalid operation",
                Some(mnemonic),
            ));
        };

        let operands = parse_operands(operand_text)?;
        let instruction_start = self.ic;
        let mut cursor = self.ic;

        for operand in &operands {
            let mode = classify(operand).map_err(|err| operand_error(operand, err))?;
            match mode {
                AddressMode::Register(_) => {}
                AddressMode::Immediate(_) => {
                    // Cell already filled during the first pass.
                    cursor += 1;
                }
                AddressMode::Direct(name) => {
                    let Some(symbol) = self.symbols.find(name) else {
                        return Err(AsmError::new(
                            AsmErrorKind::Symbol,
                            "Undefined symbol",
                            Some(name),
                        ));
                    };
                    let is_extern = symbol.kind == SymbolKind::Extern;
                    let are = if is_extern {
                        Are::External
                    } else {
                        Are::Relocatable
                    };
                    let value = symbol.address as i32;
                    cursor += 1;
                    self.code
                        .fill((cursor - IC_START) as usize, DataWord::new(value, are));
                    if is_extern {
                        self.symbols.append_reference(name, cursor);
                    }
                }
                AddressMode::Relative(name) => {
                    if op.opcode != JUMP_OPCODE {
                        return Err(AsmError::new(
                            AsmErrorKind::Instruction,
                            "Relative addressing mode (&) can only be used with jump instructions (jmp, bne, jsr)",
                            None,
                        ));
                    }
                    let Some(symbol) = self.symbols.find(name) else {
                        return Err(AsmError::new(
                            AsmErrorKind::Symbol,
                            "Undefined symbol",
                            Some(name),
                        ));
                    };
                    if symbol.kind != SymbolKind::Code {
                        return Err(AsmError::new(
                            AsmErrorKind::Symbol,
                            &format!("Symbol {name} must be a code label for relative addressing"),
                            None,
                        ));
                    }
                    let distance = symbol.address as i32 - instruction_start as i32;
                    cursor += 1;
                    self.code.fill(
                        (cursor - IC_START) as usize,
                        DataWord::new(distance, Are::Absolute),
                    );
                }
            }
        }

        self.ic += u32::from(len);
        Ok(())
    }
}
