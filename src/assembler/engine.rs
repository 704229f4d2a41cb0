// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

use super::*;

/// State of one assembly job: symbol table, code and data images, counters,
/// and the diagnostics gathered so far.
#[derive(Debug)]
pub(crate) struct Assembler {
    pub(crate) symbols: SymbolTable,
    pub(crate) code: CodeImage,
    pub(crate) data: DataImage,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) ic: u32,
    pub(crate) dc: u32,
}

impl Assembler {
    pub(crate) fn new(code_limit: usize) -> Self {
        Self {
            symbols: SymbolTable::new(),
            code: CodeImage::with_capacity(code_limit),
            data: DataImage::with_capacity(code_limit),
            diagnostics: Vec::new(),
            ic: IC_START,
            dc: 0,
        }
    }

    pub(crate) fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub(crate) fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Instruction counter after the first pass; the base address of the
    /// data section.
    pub(crate) fn final_ic(&self) -> u32 {
        IC_START + self.code.len() as u32
    }

    /// First pass: size instructions, collect symbols, emit the partial
    /// code image and the complete data image. Stops at the first failing
    /// line.
    pub(crate) fn pass1(&mut self, lines: &[String], file: &str) -> PassCounts {
        let mut counts = PassCounts::new();
        for (idx, src) in lines.iter().enumerate() {
            let line_num = idx as u32 + 1;
            counts.lines = line_num;
            if let Err(err) = self.first_pass_line(src) {
                self.diagnostics.push(
                    Diagnostic::new(line_num, Severity::Error, err)
                        .with_file(Some(file.to_string())),
                );
                counts.errors += 1;
                break;
            }
        }
        counts
    }

    /// Move every data symbol behind the code section. Runs once, between
    /// the passes.
    pub(crate) fn rebase_data_symbols(&mut self) {
        let final_ic = self.final_ic();
        self.symbols.rebase_data(final_ic);
    }

    /// Second pass: resolve label operands, promote entry symbols, record
    /// external reference sites. Stops at the first failing line.
    pub(crate) fn pass2(&mut self, lines: &[String], file: &str) -> PassCounts {
        self.ic = IC_START;
        let mut counts = PassCounts::new();
        for (idx, src) in lines.iter().enumerate() {
            let line_num = idx as u32 + 1;
            counts.lines = line_num;
            if let Err(err) = self.second_pass_line(src) {
                self.diagnostics.push(
                    Diagnostic::new(line_num, Severity::Error, err)
                        .with_file(Some(file.to_string())),
                );
                counts.errors += 1;
                break;
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &[&str]) -> Vec<String> {
        src.iter().map(|s| s.to_string()).collect()
    }

    fn assemble(src: &[&str]) -> Assembler {
        let mut asm = Assembler::new(1200);
        let lines = lines(src);
        let p1 = asm.pass1(&lines, "test.am");
        assert_eq!(p1.errors, 0, "pass1 diagnostics: {:?}", asm.diagnostics);
        asm.rebase_data_symbols();
        let p2 = asm.pass2(&lines, "test.am");
        assert_eq!(p2.errors, 0, "pass2 diagnostics: {:?}", asm.diagnostics);
        asm
    }

    #[test]
    fn counters_track_code_and_data_sizes() {
        let asm = assemble(&["MAIN: mov X, r1", "stop", "X: .data 7"]);
        assert_eq!(asm.final_ic(), 103);
        assert_eq!(asm.code.len(), 3);
        assert_eq!(asm.data.len(), 1);
        assert_eq!(asm.dc, 1);
    }

    #[test]
    fn data_symbols_are_rebased_after_pass1() {
        let asm = assemble(&["MAIN: mov X, r1", "stop", "X: .data 7"]);
        let x = asm.symbols().find("X").unwrap();
        assert_eq!(x.address, 103);
        let main = asm.symbols().find("MAIN").unwrap();
        assert_eq!(main.address, 100);
    }

    #[test]
    fn pass1_stops_at_the_first_failing_line() {
        let mut asm = Assembler::new(1200);
        let src = lines(&["bogus r1", "also bad", "stop"]);
        let counts = asm.pass1(&src, "test.am");
        assert_eq!(counts.errors, 1);
        assert_eq!(counts.lines, 1);
        assert_eq!(asm.diagnostics.len(), 1);
        assert_eq!(asm.diagnostics[0].line(), 1);
        assert_eq!(asm.diagnostics[0].file(), Some("test.am"));
    }

    #[test]
    fn pass2_reports_undefined_symbols() {
        let mut asm = Assembler::new(1200);
        let src = lines(&["jmp NOWHERE"]);
        let p1 = asm.pass1(&src, "test.am");
        assert_eq!(p1.errors, 0);
        asm.rebase_data_symbols();
        let p2 = asm.pass2(&src, "test.am");
        assert_eq!(p2.errors, 1);
        assert!(asm.diagnostics[0].message().contains("Undefined symbol"));
    }

    #[test]
    fn every_reserved_cell_is_filled_after_pass2() {
        let asm = assemble(&[
            ".extern K",
            "MAIN: mov X, r1",
            "jmp &MAIN",
            "lea K, r2",
            "stop",
            "X: .data 1, 2",
        ]);
        assert!(asm.code.unfilled().is_empty());
    }

    #[test]
    fn code_image_overflow_is_a_capacity_error() {
        let mut asm = Assembler::new(2);
        let src = lines(&["mov #1, r1", "stop"]);
        let counts = asm.pass1(&src, "test.am");
        assert_eq!(counts.errors, 1);
        assert!(asm.diagnostics[0].message().contains("Code image"));
    }
}
