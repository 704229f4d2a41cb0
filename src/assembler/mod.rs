// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Two-pass assembler pipeline - main entry point.
//!
//! This module ties together the preprocessing, pass, and serialization
//! stages: macro expansion produces the `.am` source, the first pass sizes
//! instructions and collects symbols, the second pass resolves label
//! references, and the writers emit the `.ob`, `.ent`, and `.ext` artifacts.

pub mod cli;
mod engine;
mod first_pass;
mod output;
mod passes;
mod second_pass;

use engine::Assembler;
use output::{emit_symbols_file, write_artifacts};

use std::fs;
use std::path::Path;

use crate::core::error::{
    AsmError, AsmErrorKind, AsmRunError, AsmRunReport, Diagnostic, PassCounts, Severity,
};
use crate::core::image::{CodeImage, DataImage};
use crate::core::lexer::{is_integer_literal, is_label_name, read_label_prefix, split_first_token};
use crate::core::macro_processor::MacroProcessor;
use crate::core::operand::{classify, AddressMode, ClassifyError};
use crate::core::optable::{
    directive, lookup, DirectiveKind, DirectiveLookup, JUMP_OPCODE, MAX_OP_LEN, PRN_OPCODE,
};
use crate::core::symbol_table::{PromoteError, SymbolKind, SymbolTable};
use crate::core::word::{Are, DataWord, InstructionWord, MachineCell};

use cli::{validate_cli, Cli, CliConfig, OutputFormat};

// Re-export public types
pub use crate::core::error::{AsmRunError as RunError, AsmRunReport as RunReport};
pub use cli::VERSION;
pub use passes::{run_with_cli, JobResult};

/// Initial value of the instruction counter.
pub(crate) const IC_START: u32 = 100;

/// Maximum content characters per source line; longer lines are rejected.
pub(crate) const MAX_LINE_LEN: usize = 80;

/// Seven-digit zero-padded decimal address column used by all artifacts.
pub(crate) fn format_addr(addr: u32) -> String {
    format!("{addr:07}")
}
