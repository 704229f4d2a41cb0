// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Command-line interface parsing and argument validation.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use crate::core::error::{AsmError, AsmErrorKind};
use crate::core::image::DEFAULT_IMAGE_CAPACITY;
use crate::core::macro_processor::MacroLimits;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const LONG_ABOUT: &str = "Two-pass assembler for the 24-bit word machine.

Each input names an assembly source file with the .as extension (the
extension itself may be given or omitted). For every input the assembler
writes the macro-expanded source (.am) next to it, then the object image
(.ob) and, when applicable, the entry-label (.ent) and external-reference
(.ext) listings. Exit status is 0 only when every input assembles cleanly.";

#[derive(Parser, Debug)]
#[command(
    name = "asm24",
    version = VERSION,
    about = "Two-pass assembler (.as -> .am/.ob/.ent/.ext) with mcro expansion",
    long_about = LONG_ABOUT
)]
pub struct Cli {
    #[arg(
        long = "format",
        value_enum,
        default_value_t = OutputFormat::Text,
        long_help = "Select output format for the --symbols listing. text is default; json enables machine-readable output."
    )]
    pub format: OutputFormat,
    #[arg(
        short = 'q',
        long = "quiet",
        action = ArgAction::SetTrue,
        long_help = "Suppress diagnostic output for successful assembly runs. Errors are still reported unless --no-error is set."
    )]
    pub quiet: bool,
    #[arg(
        short = 'E',
        long = "error",
        value_name = "FILE",
        long_help = "Write diagnostics to FILE instead of stderr."
    )]
    pub error_file: Option<PathBuf>,
    #[arg(
        long = "error-append",
        action = ArgAction::SetTrue,
        requires = "error_file",
        long_help = "Append diagnostics to --error FILE instead of truncating it."
    )]
    pub error_append: bool,
    #[arg(
        long = "no-error",
        action = ArgAction::SetTrue,
        conflicts_with_all = ["error_file", "error_append"],
        long_help = "Disable all diagnostic output routing."
    )]
    pub no_error: bool,
    #[arg(
        long = "code-limit",
        value_name = "CELLS",
        default_value_t = DEFAULT_IMAGE_CAPACITY,
        long_help = "Capacity of the code and data images in 24-bit cells. Exceeding it fails the job with an overflow diagnostic."
    )]
    pub code_limit: usize,
    #[arg(
        long = "macro-limit",
        value_name = "COUNT",
        default_value_t = 50,
        long_help = "Maximum number of macro definitions accepted by the preprocessor."
    )]
    pub macro_limit: usize,
    #[arg(
        long = "macro-lines",
        value_name = "LINES",
        default_value_t = 100,
        long_help = "Maximum number of body lines per macro definition."
    )]
    pub macro_lines: usize,
    #[arg(
        long = "symbols",
        value_name = "FILE",
        long_help = "Write the final symbol table (name, address, kind) to FILE after a successful run."
    )]
    pub symbols_file: Option<PathBuf>,
    #[arg(
        required = true,
        value_name = "FILE",
        long_help = "Assembly source files. Each FILE is a basename or a path ending in .as."
    )]
    pub inputs: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Where diagnostics are routed.
#[derive(Debug, Clone)]
pub enum DiagnosticsSinkConfig {
    Disabled,
    Stderr,
    File { path: PathBuf, append: bool },
}

/// Validated, normalized CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Input basenames with the `.as` extension stripped.
    pub inputs: Vec<String>,
    pub code_limit: usize,
    pub macro_limits: MacroLimits,
    pub symbols_file: Option<PathBuf>,
    pub format: OutputFormat,
    pub quiet: bool,
    pub diagnostics_sink: DiagnosticsSinkConfig,
}

pub fn validate_cli(cli: &Cli) -> Result<CliConfig, AsmError> {
    if cli.code_limit == 0 {
        return Err(AsmError::new(
            AsmErrorKind::Cli,
            "--code-limit must be at least 1",
            None,
        ));
    }
    if cli.macro_limit == 0 {
        return Err(AsmError::new(
            AsmErrorKind::Cli,
            "--macro-limit must be at least 1",
            None,
        ));
    }
    if cli.macro_lines == 0 {
        return Err(AsmError::new(
            AsmErrorKind::Cli,
            "--macro-lines must be at least 1",
            None,
        ));
    }

    let mut inputs = Vec::with_capacity(cli.inputs.len());
    for input in &cli.inputs {
        let base = input.strip_suffix(".as").unwrap_or(input);
        if base.is_empty() {
            return Err(AsmError::new(
                AsmErrorKind::Cli,
                "Input filename is empty",
                Some(input),
            ));
        }
        inputs.push(base.to_string());
    }

    let diagnostics_sink = if cli.no_error {
        DiagnosticsSinkConfig::Disabled
    } else if let Some(path) = &cli.error_file {
        DiagnosticsSinkConfig::File {
            path: path.clone(),
            append: cli.error_append,
        }
    } else {
        DiagnosticsSinkConfig::Stderr
    };

    Ok(CliConfig {
        inputs,
        code_limit: cli.code_limit,
        macro_limits: MacroLimits {
            max_macros: cli.macro_limit,
            max_body_lines: cli.macro_lines,
        },
        symbols_file: cli.symbols_file.clone(),
        format: cli.format,
        quiet: cli.quiet,
        diagnostics_sink,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("asm24").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn as_extension_is_stripped_from_inputs() {
        let config = validate_cli(&parse(&["prog.as", "other"])).unwrap();
        assert_eq!(config.inputs, vec!["prog".to_string(), "other".to_string()]);
    }

    #[test]
    fn bare_extension_input_is_rejected() {
        let err = validate_cli(&parse(&[".as"])).unwrap_err();
        assert!(err.message().contains("Input filename is empty"));
    }

    #[test]
    fn limits_default_to_the_classic_bounds() {
        let config = validate_cli(&parse(&["prog"])).unwrap();
        assert_eq!(config.code_limit, 1200);
        assert_eq!(config.macro_limits.max_macros, 50);
        assert_eq!(config.macro_limits.max_body_lines, 100);
    }

    #[test]
    fn zero_limits_are_rejected() {
        let err = validate_cli(&parse(&["--code-limit", "0", "prog"])).unwrap_err();
        assert!(err.message().contains("--code-limit"));
        let err = validate_cli(&parse(&["--macro-limit", "0", "prog"])).unwrap_err();
        assert!(err.message().contains("--macro-limit"));
    }

    #[test]
    fn diagnostics_sink_follows_error_flags() {
        let config = validate_cli(&parse(&["prog"])).unwrap();
        assert!(matches!(config.diagnostics_sink, DiagnosticsSinkConfig::Stderr));

        let config = validate_cli(&parse(&["--no-error", "prog"])).unwrap();
        assert!(matches!(config.diagnostics_sink, DiagnosticsSinkConfig::Disabled));

        let config = validate_cli(&parse(&["-E", "diag.log", "--error-append", "prog"])).unwrap();
        match config.diagnostics_sink {
            DiagnosticsSinkConfig::File { path, append } => {
                assert_eq!(path, PathBuf::from("diag.log"));
                assert!(append);
            }
            other => panic!("unexpected sink {other:?}"),
        }
    }

    #[test]
    fn inputs_are_required() {
        assert!(Cli::try_parse_from(["asm24"]).is_err());
    }
}
