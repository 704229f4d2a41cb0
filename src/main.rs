// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// CLI entrypoint for asm24.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;

use asm24::assembler::cli::{validate_cli, Cli, DiagnosticsSinkConfig};
use asm24::assembler::run_with_cli;
use asm24::core::error::{AsmRunError, AsmRunReport};

struct DiagnosticsSink {
    writer: Option<Box<dyn Write>>,
}

impl DiagnosticsSink {
    fn from_config(config: &DiagnosticsSinkConfig) -> io::Result<Self> {
        match config {
            DiagnosticsSinkConfig::Disabled => Ok(Self { writer: None }),
            DiagnosticsSinkConfig::Stderr => Ok(Self {
                writer: Some(Box::new(io::stderr())),
            }),
            DiagnosticsSinkConfig::File { path, append } => {
                let mut opts = OpenOptions::new();
                opts.create(true).write(true);
                if *append {
                    opts.append(true);
                } else {
                    opts.truncate(true);
                }
                let file = opts.open(path)?;
                Ok(Self {
                    writer: Some(Box::new(file)),
                })
            }
        }
    }

    fn emit_line(&mut self, line: &str) {
        if let Some(writer) = &mut self.writer {
            let _ = writeln!(writer, "{line}");
        }
    }

    fn emit_report_diagnostics(&mut self, report: &AsmRunReport, use_color: bool) {
        for diag in report.diagnostics() {
            self.emit_line(&diag.format_with_context(Some(report.source_lines()), use_color));
        }
    }

    fn emit_error_diagnostics(&mut self, err: &AsmRunError, use_color: bool) {
        for diag in err.diagnostics() {
            self.emit_line(&diag.format_with_context(Some(err.source_lines()), use_color));
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let cli_config = match validate_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let mut sink = match DiagnosticsSink::from_config(&cli_config.diagnostics_sink) {
        Ok(sink) => sink,
        Err(err) => {
            eprintln!("Failed to open diagnostics sink: {err}");
            return ExitCode::FAILURE;
        }
    };

    let results = match run_with_cli(&cli) {
        Ok(results) => results,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let use_color = std::env::var("NO_COLOR").is_err();
    let mut success = true;
    for result in &results {
        match result {
            Ok(report) => {
                if !cli_config.quiet {
                    sink.emit_report_diagnostics(report, use_color);
                }
            }
            Err(err) => {
                success = false;
                sink.emit_error_diagnostics(err, use_color);
                sink.emit_line(&err.to_string());
            }
        }
    }

    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
