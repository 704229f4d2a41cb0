//! Job orchestration: raw source to artifacts.
//!
//! One job per input basename: read the `.as` source, expand macros into
//! the `.am` intermediate, run both passes, and serialize the artifacts.
//! Jobs are independent; a failing job never stops the ones after it.

use super::*;

use std::sync::Arc;

pub type JobResult = Result<AsmRunReport, AsmRunError>;

/// Validate the CLI and assemble every input in order.
pub fn run_with_cli(cli: &Cli) -> Result<Vec<JobResult>, AsmError> {
    let config = validate_cli(cli)?;
    Ok(config
        .inputs
        .iter()
        .map(|base| run_one(base, &config))
        .collect())
}

pub(super) fn run_one(base: &str, config: &CliConfig) -> JobResult {
    let as_path = format!("{base}.as");
    let raw = read_source_lines(&as_path)?;

    let mut preprocessor = MacroProcessor::new(config.macro_limits);
    let expanded = match preprocessor.expand(&raw) {
        Ok(lines) => Arc::new(lines),
        Err(err) => {
            let line = err.line().unwrap_or(raw.len() as u32);
            let diag = Diagnostic::new(
                line,
                Severity::Error,
                AsmError::new(AsmErrorKind::Preprocess, err.message(), None),
            )
            .with_file(Some(as_path.clone()));
            return Err(AsmRunError::new(
                AsmError::new(AsmErrorKind::Preprocess, "Preprocessing failed", Some(&as_path)),
                vec![diag],
                raw,
            ));
        }
    };

    let am_path = format!("{base}.am");
    write_expanded(&am_path, &expanded).map_err(|err| {
        AsmRunError::new(err, Vec::new(), expanded.clone())
    })?;

    let mut assembler = Assembler::new(config.code_limit);
    let pass1 = assembler.pass1(&expanded, &am_path);
    if pass1.errors > 0 {
        return Err(AsmRunError::new(
            AsmError::new(
                AsmErrorKind::Assembler,
                "Errors detected in source. No object file created.",
                None,
            ),
            assembler.take_diagnostics(),
            expanded.clone(),
        ));
    }

    assembler.rebase_data_symbols();
    let pass2 = assembler.pass2(&expanded, &am_path);
    if pass2.errors > 0 {
        return Err(AsmRunError::new(
            AsmError::new(
                AsmErrorKind::Assembler,
                "Errors detected in source. No object file created.",
                None,
            ),
            assembler.take_diagnostics(),
            expanded.clone(),
        ));
    }

    write_artifacts(base, &assembler.code, &assembler.data, assembler.symbols())
        .map_err(|err| AsmRunError::new(err, Vec::new(), expanded.clone()))?;

    if let Some(path) = &config.symbols_file {
        emit_symbols_file(path, config.format, assembler.symbols())
            .map_err(|err| AsmRunError::new(err, Vec::new(), expanded.clone()))?;
    }

    Ok(AsmRunReport::new(assembler.take_diagnostics(), expanded))
}

/// Read the raw source, enforcing the per-line length bound. Lines longer
/// than [`MAX_LINE_LEN`] content characters are rejected, not truncated.
fn read_source_lines(path: &str) -> Result<Vec<String>, AsmRunError> {
    let content = fs::read_to_string(path).map_err(|_| {
        AsmRunError::new(
            AsmError::new(AsmErrorKind::Io, "Cannot open file", Some(path)),
            Vec::new(),
            Vec::new(),
        )
    })?;
    let lines: Vec<String> = content.lines().map(str::to_string).collect();

    for (ix, line) in lines.iter().enumerate() {
        if line.chars().count() > MAX_LINE_LEN {
            let diag = Diagnostic::new(
                ix as u32 + 1,
                Severity::Error,
                AsmError::new(
                    AsmErrorKind::Assembler,
                    &format!("Source line exceeds {MAX_LINE_LEN} characters"),
                    None,
                ),
            )
            .with_file(Some(path.to_string()))
            .with_column(Some(MAX_LINE_LEN + 1));
            return Err(AsmRunError::new(
                AsmError::new(AsmErrorKind::Assembler, "Source line too long", Some(path)),
                vec![diag],
                lines.clone(),
            ));
        }
    }

    Ok(lines)
}

/// Write the expanded source. Line numbering of the `.am` file matches the
/// expanded content exactly; every line ends with a newline.
fn write_expanded(path: &str, lines: &[String]) -> Result<(), AsmError> {
    let mut text = String::new();
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    fs::write(path, text)
        .map_err(|_| AsmError::new(AsmErrorKind::Io, "Cannot create file", Some(path)))
}
