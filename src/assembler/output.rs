use super::*;

use serde_json::json;

/// Render the `.ob` body: a size header, then one line per populated code
/// cell and one per data cell. Addresses are 7-digit decimal, words are
/// 6-digit lowercase hex masked to 24 bits.
pub(super) fn build_object_text(code: &CodeImage, data: &DataImage) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} {}\n", code.len(), data.len()));

    for (ix, cell) in code.cells().iter().enumerate() {
        if let Some(cell) = cell {
            let addr = IC_START + ix as u32;
            out.push_str(&format!("{} {:06x}\n", format_addr(addr), cell.encode()));
        }
    }

    let data_base = IC_START + code.len() as u32;
    for (ix, value) in data.values().iter().enumerate() {
        let addr = data_base + ix as u32;
        // Data directive values occupy the full word width with no ARE bits.
        let word = (*value as u32) & 0xFF_FFFF;
        out.push_str(&format!("{} {word:06x}\n", format_addr(addr)));
    }

    out
}

/// Render the `.ent` body, or `None` when no symbol was promoted.
pub(super) fn build_entries_text(symbols: &SymbolTable) -> Option<String> {
    let mut out = String::new();
    for entry in symbols.iter() {
        if entry.kind == SymbolKind::Entry {
            out.push_str(&format!("{} {}\n", entry.name, format_addr(entry.address)));
        }
    }
    (!out.is_empty()).then_some(out)
}

/// Render the `.ext` body, or `None` when no external symbol was referenced.
pub(super) fn build_externals_text(symbols: &SymbolTable) -> Option<String> {
    let mut out = String::new();
    for site in symbols.references() {
        out.push_str(&format!("{} {}\n", site.name, format_addr(site.address)));
    }
    (!out.is_empty()).then_some(out)
}

/// Write `.ob` and, when non-empty, `.ent` and `.ext` next to the input.
pub(super) fn write_artifacts(
    base: &str,
    code: &CodeImage,
    data: &DataImage,
    symbols: &SymbolTable,
) -> Result<(), AsmError> {
    write_text(&format!("{base}.ob"), &build_object_text(code, data))?;
    if let Some(text) = build_entries_text(symbols) {
        write_text(&format!("{base}.ent"), &text)?;
    }
    if let Some(text) = build_externals_text(symbols) {
        write_text(&format!("{base}.ext"), &text)?;
    }
    Ok(())
}

fn write_text(path: &str, text: &str) -> Result<(), AsmError> {
    fs::write(path, text)
        .map_err(|_| AsmError::new(AsmErrorKind::Io, "Cannot create file", Some(path)))
}

fn kind_name(kind: SymbolKind) -> &'static str {
    match kind {
        SymbolKind::Code => "code",
        SymbolKind::Data => "data",
        SymbolKind::Entry => "entry",
        SymbolKind::Extern => "extern",
    }
}

/// Write the optional symbol listing in text or JSON form.
pub(super) fn emit_symbols_file(
    path: &Path,
    format: OutputFormat,
    symbols: &SymbolTable,
) -> Result<(), AsmError> {
    let output = if format == OutputFormat::Json {
        let entries: Vec<serde_json::Value> = symbols
            .iter()
            .map(|entry| {
                json!({
                    "name": entry.name,
                    "address": format_addr(entry.address),
                    "value": entry.address,
                    "kind": kind_name(entry.kind),
                })
            })
            .collect();
        let mut text = json!({ "symbols": entries }).to_string();
        text.push('\n');
        text
    } else {
        let mut text = String::new();
        for entry in symbols.iter() {
            text.push_str(&format!(
                "{} {} {}\n",
                entry.name,
                format_addr(entry.address),
                kind_name(entry.kind)
            ));
        }
        text
    };

    fs::write(path, output).map_err(|_| {
        AsmError::new(
            AsmErrorKind::Io,
            "Cannot create file",
            Some(path.to_string_lossy().as_ref()),
        )
    })
}
