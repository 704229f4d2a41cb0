// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// Macro preprocessor implementing mcro/mcroend expansion.

use std::collections::HashMap;

use crate::core::optable::is_reserved_word;

/// Limits on the macro table, enforced with dedicated overflow errors.
#[derive(Debug, Clone, Copy)]
pub struct MacroLimits {
    pub max_macros: usize,
    pub max_body_lines: usize,
}

impl Default for MacroLimits {
    fn default() -> Self {
        Self {
            max_macros: 50,
            max_body_lines: 100,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MacroError {
    message: String,
    line: Option<u32>,
}

impl MacroError {
    pub fn new(message: impl Into<String>, line: Option<u32>) -> Self {
        Self {
            message: message.into(),
            line,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn line(&self) -> Option<u32> {
        self.line
    }
}

/// Expands `mcro NAME` .. `mcroend` definitions.
///
/// Definitions must precede their invocations; a name used before its
/// definition is passed through as an ordinary line. A definition line
/// carries the keyword, the name, and nothing else. An invocation is a line
/// whose sole token is a known macro name; a known name followed by other
/// tokens is not an invocation. Body lines are recorded verbatim.
pub struct MacroProcessor {
    macros: HashMap<String, Vec<String>>,
    limits: MacroLimits,
}

impl MacroProcessor {
    pub fn new(limits: MacroLimits) -> Self {
        Self {
            macros: HashMap::new(),
            limits,
        }
    }

    pub fn expand(&mut self, lines: &[String]) -> Result<Vec<String>, MacroError> {
        let mut out = Vec::new();
        let mut current: Option<(String, Vec<String>)> = None;

        for (idx, line) in lines.iter().enumerate() {
            let line_num = idx as u32 + 1;
            let trimmed = line.trim();
            let mut tokens = trimmed.split_whitespace();
            let first = tokens.next().unwrap_or("");

            if current.is_some() {
                if first == "mcroend" {
                    if tokens.next().is_some() {
                        return Err(MacroError::new(
                            "Extra content after mcroend not allowed",
                            Some(line_num),
                        ));
                    }
                    let (name, body) = current.take().expect("definition in progress");
                    self.macros.insert(name, body);
                    continue;
                }
                if first == "mcro" {
                    return Err(MacroError::new(
                        "Nested macro definition not allowed",
                        Some(line_num),
                    ));
                }
                let (name, body) = current.as_mut().expect("definition in progress");
                if body.len() >= self.limits.max_body_lines {
                    return Err(MacroError::new(
                        format!("Too many lines in macro '{name}'"),
                        Some(line_num),
                    ));
                }
                body.push(line.clone());
                continue;
            }

            // Outside a definition. Blank and comment lines pass through
            // before any keyword matching.
            if trimmed.is_empty() || trimmed.starts_with(';') {
                out.push(line.clone());
                continue;
            }

            if first == "mcro" {
                let Some(name) = tokens.next() else {
                    return Err(MacroError::new("Missing macro name", Some(line_num)));
                };
                if tokens.next().is_some() {
                    return Err(MacroError::new(
                        "Extra content after macro name not allowed",
                        Some(line_num),
                    ));
                }
                if !is_valid_macro_name(name) {
                    return Err(MacroError::new(
                        format!("Invalid macro name '{name}'"),
                        Some(line_num),
                    ));
                }
                if self.macros.contains_key(name) {
                    return Err(MacroError::new(
                        format!("Macro '{name}' already defined"),
                        Some(line_num),
                    ));
                }
                if self.macros.len() >= self.limits.max_macros {
                    return Err(MacroError::new("Too many macros defined", Some(line_num)));
                }
                current = Some((name.to_string(), Vec::new()));
                continue;
            }

            if first == "mcroend" {
                return Err(MacroError::new(
                    "'mcroend' without matching 'mcro'",
                    Some(line_num),
                ));
            }

            // Invocation: the macro name must be the sole token.
            if tokens.next().is_none() {
                if let Some(body) = self.macros.get(first) {
                    out.extend(body.iter().cloned());
                    continue;
                }
            }

            out.push(line.clone());
        }

        if current.is_some() {
            return Err(MacroError::new(
                "Unclosed macro definition at end of file",
                None,
            ));
        }

        Ok(out)
    }
}

/// Macro names follow the label rule widened with underscores, and may not
/// shadow a keyword, directive, or mnemonic.
fn is_valid_macro_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphabetic() {
        return false;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return false;
    }
    !is_reserved_word(name)
}
