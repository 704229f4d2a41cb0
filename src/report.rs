// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// Shared source-context rendering helpers for diagnostics.

/// Highlight the character at `column` (1-based) in red, or append a caret
/// when the column points past the end of the line. With `use_color` off,
/// only the past-the-end caret is rendered.
pub fn highlight_line(line: &str, column: Option<usize>, use_color: bool) -> String {
    match column {
        Some(col) if col > 0 => {
            let idx = col - 1;
            if idx >= line.len() || !line.is_char_boundary(idx) {
                if use_color {
                    return format!("{line}\x1b[31m^\x1b[0m");
                }
                return format!("{line}^");
            }
            let (head, tail) = line.split_at(idx);
            let ch = tail.chars().next().unwrap_or(' ');
            let rest = &tail[ch.len_utf8()..];
            if use_color {
                format!("{head}\x1b[31m{ch}\x1b[0m{rest}")
            } else {
                format!("{head}{ch}{rest}")
            }
        }
        _ => line.to_string(),
    }
}

/// One gutter-prefixed context line for error display.
pub fn context_line(
    line_num: u32,
    column: Option<usize>,
    lines: Option<&[String]>,
    use_color: bool,
) -> String {
    let line_idx = line_num.saturating_sub(1) as usize;
    match lines.and_then(|lines| lines.get(line_idx)) {
        Some(source) => format!(
            "{line_num:>5} | {}",
            highlight_line(source, column, use_color)
        ),
        None => format!("{line_num:>5} | <source unavailable>"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_column_leaves_the_line_untouched() {
        assert_eq!(highlight_line("mov r1, r2", None, true), "mov r1, r2");
        assert_eq!(highlight_line("mov r1, r2", Some(0), true), "mov r1, r2");
    }

    #[test]
    fn column_is_wrapped_in_color_escapes() {
        assert_eq!(
            highlight_line("abc", Some(2), true),
            "a\x1b[31mb\x1b[0mc"
        );
        assert_eq!(highlight_line("abc", Some(2), false), "abc");
    }

    #[test]
    fn past_the_end_column_appends_a_caret() {
        assert_eq!(highlight_line("abc", Some(9), false), "abc^");
        assert_eq!(highlight_line("abc", Some(9), true), "abc\x1b[31m^\x1b[0m");
    }

    #[test]
    fn context_line_carries_a_gutter() {
        let lines = vec!["stop".to_string(), "A: stop".to_string()];
        assert_eq!(
            context_line(2, None, Some(&lines), false),
            "    2 | A: stop"
        );
    }

    #[test]
    fn missing_source_is_reported_as_unavailable() {
        assert_eq!(context_line(7, None, None, false), "    7 | <source unavailable>");
        let lines = vec!["stop".to_string()];
        assert_eq!(
            context_line(9, None, Some(&lines), false),
            "    9 | <source unavailable>"
        );
    }
}
