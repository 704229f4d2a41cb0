// Lexical helpers shared by the preprocessor and both passes.

/// Maximum accepted label length.
pub const MAX_LABEL_LEN: usize = 31;

/// A label name starts with an ASCII letter, continues with ASCII
/// alphanumerics, and is at most [`MAX_LABEL_LEN`] characters long.
pub fn is_label_name(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphabetic() {
        return false;
    }
    if s.len() > MAX_LABEL_LEN {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric())
}

/// An integer literal is an optional `+`/`-` sign followed by one or more
/// decimal digits.
pub fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Return the text before the `:` when the first non-whitespace token of
/// `line` ends in `:`. A colon embedded inside the token does not count.
pub fn read_label_prefix(line: &str) -> Option<&str> {
    let token = line.trim_start().split_whitespace().next()?;
    let prefix = token.strip_suffix(':')?;
    if prefix.contains(':') {
        return None;
    }
    Some(prefix)
}

/// Split a line into its first whitespace-delimited token and the rest.
pub fn split_first_token(line: &str) -> (&str, &str) {
    let line = line.trim_start();
    match line.find(|c: char| c.is_ascii_whitespace()) {
        Some(pos) => (&line[..pos], &line[pos..]),
        None => (line, ""),
    }
}
