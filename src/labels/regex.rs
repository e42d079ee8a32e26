use crate::error::{QueryError, QueryResult};
use regex::Regex;

/// Strips any leading '^' and unescaped trailing '$' from a pattern.
pub fn remove_start_end_anchors(expr: &str) -> &str {
    let mut cursor = expr.trim_start_matches('^');
    while cursor.ends_with('$') && !cursor.ends_with("\\$") {
        cursor = &cursor[..cursor.len() - 1];
    }
    cursor
}

/// Selectors are written against Go's RE2 syntax, where a '{' that does not start a
/// valid repetition (`{n}`, `{n,}`, `{n,m}`) is a literal. The `regex` crate rejects
/// those, so escape them.
pub fn escape_literal_braces(re: &str) -> String {
    fn scan_repeat(chars: &mut std::str::Chars<'_>) -> (bool, String) {
        let mut buf = String::new();
        let mut comma_seen = false;
        for c in chars.by_ref() {
            buf.push(c);
            match c {
                '0'..='9' => continue,
                ',' if !comma_seen && buf.len() > 1 => comma_seen = true,
                '}' if buf.len() > 1 => return (true, buf),
                _ => return (false, buf),
            }
        }
        (false, buf)
    }

    let mut result = String::with_capacity(re.len() + 1);
    let mut chars = re.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                result.push(c);
                if let Some(escaped) = chars.next() {
                    result.push(escaped);
                }
            }
            '{' => {
                let (is_repeat, rest) = scan_repeat(&mut chars);
                if !is_repeat {
                    result.push('\\');
                }
                result.push(c);
                result.push_str(&rest);
            }
            _ => result.push(c),
        }
    }
    result
}

/// Compiles a selector pattern so that it must match the entire label value.
/// Returns the compiled regex and the pattern with user-supplied anchors removed.
pub fn compile_anchored(value: &str) -> QueryResult<(Regex, &str)> {
    let unanchored = remove_start_end_anchors(value);
    let escaped = escape_literal_braces(unanchored);
    let regex = Regex::new(&format!("^(?:{escaped})$"))
        .map_err(|e| QueryError::InvalidRegex(format!("{value}: {e}")))?;
    Ok((regex, unanchored))
}
