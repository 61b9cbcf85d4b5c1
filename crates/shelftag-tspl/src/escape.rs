// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Escaping for quoted TSPL string fields.
//
// A quoted field ends at the next `"` and a statement ends at CR/LF, so raw
// label text could close the field early or inject extra commands.  The job
// stream is plain ASCII.

use std::borrow::Cow;

/// TSPL escape sequence for a literal double quote.
pub const QUOTE_ESCAPE: &str = "\\[\"]";

/// Make `text` safe to place between the quotes of a TSPL string field.
///
/// - `"` becomes `\["]`
/// - control characters (CR, LF, TAB, …) become a space
/// - non-ASCII characters become `?`
pub fn escape_quoted(text: &str) -> Cow<'_, str> {
    if text
        .chars()
        .all(|c| c.is_ascii() && !c.is_ascii_control() && c != '"')
    {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '"' => out.push_str(QUOTE_ESCAPE),
            c if c.is_control() => out.push(' '),
            c if !c.is_ascii() => out.push('?'),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_borrowed() {
        assert!(matches!(escape_quoted("44-10"), Cow::Borrowed("44-10")));
        assert!(matches!(escape_quoted("18.10 09:05"), Cow::Borrowed(_)));
    }

    #[test]
    fn quotes_use_tspl_escape() {
        assert_eq!(escape_quoted(r#"A"B"#), r#"A\["]B"#);
    }

    #[test]
    fn line_breaks_cannot_inject_commands() {
        let escaped = escape_quoted("1-1\r\nPRINT 99,1");
        assert_eq!(escaped, "1-1  PRINT 99,1");
        assert!(!escaped.contains('\r') && !escaped.contains('\n'));
    }

    #[test]
    fn non_ascii_is_replaced() {
        assert_eq!(escape_quoted("Полка-1"), "?????-1");
        assert!(escape_quoted("ج.م").is_ascii());
    }
}
