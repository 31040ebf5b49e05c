//! JSON with `//` line comments.
//!
//! Comments are blanked out in place (newlines kept) before handing the text
//! to `serde_json`, so the line and column of a syntax error still point
//! into the original file. Everything else is strict JSON: no block
//! comments, no trailing commas.

use crate::config::errors::ConfigError;
use serde_json::Value;
use std::path::Path;

/// Replaces every `//` comment outside a string literal with spaces.
pub fn strip_line_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                out.push(' ');
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                    out.push(' ');
                }
            }
            _ => out.push(c),
        }
    }

    out
}

/// Parses a comment-tolerant JSON document read from `path`.
pub fn parse_document(path: &Path, content: &str) -> Result<Value, ConfigError> {
    let stripped = strip_line_comments(content);
    serde_json::from_str(&stripped).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        line: (e.line() > 0).then(|| e.line()),
        column: (e.column() > 0).then(|| e.column()),
        message: syntax_message(&e),
    })
}

/// serde_json appends " at line X column Y" to its messages; the position
/// is reported separately.
fn syntax_message(error: &serde_json::Error) -> String {
    let full = error.to_string();
    match full.rfind(" at line ") {
        Some(idx) => full[..idx].to_string(),
        None => full,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_whole_line_comment() {
        let input = "// header\n{\"a\": 1}";
        let stripped = strip_line_comments(input);
        assert_eq!(stripped.lines().count(), 2);
        assert_eq!(stripped.lines().nth(1), Some("{\"a\": 1}"));
        assert!(stripped.lines().next().unwrap().trim().is_empty());
    }

    #[test]
    fn test_strip_trailing_comment_keeps_columns() {
        let input = "{\"a\": 1} // trailing";
        let stripped = strip_line_comments(input);
        assert_eq!(stripped.len(), input.len());
        assert!(stripped.starts_with("{\"a\": 1}"));
    }

    #[test]
    fn test_slashes_inside_strings_are_kept() {
        let input = r#"{"url": "https://example.com//x", "esc": "a\"//b"}"#;
        assert_eq!(strip_line_comments(input), input);
    }

    #[test]
    fn test_single_slash_is_not_a_comment() {
        let input = r#"{"path": 1 / 2}"#;
        assert_eq!(strip_line_comments(input), input);
    }

    #[test]
    fn test_parse_document_with_comments() {
        let content = r#"
// global settings
{
  "backend": "ssh", // remote host
  "env": ["TERM"]
}
"#;
        let value = parse_document(Path::new("config.json"), content).unwrap();
        assert_eq!(value["backend"], "ssh");
        assert_eq!(value["env"][0], "TERM");
    }

    #[test]
    fn test_parse_error_reports_position() {
        let content = "{\n  // comment\n  \"backend\" \"ssh\"\n}";
        let err = parse_document(Path::new("/tmp/config.json"), content).unwrap_err();
        match err {
            ConfigError::ParseError {
                path, line, column, ..
            } => {
                assert_eq!(path, Path::new("/tmp/config.json"));
                assert_eq!(line, Some(3));
                assert!(column.is_some());
            }
            other => panic!("expected ParseError, got {other:?}"),
        }
    }

    #[test]
    fn test_trailing_comma_is_rejected() {
        let err = parse_document(Path::new("c.json"), r#"{"env": ["A",]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_block_comment_is_rejected() {
        let err = parse_document(Path::new("c.json"), "/* no */ {}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_comment_only_document_is_rejected() {
        let err = parse_document(Path::new("c.json"), "// nothing here\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_parse_message_has_no_position_suffix() {
        let err = parse_document(Path::new("c.json"), "{").unwrap_err();
        let ConfigError::ParseError { message, .. } = err else {
            panic!("expected ParseError");
        };
        assert!(!message.contains(" at line "), "message was: {message}");
    }
}
