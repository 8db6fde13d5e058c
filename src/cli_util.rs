use std::io::{self, IsTerminal, Write};

use crate::config::{self, Colors};
use crate::decoder::{DecodeError, Program};
use crate::engine::EngineError;

/// Show this many chars of source on each side of an error position.
const WINDOW_CHARS: usize = 32;

/// Pretty-print a decode error with caret positioning.
/// If `program` is `Some("bfvm")`, messages are prefixed with "bfvm: ...".
pub fn print_decode_error(program: Option<&str>, code: &str, err: &DecodeError) {
    eprint!("{}", paint_messages(&format_decode_error(program, code, err), stderr_colors()));
    let _ = io::stderr().flush();
}

/// Pretty-print a runtime error, mapping the instruction pointer back to the
/// source through `decoded`.
pub fn print_engine_error(program: Option<&str>, code: &str, decoded: &Program, err: &EngineError) {
    eprint!(
        "{}",
        paint_messages(&format_engine_error(program, code, decoded, err), stderr_colors())
    );
    let _ = io::stderr().flush();
}

pub fn format_decode_error(program: Option<&str>, code: &str, err: &DecodeError) -> String {
    match err {
        DecodeError::UnmatchedClose { position } => {
            let msg = prefix_program(program, "Parse error: unmatched bracket ']'");
            error_with_context(&msg, code, *position)
        }
        DecodeError::UnclosedLoop { positions } => {
            let mut out = String::new();
            for position in positions {
                let msg = prefix_program(program, "Parse error: unclosed bracket '['");
                out.push_str(&error_with_context(&msg, code, *position));
            }
            out
        }
    }
}

pub fn format_engine_error(program: Option<&str>, code: &str, decoded: &Program, err: &EngineError) -> String {
    match err {
        EngineError::OutOfBounds { ip } => {
            let msg = prefix_program(
                program,
                &format!("Runtime error: instruction pointer {ip} outside program of {} instructions", decoded.len()),
            );
            format!("{msg}\n")
        }
        EngineError::Io { ip, source } => {
            let msg = prefix_program(program, &format!("I/O error: {source}"));
            match decoded.source_position(*ip) {
                Some(position) => error_with_context(&msg, code, position),
                None => format!("{msg}\n"),
            }
        }
    }
}

fn stderr_colors() -> Option<&'static Colors> {
    io::stderr().is_terminal().then(config::colors)
}

/// Color the message lines of a formatted error, leaving the indented
/// source and caret lines untouched.
pub fn paint_messages(text: &str, colors: Option<&Colors>) -> String {
    let Some(colors) = colors else {
        return text.to_string();
    };
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        let body = line.strip_suffix('\n').unwrap_or(line);
        if body.is_empty() || body.starts_with("  ") {
            out.push_str(line);
        } else {
            out.push_str(&colors.error.paint(body).to_string());
            out.push_str(&line[body.len()..]);
        }
    }
    out
}

fn prefix_program(program: Option<&str>, msg: &str) -> String {
    match program {
        Some(p) => format!("{p}: {msg}"),
        None => msg.to_string(),
    }
}

/// A concise error line plus a caret context window, working with UTF-8 by
/// slicing on char indices.
pub fn error_with_context(prefix: &str, code: &str, pos: usize) -> String {
    let total_chars = code.chars().count();
    let start_char = pos.saturating_sub(WINDOW_CHARS);
    let end_char = (pos + WINDOW_CHARS + 1).min(total_chars);

    // Newlines and tabs would break caret alignment.
    let slice: String = code
        .chars()
        .skip(start_char)
        .take(end_char.saturating_sub(start_char))
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();

    let caret_offset = pos.saturating_sub(start_char);
    format!(
        "{prefix} at position {pos}\n  {slice}\n  {}^\n",
        " ".repeat(caret_offset)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decode;

    #[test]
    fn only_message_lines_are_colored() {
        let text = "bfvm: Parse error at position 0\n  ]\n  ^\n";
        let colors = Colors::default();
        let out = paint_messages(text, Some(&colors));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], colors.error.paint("bfvm: Parse error at position 0").to_string());
        assert_eq!(lines[1], "  ]");
        assert_eq!(lines[2], "  ^");
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn messages_are_plain_without_colors() {
        let text = "bfvm: oops\n  +\n  ^\n";
        assert_eq!(paint_messages(text, None), text);
    }

    #[test]
    fn caret_points_at_the_error() {
        let out = error_with_context("oops", "ab\ncd", 3);
        assert_eq!(out, "oops at position 3\n  ab cd\n     ^\n");
    }

    #[test]
    fn window_is_clipped_on_long_sources() {
        let code = format!("{}]", "+".repeat(100));
        let out = error_with_context("e", &code, 100);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[1].chars().count(), 2 + WINDOW_CHARS + 1);
        assert_eq!(lines[2].len(), 2 + WINDOW_CHARS + 1);
    }

    #[test]
    fn unclosed_loops_get_one_caret_each() {
        let err = decode("[[").unwrap_err();
        let out = format_decode_error(Some("bfvm"), "[[", &err);
        assert_eq!(out.matches("bfvm: Parse error: unclosed bracket").count(), 2);
        assert!(out.contains("at position 0"));
        assert!(out.contains("at position 1"));
    }

    #[test]
    fn io_errors_point_at_the_input_instruction() {
        let code = "+ ,";
        let program = decode(code).unwrap();
        let err = EngineError::Io {
            ip: 1,
            source: io::Error::new(io::ErrorKind::UnexpectedEof, "input exhausted"),
        };
        let out = format_engine_error(None, code, &program, &err);
        assert!(out.starts_with("I/O error: input exhausted at position 2\n"));
    }
}
