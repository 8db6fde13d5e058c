//! Colored rendering of an engine's final state.

use nu_ansi_term::{Color, Style};

use crate::config::Colors;
use crate::decoder::Instruction;
use crate::engine::Engine;

/// Render tape, pointers and instruction stream, one section per line.
///
/// With `colors` set to `None` the output is plain text.
pub fn render_state(engine: &Engine, colors: Option<&Colors>) -> String {
    let paint = |color: fn(&Colors) -> Color, text: String| match colors {
        Some(c) => color(c).paint(text).to_string(),
        None => text,
    };
    let bold = |color: fn(&Colors) -> Color, text: String| match colors {
        Some(c) => Style::new().bold().fg(color(c)).paint(text).to_string(),
        None => text,
    };

    let ptr = engine.memory_pointer();
    let ip = engine.instruction_pointer();

    // Show the pointer cell even if the tape has not grown to it yet.
    let tape_len = engine.memory().len().max(ptr + 1);
    let cells: Vec<String> = (0..tape_len)
        .map(|i| {
            let value = engine.memory().get(i).copied().unwrap_or(0);
            if i == ptr {
                bold(|c| c.tape_cell_pointer, format!("[{value}]"))
            } else if value == 0 {
                paint(|c| c.tape_cell_zero, value.to_string())
            } else {
                paint(|c| c.tape_cell_nonzero, value.to_string())
            }
        })
        .collect();

    let instructions: Vec<String> = engine
        .program()
        .instructions()
        .iter()
        .enumerate()
        .map(|(i, instr)| {
            let text = instr.to_string();
            if i == ip {
                bold(|c| c.instr_current, format!("<{text}>"))
            } else {
                match instr {
                    Instruction::LoopOpen { .. } | Instruction::LoopClose { .. } => {
                        paint(|c| c.instr_bracket, text)
                    }
                    Instruction::Halt => paint(|c| c.instr_halt, text),
                    _ => paint(|c| c.instr_op, text),
                }
            }
        })
        .collect();

    format!(
        "{} {}\n{} {}\n{} {}\n{} {}",
        paint(|c| c.label, "memory:".to_string()),
        cells.join(" "),
        paint(|c| c.label, "memory_pointer:".to_string()),
        ptr,
        paint(|c| c.label, "instruction_pointer:".to_string()),
        ip,
        paint(|c| c.label, "instructions:".to_string()),
        instructions.join(" "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decode;
    use crate::io::BufReadLines;
    use std::io::Cursor;

    fn finished(code: &str) -> Engine {
        let mut engine = Engine::new(decode(code).unwrap());
        let mut input = BufReadLines::new(Cursor::new(String::new()));
        let mut out = String::new();
        engine.run(&mut input, &mut out).unwrap();
        engine
    }

    #[test]
    fn plain_dump_marks_pointers() {
        let engine = finished("++>+<");
        let dump = render_state(&engine, None);
        assert_eq!(
            dump,
            "memory: [2] 1\nmemory_pointer: 0\ninstruction_pointer: 5\ninstructions: + + > + < <#>"
        );
    }

    #[test]
    fn pointer_past_tape_is_shown_as_zero() {
        let engine = finished("+>");
        let dump = render_state(&engine, None);
        assert!(dump.starts_with("memory: 1 [0]\n"));
    }

    #[test]
    fn colored_dump_contains_escape_codes() {
        let engine = finished("+");
        let dump = render_state(&engine, Some(&Colors::default()));
        assert!(dump.contains("\u{1b}["));
        assert!(dump.contains("[1]"));
    }
}
