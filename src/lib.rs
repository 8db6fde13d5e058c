//! A small Brainfuck virtual machine.
//!
//! Source is first decoded into a [`Program`], a flat instruction stream whose
//! brackets carry the index of their partner, and then executed by an
//! [`Engine`] against a tape that grows on demand.
//!
//! Features and behaviors:
//! - The tape starts empty and grows one zero cell at a time to the right.
//! - Moving left from cell 0 stays at cell 0.
//! - `+` and `-` wrap modulo 256.
//! - Input `,` is line buffered: a whole line is pulled from the [`LineSource`]
//!   whenever the queue runs dry, and the next char is stored in the cell.
//! - Output `.` writes the cell as a char to the [`OutputSink`] (no newline).
//! - Unbalanced brackets are reported at decode time; other characters are comments.
//!
//! Quick start:
//!
//! ```no_run
//! use bfvm::{decode, BufReadLines, Engine, WriterSink};
//!
//! // Classic "Hello World!" in Brainfuck
//! let code = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";
//! let mut engine = Engine::new(decode(code).expect("program should decode"));
//! let mut input = BufReadLines::new(std::io::stdin().lock());
//! let mut output = WriterSink::new(std::io::stdout());
//! engine.run(&mut input, &mut output).expect("program should run");
//! ```

pub mod cli_util;
pub mod config;
pub mod decoder;
pub mod dump;
pub mod engine;
pub mod io;

pub use decoder::{decode, DecodeError, Instruction, Program};
pub use engine::{Engine, EngineError};
pub use io::{BufReadLines, LineSource, OutputSink, WriterSink};

/// Any failure between source text and a finished run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Decode `source` and run it to completion, returning the finished engine.
pub fn run_source<I, O>(source: &str, input: &mut I, output: &mut O) -> Result<Engine, Error>
where
    I: LineSource + ?Sized,
    O: OutputSink + ?Sized,
{
    let mut engine = Engine::new(decode(source)?);
    engine.run(input, output)?;
    Ok(engine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn run_source_surfaces_decode_errors() {
        let mut input = BufReadLines::new(Cursor::new(String::new()));
        let mut out = String::new();
        let result = run_source("+]", &mut input, &mut out);
        assert!(matches!(result, Err(Error::Decode(DecodeError::UnmatchedClose { position: 1 }))));
    }

    #[test]
    fn run_source_surfaces_engine_errors() {
        let mut input = BufReadLines::new(Cursor::new(String::new()));
        let mut out = String::new();
        let result = run_source(",", &mut input, &mut out);
        assert!(matches!(result, Err(Error::Engine(EngineError::Io { ip: 0, .. }))));
    }

    #[test]
    fn run_source_returns_finished_engine() {
        let mut input = BufReadLines::new(Cursor::new("hi\n".to_string()));
        let mut out = String::new();
        let engine = run_source(",.>,.", &mut input, &mut out).unwrap();
        assert_eq!(out, "hi");
        assert_eq!(engine.memory(), &[b'h', b'i']);
        assert!(engine.is_halted());
    }
}
