//! Source decoding and loop resolution.
//!
//! [`decode`] turns Brainfuck source into a [`Program`]: a flat instruction
//! stream where every bracket already knows the index of its partner, ending
//! in a single [`Instruction::Halt`]. Characters outside `><+-.,[]` are
//! comments and never reach the stream.

use std::fmt;
use std::str::FromStr;

/// Errors raised while decoding source text.
///
/// Positions are char offsets into the source, not byte offsets.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// A `]` appeared while no `[` was pending.
    #[error("Unmatched ']' at position {position}")]
    UnmatchedClose { position: usize },

    /// One or more `[` were still open at the end of the source.
    #[error("Unclosed loop(s) at {positions:?}")]
    UnclosedLoop { positions: Vec<usize> },
}

/// One cell of the instruction stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Right,
    Left,
    Increment,
    Decrement,
    Output,
    Input,
    /// `[`; `close` is the stream index of the matching `]`.
    LoopOpen { close: usize },
    /// `]`; `open` is the stream index of the matching `[`.
    LoopClose { open: usize },
    /// End of program. Always the last cell.
    Halt,
}

impl Instruction {
    /// The source symbol for this instruction. `Halt` has none and renders as `#`.
    pub fn symbol(&self) -> char {
        match self {
            Instruction::Right => '>',
            Instruction::Left => '<',
            Instruction::Increment => '+',
            Instruction::Decrement => '-',
            Instruction::Output => '.',
            Instruction::Input => ',',
            Instruction::LoopOpen { .. } => '[',
            Instruction::LoopClose { .. } => ']',
            Instruction::Halt => '#',
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::LoopOpen { close } => write!(f, "[->{close}"),
            Instruction::LoopClose { open } => write!(f, "]->{open}"),
            other => write!(f, "{}", other.symbol()),
        }
    }
}

/// A decoded, jump-resolved program.
///
/// Alongside the instructions it keeps the source char offset each one was
/// decoded from, so runtime diagnostics can point back into the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instruction>,
    positions: Vec<usize>,
}

impl Program {
    /// The instruction stream, terminator included.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// The instruction at `index`, if the stream has one there.
    pub fn get(&self, index: usize) -> Option<Instruction> {
        self.instructions.get(index).copied()
    }

    /// Number of stream cells, terminator included. Never zero.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// True when the program holds nothing but the terminator.
    pub fn is_empty(&self) -> bool {
        self.instructions.len() == 1
    }

    /// Source char offset of the instruction at `index`.
    /// The terminator maps to the length of the source.
    pub fn source_position(&self, index: usize) -> Option<usize> {
        self.positions.get(index).copied()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, instr) in self.instructions.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{instr}")?;
        }
        Ok(())
    }
}

impl FromStr for Program {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}

/// Decode `source` into a [`Program`].
///
/// Returns [`DecodeError::UnmatchedClose`] on the first stray `]`, or
/// [`DecodeError::UnclosedLoop`] listing every `[` left open.
pub fn decode(source: &str) -> Result<Program, DecodeError> {
    let mut instructions: Vec<Instruction> = Vec::new();
    let mut positions: Vec<usize> = Vec::new();
    // Stream indices of opens still waiting for their `]`.
    let mut stack: Vec<usize> = Vec::new();
    let mut source_len = 0;

    for (pos, ch) in source.chars().enumerate() {
        source_len = pos + 1;
        let instr = match ch {
            '>' => Instruction::Right,
            '<' => Instruction::Left,
            '+' => Instruction::Increment,
            '-' => Instruction::Decrement,
            '.' => Instruction::Output,
            ',' => Instruction::Input,
            '[' => {
                stack.push(instructions.len());
                // Patched once the matching `]` shows up.
                Instruction::LoopOpen { close: usize::MAX }
            }
            ']' => {
                let Some(open) = stack.pop() else {
                    return Err(DecodeError::UnmatchedClose { position: pos });
                };
                let close = instructions.len();
                instructions[open] = Instruction::LoopOpen { close };
                Instruction::LoopClose { open }
            }
            _ => continue,
        };
        instructions.push(instr);
        positions.push(pos);
    }

    if !stack.is_empty() {
        return Err(DecodeError::UnclosedLoop {
            positions: stack.iter().map(|&i| positions[i]).collect(),
        });
    }

    instructions.push(Instruction::Halt);
    positions.push(source_len);

    Ok(Program { instructions, positions })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_symmetric(program: &Program) {
        for (i, instr) in program.instructions().iter().enumerate() {
            match *instr {
                Instruction::LoopOpen { close } => {
                    assert!(i < close, "open {i} targets {close}");
                    assert_eq!(program.get(close), Some(Instruction::LoopClose { open: i }));
                }
                Instruction::LoopClose { open } => {
                    assert!(open < i, "close {i} targets {open}");
                    assert_eq!(program.get(open), Some(Instruction::LoopOpen { close: i }));
                }
                _ => {}
            }
        }
    }

    #[test]
    fn empty_source_is_only_the_terminator() {
        let program = decode("").unwrap();
        assert_eq!(program.instructions(), &[Instruction::Halt]);
        assert!(program.is_empty());
        assert_eq!(program.source_position(0), Some(0));
    }

    #[test]
    fn comments_are_skipped() {
        let program = decode("a+ b\n-c").unwrap();
        assert_eq!(
            program.instructions(),
            &[Instruction::Increment, Instruction::Decrement, Instruction::Halt]
        );
        assert_eq!(program.source_position(0), Some(1));
        assert_eq!(program.source_position(1), Some(5));
        assert_eq!(program.source_position(2), Some(7));
    }

    #[test]
    fn every_primitive_decodes() {
        let program = decode("><+-.,").unwrap();
        assert_eq!(
            program.instructions(),
            &[
                Instruction::Right,
                Instruction::Left,
                Instruction::Increment,
                Instruction::Decrement,
                Instruction::Output,
                Instruction::Input,
                Instruction::Halt,
            ]
        );
    }

    #[test]
    fn nested_loops_pair_innermost_first() {
        let program = decode("[[]]").unwrap();
        assert_eq!(
            program.instructions(),
            &[
                Instruction::LoopOpen { close: 3 },
                Instruction::LoopOpen { close: 2 },
                Instruction::LoopClose { open: 1 },
                Instruction::LoopClose { open: 0 },
                Instruction::Halt,
            ]
        );
    }

    #[test]
    fn adjacent_loops_resolve_independently() {
        let program = decode("[][]").unwrap();
        assert_eq!(program.get(0), Some(Instruction::LoopOpen { close: 1 }));
        assert_eq!(program.get(2), Some(Instruction::LoopOpen { close: 3 }));
        assert_symmetric(&program);
    }

    #[test]
    fn targets_are_stream_indices_not_source_offsets() {
        let program = decode("x [ comment + ] y").unwrap();
        assert_eq!(program.get(0), Some(Instruction::LoopOpen { close: 2 }));
        assert_eq!(program.get(2), Some(Instruction::LoopClose { open: 0 }));
    }

    #[test]
    fn hello_world_targets_are_symmetric() {
        let program = decode(
            "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.",
        )
        .unwrap();
        assert_symmetric(&program);
        assert_eq!(program.instructions().last(), Some(&Instruction::Halt));
    }

    #[test]
    fn lone_close_is_unmatched() {
        assert_eq!(decode("]"), Err(DecodeError::UnmatchedClose { position: 0 }));
        assert_eq!(decode("+[]]"), Err(DecodeError::UnmatchedClose { position: 3 }));
    }

    #[test]
    fn lone_open_is_unclosed() {
        assert_eq!(decode("["), Err(DecodeError::UnclosedLoop { positions: vec![0] }));
    }

    #[test]
    fn every_unclosed_open_is_reported() {
        assert_eq!(decode("[[]"), Err(DecodeError::UnclosedLoop { positions: vec![0] }));
        assert_eq!(
            decode("[ [ [ ]"),
            Err(DecodeError::UnclosedLoop { positions: vec![0, 2] })
        );
    }

    #[test]
    fn decoding_is_deterministic() {
        let source = "+[->+<]>.";
        assert_eq!(decode(source).unwrap(), decode(source).unwrap());
        assert_eq!(source.parse::<Program>().unwrap(), decode(source).unwrap());
    }

    #[test]
    fn program_display_lists_targets() {
        let program = decode("+[-]").unwrap();
        assert_eq!(program.to_string(), "+ [->3 - ]->1 #");
    }
}
