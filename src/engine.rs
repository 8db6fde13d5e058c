//! The execution engine.
//!
//! An [`Engine`] owns a decoded [`Program`], a growable tape, both pointers and
//! the pending input queue. Behavior:
//! - The tape starts empty and grows by one zero cell when a step begins with
//!   the data pointer one past its end.
//! - `<` at cell 0 is a no-op; `+`/`-` wrap modulo 256.
//! - `.` emits the cell as a char (`u8 as char`), no newline.
//! - `,` pulls a whole line from the input source when nothing is buffered and
//!   stores the next char's code point (mod 256).
//! - Execution stops when the instruction pointer reaches [`Instruction::Halt`].

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, Write};

use crate::decoder::{Instruction, Program};
use crate::io::{LineSource, OutputSink};

/// Errors that can occur while executing a program.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The instruction pointer does not address a cell of the stream.
    #[error("Instruction pointer out of bounds at {ip}")]
    OutOfBounds { ip: usize },

    /// The input source or output sink failed.
    #[error("I/O error at instruction {ip}: {source}")]
    Io { ip: usize, #[source] source: io::Error },
}

/// A running Brainfuck machine.
pub struct Engine {
    program: Program,
    memory: Vec<u8>,
    memory_pointer: usize,
    instruction_pointer: usize,
    pending_input: VecDeque<char>,
}

impl Engine {
    pub fn new(program: Program) -> Self {
        Self {
            program,
            memory: Vec::new(),
            memory_pointer: 0,
            instruction_pointer: 0,
            pending_input: VecDeque::new(),
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Cells touched so far. Untouched cells beyond the end are implicitly zero.
    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    pub fn memory_pointer(&self) -> usize {
        self.memory_pointer
    }

    pub fn instruction_pointer(&self) -> usize {
        self.instruction_pointer
    }

    /// Value under the data pointer, zero if the tape has not grown that far yet.
    pub fn current_cell(&self) -> u8 {
        self.memory.get(self.memory_pointer).copied().unwrap_or(0)
    }

    /// True once the instruction pointer sits on the terminator.
    pub fn is_halted(&self) -> bool {
        matches!(self.program.get(self.instruction_pointer), Some(Instruction::Halt))
    }

    /// Execute the program until it halts.
    pub fn run<I, O>(&mut self, input: &mut I, output: &mut O) -> Result<(), EngineError>
    where
        I: LineSource + ?Sized,
        O: OutputSink + ?Sized,
    {
        while !self.is_halted() {
            self.step(input, output)?;
        }
        self.flush(output)
    }

    /// Debug-run the program, writing a step-by-step table of operations to
    /// `trace`. State advances exactly as in [`Engine::run`], except that `.`
    /// is logged in the table instead of being sent to `output`.
    pub fn run_debug<I, O, W>(
        &mut self,
        input: &mut I,
        output: &mut O,
        trace: &mut W,
    ) -> Result<(), EngineError>
    where
        I: LineSource + ?Sized,
        O: OutputSink + ?Sized,
        W: Write + ?Sized,
    {
        let trace_err = |ip: usize| move |source: io::Error| EngineError::Io { ip, source };

        writeln!(trace, "STEP | IP  | PTR | CELL | INSTR | ACTION").map_err(trace_err(0))?;
        writeln!(trace, "-----+-----+-----+------+-------+------------------------------------------------")
            .map_err(trace_err(0))?;

        let mut step: usize = 0;
        while !self.is_halted() {
            let ip = self.instruction_pointer;
            let instr = self.fetch()?;
            let (ptr_before, cell_before) = (self.memory_pointer, self.current_cell());

            let action = if instr == Instruction::Output {
                self.grow_tape();
                self.instruction_pointer += 1;
                format!("Output byte '{}' (suppressed in debug)", self.current_cell() as char)
            } else {
                self.step(input, output)?;
                self.describe(instr, ip, ptr_before, cell_before)
            };

            writeln!(
                trace,
                "{:<4} | {:<3} | {:<3} | {:<4} |  {}    | {}",
                step,
                ip,
                ptr_before,
                cell_before,
                instr.symbol(),
                action
            )
            .map_err(trace_err(ip))?;
            step += 1;
        }

        trace.flush().map_err(trace_err(self.instruction_pointer))?;
        self.flush(output)
    }

    /// Execute exactly one instruction.
    ///
    /// Calling this on a halted engine is a no-op.
    pub fn step<I, O>(&mut self, input: &mut I, output: &mut O) -> Result<(), EngineError>
    where
        I: LineSource + ?Sized,
        O: OutputSink + ?Sized,
    {
        let instr = self.fetch()?;
        if instr == Instruction::Halt {
            return Ok(());
        }

        self.grow_tape();
        let ip = self.instruction_pointer;
        let ptr = self.memory_pointer;

        match instr {
            Instruction::Right => self.memory_pointer += 1,
            Instruction::Left => self.memory_pointer = self.memory_pointer.saturating_sub(1),
            Instruction::Increment => self.memory[ptr] = self.memory[ptr].wrapping_add(1),
            Instruction::Decrement => self.memory[ptr] = self.memory[ptr].wrapping_sub(1),
            Instruction::Output => output
                .write_char(self.memory[ptr] as char)
                .map_err(|source| EngineError::Io { ip, source })?,
            Instruction::Input => {
                let ch = self.next_input_char(input).map_err(|source| EngineError::Io { ip, source })?;
                self.memory[ptr] = (u32::from(ch) & 0xFF) as u8;
            }
            Instruction::LoopOpen { close } => {
                if self.memory[ptr] == 0 {
                    self.instruction_pointer = close;
                }
            }
            Instruction::LoopClose { open } => {
                if self.memory[ptr] != 0 {
                    self.instruction_pointer = open;
                }
            }
            Instruction::Halt => {}
        }

        self.instruction_pointer += 1;
        Ok(())
    }

    fn fetch(&self) -> Result<Instruction, EngineError> {
        self.program
            .get(self.instruction_pointer)
            .ok_or(EngineError::OutOfBounds { ip: self.instruction_pointer })
    }

    fn grow_tape(&mut self) {
        if self.memory_pointer == self.memory.len() {
            self.memory.push(0);
        }
    }

    /// Next buffered input char, pulling lines until one is non-empty.
    fn next_input_char<I>(&mut self, input: &mut I) -> io::Result<char>
    where
        I: LineSource + ?Sized,
    {
        loop {
            if let Some(ch) = self.pending_input.pop_front() {
                return Ok(ch);
            }
            let line = input.next_line()?;
            self.pending_input.extend(line.chars());
        }
    }

    fn flush<O>(&self, output: &mut O) -> Result<(), EngineError>
    where
        O: OutputSink + ?Sized,
    {
        output
            .flush()
            .map_err(|source| EngineError::Io { ip: self.instruction_pointer, source })
    }

    fn describe(&self, instr: Instruction, ip: usize, ptr_before: usize, cell_before: u8) -> String {
        let cell = self.current_cell();
        match instr {
            Instruction::Right | Instruction::Left => {
                format!("Moved pointer head to index {}", self.memory_pointer)
            }
            Instruction::Increment => {
                format!("Increment cell[{}] from {} to {}", ptr_before, cell_before, cell)
            }
            Instruction::Decrement => {
                format!("Decrement cell[{}] from {} to {}", ptr_before, cell_before, cell)
            }
            Instruction::Input => format!("Read byte from input -> {}", cell),
            Instruction::LoopOpen { close } if self.instruction_pointer == close + 1 => {
                format!("Cell is 0; jump forward to matching ']' at IP {}", close)
            }
            Instruction::LoopOpen { .. } => "Enter loop (cell != 0)".to_string(),
            Instruction::LoopClose { open } if self.instruction_pointer != ip + 1 => {
                format!("Cell != 0; jump back to matching '[' at IP {}", open)
            }
            Instruction::LoopClose { .. } => "Exit loop (cell is 0)".to_string(),
            Instruction::Output | Instruction::Halt => String::new(),
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "memory: {:?}", self.memory)?;
        writeln!(f, "memory_pointer: {}", self.memory_pointer)?;
        writeln!(f, "instruction_pointer: {}", self.instruction_pointer)?;
        write!(f, "instructions: {}", self.program)
    }
}
