use std::env;
use std::fs;
use std::io::{self, IsTerminal, Write};

use bfvm::cli_util::{print_decode_error, print_engine_error};
use bfvm::dump::render_state;
use bfvm::{config, decode, BufReadLines, Engine, WriterSink};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "bfvm", disable_help_flag = true)]
struct Cli {
    /// Print a step-by-step table of operations while executing
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// Print the final machine state to stderr after the run
    #[arg(long = "dump")]
    dump: bool,

    /// Read Brainfuck code from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    file: Option<String>,

    /// Concatenated Brainfuck code parts
    #[arg(value_name = "code", trailing_var_arg = true, allow_hyphen_values = true)]
    code: Vec<String>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} [--debug|-d] [--dump] "<code>"        # Run Brainfuck code (args are concatenated)
  {0} [--debug|-d] [--dump] --file <PATH>   # Run Brainfuck code loaded from file

Options:
  --file,  -f <PATH>  Read Brainfuck code from PATH instead of positional "<code>"
  --debug, -d         Print a step-by-step table of operations while executing
  --dump              Print the final tape, pointers and instructions to stderr
  --help,  -h         Show this help

Notes:
- Input (`,`) reads stdin a line at a time; the run fails once stdin is exhausted.
- Characters outside of Brainfuck's ><+-.,[] are treated as comments.
- Colors for --dump are read from $XDG_CONFIG_HOME/bfvm.toml (or ${1}).

Examples:
- Load Brainfuck code from a file:
    {0} --file ./program.bf
- Echo the first char of a line:
    echo hello | {0} ",."
"#,
        program,
        config::CONFIG_ENV
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

fn run(program: &str, cli: Cli) -> i32 {
    let Cli { debug, dump, file, code, help } = cli;

    if help {
        usage_and_exit(program, 0);
    }

    if file.is_none() && code.is_empty() {
        usage_and_exit(program, 2);
    }

    if file.is_some() && !code.is_empty() {
        eprintln!("{program}: cannot use positional code together with --file");
        usage_and_exit(program, 2);
    }

    let code_str = if let Some(path) = file {
        match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{program}: failed to read code file as UTF-8: {e}");
                let _ = io::stderr().flush();
                return 1;
            }
        }
    } else {
        code.join("")
    };

    let decoded = match decode(&code_str) {
        Ok(p) => p,
        Err(err) => {
            print_decode_error(Some(program), &code_str, &err);
            return 1;
        }
    };

    let mut engine = Engine::new(decoded);
    let mut input = BufReadLines::new(io::stdin().lock());
    // Unlocked so the Ctrl+C handler can still flush stdout mid-run.
    let mut output = WriterSink::new(io::stdout());

    let result = if debug {
        let mut trace = io::stdout();
        engine.run_debug(&mut input, &mut output, &mut trace)
    } else {
        engine.run(&mut input, &mut output)
    };
    drop(output);

    // For readability, ensure output ends with a newline
    println!();
    let _ = io::stdout().flush();

    if dump {
        let stderr = io::stderr();
        let colors = stderr.is_terminal().then(config::colors);
        eprintln!("{}", render_state(&engine, colors));
        let _ = stderr.lock().flush();
    }

    match result {
        Ok(()) => 0,
        Err(err) => {
            print_engine_error(Some(program), &code_str, engine.program(), &err);
            1
        }
    }
}

fn main() {
    // We still pull the program name for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("bfvm"));

    // ',' can block on stdin forever; make Ctrl+C flush what was printed and leave.
    if let Err(e) = ctrlc::set_handler(|| {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
        std::process::exit(130);
    }) {
        eprintln!("{program}: failed to set ctrl+c handler: {e}");
        let _ = io::stderr().flush();
    }

    let cli = Cli::parse();
    std::process::exit(run(&program, cli));
}
