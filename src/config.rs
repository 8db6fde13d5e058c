//! Color configuration for the state dump and CLI error messages.
//!
//! Colors are read from `bfvm.toml` in the XDG config home, or from the file
//! named by `BFVM_CONFIG`. Only a `[colors]` section is recognized:
//!
//! ```toml
//! [colors]
//! tape_cell_pointer = "#f9e2af"
//! instr_current = "yellow"
//! ```

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use cross_xdg::BaseDirs;
use nu_ansi_term::Color;

pub const CONFIG_ENV: &str = "BFVM_CONFIG";
const CONFIG_FILE: &str = "bfvm.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Colors {
    pub label: Color,
    pub tape_cell_zero: Color,
    pub tape_cell_nonzero: Color,
    pub tape_cell_pointer: Color,

    pub instr_op: Color,       // '>' '<' '+' '-' '.' ','
    pub instr_bracket: Color,  // '[' and ']'
    pub instr_halt: Color,
    pub instr_current: Color,

    pub error: Color,
}

impl Default for Colors {
    fn default() -> Self {
        // Catppuccin Mocha accents
        Self {
            label: Color::Rgb(137, 180, 250),
            tape_cell_zero: Color::Rgb(108, 112, 134),
            tape_cell_nonzero: Color::Rgb(205, 214, 244),
            tape_cell_pointer: Color::Rgb(249, 226, 175),

            instr_op: Color::Rgb(148, 226, 213),
            instr_bracket: Color::Rgb(203, 166, 247),
            instr_halt: Color::Rgb(108, 112, 134),
            instr_current: Color::Rgb(250, 179, 135),

            error: Color::Rgb(243, 139, 168),
        }
    }
}

static COLORS: OnceLock<Colors> = OnceLock::new();

pub fn colors() -> &'static Colors {
    COLORS.get_or_init(|| {
        config_path()
            .and_then(|path| fs::read_to_string(path).ok())
            .map(|content| parse_colors(&content))
            .unwrap_or_default()
    })
}

fn config_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }

    // Linux: ~/.config, Windows: C:\Users\<user>\.config, macOS: ~/.config
    let base_dirs = BaseDirs::new().into_iter().next()?;
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push(CONFIG_FILE);
    Some(path)
}

pub fn parse_color(value: &str) -> Option<Color> {
    let s = value.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        return Some(Color::Rgb(r, g, b));
    }

    Some(match s.to_ascii_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "purple" | "magenta" => Color::Purple,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "gray" | "grey" | "darkgray" | "dark_gray" | "darkgrey" | "dark_grey" => Color::DarkGray,
        "lightred" | "light_red" => Color::LightRed,
        "lightgreen" | "light_green" => Color::LightGreen,
        "lightyellow" | "light_yellow" => Color::LightYellow,
        "lightblue" | "light_blue" => Color::LightBlue,
        "lightpurple" | "light_purple" | "lightmagenta" | "light_magenta" => Color::LightPurple,
        "lightcyan" | "light_cyan" => Color::LightCyan,
        "lightgray" | "light_gray" | "lightgrey" | "light_grey" => Color::LightGray,
        _ => return None,
    })
}

/// Parse the `[colors]` section of a config file, keeping defaults for
/// anything missing or unparsable.
pub fn parse_colors(content: &str) -> Colors {
    // Very small hand-rolled parser: `key = value` pairs under [colors].
    let mut in_colors = false;
    let mut map: HashMap<&str, &str> = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_colors = section.trim() == "colors";
            continue;
        }
        if !in_colors {
            continue;
        }
        if let Some((key, raw)) = line.split_once('=') {
            let raw = raw.trim();
            let val = raw
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(raw);
            map.insert(key.trim(), val);
        }
    }

    let mut cfg = Colors::default();

    macro_rules! set {
        ($field:ident) => {
            if let Some(v) = map.get(stringify!($field)).and_then(|s| parse_color(s)) {
                cfg.$field = v;
            }
        };
    }

    set!(label);
    set!(tape_cell_zero);
    set!(tape_cell_nonzero);
    set!(tape_cell_pointer);
    set!(instr_op);
    set!(instr_bracket);
    set!(instr_halt);
    set!(instr_current);
    set!(error);

    cfg
}
