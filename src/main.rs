mod chip8;
mod driver;
mod emulator;

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use driver::{ansiterm::AnsiTerm, minifb::Minifb};
use emulator::{Config, Emulator};

// Command line arguments
struct Args {
    rom: PathBuf,
    tick_rate: f32,
    entry_point: u16,
}

fn parse_hex_or_decimal(s: &str) -> Result<u16, lexopt::Error> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse::<u16>().or_else(|_| u16::from_str_radix(s, 16)),
    };
    parsed.map_err(|_| format!("invalid value '{}' for option '--entrypoint'", s).into())
}

fn parse_args() -> Result<Args, lexopt::Error> {
    use lexopt::prelude::*;

    let help_msg = "\
USAGE:
    cargo run -- [OPTIONS] <ROM>

ARGS:
    <ROM>    Filepath to the CHIP-8 ROM to be read by the emulator. A list of
             ROMs released to the public domain can be found at:
                 - https://zophar.net/pdroms/chip8/chip-8-games-pack.html
                 - https://johnearnest.github.io/chip8Archive/?sort=platform

OPTIONS:
    -h, --help              Print this help message.
    --tickrate NUM          Set the clock rate of the emulator (Hz) to uint NUM
                              in the range 1-2000. (default: 500)
    --entrypoint ADDR       Set the address CHIP-8 execution begins at; accepts
                              decimal or 0x-prefixed hex. (default: 0x200)

KEYMAP:
    +---+---+---+---+
    | 1 | 2 | 3 | 4 |
    +---+---+---+---+
    | Q | W | E | R |
    +---+---+---+---+
    | A | S | D | F |
    +---+---+---+---+
    | Z | X | C | V |
    +---+---+---+---+

    Space: pause/resume   Shift+S: single-step (while paused)   Esc: quit";

    let mut rom = None;
    let mut tick_rate = emulator::DEFAULT_CLOCK_FREQ;
    let mut entry_point = emulator::DEFAULT_ENTRY_POINT;

    let mut parser = lexopt::Parser::from_env();

    while let Some(arg) = parser.next()? {
        match arg {
            Long("tickrate") => {
                let hz: u32 = parser.value()?.parse()?;
                if !(1..=2000).contains(&hz) {
                    return Err("out of bounds value for option '--tickrate'".into());
                }
                tick_rate = hz as f32;
            }
            Long("entrypoint") => {
                let raw = parser.value()?.string()?;
                entry_point = parse_hex_or_decimal(&raw)?;
            }
            Value(path) if rom.is_none() => {
                rom = Some(PathBuf::from(path));
            }
            Short('h') | Long("help") => {
                println!("{}", help_msg);
                std::process::exit(0);
            }
            _ => return Err(arg.unexpected()),
        }
    }

    Ok(Args {
        rom: rom.ok_or(
            "missing argument <ROM>\n
  Refer to --help for more information",
        )?,
        tick_rate,
        entry_point,
    })
}

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };

    let program_name = Path::new(&args.rom)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("rom");

    let config = Config {
        rom_path: args.rom.clone(),
        entry_point: args.entry_point,
        tick_rate: args.tick_rate,
        seed: None,
    };

    let gui = RefCell::new(Minifb::new(program_name));
    let speaker = AnsiTerm;

    let mut emu = Emulator::with_peripherals(&config, &gui, &gui, &speaker);

    if let Err(e) = emu.load_program(&config.rom_path) {
        eprintln!("error: failed to load ROM '{}': {}", config.rom_path.display(), e);
        std::process::exit(1);
    }

    if let Err(e) = emu.run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
