use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::chip8::{Chip8, VmError};
use crate::driver::{AudioDevice, DisplayDevice, InputDevice, NullDevice};

const NULL_INPUT: NullDevice = NullDevice::Input;
const NULL_DISPLAY: NullDevice = NullDevice::Display;
const NULL_SPEAKER: NullDevice = NullDevice::Audio;

pub const DEFAULT_CLOCK_FREQ: f32 = 500.0;
pub const DEFAULT_ENTRY_POINT: u16 = 0x200;

// Minimum real time between honoring two Step signals in a row, so a single keypress
// bouncing through the host's key-repeat can't fast-forward several instructions at once.
const STEP_RATE_LIMIT: Duration = Duration::from_millis(100);

/// Explicit run configuration, threaded through at construction time rather than pulled
/// from hidden globals or re-derived from CLI state deep inside the run loop.
#[derive(Clone, Debug)]
pub struct Config {
    pub rom_path: PathBuf,
    pub entry_point: u16,
    pub tick_rate: f32,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            rom_path: PathBuf::new(),
            entry_point: DEFAULT_ENTRY_POINT,
            tick_rate: DEFAULT_CLOCK_FREQ,
            seed: None,
        }
    }
}

/// Event returned by a device or a VM step, consumed by the run loop to decide what
/// to do next (present a frame, play a tone, pause, single-step, or quit).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    None,
    NewInputs,
    RefreshDisplay,
    SoundAudio,
    TogglePause,
    Step,
    ProgramExit,
}

#[derive(Debug)]
pub enum EmulatorError {
    Io(std::io::Error),
    Vm(VmError),
}

impl std::fmt::Display for EmulatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmulatorError::Io(e) => write!(f, "{}", e),
            EmulatorError::Vm(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for EmulatorError {}

impl From<std::io::Error> for EmulatorError {
    fn from(e: std::io::Error) -> Self {
        EmulatorError::Io(e)
    }
}

impl From<VmError> for EmulatorError {
    fn from(e: VmError) -> Self {
        EmulatorError::Vm(e)
    }
}

pub struct Emulator<'i, 'd, 'a> {
    // The system we're emulating -- CHIP-8
    system: Chip8,
    entry_point: u16,
    tick_rate: f32,

    input_device: &'i dyn InputDevice,
    display: &'d dyn DisplayDevice,
    speaker: &'a dyn AudioDevice,

    paused: bool,
    last_step: Instant,
}

impl<'i, 'd, 'a> Emulator<'i, 'd, 'a> {
    pub fn new(config: &Config) -> Emulator<'i, 'd, 'a> {
        if let Some(seed) = config.seed {
            fastrand::seed(seed);
        }

        Emulator {
            system: Chip8::new(config.entry_point),
            entry_point: config.entry_point,
            tick_rate: config.tick_rate,
            input_device: &NULL_INPUT,
            display: &NULL_DISPLAY,
            speaker: &NULL_SPEAKER,
            paused: false,
            last_step: Instant::now(),
        }
    }

    pub fn with_peripherals(
        config: &Config,
        input: &'i dyn InputDevice,
        display: &'d dyn DisplayDevice,
        audio: &'a dyn AudioDevice,
    ) -> Emulator<'i, 'd, 'a> {
        if let Some(seed) = config.seed {
            fastrand::seed(seed);
        }

        Emulator {
            system: Chip8::new(config.entry_point),
            entry_point: config.entry_point,
            tick_rate: config.tick_rate,
            input_device: input,
            display: display,
            speaker: audio,
            paused: false,
            last_step: Instant::now(),
        }
    }

    pub fn set_clock_speed(&mut self, hz: f32) {
        self.tick_rate = hz;
    }

    pub fn load_program(&mut self, rom_path: &std::path::Path) -> Result<(), EmulatorError> {
        let data = std::fs::read(rom_path)?;
        self.system.load_rom(&data, self.entry_point)?;
        Ok(())
    }

    fn step_cpu(&mut self) -> Result<Signal, EmulatorError> {
        let instr = self.system.fetch_instruction();
        Ok(self.system.exec_instruction(instr)?)
    }

    /// Cooperative run loop: intake host events, feed the VM's input bus, conditionally
    /// step the CPU, tick timers off the wall clock, and present only on an actual
    /// display-affecting instruction.
    pub fn run(&mut self) -> Result<(), EmulatorError> {
        let tick_duration = Duration::from_secs_f32(1.0 / self.tick_rate);

        loop {
            let host_signal = self.input_device.handle_inputs();
            if host_signal == Signal::ProgramExit {
                return Ok(());
            }
            if host_signal == Signal::TogglePause {
                self.paused = !self.paused;
            }

            self.system.receive_input(self.input_device.send_inputs());

            let cpu_signal = if !self.paused {
                self.step_cpu()?
            } else if host_signal == Signal::Step && self.last_step.elapsed() >= STEP_RATE_LIMIT {
                self.last_step = Instant::now();
                self.step_cpu()?
            } else {
                Signal::None
            };

            let timer_signal = if !self.paused {
                self.system.tick_timers(Instant::now())
            } else {
                Signal::None
            };

            self.speaker.receive_signal(timer_signal == Signal::SoundAudio);
            self.speaker.play_sound();

            if cpu_signal == Signal::RefreshDisplay {
                self.display.receive_frame(self.system.transmit_frame());
                self.display.drive_display();
            }

            std::thread::sleep(tick_duration);
        }
    }
}

impl<'i, 'd, 'a> Default for Emulator<'i, 'd, 'a> {
    fn default() -> Emulator<'i, 'd, 'a> {
        Emulator::new(&Config::default())
    }
}
