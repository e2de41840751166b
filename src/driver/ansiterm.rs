use crate::driver::{AudioDevice, AudioInfo};

// Spec explicitly permits a silent sound timer; this is the simplest audible stand-in,
// ringing the terminal bell rather than pulling in a native audio backend.
pub struct AnsiTerm;

impl AudioDevice for AnsiTerm {
    fn device_info(&self) -> AudioInfo {
        AudioInfo::AnsiTerm
    }

    fn receive_signal(&self, data: bool) {
        if data {
            print!("\x07");
        }
    }

    fn play_sound(&self) {}
}
