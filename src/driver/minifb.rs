use std::cell::RefCell;

use bitvec::{bitarr, slice::BitSlice, BitArr};

use crate::{
    chip8::{DISPLAY_HEIGHT, DISPLAY_WIDTH, NUM_KEYS},
    driver::{DisplayDevice, DisplayInfo, InputDevice, InputInfo, InputMsg},
    driver::{KEY_DOWN, KEY_UP, PX_OFF, PX_ON},
    emulator::Signal,
};

// minifb::Window pixels use ARGB encoding;
// alpha-channel (MSB) is ignored => 0RGB
const PX_OFF_COLOR: u32 = 0x1E1C2D;
const PX_ON_COLOR: u32 = 0xE0DEF4;

// minifb::Scale only offers power-of-two multipliers, but the window is spec'd at a fixed
// 640x320 (10x); so the window is opened at native resolution and every CHIP-8 pixel is
// manually replicated into a 10x10 block in the output framebuffer.
const WINDOW_SCALE: usize = 10;
const WINDOW_WIDTH: usize = DISPLAY_WIDTH * WINDOW_SCALE;
const WINDOW_HEIGHT: usize = DISPLAY_HEIGHT * WINDOW_SCALE;

pub struct Minifb {
    // GUI window
    window: minifb::Window,
    // Auxiliary frame buffer, upscaled to the window's native pixel dimensions
    framebuf: [u32; WINDOW_WIDTH * WINDOW_HEIGHT],
    // Tx input buffer
    keybuf: BitArr!(for NUM_KEYS),
    // Edge detection for the run-control keys, so a held key fires its signal once
    space_down: bool,
    step_down: bool,
}

impl Minifb {
    pub fn new(name: &str) -> Self {
        Minifb {
            window: minifb::Window::new(
                &("CHIP-8: ".to_owned() + name),
                WINDOW_WIDTH,
                WINDOW_HEIGHT,
                minifb::WindowOptions {
                    resize: true,
                    scale: minifb::Scale::X1,
                    ..Default::default()
                },
            )
            .expect("GUI window creation failed"),

            framebuf: [0; WINDOW_WIDTH * WINDOW_HEIGHT],
            keybuf: bitarr![0; NUM_KEYS],
            space_down: false,
            step_down: false,
        }
    }

    //
    //    Keyboard                   CHIP-8
    //    +---+---+---+---+          +---+---+---+---+
    //    | 1 | 2 | 3 | 4 |          | 1 | 2 | 3 | C |
    //    +---+---+---+---+          +---+---+---+---+
    //    | Q | W | E | R |          | 4 | 5 | 6 | D |
    //    +---+---+---+---+    =>    +---+---+---+---+
    //    | A | S | D | F |          | 7 | 8 | 9 | E |
    //    +---+---+---+---+          +---+---+---+---+
    //    | Z | X | C | V |          | A | 0 | B | F |
    //    +---+---+---+---+          +---+---+---+---+
    //
    //    Space: pause/resume   Shift+S: single-step (while paused)   Esc: quit
    //    (Shift+S, not S alone, since S is already mapped to hex key 8)
    //
    fn handle_inputs(&mut self) -> Signal {
        let prev_state = self.keybuf;
        self.keybuf.fill(KEY_UP);

        if !self.window.is_open() || self.window.is_key_down(minifb::Key::Escape) {
            return Signal::ProgramExit;
        }

        self.window.get_keys().iter().for_each(|key| match key {
            minifb::Key::Key1 => self.keybuf.set(0x1, KEY_DOWN),
            minifb::Key::Key2 => self.keybuf.set(0x2, KEY_DOWN),
            minifb::Key::Key3 => self.keybuf.set(0x3, KEY_DOWN),
            minifb::Key::Key4 => self.keybuf.set(0xC, KEY_DOWN),
            minifb::Key::Q => self.keybuf.set(0x4, KEY_DOWN),
            minifb::Key::W => self.keybuf.set(0x5, KEY_DOWN),
            minifb::Key::E => self.keybuf.set(0x6, KEY_DOWN),
            minifb::Key::R => self.keybuf.set(0xD, KEY_DOWN),
            minifb::Key::A => self.keybuf.set(0x7, KEY_DOWN),
            minifb::Key::S => self.keybuf.set(0x8, KEY_DOWN),
            minifb::Key::D => self.keybuf.set(0x9, KEY_DOWN),
            minifb::Key::F => self.keybuf.set(0xE, KEY_DOWN),
            minifb::Key::Z => self.keybuf.set(0xA, KEY_DOWN),
            minifb::Key::X => self.keybuf.set(0x0, KEY_DOWN),
            minifb::Key::C => self.keybuf.set(0xB, KEY_DOWN),
            minifb::Key::V => self.keybuf.set(0xF, KEY_DOWN),
            _ => (),
        });

        let space_down = self.window.is_key_down(minifb::Key::Space);
        let space_pressed = space_down && !self.space_down;
        self.space_down = space_down;
        if space_pressed {
            return Signal::TogglePause;
        }

        let step_key_down = self.window.is_key_down(minifb::Key::S) && self.window.is_key_down(minifb::Key::LeftShift);
        let step_pressed = step_key_down && !self.step_down;
        self.step_down = step_key_down;
        if step_pressed {
            return Signal::Step;
        }

        if self.keybuf != prev_state {
            Signal::NewInputs
        } else {
            Signal::None
        }
    }

    fn send_inputs(&self) -> Option<InputMsg> {
        Some(self.keybuf)
    }

    fn input_info(&self) -> InputInfo {
        InputInfo::Minifb
    }

    fn receive_frame(&mut self, frame: &BitSlice<usize>) {
        for (idx, pixel) in frame.iter().enumerate() {
            let color = match *pixel {
                PX_OFF => PX_OFF_COLOR,
                PX_ON => PX_ON_COLOR,
            };
            let row = idx / DISPLAY_WIDTH;
            let col = idx % DISPLAY_WIDTH;

            for dy in 0..WINDOW_SCALE {
                let out_row = row * WINDOW_SCALE + dy;
                let base = out_row * WINDOW_WIDTH + col * WINDOW_SCALE;
                self.framebuf[base..base + WINDOW_SCALE].fill(color);
            }
        }
    }

    fn drive_display(&mut self) {
        self.window
            .update_with_buffer(&self.framebuf, WINDOW_WIDTH, WINDOW_HEIGHT)
            .unwrap();
    }
}

// `Minifb` plays both the input and display roles for the same physical window, so the
// run loop holds it behind a `RefCell` and borrows it mutably only for the duration of
// each call; these impls exist on `RefCell<Minifb>` rather than `Minifb` so two shared
// `&dyn` references (one per trait) can coexist without aliasing a `&mut Minifb`.
impl InputDevice for RefCell<Minifb> {
    fn device_info(&self) -> InputInfo {
        self.borrow().input_info()
    }
    fn handle_inputs(&self) -> Signal {
        self.borrow_mut().handle_inputs()
    }
    fn send_inputs(&self) -> Option<InputMsg> {
        self.borrow().send_inputs()
    }
}

impl DisplayDevice for RefCell<Minifb> {
    fn device_info(&self) -> DisplayInfo {
        self.borrow().display_info()
    }
    fn receive_frame(&self, frame: &BitSlice<usize>) {
        self.borrow_mut().receive_frame(frame)
    }
    fn drive_display(&self) {
        self.borrow_mut().drive_display()
    }
}

impl Minifb {
    fn display_info(&self) -> DisplayInfo {
        DisplayInfo::Minifb
    }
}
