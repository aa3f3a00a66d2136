//! Joypad register (0xFF00). Select lines (bits 4/5) and the four button
//! lines (bits 0-3) are active-low on real hardware: a 0 bit means
//! "selected"/"pressed".

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InputKey {
    Start,
    Select,
    A,
    B,
    Up,
    Down,
    Left,
    Right,
}

impl InputKey {
    fn is_direction(self) -> bool {
        matches!(self, InputKey::Up | InputKey::Down | InputKey::Left | InputKey::Right)
    }

    /// Bit position within its own (button or direction) nibble.
    fn bit(self) -> u8 {
        match self {
            InputKey::Right | InputKey::A => 0,
            InputKey::Left | InputKey::B => 1,
            InputKey::Up | InputKey::Select => 2,
            InputKey::Down | InputKey::Start => 3,
        }
    }
}

pub const JOYPAD_ADDRESS: u16 = 0xFF00;

#[derive(Debug, Default, Clone)]
pub struct Joypad {
    /// Bit set = pressed, direction group (Right,Left,Up,Down).
    directions: u8,
    /// Bit set = pressed, button group (A,B,Select,Start).
    buttons: u8,
    select_directions: bool,
    select_buttons: bool,
}

impl Joypad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> u8 {
        let mut active_low = 0x0F;
        if self.select_buttons {
            active_low &= !self.buttons & 0x0F;
        }
        if self.select_directions {
            active_low &= !self.directions & 0x0F;
        }

        let select_bits = (!self.select_directions as u8) << 4 | (!self.select_buttons as u8) << 5;
        0xC0 | select_bits | active_low
    }

    /// Only bits 4/5 (the selection lines) are writable.
    pub fn write(&mut self, value: u8) {
        self.select_directions = value & 0b0001_0000 == 0;
        self.select_buttons = value & 0b0010_0000 == 0;
    }

    /// Host-facing `setJoypadState`: one byte, active high, bits 0-3 the
    /// direction group (Right,Left,Up,Down) and bits 4-7 the button group
    /// (A,B,Select,Start) -- whichever order a frontend's input poll produces.
    pub fn set_state(&mut self, byte: u8) {
        self.directions = byte & 0x0F;
        self.buttons = (byte >> 4) & 0x0F;
    }

    pub fn press_key(&mut self, key: InputKey) {
        if key.is_direction() {
            self.directions |= 1 << key.bit();
        } else {
            self.buttons |= 1 << key.bit();
        }
    }

    pub fn release_key(&mut self, key: InputKey) {
        if key.is_direction() {
            self.directions &= !(1 << key.bit());
        } else {
            self.buttons &= !(1 << key.bit());
        }
    }

    /// True if a currently-selected group has any key held; the bus uses this
    /// to raise the Joypad interrupt on selection/press changes.
    pub fn any_selected_pressed(&self) -> bool {
        (self.select_buttons && self.buttons != 0) || (self.select_directions && self.directions != 0)
    }
}
