use std::fmt;

pub const KEY_COUNT: usize = 16;

/// The hexadecimal keypad, `0-F`. The host owns the state, the
/// interpreter only reads it.
#[derive(Debug, Default)]
pub struct Keyboard {
    pressed_keys: [bool; KEY_COUNT],
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unknown keys are never pressed.
    pub fn is_pressed(&self, key: u8) -> bool {
        self.pressed_keys.get(key as usize).copied().unwrap_or(false)
    }

    /// Returns `false` if `key` is not on the keypad.
    pub fn press_key(&mut self, key: u8) -> bool {
        match self.pressed_keys.get_mut(key as usize) {
            Some(pressed) => {
                *pressed = true;
                true
            }
            None => false,
        }
    }

    pub fn release_key(&mut self, key: u8) {
        if let Some(pressed) = self.pressed_keys.get_mut(key as usize) {
            *pressed = false;
        }
    }
}

impl fmt::Display for Keyboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pressed_keys.map(|k| if k { "o" } else { " " }).join(""))
    }
}
