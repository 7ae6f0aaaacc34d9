/// Number of entries in the key-down table.
pub const KEY_TABLE_LEN: usize = 255;

/// A key as reported by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyCode {
    /// Either shift key. Stored under code 0.
    Shift,
    /// Any other key by its 8-bit code.
    Code(u8),
}

impl KeyCode {
    /// Slot in the key-down table, if the key has one.
    pub fn index(self) -> Option<u8> {
        match self {
            KeyCode::Shift => Some(0),
            KeyCode::Code(code @ 1..=254) => Some(code),
            KeyCode::Code(_) => None,
        }
    }
}

/// Host keyboard state as seen through IO ports 0-2.
#[derive(Clone, Debug)]
pub struct KeyboardState {
    down: [bool; KEY_TABLE_LEN],
    last: u8,
    selected: u8,
}

impl Default for KeyboardState {
    fn default() -> Self {
        Self {
            down: [false; KEY_TABLE_LEN],
            last: 0,
            selected: 0,
        }
    }
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press or release.
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        let Some(index) = key.index() else {
            log::trace!("Ignoring key {:?} outside the key table", key);
            return;
        };
        self.down[index as usize] = pressed;

        if pressed {
            self.last = index;
        } else if index == self.last {
            self.last = 0;
        }
    }

    pub fn is_down(&self, code: u8) -> bool {
        self.down.get(code as usize).copied().unwrap_or(false)
    }

    /// Code of the most recently pressed key, 0 when it has been released.
    pub fn last_key(&self) -> u8 {
        self.last
    }

    pub fn selected(&self) -> u8 {
        self.selected
    }

    pub fn select(&mut self, code: u8) {
        self.selected = code;
    }

    /// Port 1: whether the selected key is down.
    pub fn selected_down(&self) -> u8 {
        self.is_down(self.selected) as u8
    }

    /// Take over the host-side state of `other` but keep the selection,
    /// which belongs to the program.
    pub fn replace_host_state(&mut self, other: &KeyboardState) {
        self.down = other.down;
        self.last = other.last;
    }
}
