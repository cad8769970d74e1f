use crate::game::MAX_NAME_LEN;

/// Text buffer behind the game-over name prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameEntry {
    buffer: String,
}

impl NameEntry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a printable character; input past `MAX_NAME_LEN` is ignored.
    pub fn push(&mut self, c: char) -> bool {
        if c.is_control() || self.buffer.chars().count() >= MAX_NAME_LEN {
            return false;
        }
        self.buffer.push(c);
        true
    }

    pub fn backspace(&mut self) {
        self.buffer.pop();
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Hands over the typed name and clears the buffer for the next prompt.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }
}
