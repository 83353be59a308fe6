//! The editor surface the session reads code from

use parking_lot::Mutex;

/// A live text buffer owned by the UI layer. The session only holds a
/// reference while the editor is attached.
pub trait EditorSurface: Send + Sync {
    fn value(&self) -> String;

    fn set_value(&self, text: &str);
}

/// Plain in-memory editor surface
#[derive(Debug, Default)]
pub struct TextBuffer {
    text: Mutex<String>,
}

impl TextBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Mutex::new(text.into()),
        }
    }
}

impl EditorSurface for TextBuffer {
    fn value(&self) -> String {
        self.text.lock().clone()
    }

    fn set_value(&self, text: &str) {
        *self.text.lock() = text.to_string();
    }
}
