//! Output screen for interpreter runs
//!
//! The host owns the screen; the interpreter only appends text and line breaks, clears
//! it, and reports a fatal error on it.

/// Output sink written by a run
pub trait Screen {
    /// Append plain text
    fn write_text(&mut self, text: &str);

    /// Start a new output line
    fn line_break(&mut self);

    /// Reset the screen to empty
    fn clear(&mut self);

    /// Replace everything on the screen with a single error line
    fn show_error(&mut self, message: &str);
}

/// In-memory screen used by tests and the command-line host
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BufferScreen {
    text: String,
    error: Option<String>,
}

impl BufferScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text written so far, line breaks as `\n`
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The error line, if the run failed
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl Screen for BufferScreen {
    fn write_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn line_break(&mut self) {
        self.text.push('\n');
    }

    fn clear(&mut self) {
        self.text.clear();
        self.error = None;
    }

    fn show_error(&mut self, message: &str) {
        self.clear();
        self.error = Some(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_and_break() {
        let mut screen = BufferScreen::new();
        screen.write_text("HI");
        screen.line_break();
        screen.write_text(" 5");
        assert_eq!(screen.text(), "HI\n 5");
        assert_eq!(screen.error(), None);
    }

    #[test]
    fn test_error_replaces_text() {
        let mut screen = BufferScreen::new();
        screen.write_text("partial output");
        screen.show_error("Error: boom function PRINT");
        assert_eq!(screen.text(), "");
        assert_eq!(screen.error(), Some("Error: boom function PRINT"));
    }
}
