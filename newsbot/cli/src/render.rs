//! Terminal rendering of panel messages
//!
//! `Display` messages carry the whole text after every change. On a terminal
//! we only append, so the renderer tracks what it already printed and writes
//! the new suffix; a text that does not extend the printed one starts a fresh
//! response line.

use newsbot_core::{PanelMessage, Phase};

const PROMPT_PREFIX: &str = "newsci> ";

/// Turns panel messages into terminal output
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    printed: String,
    line_open: bool,
}

impl TerminalRenderer {
    /// Output for one message, or `None` if nothing needs printing
    pub fn render(&mut self, message: &PanelMessage) -> Option<String> {
        match message {
            PanelMessage::Display { text } => self.render_display(text),
            PanelMessage::PhaseChanged { to, .. } => match to {
                Phase::CoolingDown => Some(self.end_line()),
                Phase::Idle => Some(format!("{}(ready)\n", self.end_line())),
                Phase::Sending | Phase::Revealing => None,
            },
            PanelMessage::Cooldown { .. } => None,
            PanelMessage::Closed => Some(format!("{}(closed)\n", self.end_line())),
        }
    }

    fn render_display(&mut self, text: &str) -> Option<String> {
        if let Some(suffix) = text.strip_prefix(self.printed.as_str()) {
            if suffix.is_empty() {
                return None;
            }
            let mut out = String::new();
            if !self.line_open {
                out.push_str(PROMPT_PREFIX);
                self.line_open = true;
            }
            out.push_str(suffix);
            self.printed = text.to_string();
            return Some(out);
        }

        // A new reveal replaced the text
        let mut out = self.end_line();
        self.printed = text.to_string();
        if text.is_empty() {
            return (!out.is_empty()).then_some(out);
        }
        out.push_str(PROMPT_PREFIX);
        out.push_str(text);
        self.line_open = true;
        Some(out)
    }

    fn end_line(&mut self) -> String {
        if self.line_open {
            self.line_open = false;
            "\n".to_string()
        } else {
            String::new()
        }
    }
}
