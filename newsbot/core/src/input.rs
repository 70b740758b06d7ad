//! Draft Input
//!
//! Holds the question being typed. Length is counted in characters, not
//! bytes, so a draft of accented or non-Latin text gets the same allowance.

use crate::session::Phase;

/// Owns the draft text and its length limit
#[derive(Clone, Debug)]
pub struct InputController {
    draft: String,
    max_len: usize,
}

impl InputController {
    /// Empty draft with a character limit
    #[must_use]
    pub fn new(max_len: usize) -> Self {
        Self {
            draft: String::new(),
            max_len,
        }
    }

    /// Store `raw`, truncated to the limit
    ///
    /// Always an overwrite; typing during a cooldown is allowed.
    pub fn set_draft(&mut self, raw: &str) {
        self.draft = match raw.char_indices().nth(self.max_len) {
            Some((cut, _)) => raw[..cut].to_string(),
            None => raw.to_string(),
        };
    }

    /// Current draft
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Character limit
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Draft length in characters
    pub fn char_count(&self) -> usize {
        self.draft.chars().count()
    }

    /// `"n/max"`, shown under the input field
    pub fn counter_label(&self) -> String {
        format!("{}/{}", self.char_count(), self.max_len)
    }

    /// Draft nonempty and the panel idle
    pub fn can_submit(&self, phase: Phase) -> bool {
        !self.draft.is_empty() && phase == Phase::Idle
    }
}
