//! Page object configuration

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::locator::SelectorMode;

/// Number of Backspace+Delete pairs sent before retyping an item
pub const DEFAULT_CLEAR_KEYSTROKE_PAIRS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Known markup convention. When set, detection is skipped entirely.
    pub selector_mode: Option<SelectorMode>,
    /// Deletion pairs `edit_item_at_index` sends to clear the old text
    pub clear_keystroke_pairs: usize,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            selector_mode: None,
            clear_keystroke_pairs: DEFAULT_CLEAR_KEYSTROKE_PAIRS,
        }
    }
}

impl PageConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_selector_mode(mut self, mode: SelectorMode) -> Self {
        self.selector_mode = Some(mode);
        self
    }
}
