use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// User-facing texts the interpreter emits on its own behalf.
///
/// Every field has a default, so a JSON file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Prompts {
    /// Prompt for a save block. `{name}` is replaced by the variable name.
    pub capture: String,
    /// Header above the numbered options of a choice block.
    pub choose_option: String,
    /// Header above the numbered targets when a block has several links.
    pub choose_action: String,
    /// Menu label for a link target that has no text.
    pub fallback_label: String,
    pub no_further_links: String,
    pub chat_finished: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            capture: "Enter a value for \"{name}\": ".to_string(),
            choose_option: "Choose an option:".to_string(),
            choose_action: "Choose an action:".to_string(),
            fallback_label: "Next step".to_string(),
            no_further_links: "No further links. Chat finished.".to_string(),
            chat_finished: "Chat finished.".to_string(),
        }
    }
}

impl Prompts {
    /// Load prompt overrides from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let prompts = serde_json::from_str(&content)?;
        Ok(prompts)
    }

    pub fn capture_prompt(&self, variable: &str) -> String {
        self.capture.replace("{name}", variable)
    }
}
