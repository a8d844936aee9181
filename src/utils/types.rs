use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Id of the built-in prompt profile. It can be edited but never renamed or deleted.
pub const DEFAULT_PROMPT_ID: &str = "default";

/// Hotkey used when the settings file does not carry one.
pub const DEFAULT_HOTKEY: &str = "ctrl+shift+a";

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AppView {
    Chat,
    Settings,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
    System,
}

impl Sender {
    pub fn css_class(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Ai => "ai",
            Sender::System => "system",
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct PromptEntry {
    pub name: String,
    pub prompt: String,
}

impl PromptEntry {
    pub fn new(name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
        }
    }
}

/// Prompt library keyed by id.
pub type PromptMap = BTreeMap<String, PromptEntry>;

/// A prompt as shown in the edit form. An empty `id` means the record has not been created yet.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct PromptRecord {
    pub id: String,
    pub name: String,
    pub prompt: String,
}

impl PromptRecord {
    pub fn is_new(&self) -> bool {
        self.id.is_empty()
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct SettingsRecord {
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub hotkey: String,
}

/// Reply to prompt mutations. On success `prompts` holds the full library after the change.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct MutationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts: Option<PromptMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MutationResponse {
    pub fn ok(prompts: PromptMap) -> Self {
        Self {
            success: true,
            prompts: Some(prompts),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            prompts: None,
            error: Some(error.into()),
        }
    }
}
