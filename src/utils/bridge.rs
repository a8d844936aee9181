use crate::utils::{MutationResponse, PromptMap, Sender, SettingsRecord};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    #[error("Model request failed: {0}")]
    Model(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Unknown prompt profile: {0}")]
    UnknownPrompt(String),
    #[error("Invalid hotkey: {0}")]
    InvalidHotkey(String),
    #[error("Not configured: {0}")]
    NotConfigured(String),
}

/// Pushed from the backend to the chat view.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    Message { text: String, sender: Sender },
}

/// The backend surface the views are allowed to call.
#[async_trait]
pub trait Bridge: Send + Sync {
    async fn process_input(&self, text: String) -> Result<(), BridgeError>;
    async fn regenerate_response(&self) -> Result<(), BridgeError>;
    async fn set_prompt_profile(&self, id: String) -> Result<(), BridgeError>;
    async fn get_prompts(&self) -> Result<PromptMap, BridgeError>;
    async fn get_settings(&self) -> Result<Option<SettingsRecord>, BridgeError>;
    async fn save_settings(&self, settings: SettingsRecord) -> Result<(), BridgeError>;
    async fn save_prompt(
        &self,
        id: String,
        name: String,
        text: String,
    ) -> Result<MutationResponse, BridgeError>;
    async fn delete_prompt(&self, id: String) -> Result<MutationResponse, BridgeError>;
    async fn change_hotkey(&self, chord: String) -> Result<(), BridgeError>;

    /// Receiver for replies and notices produced by the backend.
    fn events(&self) -> async_channel::Receiver<BridgeEvent>;
}

/// Context value through which components reach the backend.
#[derive(Clone)]
pub struct BridgeHandle(pub Arc<dyn Bridge>);

impl BridgeHandle {
    pub fn new(bridge: Arc<dyn Bridge>) -> Self {
        Self(bridge)
    }

    pub fn get(&self) -> Arc<dyn Bridge> {
        self.0.clone()
    }
}

impl PartialEq for BridgeHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::utils::{PromptEntry, DEFAULT_PROMPT_ID};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        ProcessInput(String),
        Regenerate,
        SetPromptProfile(String),
        GetPrompts,
        GetSettings,
        SaveSettings(SettingsRecord),
        SavePrompt(String, String, String),
        DeletePrompt(String),
        ChangeHotkey(String),
    }

    /// Records every call and answers from canned state.
    pub struct MockBridge {
        pub calls: Mutex<Vec<Call>>,
        pub prompts: Mutex<PromptMap>,
        pub settings: Mutex<Option<SettingsRecord>>,
        pub fail_with: Mutex<Option<BridgeError>>,
        pub reject_mutations_with: Mutex<Option<String>>,
        rx: async_channel::Receiver<BridgeEvent>,
    }

    impl MockBridge {
        pub fn new() -> Self {
            let (_tx, rx) = async_channel::unbounded();
            let mut prompts = PromptMap::new();
            prompts.insert(
                DEFAULT_PROMPT_ID.to_string(),
                PromptEntry::new("Default", "You are a helpful assistant."),
            );
            prompts.insert(
                "code-expert".to_string(),
                PromptEntry::new("Code expert", "You write code."),
            );
            Self {
                calls: Mutex::new(Vec::new()),
                prompts: Mutex::new(prompts),
                settings: Mutex::new(None),
                fail_with: Mutex::new(None),
                reject_mutations_with: Mutex::new(None),
                rx,
            }
        }

        pub fn failing(error: BridgeError) -> Self {
            let mock = Self::new();
            *mock.fail_with.lock().unwrap() = Some(error);
            mock
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
            self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
        }

        fn record(&self, call: Call) -> Result<(), BridgeError> {
            self.calls.lock().unwrap().push(call);
            match self.fail_with.lock().unwrap().clone() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }

        fn rejection(&self) -> Option<MutationResponse> {
            self.reject_mutations_with
                .lock()
                .unwrap()
                .clone()
                .map(MutationResponse::failed)
        }
    }

    #[async_trait]
    impl Bridge for MockBridge {
        async fn process_input(&self, text: String) -> Result<(), BridgeError> {
            self.record(Call::ProcessInput(text))
        }

        async fn regenerate_response(&self) -> Result<(), BridgeError> {
            self.record(Call::Regenerate)
        }

        async fn set_prompt_profile(&self, id: String) -> Result<(), BridgeError> {
            self.record(Call::SetPromptProfile(id))
        }

        async fn get_prompts(&self) -> Result<PromptMap, BridgeError> {
            self.record(Call::GetPrompts)?;
            Ok(self.prompts.lock().unwrap().clone())
        }

        async fn get_settings(&self) -> Result<Option<SettingsRecord>, BridgeError> {
            self.record(Call::GetSettings)?;
            Ok(self.settings.lock().unwrap().clone())
        }

        async fn save_settings(&self, settings: SettingsRecord) -> Result<(), BridgeError> {
            self.record(Call::SaveSettings(settings.clone()))?;
            *self.settings.lock().unwrap() = Some(settings);
            Ok(())
        }

        async fn save_prompt(
            &self,
            id: String,
            name: String,
            text: String,
        ) -> Result<MutationResponse, BridgeError> {
            self.record(Call::SavePrompt(id.clone(), name.clone(), text.clone()))?;
            if let Some(rejected) = self.rejection() {
                return Ok(rejected);
            }
            let id = if id.is_empty() {
                format!("prompt-{}", self.prompts.lock().unwrap().len())
            } else {
                id
            };
            let mut prompts = self.prompts.lock().unwrap();
            prompts.insert(id, PromptEntry::new(name, text));
            Ok(MutationResponse::ok(prompts.clone()))
        }

        async fn delete_prompt(&self, id: String) -> Result<MutationResponse, BridgeError> {
            self.record(Call::DeletePrompt(id.clone()))?;
            if let Some(rejected) = self.rejection() {
                return Ok(rejected);
            }
            let mut prompts = self.prompts.lock().unwrap();
            prompts.remove(&id);
            Ok(MutationResponse::ok(prompts.clone()))
        }

        async fn change_hotkey(&self, chord: String) -> Result<(), BridgeError> {
            self.record(Call::ChangeHotkey(chord))
        }

        fn events(&self) -> async_channel::Receiver<BridgeEvent> {
            self.rx.clone()
        }
    }
}
