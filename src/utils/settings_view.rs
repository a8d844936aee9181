use crate::utils::{
    Bridge, BridgeError, HotkeyCapture, KeyPress, PromptMap, PromptRecord, SettingsRecord,
    ViewHandle, DEFAULT_HOTKEY, DEFAULT_PROMPT_ID,
};
use std::time::Duration;
use tracing::{info, warn};

/// How long a status line stays visible after a save.
pub const STATUS_DURATION: Duration = Duration::from_secs(2);

pub const EMPTY_PROMPT_ALERT: &str = "Prompt name and content cannot be empty!";
pub const PROMPT_SAVED_ALERT: &str = "Prompt saved.";
pub const PROMPT_DELETED_ALERT: &str = "Prompt deleted.";
pub const SETTINGS_SAVED: &str = "Settings saved.";
pub const HOTKEY_SAVED: &str = "Hotkey saved.";
pub const HOTKEY_MISSING: &str = "Please set a valid hotkey first.";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SettingsPage {
    Model,
    Prompts,
    Hotkey,
}

impl SettingsPage {
    pub fn all() -> Vec<SettingsPage> {
        vec![SettingsPage::Model, SettingsPage::Prompts, SettingsPage::Hotkey]
    }

    pub fn label(&self) -> &'static str {
        match self {
            SettingsPage::Model => "Model",
            SettingsPage::Prompts => "Prompts",
            SettingsPage::Hotkey => "Hotkey",
        }
    }

    pub fn target_id(&self) -> &'static str {
        match self {
            SettingsPage::Model => "model-settings",
            SettingsPage::Prompts => "prompt-settings",
            SettingsPage::Hotkey => "hotkey-settings",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

impl StatusLine {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusSlot {
    Settings,
    Hotkey,
}

/// State of the settings window.
///
/// `prompts` is a local copy of the backend library. It is replaced wholesale
/// after every load and every successful mutation, never patched in place.
#[derive(Clone, Debug, PartialEq)]
pub struct SettingsView {
    pub model_name: String,
    pub api_key: String,
    pub base_url: String,
    pub stored_hotkey: String,
    pub page: SettingsPage,
    pub prompts: PromptMap,
    pub prompt_form: PromptRecord,
    pub selected: Option<String>,
    pub name_locked: bool,
    pub hotkey: HotkeyCapture,
    pub settings_status: Option<StatusLine>,
    pub hotkey_status: Option<StatusLine>,
    pub pending_delete: Option<String>,
    pub alert: Option<String>,
}

impl Default for SettingsView {
    fn default() -> Self {
        Self {
            model_name: String::new(),
            api_key: String::new(),
            base_url: String::new(),
            stored_hotkey: DEFAULT_HOTKEY.to_string(),
            page: SettingsPage::Model,
            prompts: PromptMap::new(),
            prompt_form: PromptRecord::default(),
            selected: None,
            name_locked: false,
            hotkey: HotkeyCapture::showing(DEFAULT_HOTKEY),
            settings_status: None,
            hotkey_status: None,
            pending_delete: None,
            alert: None,
        }
    }
}

impl SettingsView {
    pub fn apply_settings(&mut self, settings: SettingsRecord) {
        self.model_name = settings.model_name;
        self.api_key = settings.api_key;
        self.base_url = settings.base_url;
        self.stored_hotkey = if settings.hotkey.is_empty() {
            DEFAULT_HOTKEY.to_string()
        } else {
            settings.hotkey
        };
        self.hotkey = HotkeyCapture::showing(self.stored_hotkey.clone());
    }

    pub fn settings_record(&self) -> SettingsRecord {
        SettingsRecord {
            model_name: self.model_name.clone(),
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            hotkey: self.stored_hotkey.clone(),
        }
    }

    pub fn select_page(&mut self, page: SettingsPage) {
        self.page = page;
    }

    pub fn replace_prompts(&mut self, prompts: PromptMap) {
        if let Some(id) = &self.selected {
            if !prompts.contains_key(id) {
                self.clear_prompt_form();
            }
        }
        self.prompts = prompts;
    }

    fn apply_prompts(&mut self, prompts: Result<PromptMap, BridgeError>) {
        match prompts {
            Ok(prompts) => self.replace_prompts(prompts),
            Err(e) => {
                warn!("get_prompts failed: {}", e);
                self.alert = Some(format!("Could not load prompts: {}", e));
            }
        }
    }

    pub fn select_prompt(&mut self, id: &str) {
        let Some(entry) = self.prompts.get(id) else {
            return;
        };
        self.prompt_form = PromptRecord {
            id: id.to_string(),
            name: entry.name.clone(),
            prompt: entry.prompt.clone(),
        };
        self.selected = Some(id.to_string());
        self.name_locked = id == DEFAULT_PROMPT_ID;
    }

    pub fn clear_prompt_form(&mut self) {
        self.prompt_form = PromptRecord::default();
        self.selected = None;
        self.name_locked = false;
    }

    pub fn is_deletable(id: &str) -> bool {
        id != DEFAULT_PROMPT_ID
    }

    pub fn request_delete(&mut self, id: &str) {
        if Self::is_deletable(id) && self.prompts.contains_key(id) {
            self.pending_delete = Some(id.to_string());
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Name of the prompt awaiting delete confirmation.
    pub fn pending_delete_name(&self) -> Option<String> {
        let id = self.pending_delete.as_ref()?;
        Some(
            self.prompts
                .get(id)
                .map(|entry| entry.name.clone())
                .unwrap_or_else(|| id.clone()),
        )
    }

    pub fn handle_hotkey_key(&mut self, press: &KeyPress) {
        self.hotkey.handle(press);
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    fn status_mut(&mut self, slot: StatusSlot) -> &mut Option<StatusLine> {
        match slot {
            StatusSlot::Settings => &mut self.settings_status,
            StatusSlot::Hotkey => &mut self.hotkey_status,
        }
    }
}

/// Fill the form from the backend. Runs once the window is mounted.
pub async fn load_settings(mut view: impl ViewHandle<SettingsView>, bridge: &dyn Bridge) {
    let (settings, prompts) = futures::join!(bridge.get_settings(), bridge.get_prompts());
    view.update(|v| {
        match settings {
            Ok(Some(settings)) => v.apply_settings(settings),
            Ok(None) => info!("no stored settings yet"),
            Err(e) => {
                warn!("get_settings failed: {}", e);
                let text = format!("Could not load settings: {}", e);
                v.settings_status = Some(StatusLine::error(text));
            }
        }
        v.apply_prompts(prompts);
    });
}

pub async fn load_prompts(mut view: impl ViewHandle<SettingsView>, bridge: &dyn Bridge) {
    let prompts = bridge.get_prompts().await;
    view.update(|v| v.apply_prompts(prompts));
}

pub async fn save_settings(
    mut view: impl ViewHandle<SettingsView>,
    bridge: &dyn Bridge,
) -> StatusLine {
    let record = view.read_with(|v| v.settings_record());
    let status = match bridge.save_settings(record).await {
        Ok(()) => StatusLine::ok(SETTINGS_SAVED),
        Err(e) => {
            warn!("save_settings failed: {}", e);
            StatusLine::error(format!("Save failed: {}", e))
        }
    };
    view.update(|v| v.settings_status = Some(status.clone()));
    status
}

pub async fn save_prompt(mut view: impl ViewHandle<SettingsView>, bridge: &dyn Bridge) {
    let form = view.read_with(|v| v.prompt_form.clone());
    if form.name.is_empty() || form.prompt.is_empty() {
        view.update(|v| v.alert = Some(EMPTY_PROMPT_ALERT.to_string()));
        return;
    }

    let result = bridge
        .save_prompt(form.id.clone(), form.name.clone(), form.prompt.clone())
        .await;
    view.update(|v| match result {
        Ok(response) if response.success => {
            v.replace_prompts(response.prompts.unwrap_or_default());
            if form.is_new() {
                v.clear_prompt_form();
            }
            v.alert = Some(PROMPT_SAVED_ALERT.to_string());
        }
        Ok(response) => {
            let error = response.error.unwrap_or_else(|| "unknown error".to_string());
            v.alert = Some(format!("Save failed: {}", error));
        }
        Err(e) => {
            warn!("save_prompt failed: {}", e);
            v.alert = Some(format!("Save failed: {}", e));
        }
    });
}

pub async fn confirm_delete(mut view: impl ViewHandle<SettingsView>, bridge: &dyn Bridge) {
    let Some(id) = view.update(|v| v.pending_delete.take()) else {
        return;
    };

    let result = bridge.delete_prompt(id).await;
    view.update(|v| match result {
        Ok(response) if response.success => {
            v.replace_prompts(response.prompts.unwrap_or_default());
            v.clear_prompt_form();
            v.alert = Some(PROMPT_DELETED_ALERT.to_string());
        }
        Ok(response) => {
            let error = response.error.unwrap_or_else(|| "unknown error".to_string());
            v.alert = Some(format!("Delete failed: {}", error));
        }
        Err(e) => {
            warn!("delete_prompt failed: {}", e);
            v.alert = Some(format!("Delete failed: {}", e));
        }
    });
}

pub async fn save_hotkey(
    mut view: impl ViewHandle<SettingsView>,
    bridge: &dyn Bridge,
) -> StatusLine {
    let chord = view.read_with(|v| v.hotkey.committed.clone());
    let status = if chord.is_empty() {
        StatusLine::error(HOTKEY_MISSING)
    } else {
        match bridge.change_hotkey(chord.clone()).await {
            Ok(()) => {
                view.update(|v| v.stored_hotkey = chord);
                StatusLine::ok(HOTKEY_SAVED)
            }
            Err(e) => {
                warn!("change_hotkey failed: {}", e);
                StatusLine::error(format!("Save failed: {}", e))
            }
        }
    };
    view.update(|v| v.hotkey_status = Some(status.clone()));
    status
}

/// Clear a status line after `STATUS_DURATION`, unless it was replaced meanwhile.
pub async fn expire_status(
    mut view: impl ViewHandle<SettingsView>,
    slot: StatusSlot,
    shown: StatusLine,
) {
    tokio::time::sleep(STATUS_DURATION).await;
    view.update(|v| {
        let status = v.status_mut(slot);
        if status.as_ref() == Some(&shown) {
            *status = None;
        }
    });
}
