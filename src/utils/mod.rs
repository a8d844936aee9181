mod backend;
pub mod bridge;
mod chat_view;
mod formatting;
mod hotkey;
mod llm;
mod logging;
mod settings;
mod settings_view;
mod types;
mod view_state;

pub use backend::LocalBackend;
pub use bridge::{Bridge, BridgeError, BridgeEvent, BridgeHandle};
pub use chat_view::{
    open_prompt_modal, reset_response, select_prompt, submit_message, ChatBubble, ChatView,
};
pub use formatting::markdown_to_html;
pub use hotkey::{is_valid_chord, HotkeyCapture, KeyPress};
pub use llm::{ChatMessage, LlmClient};
pub use logging::init_tracing;
pub use settings::ConfigFiles;
pub use settings_view::{
    confirm_delete, expire_status, load_prompts, load_settings, save_hotkey, save_prompt,
    save_settings, SettingsPage, SettingsView, StatusLine, StatusSlot,
};
pub use types::{
    AppView, MutationResponse, PromptEntry, PromptMap, PromptRecord, Sender, SettingsRecord,
    DEFAULT_HOTKEY, DEFAULT_PROMPT_ID,
};
pub use view_state::ViewHandle;
