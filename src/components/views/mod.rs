mod chat;
mod common;
mod settings;

pub use chat::ChatPanel;
pub use settings::SettingsPanel;
