mod header;
pub mod views;
mod sidebar;

pub use header::Header;
pub use sidebar::Sidebar;
pub use views::{ChatPanel, SettingsPanel};
