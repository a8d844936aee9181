use crate::utils::SettingsPage;
use dioxus::prelude::*;

/// Left-hand navigation of the settings window. Exactly one item is active.
#[component]
pub fn Sidebar(active: SettingsPage, on_select: EventHandler<SettingsPage>) -> Element {
    rsx! {
        nav {
            class: "settings-sidebar",
            ul {
                for page in SettingsPage::all() {
                    li {
                        key: "{page.target_id()}",
                        class: if page == active { "nav-item active" } else { "nav-item" },
                        "data-target": page.target_id(),
                        onclick: move |_| on_select.call(page),
                        "{page.label()}"
                    }
                }
            }
        }
    }
}
