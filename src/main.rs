use dioxus::prelude::*;

mod components;
mod utils;

use components::{ChatPanel, Header, SettingsPanel};
use std::sync::Arc;
use utils::{init_tracing, AppView, BridgeHandle, ConfigFiles, LocalBackend};

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    init_tracing();

    let backend = match ConfigFiles::from_env().and_then(LocalBackend::open) {
        Ok(backend) => backend,
        Err(e) => {
            tracing::error!("failed to start backend: {}", e);
            std::process::exit(1);
        }
    };
    let bridge = BridgeHandle::new(Arc::new(backend));

    dioxus::LaunchBuilder::new()
        .with_context(bridge)
        .launch(App);
}

#[component]
fn App() -> Element {
    let mut current_view = use_signal(|| AppView::Chat);
    let view = *current_view.read();

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        div {
            class: "app",

            Header {
                view,
                on_switch: move |next| current_view.set(next),
            }

            main {
                class: "app-main",
                // Chat stays mounted so the conversation survives a trip to settings;
                // settings remount and reload from the backend every time
                div {
                    class: if view == AppView::Chat { "view active" } else { "view" },
                    ChatPanel {}
                }
                if view == AppView::Settings {
                    div {
                        class: "view active",
                        SettingsPanel {}
                    }
                }
            }
        }
    }
}
