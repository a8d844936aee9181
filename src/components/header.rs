use crate::utils::AppView;
use dioxus::prelude::*;

#[component]
pub fn Header(view: AppView, on_switch: EventHandler<AppView>) -> Element {
    let (label, target, title) = match view {
        AppView::Chat => ("Settings", AppView::Settings, "Open settings"),
        AppView::Settings => ("Back to chat", AppView::Chat, "Return to the conversation"),
    };

    rsx! {
        header {
            class: "app-header",
            span { class: "app-title", "SimpleAI" }
            button {
                class: "btn",
                title: "{title}",
                onclick: move |_| on_switch.call(target),
                "{label}"
            }
        }
    }
}
