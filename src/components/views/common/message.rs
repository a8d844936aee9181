use crate::utils::ChatBubble;
use dioxus::prelude::*;

#[component]
pub fn MessageBubble(bubble: ChatBubble) -> Element {
    let sender = bubble.sender.css_class();

    rsx! {
        div {
            class: "ai-response {sender}",
            dangerous_inner_html: "{bubble.html}",
        }
    }
}
