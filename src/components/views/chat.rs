use super::common::{ChatInput, MessageBubble, Modal};
use crate::utils::{
    open_prompt_modal, reset_response, select_prompt, submit_message, BridgeHandle, ChatView,
};
use dioxus::prelude::*;
use tracing::debug;

const SCROLL_TO_BOTTOM: &str =
    "const el = document.getElementById('ai-area'); if (el) { el.scrollTop = el.scrollHeight; }";

#[component]
pub fn ChatPanel() -> Element {
    let bridge = use_context::<BridgeHandle>();
    let mut chat = use_signal(ChatView::new);

    // Replies and notices pushed by the backend
    let events_bridge = bridge.clone();
    use_future(move || {
        let rx = events_bridge.get().events();
        async move {
            while let Ok(event) = rx.recv().await {
                debug!(?event, "backend event");
                chat.write().apply_event(event);
            }
        }
    });

    // Keep the newest bubble in view
    use_effect(move || {
        let _ = chat.read().bubbles.len();
        let _ = document::eval(SCROLL_TO_BOTTOM);
    });

    let send_bridge = bridge.clone();
    let send = move |text: String| {
        let bridge = send_bridge.get();
        spawn(async move {
            submit_message(chat, &*bridge, &text).await;
        });
    };

    let reset_bridge = bridge.clone();
    let reset = move |_| {
        let bridge = reset_bridge.get();
        spawn(async move {
            reset_response(chat, &*bridge).await;
        });
    };

    let modal_bridge = bridge.clone();
    let open_modal = move |_| {
        let bridge = modal_bridge.get();
        spawn(async move {
            open_prompt_modal(chat, &*bridge).await;
        });
    };

    let select_bridge = bridge.clone();
    let choose_prompt = use_callback(move |id: String| {
        let bridge = select_bridge.get();
        spawn(async move {
            select_prompt(chat, &*bridge, id).await;
        });
    });

    let view = chat.read();
    let bubbles = view.bubbles.clone();
    let modal = view.modal.clone();
    let sending = view.sending;
    let busy = view.is_busy();
    drop(view);

    rsx! {
        div {
            class: "chat-panel",

            div {
                id: "ai-area",
                class: "ai-area",
                for bubble in bubbles {
                    MessageBubble { key: "{bubble.id}", bubble }
                }
            }

            div {
                class: "toolbar",
                button {
                    id: "reset-button",
                    class: "btn",
                    title: "Regenerate the last answer",
                    disabled: busy,
                    onclick: reset,
                    "Regenerate"
                }
                button {
                    id: "clear-button",
                    class: "btn",
                    title: "Clear the screen",
                    onclick: move |_| chat.write().clear(),
                    "Clear"
                }
                button {
                    id: "change-prompt",
                    class: "btn",
                    title: "Choose a prompt profile",
                    onclick: open_modal,
                    "Prompt"
                }
                if sending {
                    span { class: "thinking", "Thinking..." }
                }
            }

            ChatInput { disabled: busy, on_send: send }

            Modal {
                open: modal.open,
                on_close: move |_| chat.write().close_prompt_modal(),

                div {
                    id: "prompt-area",
                    class: "prompt-area",
                    h2 { "Choose a prompt" }
                    if modal.loading {
                        p { class: "muted", "Loading..." }
                    } else {
                        ul {
                            id: "prompt-options",
                            class: "prompt-options",
                            for option in modal.options {
                                li {
                                    key: "{option.id}",
                                    "prompt-id": "{option.id}",
                                    onclick: {
                                        let id = option.id.clone();
                                        move |_| choose_prompt.call(id.clone())
                                    },
                                    "{option.name}"
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
