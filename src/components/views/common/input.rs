use dioxus::prelude::*;

#[component]
pub fn ChatInput(disabled: bool, on_send: EventHandler<String>) -> Element {
    let mut input_text = use_signal(String::new);

    // Ctrl+Enter sends; plain Enter falls through and inserts a newline
    let handle_keydown = move |evt: KeyboardEvent| {
        if evt.key() == Key::Enter && evt.modifiers().contains(Modifiers::CONTROL) {
            evt.prevent_default();
            let text = input_text.read().clone();
            if !text.trim().is_empty() && !disabled {
                on_send.call(text);
                input_text.set(String::new());
            }
        }
    };

    let submit_message = move |_: MouseEvent| {
        let text = input_text.read().clone();
        if !text.trim().is_empty() && !disabled {
            on_send.call(text);
            input_text.set(String::new());
        }
    };

    let has_content = !input_text.read().trim().is_empty();

    rsx! {
        div {
            id: "user-area",
            class: "user-area",

            textarea {
                id: "input-txt",
                value: "{input_text}",
                oninput: move |evt| input_text.set(evt.value()),
                onkeydown: handle_keydown,
                placeholder: "Type your message... (Ctrl+Enter to send)",
                autofocus: true,
            }

            button {
                id: "send-button",
                class: "btn btn-primary",
                onclick: submit_message,
                disabled: !has_content || disabled,
                "Send"
            }
        }
    }
}
