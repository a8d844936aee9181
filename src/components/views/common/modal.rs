use dioxus::prelude::*;

#[component]
pub fn Modal(open: bool, on_close: EventHandler<()>, children: Element) -> Element {
    if !open {
        return rsx! {};
    }

    rsx! {
        // Backdrop: a click here, outside the content, closes the modal
        div {
            class: "modal-backdrop",
            onclick: move |_| on_close.call(()),

            div {
                class: "modal-content",
                onclick: move |e| e.stop_propagation(),

                {children}
            }
        }
    }
}

/// Blocking message with a single OK button.
#[component]
pub fn AlertDialog(message: Option<String>, on_dismiss: EventHandler<()>) -> Element {
    let open = message.is_some();
    let text = message.unwrap_or_default();

    rsx! {
        Modal {
            open,
            on_close: move |_| on_dismiss.call(()),
            div {
                class: "dialog",
                p { class: "dialog-text", "{text}" }
                div {
                    class: "dialog-actions",
                    button {
                        class: "btn btn-primary",
                        autofocus: true,
                        onclick: move |_| on_dismiss.call(()),
                        "OK"
                    }
                }
            }
        }
    }
}

/// Yes/no question. Nothing happens until one of the buttons is pressed.
#[component]
pub fn ConfirmDialog(
    message: Option<String>,
    on_confirm: EventHandler<()>,
    on_cancel: EventHandler<()>,
) -> Element {
    let open = message.is_some();
    let text = message.unwrap_or_default();

    rsx! {
        Modal {
            open,
            on_close: move |_| on_cancel.call(()),
            div {
                class: "dialog",
                p { class: "dialog-text", "{text}" }
                div {
                    class: "dialog-actions",
                    button {
                        class: "btn",
                        onclick: move |_| on_cancel.call(()),
                        "Cancel"
                    }
                    button {
                        class: "btn btn-danger",
                        onclick: move |_| on_confirm.call(()),
                        "Delete"
                    }
                }
            }
        }
    }
}
