use super::common::{AlertDialog, ConfirmDialog};
use crate::components::Sidebar;
use crate::utils::{
    confirm_delete, expire_status, load_prompts, load_settings, save_hotkey, save_prompt,
    save_settings, BridgeHandle, KeyPress, SettingsPage, SettingsView, StatusLine, StatusSlot,
};
use dioxus::prelude::*;

#[component]
pub fn SettingsPanel() -> Element {
    let bridge = use_context::<BridgeHandle>();
    let mut settings = use_signal(SettingsView::default);

    let load_bridge = bridge.clone();
    use_future(move || {
        let bridge = load_bridge.get();
        async move {
            load_settings(settings, &*bridge).await;
        }
    });

    let nav_bridge = bridge.clone();
    let select_page = move |page: SettingsPage| {
        settings.write().select_page(page);
        if page == SettingsPage::Prompts {
            let bridge = nav_bridge.get();
            spawn(async move {
                load_prompts(settings, &*bridge).await;
            });
        }
    };

    let delete_bridge = bridge.clone();
    let on_confirm_delete = move |_| {
        let bridge = delete_bridge.get();
        spawn(async move {
            confirm_delete(settings, &*bridge).await;
        });
    };

    let view = settings.read();
    let page = view.page;
    let alert = view.alert.clone();
    let confirm = view
        .pending_delete_name()
        .map(|name| format!("Delete the prompt \"{}\"?", name));
    drop(view);

    rsx! {
        div {
            class: "settings-panel",

            Sidebar {
                active: page,
                on_select: select_page,
            }

            div {
                class: "settings-content",
                div {
                    id: SettingsPage::Model.target_id(),
                    class: if page == SettingsPage::Model { "page active" } else { "page" },
                    ModelPage { settings }
                }
                div {
                    id: SettingsPage::Prompts.target_id(),
                    class: if page == SettingsPage::Prompts { "page active" } else { "page" },
                    PromptPage { settings }
                }
                div {
                    id: SettingsPage::Hotkey.target_id(),
                    class: if page == SettingsPage::Hotkey { "page active" } else { "page" },
                    HotkeyPage { settings }
                }
            }

            ConfirmDialog {
                message: confirm,
                on_confirm: on_confirm_delete,
                on_cancel: move |_| settings.write().cancel_delete(),
            }
            AlertDialog {
                message: alert,
                on_dismiss: move |_| settings.write().dismiss_alert(),
            }
        }
    }
}

#[component]
fn StatusText(status: Option<StatusLine>) -> Element {
    let Some(status) = status else {
        return rsx! { span { class: "status" } };
    };
    rsx! {
        span {
            class: if status.is_error { "status error" } else { "status ok" },
            "{status.text}"
        }
    }
}

#[component]
fn ModelPage(mut settings: Signal<SettingsView>) -> Element {
    let bridge = use_context::<BridgeHandle>();

    let save = move |_| {
        let bridge = bridge.get();
        spawn(async move {
            let shown = save_settings(settings, &*bridge).await;
            expire_status(settings, StatusSlot::Settings, shown).await;
        });
    };

    let view = settings.read();
    let model_name = view.model_name.clone();
    let api_key = view.api_key.clone();
    let base_url = view.base_url.clone();
    let status = view.settings_status.clone();
    drop(view);

    rsx! {
        h2 { "Model" }
        label {
            r#for: "model-name",
            "Model name"
        }
        input {
            id: "model-name",
            value: "{model_name}",
            placeholder: "gpt-4o-mini",
            oninput: move |evt| settings.write().model_name = evt.value(),
        }
        label {
            r#for: "api-key",
            "API key"
        }
        input {
            id: "api-key",
            r#type: "password",
            value: "{api_key}",
            oninput: move |evt| settings.write().api_key = evt.value(),
        }
        label {
            r#for: "base-url",
            "Base URL"
        }
        input {
            id: "base-url",
            value: "{base_url}",
            placeholder: "https://api.openai.com/v1",
            oninput: move |evt| settings.write().base_url = evt.value(),
        }
        div {
            class: "form-actions",
            button {
                id: "save-settings-btn",
                class: "btn btn-primary",
                onclick: save,
                "Save"
            }
            StatusText { status }
        }
    }
}

#[component]
fn PromptPage(mut settings: Signal<SettingsView>) -> Element {
    let bridge = use_context::<BridgeHandle>();

    let save = move |_| {
        let bridge = bridge.get();
        spawn(async move {
            save_prompt(settings, &*bridge).await;
        });
    };

    let view = settings.read();
    let prompts: Vec<(String, String)> = view
        .prompts
        .iter()
        .map(|(id, entry)| (id.clone(), entry.name.clone()))
        .collect();
    let selected = view.selected.clone();
    let form = view.prompt_form.clone();
    let name_locked = view.name_locked;
    drop(view);

    rsx! {
        h2 { "Prompts" }
        div {
            class: "prompt-manager",

            ul {
                id: "prompt-list",
                class: "prompt-list",
                for (id, name) in prompts {
                    li {
                        key: "{id}",
                        class: if selected.as_deref() == Some(id.as_str()) {
                            "prompt-list-item selected"
                        } else {
                            "prompt-list-item"
                        },
                        onclick: {
                            let id = id.clone();
                            move |_| settings.write().select_prompt(&id)
                        },
                        span { "{name}" }
                        if SettingsView::is_deletable(&id) {
                            button {
                                class: "delete-btn",
                                onclick: {
                                    let id = id.clone();
                                    move |evt: MouseEvent| {
                                        evt.stop_propagation();
                                        settings.write().request_delete(&id);
                                    }
                                },
                                "Delete"
                            }
                        }
                    }
                }
            }

            div {
                class: "prompt-form",
                input { id: "prompt-id", r#type: "hidden", value: "{form.id}" }
                label { r#for: "prompt-name", "Name" }
                input {
                    id: "prompt-name",
                    value: "{form.name}",
                    disabled: name_locked,
                    oninput: move |evt| settings.write().prompt_form.name = evt.value(),
                }
                label { r#for: "prompt-text", "Prompt" }
                textarea {
                    id: "prompt-text",
                    rows: "10",
                    value: "{form.prompt}",
                    oninput: move |evt| settings.write().prompt_form.prompt = evt.value(),
                }
                div {
                    class: "form-actions",
                    button {
                        id: "clear-prompt-form-btn",
                        class: "btn",
                        onclick: move |_| settings.write().clear_prompt_form(),
                        "New"
                    }
                    button {
                        id: "save-prompt-btn",
                        class: "btn btn-primary",
                        onclick: save,
                        "Save prompt"
                    }
                }
            }
        }
    }
}

#[component]
fn HotkeyPage(mut settings: Signal<SettingsView>) -> Element {
    let bridge = use_context::<BridgeHandle>();

    let save = move |_| {
        let bridge = bridge.get();
        spawn(async move {
            let shown = save_hotkey(settings, &*bridge).await;
            expire_status(settings, StatusSlot::Hotkey, shown).await;
        });
    };

    let capture = move |evt: KeyboardEvent| {
        evt.prevent_default();
        let modifiers = evt.modifiers();
        let mut press = KeyPress::new(evt.key().to_string());
        press.ctrl = modifiers.contains(Modifiers::CONTROL);
        press.alt = modifiers.contains(Modifiers::ALT);
        press.shift = modifiers.contains(Modifiers::SHIFT);
        settings.write().handle_hotkey_key(&press);
    };

    let view = settings.read();
    let display = view.hotkey.display.clone();
    let placeholder = view.hotkey.placeholder.clone().unwrap_or_default();
    let status = view.hotkey_status.clone();
    drop(view);

    rsx! {
        h2 { "Hotkey" }
        p { class: "muted", "Click the field and press a modifier with a letter or digit." }
        input {
            id: "hotkey-input",
            value: "{display}",
            placeholder: "{placeholder}",
            onkeydown: capture,
        }
        div {
            class: "form-actions",
            button {
                id: "save-hotkey-btn",
                class: "btn btn-primary",
                onclick: save,
                "Save hotkey"
            }
            StatusText { status }
        }
    }
}
