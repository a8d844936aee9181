use crate::utils::{
    markdown_to_html, Bridge, BridgeError, BridgeEvent, PromptMap, Sender, ViewHandle,
};
use tracing::{debug, warn};

pub const GREETING: &str = "Hello! I'm your AI assistant. How can I help you today?";

#[derive(Clone, Debug, PartialEq)]
pub struct ChatBubble {
    pub id: usize,
    pub sender: Sender,
    pub text: String,
    pub html: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PromptOption {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct PromptModal {
    pub open: bool,
    pub loading: bool,
    pub options: Vec<PromptOption>,
}

/// State of the chat panel.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatView {
    pub bubbles: Vec<ChatBubble>,
    pub modal: PromptModal,
    pub sending: bool,
    pub regenerating: bool,
    next_id: usize,
}

impl Default for ChatView {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatView {
    /// A panel showing only the greeting.
    pub fn new() -> Self {
        let mut view = Self {
            bubbles: Vec::new(),
            modal: PromptModal::default(),
            sending: false,
            regenerating: false,
            next_id: 0,
        };
        view.add_message(GREETING, Sender::Ai);
        view
    }

    pub fn add_message(&mut self, text: &str, sender: Sender) {
        let id = self.next_id;
        self.next_id += 1;
        self.bubbles.push(ChatBubble {
            id,
            sender,
            text: text.to_string(),
            html: markdown_to_html(text),
        });
    }

    pub fn apply_event(&mut self, event: BridgeEvent) {
        match event {
            BridgeEvent::Message { text, sender } => self.add_message(&text, sender),
        }
    }

    /// Append the user's message and return what should go to the backend, if anything.
    pub fn begin_submit(&mut self, raw: &str) -> Option<String> {
        let message = raw.trim();
        if message.is_empty() || self.is_busy() {
            return None;
        }
        self.add_message(message, Sender::User);
        self.sending = true;
        Some(message.to_string())
    }

    /// True while a send or a regeneration is waiting on the backend.
    pub fn is_busy(&self) -> bool {
        self.sending || self.regenerating
    }

    /// Drop the trailing assistant bubble. Returns false while another turn is in flight.
    pub fn begin_reset(&mut self) -> bool {
        if self.is_busy() {
            return false;
        }
        if matches!(self.bubbles.last(), Some(b) if b.sender == Sender::Ai) {
            self.bubbles.pop();
        }
        self.regenerating = true;
        true
    }

    pub fn clear(&mut self) {
        self.bubbles.clear();
        self.add_message(GREETING, Sender::Ai);
    }

    pub fn report_error(&mut self, err: &BridgeError) {
        self.add_message(&format!("Request failed: {}", err), Sender::System);
    }

    pub fn set_prompt_options(&mut self, prompts: &PromptMap) {
        self.modal.options = prompts
            .iter()
            .map(|(id, entry)| PromptOption {
                id: id.clone(),
                name: entry.name.clone(),
            })
            .collect();
    }

    pub fn close_prompt_modal(&mut self) {
        self.modal.open = false;
        self.modal.loading = false;
    }
}

pub async fn submit_message(
    mut view: impl ViewHandle<ChatView>,
    bridge: &dyn Bridge,
    raw: &str,
) {
    let Some(message) = view.update(|v| v.begin_submit(raw)) else {
        return;
    };
    debug!(len = message.len(), "forwarding message");
    let result = bridge.process_input(message).await;
    view.update(|v| {
        v.sending = false;
        if let Err(e) = &result {
            warn!("process_input failed: {}", e);
            v.report_error(e);
        }
    });
}

pub async fn reset_response(mut view: impl ViewHandle<ChatView>, bridge: &dyn Bridge) {
    if !view.update(|v| v.begin_reset()) {
        return;
    }
    let result = bridge.regenerate_response().await;
    view.update(|v| {
        v.regenerating = false;
        if let Err(e) = &result {
            warn!("regenerate_response failed: {}", e);
            v.report_error(e);
        }
    });
}

pub async fn open_prompt_modal(mut view: impl ViewHandle<ChatView>, bridge: &dyn Bridge) {
    view.update(|v| {
        v.modal.open = true;
        v.modal.loading = true;
    });
    let result = bridge.get_prompts().await;
    view.update(|v| {
        v.modal.loading = false;
        match &result {
            Ok(prompts) => v.set_prompt_options(prompts),
            Err(e) => {
                warn!("get_prompts failed: {}", e);
                v.close_prompt_modal();
                v.report_error(e);
            }
        }
    });
}

pub async fn select_prompt(mut view: impl ViewHandle<ChatView>, bridge: &dyn Bridge, id: String) {
    let result = bridge.set_prompt_profile(id).await;
    view.update(|v| {
        v.close_prompt_modal();
        if let Err(e) = &result {
            warn!("set_prompt_profile failed: {}", e);
            v.report_error(e);
        }
    });
}
