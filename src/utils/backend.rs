use crate::utils::{
    is_valid_chord, Bridge, BridgeError, BridgeEvent, ChatMessage, ConfigFiles, LlmClient,
    MutationResponse, PromptEntry, PromptMap, Sender, SettingsRecord, DEFAULT_PROMPT_ID,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Anything that can answer a chat-completions request.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, BridgeError>;
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, BridgeError> {
        self.chat_completion(messages).await
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Exchange {
    question: String,
    answer: String,
}

/// One conversation under one prompt profile.
#[derive(Debug, Clone)]
struct Session {
    id: String,
    profile: String,
    system_prompt: String,
    history: Vec<Exchange>,
}

impl Session {
    fn start(profile: &str, system_prompt: &str) -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            id: format!("{}-{}", secs, uuid::Uuid::new_v4().simple()),
            profile: profile.to_string(),
            system_prompt: system_prompt.to_string(),
            history: Vec::new(),
        }
    }

    fn messages_for(&self, question: &str) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(self.system_prompt.clone())];
        for exchange in &self.history {
            messages.push(ChatMessage::user(exchange.question.clone()));
            messages.push(ChatMessage::assistant(exchange.answer.clone()));
        }
        messages.push(ChatMessage::user(question.to_string()));
        messages
    }
}

/// The in-process backend: prompt library, settings file, conversation, model calls.
pub struct LocalBackend {
    files: ConfigFiles,
    settings: Mutex<Option<SettingsRecord>>,
    prompts: Mutex<PromptMap>,
    session: Mutex<Session>,
    model: Mutex<Option<Arc<dyn ChatModel>>>,
    /// Held for a whole model turn so history stays in conversation order.
    turn: Mutex<()>,
    events_tx: async_channel::Sender<BridgeEvent>,
    events_rx: async_channel::Receiver<BridgeEvent>,
}

impl LocalBackend {
    /// Load settings and prompts from `files` and start a session on the default profile.
    pub fn open(files: ConfigFiles) -> Result<Self, BridgeError> {
        let settings = files.load_settings()?;
        let prompts = files.load_prompts()?;

        let model: Option<Arc<dyn ChatModel>> =
            match settings.as_ref().map(LlmClient::from_settings) {
                Some(Ok(client)) => {
                    info!(model = client.model(), "model client ready");
                    Some(Arc::new(client))
                }
                Some(Err(e)) => {
                    warn!("model client unavailable: {}", e);
                    None
                }
                None => None,
            };

        let default_prompt = prompts
            .get(DEFAULT_PROMPT_ID)
            .map(|p| p.prompt.clone())
            .unwrap_or_default();
        let session = Session::start(DEFAULT_PROMPT_ID, &default_prompt);
        info!(dir = %files.dir().display(), session = %session.id, "backend opened");

        let (events_tx, events_rx) = async_channel::unbounded();
        Ok(Self {
            files,
            settings: Mutex::new(settings),
            prompts: Mutex::new(prompts),
            session: Mutex::new(session),
            model: Mutex::new(model),
            turn: Mutex::new(()),
            events_tx,
            events_rx,
        })
    }

    /// Replace the model, e.g. with a stub in tests.
    pub fn with_model(self, model: Arc<dyn ChatModel>) -> Self {
        Self {
            model: Mutex::new(Some(model)),
            ..self
        }
    }

    fn emit(&self, text: String, sender: Sender) {
        if let Err(e) = self.events_tx.try_send(BridgeEvent::Message { text, sender }) {
            debug!("dropping backend event: {}", e);
        }
    }

    async fn current_model(&self) -> Result<Arc<dyn ChatModel>, BridgeError> {
        self.model.lock().await.clone().ok_or_else(|| {
            BridgeError::NotConfigured("set a model name in Settings".to_string())
        })
    }

    /// Ask the model and record the exchange if the session did not change meanwhile.
    async fn ask(&self, question: String) -> Result<(), BridgeError> {
        let model = self.current_model().await?;
        let (session_id, messages) = {
            let session = self.session.lock().await;
            (session.id.clone(), session.messages_for(&question))
        };

        let answer = model.complete(messages).await.map_err(|e| {
            error!("model call failed: {}", e);
            e
        })?;
        debug!(len = answer.len(), "model replied");

        {
            let mut session = self.session.lock().await;
            if session.id == session_id {
                session.history.push(Exchange {
                    question,
                    answer: answer.clone(),
                });
            }
        }
        self.emit(answer, Sender::Ai);
        Ok(())
    }

    async fn persist_prompts(&self, prompts: PromptMap) -> Result<(), BridgeError> {
        let files = self.files.clone();
        tokio::task::spawn_blocking(move || files.save_prompts(&prompts))
            .await
            .map_err(|e| BridgeError::Storage(format!("Task join error: {}", e)))?
    }

    async fn persist_settings(&self, settings: SettingsRecord) -> Result<(), BridgeError> {
        let files = self.files.clone();
        tokio::task::spawn_blocking(move || files.save_settings(&settings))
            .await
            .map_err(|e| BridgeError::Storage(format!("Task join error: {}", e)))?
    }
}

#[async_trait]
impl Bridge for LocalBackend {
    async fn process_input(&self, text: String) -> Result<(), BridgeError> {
        info!(len = text.len(), "received message");
        let _turn = self.turn.lock().await;
        self.ask(text).await
    }

    async fn regenerate_response(&self) -> Result<(), BridgeError> {
        let _turn = self.turn.lock().await;
        let last = self.session.lock().await.history.pop();
        let Some(last) = last else {
            return Err(BridgeError::Model("nothing to regenerate yet".to_string()));
        };
        info!("regenerating last response");

        if let Err(e) = self.ask(last.question.clone()).await {
            self.session.lock().await.history.push(last);
            return Err(e);
        }
        Ok(())
    }

    async fn set_prompt_profile(&self, id: String) -> Result<(), BridgeError> {
        let entry = self.prompts.lock().await.get(&id).cloned();
        let Some(entry) = entry else {
            error!("attempted to set an unknown prompt profile: {}", id);
            return Err(BridgeError::UnknownPrompt(id));
        };

        let session = Session::start(&id, &entry.prompt);
        info!(profile = %id, session = %session.id, "prompt profile set, new session started");
        *self.session.lock().await = session;
        self.emit(format!("AI role switched to: {}", entry.name), Sender::System);
        Ok(())
    }

    async fn get_prompts(&self) -> Result<PromptMap, BridgeError> {
        Ok(self.prompts.lock().await.clone())
    }

    async fn get_settings(&self) -> Result<Option<SettingsRecord>, BridgeError> {
        Ok(self.settings.lock().await.clone())
    }

    async fn save_settings(&self, settings: SettingsRecord) -> Result<(), BridgeError> {
        self.persist_settings(settings.clone()).await?;

        let model: Option<Arc<dyn ChatModel>> = match LlmClient::from_settings(&settings) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                warn!("model client unavailable: {}", e);
                None
            }
        };
        *self.model.lock().await = model;
        *self.settings.lock().await = Some(settings);
        info!("settings saved");
        Ok(())
    }

    async fn save_prompt(
        &self,
        id: String,
        name: String,
        text: String,
    ) -> Result<MutationResponse, BridgeError> {
        if name.trim().is_empty() || text.trim().is_empty() {
            return Ok(MutationResponse::failed("Prompt name and content cannot be empty"));
        }

        let mut prompts = self.prompts.lock().await;
        let id = if id.is_empty() {
            uuid::Uuid::new_v4().to_string()
        } else {
            match prompts.get(&id) {
                None => {
                    let error = format!("Prompt '{}' does not exist", id);
                    return Ok(MutationResponse::failed(error));
                }
                Some(existing) if id == DEFAULT_PROMPT_ID && existing.name != name => {
                    return Ok(MutationResponse::failed("The default prompt cannot be renamed"));
                }
                Some(_) => id,
            }
        };

        let previous = prompts.insert(id.clone(), PromptEntry::new(name, text));
        if let Err(e) = self.persist_prompts(prompts.clone()).await {
            error!("failed to persist prompt {}: {}", id, e);
            match previous {
                Some(old) => prompts.insert(id, old),
                None => prompts.remove(&id),
            };
            return Ok(MutationResponse::failed(e.to_string()));
        }

        info!(prompt = %id, "prompt saved");
        Ok(MutationResponse::ok(prompts.clone()))
    }

    async fn delete_prompt(&self, id: String) -> Result<MutationResponse, BridgeError> {
        if id == DEFAULT_PROMPT_ID {
            return Ok(MutationResponse::failed("The default prompt cannot be deleted"));
        }

        let mut prompts = self.prompts.lock().await;
        let Some(removed) = prompts.remove(&id) else {
            return Ok(MutationResponse::failed(format!("Prompt '{}' does not exist", id)));
        };
        if let Err(e) = self.persist_prompts(prompts.clone()).await {
            error!("failed to persist deletion of {}: {}", id, e);
            prompts.insert(id, removed);
            return Ok(MutationResponse::failed(e.to_string()));
        }
        info!(prompt = %id, "prompt deleted");

        let fallback = prompts
            .get(DEFAULT_PROMPT_ID)
            .map(|p| p.prompt.clone())
            .unwrap_or_default();
        let response = MutationResponse::ok(prompts.clone());
        drop(prompts);

        let mut session = self.session.lock().await;
        if session.profile == id {
            *session = Session::start(DEFAULT_PROMPT_ID, &fallback);
            info!(session = %session.id, "active profile deleted, back to default");
        }
        Ok(response)
    }

    async fn change_hotkey(&self, chord: String) -> Result<(), BridgeError> {
        if !is_valid_chord(&chord) {
            return Err(BridgeError::InvalidHotkey(chord));
        }

        let mut updated = self.settings.lock().await.clone().unwrap_or_default();
        updated.hotkey = chord.clone();
        self.persist_settings(updated.clone()).await?;
        *self.settings.lock().await = Some(updated);
        info!(hotkey = %chord, "hotkey changed");
        Ok(())
    }

    fn events(&self) -> async_channel::Receiver<BridgeEvent> {
        self.events_rx.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    /// Answers "reply N" and keeps every request it saw.
    struct ScriptedModel {
        requests: StdMutex<Vec<Vec<ChatMessage>>>,
        fail: bool,
    }

    impl ScriptedModel {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                requests: StdMutex::new(Vec::new()),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                requests: StdMutex::new(Vec::new()),
                fail: true,
            })
        }

        fn requests(&self) -> Vec<Vec<ChatMessage>> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, BridgeError> {
            let mut requests = self.requests.lock().unwrap();
            requests.push(messages);
            if self.fail {
                return Err(BridgeError::Model("boom".to_string()));
            }
            Ok(format!("reply {}", requests.len()))
        }
    }

    /// Records requests like `ScriptedModel` but answers only once a permit is released.
    struct GatedModel {
        requests: StdMutex<Vec<Vec<ChatMessage>>>,
        gate: tokio::sync::Semaphore,
    }

    impl GatedModel {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                requests: StdMutex::new(Vec::new()),
                gate: tokio::sync::Semaphore::new(0),
            })
        }

        fn requests(&self) -> Vec<Vec<ChatMessage>> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatModel for GatedModel {
        async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, BridgeError> {
            let n = {
                let mut requests = self.requests.lock().unwrap();
                requests.push(messages);
                requests.len()
            };
            self.gate
                .acquire()
                .await
                .map_err(|e| BridgeError::Model(e.to_string()))?
                .forget();
            Ok(format!("reply {}", n))
        }
    }

    fn backend(dir: &tempfile::TempDir, model: Arc<dyn ChatModel>) -> LocalBackend {
        LocalBackend::open(ConfigFiles::new(dir.path()))
            .unwrap()
            .with_model(model)
    }

    fn drain(backend: &LocalBackend) -> Vec<BridgeEvent> {
        let rx = backend.events();
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_reply_is_emitted_and_history_grows() {
        let dir = tempfile::tempdir().unwrap();
        let model = ScriptedModel::new();
        let backend = backend(&dir, model.clone());

        backend.process_input("first".to_string()).await.unwrap();
        backend.process_input("second".to_string()).await.unwrap();

        let requests = model.requests();
        assert_eq!(requests[0].len(), 2);
        assert_eq!(requests[0][0].role, "system");
        assert_eq!(
            requests[1],
            vec![
                ChatMessage::system("You are a helpful assistant."),
                ChatMessage::user("first"),
                ChatMessage::assistant("reply 1"),
                ChatMessage::user("second"),
            ]
        );
        assert_eq!(
            drain(&backend),
            vec![
                BridgeEvent::Message { text: "reply 1".to_string(), sender: Sender::Ai },
                BridgeEvent::Message { text: "reply 2".to_string(), sender: Sender::Ai },
            ]
        );
    }

    #[tokio::test]
    async fn test_regenerate_replaces_last_answer() {
        let dir = tempfile::tempdir().unwrap();
        let model = ScriptedModel::new();
        let backend = backend(&dir, model.clone());

        assert!(backend.regenerate_response().await.is_err());

        backend.process_input("question".to_string()).await.unwrap();
        backend.regenerate_response().await.unwrap();
        backend.process_input("next".to_string()).await.unwrap();

        let last = model.requests().pop().unwrap();
        assert_eq!(last[1], ChatMessage::user("question"));
        assert_eq!(last[2], ChatMessage::assistant("reply 2"));
        assert_eq!(last.len(), 4);
    }

    #[tokio::test]
    async fn test_regenerate_waits_for_pending_reply() {
        let dir = tempfile::tempdir().unwrap();
        let model = GatedModel::new();
        let backend = backend(&dir, model.clone());

        model.gate.add_permits(1);
        backend.process_input("q1".to_string()).await.unwrap();

        let release = async {
            for _ in 0..10 {
                tokio::task::yield_now().await;
            }
            model.gate.add_permits(2);
        };
        let (sent, regenerated, _) = tokio::join!(
            backend.process_input("q2".to_string()),
            backend.regenerate_response(),
            release
        );
        sent.unwrap();
        regenerated.unwrap();

        model.gate.add_permits(1);
        backend.process_input("q3".to_string()).await.unwrap();

        let last = model.requests().pop().unwrap();
        let questions: Vec<&str> = last
            .iter()
            .filter(|m| m.role == "user")
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(questions, vec!["q1", "q2", "q3"]);
        assert_eq!(last.len(), 6);
    }

    #[tokio::test]
    async fn test_profile_switch_starts_fresh_session() {
        let dir = tempfile::tempdir().unwrap();
        let model = ScriptedModel::new();
        let backend = backend(&dir, model.clone());

        backend.process_input("hello".to_string()).await.unwrap();
        backend.set_prompt_profile("code-expert".to_string()).await.unwrap();
        backend.process_input("write code".to_string()).await.unwrap();

        let last = model.requests().pop().unwrap();
        assert_eq!(last.len(), 2);
        assert!(last[0].content.contains("programmer"));
        assert!(drain(&backend).contains(&BridgeEvent::Message {
            text: "AI role switched to: Code expert".to_string(),
            sender: Sender::System,
        }));

        let err = backend.set_prompt_profile("nope".to_string()).await;
        assert_eq!(err, Err(BridgeError::UnknownPrompt("nope".to_string())));
    }

    #[tokio::test]
    async fn test_model_failure_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let backend = backend(&dir, ScriptedModel::failing());

        let result = backend.process_input("hi".to_string()).await;

        assert!(matches!(result, Err(BridgeError::Model(_))));
        assert!(drain(&backend).is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_model_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::open(ConfigFiles::new(dir.path())).unwrap();

        let result = backend.process_input("hi".to_string()).await;

        assert!(matches!(result, Err(BridgeError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn test_create_update_and_delete_prompt_persist() {
        let dir = tempfile::tempdir().unwrap();
        let backend = backend(&dir, ScriptedModel::new());

        let created = backend
            .save_prompt(String::new(), "Poet".to_string(), "Rhyme.".to_string())
            .await
            .unwrap();
        assert!(created.success);
        let prompts = created.prompts.unwrap();
        let (new_id, _) = prompts.iter().find(|(_, p)| p.name == "Poet").unwrap();
        assert!(!new_id.is_empty());

        let updated = backend
            .save_prompt(new_id.clone(), "Poet".to_string(), "Haiku only.".to_string())
            .await
            .unwrap();
        assert_eq!(updated.prompts.unwrap()[new_id].prompt, "Haiku only.");

        let reopened = LocalBackend::open(ConfigFiles::new(dir.path())).unwrap();
        assert_eq!(reopened.get_prompts().await.unwrap()[new_id].prompt, "Haiku only.");

        let deleted = backend.delete_prompt(new_id.clone()).await.unwrap();
        assert!(deleted.success);
        assert!(!deleted.prompts.unwrap().contains_key(new_id));
    }

    #[tokio::test]
    async fn test_default_prompt_rules() {
        let dir = tempfile::tempdir().unwrap();
        let backend = backend(&dir, ScriptedModel::new());

        let renamed = backend
            .save_prompt(DEFAULT_PROMPT_ID.to_string(), "Other".to_string(), "x".to_string())
            .await
            .unwrap();
        assert!(!renamed.success);
        assert!(renamed.error.unwrap().contains("renamed"));

        let edited = backend
            .save_prompt(
                DEFAULT_PROMPT_ID.to_string(),
                "Default".to_string(),
                "Be brief.".to_string(),
            )
            .await
            .unwrap();
        assert!(edited.success);

        let deleted = backend.delete_prompt(DEFAULT_PROMPT_ID.to_string()).await.unwrap();
        assert!(!deleted.success);
        assert!(backend.get_prompts().await.unwrap().contains_key(DEFAULT_PROMPT_ID));
    }

    #[tokio::test]
    async fn test_invalid_prompt_mutations() {
        let dir = tempfile::tempdir().unwrap();
        let backend = backend(&dir, ScriptedModel::new());

        let empty = backend
            .save_prompt(String::new(), " ".to_string(), "text".to_string())
            .await
            .unwrap();
        assert!(!empty.success);

        let missing = backend.delete_prompt("ghost".to_string()).await.unwrap();
        assert!(!missing.success);
        assert!(missing.error.unwrap().contains("ghost"));
    }

    #[tokio::test]
    async fn test_settings_and_hotkey_persist() {
        let dir = tempfile::tempdir().unwrap();
        let backend = backend(&dir, ScriptedModel::new());
        assert_eq!(backend.get_settings().await.unwrap(), None);

        backend
            .save_settings(SettingsRecord {
                model_name: "gpt-4o-mini".to_string(),
                api_key: "sk-test".to_string(),
                base_url: String::new(),
                hotkey: "ctrl+shift+a".to_string(),
            })
            .await
            .unwrap();
        backend.change_hotkey("alt+k".to_string()).await.unwrap();
        assert_eq!(
            backend.change_hotkey("k".to_string()).await,
            Err(BridgeError::InvalidHotkey("k".to_string()))
        );

        let stored = ConfigFiles::new(dir.path()).load_settings().unwrap().unwrap();
        assert_eq!(stored.model_name, "gpt-4o-mini");
        assert_eq!(stored.hotkey, "alt+k");
    }
}
