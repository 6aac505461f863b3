// session controller - one request in, one response out
// clear/exit answered first so they work with the model down

use crate::classifier::{classify, Mode};
use crate::command::{execute, CommandRegistry, Outcome, Sentinel};
use crate::config::RouterConfig;
use crate::error::ModelError;
use crate::model::{LanguageModel, ModelPrompt, ModelReply, Sleep};
use crate::replay::ReplayCache;
use futures::future::{self, Either};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One message in the conversation. Never edited once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub sender: Sender,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    pub query: String,
    #[serde(default)]
    pub history: Vec<Turn>,
}

impl TurnRequest {
    pub fn new(query: impl Into<String>, history: Vec<Turn>) -> Self {
        Self {
            query: query.into(),
            history,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResponse {
    /// Terminal output, a chat reply, or a sentinel token.
    pub relevant_data: String,
}

impl TurnResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            relevant_data: text.into(),
        }
    }

    pub fn sentinel(&self) -> Option<Sentinel> {
        Sentinel::from_token(&self.relevant_data)
    }
}

impl From<Sentinel> for TurnResponse {
    fn from(sentinel: Sentinel) -> Self {
        Self::text(sentinel.as_str())
    }
}

/// Drops Private Mode user turns and the bot turns that answered them, so
/// nothing the terminal printed can reach the model.
pub fn public_transcript(history: &[Turn]) -> Vec<Turn> {
    let mut transcript = Vec::new();
    let mut skip_reply = false;
    for turn in history {
        match turn.sender {
            Sender::User => {
                skip_reply = classify(&turn.text).is_private();
                if !skip_reply {
                    transcript.push(turn.clone());
                }
            }
            Sender::Bot => {
                if !skip_reply {
                    transcript.push(turn.clone());
                }
                skip_reply = false;
            }
        }
    }
    transcript
}

pub struct SessionController<M, S> {
    config: RouterConfig,
    registry: CommandRegistry,
    model: M,
    sleeper: S,
    cache: ReplayCache,
    session_id: Uuid,
    ended: bool,
}

impl<M: LanguageModel, S: Sleep> SessionController<M, S> {
    pub fn new(config: RouterConfig, model: M, sleeper: S) -> Self {
        let session_id = Uuid::new_v4();
        info!("vault session {} started", session_id);
        Self {
            config,
            registry: CommandRegistry::default_commands(),
            model,
            sleeper,
            cache: ReplayCache::new(),
            session_id,
            ended: false,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Working directory after replaying `history`.
    pub fn current_directory(&mut self, history: &[Turn]) -> String {
        self.cache.snapshot_for(history, &self.config, &self.registry).cwd
    }

    pub async fn handle_turn(&mut self, request: TurnRequest) -> TurnResponse {
        let history: &[Turn] = if self.ended {
            self.start_fresh_session();
            &[]
        } else {
            &request.history
        };

        let query = request.query.trim();
        if query.is_empty() {
            return TurnResponse::text("");
        }

        match classify(query) {
            Mode::Private { command } => self.run_private(&command, history),
            Mode::Public => self.run_public(query, history).await,
        }
    }

    fn start_fresh_session(&mut self) {
        let previous = self.session_id;
        self.session_id = Uuid::new_v4();
        self.ended = false;
        self.cache.reset();
        info!(
            "vault session {} started after {} ended; supplied history ignored",
            self.session_id, previous
        );
    }

    fn run_private(&mut self, command: &str, history: &[Turn]) -> TurnResponse {
        // sentinels first, no replay needed
        if let Some(sentinel) = Sentinel::from_command(command) {
            return self.apply_sentinel(sentinel);
        }

        let snapshot = self.cache.snapshot_for(history, &self.config, &self.registry);
        let (_next, outcome) = execute(&snapshot, command, &self.registry);
        debug!("session {}: ran '{}' in {}", self.session_id, command, snapshot.cwd);
        match outcome {
            Outcome::Output(text) => TurnResponse::text(text),
            Outcome::Sentinel(sentinel) => self.apply_sentinel(sentinel),
        }
    }

    fn apply_sentinel(&mut self, sentinel: Sentinel) -> TurnResponse {
        match sentinel {
            Sentinel::ClearScreen => {
                info!("session {}: screen cleared", self.session_id);
                self.cache.reset();
            }
            Sentinel::ExitSession => {
                info!("session {}: ended", self.session_id);
                self.ended = true;
                self.cache.reset();
            }
        }
        sentinel.into()
    }

    async fn run_public(&self, query: &str, history: &[Turn]) -> TurnResponse {
        let prompt = ModelPrompt {
            system: self.config.system_prompt.clone(),
            transcript: public_transcript(history),
            query: query.to_string(),
            tool_schema: None,
        };
        debug!(
            "session {}: public query ({} chars, {} transcript turns)",
            self.session_id,
            query.len(),
            prompt.transcript.len()
        );

        let timeout = self.config.model_timeout();
        let reply = match future::select(self.model.complete(&prompt), self.sleeper.sleep(timeout)).await {
            Either::Left((reply, _)) => reply,
            Either::Right(((), _)) => Err(ModelError::Timeout(timeout)),
        };

        match reply {
            // chat replies never pass as sentinels
            Ok(ModelReply::Text(text)) if Sentinel::from_token(text.trim()).is_some() => {
                warn!("session {}: refused sentinel token in model reply", self.session_id);
                TurnResponse::text(self.config.empty_reply_message.clone())
            }
            Ok(ModelReply::Text(text)) if !text.trim().is_empty() => TurnResponse::text(text),
            Ok(ModelReply::Text(_)) => TurnResponse::text(self.config.empty_reply_message.clone()),
            Ok(ModelReply::ToolCall(call)) => {
                warn!(
                    "session {}: refused tool call '{}' in public mode",
                    self.session_id, call.name
                );
                TurnResponse::text(self.config.empty_reply_message.clone())
            }
            Err(e) => {
                warn!("session {}: {}", self.session_id, e);
                TurnResponse::text(self.config.apology_message.clone())
            }
        }
    }
}

/// The conversation as a chat surface holds it: a greeting on screen plus
/// the history array that travels with every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    greeting: String,
    turns: Vec<Turn>,
    ended: bool,
}

impl Session {
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            greeting: greeting.into(),
            turns: Vec::new(),
            ended: false,
        }
    }

    pub fn history(&self) -> &[Turn] {
        &self.turns
    }

    /// What the screen shows: greeting first, then every turn.
    pub fn visible(&self) -> Vec<Turn> {
        let mut visible = vec![Turn::bot(self.greeting.clone())];
        visible.extend(self.turns.iter().cloned());
        visible
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn request(&self, query: impl Into<String>) -> TurnRequest {
        TurnRequest::new(query, self.turns.clone())
    }

    /// Fold a response into the session.
    pub fn apply(&mut self, query: &str, response: &TurnResponse) {
        if self.ended {
            self.turns.clear();
            self.ended = false;
        }
        match response.sentinel() {
            Some(Sentinel::ClearScreen) => self.turns.clear(),
            Some(Sentinel::ExitSession) => {
                self.turns.clear();
                self.ended = true;
            }
            None => {
                self.turns.push(Turn::user(query));
                self.turns.push(Turn::bot(response.relevant_data.clone()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OfflineModel;
    use futures::executor::block_on;
    use futures::future::{FutureExt, LocalBoxFuture};
    use std::cell::RefCell;
    use std::time::Duration;

    /// Model double that records prompts and answers from a script.
    struct ScriptedModel {
        reply: Result<ModelReply, ModelError>,
        prompts: RefCell<Vec<ModelPrompt>>,
    }

    impl ScriptedModel {
        fn new(reply: Result<ModelReply, ModelError>) -> Self {
            Self {
                reply,
                prompts: RefCell::new(Vec::new()),
            }
        }
    }

    impl LanguageModel for ScriptedModel {
        fn complete<'a>(&'a self, prompt: &'a ModelPrompt) -> LocalBoxFuture<'a, Result<ModelReply, ModelError>> {
            self.prompts.borrow_mut().push(prompt.clone());
            let reply = self.reply.clone();
            async move { reply }.boxed_local()
        }
    }

    /// Model that never answers.
    struct HangingModel;

    impl LanguageModel for HangingModel {
        fn complete<'a>(&'a self, _prompt: &'a ModelPrompt) -> LocalBoxFuture<'a, Result<ModelReply, ModelError>> {
            future::pending().boxed_local()
        }
    }

    struct NeverSleep;

    impl Sleep for NeverSleep {
        fn sleep(&self, _duration: Duration) -> LocalBoxFuture<'static, ()> {
            future::pending().boxed_local()
        }
    }

    struct InstantSleep;

    impl Sleep for InstantSleep {
        fn sleep(&self, _duration: Duration) -> LocalBoxFuture<'static, ()> {
            future::ready(()).boxed_local()
        }
    }

    fn controller<M: LanguageModel>(model: M) -> SessionController<M, NeverSleep> {
        SessionController::new(RouterConfig::default(), model, NeverSleep)
    }

    #[test]
    fn test_public_query_goes_to_model() {
        let mut ctrl = controller(ScriptedModel::new(Ok(ModelReply::Text("Paris.".to_string()))));
        let response = block_on(ctrl.handle_turn(TurnRequest::new("What's the capital of France?", vec![])));
        assert_eq!(response, TurnResponse::text("Paris."));
        let prompts = ctrl.model.prompts.borrow();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].query, "What's the capital of France?");
        assert!(prompts[0].tool_schema.is_none());
    }

    #[test]
    fn test_private_command_skips_model() {
        let mut ctrl = controller(ScriptedModel::new(Ok(ModelReply::Text("nope".to_string()))));
        let response = block_on(ctrl.handle_turn(TurnRequest::new("pwd", vec![])));
        assert_eq!(response, TurnResponse::text("/"));
        assert!(ctrl.model.prompts.borrow().is_empty());
    }

    #[test]
    fn test_model_error_returns_apology() {
        let mut ctrl = controller(ScriptedModel::new(Err(ModelError::Unavailable("503".to_string()))));
        let response = block_on(ctrl.handle_turn(TurnRequest::new("hello", vec![])));
        assert_eq!(response.relevant_data, RouterConfig::default().apology_message);
    }

    #[test]
    fn test_model_timeout_returns_apology() {
        let mut ctrl = SessionController::new(RouterConfig::default(), HangingModel, InstantSleep);
        let response = block_on(ctrl.handle_turn(TurnRequest::new("hello", vec![])));
        assert_eq!(response.relevant_data, RouterConfig::default().apology_message);
    }

    #[test]
    fn test_tool_call_refused_in_public_mode() {
        let call = ToolCallFixture::scan();
        let mut ctrl = controller(ScriptedModel::new(Ok(ModelReply::ToolCall(call))));
        let response = block_on(ctrl.handle_turn(TurnRequest::new("show me my contacts", vec![])));
        assert_eq!(response.relevant_data, "No relevant data found.");
    }

    struct ToolCallFixture;

    impl ToolCallFixture {
        fn scan() -> crate::model::ToolInvocation {
            crate::model::ToolInvocation {
                name: "scanEncryptedResources".to_string(),
                arguments: serde_json::json!({"query": "contacts"}),
            }
        }
    }

    #[test]
    fn test_empty_model_reply() {
        let mut ctrl = controller(ScriptedModel::new(Ok(ModelReply::Text("  ".to_string()))));
        let response = block_on(ctrl.handle_turn(TurnRequest::new("hello", vec![])));
        assert_eq!(response.relevant_data, "No relevant data found.");
    }

    #[test]
    fn test_model_reply_cannot_be_a_sentinel() {
        for token in ["CLEAR_SCREEN", "EXIT_SESSION", " CLEAR_SCREEN\n"] {
            let mut ctrl = controller(ScriptedModel::new(Ok(ModelReply::Text(token.to_string()))));
            let response = block_on(ctrl.handle_turn(TurnRequest::new("tell me a joke", vec![])));
            assert_eq!(response.relevant_data, "No relevant data found.");
            assert_eq!(response.sentinel(), None);
            assert!(!ctrl.is_ended());
        }
    }

    #[test]
    fn test_blank_query() {
        let mut ctrl = controller(ScriptedModel::new(Ok(ModelReply::Text("x".to_string()))));
        let response = block_on(ctrl.handle_turn(TurnRequest::new("   ", vec![])));
        assert_eq!(response, TurnResponse::text(""));
        assert!(ctrl.model.prompts.borrow().is_empty());
    }

    #[test]
    fn test_sentinels_bypass_model() {
        let mut ctrl = controller(HangingModel);
        let response = block_on(ctrl.handle_turn(TurnRequest::new("clear", vec![Turn::user("mkdir x")])));
        assert_eq!(response.relevant_data, "CLEAR_SCREEN");
        let response = block_on(ctrl.handle_turn(TurnRequest::new("EXIT", vec![])));
        assert_eq!(response.relevant_data, "EXIT_SESSION");
        assert!(ctrl.is_ended());
    }

    #[test]
    fn test_exit_starts_fresh_session() {
        let mut ctrl = controller(OfflineModel::default());
        let first = ctrl.session_id();
        block_on(ctrl.handle_turn(TurnRequest::new("exit", vec![])));
        let history = vec![Turn::user("cd vault"), Turn::bot("")];
        let response = block_on(ctrl.handle_turn(TurnRequest::new("pwd", history)));
        assert_eq!(response.relevant_data, "/");
        assert_ne!(ctrl.session_id(), first);
        assert!(!ctrl.is_ended());
    }

    #[test]
    fn test_transcript_hides_terminal_exchanges() {
        let history = vec![
            Turn::user("hi"),
            Turn::bot("hello!"),
            Turn::user("cat vault/contacts.json"),
            Turn::bot("{ \"secret\": true }"),
            Turn::user("thanks"),
            Turn::bot("any time"),
        ];
        let transcript = public_transcript(&history);
        assert_eq!(
            transcript,
            vec![Turn::user("hi"), Turn::bot("hello!"), Turn::user("thanks"), Turn::bot("any time")]
        );

        let mut ctrl = controller(ScriptedModel::new(Ok(ModelReply::Text("ok".to_string()))));
        block_on(ctrl.handle_turn(TurnRequest::new("what did I open?", history)));
        let prompts = ctrl.model.prompts.borrow();
        assert!(prompts[0].transcript.iter().all(|t| !t.text.contains("secret")));
    }

    #[test]
    fn test_session_applies_responses() {
        let mut session = Session::new("hello");
        session.apply("mkdir docs", &TurnResponse::text(""));
        assert_eq!(session.history(), &[Turn::user("mkdir docs"), Turn::bot("")]);
        assert_eq!(session.visible().len(), 3);

        session.apply("clear", &Sentinel::ClearScreen.into());
        assert!(session.history().is_empty());
        assert_eq!(session.visible(), vec![Turn::bot("hello")]);

        session.apply("ls", &TurnResponse::text("readme.txt  vault"));
        session.apply("exit", &Sentinel::ExitSession.into());
        assert!(session.is_ended());
        assert!(session.history().is_empty());

        session.apply("pwd", &TurnResponse::text("/"));
        assert!(!session.is_ended());
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn test_request_wire_format() {
        let request: TurnRequest = serde_json::from_str(
            r#"{"query": "ls", "history": [{"sender": "user", "text": "mkdir a"}, {"sender": "bot", "text": ""}]}"#,
        )
        .unwrap();
        assert_eq!(request.history[0], Turn::user("mkdir a"));
        let bare: TurnRequest = serde_json::from_str(r#"{"query": "ls"}"#).unwrap();
        assert!(bare.history.is_empty());
        let response = serde_json::to_string(&TurnResponse::text("x")).unwrap();
        assert_eq!(response, r#"{"relevantData":"x"}"#);
    }
}
