// secured-data chat router with a fake shell over a virtual vault
// chat goes to the model, terminal commands never leave this crate
pub mod classifier;
pub mod command;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod model;
pub mod replay;
pub mod session;
pub mod vfs;

pub use classifier::{classify, is_command, Mode};
pub use command::{CommandRegistry, Outcome, Sentinel};
pub use config::RouterConfig;
pub use context::{FilesystemSnapshot, TerminalContext};
pub use error::{ConfigError, FsError, ModelError, ShellError};
pub use model::{LanguageModel, ModelPrompt, ModelReply, Sleep, ToolInvocation};
pub use session::{Sender, Session, SessionController, Turn, TurnRequest, TurnResponse};

use futures::future::{FutureExt, LocalBoxFuture};
use model::BrowserSleep;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use uuid::Uuid;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

// route log records to the browser console
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    logging::init_console_logger();
}

// what the js model callback may resolve to
#[derive(Deserialize)]
#[serde(untagged)]
enum RawModelReply {
    Tool {
        #[serde(rename = "toolCall")]
        tool_call: ToolInvocation,
    },
    Text {
        text: String,
    },
    Plain(String),
}

impl From<RawModelReply> for ModelReply {
    fn from(raw: RawModelReply) -> Self {
        match raw {
            RawModelReply::Tool { tool_call } => ModelReply::ToolCall(tool_call),
            RawModelReply::Text { text } | RawModelReply::Plain(text) => ModelReply::Text(text),
        }
    }
}

/// Language model backed by a page-supplied callback. The callback gets the
/// prompt as a plain object and returns a value or a `Promise` of one.
pub struct JsLanguageModel {
    callback: js_sys::Function,
}

impl JsLanguageModel {
    pub fn new(callback: js_sys::Function) -> Self {
        Self { callback }
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

impl LanguageModel for JsLanguageModel {
    fn complete<'a>(&'a self, prompt: &'a ModelPrompt) -> LocalBoxFuture<'a, Result<ModelReply, ModelError>> {
        async move {
            let arg = to_js(prompt).map_err(|e| ModelError::Malformed(e.to_string()))?;
            let returned = self
                .callback
                .call1(&JsValue::NULL, &arg)
                .map_err(|e| ModelError::Unavailable(describe(&e)))?;
            let settled = JsFuture::from(js_sys::Promise::resolve(&returned))
                .await
                .map_err(|e| ModelError::Unavailable(describe(&e)))?;
            if let Some(text) = settled.as_string() {
                return Ok(ModelReply::Text(text));
            }
            let raw: RawModelReply =
                serde_wasm_bindgen::from_value(settled).map_err(|e| ModelError::Malformed(e.to_string()))?;
            Ok(raw.into())
        }
        .boxed_local()
    }
}

// main router struct - one per chat surface
#[wasm_bindgen]
pub struct VaultRouter {
    inner: Rc<RefCell<SessionController<JsLanguageModel, BrowserSleep>>>,
    // readable while a turn holds `inner` across the model await
    greeting: String,
    session_id: Rc<Cell<Uuid>>,
}

#[wasm_bindgen]
impl VaultRouter {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>, model: js_sys::Function) -> Result<VaultRouter, JsValue> {
        let config = match config_json {
            Some(json) => RouterConfig::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => RouterConfig::default(),
        };
        let greeting = config.greeting.clone();
        let controller = SessionController::new(config, JsLanguageModel::new(model), BrowserSleep);
        let session_id = Rc::new(Cell::new(controller.session_id()));
        Ok(VaultRouter {
            inner: Rc::new(RefCell::new(controller)),
            greeting,
            session_id,
        })
    }

    // main entry point - {query, history} in, promise of {relevantData} out
    #[wasm_bindgen(js_name = handleTurn)]
    pub fn handle_turn(&self, request: JsValue) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        let session_id = Rc::clone(&self.session_id);
        future_to_promise(async move {
            let request: TurnRequest =
                serde_wasm_bindgen::from_value(request).map_err(|e| JsValue::from_str(&e.to_string()))?;
            let mut controller = inner
                .try_borrow_mut()
                .map_err(|_| JsValue::from_str("a turn is already in flight"))?;
            let response = controller.handle_turn(request).await;
            session_id.set(controller.session_id());
            drop(controller);
            to_js(&response).map_err(|e| JsValue::from_str(&e.to_string()))
        })
    }

    #[wasm_bindgen]
    pub fn greeting(&self) -> String {
        self.greeting.clone()
    }

    #[wasm_bindgen(js_name = isCommand)]
    pub fn is_command(&self, utterance: &str) -> bool {
        classifier::is_command(utterance)
    }

    #[wasm_bindgen(js_name = sessionId)]
    pub fn session_id(&self) -> String {
        self.session_id.get().to_string()
    }
}
