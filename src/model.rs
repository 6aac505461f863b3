// seams to the outside: the hosted language model and a timer

use crate::error::ModelError;
use crate::session::Turn;
use futures::future::{FutureExt, LocalBoxFuture};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Everything the model gets for a Public Mode turn. No tool schema is ever
/// attached, so the model has no way to ask for vault access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelPrompt {
    pub system: String,
    /// Prior chat turns, with every terminal exchange removed.
    pub transcript: Vec<Turn>,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_schema: Option<serde_json::Value>,
}

/// A structured tool request coming back from the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelReply {
    Text(String),
    ToolCall(ToolInvocation),
}

pub trait LanguageModel {
    fn complete<'a>(&'a self, prompt: &'a ModelPrompt) -> LocalBoxFuture<'a, Result<ModelReply, ModelError>>;
}

pub trait Sleep {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

/// Stand-in model for offline use: always answers with the same text.
pub struct OfflineModel {
    reply: String,
}

impl OfflineModel {
    pub fn new(reply: impl Into<String>) -> Self {
        Self { reply: reply.into() }
    }
}

impl Default for OfflineModel {
    fn default() -> Self {
        Self::new("I'm offline right now, but your vault terminal still works. Try `ls`.")
    }
}

impl LanguageModel for OfflineModel {
    fn complete<'a>(&'a self, _prompt: &'a ModelPrompt) -> LocalBoxFuture<'a, Result<ModelReply, ModelError>> {
        let reply = ModelReply::Text(self.reply.clone());
        async move { Ok(reply) }.boxed_local()
    }
}

/// Timer backed by a parked OS thread. Dropping the future wakes the thread
/// and it exits, so a model that answers early leaves nothing behind.
#[cfg(not(target_arch = "wasm32"))]
pub struct ThreadSleep;

#[cfg(not(target_arch = "wasm32"))]
impl Sleep for ThreadSleep {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        let (timer, _handle) = ThreadTimer::start(duration);
        timer.boxed_local()
    }
}

#[cfg(not(target_arch = "wasm32"))]
struct ThreadTimer {
    rx: futures::channel::oneshot::Receiver<()>,
    thread: std::thread::Thread,
}

#[cfg(not(target_arch = "wasm32"))]
impl ThreadTimer {
    fn start(duration: Duration) -> (Self, std::thread::JoinHandle<()>) {
        let (tx, rx) = futures::channel::oneshot::channel::<()>();
        let deadline = std::time::Instant::now() + duration;
        let handle = std::thread::spawn(move || loop {
            if tx.is_canceled() {
                return;
            }
            let now = std::time::Instant::now();
            if now >= deadline {
                let _ = tx.send(());
                return;
            }
            std::thread::park_timeout(deadline - now);
        });
        let thread = handle.thread().clone();
        (Self { rx, thread }, handle)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl std::future::Future for ThreadTimer {
    type Output = ();

    fn poll(mut self: std::pin::Pin<&mut Self>, cx: &mut std::task::Context<'_>) -> std::task::Poll<()> {
        self.rx.poll_unpin(cx).map(|_| ())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Drop for ThreadTimer {
    fn drop(&mut self) {
        // close first so the woken thread sees the cancel
        self.rx.close();
        self.thread.unpark();
    }
}

/// Timer backed by `setTimeout`.
pub struct BrowserSleep;

impl Sleep for BrowserSleep {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        gloo_timers::future::sleep(duration).boxed_local()
    }
}
