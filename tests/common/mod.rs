#![allow(dead_code)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use evmixin::{Emitter, EventRegistry, Listener, Value};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[ctor::ctor]
fn init_tests() {
    // tracing_subscriberの初期化
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// One observed listener call.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub event: String,
    pub context: Option<String>,
    pub args: Vec<Value>,
}

/// Collects calls made to the listeners it hands out.
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A listener that records every call, reading a `&'static str` context
    /// as its label.
    pub fn listener(&self) -> Listener {
        let calls = self.calls.clone();
        Listener::new(move |inv| {
            calls.lock().unwrap().push(Call {
                event: inv.event_name().to_string(),
                context: inv.context_as::<&'static str>().map(|s| s.to_string()),
                args: inv.args().to_vec(),
            });
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn events(&self) -> Vec<String> {
        let mut events: Vec<String> = self.calls().into_iter().map(|c| c.event).collect();
        events.sort();
        events
    }

    pub fn contexts(&self) -> Vec<Option<String>> {
        let mut contexts: Vec<Option<String>> =
            self.calls().into_iter().map(|c| c.context).collect();
        contexts.sort();
        contexts
    }
}

/// Waits long enough for every spawned listener task to run.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

/// A host type that gains the emitter capability by composition.
#[derive(Default)]
pub struct Widget {
    pub label: String,
    events: EventRegistry,
}

impl Widget {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            events: EventRegistry::new(),
        }
    }

    pub fn with_registry(label: &str, events: EventRegistry) -> Self {
        Self {
            label: label.to_string(),
            events,
        }
    }
}

impl Emitter for Widget {
    fn event_registry(&self) -> &EventRegistry {
        &self.events
    }
}
