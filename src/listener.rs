//! # Listeners and contexts
//!
//! Listener functions and contexts are matched by identity, never by
//! structure. Each [`Listener`] and [`Context`] carries a v4 UUID assigned at
//! creation; clones share it, independently created handles never do. Two
//! listeners wrapping the very same function are still two listeners.

use std::{any::Any, fmt, sync::Arc};

use uuid::Uuid;

use crate::{
    error::{EmitterError, EmitterResult},
    value::Value,
};

/// Closure type for event listeners.
pub type ListenerFn = dyn Fn(&Invocation) + Send + Sync;

/// An identity-comparable listener handle.
#[derive(Clone)]
pub struct Listener {
    id: Uuid,
    func: Arc<ListenerFn>,
}

impl Listener {
    pub fn new(func: impl Fn(&Invocation) + Send + Sync + 'static) -> Self {
        Self {
            id: Uuid::new_v4(),
            func: Arc::new(func),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn call(&self, invocation: &Invocation) {
        (self.func)(invocation)
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Listener {}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener").field(&self.id).finish()
    }
}

/// Invocation receiver supplied at registration time.
///
/// Holds any `Send + Sync` value; listeners recover it with
/// [`Context::downcast_ref`].
#[derive(Clone)]
pub struct Context {
    id: Uuid,
    value: Arc<dyn Any + Send + Sync>,
}

impl Context {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    pub fn from_arc(value: Arc<dyn Any + Send + Sync>) -> Self {
        Self {
            id: Uuid::new_v4(),
            value,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Context {}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Context").field(&self.id).finish()
    }
}

/// What a listener sees when it runs.
#[derive(Debug, Clone)]
pub struct Invocation {
    event_name: String,
    context: Option<Context>,
    args: Arc<[Value]>,
}

impl Invocation {
    pub(crate) fn new(event_name: String, context: Option<Context>, args: Arc<[Value]>) -> Self {
        Self {
            event_name,
            context,
            args,
        }
    }

    /// The single event name this invocation was scheduled for.
    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    /// Shorthand for downcasting the context, if there is one.
    pub fn context_as<T: Any>(&self) -> Option<&T> {
        self.context.as_ref().and_then(|c| c.downcast_ref::<T>())
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }
}

/// Conversion into a listener, validated where the input is dynamic.
pub trait IntoListener {
    fn into_listener(self) -> EmitterResult<Listener>;
}

impl IntoListener for Listener {
    fn into_listener(self) -> EmitterResult<Listener> {
        Ok(self)
    }
}

impl IntoListener for &Listener {
    fn into_listener(self) -> EmitterResult<Listener> {
        Ok(self.clone())
    }
}

impl IntoListener for Value {
    fn into_listener(self) -> EmitterResult<Listener> {
        match self {
            Value::Listener(listener) => Ok(listener),
            other => Err(EmitterError::invalid_listener(other.kind().to_string())),
        }
    }
}

impl IntoListener for &Value {
    fn into_listener(self) -> EmitterResult<Listener> {
        match self {
            Value::Listener(listener) => Ok(listener.clone()),
            other => Err(EmitterError::invalid_listener(other.kind().to_string())),
        }
    }
}
