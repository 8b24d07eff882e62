//! # Dynamic values
//!
//! [`Value`] is what listeners receive as emitted arguments, and what callers
//! hand in when event names or listeners arrive from a loosely typed source
//! (a decoded message, a script binding, a config file). Everything else in
//! the crate is statically typed; `Value` is the one place where shape is
//! checked at runtime.

use std::{collections::HashMap, time::Duration};

use crate::listener::Listener;

// 値の型
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    List(Vec<Value>),
    Duration(Duration),
    Map(HashMap<String, Value>),
    Listener(Listener),
    Null,
}

/// Shape of a [`Value`], used in validation error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ValueKind {
    Integer,
    Float,
    String,
    Boolean,
    List,
    Duration,
    Map,
    Listener,
    Null,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::List(_) => ValueKind::List,
            Value::Duration(_) => ValueKind::Duration,
            Value::Map(_) => ValueKind::Map,
            Value::Listener(_) => ValueKind::Listener,
            Value::Null => ValueKind::Null,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_listener(&self) -> Option<&Listener> {
        match self {
            Value::Listener(listener) => Some(listener),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<Duration> for Value {
    fn from(value: Duration) -> Self {
        Value::Duration(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<HashMap<String, Value>> for Value {
    fn from(value: HashMap<String, Value>) -> Self {
        Value::Map(value)
    }
}

impl From<Listener> for Value {
    fn from(value: Listener) -> Self {
        Value::Listener(value)
    }
}
