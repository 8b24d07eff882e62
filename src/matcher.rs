//! Identity-triple matching over one event's registrations.
//!
//! Registration treats an absent context as a concrete value: `on(e, f)` and
//! `on(e, f, c)` are two registrations. Removal without a context means any
//! context. [`ContextMatch`] keeps the two readings apart.

use crate::{
    listener::{Context, Listener},
    util::{filter_excluding, find_first},
};

/// One bound listener.
#[derive(Debug, Clone)]
pub struct Registration {
    pub event_name: String,
    pub listener: Listener,
    pub context: Option<Context>,
    /// What actually runs on emission: `listener` itself for `on`, a
    /// self-removing wrapper for `once`.
    pub callback: Listener,
}

impl Registration {
    pub fn is_once(&self) -> bool {
        self.callback != self.listener
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContextMatch {
    Any,
    Exact(Option<Context>),
}

impl ContextMatch {
    fn accepts(&self, context: &Option<Context>) -> bool {
        match self {
            ContextMatch::Any => true,
            ContextMatch::Exact(expected) => expected == context,
        }
    }
}

/// Selects registrations by listener identity and context.
#[derive(Debug, Clone)]
pub struct Matcher<'a> {
    listener: Option<&'a Listener>,
    context: ContextMatch,
}

impl<'a> Matcher<'a> {
    /// Exactly `(listener, context)`, with `None` meaning "registered without
    /// a context".
    pub fn exact(listener: &'a Listener, context: Option<Context>) -> Self {
        Self {
            listener: Some(listener),
            context: ContextMatch::Exact(context),
        }
    }

    pub fn listener(listener: &'a Listener, context: ContextMatch) -> Self {
        Self {
            listener: Some(listener),
            context,
        }
    }

    /// Every registration.
    pub fn all() -> Self {
        Self {
            listener: None,
            context: ContextMatch::Any,
        }
    }

    pub fn matches(&self, registration: &Registration) -> bool {
        let listener_ok = self
            .listener
            .map_or(true, |listener| *listener == registration.listener);
        listener_ok && self.context.accepts(&registration.context)
    }

    pub fn find<'r>(&self, registrations: &'r [Registration]) -> Option<&'r Registration> {
        find_first(registrations, |r| self.matches(r))
    }

    pub fn contains(&self, registrations: &[Registration]) -> bool {
        self.find(registrations).is_some()
    }

    /// The registrations left after dropping every match.
    pub fn exclude(&self, registrations: &[Registration]) -> Vec<Registration> {
        filter_excluding(registrations, |r| self.matches(r))
    }
}
