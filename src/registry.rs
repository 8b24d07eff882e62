//! # Event Registry
//!
//! The EventRegistry is the listener bookkeeping behind every emitter. A host
//! type embeds one and gains `on` / `once` / `off` / `emit` by implementing
//! [`Emitter`]; nothing is inherited and nothing is shared between hosts.
//!
//! ## Matching
//!
//! A registration is identified by `(event name, listener, context)`:
//!
//! - Registering the same triple twice keeps one registration.
//! - The same listener under two different contexts is two registrations.
//! - `on` replaces a pending `once` for the same triple with a persistent
//!   registration. `once` never downgrades an existing `on`.
//! - [`Emitter::off_listener`] ignores context, [`Emitter::off_exact`] does not.
//!   Registering without a context stores "no context" as a value of its own,
//!   so `off_exact(e, f, None)` only removes registrations made without one.
//!
//! ## Emission
//!
//! `emit` snapshots matching registrations and hands one task per
//! registration to the [`Scheduler`]; it returns before any listener runs.
//! There is no ordering between listeners. A plain listener that was already
//! scheduled still runs if it is removed before its turn; a `once` listener
//! checks again when it runs and is skipped if it is gone.

use std::sync::{Arc, OnceLock, Weak};

use dashmap::DashMap;
use tracing::{debug, instrument, trace, warn};

use crate::{
    config::EmitterConfig,
    error::EmitterResult,
    listener::{Context, IntoListener, Invocation, Listener},
    matcher::{ContextMatch, Matcher, Registration},
    names::{normalize, normalize_single, EventNames, IntoEventNames, NameInput},
    scheduler::{Scheduler, TokioScheduler},
    value::Value,
};

type ListenerMap = DashMap<String, Vec<Registration>>;

/// # EventRegistry
///
/// Per-instance listener storage plus the scheduler its emissions run on.
///
/// The map is created on first registration. Reads against a registry that
/// has never had a listener behave as reads against an empty one.
pub struct EventRegistry {
    config: EmitterConfig,
    scheduler: Arc<dyn Scheduler>,
    listeners: OnceLock<Arc<ListenerMap>>,
}

impl EventRegistry {
    /// A registry with default configuration that spawns listeners on the
    /// ambient Tokio runtime. That runtime must be a current-thread one;
    /// `emit` fails with `SchedulerUnavailable` on a multi-thread runtime,
    /// where a listener could run before the emitting code yields. Use
    /// [`QueueScheduler`](crate::QueueScheduler) or a current-thread handle
    /// there.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn with_config(config: EmitterConfig) -> Self {
        Self::builder().config(config).build()
    }

    pub fn with_scheduler(scheduler: impl Scheduler + 'static) -> Self {
        Self::builder().scheduler(scheduler).build()
    }

    pub fn builder() -> EventRegistryBuilder {
        EventRegistryBuilder::new()
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    /// Number of registrations under `event_name`.
    pub fn listener_count(&self, event_name: &str) -> usize {
        self.listeners
            .get()
            .and_then(|map| map.get(event_name).map(|entry| entry.len()))
            .unwrap_or(0)
    }

    pub fn has_listeners(&self, event_name: &str) -> bool {
        self.listener_count(event_name) > 0
    }

    /// Names with at least one registration, sorted.
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .listeners
            .get()
            .map(|map| {
                map.iter()
                    .filter(|entry| !entry.value().is_empty())
                    .map(|entry| entry.key().clone())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    fn map(&self) -> &Arc<ListenerMap> {
        self.listeners.get_or_init(|| Arc::new(DashMap::new()))
    }

    fn names(&self, names: NameInput) -> EmitterResult<EventNames> {
        normalize(names, self.config.split_whitespace)
    }

    fn check_listener_count(&self, event_name: &str, count: usize) {
        if let Some(max) = self.config.max_listeners_warning {
            if count > max {
                warn!(
                    emitter = %self.config.name,
                    "Event {} has {} listeners (warning threshold {})",
                    event_name,
                    count,
                    max
                );
            }
        }
    }

    pub(crate) fn register(
        &self,
        names: impl IntoEventNames,
        listener: impl IntoListener,
        context: Option<Context>,
    ) -> EmitterResult<()> {
        let names = self.names(names.into_name_input())?;
        let listener = listener.into_listener()?;
        let map = self.map();

        for name in names {
            let count = {
                let mut entry = map.entry(name.clone()).or_default();
                let mut kept = Matcher::exact(&listener, context.clone()).exclude(&entry);
                kept.push(Registration {
                    event_name: name.clone(),
                    listener: listener.clone(),
                    context: context.clone(),
                    callback: listener.clone(),
                });
                *entry = kept;
                entry.len()
            };
            debug!(emitter = %self.config.name, "Registered {:?} on {}", listener, name);
            self.check_listener_count(&name, count);
        }
        Ok(())
    }

    pub(crate) fn register_once(
        &self,
        name: impl IntoEventNames,
        listener: impl IntoListener,
        context: Option<Context>,
    ) -> EmitterResult<()> {
        let name = normalize_single(name.into_name_input(), self.config.split_whitespace)?;
        let listener = listener.into_listener()?;
        let map = self.map();

        let count = {
            let mut entry = map.entry(name.clone()).or_default();
            if Matcher::exact(&listener, context.clone()).contains(&entry) {
                trace!(
                    emitter = %self.config.name,
                    "{:?} already registered on {}",
                    listener,
                    name
                );
                return Ok(());
            }
            let callback = once_callback(
                Arc::downgrade(map),
                name.clone(),
                listener.clone(),
                context.clone(),
            );
            entry.push(Registration {
                event_name: name.clone(),
                listener: listener.clone(),
                context,
                callback,
            });
            entry.len()
        };
        debug!(emitter = %self.config.name, "Registered {:?} once on {}", listener, name);
        self.check_listener_count(&name, count);
        Ok(())
    }

    /// `names == None` clears everything. Input that does not validate as
    /// event names removes nothing.
    pub(crate) fn remove(
        &self,
        names: Option<NameInput>,
        listener: Option<&Listener>,
        context: ContextMatch,
    ) {
        let Some(map) = self.listeners.get() else {
            return;
        };
        let Some(names) = names else {
            map.clear();
            debug!(emitter = %self.config.name, "Removed all listeners");
            return;
        };
        let names = match self.names(names) {
            Ok(names) => names,
            Err(e) => {
                debug!(emitter = %self.config.name, "Nothing removed: {}", e);
                return;
            }
        };

        for name in names.iter() {
            match listener {
                None => {
                    map.remove(name);
                }
                Some(listener) => {
                    let matcher = Matcher::listener(listener, context.clone());
                    if let Some(mut entry) = map.get_mut(name) {
                        *entry = matcher.exclude(&entry);
                    }
                    prune(map, name);
                }
            }
            debug!(emitter = %self.config.name, "Removed listeners from {}", name);
        }
    }

    /// Schedules every matching callback and returns how many were scheduled.
    #[instrument(level = "debug", skip(self, names, args), fields(emitter = %self.config.name))]
    pub(crate) fn dispatch(
        &self,
        names: impl IntoEventNames,
        args: Vec<Value>,
    ) -> EmitterResult<usize> {
        let names = self.names(names.into_name_input())?;
        let Some(map) = self.listeners.get() else {
            trace!("No listeners registered for {:?}", names);
            return Ok(0);
        };
        let args: Arc<[Value]> = Arc::from(args);

        // Snapshot first; the map lock is never held while scheduling.
        let mut pending = Vec::new();
        for name in names {
            if let Some(entry) = map.get(&name) {
                for registration in entry.iter() {
                    pending.push((
                        registration.callback.clone(),
                        Invocation::new(name.clone(), registration.context.clone(), args.clone()),
                    ));
                }
            }
        }

        let scheduled = pending.len();
        if scheduled > 0 {
            self.scheduler.ready()?;
        }
        for (callback, invocation) in pending {
            trace!("Scheduling {:?} for {}", callback, invocation.event_name());
            self.scheduler
                .defer(Box::new(move || callback.call(&invocation)))?;
        }
        debug!("Emitted to {} listeners", scheduled);
        Ok(scheduled)
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRegistry")
            .field("name", &self.config.name)
            .field("events", &self.event_names())
            .finish()
    }
}

/// The wrapper installed by `once`. Looks the triple up again when it runs:
/// a pending `once` is removed and called, a triple since promoted by `on` is
/// called and kept, a missing triple is skipped.
fn once_callback(
    map: Weak<ListenerMap>,
    event_name: String,
    listener: Listener,
    context: Option<Context>,
) -> Listener {
    Listener::new(move |invocation| {
        let Some(map) = map.upgrade() else {
            return;
        };
        match take_once(&map, &event_name, &listener, &context) {
            OnceOutcome::Removed | OnceOutcome::Promoted => listener.call(invocation),
            OnceOutcome::Gone => {
                trace!("Skipping {:?} on {}: already removed", listener, event_name);
            }
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnceOutcome {
    /// The `once` registration was still pending and has been removed.
    Removed,
    /// The triple is now a plain `on` registration; it stays.
    Promoted,
    /// No registration for the triple.
    Gone,
}

/// Atomically resolves the triple for a running `once` wrapper.
fn take_once(
    map: &ListenerMap,
    event_name: &str,
    listener: &Listener,
    context: &Option<Context>,
) -> OnceOutcome {
    let matcher = Matcher::exact(listener, context.clone());
    {
        let Some(mut entry) = map.get_mut(event_name) else {
            return OnceOutcome::Gone;
        };
        match matcher.find(&entry).map(Registration::is_once) {
            None => return OnceOutcome::Gone,
            Some(false) => return OnceOutcome::Promoted,
            Some(true) => {}
        }
        *entry = matcher.exclude(&entry);
    }
    prune(map, event_name);
    OnceOutcome::Removed
}

fn prune(map: &ListenerMap, event_name: &str) {
    map.remove_if(event_name, |_, registrations| registrations.is_empty());
}

#[derive(Default)]
pub struct EventRegistryBuilder {
    config: Option<EmitterConfig>,
    scheduler: Option<Arc<dyn Scheduler>>,
}

impl EventRegistryBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn config(mut self, config: EmitterConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn scheduler(mut self, scheduler: impl Scheduler + 'static) -> Self {
        self.scheduler = Some(Arc::new(scheduler));
        self
    }

    pub fn shared_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn build(self) -> EventRegistry {
        EventRegistry {
            config: self.config.unwrap_or_default(),
            scheduler: self
                .scheduler
                .unwrap_or_else(|| Arc::new(TokioScheduler::new())),
            listeners: OnceLock::new(),
        }
    }
}

/// # Emitter
///
/// Grants `on` / `once` / `off` / `emit` to any type that owns an
/// [`EventRegistry`]. Every operation returns the host so calls chain:
///
/// ```rust
/// use evmixin::{Emitter, EventRegistry, Listener, QueueScheduler};
///
/// struct Door {
///     events: EventRegistry,
/// }
///
/// impl Emitter for Door {
///     fn event_registry(&self) -> &EventRegistry {
///         &self.events
///     }
/// }
///
/// # fn main() -> evmixin::EmitterResult<()> {
/// let queue = QueueScheduler::new();
/// let door = Door {
///     events: EventRegistry::with_scheduler(queue.clone()),
/// };
/// let opened = Listener::new(|call| println!("{} {:?}", call.event_name(), call.args()));
///
/// door.on("open close", &opened, None)?
///     .off_listener("close", &opened)
///     .emit("open", vec!["front".into()])?;
/// assert_eq!(queue.run_pending(), 1);
/// # Ok(())
/// # }
/// ```
pub trait Emitter {
    fn event_registry(&self) -> &EventRegistry;

    /// Bind `listener` to every name in `names`, replacing any registration
    /// of the same listener and context.
    fn on(
        &self,
        names: impl IntoEventNames,
        listener: impl IntoListener,
        context: Option<Context>,
    ) -> EmitterResult<&Self>
    where
        Self: Sized,
    {
        self.event_registry().register(names, listener, context)?;
        Ok(self)
    }

    /// Bind `listener` to a single event for at most one invocation. A no-op
    /// when the triple is already registered.
    fn once(
        &self,
        name: impl IntoEventNames,
        listener: impl IntoListener,
        context: Option<Context>,
    ) -> EmitterResult<&Self>
    where
        Self: Sized,
    {
        self.event_registry().register_once(name, listener, context)?;
        Ok(self)
    }

    /// Remove every registration under `names`.
    fn off(&self, names: impl IntoEventNames) -> &Self
    where
        Self: Sized,
    {
        self.event_registry()
            .remove(Some(names.into_name_input()), None, ContextMatch::Any);
        self
    }

    /// Remove `listener` from `names` under any context.
    fn off_listener(&self, names: impl IntoEventNames, listener: &Listener) -> &Self
    where
        Self: Sized,
    {
        self.event_registry().remove(
            Some(names.into_name_input()),
            Some(listener),
            ContextMatch::Any,
        );
        self
    }

    /// Remove only the exact `(name, listener, context)` triples.
    fn off_exact(
        &self,
        names: impl IntoEventNames,
        listener: &Listener,
        context: Option<Context>,
    ) -> &Self
    where
        Self: Sized,
    {
        self.event_registry().remove(
            Some(names.into_name_input()),
            Some(listener),
            ContextMatch::Exact(context),
        );
        self
    }

    /// Drop every registration on this instance.
    fn off_all(&self) -> &Self
    where
        Self: Sized,
    {
        self.event_registry().remove(None, None, ContextMatch::Any);
        self
    }

    /// Schedule every listener bound to `names` with `args`. Returns before
    /// any of them runs.
    fn emit(&self, names: impl IntoEventNames, args: Vec<Value>) -> EmitterResult<&Self>
    where
        Self: Sized,
    {
        self.event_registry().dispatch(names, args)?;
        Ok(self)
    }

    /// Register a closure with no context and return its handle for removal.
    fn subscribe(
        &self,
        names: impl IntoEventNames,
        func: impl Fn(&Invocation) + Send + Sync + 'static,
    ) -> EmitterResult<Listener>
    where
        Self: Sized,
    {
        let listener = Listener::new(func);
        self.event_registry().register(names, &listener, None)?;
        Ok(listener)
    }

    fn listener_count(&self, event_name: &str) -> usize {
        self.event_registry().listener_count(event_name)
    }
}

impl Emitter for EventRegistry {
    fn event_registry(&self) -> &EventRegistry {
        self
    }
}
