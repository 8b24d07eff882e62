//! # evmixin: an embeddable event emitter
//!
//! Any type can become an event emitter by owning an [`EventRegistry`] and
//! implementing [`Emitter`], which supplies `on`, `once`, `off` and `emit`.
//! Each host owns its registry; two hosts never see each other's listeners.
//!
//! ## Components
//!
//! - Listener bookkeeping and the [`Emitter`] capability ([`registry`])
//! - Identity-triple matching ([`matcher`])
//! - Event name normalisation ([`names`])
//! - Identity-comparable listeners and contexts ([`listener`])
//! - Deferred, isolated invocation ([`scheduler`])
//! - Dynamic argument values ([`value`])
//! - Configuration ([`config`]) and errors ([`error`])
//!
//! ## Delivery
//!
//! ```text
//! emit("save", args) ──▶ snapshot registrations ──▶ Scheduler::defer × N ──▶ return
//!                                                          │
//!                                         later turn ──▶ listener(Invocation)
//! ```
//!
//! Listeners never run inside `emit`. With the default [`TokioScheduler`]
//! each invocation is its own task; with [`QueueScheduler`] the host decides
//! when to run them.

pub mod config;
pub mod error;
pub mod listener;
pub mod matcher;
pub mod names;
pub mod registry;
pub mod scheduler;
pub mod util;
pub mod value;

// Re-exports
pub use config::EmitterConfig;
pub use error::{EmitterError, EmitterResult};
pub use listener::{Context, IntoListener, Invocation, Listener};
pub use names::{EventNames, IntoEventNames};
pub use registry::{Emitter, EventRegistry, EventRegistryBuilder};
pub use scheduler::{QueueScheduler, Scheduler, Task, TokioScheduler};
pub use value::{Value, ValueKind};
