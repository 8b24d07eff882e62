use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmitterError {
    #[error("Invalid event name: expected a non-empty string or a non-empty list of strings, got {found}")]
    InvalidEventName { found: String },

    #[error("Invalid event name: once accepts a single event name, got {count} in \"{names}\"")]
    MultipleEventNames { names: String, count: usize },

    #[error("Invalid listener: expected a callable, got {found}")]
    InvalidListener { found: String },

    #[error("Scheduler unavailable: {message}")]
    SchedulerUnavailable { message: String },

    #[error("Config error: {0}")]
    Config(String),
}

pub type EmitterResult<T> = Result<T, EmitterError>;

impl EmitterError {
    pub fn invalid_event_name<S: Into<String>>(found: S) -> Self {
        EmitterError::InvalidEventName {
            found: found.into(),
        }
    }

    pub fn invalid_listener<S: Into<String>>(found: S) -> Self {
        EmitterError::InvalidListener {
            found: found.into(),
        }
    }

    /// Both name-shaped failures, including the `once`-specific one.
    pub fn is_invalid_event_name(&self) -> bool {
        matches!(
            self,
            EmitterError::InvalidEventName { .. } | EmitterError::MultipleEventNames { .. }
        )
    }
}
