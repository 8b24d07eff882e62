//! # Event name normalisation
//!
//! Every public operation accepts event names in several shapes and reduces
//! them to a validated, non-empty list before touching the registry. A
//! string is a whitespace-delimited list of names (`"open close"` is two
//! events); a list is a list of such strings.

use crate::{
    error::{EmitterError, EmitterResult},
    util::is_non_empty_string_array,
    value::Value,
};

/// Raw event-name input before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum NameInput {
    Text(String),
    List(Vec<String>),
    /// Input of the wrong shape, carrying its kind for the error message.
    Invalid(String),
}

/// A validated, non-empty list of event names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventNames(Vec<String>);

impl EventNames {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl IntoIterator for EventNames {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Anything that can be read as event names.
pub trait IntoEventNames {
    fn into_name_input(self) -> NameInput;
}

impl IntoEventNames for &str {
    fn into_name_input(self) -> NameInput {
        NameInput::Text(self.to_string())
    }
}

impl IntoEventNames for String {
    fn into_name_input(self) -> NameInput {
        NameInput::Text(self)
    }
}

impl IntoEventNames for &String {
    fn into_name_input(self) -> NameInput {
        NameInput::Text(self.clone())
    }
}

impl IntoEventNames for Vec<String> {
    fn into_name_input(self) -> NameInput {
        NameInput::List(self)
    }
}

impl IntoEventNames for Vec<&str> {
    fn into_name_input(self) -> NameInput {
        NameInput::List(self.into_iter().map(str::to_string).collect())
    }
}

impl IntoEventNames for &[&str] {
    fn into_name_input(self) -> NameInput {
        NameInput::List(self.iter().map(|s| s.to_string()).collect())
    }
}

impl IntoEventNames for &[String] {
    fn into_name_input(self) -> NameInput {
        NameInput::List(self.to_vec())
    }
}

impl<const N: usize> IntoEventNames for [&str; N] {
    fn into_name_input(self) -> NameInput {
        NameInput::List(self.iter().map(|s| s.to_string()).collect())
    }
}

impl IntoEventNames for EventNames {
    fn into_name_input(self) -> NameInput {
        NameInput::List(self.0)
    }
}

impl IntoEventNames for &EventNames {
    fn into_name_input(self) -> NameInput {
        NameInput::List(self.0.clone())
    }
}

impl IntoEventNames for &Value {
    fn into_name_input(self) -> NameInput {
        match self {
            Value::String(s) => NameInput::Text(s.clone()),
            Value::List(items) if is_non_empty_string_array(self) => NameInput::List(
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect(),
            ),
            Value::List(items) if items.is_empty() => NameInput::Invalid("empty list".to_string()),
            Value::List(_) => NameInput::Invalid("list with non-string elements".to_string()),
            other => NameInput::Invalid(other.kind().to_string()),
        }
    }
}

impl IntoEventNames for Value {
    fn into_name_input(self) -> NameInput {
        (&self).into_name_input()
    }
}

fn split(text: &str, split_whitespace: bool) -> Vec<String> {
    if split_whitespace {
        text.split_whitespace().map(str::to_string).collect()
    } else if text.trim().is_empty() {
        Vec::new()
    } else {
        vec![text.to_string()]
    }
}

/// Validates input for `on`, `emit` and `off`: a non-empty string or a
/// non-empty list of non-blank strings.
pub fn normalize(input: NameInput, split_whitespace: bool) -> EmitterResult<EventNames> {
    let names = match input {
        NameInput::Text(text) => {
            let names = split(&text, split_whitespace);
            if names.is_empty() {
                return Err(EmitterError::invalid_event_name("empty string"));
            }
            names
        }
        NameInput::List(items) => {
            if items.is_empty() {
                return Err(EmitterError::invalid_event_name("empty list"));
            }
            let mut names = Vec::with_capacity(items.len());
            for item in items {
                let parts = split(&item, split_whitespace);
                if parts.is_empty() {
                    return Err(EmitterError::invalid_event_name("list with a blank name"));
                }
                names.extend(parts);
            }
            names
        }
        NameInput::Invalid(found) => return Err(EmitterError::invalid_event_name(found)),
    };
    Ok(EventNames(names))
}

/// Validates input for `once`: exactly one name, given as a string.
pub fn normalize_single(input: NameInput, split_whitespace: bool) -> EmitterResult<String> {
    match input {
        NameInput::Text(text) => {
            let mut names = split(&text, split_whitespace);
            match names.len() {
                0 => Err(EmitterError::invalid_event_name("empty string")),
                1 => Ok(names.remove(0)),
                count => Err(EmitterError::MultipleEventNames {
                    names: text,
                    count,
                }),
            }
        }
        NameInput::List(_) => Err(EmitterError::invalid_event_name("list")),
        NameInput::Invalid(found) => Err(EmitterError::invalid_event_name(found)),
    }
}
