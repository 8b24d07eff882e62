//! Small stateless helpers shared by the matcher and name normalisation.

use crate::value::Value;

/// First element satisfying `predicate`, if any.
pub fn find_first<T, P>(items: &[T], predicate: P) -> Option<&T>
where
    P: Fn(&T) -> bool,
{
    items.iter().find(|item| predicate(item))
}

/// A new sequence holding every element that does NOT satisfy `predicate`.
/// The input is left untouched.
pub fn filter_excluding<T, P>(items: &[T], predicate: P) -> Vec<T>
where
    T: Clone,
    P: Fn(&T) -> bool,
{
    items
        .iter()
        .filter(|item| !predicate(item))
        .cloned()
        .collect()
}

/// True for a `Value::List` with at least one element, all of them strings.
pub fn is_non_empty_string_array(value: &Value) -> bool {
    match value {
        Value::List(items) => {
            !items.is_empty() && items.iter().all(|item| matches!(item, Value::String(_)))
        }
        _ => false,
    }
}
