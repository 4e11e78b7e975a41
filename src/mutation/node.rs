//! Helpers for locating one entity inside a cached JSON value.
//!
//! The same feed item can sit at the root of a detail response, inside a
//! plain list, or inside a paged envelope (`{ "items": [...] }`). Only those
//! positions hold entities: an element's own fields are never searched, so
//! an `author: { "id": 1 }` inside feed 2 is not feed 1.

use serde_json::Value;

const ENVELOPE_FIELDS: [&str; 5] = ["items", "content", "data", "comments", "results"];

fn matches_id(value: &Value, field: &str, id: &str) -> bool {
    match value.get(field) {
        Some(Value::String(s)) => s == id,
        Some(Value::Number(n)) => n.to_string() == id,
        _ => false,
    }
}

fn envelope_field(map: &serde_json::Map<String, Value>) -> Option<&'static str> {
    ENVELOPE_FIELDS
        .into_iter()
        .find(|f| map.get(*f).is_some_and(Value::is_array))
}

/// The entity itself (a detail response) or the matching list element.
pub fn find<'v>(value: &'v Value, field: &str, id: &str) -> Option<&'v Value> {
    if matches_id(value, field, id) {
        return Some(value);
    }
    list(value)?.iter().find(|item| matches_id(item, field, id))
}

/// Run `f` on every entity node whose `field` equals `id`. Returns whether
/// any call reported a change.
pub fn visit_mut(
    value: &mut Value,
    field: &str,
    id: &str,
    f: &mut dyn FnMut(&mut Value) -> bool,
) -> bool {
    if matches_id(value, field, id) {
        return f(value);
    }
    let Some(items) = list_mut(value) else {
        return false;
    };
    let mut changed = false;
    for item in items.iter_mut().filter(|item| matches_id(item, field, id)) {
        changed |= f(item);
    }
    changed
}

/// Copy of `value` with `f` applied to the entity's nodes, or `None` when
/// the entity is absent or `f` changed nothing.
pub fn update(
    value: &Value,
    field: &str,
    id: &str,
    mut f: impl FnMut(&mut Value) -> bool,
) -> Option<Value> {
    let mut next = value.clone();
    if visit_mut(&mut next, field, id, &mut f) {
        Some(next)
    } else {
        None
    }
}

/// Copy of `current` with the entity's nodes put back to how they look in
/// `snapshot`. Everything else in `current` is kept.
pub fn restore(current: &Value, snapshot: &Value, field: &str, id: &str) -> Value {
    let Some(original) = find(snapshot, field, id) else {
        return current.clone();
    };
    let mut next = current.clone();
    visit_mut(&mut next, field, id, &mut |node| {
        *node = original.clone();
        true
    });
    next
}

/// Copy of `value` with every list element whose `field` equals `id`
/// removed, or `None` if there was none.
pub fn remove(value: &Value, field: &str, id: &str) -> Option<Value> {
    let mut next = value.clone();
    let removed = {
        let items = list_mut(&mut next)?;
        let before = items.len();
        items.retain(|item| !matches_id(item, field, id));
        items.len() != before
    };
    removed.then_some(next)
}

/// Copy of `current` with the entity's list element from `snapshot` put
/// back at its original position. Used to undo a removal without undoing
/// anything else that happened to the list since.
pub fn reinsert(current: &Value, snapshot: &Value, field: &str, id: &str) -> Value {
    let mut original = snapshot.clone();
    let Some(items) = list_mut(&mut original) else {
        return current.clone();
    };
    let Some(index) = items.iter().position(|item| matches_id(item, field, id)) else {
        return current.clone();
    };
    let item = items.swap_remove(index);

    let mut next = current.clone();
    if find(&next, field, id).is_some() {
        return next;
    }
    if let Some(list) = list_mut(&mut next) {
        let at = index.min(list.len());
        list.insert(at, item);
    }
    next
}

/// The array a list response keeps its items in: the value itself, or
/// the first array under a common envelope field.
pub fn list(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.get(envelope_field(map)?).and_then(Value::as_array),
        _ => None,
    }
}

pub fn list_mut(value: &mut Value) -> Option<&mut Vec<Value>> {
    if value.is_array() {
        return value.as_array_mut();
    }
    let map = value.as_object_mut()?;
    let field = envelope_field(map)?;
    map.get_mut(field).and_then(Value::as_array_mut)
}

/// Add `delta` to an integer counter, saturating at zero. Missing counters
/// start from zero.
pub fn adjust_counter(node: &mut Value, field: &str, delta: i64) -> bool {
    let Some(map) = node.as_object_mut() else {
        return false;
    };
    let current = map.get(field).and_then(Value::as_i64).unwrap_or(0);
    let next = current.saturating_add(delta).max(0);
    map.insert(field.to_string(), Value::from(next));
    next != current
}

pub fn get_bool(node: &Value, field: &str) -> bool {
    node.get(field).and_then(Value::as_bool).unwrap_or(false)
}

pub fn set_field(node: &mut Value, field: &str, value: Value) -> bool {
    let Some(map) = node.as_object_mut() else {
        return false;
    };
    if map.get(field) == Some(&value) {
        return false;
    }
    map.insert(field.to_string(), value);
    true
}
