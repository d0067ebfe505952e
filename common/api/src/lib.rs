pub use serde_json::{Map, Value};

/// The inbound representation of an event as delivered by the host framework:
/// a map of field names to JSON values.
pub type Payload = Map<String, Value>;

/// Typed accessors over a JSON [`Value`].
pub trait ValueExt {
    fn get_map(&self) -> Option<&Payload>;
}

impl ValueExt for Value {
    fn get_map(&self) -> Option<&Payload> {
        match self {
            Value::Object(payload) => Some(payload),
            _ => None,
        }
    }
}

/// Returns a new map holding only the entries of `payload` whose key is in `keys`.
/// Keys missing from the source are not added.
pub fn pick(payload: &Payload, keys: &[&str]) -> Payload {
    keys.iter()
        .filter_map(|key| payload.get(*key).map(|value| ((*key).to_owned(), value.clone())))
        .collect()
}

/// Returns a new map holding every entry of `payload` except the ones whose key is in `keys`.
pub fn omit(payload: &Payload, keys: &[&str]) -> Payload {
    payload
        .iter()
        .filter(|(key, _)| !keys.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
