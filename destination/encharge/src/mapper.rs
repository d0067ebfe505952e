use destinations_common_api::{omit, pick, Payload, Value, ValueExt};

/// Fields moved into the `context` object of the request body.
pub const CONTEXT_FIELDS: [&str; 5] = ["ip", "userAgent", "campaign", "page", "location"];

/// Fields not copied to the top level of the request body.
pub const OMITTED_FIELDS: [&str; 6] = ["ip", "userAgent", "campaign", "page", "location", "user"];

/// Identity fields copied into the `user` object of the request body.
pub const USER_IDENTITY_FIELDS: [&str; 4] = ["email", "userId", "segmentAnonymousId", "groupId"];

/// The free-form traits merged into the `user` object.
pub const USER_FIELDS_KEY: &str = "userFields";

pub const CONTEXT_KEY: &str = "context";
pub const USER_KEY: &str = "user";

/// Builds the body of an Encharge ingest request from a track event payload.
///
/// The body contains:
/// - every payload field except the [`OMITTED_FIELDS`];
/// - a `context` object with the [`CONTEXT_FIELDS`] present in the payload;
/// - a `user` object with the [`USER_IDENTITY_FIELDS`] present in the payload, overlaid with
///   the entries of `userFields`. On key collision `userFields` wins.
pub fn build_track_event_body(payload: &Payload) -> Payload {
    let mut body = omit(payload, &OMITTED_FIELDS);

    body.insert(CONTEXT_KEY.to_owned(), Value::Object(pick(payload, &CONTEXT_FIELDS)));

    let mut user = pick(payload, &USER_IDENTITY_FIELDS);
    if let Some(user_fields) = payload.get(USER_FIELDS_KEY).and_then(ValueExt::get_map) {
        for (key, value) in user_fields {
            user.insert(key.clone(), value.clone());
        }
    }
    body.insert(USER_KEY.to_owned(), Value::Object(user));

    body
}
