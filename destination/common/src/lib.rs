use destinations_common_api::{Payload, Value};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use thiserror::Error;

pub mod client;
pub mod config;

pub use client::{HttpRequestClient, HttpResponse, RequestClient};

/// Additional context attached to an execution failure, e.g. the method, url and payload
/// of the request that failed.
pub type ErrorData = HashMap<&'static str, Value>;

/// A destination action is invoked by the host delivery framework with one validated payload
/// and delivers it to the third-party system.
#[async_trait::async_trait(?Send)]
pub trait DestinationAction {
    type Payload;
    type Output;

    async fn perform(&self, payload: &Self::Payload) -> Result<Self::Output, DestinationError>;
}

/// An action that also accepts a whole batch of payloads in a single invocation.
#[async_trait::async_trait(?Send)]
pub trait BatchDestinationAction: DestinationAction {
    async fn perform_batch(
        &self,
        payloads: &[Self::Payload],
    ) -> Result<Self::Output, DestinationError>;
}

#[derive(Error, Debug, PartialEq, Clone)]
pub enum DestinationError {
    #[error("ActionExecutionError: [{message}], can_retry: {can_retry}, code: {code:?}")]
    ActionExecutionError {
        message: String,
        can_retry: bool,
        code: Option<&'static str>,
        data: ErrorData,
    },
    #[error("ConfigurationError: [{message}], code: {code:?}")]
    ConfigurationError { message: String, code: Option<&'static str> },
    #[error("MissingArgumentError: [{message}]")]
    MissingArgumentError { message: String },
    #[error("JsonError: [{cause}]")]
    JsonError { cause: String },
}

impl From<serde_json::Error> for DestinationError {
    fn from(err: serde_json::Error) -> Self {
        DestinationError::JsonError { cause: format!("{:?}", err) }
    }
}

pub trait RetriableError {
    fn can_retry(&self) -> bool;
}

impl RetriableError for DestinationError {
    fn can_retry(&self) -> bool {
        match self {
            DestinationError::ActionExecutionError { can_retry, .. } => *can_retry,
            _ => false,
        }
    }
}

/// Deserializes the untyped payload received from the host framework into the typed
/// payload of an action. The error message reports the path of the offending field.
pub fn parse_payload<T: DeserializeOwned>(payload: &Payload) -> Result<T, DestinationError> {
    serde_path_to_error::deserialize(Value::Object(payload.clone())).map_err(|err| {
        DestinationError::MissingArgumentError {
            message: format!("Invalid payload. Field: [{}]. Err: {}", err.path(), err.inner()),
        }
    })
}

/// Deserializes a batch of untyped payloads. The first invalid payload fails the whole batch
/// and its index is reported in the error message.
pub fn parse_payloads<T: DeserializeOwned>(
    payloads: &[Payload],
) -> Result<Vec<T>, DestinationError> {
    payloads
        .iter()
        .enumerate()
        .map(|(index, payload)| {
            parse_payload(payload).map_err(|err| match err {
                DestinationError::MissingArgumentError { message } => {
                    DestinationError::MissingArgumentError {
                        message: format!("Batch index [{}]. {}", index, message),
                    }
                }
                other => other,
            })
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use maplit::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestPayload {
        name: String,
        enabled: Option<bool>,
    }

    #[test]
    fn only_retryable_execution_errors_can_be_retried() {
        assert!(DestinationError::ActionExecutionError {
            message: "".to_owned(),
            can_retry: true,
            code: None,
            data: Default::default(),
        }
        .can_retry());
        assert!(!DestinationError::ActionExecutionError {
            message: "".to_owned(),
            can_retry: false,
            code: None,
            data: hashmap!["url" => json!("http://localhost")],
        }
        .can_retry());
        assert!(!DestinationError::ConfigurationError {
            message: "".to_owned(),
            code: Some("INVALID_SETTINGS")
        }
        .can_retry());
        assert!(!DestinationError::MissingArgumentError { message: "".to_owned() }.can_retry());
        assert!(!DestinationError::JsonError { cause: "".to_owned() }.can_retry());
    }

    #[test]
    fn should_parse_a_typed_payload() {
        // Arrange
        let mut payload = Payload::new();
        payload.insert("name".to_owned(), json!("my_event"));

        // Act
        let result: Result<TestPayload, _> = parse_payload(&payload);

        // Assert
        assert_eq!(Ok(TestPayload { name: "my_event".to_owned(), enabled: None }), result);
    }

    #[test]
    fn should_report_the_path_of_an_invalid_field() {
        // Arrange
        let mut payload = Payload::new();
        payload.insert("name".to_owned(), json!("my_event"));
        payload.insert("enabled".to_owned(), json!("yes"));

        // Act
        let result: Result<TestPayload, _> = parse_payload(&payload);

        // Assert
        match result {
            Err(DestinationError::MissingArgumentError { message }) => {
                assert!(message.contains("Field: [enabled]"), "message was: {}", message)
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn should_report_the_index_of_the_invalid_payload_of_a_batch() {
        // Arrange
        let valid = json!({ "name": "first" });
        let invalid = json!({ "name": 42 });
        let payloads: Vec<Payload> =
            vec![valid.as_object().unwrap().clone(), invalid.as_object().unwrap().clone()];

        // Act
        let result: Result<Vec<TestPayload>, _> = parse_payloads(&payloads);

        // Assert
        match result {
            Err(DestinationError::MissingArgumentError { message }) => {
                assert!(message.starts_with("Batch index [1]."), "message was: {}", message);
                assert!(message.contains("Field: [name]"), "message was: {}", message)
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn should_parse_every_payload_of_a_batch() {
        // Arrange
        let payloads: Vec<Payload> = vec![
            json!({ "name": "first" }).as_object().unwrap().clone(),
            json!({ "name": "second", "enabled": true }).as_object().unwrap().clone(),
        ];

        // Act
        let result: Result<Vec<TestPayload>, _> = parse_payloads(&payloads);

        // Assert
        assert_eq!(
            Ok(vec![
                TestPayload { name: "first".to_owned(), enabled: None },
                TestPayload { name: "second".to_owned(), enabled: Some(true) },
            ]),
            result
        );
    }
}
