use destinations_common_api::{Payload, Value};
use destinations_destination_common::{
    DestinationAction, DestinationError, HttpResponse, RequestClient,
};
use log::*;
use maplit::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod mapper;

pub const ENCHARGE_INGEST_API_URL: &str = "https://ingest.encharge.io/v1/";
pub const ENCHARGE_TOKEN_HEADER: &str = "X-Encharge-Token";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EnchargeSettings {
    /// The Encharge API key, sent with every request
    pub api_key: String,

    /// The URL of the Encharge ingest API
    #[serde(default = "default_ingest_url")]
    pub ingest_url: String,
}

fn default_ingest_url() -> String {
    ENCHARGE_INGEST_API_URL.to_owned()
}

impl EnchargeSettings {
    /// The headers the transport must attach to every Encharge request.
    pub fn request_headers(&self) -> HashMap<String, String> {
        hashmap![ENCHARGE_TOKEN_HEADER.to_owned() => self.api_key.clone()]
    }
}

/// A track event for a known or anonymous person, as delivered by the host framework.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TrackEventPayload(pub Payload);

impl From<Payload> for TrackEventPayload {
    fn from(payload: Payload) -> Self {
        TrackEventPayload(payload)
    }
}

/// Forwards track events to the Encharge ingest API.
pub struct TrackEvent<C: RequestClient> {
    client: C,
    ingest_url: String,
}

impl<C: RequestClient> std::fmt::Display for TrackEvent<C> {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        fmt.write_str("EnchargeTrackEvent")?;
        Ok(())
    }
}

impl<C: RequestClient> TrackEvent<C> {
    pub fn new(client: C, settings: &EnchargeSettings) -> TrackEvent<C> {
        TrackEvent { client, ingest_url: settings.ingest_url.clone() }
    }
}

#[async_trait::async_trait(?Send)]
impl<C: RequestClient> DestinationAction for TrackEvent<C> {
    type Payload = TrackEventPayload;
    type Output = HttpResponse;

    /// Sends the event with exactly one POST request. The response status is not inspected.
    #[tracing::instrument(level = "info", name = "EnchargeTrackEvent", err, skip_all)]
    async fn perform(&self, payload: &TrackEventPayload) -> Result<HttpResponse, DestinationError> {
        trace!("EnchargeTrackEvent - received payload: \n[{:?}]", payload);
        let body = Value::Object(mapper::build_track_event_body(&payload.0));
        let response = self.client.post_json(&self.ingest_url, &body).await?;
        debug!("EnchargeTrackEvent - Encharge API returned status [{}]", response.status);
        Ok(response)
    }
}
