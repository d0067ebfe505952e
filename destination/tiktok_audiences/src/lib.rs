use destinations_destination_common::{
    BatchDestinationAction, DestinationAction, DestinationError, HttpResponse, RequestClient,
};
use log::*;
use maplit::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod api;
pub mod payload;
pub mod processor;

pub use payload::{AudienceMembership, AudiencePayload};

pub const TIKTOK_API_BASE_URL: &str = "https://business-api.tiktok.com/open_api/";
pub const TIKTOK_API_VERSION: &str = "v1.3";
pub const TIKTOK_ACCESS_TOKEN_HEADER: &str = "Access-Token";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TikTokAudiencesSettings {
    /// The advertisers whose audiences are updated
    pub advertiser_ids: Vec<String>,

    /// The OAuth access token of the TikTok Business API
    pub access_token: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,
}

fn default_api_base_url() -> String {
    TIKTOK_API_BASE_URL.to_owned()
}

fn default_api_version() -> String {
    TIKTOK_API_VERSION.to_owned()
}

impl TikTokAudiencesSettings {
    /// The headers the transport must attach to every TikTok request.
    pub fn request_headers(&self) -> HashMap<String, String> {
        hashmap![TIKTOK_ACCESS_TOKEN_HEADER.to_owned() => self.access_token.clone()]
    }

    pub fn batch_update_url(&self) -> String {
        format!("{}{}/segment/mapping/", self.api_base_url, self.api_version)
    }
}

/// The membership change requested to TikTok.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudienceAction {
    Add,
    Remove,
}

impl AudienceAction {
    /// The verb of the segment mapping API.
    pub fn verb(&self) -> &'static str {
        match self {
            AudienceAction::Add => "add",
            AudienceAction::Remove => "delete",
        }
    }
}

/// Adds users to, or removes users from, TikTok audiences.
pub struct AudienceUpdate<C: RequestClient> {
    client: C,
    settings: TikTokAudiencesSettings,
    action: AudienceAction,
}

impl<C: RequestClient> std::fmt::Display for AudienceUpdate<C> {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.action {
            AudienceAction::Add => fmt.write_str("TikTokAudiencesAddUser")?,
            AudienceAction::Remove => fmt.write_str("TikTokAudiencesRemoveUser")?,
        };
        Ok(())
    }
}

impl<C: RequestClient> AudienceUpdate<C> {
    pub fn add_user(client: C, settings: TikTokAudiencesSettings) -> Self {
        AudienceUpdate { client, settings, action: AudienceAction::Add }
    }

    pub fn remove_user(client: C, settings: TikTokAudiencesSettings) -> Self {
        AudienceUpdate { client, settings, action: AudienceAction::Remove }
    }
}

#[async_trait::async_trait(?Send)]
impl<C: RequestClient> DestinationAction for AudienceUpdate<C> {
    type Payload = AudiencePayload;
    type Output = Option<HttpResponse>;

    async fn perform(
        &self,
        payload: &AudiencePayload,
    ) -> Result<Option<HttpResponse>, DestinationError> {
        self.perform_batch(std::slice::from_ref(payload)).await
    }
}

#[async_trait::async_trait(?Send)]
impl<C: RequestClient> BatchDestinationAction for AudienceUpdate<C> {
    async fn perform_batch(
        &self,
        payloads: &[AudiencePayload],
    ) -> Result<Option<HttpResponse>, DestinationError> {
        trace!("{} - received batch of [{}] payloads", self, payloads.len());
        processor::process_payload(&self.client, &self.settings, payloads, self.action.verb()).await
    }
}
