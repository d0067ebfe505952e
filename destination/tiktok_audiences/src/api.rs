use crate::processor::{BatchElement, IdSchema};
use crate::TikTokAudiencesSettings;
use destinations_destination_common::{DestinationError, HttpResponse, RequestClient};
use log::*;
use serde::Serialize;

/// The body of a segment mapping request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchUpdateRequest {
    pub advertiser_ids: Vec<String>,
    pub action: String,
    pub id_schema: IdSchema,
    pub batch_data: Vec<BatchElement>,
}

/// Client of the TikTok audience APIs, bound to the advertiser selected for the batch.
pub struct TikTokAudiences<'a, C: RequestClient> {
    request: &'a C,
    batch_update_url: String,
    selected_advertiser_id: Option<String>,
}

impl<'a, C: RequestClient> TikTokAudiences<'a, C> {
    pub fn new(
        request: &'a C,
        settings: &TikTokAudiencesSettings,
        selected_advertiser_id: Option<String>,
    ) -> Self {
        TikTokAudiences {
            request,
            batch_update_url: settings.batch_update_url(),
            selected_advertiser_id,
        }
    }

    pub fn selected_advertiser_id(&self) -> Option<&str> {
        self.selected_advertiser_id.as_deref()
    }

    /// Adds or removes the users of `elements` from their audiences.
    pub async fn batch_update(
        &self,
        elements: &BatchUpdateRequest,
    ) -> Result<HttpResponse, DestinationError> {
        trace!(
            "TikTokAudiences - batch update of [{}] users for advertiser [{:?}]",
            elements.batch_data.len(),
            self.selected_advertiser_id
        );
        let body = serde_json::to_value(elements)?;
        self.request.post_json(&self.batch_update_url, &body).await
    }
}
