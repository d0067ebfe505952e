use crate::api::{BatchUpdateRequest, TikTokAudiences};
use crate::payload::{AudienceMembership, AudiencePayload};
use crate::TikTokAudiencesSettings;
use destinations_destination_common::{DestinationError, HttpResponse, RequestClient};
use lazy_static::lazy_static;
use log::*;
use maplit::*;
use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};

pub const INVALID_SETTINGS_ERROR_CODE: &str = "INVALID_SETTINGS";
pub const INVALID_SETTINGS_ERROR_MESSAGE: &str =
    "At least one of `Send Email`, or `Send Advertising ID` must be set to `true`.";
pub const BATCH_UPDATE_FAILED_ERROR_MESSAGE: &str =
    "Error while attempting to update TikTok Audience. This batch will be retried.";

lazy_static! {
    static ref EMAIL_SUBADDRESS_REGEX: Regex = Regex::new(r"\+.*@").expect("valid regex");
}

/// The type of hashed identifier held by a slot of a [`BatchElement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IdType {
    #[serde(rename = "EMAIL_SHA256")]
    EmailSha256,
    #[serde(rename = "IDFA_SHA256")]
    IdfaSha256,
}

/// The ordered identifier types of every batch element: `id_schema[i]` describes `element[i]`.
pub type IdSchema = Vec<IdType>;

/// One identifier of a user. `Empty` serializes to `{}` and keeps the element aligned with
/// the schema when the user lacks that identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IdSlot {
    Hashed { id: String, audience_ids: Vec<String> },
    Empty {},
}

/// The identifiers of one user, one slot per [`IdSchema`] entry.
pub type BatchElement = Vec<IdSlot>;

/// Validates the batch using its first payload as representative of the whole batch.
pub fn validate(payloads: &[AudiencePayload]) -> Result<(), DestinationError> {
    match payloads.first().map(AudiencePayload::membership) {
        Some(membership) if !membership.send_email && !membership.send_advertising_id => {
            Err(DestinationError::ConfigurationError {
                message: INVALID_SETTINGS_ERROR_MESSAGE.to_owned(),
                code: Some(INVALID_SETTINGS_ERROR_CODE),
            })
        }
        _ => Ok(()),
    }
}

pub fn get_id_schema(membership: &AudienceMembership) -> IdSchema {
    let mut id_schema = vec![];
    if membership.send_email {
        id_schema.push(IdType::EmailSha256);
    }
    if membership.send_advertising_id {
        id_schema.push(IdType::IdfaSha256);
    }
    id_schema
}

/// Canonicalizes an email the way TikTok does before hashing: the `+tag` sub-address is
/// dropped, every `.` is removed and the result is lowercased.
pub fn normalize_email(email: &str) -> String {
    EMAIL_SUBADDRESS_REGEX.replace(email, "@").replace('.', "").to_lowercase()
}

pub fn sha256_hex(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}

/// Builds the batch data: one element per payload that has an email or an advertising ID.
/// Payloads with neither are skipped.
pub fn extract_users(payloads: &[AudiencePayload], id_schema: &[IdType]) -> Vec<BatchElement> {
    payloads
        .iter()
        .map(AudiencePayload::membership)
        .filter(|membership| membership.email().is_some() || membership.advertising_id().is_some())
        .map(|membership| {
            id_schema
                .iter()
                .map(|id_type| {
                    let id = match id_type {
                        IdType::EmailSha256 => membership.email().map(normalize_email),
                        IdType::IdfaSha256 => membership.advertising_id().map(str::to_owned),
                    };
                    match id {
                        Some(id) => IdSlot::Hashed {
                            id: sha256_hex(&id),
                            audience_ids: vec![membership.audience_id.clone()],
                        },
                        None => IdSlot::Empty {},
                    }
                })
                .collect()
        })
        .collect()
}

/// Validation and schema derivation only look at the first payload: the host is expected to
/// group payloads with the same flags and advertiser in the same batch.
fn warn_on_heterogeneous_batch(payloads: &[AudiencePayload]) {
    if let Some((first, others)) = payloads.split_first() {
        let first = first.membership();
        for (index, payload) in others.iter().enumerate() {
            let membership = payload.membership();
            if membership.send_email != first.send_email
                || membership.send_advertising_id != first.send_advertising_id
                || membership.selected_advertiser_id != first.selected_advertiser_id
            {
                warn!(
                    "TikTokAudiences - payload at index [{}] does not share the settings of the \
                     first payload of the batch. It is processed with the first payload settings.",
                    index + 1
                );
            }
        }
    }
}

/// Sends the users of the batch to TikTok with a single segment mapping call.
///
/// Returns `Ok(None)` without calling TikTok when no payload carries an identifier.
/// Any response status other than 200 is a retryable error: audiences are not
/// available for updates until 1-2 minutes after their creation.
#[tracing::instrument(
    level = "info",
    name = "TikTokAudiencesBatchUpdate",
    err,
    skip_all,
    fields(action = action, batch_size = payloads.len())
)]
pub async fn process_payload<C: RequestClient>(
    request: &C,
    settings: &TikTokAudiencesSettings,
    payloads: &[AudiencePayload],
    action: &str,
) -> Result<Option<HttpResponse>, DestinationError> {
    validate(payloads)?;

    let representative = match payloads.first() {
        Some(payload) => payload.membership(),
        None => {
            debug!("TikTokAudiences - empty batch, nothing to send");
            return Ok(None);
        }
    };
    warn_on_heterogeneous_batch(payloads);

    let api_client =
        TikTokAudiences::new(request, settings, representative.selected_advertiser_id.clone());

    let id_schema = get_id_schema(representative);
    let users = extract_users(payloads, &id_schema);

    if users.is_empty() {
        debug!("TikTokAudiences - no payload with an email or advertising ID, nothing to send");
        return Ok(None);
    }

    let elements = BatchUpdateRequest {
        advertiser_ids: settings.advertiser_ids.clone(),
        action: action.to_owned(),
        id_schema,
        batch_data: users,
    };
    let response = api_client.batch_update(&elements).await?;

    if response.status != 200 {
        return Err(DestinationError::ActionExecutionError {
            message: BATCH_UPDATE_FAILED_ERROR_MESSAGE.to_owned(),
            can_retry: true,
            code: None,
            data: hashmap![
                "method" => response.method.into(),
                "url" => response.url.into(),
                "status" => response.status.into(),
                "body" => response.body.into(),
            ],
        });
    }

    debug!(
        "TikTokAudiences - [{}] users sent for advertiser [{:?}]",
        elements.batch_data.len(),
        api_client.selected_advertiser_id()
    );
    Ok(Some(response))
}
