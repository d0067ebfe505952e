use config_rs::ConfigError;
use destinations_common_api::Payload;
use destinations_common_logger::{setup_logger, LogWorkerGuard, LoggerError};
use destinations_destination_common::{
    parse_payload, parse_payloads, BatchDestinationAction, DestinationAction, DestinationError,
    HttpRequestClient, HttpResponse,
};
use destinations_destination_encharge::{TrackEvent, TrackEventPayload};
use destinations_destination_tiktok_audiences::{AudiencePayload, AudienceUpdate};
use log::*;
use thiserror::Error;

pub mod config;

use crate::config::DestinationsConfig;

#[derive(Error, Debug)]
pub enum DestinationsError {
    #[error("ConfigurationError: [{message}]")]
    ConfigurationError { message: String },
    #[error("LoggerError: [{0}]")]
    LoggerError(#[from] LoggerError),
    #[error("DestinationError: [{0}]")]
    DestinationError(#[from] DestinationError),
}

impl From<ConfigError> for DestinationsError {
    fn from(err: ConfigError) -> Self {
        DestinationsError::ConfigurationError { message: format!("{}", err) }
    }
}

/// The destination actions available to the host delivery framework,
/// each one with its own credentialed transport.
pub struct Destinations {
    pub encharge_track_event: TrackEvent<HttpRequestClient>,
    pub tiktok_add_user: AudienceUpdate<HttpRequestClient>,
    pub tiktok_remove_user: AudienceUpdate<HttpRequestClient>,
}

impl Destinations {
    pub fn new(config: &DestinationsConfig) -> Result<Destinations, DestinationError> {
        let encharge_client =
            HttpRequestClient::new(&config.http_client, &config.encharge.request_headers())?;
        let tiktok_client = HttpRequestClient::new(
            &config.http_client,
            &config.tiktok_audiences.request_headers(),
        )?;

        let destinations = Destinations {
            encharge_track_event: TrackEvent::new(encharge_client, &config.encharge),
            tiktok_add_user: AudienceUpdate::add_user(
                tiktok_client.clone(),
                config.tiktok_audiences.clone(),
            ),
            tiktok_remove_user: AudienceUpdate::remove_user(
                tiktok_client,
                config.tiktok_audiences.clone(),
            ),
        };

        info!(
            "Destinations configured: [{}], [{}], [{}]",
            destinations.encharge_track_event,
            destinations.tiktok_add_user,
            destinations.tiktok_remove_user
        );

        Ok(destinations)
    }

    /// Delivers an untyped track event received from the host framework to Encharge.
    pub async fn track_event(&self, payload: &Payload) -> Result<HttpResponse, DestinationError> {
        let payload: TrackEventPayload = parse_payload(payload)?;
        self.encharge_track_event.perform(&payload).await
    }

    /// Adds the users of an untyped batch to their TikTok audiences.
    /// Nothing is sent if one payload of the batch is invalid.
    pub async fn add_users(
        &self,
        payloads: &[Payload],
    ) -> Result<Option<HttpResponse>, DestinationError> {
        let payloads: Vec<AudiencePayload> = parse_payloads(payloads)?;
        self.tiktok_add_user.perform_batch(&payloads).await
    }

    /// Removes the users of an untyped batch from their TikTok audiences.
    /// Nothing is sent if one payload of the batch is invalid.
    pub async fn remove_users(
        &self,
        payloads: &[Payload],
    ) -> Result<Option<HttpResponse>, DestinationError> {
        let payloads: Vec<AudiencePayload> = parse_payloads(payloads)?;
        self.tiktok_remove_user.perform_batch(&payloads).await
    }
}

/// Reads the configuration from `config_dir`, starts the logger and builds the destinations.
/// The returned guard must be kept alive for the logger to keep writing.
pub fn init(config_dir: &str) -> Result<(LogWorkerGuard, Destinations), DestinationsError> {
    let config = config::build_config(config_dir)?;
    let guard = setup_logger(&config.logger)?;
    let destinations = Destinations::new(&config)?;
    Ok((guard, destinations))
}
