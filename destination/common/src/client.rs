use crate::config::HttpClientConfig;
use crate::DestinationError;
use destinations_common_api::Value;
use log::*;
use maplit::*;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

/// The transport used by the destinations to reach the third-party APIs.
/// Credentials, TLS and timeouts are owned by the implementation, not by the destinations.
#[async_trait::async_trait(?Send)]
pub trait RequestClient {
    /// Sends `payload` as a JSON body with a POST request to `url`.
    async fn post_json(
        &self,
        url: &str,
        payload: &Value,
    ) -> Result<HttpResponse, DestinationError>;
}

/// The response of a request, with the body already read.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub url: String,
    pub method: &'static str,
    pub status: u16,
    pub body: String,
}

/// A `reqwest` based [`RequestClient`] that attaches a fixed set of headers
/// (e.g. the destination credentials) to every request.
#[derive(Clone)]
pub struct HttpRequestClient {
    client: Client,
}

impl HttpRequestClient {
    pub fn new(
        config: &HttpClientConfig,
        default_headers: &HashMap<String, String>,
    ) -> Result<HttpRequestClient, DestinationError> {
        let mut headers = HeaderMap::new();
        headers.insert(reqwest::header::ACCEPT, HeaderValue::from_static("application/json"));
        for (name, value) in default_headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
                DestinationError::ConfigurationError {
                    message: format!("Invalid header name [{}]. Err: {:?}", name, err),
                    code: None,
                }
            })?;
            let mut header_value = HeaderValue::from_str(value).map_err(|err| {
                DestinationError::ConfigurationError {
                    message: format!("Invalid value for header [{}]. Err: {:?}", name, err),
                    code: None,
                }
            })?;
            header_value.set_sensitive(true);
            headers.insert(header_name, header_value);
        }

        let mut client_builder = Client::builder()
            .use_rustls_tls()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs()));

        if config.disable_ssl_verification {
            client_builder = client_builder.danger_accept_invalid_certs(true)
        }

        let client = client_builder.build().map_err(|err| DestinationError::ConfigurationError {
            message: format!("Error while building HttpRequestClient. Err: {:?}", err),
            code: None,
        })?;

        Ok(HttpRequestClient { client })
    }
}

#[async_trait::async_trait(?Send)]
impl RequestClient for HttpRequestClient {
    async fn post_json(
        &self,
        url: &str,
        payload: &Value,
    ) -> Result<HttpResponse, DestinationError> {
        trace!("HttpRequestClient - HTTP POST - url: {}", url);

        let response = self.client.post(url).json(payload).send().await.map_err(|err| {
            DestinationError::ActionExecutionError {
                can_retry: true,
                message: format!("HttpRequestClient - Connection failed. Err: {:?}", err),
                code: None,
                data: hashmap![
                    "method" => "POST".into(),
                    "url" => url.into(),
                    "payload" => payload.clone()
                ],
            }
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|err| DestinationError::ActionExecutionError {
            can_retry: true,
            message: format!("HttpRequestClient - Cannot extract response body. Err: {:?}", err),
            code: None,
            data: hashmap![
                "method" => "POST".into(),
                "url" => url.into(),
            ],
        })?;

        debug!("HttpRequestClient - POST [{}] returned status [{}]", url, status);

        Ok(HttpResponse { url: url.to_owned(), method: "POST", status, body })
    }
}
