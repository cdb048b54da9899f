// EVSE device HTTP client
//
// Wraps `reqwest::Client` with device URL construction, status checking,
// and JSON decoding. Endpoint groups (system, settings, cards, alarms) are
// implemented as inherent methods in separate files so this module stays
// focused on transport mechanics.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::Ack;
use crate::transport::TransportConfig;

/// Longest body excerpt carried in errors and logs.
const BODY_PREVIEW_LEN: usize = 200;

/// Raw HTTP client for the charging controller's `/api` surface.
///
/// Cheap to clone: `reqwest::Client` is reference-counted internally.
/// Every method maps to exactly one request; nothing is retried or cached.
#[derive(Debug, Clone)]
pub struct EvseClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl EvseClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the device origin, e.g. `http://192.168.4.1`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            timeout: transport.timeout,
        })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            timeout: TransportConfig::default().timeout,
        }
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/api/{path}"))?)
    }

    /// Build `{base}/api/{collection}/{id}` with `id` percent-encoded as a
    /// single path segment.
    pub(crate) fn item_url(&self, collection: &str, id: &str) -> Result<Url, Error> {
        let mut url = self.api_url(collection)?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .push(id);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode a JSON body from a 2xx response.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.send(self.http.get(url)).await?;
        self.parse_json(resp).await
    }

    /// Send a GET request with a per-request timeout and only check the status.
    pub(crate) async fn get_status_only(&self, url: Url, bound: Duration) -> Result<(), Error> {
        debug!("GET {} (bound {:?})", url, bound);

        let resp = self
            .http
            .get(url)
            .timeout(bound)
            .send()
            .await
            .map_err(|e| map_transport(e, bound))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(Error::Http {
            status: status.as_u16(),
            body: preview(&body).to_owned(),
        })
    }

    /// Send a POST request with a JSON body and decode the `{success, msg}`
    /// acknowledgement.
    pub(crate) async fn post<B: Serialize + Sync + ?Sized>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<Ack, Error> {
        debug!("POST {}", url);

        let resp = self.send(self.http.post(url).json(body)).await?;
        self.parse_ack(resp).await
    }

    /// Send a DELETE request and decode the acknowledgement.
    pub(crate) async fn delete(&self, url: Url) -> Result<Ack, Error> {
        debug!("DELETE {}", url);

        let resp = self.send(self.http.delete(url)).await?;
        self.parse_ack(resp).await
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, Error> {
        builder
            .send()
            .await
            .map_err(|e| map_transport(e, self.timeout))
    }

    /// Check the HTTP status, then decode the body as `T`.
    async fn parse_json<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(|e| map_transport(e, self.timeout))?;

        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                body: preview(&body).to_owned(),
            });
        }

        trace!(len = body.len(), "decoding response body");
        decode(&body)
    }

    /// Decode an acknowledgement regardless of HTTP status.
    ///
    /// The device reports outcome through the `success` flag, so a 4xx/5xx
    /// with a well-formed body is still an answer. Only an undecodable body
    /// on a non-2xx status becomes `Error::Http`.
    async fn parse_ack(&self, resp: reqwest::Response) -> Result<Ack, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(|e| map_transport(e, self.timeout))?;

        match decode::<Ack>(&body) {
            Ok(ack) => Ok(ack),
            Err(_) if !status.is_success() => Err(Error::Http {
                status: status.as_u16(),
                body: preview(&body).to_owned(),
            }),
            Err(e) => Err(e),
        }
    }
}

fn map_transport(err: reqwest::Error, timeout: Duration) -> Error {
    if err.is_timeout() {
        Error::Timeout {
            timeout_secs: timeout.as_secs(),
        }
    } else {
        Error::Transport(err)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    })
}

/// Clip `body` to at most `BODY_PREVIEW_LEN` bytes on a char boundary.
fn preview(body: &str) -> &str {
    if body.len() <= BODY_PREVIEW_LEN {
        return body;
    }
    let mut end = BODY_PREVIEW_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
