use std::error::Error as StdError;
use std::time::Duration;

use recolor_contracts::{ColorizeError, TransportTimeouts};
use reqwest::blocking::{Client as HttpClient, ClientBuilder};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::{json, Value};

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// One authenticated JSON POST.
///
/// Implementations report only transport failures as errors; any HTTP
/// status comes back as a reply and is judged by [`invoke`].
pub trait Transport: Send + Sync {
    fn name(&self) -> &str;
    fn post_json(&self, endpoint: &str, api_key: &str, body: &str)
        -> Result<HttpReply, ColorizeError>;
}

/// Blocking reqwest client. Build once and share; the client pools
/// connections internally.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: HttpClient,
}

impl HttpTransport {
    pub fn new(timeouts: TransportTimeouts) -> Result<Self, ColorizeError> {
        let http = client_builder(timeouts)
            .build()
            .map_err(|err| ColorizeError::Config(format!("HTTP client setup failed: {err}")))?;
        Ok(Self::from_client(http))
    }

    pub fn from_client(http: HttpClient) -> Self {
        Self { http }
    }
}

pub fn client_builder(timeouts: TransportTimeouts) -> ClientBuilder {
    HttpClient::builder()
        .connect_timeout(timeouts.connect)
        .timeout(request_deadline(timeouts))
}

/// The blocking client has one deadline for everything after connect, so
/// it takes the larger of the read and write bounds.
pub fn request_deadline(timeouts: TransportTimeouts) -> Duration {
    timeouts.read.max(timeouts.write)
}

impl Transport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    fn post_json(
        &self,
        endpoint: &str,
        api_key: &str,
        body: &str,
    ) -> Result<HttpReply, ColorizeError> {
        let response = self
            .http
            .post(endpoint)
            .bearer_auth(api_key)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body.to_string())
            .send()
            .map_err(|err| ColorizeError::transport(describe_transport_error(&err)))?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|err| {
            ColorizeError::transport(format!(
                "response body read failed: {}",
                describe_transport_error(&err)
            ))
        })?;
        Ok(HttpReply { status, body })
    }
}

/// Offline transport: answers every request with the input image echoed
/// back in the `message.images` slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryrunTransport;

impl Transport for DryrunTransport {
    fn name(&self) -> &str {
        "dryrun"
    }

    fn post_json(
        &self,
        _endpoint: &str,
        _api_key: &str,
        body: &str,
    ) -> Result<HttpReply, ColorizeError> {
        let request: Value = serde_json::from_str(body).unwrap_or(Value::Null);
        let image_url = request
            .pointer("/messages/0/content")
            .and_then(Value::as_array)
            .and_then(|parts| {
                parts
                    .iter()
                    .find(|part| part.get("type").and_then(Value::as_str) == Some("image_url"))
            })
            .and_then(|part| part.pointer("/image_url/url"))
            .and_then(Value::as_str);
        let Some(url) = image_url else {
            return Ok(HttpReply {
                status: 400,
                body: json!({ "error": "dryrun request carried no image" }).to_string(),
            });
        };
        let reply = json!({
            "id": "dryrun",
            "model": request.get("model").cloned().unwrap_or(Value::Null),
            "choices": [{
                "index": 0,
                "finish_reason": "stop",
                "message": {
                    "role": "assistant",
                    "content": "dryrun: input image echoed",
                    "images": [{
                        "type": "image_url",
                        "image_url": { "url": url }
                    }]
                }
            }]
        });
        Ok(HttpReply {
            status: 200,
            body: reply.to_string(),
        })
    }
}

/// Issues the request and returns the raw body of a 2xx reply.
pub fn invoke(
    transport: &dyn Transport,
    endpoint: &str,
    api_key: &str,
    body: &str,
) -> Result<String, ColorizeError> {
    let reply = transport.post_json(endpoint, api_key, body)?;
    if !(200..300).contains(&reply.status) {
        return Err(ColorizeError::http_status(reply.status, reply.body));
    }
    if reply.body.trim().is_empty() {
        return Err(ColorizeError::Protocol(format!(
            "no content in response (status {})",
            reply.status
        )));
    }
    Ok(reply.body)
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    let label = if err.is_timeout() {
        "timed out"
    } else if err.is_connect() {
        "connect failed"
    } else {
        "transport error"
    };
    let mut parts = vec![err.to_string()];
    let mut cause = err.source();
    while let Some(inner) = cause {
        let text = inner.to_string();
        if parts.last() != Some(&text) {
            parts.push(text);
        }
        cause = inner.source();
    }
    format!("{label}: {}", parts.join(" | caused by: "))
}
