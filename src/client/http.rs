//! Blocking HTTP client for the story server.
//!
//! Every call is blocking; streaming calls are meant to run on a
//! [`StreamActor`](super::StreamActor) thread, never on the UI thread.

use super::error::{summarize_error_body, ClientError};
use crate::config::HttpSettings;
use crate::identity::ClientSessionId;
use crate::stream::EventReader;
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result type for client calls.
pub type ClientResult<T> = Result<T, ClientError>;

/// Streaming response body as story events.
pub type StoryStream = EventReader<Response>;

#[derive(Debug, Serialize)]
struct SessionRequest<'a> {
    session_id: &'a str,
}

#[derive(Debug, Serialize)]
struct TurnRequest<'a> {
    session_id: &'a str,
    action: &'a str,
}

#[derive(Debug, Deserialize)]
struct StoryResponse {
    #[serde(default)]
    story: String,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    ok: bool,
}

/// Client for one story session on one server.
#[derive(Debug, Clone)]
pub struct StoryClient {
    http: Client,
    base_url: String,
    session_id: ClientSessionId,
    request_timeout: Option<Duration>,
}

impl StoryClient {
    /// Build a client.
    pub fn new(
        base_url: &str,
        session_id: ClientSessionId,
        settings: &HttpSettings,
    ) -> ClientResult<Self> {
        // No client-wide timeout: streamed bodies stay open for as long as
        // the model keeps generating.
        let http = Client::builder()
            .connect_timeout(settings.connect_timeout())
            .timeout(None)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session_id,
            request_timeout: settings.request_timeout(),
        })
    }

    /// The session this client speaks for.
    pub const fn session_id(&self) -> &ClientSessionId {
        &self.session_id
    }

    /// Server base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET /health`.
    pub fn health(&self) -> ClientResult<bool> {
        let mut request = self.http.get(self.url("/health"));
        if let Some(timeout) = self.request_timeout {
            request = request.timeout(timeout);
        }
        let body: HealthResponse = read_json(check(request.send()?)?)?;
        Ok(body.ok)
    }

    /// Current transcript for this session; empty if the server has none.
    pub fn get_story(&self) -> ClientResult<String> {
        self.post_story("/api/story/get", &self.session_body())
    }

    /// Start a new story and wait for the whole reply.
    pub fn new_story(&self) -> ClientResult<String> {
        self.post_story("/api/story/new", &self.session_body())
    }

    /// Submit an action and wait for the whole reply.
    pub fn take_turn(&self, action: &str) -> ClientResult<String> {
        self.post_story("/api/story/turn", &self.turn_body(action))
    }

    /// Start a new story, streaming the reply.
    pub fn new_story_stream(&self) -> ClientResult<StoryStream> {
        self.post_stream("/api/story/new_stream", &self.session_body())
    }

    /// Submit an action, streaming the reply.
    pub fn turn_stream(&self, action: &str) -> ClientResult<StoryStream> {
        self.post_stream("/api/story/turn_stream", &self.turn_body(action))
    }

    fn session_body(&self) -> SessionRequest<'_> {
        SessionRequest {
            session_id: self.session_id.as_str(),
        }
    }

    fn turn_body<'a>(&'a self, action: &'a str) -> TurnRequest<'a> {
        TurnRequest {
            session_id: self.session_id.as_str(),
            action,
        }
    }

    fn post_story<B: Serialize>(&self, path: &str, body: &B) -> ClientResult<String> {
        let mut request = self.http.post(self.url(path)).json(body);
        if let Some(timeout) = self.request_timeout {
            request = request.timeout(timeout);
        }
        tracing::debug!(path, "story request");
        let response: StoryResponse = read_json(check(request.send()?)?)?;
        Ok(response.story)
    }

    fn post_stream<B: Serialize>(&self, path: &str, body: &B) -> ClientResult<StoryStream> {
        tracing::debug!(path, "stream request");
        let response = check(self.http.post(self.url(path)).json(body).send()?)?;
        Ok(EventReader::new(response))
    }
}

/// Turn a non-success response into [`ClientError::Status`].
fn check(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    let message = summarize_error_body(status, &body);
    tracing::warn!(%status, detail = %message, "story server returned an error");
    Err(ClientError::Status { status, message })
}

fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> ClientResult<T> {
    let bytes = response.bytes()?;
    Ok(serde_json::from_slice(&bytes)?)
}
