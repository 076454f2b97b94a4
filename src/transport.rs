use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::multipart;
use serde::Deserialize;
use thiserror::Error;

use crate::message_store::ChatMessage;
use crate::roadmap::{RoadmapData, RoadmapResponse};

const BODY_SNIPPET_LEN: usize = 100;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned non-JSON response ({status}): {snippet}")]
    NonJson { status: StatusCode, snippet: String },
    #[error("server returned {status}: {detail}")]
    Status { status: StatusCode, detail: String },
    #[error("could not decode server response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("server accepted the request but sent no AI reply")]
    MissingAiResponse,
    #[error("questionnaire rejected by the server")]
    Validation(BTreeMap<String, Vec<String>>),
    #[error("could not read '{}': {source}", path.display())]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct IntakeSuccess {
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
struct IntakeEnvelope {
    #[serde(default)]
    success: bool,
    session_id: Option<String>,
    #[serde(default)]
    errors: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Deserialize)]
struct HistoryEnvelope {
    #[serde(default)]
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ReplyEnvelope {
    #[serde(default)]
    success: bool,
    ai_response: Option<ChatMessage>,
}

fn body_snippet(body: &str) -> String {
    if body.chars().count() <= BODY_SNIPPET_LEN {
        return body.to_string();
    }
    let cut: String = body.chars().take(BODY_SNIPPET_LEN).collect();
    format!("{cut}...")
}

/// Classified response: HTTP status plus a body that is known to be JSON.
/// Anything with another content type is a transport failure and is never
/// parsed further.
pub(crate) fn classify_response(
    status: StatusCode,
    content_type: Option<&str>,
    body: String,
) -> Result<(StatusCode, String), TransportError> {
    let is_json = content_type.is_some_and(|value| value.contains("application/json"));
    if !is_json {
        return Err(TransportError::NonJson {
            status,
            snippet: body_snippet(&body),
        });
    }
    Ok((status, body))
}

pub(crate) fn parse_intake_response(
    status: StatusCode,
    body: &str,
) -> Result<IntakeSuccess, TransportError> {
    let envelope: IntakeEnvelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(err) if status.is_success() => return Err(err.into()),
        Err(_) => {
            return Err(TransportError::Status {
                status,
                detail: body_snippet(body),
            });
        }
    };
    if let Some(errors) = envelope.errors
        && !errors.is_empty()
    {
        return Err(TransportError::Validation(errors));
    }
    if !status.is_success() {
        return Err(TransportError::Status {
            status,
            detail: body_snippet(body),
        });
    }
    match envelope.session_id {
        Some(session_id) if envelope.success => Ok(IntakeSuccess { session_id }),
        _ => Err(TransportError::Status {
            status,
            detail: "intake response carried no session_id".to_string(),
        }),
    }
}

pub(crate) fn parse_history_response(
    status: StatusCode,
    body: &str,
) -> Result<Vec<ChatMessage>, TransportError> {
    if !status.is_success() {
        return Err(TransportError::Status {
            status,
            detail: body_snippet(body),
        });
    }
    let envelope: HistoryEnvelope = serde_json::from_str(body)?;
    Ok(envelope.messages)
}

/// Shared by send-message and upload: an HTTP success with no `ai_response`
/// is a malformed success and is reported like any transport failure.
pub(crate) fn parse_reply_response(
    status: StatusCode,
    body: &str,
) -> Result<ChatMessage, TransportError> {
    if !status.is_success() {
        return Err(TransportError::Status {
            status,
            detail: body_snippet(body),
        });
    }
    let envelope: ReplyEnvelope = serde_json::from_str(body)?;
    match envelope.ai_response {
        Some(reply) if envelope.success => Ok(reply),
        _ => Err(TransportError::MissingAiResponse),
    }
}

pub(crate) fn parse_roadmap_response(
    status: StatusCode,
    body: &str,
) -> Result<RoadmapData, TransportError> {
    if !status.is_success() {
        return Err(TransportError::Status {
            status,
            detail: body_snippet(body),
        });
    }
    let envelope: RoadmapResponse = serde_json::from_str(body)?;
    Ok(envelope.roadmap)
}

/// Blocking client for the counselor backend. All methods run on adapter
/// worker threads; the request timeout bounds every round trip so an
/// operation always resolves and the in-flight gate is always released.
pub struct ApiClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn take_classified(
        response: reqwest::blocking::Response,
    ) -> Result<(StatusCode, String), TransportError> {
        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text()?;
        classify_response(status, content_type.as_deref(), body)
    }

    pub fn submit_intake(
        &self,
        answers: &serde_json::Value,
    ) -> Result<IntakeSuccess, TransportError> {
        let response = self
            .http
            .post(self.url("/submit_questionnaire/"))
            .json(answers)
            .send()?;
        let (status, body) = Self::take_classified(response)?;
        parse_intake_response(status, &body)
    }

    pub fn fetch_history(&self, session_id: &str) -> Result<Vec<ChatMessage>, TransportError> {
        let response = self
            .http
            .get(self.url(&format!("/get_chat_history/{session_id}/")))
            .send()?;
        let (status, body) = Self::take_classified(response)?;
        parse_history_response(status, &body)
    }

    pub fn send_message(&self, text: &str, session_id: &str) -> Result<ChatMessage, TransportError> {
        let response = self
            .http
            .post(self.url("/send_message/"))
            .json(&serde_json::json!({ "message": text, "session_id": session_id }))
            .send()?;
        let (status, body) = Self::take_classified(response)?;
        parse_reply_response(status, &body)
    }

    // Multipart encodes its own content type; nothing here must set the JSON
    // header the other endpoints use.
    pub fn upload_file(
        &self,
        path: &std::path::Path,
        name: &str,
        session_id: &str,
    ) -> Result<ChatMessage, TransportError> {
        let bytes = std::fs::read(path).map_err(|source| TransportError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let form = multipart::Form::new()
            .part(
                "resume",
                multipart::Part::bytes(bytes).file_name(name.to_string()),
            )
            .text("session_id", session_id.to_string());
        let response = self
            .http
            .post(self.url("/resume/upload/"))
            .multipart(form)
            .send()?;
        let (status, body) = Self::take_classified(response)?;
        parse_reply_response(status, &body)
    }

    pub fn fetch_roadmap(&self, session_id: &str) -> Result<RoadmapData, TransportError> {
        let response = self
            .http
            .get(self.url(&format!("/roadmap/{session_id}/")))
            .send()?;
        let (status, body) = Self::take_classified(response)?;
        parse_roadmap_response(status, &body)
    }
}

#[derive(Debug)]
pub enum TransportEvent {
    IntakeFinished(Result<IntakeSuccess, TransportError>),
    HistoryLoaded {
        generation: u64,
        result: Result<Vec<ChatMessage>, TransportError>,
    },
    ReplyReceived {
        generation: u64,
        result: Result<ChatMessage, TransportError>,
    },
    UploadFinished {
        file_name: String,
        generation: u64,
        result: Result<ChatMessage, TransportError>,
    },
    RoadmapLoaded(Result<RoadmapData, TransportError>),
}

/// Runs each blocking call on its own worker thread and reports the outcome
/// over a channel the event loop drains once per iteration. The UI thread
/// never blocks on the network.
pub struct ApiAdapter {
    client: Arc<ApiClient>,
    event_tx: Sender<TransportEvent>,
    event_rx: Receiver<TransportEvent>,
}

impl ApiAdapter {
    pub fn new(client: ApiClient) -> Self {
        let (event_tx, event_rx) = mpsc::channel();
        Self {
            client: Arc::new(client),
            event_tx,
            event_rx,
        }
    }

    pub fn submit_intake(&self, answers: serde_json::Value) {
        let client = self.client.clone();
        let tx = self.event_tx.clone();
        thread::spawn(move || {
            let result = client.submit_intake(&answers);
            if let Err(err) = &result {
                tracing::warn!("intake submission failed: {err}");
            }
            let _ = tx.send(TransportEvent::IntakeFinished(result));
        });
    }

    pub fn fetch_history(&self, session_id: String, generation: u64) {
        let client = self.client.clone();
        let tx = self.event_tx.clone();
        thread::spawn(move || {
            let result = client.fetch_history(&session_id);
            if let Err(err) = &result {
                tracing::warn!("history fetch failed: {err}");
            }
            let _ = tx.send(TransportEvent::HistoryLoaded { generation, result });
        });
    }

    pub fn send_message(&self, text: String, session_id: String, generation: u64) {
        let client = self.client.clone();
        let tx = self.event_tx.clone();
        thread::spawn(move || {
            let result = client.send_message(&text, &session_id);
            if let Err(err) = &result {
                tracing::warn!("send message failed: {err}");
            }
            let _ = tx.send(TransportEvent::ReplyReceived { generation, result });
        });
    }

    pub fn upload_file(&self, path: PathBuf, file_name: String, session_id: String, generation: u64) {
        let client = self.client.clone();
        let tx = self.event_tx.clone();
        thread::spawn(move || {
            let result = client.upload_file(&path, &file_name, &session_id);
            if let Err(err) = &result {
                tracing::warn!("upload of '{file_name}' failed: {err}");
            }
            let _ = tx.send(TransportEvent::UploadFinished {
                file_name,
                generation,
                result,
            });
        });
    }

    pub fn fetch_roadmap(&self, session_id: String) {
        let client = self.client.clone();
        let tx = self.event_tx.clone();
        thread::spawn(move || {
            let result = client.fetch_roadmap(&session_id);
            if let Err(err) = &result {
                tracing::warn!("roadmap fetch failed: {err}");
            }
            let _ = tx.send(TransportEvent::RoadmapLoaded(result));
        });
    }

    pub fn drain_events_limited(&self, max_events: usize) -> Vec<TransportEvent> {
        let mut events = Vec::new();
        if max_events == 0 {
            return events;
        }
        while events.len() < max_events {
            let Ok(event) = self.event_rx.try_recv() else {
                break;
            };
            events.push(event);
        }
        events
    }

    #[cfg(test)]
    pub fn drain_events(&self) -> Vec<TransportEvent> {
        self.drain_events_limited(usize::MAX)
    }
}

#[cfg(test)]
#[path = "../tests/unit/transport_tests.rs"]
mod tests;
