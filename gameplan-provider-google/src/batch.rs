//! Google batch requests: several API calls in one `multipart/mixed` POST.
//!
//! Each part wraps one HTTP request and carries `Content-ID: <token>`.
//! Google echoes the id back as `Content-ID: <response-token>` on the
//! matching response part, which is how outcomes find their request.

use anyhow::{Context, Result, bail};
use gameplan_core::gateway::{BatchOutcome, BatchRequest, EventOperation};
use url::Url;

use crate::convert::{from_google, to_google};

pub const BATCH_URL: &str = "https://www.googleapis.com/batch/calendar/v3";

/// Maximum number of calls Google accepts in one batch.
pub const MAX_BATCH_SIZE: usize = 50;

const API_ROOT: &str = "https://www.googleapis.com/calendar/v3/";

/// One call inside a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchPart {
    pub token: String,
    pub method: &'static str,
    /// Absolute path, percent-encoded.
    pub path: String,
    pub body: Option<String>,
}

impl BatchPart {
    pub fn from_request(request: &BatchRequest) -> Result<Self> {
        let (method, segments, body) = match &request.operation {
            EventOperation::Create { calendar_id, event } => {
                let mut google = to_google(event);
                google.id = String::new();
                (
                    "POST",
                    vec![calendar_id.as_str()],
                    Some(serde_json::to_string(&google)?),
                )
            }
            EventOperation::Update {
                calendar_id,
                event_id,
                event,
            } => (
                "PATCH",
                vec![calendar_id.as_str(), event_id.as_str()],
                Some(serde_json::to_string(&to_google(event))?),
            ),
            EventOperation::Delete {
                calendar_id,
                event_id,
            } => ("DELETE", vec![calendar_id.as_str(), event_id.as_str()], None),
        };

        Ok(BatchPart {
            token: request.token.clone(),
            method,
            path: events_path(&segments)?,
            body,
        })
    }
}

/// `/calendar/v3/calendars/{calendar}/events[/{event}]`
fn events_path(segments: &[&str]) -> Result<String> {
    let mut url = Url::parse(API_ROOT)?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| anyhow::anyhow!("API root cannot be a base"))?;
        path.pop_if_empty().push("calendars").push(segments[0]).push("events");
        for segment in &segments[1..] {
            path.push(segment);
        }
    }
    Ok(url.path().to_string())
}

pub fn content_type(boundary: &str) -> String {
    format!("multipart/mixed; boundary={boundary}")
}

pub fn encode(boundary: &str, parts: &[BatchPart]) -> String {
    let mut out = String::new();

    for part in parts {
        out.push_str(&format!("--{boundary}\r\n"));
        out.push_str("Content-Type: application/http\r\n");
        out.push_str(&format!("Content-ID: <{}>\r\n\r\n", part.token));
        out.push_str(&format!("{} {} HTTP/1.1\r\n", part.method, part.path));

        match &part.body {
            Some(body) => {
                out.push_str("Content-Type: application/json; charset=UTF-8\r\n\r\n");
                out.push_str(body);
                out.push_str("\r\n");
            }
            None => out.push_str("\r\n"),
        }
    }

    out.push_str(&format!("--{boundary}--\r\n"));
    out
}

/// One answered call.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponsePart {
    pub token: String,
    pub status: u16,
    pub body: String,
}

/// Extract the boundary from a `Content-Type` header value.
pub fn boundary_from_content_type(value: &str) -> Option<&str> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|param| param.strip_prefix("boundary="))
        .map(|b| b.trim_matches('"'))
}

pub fn decode(boundary: &str, body: &str) -> Result<Vec<ResponsePart>> {
    let body = body.replace("\r\n", "\n");
    let delimiter = format!("--{boundary}");

    let mut parts = Vec::new();
    for chunk in body.split(&delimiter).skip(1) {
        if chunk.starts_with("--") {
            break;
        }
        parts.push(decode_part(chunk.trim_start_matches('\n'))?);
    }

    Ok(parts)
}

fn decode_part(chunk: &str) -> Result<ResponsePart> {
    let (outer_headers, inner) = chunk
        .split_once("\n\n")
        .context("Batch part without headers")?;

    let token = outer_headers
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.trim()
                .eq_ignore_ascii_case("content-id")
                .then(|| value.trim())
        })
        .context("Batch part without Content-ID")?;
    let token = token.trim_start_matches('<').trim_end_matches('>');
    let token = token.strip_prefix("response-").unwrap_or(token);

    let (status_line, rest) = inner.split_once('\n').unwrap_or((inner, ""));
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse::<u16>().ok())
        .with_context(|| format!("Invalid status line in batch part: {status_line}"))?;

    let body = rest
        .split_once("\n\n")
        .map(|(_, body)| body.trim())
        .unwrap_or_default();

    Ok(ResponsePart {
        token: token.to_string(),
        status,
        body: body.to_string(),
    })
}

/// Status codes Google answers with for an event that no longer exists.
pub fn is_gone(status: u16) -> bool {
    status == 404 || status == 410
}

/// Interpret a response part for the operation it answers.
///
/// Deleting an event that is already gone counts as success.
pub fn outcome(operation: &EventOperation, part: &ResponsePart) -> BatchOutcome {
    let success = (200..300).contains(&part.status);

    match operation {
        EventOperation::Delete { .. } => {
            if success || is_gone(part.status) {
                BatchOutcome::Success(None)
            } else {
                BatchOutcome::Failure(failure_detail(part))
            }
        }
        EventOperation::Create { .. } | EventOperation::Update { .. } => {
            if !success {
                return BatchOutcome::Failure(failure_detail(part));
            }
            match parse_event(&part.body) {
                Ok(event) => BatchOutcome::Success(Some(event)),
                Err(e) => BatchOutcome::Failure(format!("{e:#}")),
            }
        }
    }
}

fn parse_event(body: &str) -> Result<gameplan_core::Event> {
    if body.is_empty() {
        bail!("Empty response body");
    }
    let google: google_calendar::types::Event =
        serde_json::from_str(body).context("Invalid event in batch response")?;
    from_google(google)
}

fn failure_detail(part: &ResponsePart) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        error: ErrorDetail,
    }
    #[derive(serde::Deserialize)]
    struct ErrorDetail {
        message: String,
    }

    match serde_json::from_str::<ErrorBody>(&part.body) {
        Ok(parsed) => format!("HTTP {}: {}", part.status, parsed.error.message),
        Err(_) => format!("HTTP {}", part.status),
    }
}
