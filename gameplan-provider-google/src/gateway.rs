use std::collections::HashMap;

use async_trait::async_trait;
use gameplan_core::gateway::{
    BatchOutcome, BatchRequest, CalendarGateway, EventOperation, RemoteCalendar,
};
use gameplan_core::{Event, GameplanError, GameplanResult};
use google_calendar::Client;
use google_calendar::types::{MinAccessRole, SendUpdates};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use crate::batch::{self, BatchPart, MAX_BATCH_SIZE};
use crate::convert::{from_google, to_google};
use crate::session::Session;

const CALENDARS_URL: &str = "https://www.googleapis.com/calendar/v3/calendars";

/// [`CalendarGateway`] backed by the Google Calendar API.
pub struct GoogleGateway {
    session: Mutex<Session>,
    http: reqwest::Client,
}

fn session_error(e: anyhow::Error) -> GameplanError {
    GameplanError::Configuration(format!("{e:#}"))
}

fn api_error(e: impl std::fmt::Display) -> GameplanError {
    GameplanError::Transport(e.to_string())
}

impl GoogleGateway {
    /// Load (and if needed refresh) the stored session of `account`.
    pub async fn connect(account: &str) -> GameplanResult<Self> {
        let session = Session::load_valid(account).await.map_err(session_error)?;

        Ok(GoogleGateway {
            session: Mutex::new(session),
            http: reqwest::Client::new(),
        })
    }

    async fn client(&self) -> GameplanResult<Client> {
        let mut session = self.session.lock().await;
        session.refresh_if_expired().await.map_err(session_error)?;
        Ok(session.client())
    }

    async fn access_token(&self) -> GameplanResult<String> {
        let mut session = self.session.lock().await;
        session.refresh_if_expired().await.map_err(session_error)?;
        Ok(session.access_token().to_string())
    }

    /// Turn a non-2xx response into a `Provider` error.
    async fn check(response: reqwest::Response, what: &str) -> GameplanResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = response.text().await.unwrap_or_default();
        Err(GameplanError::Provider(format!(
            "{what} failed with {status}: {detail}"
        )))
    }

    fn calendar_url(calendar_id: &str, tail: &[&str]) -> GameplanResult<Url> {
        let mut url = Url::parse(CALENDARS_URL).map_err(api_error)?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| api_error("Calendar API root cannot be a base"))?;
            path.push(calendar_id);
            for segment in tail {
                path.push(segment);
            }
        }
        Ok(url)
    }

    /// Delete an event. One that is already gone counts as deleted.
    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> GameplanResult<()> {
        let token = self.access_token().await?;
        let url = Self::calendar_url(calendar_id, &["events", event_id])?;

        let response = self
            .http
            .delete(url)
            .bearer_auth(token)
            .query(&[("sendUpdates", "none")])
            .send()
            .await?;

        if batch::is_gone(response.status().as_u16()) {
            debug!(event_id, "Event already gone");
            return Ok(());
        }
        Self::check(response, "Deleting event").await?;

        Ok(())
    }

    /// Submit one chunk of at most [`MAX_BATCH_SIZE`] requests.
    async fn submit_chunk(&self, chunk: &[BatchRequest]) -> GameplanResult<HashMap<String, BatchOutcome>> {
        let mut outcomes = HashMap::with_capacity(chunk.len());
        let mut parts = Vec::with_capacity(chunk.len());
        let mut operations: HashMap<&str, &EventOperation> = HashMap::with_capacity(chunk.len());

        for request in chunk {
            match BatchPart::from_request(request) {
                Ok(part) => {
                    operations.insert(request.token.as_str(), &request.operation);
                    parts.push(part);
                }
                Err(e) => {
                    outcomes.insert(request.token.clone(), BatchOutcome::Failure(format!("{e:#}")));
                }
            }
        }

        if parts.is_empty() {
            return Ok(outcomes);
        }

        let boundary = format!("batch_{}", uuid::Uuid::new_v4().simple());
        let token = self.access_token().await?;

        let response = self
            .http
            .post(batch::BATCH_URL)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, batch::content_type(&boundary))
            .body(batch::encode(&boundary, &parts))
            .send()
            .await?;
        let response = Self::check(response, "Batch request").await?;

        let response_boundary = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(batch::boundary_from_content_type)
            .map(str::to_string)
            .ok_or_else(|| GameplanError::Provider("Batch response is not multipart".into()))?;

        let body = response.text().await?;
        let answered = batch::decode(&response_boundary, &body)
            .map_err(|e| GameplanError::Provider(format!("{e:#}")))?;

        for part in answered {
            let Some(operation) = operations.get(part.token.as_str()) else {
                warn!(token = %part.token, "Batch response for unknown token");
                continue;
            };
            outcomes.insert(part.token.clone(), batch::outcome(operation, &part));
        }

        Ok(outcomes)
    }
}

#[derive(Deserialize)]
struct CreatedCalendar {
    id: String,
}

#[derive(Deserialize)]
struct EventPage {
    #[serde(default)]
    items: Vec<google_calendar::types::Event>,
}

#[async_trait]
impl CalendarGateway for GoogleGateway {
    async fn create_calendar(&self, name: &str, time_zone: &str) -> GameplanResult<String> {
        let token = self.access_token().await?;

        let response = self
            .http
            .post(CALENDARS_URL)
            .bearer_auth(token)
            .json(&serde_json::json!({ "summary": name, "timeZone": time_zone }))
            .send()
            .await?;
        let created: CreatedCalendar = Self::check(response, "Creating calendar")
            .await?
            .json()
            .await?;

        info!(name, id = %created.id, "Created Google calendar");
        Ok(created.id)
    }

    async fn list_events(
        &self,
        calendar_id: &str,
        max_results: usize,
    ) -> GameplanResult<Vec<Event>> {
        let token = self.access_token().await?;
        let url = Self::calendar_url(calendar_id, &["events"])?;

        // One page of at most `max_results` events.
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(&[
                ("maxResults", max_results.to_string()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ])
            .send()
            .await?;
        let page: EventPage = Self::check(response, "Listing events").await?.json().await?;

        let mut events = Vec::with_capacity(page.items.len());
        for google in page.items {
            if google.status == "cancelled" || google.id.is_empty() {
                continue;
            }
            match from_google(google) {
                Ok(event) => events.push(event),
                Err(e) => debug!(error = %e, "Skipping unreadable event"),
            }
        }

        Ok(events)
    }

    async fn apply_single(&self, operation: &EventOperation) -> GameplanResult<Option<Event>> {
        let client = self.client().await?;

        match operation {
            EventOperation::Create { calendar_id, event } => {
                // Let google assign the id.
                let mut google_event = to_google(event);
                google_event.id = String::new();

                let response = client
                    .events()
                    .insert(
                        calendar_id,
                        0,
                        0,
                        false,
                        SendUpdates::None,
                        false,
                        &google_event,
                    )
                    .await
                    .map_err(api_error)?;

                from_google(response.body)
                    .map(Some)
                    .map_err(|e| GameplanError::Provider(format!("{e:#}")))
            }
            EventOperation::Update {
                calendar_id,
                event_id,
                event,
            } => {
                let response = client
                    .events()
                    .patch(
                        calendar_id,
                        event_id,
                        0,
                        0,
                        false,
                        SendUpdates::None,
                        false,
                        &to_google(event),
                    )
                    .await
                    .map_err(api_error)?;

                from_google(response.body)
                    .map(Some)
                    .map_err(|e| GameplanError::Provider(format!("{e:#}")))
            }
            EventOperation::Delete {
                calendar_id,
                event_id,
            } => {
                self.delete_event(calendar_id, event_id).await?;
                Ok(None)
            }
        }
    }

    async fn apply_batch(
        &self,
        requests: &[BatchRequest],
    ) -> GameplanResult<HashMap<String, BatchOutcome>> {
        let mut outcomes = HashMap::with_capacity(requests.len());

        for chunk in requests.chunks(MAX_BATCH_SIZE) {
            match self.submit_chunk(chunk).await {
                Ok(chunk_outcomes) => outcomes.extend(chunk_outcomes),
                Err(e) => {
                    warn!(size = chunk.len(), error = %e, "Batch chunk failed");
                    for request in chunk {
                        outcomes.insert(request.token.clone(), BatchOutcome::Failure(e.to_string()));
                    }
                }
            }
        }

        Ok(outcomes)
    }

    async fn share_calendar(&self, calendar_id: &str, principal: &str) -> GameplanResult<()> {
        let token = self.access_token().await?;
        let url = Self::calendar_url(calendar_id, &["acl"])?;

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&serde_json::json!({
                "role": "reader",
                "scope": { "type": "user", "value": principal },
            }))
            .send()
            .await?;
        Self::check(response, "Sharing calendar").await?;

        Ok(())
    }

    async fn list_calendars(&self) -> GameplanResult<Vec<RemoteCalendar>> {
        let client = self.client().await?;

        let response = client
            .calendar_list()
            .list_all(MinAccessRole::default(), false, false)
            .await
            .map_err(api_error)?;

        Ok(response
            .body
            .into_iter()
            .filter(|c| !c.id.is_empty())
            .map(|c| RemoteCalendar {
                id: c.id,
                name: if c.summary.is_empty() {
                    "(unnamed)".to_string()
                } else {
                    c.summary
                },
                primary: c.primary,
            })
            .collect())
    }

    async fn delete_calendar(&self, calendar_id: &str) -> GameplanResult<()> {
        let token = self.access_token().await?;
        let url = Self::calendar_url(calendar_id, &[])?;

        let response = self.http.delete(url).bearer_auth(token).send().await?;
        Self::check(response, "Deleting calendar").await?;

        Ok(())
    }
}
