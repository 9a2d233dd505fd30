//! [`RoomDirectory`] over the server's HTTP API, using `ureq`.
//!
//! `ureq` is a blocking client, so every request runs on Tokio's blocking
//! pool and the returned futures never stall the client loop.

use std::time::Duration;

use parlor_protocol::{ClientId, RoomId};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::{ApiError, CreateOutcome, DirectoryError, RoomDirectory, RoomSummary};

/// Body of `201 Created` and of the by-name lookup.
#[derive(Deserialize)]
struct RoomRecord {
    id: RoomId,
}

/// Room directory reached over HTTP.
///
/// Paths are appended to the configured base, e.g. with base
/// `http://127.0.0.1:8000/api/v1/realtime` a lookup for `general` goes to
/// `http://127.0.0.1:8000/api/v1/realtime/room/by-name/general`.
#[derive(Debug, Clone)]
pub struct HttpRoomDirectory {
    agent: ureq::Agent,
    base: Url,
}

impl HttpRoomDirectory {
    /// Creates a client for the API at `base_url`. Every request is
    /// bounded by `timeout`.
    ///
    /// # Errors
    /// Returns [`DirectoryError::InvalidBaseUrl`] if `base_url` does not
    /// parse or cannot take path segments (e.g. `mailto:`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DirectoryError> {
        let base = Url::parse(base_url)
            .map_err(|e| DirectoryError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(DirectoryError::InvalidBaseUrl(base_url.to_owned()));
        }
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Ok(Self { agent, base })
    }

    /// The API base every path is appended to.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Appends percent-encoded path segments to the base.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, DirectoryError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| DirectoryError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

impl RoomDirectory for HttpRoomDirectory {
    async fn create_room(&self, name: &str) -> Result<CreateOutcome, DirectoryError> {
        let url = self.endpoint(&["room"])?;
        let body = serde_json::json!({ "name": name }).to_string();
        let agent = self.agent.clone();

        blocking(move || {
            tracing::debug!(%url, "POST create room");
            match execute(agent.post(url.as_str()), Some(&body)) {
                Ok(resp) if resp.status() == 201 => {
                    let record: RoomRecord = read_json(resp)?;
                    Ok(CreateOutcome::Created(record.id))
                }
                Ok(resp) => Ok(CreateOutcome::Rejected {
                    status: resp.status(),
                }),
                Err(DirectoryError::Status { status, detail }) => {
                    tracing::debug!(status, ?detail, "create room rejected");
                    Ok(CreateOutcome::Rejected { status })
                }
                Err(e) => Err(e),
            }
        })
        .await
    }

    async fn lookup_room_by_name(&self, name: &str) -> Result<RoomId, DirectoryError> {
        let url = self.endpoint(&["room", "by-name", name])?;
        let agent = self.agent.clone();

        blocking(move || {
            tracing::debug!(%url, "GET room by name");
            let resp = execute(agent.get(url.as_str()), None)?;
            let record: RoomRecord = read_json(resp)?;
            Ok(record.id)
        })
        .await
    }

    async fn join_room(
        &self,
        client_id: &ClientId,
        room_id: &RoomId,
    ) -> Result<(), DirectoryError> {
        let url = self.endpoint(&["room", "join"])?;
        let body = serde_json::json!({
            "client_id": client_id,
            "room_id": room_id,
        })
        .to_string();
        let agent = self.agent.clone();

        blocking(move || {
            tracing::debug!(%url, "POST join room");
            execute(agent.post(url.as_str()), Some(&body))?;
            Ok(())
        })
        .await
    }

    async fn list_rooms(&self) -> Result<Vec<RoomSummary>, DirectoryError> {
        let url = self.endpoint(&["room"])?;
        let agent = self.agent.clone();

        blocking(move || {
            tracing::debug!(%url, "GET rooms");
            let resp = execute(agent.get(url.as_str()), None)?;
            read_json(resp)
        })
        .await
    }
}

/// Runs one blocking request on the blocking pool.
async fn blocking<T, F>(work: F) -> Result<T, DirectoryError>
where
    F: FnOnce() -> Result<T, DirectoryError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| DirectoryError::Worker(e.to_string()))?
}

/// Sends the request (with a JSON body if given) and turns non-2xx
/// answers into [`DirectoryError::Status`].
fn execute(
    request: ureq::Request,
    json_body: Option<&str>,
) -> Result<ureq::Response, DirectoryError> {
    let result = match json_body {
        Some(body) => request
            .set("Content-Type", "application/json")
            .send_string(body),
        None => request.call(),
    };
    match result {
        Ok(resp) => Ok(resp),
        Err(ureq::Error::Status(status, resp)) => {
            let detail = resp
                .into_string()
                .ok()
                .and_then(|text| serde_json::from_str::<ApiError>(&text).ok());
            Err(DirectoryError::Status { status, detail })
        }
        Err(e) => Err(DirectoryError::Request(e.to_string())),
    }
}

fn read_json<T: DeserializeOwned>(resp: ureq::Response) -> Result<T, DirectoryError> {
    let text = resp
        .into_string()
        .map_err(|e| DirectoryError::InvalidResponse(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| DirectoryError::InvalidResponse(e.to_string()))
}
