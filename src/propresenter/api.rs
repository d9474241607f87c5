use reqwest::{Client, RequestBuilder, Response};
use serde_json::{json, Value};

use crate::constants::propresenter::{LIBRARY_PATH, PLAYLIST_PATH, PRESENTATION_PATH};
use crate::error::{Error, Result};
use crate::propresenter::library::{LibraryEntry, LibrarySnapshot};
use crate::types::{PlaylistId, PresentationId};

/// Client for the `ProPresenter` network control API.
///
/// Every call is attempted once; retries are left to the operator.
#[derive(Clone)]
pub struct ProPresenterClient {
    base_url: String,
    client: Client,
}

impl ProPresenterClient {
    /// Create a client for the API at `base_url` (e.g. `http://localhost:1025`).
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and turn non-success statuses into errors
    async fn send(&self, request: RequestBuilder, path: &str) -> Result<Response> {
        let resp = request
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Error::Network(format!("Request to {path} failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::api_status(
                format!("Request to {path} returned {status}"),
                status.as_u16(),
            ));
        }
        Ok(resp)
    }

    /// Make a GET request and parse the JSON body
    async fn get(&self, path: &str) -> Result<Value> {
        let resp = self.send(self.client.get(self.url(path)), path).await?;
        resp.json()
            .await
            .map_err(|e| Error::parse(format!("Invalid JSON from {path}: {e}"), None))
    }

    /// Make a POST request with a JSON body and parse the JSON reply
    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let resp = self.send(self.client.post(self.url(path)).json(body), path).await?;
        resp.json()
            .await
            .map_err(|e| Error::parse(format!("Invalid JSON from {path}: {e}"), None))
    }

    /// Fetch the full library as a snapshot.
    pub async fn fetch_library(&self) -> Result<LibrarySnapshot> {
        let json = self.get(LIBRARY_PATH).await?;

        let data = json
            .as_array()
            .ok_or_else(|| Error::parse("Library response is not a list", None))?;

        let snapshot: LibrarySnapshot = data
            .iter()
            .filter_map(|entry| {
                let id = id_from(&entry["id"]);
                let name = entry["name"].as_str();
                match (id, name) {
                    (Some(id), Some(name)) => Some(LibraryEntry::new(id, name)),
                    _ => {
                        tracing::warn!("Skipping library entry without id or name: {entry}");
                        None
                    }
                }
            })
            .collect();

        tracing::info!("Library snapshot holds {} presentations", snapshot.len());
        Ok(snapshot)
    }

    /// Create a presentation with a single text slide.
    pub async fn create_presentation(&self, name: &str, text: &str) -> Result<PresentationId> {
        let body = json!({
            "name": name,
            "slides": [{ "text": text }],
        });
        let json = self.post(PRESENTATION_PATH, &body).await?;
        id_from(&json["id"])
            .map(PresentationId)
            .ok_or_else(|| Error::propresenter(format!("Created presentation '{name}' has no id")))
    }

    /// Create an empty playlist.
    pub async fn create_playlist(&self, name: &str) -> Result<PlaylistId> {
        let json = self.post(PLAYLIST_PATH, &json!({ "name": name })).await?;
        id_from(&json["id"])
            .map(PlaylistId)
            .ok_or_else(|| Error::propresenter(format!("Created playlist '{name}' has no id")))
    }

    /// Append a presentation to a playlist. The reply body is ignored.
    pub async fn add_to_playlist(
        &self,
        playlist: &PlaylistId,
        presentation: &PresentationId,
    ) -> Result<()> {
        let path = format!("{PLAYLIST_PATH}/{playlist}/items");
        let request = self
            .client
            .post(self.url(&path))
            .json(&json!({ "id": presentation.as_str() }));
        self.send(request, &path).await?;
        Ok(())
    }
}

/// Read an identifier that may be a string, a number, or a `{uuid}` object.
fn id_from(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get("uuid").and_then(Value::as_str).map(String::from),
        _ => None,
    }
}
