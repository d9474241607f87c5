//! Song detection through the Gemini `generateContent` API.
//!
//! The model is asked for a JSON array of song titles. Its reply is free text,
//! so the array is located and then validated strictly: anything that is not
//! exactly a flat list of non-empty strings is a classification error.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::detector::SongDetector;
use crate::error::{Error, Result};

/// Instruction sent ahead of the document text.
const INSTRUCTION: &str = "\
The following text is the plan of a church service. \
List the titles of all songs that will be sung, in the order they appear. \
Do not include psalms, Bible readings, prayers, announcements or sermon titles. \
Answer with a JSON array of strings and nothing else, for example [\"Song A\", \"Song B\"]. \
If the plan contains no songs, answer [].";

/// Longest response excerpt quoted in an error message.
const EXCERPT_LEN: usize = 200;

/// Live song detector backed by a Gemini model.
#[derive(Clone)]
pub struct GeminiSongDetector {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiSongDetector {
    /// Create a detector with explicit endpoint, model and credential.
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Send the prompt and return the concatenated reply text.
    async fn generate(&self, corpus: &str) -> Result<String> {
        let body = json!({
            "contents": [{
                "parts": [{ "text": format!("{INSTRUCTION}\n\n---\n{corpus}") }]
            }],
            "generationConfig": { "temperature": 0 }
        });

        tracing::debug!("Asking {} for song titles ({} chars)", self.model, corpus.len());
        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::classification(format!("Extraction service unreachable: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::classification(format!(
                "Extraction service returned {status}: {}",
                excerpt(&text)
            )));
        }

        let reply: GenerateContentResponse = resp
            .json()
            .await
            .map_err(|e| {
                Error::classification(format!("Invalid JSON from extraction service: {e}"))
            })?;

        let text: String = reply
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(Error::classification("Extraction service returned no text"));
        }
        Ok(text)
    }
}

#[async_trait]
impl SongDetector for GeminiSongDetector {
    async fn detect_songs(&self, corpus: &str) -> Result<Vec<String>> {
        let reply = self.generate(corpus).await?;
        parse_title_list(&reply)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

/// Locate the song list in a free-text reply and validate it.
///
/// The span from the first `[` to the last `]` must parse as a JSON array of
/// strings. Every entry becomes one title, unchanged.
pub fn parse_title_list(reply: &str) -> Result<Vec<String>> {
    let start = reply.find('[').ok_or_else(|| {
        Error::classification(format!("No song list in reply: {}", excerpt(reply)))
    })?;
    let end = reply
        .rfind(']')
        .filter(|&end| end > start)
        .ok_or_else(|| {
            Error::classification(format!(
                "Unterminated song list in reply: {}",
                excerpt(reply)
            ))
        })?;

    let titles: Vec<String> = serde_json::from_str(&reply[start..=end]).map_err(|e| {
        Error::classification(format!(
            "Song list is not a list of strings ({e}): {}",
            excerpt(reply)
        ))
    })?;

    let blank = titles.iter().filter(|t| t.trim().is_empty()).count();
    if blank > 0 {
        tracing::warn!("Song list contains {blank} blank titles");
    }
    Ok(titles)
}

/// First characters of a reply, for diagnostics.
fn excerpt(text: &str) -> String {
    let mut out: String = text.chars().take(EXCERPT_LEN).collect();
    if text.chars().count() > EXCERPT_LEN {
        out.push('…');
    }
    out
}
