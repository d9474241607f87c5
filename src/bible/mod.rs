//! Scripture text lookup from a remote translation service.
//!
//! Readings are requested as `GET {base}/{reference}?translation={code}` and
//! the response's `text` field becomes the slide content.

use std::fmt;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;

use crate::constants::scripture::{DEFAULT_TRANSLATION, SUPPORTED_TRANSLATIONS};
use crate::error::{Error, Result};

/// A translation code understood by the translation service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Translation(String);

impl Translation {
    /// Create a translation from its code, normalized to lowercase.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_lowercase())
    }

    /// The code sent to the service.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Whether the code is one of the translations offered to operators.
    pub fn is_supported(&self) -> bool {
        SUPPORTED_TRANSLATIONS.contains(&self.0.as_str())
    }
}

impl Default for Translation {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSLATION)
    }
}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trait for scripture lookup providers.
///
/// Failures are item-scoped: callers record them and move on.
#[async_trait]
pub trait ScriptureProvider: Send + Sync {
    /// Fetch the plain text of a reading such as "Psalm 23".
    async fn fetch(&self, reference: &str, translation: &Translation) -> Result<String>;
}

/// Client for a bible-api.com compatible translation service.
#[derive(Clone)]
pub struct BibleApiClient {
    base_url: String,
    client: Client,
}

impl BibleApiClient {
    /// Create a client for the service at `base_url`.
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Build the request URL, percent-encoding the reference as one segment.
    fn reading_url(&self, reference: &str, translation: &Translation) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            Error::fetch(reference, format!("Invalid service URL {}: {e}", self.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                Error::fetch(
                    reference,
                    format!("Service URL {} cannot take a path", self.base_url),
                )
            })?
            .pop_if_empty()
            .push(reference);
        url.query_pairs_mut().append_pair("translation", translation.code());
        Ok(url)
    }
}

#[async_trait]
impl ScriptureProvider for BibleApiClient {
    async fn fetch(&self, reference: &str, translation: &Translation) -> Result<String> {
        if !translation.is_supported() {
            tracing::warn!(
                "Translation '{translation}' is not in the supported list, trying anyway"
            );
        }

        let url = self.reading_url(reference, translation)?;
        tracing::debug!("Fetching {reference} ({translation})");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::fetch(reference, format!("Request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::fetch(reference, format!("Translation service returned {status}")));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| Error::fetch(reference, format!("Invalid JSON: {e}")))?;

        let text = json["text"]
            .as_str()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::fetch(reference, "Response has no 'text' field"))?;

        Ok(text.to_string())
    }
}
