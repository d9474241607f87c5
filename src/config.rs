//! Application configuration.
//!
//! Handles loading configuration from environment variables and .env files.
//! The pipeline never reads the environment itself: a `Config` is built once
//! by the caller and passed in explicitly.

use dotenv::dotenv;
use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{extraction, http, propresenter, scripture};
use crate::error::{Error, Result};

/// User agent sent with every request.
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Which song detector the classifier uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectorKind {
    /// Ask the Gemini extraction service for song titles.
    #[default]
    Gemini,
    /// Read bullet lines below the praise block marker.
    PraiseBlock,
}

impl DetectorKind {
    /// Returns the configuration name of this detector.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::PraiseBlock => "praise-block",
        }
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DetectorKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "llm" => Ok(Self::Gemini),
            "praise-block" | "praise_block" | "fallback" => Ok(Self::PraiseBlock),
            other => Err(Error::config(
                format!("Unknown song detector '{other}'"),
                "Set SONG_DETECTOR to 'gemini' or 'praise-block'",
            )),
        }
    }
}

/// Configuration for the application.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the `ProPresenter` control API
    pub propresenter_url: String,
    /// Base URL of the translation service
    pub bible_api_url: String,
    /// Translation code used for scripture readings
    pub translation: String,
    /// Gemini API key for song extraction
    pub gemini_api_key: String,
    /// Gemini model identifier
    pub gemini_model: String,
    /// Base URL of the Gemini API
    pub gemini_url: String,
    /// Song detector selection
    pub detector: DetectorKind,
    /// Label that opens a praise block (deterministic detector)
    pub praise_block_marker: String,
    /// Timeout applied to every HTTP request
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            propresenter_url: propresenter::DEFAULT_BASE_URL.to_string(),
            bible_api_url: scripture::DEFAULT_BASE_URL.to_string(),
            translation: scripture::DEFAULT_TRANSLATION.to_string(),
            gemini_api_key: String::new(),
            gemini_model: extraction::DEFAULT_MODEL.to_string(),
            gemini_url: extraction::DEFAULT_GEMINI_URL.to_string(),
            detector: DetectorKind::default(),
            praise_block_marker: extraction::DEFAULT_PRAISE_BLOCK_MARKER.to_string(),
            http_timeout: Duration::from_secs(http::DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self> {
        // Try to load .env file if present
        dotenv().ok();

        let mut config = Self::default();

        if let Ok(url) = env::var("PROPRESENTER_URL") {
            config.propresenter_url = url;
        }

        if let Ok(url) = env::var("BIBLE_API_URL") {
            config.bible_api_url = url;
        }

        if let Ok(translation) = env::var("BIBLE_TRANSLATION") {
            config.translation = translation;
        }

        if let Ok(key) = env::var("GEMINI_API_KEY") {
            config.gemini_api_key = key;
        }

        if let Ok(model) = env::var("GEMINI_MODEL") {
            config.gemini_model = model;
        }

        if let Ok(url) = env::var("GEMINI_API_URL") {
            config.gemini_url = url;
        }

        if let Ok(detector) = env::var("SONG_DETECTOR") {
            config.detector = detector.parse()?;
        }

        if let Ok(marker) = env::var("PRAISE_BLOCK_MARKER") {
            config.praise_block_marker = marker;
        }

        // Timeout can be configured via environment
        if let Ok(secs) = env::var("HTTP_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse::<u64>() {
                config.http_timeout = Duration::from_secs(secs);
            }
        }

        Ok(config)
    }

    /// HTTP client shared by every remote collaborator of one run
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.http_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                Error::config(
                    format!("Could not build HTTP client: {e}"),
                    "Check the TLS setup and HTTP_TIMEOUT_SECS",
                )
            })
    }

    /// Check if the Gemini extraction service is configured
    pub fn has_gemini_credentials(&self) -> bool {
        !self.gemini_api_key.is_empty()
    }

    /// Reject combinations that cannot produce a run.
    pub fn validate(&self) -> Result<()> {
        if self.detector == DetectorKind::Gemini && !self.has_gemini_credentials() {
            return Err(Error::config(
                "Gemini song detection selected without an API key",
                "Set GEMINI_API_KEY or SONG_DETECTOR=praise-block",
            ));
        }
        if self.propresenter_url.trim().is_empty() {
            return Err(Error::config(
                "ProPresenter URL is empty",
                "Set PROPRESENTER_URL, e.g. http://localhost:1025",
            ));
        }
        if self.detector == DetectorKind::PraiseBlock
            && self.praise_block_marker.trim().is_empty()
        {
            return Err(Error::config(
                "Praise block marker is empty",
                "Set PRAISE_BLOCK_MARKER, e.g. Lobpreis-Block",
            ));
        }
        Ok(())
    }
}

/// Playlist name suggested for a document: its file stem.
pub fn default_playlist_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}
