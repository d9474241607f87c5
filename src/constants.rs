//! Application constants.
//!
//! Centralizes endpoint paths and default configuration values.

/// `ProPresenter` control API constants.
pub mod propresenter {
    /// Default base URL of the local `ProPresenter` network API.
    pub const DEFAULT_BASE_URL: &str = "http://localhost:1025";

    /// Library listing endpoint.
    pub const LIBRARY_PATH: &str = "/api/v1/library";

    /// Presentation creation endpoint.
    pub const PRESENTATION_PATH: &str = "/api/v1/presentation";

    /// Playlist creation endpoint; items live under `/{id}/items`.
    pub const PLAYLIST_PATH: &str = "/api/v1/playlist";
}

/// Translation service constants.
pub mod scripture {
    /// Default base URL of the translation service.
    pub const DEFAULT_BASE_URL: &str = "https://bible-api.com";

    /// Translation used when none is configured.
    pub const DEFAULT_TRANSLATION: &str = "luther";

    /// Translation codes offered to the operator.
    pub const SUPPORTED_TRANSLATIONS: &[&str] = &["luther", "kjv", "bbe", "web", "oeb-us"];
}

/// Song extraction constants.
pub mod extraction {
    /// Default base URL of the Gemini API.
    pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";

    /// Default Gemini model identifier.
    pub const DEFAULT_MODEL: &str = "gemini-pro";

    /// Label that opens a praise block in planning documents.
    pub const DEFAULT_PRAISE_BLOCK_MARKER: &str = "Lobpreis-Block";
}

/// HTTP client constants.
pub mod http {
    /// Default request timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
}

/// Async task constants.
pub mod async_tasks {
    /// Channel buffer size for pipeline progress events.
    pub const CHANNEL_BUFFER_SIZE: usize = 16;
}
