//! Core type definitions for compile-time safety.
//!
//! This module provides newtype wrappers around remote identifiers to prevent
//! accidental mixing of playlist and presentation IDs, plus the items and
//! outcomes that flow through the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// `ProPresenter` presentation identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresentationId(pub String);

impl PresentationId {
    /// Create a new `PresentationId` from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PresentationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PresentationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// `ProPresenter` playlist identifier, assigned by the remote system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaylistId(pub String);

impl PlaylistId {
    /// Create a new `PlaylistId` from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlaylistId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One playlist-worthy entry extracted from the planning document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServiceItem {
    /// A song, identified by title only.
    Song {
        /// Title as detected in the document.
        title: String,
    },
    /// A psalm reading as `"Psalm <n>"`, digits as written.
    Psalm {
        /// Psalm reference.
        reference: String,
    },
}

impl ServiceItem {
    /// Create a song item.
    pub fn song(title: impl Into<String>) -> Self {
        Self::Song { title: title.into() }
    }

    /// Create a psalm item.
    pub fn psalm(reference: impl Into<String>) -> Self {
        Self::Psalm { reference: reference.into() }
    }

    /// Display name used in the outcome log.
    pub fn name(&self) -> &str {
        match self {
            Self::Song { title } => title,
            Self::Psalm { reference } => reference,
        }
    }

    /// Whether this item is a song.
    pub const fn is_song(&self) -> bool {
        matches!(self, Self::Song { .. })
    }
}

impl fmt::Display for ServiceItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Song { title } => write!(f, "Song \"{title}\""),
            Self::Psalm { reference } => write!(f, "{reference}"),
        }
    }
}

/// A service item joined with what the resolver stage found for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedPlaylistItem {
    /// A song and its library match, if any.
    Song {
        /// Song title.
        title: String,
        /// Matching library presentation.
        library_presentation_id: Option<PresentationId>,
        /// Most similar library name when there is no exact match.
        closest_match: Option<String>,
    },
    /// A psalm and the text fetched for it.
    Psalm {
        /// Psalm reference.
        reference: String,
        /// Reading text for the ad-hoc presentation.
        fetched_content: String,
    },
}

impl ResolvedPlaylistItem {
    /// Display name used in the outcome log.
    pub fn name(&self) -> &str {
        match self {
            Self::Song { title, .. } => title,
            Self::Psalm { reference, .. } => reference,
        }
    }
}

/// What happened to a single service item during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeKind {
    /// The item is in the playlist.
    Added,
    /// No library presentation carries the song's exact title.
    NotFoundInLibrary,
    /// Creating or attaching the presentation failed.
    CreationFailed,
    /// Scripture text could not be fetched.
    FetchFailed,
}

impl OutcomeKind {
    /// Returns all outcome kinds in display order.
    pub const fn all() -> &'static [Self] {
        &[Self::Added, Self::NotFoundInLibrary, Self::CreationFailed, Self::FetchFailed]
    }

    /// Returns the human-readable name of this outcome.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::NotFoundInLibrary => "not in library",
            Self::CreationFailed => "creation failed",
            Self::FetchFailed => "fetch failed",
        }
    }

    /// Whether the item made it into the playlist.
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Added)
    }
}

/// One entry of the run's outcome log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistOutcome {
    /// Outcome tag.
    pub kind: OutcomeKind,
    /// Display name of the service item.
    pub name: String,
    /// Optional diagnostic for the operator.
    pub message: Option<String>,
}

impl PlaylistOutcome {
    /// Item was added to the playlist.
    pub fn added(name: impl Into<String>) -> Self {
        Self {
            kind: OutcomeKind::Added,
            name: name.into(),
            message: None,
        }
    }

    /// Outcome with a diagnostic message.
    pub fn with_message(
        kind: OutcomeKind,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            message: Some(message.into()),
        }
    }
}

impl fmt::Display for PlaylistOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.label(), self.name)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_item_names() {
        assert_eq!(ServiceItem::song("Cornerstone").name(), "Cornerstone");
        assert_eq!(ServiceItem::psalm("Psalm 23").name(), "Psalm 23");
        assert!(ServiceItem::song("x").is_song());
        assert!(!ServiceItem::psalm("Psalm 1").is_song());
    }

    #[test]
    fn service_item_serializes_tagged() {
        let json = serde_json::to_value(ServiceItem::psalm("Psalm 23")).unwrap_or_default();
        assert_eq!(json["type"], "psalm");
        assert_eq!(json["reference"], "Psalm 23");
    }

    #[test]
    fn outcome_display_includes_message() {
        let outcome = PlaylistOutcome::with_message(
            OutcomeKind::NotFoundInLibrary,
            "Unknown Song",
            "closest library entry: Unknown",
        );
        assert_eq!(
            outcome.to_string(),
            "[not in library] Unknown Song: closest library entry: Unknown"
        );
        assert_eq!(PlaylistOutcome::added("Psalm 23").to_string(), "[added] Psalm 23");
    }
}
