//! Resolution stage between classification and assembly.
//!
//! Songs are looked up in the library snapshot, psalms are fetched from the
//! translation service. Items are handled one at a time in sequence order.

use crate::bible::{ScriptureProvider, Translation};
use crate::error::Error;
use crate::propresenter::LibrarySnapshot;
use crate::types::{ResolvedPlaylistItem, ServiceItem};

/// A service item after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Ready for the assembler.
    Ready(ResolvedPlaylistItem),
    /// The scripture fetch failed; the item is skipped but still reported.
    FetchFailed {
        /// Reference that could not be fetched.
        reference: String,
        /// Failure description.
        message: String,
    },
}

impl Resolution {
    /// Display name of the underlying item.
    pub fn name(&self) -> &str {
        match self {
            Self::Ready(item) => item.name(),
            Self::FetchFailed { reference, .. } => reference,
        }
    }
}

/// Resolve a song title against the snapshot.
pub fn resolve_song(library: &LibrarySnapshot, title: &str) -> ResolvedPlaylistItem {
    let entry = library.find(title);
    ResolvedPlaylistItem::Song {
        title: title.to_string(),
        library_presentation_id: entry.map(|e| e.id.clone()),
        closest_match: match entry {
            Some(_) => None,
            None => library.closest_name(title).map(String::from),
        },
    }
}

/// Resolve every item in order. Never fails: fetch errors become
/// [`Resolution::FetchFailed`].
pub async fn resolve_items(
    items: &[ServiceItem],
    library: &LibrarySnapshot,
    scripture: &dyn ScriptureProvider,
    translation: &Translation,
) -> Vec<Resolution> {
    let mut resolved = Vec::with_capacity(items.len());

    for item in items {
        let resolution = match item {
            ServiceItem::Song { title } => Resolution::Ready(resolve_song(library, title)),
            ServiceItem::Psalm { reference } => {
                match scripture.fetch(reference, translation).await {
                    Ok(text) => Resolution::Ready(ResolvedPlaylistItem::Psalm {
                        reference: reference.clone(),
                        fetched_content: text,
                    }),
                    Err(e) => {
                        tracing::warn!("Skipping {reference}: {e}");
                        let message = match e {
                            Error::FetchFailed { message, .. } => message,
                            other => other.diagnostic(),
                        };
                        Resolution::FetchFailed {
                            reference: reference.clone(),
                            message,
                        }
                    }
                }
            }
        };
        resolved.push(resolution);
    }

    resolved
}
