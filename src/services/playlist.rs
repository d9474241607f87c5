//! Playlist assembly service.
//!
//! Assembly is a small state machine:
//!
//! ```text
//! Initial ──create──▶ PlaylistCreated ──▶ Populating ──(items exhausted)──▶ Completed
//!    └──create fails──▶ Aborted
//! ```
//!
//! Each item is one independent remote mutation. A failed item is recorded in
//! the outcome log and never rolls back earlier items.

use std::collections::VecDeque;

use async_trait::async_trait;

use crate::error::Result;
use crate::propresenter::ProPresenterClient;
use crate::services::resolve::Resolution;
use crate::types::{OutcomeKind, PlaylistId, PlaylistOutcome, PresentationId, ResolvedPlaylistItem};

/// Remote operations the assembler needs.
///
/// Implemented by [`ProPresenterClient`]; tests substitute in-memory fakes.
#[async_trait]
pub trait PlaylistBackend: Send + Sync {
    /// Create an empty playlist and return its id.
    async fn create_playlist(&self, name: &str) -> Result<PlaylistId>;

    /// Create a one-slide presentation and return its id.
    async fn create_presentation(&self, name: &str, text: &str) -> Result<PresentationId>;

    /// Append a presentation to a playlist.
    async fn add_to_playlist(
        &self,
        playlist: &PlaylistId,
        presentation: &PresentationId,
    ) -> Result<()>;
}

#[async_trait]
impl PlaylistBackend for ProPresenterClient {
    async fn create_playlist(&self, name: &str) -> Result<PlaylistId> {
        Self::create_playlist(self, name).await
    }

    async fn create_presentation(&self, name: &str, text: &str) -> Result<PresentationId> {
        Self::create_presentation(self, name, text).await
    }

    async fn add_to_playlist(
        &self,
        playlist: &PlaylistId,
        presentation: &PresentationId,
    ) -> Result<()> {
        Self::add_to_playlist(self, playlist, presentation).await
    }
}

/// Where an assembly run currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblyState {
    /// Nothing has been sent yet.
    Initial,
    /// The playlist exists and is still empty.
    PlaylistCreated {
        /// Id assigned by the remote system.
        playlist_id: PlaylistId,
    },
    /// Items are being attached.
    Populating {
        /// Id assigned by the remote system.
        playlist_id: PlaylistId,
        /// Items handled so far.
        processed: usize,
    },
    /// Every item has an outcome.
    Completed {
        /// Id assigned by the remote system.
        playlist_id: PlaylistId,
    },
    /// The playlist could not be created; no item was attempted.
    Aborted {
        /// Diagnostic of the failed creation call.
        reason: String,
    },
}

impl AssemblyState {
    /// Returns the human-readable name of this state.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::PlaylistCreated { .. } => "playlist created",
            Self::Populating { .. } => "populating",
            Self::Completed { .. } => "completed",
            Self::Aborted { .. } => "aborted",
        }
    }

    /// Whether no further transition is possible.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Aborted { .. })
    }

    /// Playlist id, once one has been assigned.
    pub const fn playlist_id(&self) -> Option<&PlaylistId> {
        match self {
            Self::PlaylistCreated { playlist_id }
            | Self::Populating { playlist_id, .. }
            | Self::Completed { playlist_id } => Some(playlist_id),
            Self::Initial | Self::Aborted { .. } => None,
        }
    }
}

/// Result of one assembly run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyReport {
    /// Requested playlist name.
    pub playlist_name: String,
    /// Terminal state reached.
    pub state: AssemblyState,
    /// One outcome per item, in sequence order. Empty when aborted.
    pub outcomes: Vec<PlaylistOutcome>,
}

impl AssemblyReport {
    /// Number of outcomes of the given kind.
    pub fn count(&self, kind: OutcomeKind) -> usize {
        self.outcomes.iter().filter(|o| o.kind == kind).count()
    }

    /// Playlist id, unless the run aborted.
    pub const fn playlist_id(&self) -> Option<&PlaylistId> {
        self.state.playlist_id()
    }

    /// Failure reason if the playlist could not be created.
    pub fn abort_reason(&self) -> Option<&str> {
        match &self.state {
            AssemblyState::Aborted { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Drives one playlist through the assembly state machine.
pub struct PlaylistAssembler<'a> {
    backend: &'a dyn PlaylistBackend,
    playlist_name: String,
    pending: VecDeque<Resolution>,
    state: AssemblyState,
    outcomes: Vec<PlaylistOutcome>,
}

impl<'a> PlaylistAssembler<'a> {
    /// Prepare assembly of `items` into a new playlist called `playlist_name`.
    pub fn new(
        backend: &'a dyn PlaylistBackend,
        playlist_name: impl Into<String>,
        items: Vec<Resolution>,
    ) -> Self {
        Self {
            backend,
            playlist_name: playlist_name.into(),
            pending: items.into(),
            state: AssemblyState::Initial,
            outcomes: Vec::new(),
        }
    }

    /// Current state.
    pub const fn state(&self) -> &AssemblyState {
        &self.state
    }

    /// Outcomes recorded so far.
    pub fn outcomes(&self) -> &[PlaylistOutcome] {
        &self.outcomes
    }

    /// Perform exactly one transition. Terminal states are left unchanged.
    pub async fn step(&mut self) -> &AssemblyState {
        let next = match self.state.clone() {
            AssemblyState::Initial => self.create_playlist().await,
            AssemblyState::PlaylistCreated { playlist_id } => AssemblyState::Populating {
                playlist_id,
                processed: 0,
            },
            AssemblyState::Populating {
                playlist_id,
                processed,
            } => match self.pending.pop_front() {
                Some(item) => {
                    let outcome = populate(self.backend, &playlist_id, item).await;
                    self.outcomes.push(outcome);
                    AssemblyState::Populating {
                        playlist_id,
                        processed: processed + 1,
                    }
                }
                None => {
                    tracing::info!(
                        "Playlist '{}' complete: {} items processed",
                        self.playlist_name,
                        processed
                    );
                    AssemblyState::Completed { playlist_id }
                }
            },
            terminal @ (AssemblyState::Completed { .. } | AssemblyState::Aborted { .. }) => {
                terminal
            }
        };
        self.state = next;
        &self.state
    }

    /// Step until a terminal state is reached.
    pub async fn run(mut self) -> AssemblyReport {
        while !self.state.is_terminal() {
            self.step().await;
        }
        AssemblyReport {
            playlist_name: self.playlist_name,
            state: self.state,
            outcomes: self.outcomes,
        }
    }

    async fn create_playlist(&self) -> AssemblyState {
        match self.backend.create_playlist(&self.playlist_name).await {
            Ok(playlist_id) => {
                tracing::info!("Created playlist '{}' with id {playlist_id}", self.playlist_name);
                AssemblyState::PlaylistCreated { playlist_id }
            }
            Err(e) => {
                tracing::error!("Could not create playlist '{}': {e}", self.playlist_name);
                AssemblyState::Aborted { reason: e.diagnostic() }
            }
        }
    }
}

/// Attach one item and describe what happened.
async fn populate(
    backend: &dyn PlaylistBackend,
    playlist: &PlaylistId,
    item: Resolution,
) -> PlaylistOutcome {
    let outcome = match item {
        Resolution::FetchFailed { reference, message } => {
            PlaylistOutcome::with_message(OutcomeKind::FetchFailed, reference, message)
        }
        Resolution::Ready(ResolvedPlaylistItem::Song {
            title,
            library_presentation_id: Some(id),
            ..
        }) => match backend.add_to_playlist(playlist, &id).await {
            Ok(()) => PlaylistOutcome::added(title),
            Err(e) => PlaylistOutcome::with_message(
                OutcomeKind::CreationFailed,
                title,
                format!("Attach failed: {}", e.diagnostic()),
            ),
        },
        Resolution::Ready(ResolvedPlaylistItem::Song {
            title,
            library_presentation_id: None,
            closest_match,
        }) => {
            let message = closest_match.map_or_else(
                || "No library presentation with this exact name".to_string(),
                |name| format!("closest library entry: {name}"),
            );
            PlaylistOutcome::with_message(OutcomeKind::NotFoundInLibrary, title, message)
        }
        Resolution::Ready(ResolvedPlaylistItem::Psalm {
            reference,
            fetched_content,
        }) => match backend.create_presentation(&reference, &fetched_content).await {
            Ok(id) => match backend.add_to_playlist(playlist, &id).await {
                Ok(()) => PlaylistOutcome::added(reference),
                Err(e) => PlaylistOutcome::with_message(
                    OutcomeKind::CreationFailed,
                    reference,
                    format!("Attach failed: {}", e.diagnostic()),
                ),
            },
            Err(e) => PlaylistOutcome::with_message(
                OutcomeKind::CreationFailed,
                reference,
                format!("Create failed: {}", e.diagnostic()),
            ),
        },
    };

    if outcome.kind.is_success() {
        tracing::info!("{outcome}");
    } else {
        tracing::warn!("{outcome}");
    }
    outcome
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::error::Error;
    use std::sync::Mutex;

    /// Records calls and fails on demand.
    #[derive(Default)]
    struct FakeBackend {
        fail_playlist: bool,
        fail_create: Vec<&'static str>,
        fail_attach: Vec<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeBackend {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PlaylistBackend for FakeBackend {
        async fn create_playlist(&self, name: &str) -> Result<PlaylistId> {
            self.calls.lock().unwrap().push(format!("playlist {name}"));
            if self.fail_playlist {
                Err(Error::api_status("Request to /api/v1/playlist returned 500", 500))
            } else {
                Ok(PlaylistId::new("pl-1"))
            }
        }

        async fn create_presentation(&self, name: &str, _text: &str) -> Result<PresentationId> {
            self.calls.lock().unwrap().push(format!("create {name}"));
            if self.fail_create.iter().any(|n| *n == name) {
                Err(Error::api_status("create", 500))
            } else {
                Ok(PresentationId::new(format!("new-{name}")))
            }
        }

        async fn add_to_playlist(
            &self,
            playlist: &PlaylistId,
            presentation: &PresentationId,
        ) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("attach {presentation} -> {playlist}"));
            if self.fail_attach.iter().any(|p| *p == presentation.as_str()) {
                Err(Error::Network("connection reset".into()))
            } else {
                Ok(())
            }
        }
    }

    fn song(title: &str, id: Option<&str>) -> Resolution {
        Resolution::Ready(ResolvedPlaylistItem::Song {
            title: title.into(),
            library_presentation_id: id.map(PresentationId::new),
            closest_match: None,
        })
    }

    fn psalm(reference: &str) -> Resolution {
        Resolution::Ready(ResolvedPlaylistItem::Psalm {
            reference: reference.into(),
            fetched_content: format!("Text of {reference}"),
        })
    }

    fn kinds(report: &AssemblyReport) -> Vec<OutcomeKind> {
        report.outcomes.iter().map(|o| o.kind).collect()
    }

    #[tokio::test]
    async fn found_and_missing_songs() {
        let backend = FakeBackend::default();
        let items = vec![song("Mighty to Save", Some("p1")), song("Unknown Song", None)];

        let report = PlaylistAssembler::new(&backend, "Sonntag", items).run().await;

        assert_eq!(kinds(&report), vec![OutcomeKind::Added, OutcomeKind::NotFoundInLibrary]);
        assert_eq!(backend.calls(), vec!["playlist Sonntag", "attach p1 -> pl-1"]);
        assert_eq!(report.playlist_id(), Some(&PlaylistId::new("pl-1")));
    }

    #[tokio::test]
    async fn transitions_one_step_at_a_time() {
        let backend = FakeBackend::default();
        let mut assembler = PlaylistAssembler::new(&backend, "Sonntag", vec![psalm("Psalm 23")]);

        assert_eq!(assembler.state(), &AssemblyState::Initial);
        assert_eq!(assembler.step().await.name(), "playlist created");
        assert_eq!(backend.calls().len(), 1);
        assert_eq!(assembler.step().await.name(), "populating");
        assert!(assembler.outcomes().is_empty());
        assert_eq!(
            assembler.step().await,
            &AssemblyState::Populating {
                playlist_id: PlaylistId::new("pl-1"),
                processed: 1,
            }
        );
        assert_eq!(assembler.outcomes().len(), 1);
        assert_eq!(assembler.step().await.name(), "completed");
        assert_eq!(assembler.step().await.name(), "completed");
        assert_eq!(backend.calls().len(), 3);
    }

    #[tokio::test]
    async fn playlist_failure_aborts_without_outcomes() {
        let backend = FakeBackend {
            fail_playlist: true,
            ..FakeBackend::default()
        };
        let items = vec![song("Mighty to Save", Some("p1")), psalm("Psalm 23")];

        let report = PlaylistAssembler::new(&backend, "Sonntag", items).run().await;

        assert!(report.outcomes.is_empty());
        assert!(report.abort_reason().unwrap().contains("500"));
        assert_eq!(report.playlist_id(), None);
        assert_eq!(backend.calls(), vec!["playlist Sonntag"]);
    }

    #[tokio::test]
    async fn item_failures_do_not_stop_later_items() {
        let backend = FakeBackend {
            fail_create: vec!["Psalm 23"],
            fail_attach: vec!["p1"],
            ..FakeBackend::default()
        };
        let items = vec![
            song("Mighty to Save", Some("p1")),
            psalm("Psalm 23"),
            Resolution::FetchFailed {
                reference: "Psalm 42".into(),
                message: "Translation service returned 500".into(),
            },
            song("Cornerstone", Some("p2")),
            psalm("Psalm 100"),
        ];

        let report = PlaylistAssembler::new(&backend, "Sonntag", items).run().await;

        assert_eq!(
            kinds(&report),
            vec![
                OutcomeKind::CreationFailed,
                OutcomeKind::CreationFailed,
                OutcomeKind::FetchFailed,
                OutcomeKind::Added,
                OutcomeKind::Added,
            ]
        );
        assert!(report.outcomes[0].message.as_deref().unwrap().starts_with("Attach failed"));
        assert!(report.outcomes[1].message.as_deref().unwrap().starts_with("Create failed"));
        assert_eq!(report.count(OutcomeKind::Added), 2);
        assert!(matches!(report.state, AssemblyState::Completed { .. }));
        assert!(!backend.calls().iter().any(|c| c.contains("Psalm 42")));
        assert!(backend.calls().contains(&"attach new-Psalm 100 -> pl-1".to_string()));
    }

    #[tokio::test]
    async fn empty_item_list_still_creates_playlist() {
        let backend = FakeBackend::default();
        let report = PlaylistAssembler::new(&backend, "Leer", Vec::new()).run().await;
        assert!(report.outcomes.is_empty());
        assert!(matches!(report.state, AssemblyState::Completed { .. }));
    }

    #[tokio::test]
    async fn missing_song_message_names_closest_entry() {
        let backend = FakeBackend::default();
        let items = vec![Resolution::Ready(ResolvedPlaylistItem::Song {
            title: "Way Maker".into(),
            library_presentation_id: None,
            closest_match: Some("Way Maker (Live)".into()),
        })];

        let report = PlaylistAssembler::new(&backend, "Sonntag", items).run().await;
        assert_eq!(
            report.outcomes[0].message.as_deref(),
            Some("closest library entry: Way Maker (Live)")
        );
    }
}
