//! End-to-end run: document in, populated playlist out.
//!
//! A run is strictly sequential. Between classification and resolution it
//! pauses so the operator can import the detected songs into the library;
//! the pause is a [`Continuation`] resolved by its [`ContinueHandle`].

use std::path::Path;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};
use tracing::Instrument;
use uuid::Uuid;

use crate::bible::{BibleApiClient, ScriptureProvider, Translation};
use crate::classify::ItemClassifier;
use crate::config::Config;
use crate::document::{self, ExtractedText};
use crate::error::{Error, Result};
use crate::propresenter::ProPresenterClient;
use crate::services::playlist::{AssemblyState, PlaylistAssembler, PlaylistBackend};
use crate::services::resolve::resolve_items;
use crate::types::{OutcomeKind, PlaylistId, PlaylistOutcome, ServiceItem};

/// Progress notifications sent while a run is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// Classification finished with this many items.
    Classified(usize),
    /// The run waits for these songs to be imported.
    AwaitingImport(Vec<String>),
    /// Library and scripture lookups started.
    Resolving,
    /// Playlist mutations started.
    Assembling,
    /// The run finished; outcome count attached.
    Finished(usize),
}

/// Resumes or cancels a paused run.
#[derive(Debug)]
pub struct ContinueHandle(oneshot::Sender<bool>);

impl ContinueHandle {
    /// Let the run continue.
    pub fn proceed(self) {
        let _ = self.0.send(true);
    }

    /// Cancel the run. Dropping the handle has the same effect.
    pub fn abort(self) {
        let _ = self.0.send(false);
    }
}

/// Waiting side of the operator pause.
#[derive(Debug)]
pub struct Continuation(oneshot::Receiver<bool>);

impl Continuation {
    /// Suspend until the handle proceeds. No timeout.
    pub async fn wait(self) -> Result<()> {
        match self.0.await {
            Ok(true) => Ok(()),
            Ok(false) | Err(_) => Err(Error::Aborted),
        }
    }
}

/// Create a linked pause pair.
pub fn continuation() -> (ContinueHandle, Continuation) {
    let (tx, rx) = oneshot::channel();
    (ContinueHandle(tx), Continuation(rx))
}

/// Items classified from one document, ready for the operator to review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRun {
    /// Ordered service items.
    pub items: Vec<ServiceItem>,
}

impl PreparedRun {
    /// Song titles the operator should import before continuing.
    pub fn songs_to_import(&self) -> Vec<String> {
        self.items
            .iter()
            .filter_map(|item| match item {
                ServiceItem::Song { title } => Some(title.clone()),
                ServiceItem::Psalm { .. } => None,
            })
            .collect()
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Identifier attached to every log line of the run.
    pub run_id: Uuid,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Name of the created playlist.
    pub playlist_name: String,
    /// Id of the created playlist.
    pub playlist_id: PlaylistId,
    /// One outcome per item, in sequence order.
    pub outcomes: Vec<PlaylistOutcome>,
}

impl RunReport {
    /// Number of outcomes of the given kind.
    pub fn count(&self, kind: OutcomeKind) -> usize {
        self.outcomes.iter().filter(|o| o.kind == kind).count()
    }

    /// One line per outcome kind that occurred, e.g. `added: 3`.
    pub fn summary(&self) -> String {
        OutcomeKind::all()
            .iter()
            .filter_map(|&kind| match self.count(kind) {
                0 => None,
                n => Some(format!("{}: {n}", kind.label())),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The document-to-playlist pipeline.
pub struct Pipeline {
    classifier: ItemClassifier,
    scripture: Box<dyn ScriptureProvider>,
    propresenter: ProPresenterClient,
    translation: Translation,
}

impl Pipeline {
    /// Build every stage from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let client = config.http_client()?;
        Ok(Self {
            classifier: ItemClassifier::from_config(config, client.clone()),
            scripture: Box::new(BibleApiClient::new(
                client.clone(),
                config.bible_api_url.clone(),
            )),
            propresenter: ProPresenterClient::new(client, config.propresenter_url.clone()),
            translation: Translation::new(&config.translation),
        })
    }

    /// Assemble a pipeline from prebuilt stages.
    pub fn from_parts(
        classifier: ItemClassifier,
        scripture: Box<dyn ScriptureProvider>,
        propresenter: ProPresenterClient,
        translation: Translation,
    ) -> Self {
        Self {
            classifier,
            scripture,
            propresenter,
            translation,
        }
    }

    /// Read and classify a planning document.
    pub async fn prepare(&self, path: &Path) -> Result<PreparedRun> {
        let text = document::extract_text(path)?;
        tracing::info!(
            "Extracted {} text blocks from {}",
            text.blocks().len(),
            path.display()
        );
        self.classify_text(&text).await
    }

    /// Classify already extracted text.
    pub async fn classify_text(&self, text: &ExtractedText) -> Result<PreparedRun> {
        let items = self.classifier.classify(text).await?;
        Ok(PreparedRun { items })
    }

    /// Resolve and assemble a prepared run into a new playlist.
    ///
    /// The library snapshot is taken here, after any import pause.
    pub async fn complete(
        &self,
        prepared: &PreparedRun,
        playlist_name: &str,
    ) -> Result<(PlaylistId, Vec<PlaylistOutcome>)> {
        self.resolve_and_assemble(prepared, playlist_name, None).await
    }

    async fn resolve_and_assemble(
        &self,
        prepared: &PreparedRun,
        playlist_name: &str,
        events: Option<&mpsc::Sender<PipelineEvent>>,
    ) -> Result<(PlaylistId, Vec<PlaylistOutcome>)> {
        if let Some(events) = events {
            notify(events, PipelineEvent::Resolving);
        }
        let library = self.propresenter.fetch_library().await.inspect_err(|e| {
            tracing::error!("Library fetch failed: {e}");
        })?;
        let resolved = resolve_items(
            &prepared.items,
            &library,
            self.scripture.as_ref(),
            &self.translation,
        )
        .await;

        if let Some(events) = events {
            notify(events, PipelineEvent::Assembling);
        }
        let backend: &dyn PlaylistBackend = &self.propresenter;
        let report = PlaylistAssembler::new(backend, playlist_name, resolved).run().await;

        match report.state {
            AssemblyState::Completed { playlist_id } => Ok((playlist_id, report.outcomes)),
            AssemblyState::Aborted { reason } => Err(Error::PlaylistCreationFailed(reason)),
            other => Err(Error::PlaylistCreationFailed(format!(
                "Assembly stopped in state '{}'",
                other.name()
            ))),
        }
    }

    /// Full run with the operator pause between classification and resolution.
    ///
    /// The pause is skipped when no songs were detected. Progress events are
    /// best effort: an event that finds the channel full is dropped, so
    /// callers that rely on `AwaitingImport` must drain the receiver while the
    /// run is in flight.
    pub async fn run(
        &self,
        path: &Path,
        playlist_name: &str,
        events: mpsc::Sender<PipelineEvent>,
        continuation: Continuation,
    ) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let span = tracing::info_span!("run", run_id = %run_id);

        async move {
            tracing::info!("Building playlist '{playlist_name}' from {}", path.display());

            let prepared = self.prepare(path).await?;
            notify(&events, PipelineEvent::Classified(prepared.items.len()));

            let songs = prepared.songs_to_import();
            if !songs.is_empty() {
                tracing::info!("Waiting for {} songs to be imported", songs.len());
                notify(&events, PipelineEvent::AwaitingImport(songs));
                continuation.wait().await.inspect_err(|_| {
                    tracing::warn!("Run cancelled by operator");
                })?;
            }

            let (playlist_id, outcomes) = self
                .resolve_and_assemble(&prepared, playlist_name, Some(&events))
                .await?;
            notify(&events, PipelineEvent::Finished(outcomes.len()));

            let report = RunReport {
                run_id,
                started_at,
                playlist_name: playlist_name.to_string(),
                playlist_id,
                outcomes,
            };
            tracing::info!("Run finished: {}", report.summary());
            Ok(report)
        }
        .instrument(span)
        .await
    }
}

/// Send a progress event without waiting. A full or closed channel drops it.
fn notify(events: &mpsc::Sender<PipelineEvent>, event: PipelineEvent) {
    match events.try_send(event) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(event)) => {
            tracing::debug!("Progress channel full, dropping {event:?}");
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            tracing::debug!("Progress receiver dropped");
        }
    }
}
