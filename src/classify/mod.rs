//! Service item classification.
//!
//! Two independent detectors feed one ordered item list: songs come from a
//! pluggable [`SongDetector`], psalms from pattern matching over body
//! paragraphs. Songs are listed first in detector order, then psalms in order
//! of first occurrence.

pub mod detector;
pub mod gemini;

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::{Config, DetectorKind};
use crate::document::ExtractedText;
use crate::error::Result;
use crate::types::ServiceItem;

pub use detector::{PraiseBlockDetector, SongDetector};
pub use gemini::{parse_title_list, GeminiSongDetector};

/// Regex matching `Psalm 23` style references.
#[allow(clippy::expect_used)]
static RE_PSALM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bPsalm\s+(\d+)").expect("valid regex: RE_PSALM")
});

/// Turns document text into typed service items.
pub struct ItemClassifier {
    detector: Box<dyn SongDetector>,
}

impl ItemClassifier {
    /// Create a classifier around a song detector.
    pub fn new(detector: Box<dyn SongDetector>) -> Self {
        Self { detector }
    }

    /// Build the detector selected in the configuration.
    pub fn from_config(config: &Config, client: reqwest::Client) -> Self {
        let detector: Box<dyn SongDetector> = match config.detector {
            DetectorKind::Gemini => Box::new(GeminiSongDetector::new(
                client,
                config.gemini_url.clone(),
                config.gemini_model.clone(),
                config.gemini_api_key.clone(),
            )),
            DetectorKind::PraiseBlock => {
                Box::new(PraiseBlockDetector::new(config.praise_block_marker.clone()))
            }
        };
        Self::new(detector)
    }

    /// Name of the active song detector.
    pub fn detector_name(&self) -> &'static str {
        self.detector.name()
    }

    /// Classify a document. Fails only if song detection fails.
    pub async fn classify(&self, text: &ExtractedText) -> Result<Vec<ServiceItem>> {
        let songs = if text.is_blank() {
            Vec::new()
        } else {
            self.detector.detect_songs(&text.corpus()).await?
        };
        let psalms = detect_psalms(text.paragraphs());

        tracing::info!(
            "Classified {} songs and {} psalms using {}",
            songs.len(),
            psalms.len(),
            self.detector.name()
        );

        Ok(songs
            .into_iter()
            .map(ServiceItem::song)
            .chain(psalms.into_iter().map(ServiceItem::psalm))
            .collect())
    }
}

/// Psalm references in order of first appearance, without duplicates.
///
/// The number is kept as written (`Psalm 023` stays `Psalm 023`); an
/// all-zero number is not a psalm and is skipped.
pub fn detect_psalms<'a>(paragraphs: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut psalms = Vec::new();

    for paragraph in paragraphs {
        for caps in RE_PSALM.captures_iter(paragraph) {
            let Some(digits) = caps.get(1).map(|m| m.as_str()) else {
                continue;
            };
            if digits.bytes().all(|b| b == b'0') {
                tracing::debug!("Skipping 'Psalm {digits}': not a psalm number");
                continue;
            }
            let reference = format!("Psalm {digits}");
            if seen.insert(reference.clone()) {
                psalms.push(reference);
            }
        }
    }

    psalms
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::document::TextBlock;
    use crate::error::Error;
    use async_trait::async_trait;

    /// Detector returning a fixed answer.
    struct Fixed(Result<Vec<String>>);

    #[async_trait]
    impl SongDetector for Fixed {
        async fn detect_songs(&self, _corpus: &str) -> Result<Vec<String>> {
            match &self.0 {
                Ok(titles) => Ok(titles.clone()),
                Err(_) => Err(Error::classification("no list")),
            }
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    fn fallback() -> ItemClassifier {
        ItemClassifier::new(Box::new(PraiseBlockDetector::default()))
    }

    #[tokio::test]
    async fn praise_block_scenario() {
        let text = ExtractedText::from_plain_text(
            "Lobpreis-Block\n- Mighty to Save\n- Cornerstone\nPsalm 23",
        );
        let items = fallback().classify(&text).await.unwrap();
        assert_eq!(
            items,
            vec![
                ServiceItem::song("Mighty to Save"),
                ServiceItem::song("Cornerstone"),
                ServiceItem::psalm("Psalm 23"),
            ]
        );
    }

    #[test]
    fn no_psalm_mentions_yield_nothing() {
        assert!(detect_psalms(["Begrüßung", "Psalmen und Lieder", "Predigt"]).is_empty());
    }

    #[test]
    fn repeated_psalms_are_deduplicated_in_first_order() {
        let psalms = detect_psalms([
            "Lesung: Psalm 42",
            "Psalm 23 und Psalm   42",
            "Psalm 23",
            "Psalm 0 gibt es nicht",
        ]);
        assert_eq!(psalms, vec!["Psalm 42", "Psalm 23"]);
    }

    #[test]
    fn psalm_numbers_are_kept_as_written() {
        let psalms = detect_psalms(["Psalm 023", "Psalm 23", "Psalm 99999999999", "Psalm 000"]);
        assert_eq!(psalms, vec!["Psalm 023", "Psalm 23", "Psalm 99999999999"]);
    }

    #[tokio::test]
    async fn table_cells_are_not_scanned_for_psalms() {
        let text = ExtractedText::new(vec![
            TextBlock::paragraph("Psalm 1"),
            TextBlock::cell("Psalm 2"),
        ]);
        let items = fallback().classify(&text).await.unwrap();
        assert_eq!(items, vec![ServiceItem::psalm("Psalm 1")]);
    }

    #[tokio::test]
    async fn song_count_matches_detector_output() {
        let titles = vec!["B".to_string(), "A".to_string(), "B".to_string()];
        let classifier = ItemClassifier::new(Box::new(Fixed(Ok(titles))));
        let items = classifier
            .classify(&ExtractedText::from_plain_text("anything"))
            .await
            .unwrap();
        assert_eq!(
            items,
            vec![ServiceItem::song("B"), ServiceItem::song("A"), ServiceItem::song("B")]
        );
    }

    #[tokio::test]
    async fn detector_failure_is_fatal() {
        let classifier = ItemClassifier::new(Box::new(Fixed(Err(Error::classification("x")))));
        let result = classifier
            .classify(&ExtractedText::from_plain_text("Psalm 23"))
            .await;
        assert!(matches!(result, Err(Error::Classification(_))));
    }

    #[tokio::test]
    async fn blank_document_skips_detector() {
        let classifier = ItemClassifier::new(Box::new(Fixed(Err(Error::classification("x")))));
        let items = classifier.classify(&ExtractedText::default()).await.unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn config_selects_detector() {
        let config = Config {
            detector: DetectorKind::PraiseBlock,
            ..Config::default()
        };
        let classifier = ItemClassifier::from_config(&config, reqwest::Client::new());
        assert_eq!(classifier.detector_name(), "praise-block");

        let classifier = ItemClassifier::from_config(&Config::default(), reqwest::Client::new());
        assert_eq!(classifier.detector_name(), "gemini");
    }
}
