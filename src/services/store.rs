//! Collaborator contracts
//!
//! Interfaces to the persistence sink and the text-to-speech sink. The
//! gateway only depends on these traits; real backends live elsewhere.

use crate::models::ItemAnalysis;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

/// A persisted scan record
#[derive(Debug, Clone)]
pub struct StoredScan {
    pub id: String,
    pub analysis: ItemAnalysis,
    pub created_at: DateTime<Utc>,
}

/// Persistence sink for completed scans; returns an opaque id
#[async_trait]
pub trait ScanStore: Send + Sync {
    async fn save(&self, analysis: &ItemAnalysis) -> Result<String>;

    /// Most recent scans, newest first
    async fn recent(&self, limit: usize) -> Result<Vec<StoredScan>>;
}

/// In-memory scan store used by the default deployment and tests
#[derive(Default)]
pub struct MemoryScanStore {
    scans: RwLock<Vec<StoredScan>>,
}

impl MemoryScanStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScanStore for MemoryScanStore {
    async fn save(&self, analysis: &ItemAnalysis) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let mut scans = self.scans.write().await;
        scans.push(StoredScan {
            id: id.clone(),
            analysis: analysis.clone(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<StoredScan>> {
        let scans = self.scans.read().await;
        Ok(scans.iter().rev().take(limit).cloned().collect())
    }
}

/// Text-to-speech sink, accepting up to 1000 characters per call; `None`
/// means speech is unavailable and callers degrade to text-only responses
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Option<Vec<u8>>>;
}

/// Speech sink used when no TTS backend is configured
pub struct DisabledSpeech;

#[async_trait]
impl SpeechSynthesizer for DisabledSpeech {
    async fn synthesize(&self, _text: &str) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn sample_analysis() -> ItemAnalysis {
        ItemAnalysis {
            item_name: "Banana".to_string(),
            category: Category::Fruit,
            freshness_score: 70,
            freshness_description: "Ripe with some brown spots".to_string(),
            estimated_days_remaining: 3,
            storage_tips: vec!["Keep at room temperature".to_string()],
            visual_indicators: vec!["Yellow with brown spots".to_string()],
            sustainable_alternative: None,
            carbon_footprint: None,
        }
    }

    #[tokio::test]
    async fn test_save_returns_unique_ids() {
        let store = MemoryScanStore::new();
        let first = store.save(&sample_analysis()).await.unwrap();
        let second = store.save(&sample_analysis()).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_recent_returns_newest_first() {
        let store = MemoryScanStore::new();
        let mut older = sample_analysis();
        older.item_name = "Apple".to_string();
        store.save(&older).await.unwrap();
        store.save(&sample_analysis()).await.unwrap();

        let recent = store.recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].analysis.item_name, "Banana");
        assert_eq!(recent[1].analysis.item_name, "Apple");
    }

    #[tokio::test]
    async fn test_disabled_speech_yields_none() {
        let speech = DisabledSpeech;
        assert!(speech.synthesize("hello").await.unwrap().is_none());
    }
}
