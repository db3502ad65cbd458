// Pipeline ingestion: the single upfront load of a listing document set

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, instrument};

use crate::error::Result;
use crate::pipeline::processing::parser::ListingDocument;

/// Core trait that all listing document sources implement
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Identifier used in logs and run reports
    fn source_name(&self) -> String;

    /// Load the whole document set
    async fn load(&self) -> Result<ListingDocument>;
}

/// Reads a JSON listing document from disk
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DocumentSource for FileSource {
    fn source_name(&self) -> String {
        self.path.display().to_string()
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<ListingDocument> {
        let bytes = tokio::fs::read(&self.path).await?;
        info!("Loaded {} bytes", bytes.len());
        ListingDocument::from_slice(&bytes)
    }
}

/// Serves an already-parsed JSON document
pub struct InMemorySource {
    name: String,
    document: Value,
}

impl InMemorySource {
    pub fn new(name: impl Into<String>, document: Value) -> Self {
        Self {
            name: name.into(),
            document,
        }
    }
}

#[async_trait]
impl DocumentSource for InMemorySource {
    fn source_name(&self) -> String {
        self.name.clone()
    }

    async fn load(&self) -> Result<ListingDocument> {
        Ok(ListingDocument::from_value(self.document.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[tokio::test]
    async fn test_file_source_reads_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", json!({"items": [{"sections": []}]})).unwrap();

        let source = FileSource::new(file.path());
        let document = source.load().await.unwrap();
        assert_eq!(document.len(), 1);
    }

    #[tokio::test]
    async fn test_file_source_missing_file_is_io_error() {
        let source = FileSource::new("definitely/missing.json");
        let result = source.load().await;
        assert!(matches!(result, Err(crate::error::PipelineError::Io(_))));
    }

    #[tokio::test]
    async fn test_in_memory_source() {
        let source = InMemorySource::new("fixture", json!([{}, {}, {}]));
        assert_eq!(source.source_name(), "fixture");
        assert_eq!(source.load().await.unwrap().len(), 3);
    }
}
