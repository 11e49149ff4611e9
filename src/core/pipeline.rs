use crate::core::export::{self, Manifest};
use crate::core::rules::{self, RuleOptions};
use crate::core::{ConfigProvider, Dataset, Pipeline, Storage, TransformResult};
use crate::domain::model::{DiagramOutput, DiagramStatus};
use crate::utils::error::{FlowError, Result};
use crate::utils::validation::is_remote_source;
use reqwest::Client;
use std::time::Duration;

/// Fetches the budget dataset once, builds every configured diagram slot
/// against it and writes the layout input documents.
pub struct SankeyPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> SankeyPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds()))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });
        Self {
            storage,
            config,
            client,
        }
    }

    async fn fetch_remote(&self, url: &str) -> Result<Vec<u8>> {
        let load_error = |message: String| FlowError::DatasetLoad {
            source_name: url.to_string(),
            message,
        };

        tracing::debug!("Requesting dataset from: {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| load_error(format!("request failed: {}", e)))?;

        let status = response.status();
        tracing::debug!("Dataset response status: {}", status);
        if !status.is_success() {
            return Err(load_error(format!("HTTP status {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| load_error(format!("failed to read body: {}", e)))?;
        Ok(body.to_vec())
    }

    async fn read_local(&self, path: &str) -> Result<Vec<u8>> {
        tracing::debug!("Reading dataset file: {}", path);
        tokio::fs::read(path)
            .await
            .map_err(|e| FlowError::DatasetLoad {
                source_name: path.to_string(),
                message: e.to_string(),
            })
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for SankeyPipeline<S, C> {
    async fn extract(&self) -> Result<Dataset> {
        let source = self.config.dataset_source();
        let bytes = if is_remote_source(source) {
            self.fetch_remote(source).await?
        } else {
            self.read_local(source).await?
        };

        let dataset = Dataset::from_slice(source, &bytes)?;
        tracing::debug!(
            "Dataset collections: {}",
            dataset.collection_names().collect::<Vec<_>>().join(", ")
        );
        Ok(dataset)
    }

    async fn transform(&self, dataset: &Dataset) -> Result<TransformResult> {
        let options = RuleOptions {
            revenue_year: self.config.revenue_year().to_string(),
        };

        let mut diagrams = Vec::new();
        for slot in self.config.slots() {
            match rules::build(dataset, slot.kind, &options) {
                Ok(report) => {
                    if !report.skipped.is_empty() {
                        tracing::warn!(
                            "⚠️ '{}' skipped {} record(s)",
                            slot.kind,
                            report.skipped.len()
                        );
                    }
                    diagrams.push(DiagramOutput {
                        slot,
                        graph: report.graph,
                        status: DiagramStatus::Built,
                        warnings: report.skipped.iter().map(ToString::to_string).collect(),
                    });
                }
                // 只影響這張圖，其餘照常產出
                Err(e @ FlowError::MissingCollection { .. }) => {
                    tracing::error!("❌ '{}' left empty: {}", slot.container, e);
                    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
                    diagrams.push(DiagramOutput::placeholder(slot, e.to_string()));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(TransformResult { diagrams })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let manifest = Manifest::new(
            self.config.dataset_source(),
            self.config.revenue_year(),
            &result.diagrams,
        );
        let files = export::render_files(&result.diagrams, self.config.output_formats(), &manifest)?;

        match self.config.zip_filename() {
            Some(filename) => {
                tracing::debug!("Bundling {} files into {}", files.len(), filename);
                let zip_data = export::zip_files(&files)?;
                tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
                self.storage.write_file(filename, &zip_data).await?;
                Ok(format!("{}/{}", self.config.output_path(), filename))
            }
            None => {
                for file in &files {
                    tracing::debug!("Writing {} ({} bytes)", file.name, file.contents.len());
                    self.storage.write_file(&file.name, &file.contents).await?;
                }
                Ok(self.config.output_path().to_string())
            }
        }
    }
}
