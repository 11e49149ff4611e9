use crate::domain::model::{Dataset, DiagramSlot, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    /// Local path or http(s) URL of the dataset document.
    fn dataset_source(&self) -> &str;
    fn output_path(&self) -> &str;
    /// Column read for each revenue record's amount.
    fn revenue_year(&self) -> &str;
    fn output_formats(&self) -> &[String];
    /// `Some(filename)` bundles every output file into one ZIP archive.
    fn zip_filename(&self) -> Option<&str>;
    fn request_timeout_seconds(&self) -> u64 {
        30
    }
    fn slots(&self) -> Vec<DiagramSlot> {
        DiagramSlot::defaults()
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Dataset>;
    async fn transform(&self, dataset: &Dataset) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
