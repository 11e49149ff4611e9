use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Extract must succeed before any diagram is built; a failed fetch
    /// aborts the whole run.
    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting Sankey build...");
        let started = Instant::now();

        // Extract
        tracing::info!("📥 Loading dataset...");
        let stage = Instant::now();
        let dataset = self.pipeline.extract().await?;
        tracing::info!("Dataset loaded in {:?}", stage.elapsed());

        // Transform
        tracing::info!("🔄 Building flow graphs...");
        let stage = Instant::now();
        let result = self.pipeline.transform(&dataset).await?;
        tracing::info!(
            "Built {}/{} diagrams in {:?}",
            result.built_count(),
            result.diagrams.len(),
            stage.elapsed()
        );
        for diagram in &result.diagrams {
            tracing::debug!(
                "  {} -> {}: {} nodes, {} links",
                diagram.slot.kind,
                diagram.slot.container,
                diagram.graph.nodes.len(),
                diagram.graph.links.len()
            );
        }

        // Load
        tracing::info!("💾 Writing diagrams...");
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {} (total {:?})", output_path, started.elapsed());

        Ok(output_path)
    }
}
