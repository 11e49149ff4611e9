use crate::domain::model::{DiagramKind, DiagramOutput, DiagramStatus, FlowGraph};
use crate::utils::error::{FlowError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const MANIFEST_FILE: &str = "manifest.json";

/// A rendered output file, relative to the output directory.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputFile {
    pub name: String,
    pub contents: Vec<u8>,
}

pub fn graph_json(graph: &FlowGraph) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(graph)?)
}

pub fn links_csv(graph: &FlowGraph) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["source", "target", "value"])?;
    for link in &graph.links {
        let value = link.value.to_string();
        writer.write_record([link.source.as_str(), link.target.as_str(), value.as_str()])?;
    }
    writer
        .into_inner()
        .map_err(|e| FlowError::IoError(e.into_error()))
}

#[derive(Debug, Serialize)]
pub struct Manifest<'a> {
    pub generated_at: DateTime<Utc>,
    pub dataset: &'a str,
    pub revenue_year: &'a str,
    pub diagrams: Vec<ManifestEntry<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ManifestEntry<'a> {
    pub kind: DiagramKind,
    pub container: &'a str,
    #[serde(flatten)]
    pub status: &'a DiagramStatus,
    pub nodes: usize,
    pub links: usize,
    pub warnings: &'a [String],
}

impl<'a> Manifest<'a> {
    pub fn new(dataset: &'a str, revenue_year: &'a str, diagrams: &'a [DiagramOutput]) -> Self {
        Self {
            generated_at: Utc::now(),
            dataset,
            revenue_year,
            diagrams: diagrams
                .iter()
                .map(|d| ManifestEntry {
                    kind: d.slot.kind,
                    container: &d.slot.container,
                    status: &d.status,
                    nodes: d.graph.nodes.len(),
                    links: d.graph.links.len(),
                    warnings: &d.warnings,
                })
                .collect(),
        }
    }
}

/// Renders one file per (diagram, format), plus the manifest last.
pub fn render_files(diagrams: &[DiagramOutput], formats: &[String], manifest: &Manifest<'_>) -> Result<Vec<OutputFile>> {
    let mut files = Vec::new();

    for diagram in diagrams {
        for format in formats {
            let contents = match format.as_str() {
                "json" => graph_json(&diagram.graph)?,
                "csv" => links_csv(&diagram.graph)?,
                other => {
                    // 已在設定驗證時擋下
                    tracing::warn!("Skipping unsupported output format '{}'", other);
                    continue;
                }
            };
            files.push(OutputFile {
                name: format!("{}.{}", diagram.slot.container, format),
                contents,
            });
        }
    }

    files.push(OutputFile {
        name: MANIFEST_FILE.to_string(),
        contents: serde_json::to_vec_pretty(manifest)?,
    });
    Ok(files)
}

pub fn zip_files(files: &[OutputFile]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for file in files {
        zip.start_file::<_, ()>(file.name.as_str(), FileOptions::default())?;
        zip.write_all(&file.contents)?;
    }
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
