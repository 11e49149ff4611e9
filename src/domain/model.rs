use crate::utils::error::{FlowError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A record inside one of the dataset's sub-collections.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// The parsed budget document. Every top-level member is a named sub-collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Dataset {
    collections: serde_json::Map<String, serde_json::Value>,
}

impl Dataset {
    pub fn from_value(source_name: &str, value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Object(collections) => Ok(Self { collections }),
            other => Err(FlowError::DatasetLoad {
                source_name: source_name.to_string(),
                message: format!("expected a JSON object, found {}", json_type_name(&other)),
            }),
        }
    }

    pub fn from_slice(source_name: &str, bytes: &[u8]) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|e| FlowError::DatasetLoad {
                source_name: source_name.to_string(),
                message: format!("invalid JSON: {}", e),
            })?;
        Self::from_value(source_name, value)
    }

    /// Items of a sub-collection. A member that is not an array counts as absent.
    pub fn collection(&self, name: &str) -> Result<&[serde_json::Value]> {
        match self.collections.get(name) {
            Some(serde_json::Value::Array(items)) => Ok(items),
            _ => Err(FlowError::MissingCollection {
                collection: name.to_string(),
            }),
        }
    }

    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }
}

pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub source: String,
    pub target: String,
    pub value: f64,
}

/// Layout input document: `{ "nodes": [{name}], "links": [{source, target, value}] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowGraph {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

impl FlowGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }

    pub fn node_names(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagramKind {
    StudentCosts,
    ComprehensiveFee,
    Revenues,
    Athletics,
}

impl DiagramKind {
    pub const ALL: [DiagramKind; 4] = [
        DiagramKind::StudentCosts,
        DiagramKind::ComprehensiveFee,
        DiagramKind::Revenues,
        DiagramKind::Athletics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiagramKind::StudentCosts => "student-costs",
            DiagramKind::ComprehensiveFee => "comprehensive-fee",
            DiagramKind::Revenues => "revenues",
            DiagramKind::Athletics => "athletics",
        }
    }

    /// The dataset sub-collection this kind reads.
    pub fn collection(&self) -> &'static str {
        match self {
            DiagramKind::StudentCosts | DiagramKind::ComprehensiveFee => "student-costs",
            DiagramKind::Revenues => "jmu-revenues",
            DiagramKind::Athletics => "jmu-athletics",
        }
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A diagram kind bound to its rendering target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramSlot {
    pub kind: DiagramKind,
    pub container: String,
}

impl DiagramSlot {
    pub fn new(kind: DiagramKind, container: &str) -> Self {
        Self {
            kind,
            container: container.to_string(),
        }
    }

    /// The fixed slot table; not user configurable.
    pub fn defaults() -> Vec<DiagramSlot> {
        vec![
            DiagramSlot::new(DiagramKind::StudentCosts, "containerOne"),
            DiagramSlot::new(DiagramKind::ComprehensiveFee, "containerTwo"),
            DiagramSlot::new(DiagramKind::Revenues, "containerThree"),
            DiagramSlot::new(DiagramKind::Athletics, "containerFour"),
        ]
    }
}

/// One build's graph plus the records it had to skip.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub graph: FlowGraph,
    pub skipped: Vec<FlowError>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DiagramStatus {
    Built,
    Placeholder { reason: String },
}

#[derive(Debug, Clone)]
pub struct DiagramOutput {
    pub slot: DiagramSlot,
    pub graph: FlowGraph,
    pub status: DiagramStatus,
    pub warnings: Vec<String>,
}

impl DiagramOutput {
    pub fn placeholder(slot: DiagramSlot, reason: String) -> Self {
        Self {
            slot,
            graph: FlowGraph::default(),
            status: DiagramStatus::Placeholder { reason },
            warnings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub diagrams: Vec<DiagramOutput>,
}

impl TransformResult {
    pub fn built_count(&self) -> usize {
        self.diagrams
            .iter()
            .filter(|d| d.status == DiagramStatus::Built)
            .count()
    }
}
