use crate::domain::model::{json_type_name, BuildReport, Dataset, FlowGraph, Link, Node, Record};
use crate::utils::error::{FlowError, Result};
use serde_json::Value;
use std::collections::HashSet;

/// Accumulates one diagram's nodes and links.
///
/// Node names are unique and kept in first-reference order. Links are never
/// merged: two records producing the same edge yield two parallel links.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    seen: HashSet<String>,
    links: Vec<Link>,
    skipped: Vec<FlowError>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` unless a node with that name already exists.
    pub fn ensure_node(&mut self, name: &str) {
        if self.seen.insert(name.to_string()) {
            self.nodes.push(Node {
                name: name.to_string(),
            });
        }
    }

    /// Appends a link, registering both endpoints first.
    pub fn link(&mut self, source: &str, target: &str, value: f64) {
        self.ensure_node(source);
        self.ensure_node(target);
        self.links.push(Link {
            source: source.to_string(),
            target: target.to_string(),
            value,
        });
    }

    pub fn skip(&mut self, error: FlowError) {
        tracing::warn!("⚠️ {}", error);
        self.skipped.push(error);
    }

    pub fn finish(self) -> BuildReport {
        BuildReport {
            graph: FlowGraph {
                nodes: self.nodes,
                links: self.links,
            },
            skipped: self.skipped,
        }
    }

    /// Runs `handle` over every record of `collection`.
    ///
    /// Record-level errors returned by `handle` are recorded as skipped and the
    /// loop continues; any other error aborts the build. `handle` must not
    /// touch the builder before its last fallible step, so a skipped record
    /// leaves no partial nodes or links behind.
    pub fn for_each_record<F>(&mut self, dataset: &Dataset, collection: &str, mut handle: F) -> Result<()>
    where
        F: FnMut(&mut GraphBuilder, RecordCursor<'_>) -> Result<()>,
    {
        let items = dataset.collection(collection)?;
        tracing::debug!("Reading {} records from '{}'", items.len(), collection);

        for (index, item) in items.iter().enumerate() {
            let outcome = match item {
                Value::Object(record) => handle(
                    &mut *self,
                    RecordCursor {
                        collection,
                        index,
                        record,
                    },
                ),
                other => Err(FlowError::InvalidRecord {
                    collection: collection.to_string(),
                    index,
                    reason: format!("expected an object, found {}", json_type_name(other)),
                }),
            };

            match outcome {
                Ok(()) => {}
                Err(e) if e.is_record_level() => self.skip(e),
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

/// Typed field access on a single record, producing record-level errors.
#[derive(Debug, Clone, Copy)]
pub struct RecordCursor<'a> {
    pub collection: &'a str,
    pub index: usize,
    pub record: &'a Record,
}

impl<'a> RecordCursor<'a> {
    fn missing(&self, field: &str) -> FlowError {
        FlowError::MissingField {
            collection: self.collection.to_string(),
            index: self.index,
            field: field.to_string(),
        }
    }

    fn invalid(&self, reason: String) -> FlowError {
        FlowError::InvalidRecord {
            collection: self.collection.to_string(),
            index: self.index,
            reason,
        }
    }

    fn present(&self, field: &str) -> Option<&'a Value> {
        self.record.get(field).filter(|v| !v.is_null())
    }

    /// `Some` only when the field holds a string.
    pub fn tag(&self, field: &str) -> Option<&'a str> {
        self.present(field).and_then(Value::as_str)
    }

    pub fn text(&self, field: &str) -> Result<&'a str> {
        match self.present(field) {
            None => Err(self.missing(field)),
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(other) => Err(self.invalid(format!(
                "'{}' should be a string, found {}",
                field,
                json_type_name(other)
            ))),
        }
    }

    /// A finite amount; the field must be present.
    pub fn amount(&self, field: &str) -> Result<f64> {
        let value = self.present(field).ok_or_else(|| self.missing(field))?;
        match parse_amount(value) {
            Some(amount) if amount.is_finite() => Ok(amount),
            Some(_) => Err(self.invalid(format!("'{}' is not a finite number", field))),
            None => Err(self.invalid(format!(
                "'{}' should be a number, found {}",
                field,
                json_type_name(value)
            ))),
        }
    }

    pub fn non_negative_amount(&self, field: &str) -> Result<f64> {
        let amount = self.amount(field)?;
        if amount < 0.0 {
            return Err(self.invalid(format!("'{}' is negative ({})", field, amount)));
        }
        Ok(amount)
    }

    /// Lenient read: absent, non-numeric or non-finite values are `None`.
    pub fn optional_amount(&self, field: &str) -> Option<f64> {
        self.present(field)
            .and_then(parse_amount)
            .filter(|amount| amount.is_finite())
    }
}

/// Numbers, or strings such as `"1,250.50"`.
pub fn parse_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    }
}
