//! Per-diagram construction rules.
//!
//! Every [`DiagramKind`] has exactly one [`RuleSet`]. Each rule set pre-registers
//! its fixed nodes, then walks its sub-collection and emits links through a
//! fresh [`GraphBuilder`], so no state is shared between kinds.

use crate::core::graph::{GraphBuilder, RecordCursor};
use crate::domain::model::{BuildReport, Dataset, DiagramKind};
use crate::utils::error::Result;

pub const STUDENT_ROOT: &str = "JMU Student";
pub const SEMESTERS: [&str; 2] = ["Fall", "Spring"];
pub const STUDENT_ITEMIZED: &str = "student itemized";

pub const FEE_ROOT: &str = "Auxiliary Comprehensive Fee";
pub const FEE_COMPONENT: &str = "Auxiliary Comprehensive Fee Component";

pub const REVENUE_ROOT: &str = "JMU";
pub const DEFAULT_REVENUE_YEAR: &str = "2023";

pub const SPORTS: [&str; 5] = [
    "Football",
    "Men's Basketball",
    "Women's Basketball",
    "Other sports",
    "Non-Program Specific",
];
pub const ATHLETICS_HUB: &str = "JMU Athletics";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOptions {
    pub revenue_year: String,
}

impl Default for RuleOptions {
    fn default() -> Self {
        Self {
            revenue_year: DEFAULT_REVENUE_YEAR.to_string(),
        }
    }
}

pub trait RuleSet {
    fn kind(&self) -> DiagramKind;
    fn build(&self, dataset: &Dataset) -> Result<BuildReport>;
}

pub struct StudentCostRules;

impl RuleSet for StudentCostRules {
    fn kind(&self) -> DiagramKind {
        DiagramKind::StudentCosts
    }

    fn build(&self, dataset: &Dataset) -> Result<BuildReport> {
        let mut graph = GraphBuilder::new();
        graph.ensure_node(STUDENT_ROOT);
        for semester in SEMESTERS {
            graph.ensure_node(semester);
        }

        graph.for_each_record(dataset, self.kind().collection(), |graph, rec| {
            if rec.tag("type") != Some(STUDENT_ITEMIZED) {
                return Ok(());
            }
            let name = rec.text("name")?;
            let semester = rec.text("semester")?;
            let cost = rec.non_negative_amount("in-state")?;

            graph.ensure_node(name);
            graph.link(STUDENT_ROOT, semester, cost);
            graph.link(semester, name, cost);
            Ok(())
        })?;

        Ok(graph.finish())
    }
}

pub struct ComprehensiveFeeRules;

impl RuleSet for ComprehensiveFeeRules {
    fn kind(&self) -> DiagramKind {
        DiagramKind::ComprehensiveFee
    }

    fn build(&self, dataset: &Dataset) -> Result<BuildReport> {
        let mut graph = GraphBuilder::new();
        graph.ensure_node(FEE_ROOT);

        graph.for_each_record(dataset, self.kind().collection(), |graph, rec| {
            if rec.tag("type") != Some(FEE_COMPONENT) {
                return Ok(());
            }
            let name = rec.text("name")?;
            let amount = rec.non_negative_amount("amount")?;

            graph.link(FEE_ROOT, name, amount);
            Ok(())
        })?;

        Ok(graph.finish())
    }
}

pub struct RevenueRules {
    pub year: String,
}

impl RuleSet for RevenueRules {
    fn kind(&self) -> DiagramKind {
        DiagramKind::Revenues
    }

    fn build(&self, dataset: &Dataset) -> Result<BuildReport> {
        let mut graph = GraphBuilder::new();
        graph.ensure_node(REVENUE_ROOT);

        graph.for_each_record(dataset, self.kind().collection(), |graph, rec| {
            let category = rec.text("type")?;
            let name = rec.text("name")?;
            // 流向由規則固定，與數值正負無關
            let value = rec.amount(&self.year)?.abs();

            graph.link(REVENUE_ROOT, category, value);
            graph.link(category, name, value);
            Ok(())
        })?;

        Ok(graph.finish())
    }
}

pub struct AthleticsRules;

impl AthleticsRules {
    fn sport_flows(rec: &RecordCursor<'_>) -> Vec<(&'static str, f64)> {
        SPORTS
            .iter()
            .filter_map(|sport| {
                rec.optional_amount(sport)
                    .filter(|amount| *amount > 0.0)
                    .map(|amount| (*sport, amount))
            })
            .collect()
    }
}

impl RuleSet for AthleticsRules {
    fn kind(&self) -> DiagramKind {
        DiagramKind::Athletics
    }

    fn build(&self, dataset: &Dataset) -> Result<BuildReport> {
        let mut graph = GraphBuilder::new();
        for sport in SPORTS {
            graph.ensure_node(sport);
        }
        graph.ensure_node(ATHLETICS_HUB);

        graph.for_each_record(dataset, self.kind().collection(), |graph, rec| {
            let name = rec.text("name")?;
            let flows = Self::sport_flows(&rec);

            graph.ensure_node(name);
            for (sport, amount) in flows {
                graph.link(sport, ATHLETICS_HUB, amount);
                graph.link(ATHLETICS_HUB, name, amount);
            }
            Ok(())
        })?;

        Ok(graph.finish())
    }
}

pub fn rule_set(kind: DiagramKind, options: &RuleOptions) -> Box<dyn RuleSet> {
    match kind {
        DiagramKind::StudentCosts => Box::new(StudentCostRules),
        DiagramKind::ComprehensiveFee => Box::new(ComprehensiveFeeRules),
        DiagramKind::Revenues => Box::new(RevenueRules {
            year: options.revenue_year.clone(),
        }),
        DiagramKind::Athletics => Box::new(AthleticsRules),
    }
}

/// Builds the flow graph for one diagram kind from scratch.
pub fn build(dataset: &Dataset, kind: DiagramKind, options: &RuleOptions) -> Result<BuildReport> {
    let report = rule_set(kind, options).build(dataset)?;
    tracing::debug!(
        "Built '{}' graph: {} nodes, {} links, {} skipped records",
        kind,
        report.graph.nodes.len(),
        report.graph.links.len(),
        report.skipped.len()
    );
    Ok(report)
}
