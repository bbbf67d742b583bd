use serde::{Deserialize, Serialize};

use crate::criterion::Criterion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterNode {
    Condition(Criterion),
    Group(FilterGroup),
}

/// A boolean combination of criteria. An empty group matches every document,
/// whichever the logical operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterGroup {
    pub logical: LogicalOp,
    pub children: Vec<FilterNode>,
}

impl FilterGroup {
    pub fn all(criteria: Vec<Criterion>) -> Self {
        Self::of(LogicalOp::And, criteria)
    }

    pub fn any(criteria: Vec<Criterion>) -> Self {
        Self::of(LogicalOp::Or, criteria)
    }

    fn of(logical: LogicalOp, criteria: Vec<Criterion>) -> Self {
        Self {
            logical,
            children: criteria.into_iter().map(FilterNode::Condition).collect(),
        }
    }

    pub fn is_match_all(&self) -> bool {
        self.children.is_empty()
    }

    /// True when the group can be proven to match nothing without touching
    /// storage: an AND with an unsatisfiable child, or an OR whose children
    /// are all unsatisfiable.
    pub fn is_unsatisfiable(&self) -> bool {
        if self.children.is_empty() {
            return false;
        }
        match self.logical {
            LogicalOp::And => self.children.iter().any(FilterNode::is_unsatisfiable),
            LogicalOp::Or => self.children.iter().all(FilterNode::is_unsatisfiable),
        }
    }
}

impl FilterNode {
    pub fn is_unsatisfiable(&self) -> bool {
        match self {
            FilterNode::Condition(c) => c.is_unsatisfiable(),
            FilterNode::Group(g) => g.is_unsatisfiable(),
        }
    }
}
