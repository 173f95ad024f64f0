//! Condition exclusion record

use serde::{Deserialize, Serialize};

/// An excluded conditional coverage point.
///
/// Wire format: `Condition 2 "2940925445" "(enable && !reset) 1 -1" (1 "01")`.
/// The quoted field holds the expression and, after its last space, the
/// parameter string; the parenthesized suffix is the coverage detail.
/// `parameters` and `coverage` are empty when absent from the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionExclusion {
    /// Condition identifier, unique within its scope
    pub condition_id: String,
    /// Opaque content checksum from the verification database
    pub checksum: String,
    /// The excluded boolean expression
    pub expression: String,
    /// Additional coverage analysis parameters, e.g. `"1 -1"`
    pub parameters: String,
    /// Coverage detail from the parenthesized suffix, e.g. `1 "01"`
    pub coverage: String,
    /// Optional free-text justification
    pub annotation: Option<String>,
}

impl ConditionExclusion {
    pub fn new(
        condition_id: impl Into<String>,
        checksum: impl Into<String>,
        expression: impl Into<String>,
    ) -> Self {
        Self {
            condition_id: condition_id.into(),
            checksum: checksum.into(),
            expression: expression.into(),
            parameters: String::new(),
            coverage: String::new(),
            annotation: None,
        }
    }

    pub fn with_parameters(mut self, parameters: impl Into<String>) -> Self {
        self.parameters = parameters.into();
        self
    }

    pub fn with_coverage(mut self, coverage: impl Into<String>) -> Self {
        self.coverage = coverage.into();
        self
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_creation() {
        let cond = ConditionExclusion::new("2", "2940925445", "(enable && !reset)")
            .with_parameters("1 -1")
            .with_coverage("1 \"01\"");
        assert_eq!(cond.condition_id, "2");
        assert_eq!(cond.parameters, "1 -1");
        assert_eq!(cond.coverage, "1 \"01\"");
        assert!(cond.annotation.is_none());
    }
}
