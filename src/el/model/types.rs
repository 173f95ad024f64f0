//! Shared enumerations for exclusion records

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four categories of coverage exclusion found in `.el` files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExclusionType {
    /// Excluded statement or code region, identified by id and checksum
    Block,
    /// Excluded signal transition, optionally a specific bit
    Toggle,
    /// Excluded FSM state or state-to-state transition
    Fsm,
    /// Excluded boolean sub-expression evaluation outcome
    Condition,
}

impl ExclusionType {
    /// All categories, in the order they are serialized within a scope.
    pub const ALL: [ExclusionType; 4] = [
        ExclusionType::Block,
        ExclusionType::Toggle,
        ExclusionType::Fsm,
        ExclusionType::Condition,
    ];

    /// Human-readable category label as used in query results and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            ExclusionType::Block => "Block",
            ExclusionType::Toggle => "Toggle",
            ExclusionType::Fsm => "FSM",
            ExclusionType::Condition => "Condition",
        }
    }
}

impl fmt::Display for ExclusionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Direction of a signal transition excluded from toggle coverage.
///
/// `Both` is the wire-format default: a `Toggle` line without a direction
/// token excludes the signal in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToggleDirection {
    /// Rising edge (`0to1` token)
    ZeroToOne,
    /// Falling edge (`1to0` token)
    OneToZero,
    /// Both directions (no token on the wire)
    Both,
}

impl ToggleDirection {
    /// The token written into a `Toggle` line; empty for `Both`.
    pub fn as_token(&self) -> &'static str {
        match self {
            ToggleDirection::ZeroToOne => "0to1",
            ToggleDirection::OneToZero => "1to0",
            ToggleDirection::Both => "",
        }
    }

    /// Parse a direction token. Anything other than the two explicit
    /// direction tokens means both directions.
    pub fn from_token(token: &str) -> Self {
        match token {
            "0to1" => ToggleDirection::ZeroToOne,
            "1to0" => ToggleDirection::OneToZero,
            _ => ToggleDirection::Both,
        }
    }
}

impl Default for ToggleDirection {
    fn default() -> Self {
        ToggleDirection::Both
    }
}
