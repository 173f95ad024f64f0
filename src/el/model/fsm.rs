//! FSM exclusion record
//!
//! FSM exclusions come in two sub-shapes sharing one entity: a state-level
//! exclusion (`Fsm <name> "<checksum>"`) and a transition-level exclusion
//! (`Transition <from>-><to> "<transitionId>"`). The sub-shape lives in
//! [`FsmExclusionKind`].

use serde::{Deserialize, Serialize};

/// An excluded FSM state or state-to-state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FsmExclusion {
    /// FSM name; transition records parsed from the wire use the literal
    /// key `"transition"` since the line carries no FSM name of its own
    pub fsm_name: String,
    /// Optional free-text justification
    pub annotation: Option<String>,
    /// State or transition payload
    pub kind: FsmExclusionKind,
}

/// The two sub-shapes of an FSM exclusion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FsmExclusionKind {
    /// Entire state excluded
    State {
        /// Opaque checksum from the verification database
        checksum: String,
    },
    /// One specific transition excluded
    Transition {
        from_state: String,
        to_state: String,
        /// Transition encoding or identifier, e.g. `"11->0"`
        transition_id: String,
    },
}

impl FsmExclusion {
    /// State-level exclusion.
    pub fn state(fsm_name: impl Into<String>, checksum: impl Into<String>) -> Self {
        Self {
            fsm_name: fsm_name.into(),
            annotation: None,
            kind: FsmExclusionKind::State {
                checksum: checksum.into(),
            },
        }
    }

    /// Transition-level exclusion.
    pub fn transition(
        fsm_name: impl Into<String>,
        from_state: impl Into<String>,
        to_state: impl Into<String>,
        transition_id: impl Into<String>,
    ) -> Self {
        Self {
            fsm_name: fsm_name.into(),
            annotation: None,
            kind: FsmExclusionKind::Transition {
                from_state: from_state.into(),
                to_state: to_state.into(),
                transition_id: transition_id.into(),
            },
        }
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    pub fn is_transition(&self) -> bool {
        matches!(self.kind, FsmExclusionKind::Transition { .. })
    }

    /// Checksum of a state-level exclusion; transitions carry none.
    pub fn checksum(&self) -> Option<&str> {
        match &self.kind {
            FsmExclusionKind::State { checksum } => Some(checksum),
            FsmExclusionKind::Transition { .. } => None,
        }
    }
}
