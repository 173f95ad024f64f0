//! Toggle exclusion record

use super::types::ToggleDirection;
use serde::{Deserialize, Serialize};

/// An excluded signal transition.
///
/// Wire format examples:
/// - `Toggle 1to0 clk_gate_enable "net clk_gate_enable"`
/// - `Toggle data_bus [7] "net data_bus[31:0]"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleExclusion {
    /// Transition direction to exclude; `Both` carries no wire token
    pub direction: ToggleDirection,
    /// Full hierarchical signal name
    pub signal_name: String,
    /// Bit index for bus signals; `None` for scalars
    pub bit_index: Option<i32>,
    /// Descriptive net information from the verification database
    pub net_description: String,
    /// Optional free-text justification
    pub annotation: Option<String>,
}

impl ToggleExclusion {
    pub fn new(
        direction: ToggleDirection,
        signal_name: impl Into<String>,
        net_description: impl Into<String>,
    ) -> Self {
        Self {
            direction,
            signal_name: signal_name.into(),
            bit_index: None,
            net_description: net_description.into(),
            annotation: None,
        }
    }

    pub fn with_bit_index(mut self, bit_index: i32) -> Self {
        self.bit_index = Some(bit_index);
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
    fn test_toggle_creation() {
        let toggle = ToggleExclusion::new(ToggleDirection::OneToZero, "clk", "net clk");
        assert_eq!(toggle.direction, ToggleDirection::OneToZero);
        assert_eq!(toggle.signal_name, "clk");
        assert!(toggle.bit_index.is_none());
    }

    #[test]
    fn test_toggle_with_bit_index() {
        let toggle =
            ToggleExclusion::new(ToggleDirection::Both, "data_bus", "net data_bus[31:0]")
                .with_bit_index(7);
        assert_eq!(toggle.bit_index, Some(7));
    }
}
