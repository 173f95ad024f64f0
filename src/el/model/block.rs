//! Block exclusion record

use serde::{Deserialize, Serialize};

/// An excluded statement or code region.
///
/// Wire format: `Block 161 "1104666086" "do_db_reg_update = 1'b0;"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockExclusion {
    /// Block identifier, unique within its scope
    pub id: String,
    /// Opaque content checksum from the verification database
    pub checksum: String,
    /// The excluded source line or block
    pub source_code: String,
    /// Optional free-text justification
    pub annotation: Option<String>,
}

impl BlockExclusion {
    pub fn new(
        id: impl Into<String>,
        checksum: impl Into<String>,
        source_code: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            checksum: checksum.into(),
            source_code: source_code.into(),
            annotation: None,
        }
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
    fn test_block_creation() {
        let block = BlockExclusion::new("161", "1104666086", "do_db_reg_update = 1'b0;");
        assert_eq!(block.id, "161");
        assert_eq!(block.checksum, "1104666086");
        assert!(block.annotation.is_none());
    }

    #[test]
    fn test_block_with_annotation() {
        let block = BlockExclusion::new("42", "abc", "x <= y;").with_annotation("dead code");
        assert_eq!(block.annotation.as_deref(), Some("dead code"));
    }
}
