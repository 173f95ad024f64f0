//! Data model for exclusion coverage databases
//!
//! The model mirrors the structure of an `.el` file: a root
//! [`ExclusionData`] holds file-level header metadata and a map of
//! [`ExclusionScope`]s, and each scope owns four independent record
//! collections (block, toggle, FSM and condition exclusions).

pub mod block;
pub mod condition;
pub mod data;
pub mod fsm;
pub mod scope;
pub mod toggle;
pub mod types;

pub use block::BlockExclusion;
pub use condition::ConditionExclusion;
pub use data::ExclusionData;
pub use fsm::{FsmExclusion, FsmExclusionKind};
pub use scope::ExclusionScope;
pub use toggle::ToggleExclusion;
pub use types::{ExclusionType, ToggleDirection};
