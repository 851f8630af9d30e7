//! Dining table model.

use serde::{Deserialize, Serialize};

/// Dining table entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Table {
    pub table_id: String,
    pub label: String,
}

/// Table with derived occupancy.
///
/// Occupancy is never stored: a table is occupied iff at least one
/// non-terminal order references it, so the flag cannot diverge from
/// order state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableView {
    pub table_id: String,
    pub label: String,
    pub occupied: bool,
}
