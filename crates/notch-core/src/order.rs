use crate::error::{NotchError, Result};
use crate::parse::sort_steps;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Color stamped on every order written by this service.
pub const DEFAULT_COLOR: &str = "Black";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub step: u32,
    pub notch: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_no: String,
    pub total: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub steps: Vec<Step>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Build a full-replace record: steps sorted, `total` counted, stamped now.
    pub fn new(order_no: impl Into<String>, mut steps: Vec<Step>) -> Result<Self> {
        if let Some(bad) = steps.iter().find(|s| s.step == 0) {
            return Err(NotchError::Validation(format!(
                "step numbers start at 1 (got step {} with notch {})",
                bad.step, bad.notch
            )));
        }
        sort_steps(&mut steps);
        Ok(Self {
            order_no: order_no.into(),
            total: steps.len(),
            color: Some(DEFAULT_COLOR.to_string()),
            steps,
            updated_at: Utc::now(),
        })
    }
}

/// Where a write landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    Disk(PathBuf),
    Memory,
}

impl Placement {
    pub fn describe(&self) -> String {
        match self {
            Placement::Disk(path) => path.display().to_string(),
            Placement::Memory => "memory".to_string(),
        }
    }

    pub fn is_memory(&self) -> bool {
        matches!(self, Placement::Memory)
    }
}
