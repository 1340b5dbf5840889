use crate::error::Result;
use crate::order::{Order, Placement, Step};
use crate::store::OrderStore;

/// Order number of the demonstration record inserted at boot.
pub const DEMO_ORDER_NO: &str = "TEST123";

const DEMO_STEPS: [(u32, u32); 10] = [
    (1, 93),
    (2, 201),
    (3, 9),
    (4, 160),
    (5, 151),
    (6, 192),
    (7, 230),
    (8, 212),
    (9, 86),
    (10, 29),
];

pub fn demo_steps() -> Vec<Step> {
    DEMO_STEPS
        .iter()
        .map(|&(step, notch)| Step { step, notch })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    Inserted(Placement),
    AlreadyPresent,
    /// A record exists but could not be read; it is left untouched.
    Unreadable(String),
}

/// Insert the demonstration order unless one is already stored.
pub fn seed_demo_order(store: &dyn OrderStore) -> Result<SeedOutcome> {
    match store.contains(DEMO_ORDER_NO) {
        Ok(true) => {
            tracing::debug!(order_no = DEMO_ORDER_NO, "seed order already present");
            Ok(SeedOutcome::AlreadyPresent)
        }
        Ok(false) => {
            let order = Order::new(DEMO_ORDER_NO, demo_steps())?;
            let placement = store.put(&order)?;
            tracing::info!(
                order_no = DEMO_ORDER_NO,
                at = %placement.describe(),
                "seed order written"
            );
            Ok(SeedOutcome::Inserted(placement))
        }
        Err(e) => {
            tracing::warn!(order_no = DEMO_ORDER_NO, error = %e, "seed order unreadable, leaving it");
            Ok(SeedOutcome::Unreadable(e.to_string()))
        }
    }
}
