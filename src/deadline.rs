// src/deadline.rs
use crate::error::{DiffError, Result};
use std::time::{Duration, Instant};

/// Wall-clock guard threaded through the deepest matching loops.
///
/// A `Deadline` is checked inside call-tree expansion, pairwise candidate
/// generation and leaf matching; on expiry the whole comparison aborts with
/// [`DiffError::TimedOut`] instead of returning a partial result.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    /// A deadline that never expires.
    #[must_use]
    pub fn unlimited() -> Self {
        Self { started: Instant::now(), budget: None }
    }

    #[must_use]
    pub fn after(budget: Duration) -> Self {
        Self { started: Instant::now(), budget: Some(budget) }
    }

    /// Returns `Err(TimedOut)` once the budget is spent.
    pub fn check(&self) -> Result<()> {
        let Some(budget) = self.budget else {
            return Ok(());
        };
        let elapsed = self.started.elapsed();
        if elapsed > budget {
            return Err(DiffError::TimedOut {
                elapsed_ms: elapsed.as_millis(),
                budget_ms: budget.as_millis(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_never_expires() {
        let deadline = Deadline::unlimited();
        assert!(deadline.check().is_ok());
    }

    #[test]
    fn zero_budget_expires() {
        let deadline = Deadline::after(Duration::ZERO);
        std::thread::sleep(Duration::from_millis(1));
        assert!(matches!(deadline.check(), Err(DiffError::TimedOut { .. })));
    }
}
