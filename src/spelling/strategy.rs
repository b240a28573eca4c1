//! Correction strategy trait and result types.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One transformation applied to a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionStep {
    /// Name of the strategy that produced the step.
    pub method: String,
    /// Query text before the step.
    pub before: String,
    /// Query text after the step.
    pub after: String,
    /// Strategy confidence in this step (0.0 to 1.0).
    pub confidence: f64,
}

/// Outcome of one correction attempt, for a single strategy or a whole chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellCheckResult {
    /// The query as received.
    pub original_query: String,
    /// The query after correction (equal to the original if nothing changed).
    pub corrected_query: String,
    /// Whether any step changed the query.
    pub has_changes: bool,
    /// Overall confidence (0.0 to 1.0).
    pub confidence: f64,
    /// Wall-clock time spent.
    pub elapsed: Duration,
    /// Applied steps, in order.
    pub steps: Vec<CorrectionStep>,
}

impl SpellCheckResult {
    /// A result that leaves the query untouched.
    pub fn unchanged<S: Into<String>>(query: S) -> Self {
        let query = query.into();
        SpellCheckResult {
            corrected_query: query.clone(),
            original_query: query,
            has_changes: false,
            confidence: 1.0,
            elapsed: Duration::ZERO,
            steps: Vec::new(),
        }
    }

    /// A result recording a single change by `method`.
    ///
    /// Degrades to [`SpellCheckResult::unchanged`] if `corrected` equals
    /// `original`.
    pub fn changed<O, C>(original: O, corrected: C, method: &str, confidence: f64) -> Self
    where
        O: Into<String>,
        C: Into<String>,
    {
        let original = original.into();
        let corrected = corrected.into();
        if original == corrected {
            return Self::unchanged(original);
        }

        SpellCheckResult {
            steps: vec![CorrectionStep {
                method: method.to_string(),
                before: original.clone(),
                after: corrected.clone(),
                confidence,
            }],
            original_query: original,
            corrected_query: corrected,
            has_changes: true,
            confidence,
            elapsed: Duration::ZERO,
        }
    }

    /// Set the elapsed time.
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    /// The query to search with.
    pub fn query(&self) -> &str {
        &self.corrected_query
    }
}

/// A single, independently swappable correction strategy.
///
/// Strategies are unaware of each other; the composite corrector feeds each
/// one the previous strategy's output, lowest priority value first.
#[async_trait]
pub trait SpellCheckStrategy: Send + Sync {
    /// Name recorded in correction steps and logs.
    fn name(&self) -> &str;

    /// Position in the chain; lower runs earlier.
    fn priority(&self) -> u32;

    /// Attempt to correct a query.
    async fn check(&self, query: &str) -> Result<SpellCheckResult>;

    /// Counter that increases whenever the strategy learns something that
    /// can change its answers. Stateless strategies keep the default.
    fn revision(&self) -> u64 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged() {
        let result = SpellCheckResult::unchanged("путин");
        assert_eq!(result.query(), "путин");
        assert!(!result.has_changes);
        assert!(result.steps.is_empty());
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_changed_records_step() {
        let result = SpellCheckResult::changed("путен", "путин", "analytics", 0.95);
        assert!(result.has_changes);
        assert_eq!(result.steps.len(), 1);
        assert_eq!(result.steps[0].before, "путен");
        assert_eq!(result.steps[0].after, "путин");
        assert_eq!(result.steps[0].method, "analytics");
    }

    #[test]
    fn test_changed_without_difference_is_unchanged() {
        let result = SpellCheckResult::changed("путин", "путин", "analytics", 0.5);
        assert!(!result.has_changes);
        assert_eq!(result.confidence, 1.0);
    }
}
