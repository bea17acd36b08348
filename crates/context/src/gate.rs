//! Privacy gate deciding whether the foreground app permits capture.

use crate::state::AppInfo;
use clipkeep_history::ExclusionRepository;

/// Outcome of a gate check for one capture attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Capture may proceed, attributed to this bundle id.
    Allow(String),
    /// The foreground app is on the exclusion list.
    Excluded,
    /// No foreground app could be resolved. Treated as its own abandon
    /// condition, never as "not excluded".
    Unresolved,
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allow(_))
    }
}

/// Exclusion gate over a live exclusion repository.
///
/// Membership is read on every check. Nothing is cached between ticks, so
/// edits to the exclusion list apply to the very next capture.
pub struct ExclusionGate<R> {
    exclusions: R,
}

impl<R: ExclusionRepository> ExclusionGate<R> {
    pub fn new(exclusions: R) -> Self {
        Self { exclusions }
    }

    pub fn repository(&self) -> &R {
        &self.exclusions
    }

    /// True iff `app_identifier` is in the exclusion set.
    ///
    /// An empty identifier is never excluded. A failed lookup reports
    /// excluded so capture errs toward not recording.
    pub fn is_excluded(&self, app_identifier: &str) -> bool {
        if app_identifier.trim().is_empty() {
            return false;
        }
        match self.exclusions.is_excluded(app_identifier) {
            Ok(excluded) => excluded,
            Err(e) => {
                tracing::warn!(
                    app = app_identifier,
                    error = %e,
                    "Exclusion lookup failed, suppressing capture"
                );
                true
            }
        }
    }

    /// Decide for the resolved foreground app, if any.
    pub fn check(&self, app: Option<&AppInfo>) -> GateDecision {
        let Some(app) = app.filter(|a| a.is_resolved()) else {
            return GateDecision::Unresolved;
        };
        if self.is_excluded(&app.bundle_id) {
            tracing::debug!(app = %app.bundle_id, "Capture suppressed for excluded app");
            return GateDecision::Excluded;
        }
        GateDecision::Allow(app.bundle_id.clone())
    }
}
