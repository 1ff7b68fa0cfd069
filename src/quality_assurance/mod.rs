//! Checks that run outside the solver: validating a finished assignment,
//! explaining why input cannot be fully staffed, and suggesting teachers for
//! what a solve left open.

mod advise;
mod conflicts;
mod diagnose;

pub use advise::{Candidate, IssueKind, StaffingIssue, advise};
pub use conflicts::{Violation, are_conflicts, find_conflict};
pub use diagnose::{Infeasibility, diagnose, find_infeasibilities};
