use crate::data::Role;
use thiserror::Error;

/// Errors raised by the scheduling core.
///
/// Infeasible or unfinished solves and detected rule violations are ordinary
/// results, not errors. These variants are integration mistakes or solver
/// failures.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("unknown teacher `{0}`")]
    UnknownTeacher(String),
    #[error("unknown class `{0}`")]
    UnknownClass(String),
    #[error("class `{class}` has no subclass with role `{role}`")]
    UnknownRole { class: String, role: Role },
    #[error("solver failed: {0}")]
    Solver(String),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}
