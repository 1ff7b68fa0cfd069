pub mod circuit;
pub mod config;
pub mod data;
pub mod error;
pub mod input;
pub mod quality_assurance;
pub mod score;
pub mod server;
pub mod solver;

pub use config::{ObjectiveMode, ServerConfig, SolverConfig};
pub use data::{
    Assignment, Class, Classes, Commitments, ConflictReport, Matches, ObjectiveScore, Role,
    SolveStatus, SubClass, Teacher, Teachers, TimeGrid, TimeSlot, Weekday,
};
pub use error::{Result, ScheduleError};
pub use quality_assurance::{advise, are_conflicts, diagnose};
pub use solver::{Scheduler, solve};
