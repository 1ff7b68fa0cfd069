use crate::data::{Hour, Role};
use crate::error::ConfigError;
use std::collections::BTreeSet;
use std::env;
use std::net::SocketAddr;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

/// How the five objective tiers are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectiveMode {
    /// One solve over a weighted sum of the tiers.
    #[default]
    Weighted,
    /// One solve per tier, each fixing the optimum of the tiers before it.
    Lexicographic,
}

impl FromStr for ObjectiveMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weighted" => Ok(ObjectiveMode::Weighted),
            "lexicographic" => Ok(ObjectiveMode::Lexicographic),
            other => Err(format!("expected `weighted` or `lexicographic`, got `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Wall-clock budget for a whole solve. In lexicographic mode the stages
    /// share it. `None` runs to optimality.
    pub time_limit: Option<Duration>,
    pub threads: u32,
    pub random_seed: i32,
    pub objective: ObjectiveMode,
    /// Forward HiGHS output to the console.
    pub solver_log: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit: None,
            threads: 1,
            random_seed: 1234,
            objective: ObjectiveMode::Weighted,
            solver_log: false,
        }
    }
}

impl SolverConfig {
    /// Reads `SCHEDULER_*` variables, falling back to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            time_limit: read_env::<f64>("SCHEDULER_TIME_LIMIT_SECS")?
                .map(|secs| {
                    Duration::try_from_secs_f64(secs).map_err(|e| ConfigError::Invalid {
                        key: "SCHEDULER_TIME_LIMIT_SECS",
                        value: secs.to_string(),
                        reason: e.to_string(),
                    })
                })
                .transpose()?,
            threads: read_env("SCHEDULER_THREADS")?.unwrap_or(defaults.threads),
            random_seed: read_env("SCHEDULER_RANDOM_SEED")?.unwrap_or(defaults.random_seed),
            objective: read_env("SCHEDULER_OBJECTIVE")?.unwrap_or(defaults.objective),
            solver_log: read_env("SCHEDULER_SOLVER_LOG")?.unwrap_or(defaults.solver_log),
        })
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_objective(mut self, objective: ObjectiveMode) -> Self {
        self.objective = objective;
        self
    }
}

/// Settings of the HTTP front end.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// The closed role set of this deployment.
    pub roles: BTreeSet<Role>,
    /// Hours a grid may contain.
    pub hours: RangeInclusive<Hour>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            roles: ["Theory", "Practice"].into_iter().map(Role::from).collect(),
            hours: 8..=23,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let roles = match env::var("SCHEDULER_ROLES") {
            Ok(list) => {
                let roles: BTreeSet<Role> = list
                    .split(',')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(Role::from)
                    .collect();
                if roles.is_empty() {
                    return Err(ConfigError::Invalid {
                        key: "SCHEDULER_ROLES",
                        value: list,
                        reason: "at least one role is required".to_string(),
                    });
                }
                roles
            }
            Err(_) => defaults.roles,
        };
        Ok(Self {
            addr: read_env("SCHEDULER_ADDR")?.unwrap_or(defaults.addr),
            roles,
            hours: defaults.hours,
        })
    }
}

fn read_env<T>(key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                key,
                value,
                reason: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn objective_mode_parses_case_insensitively() {
        assert_eq!(
            "Lexicographic".parse::<ObjectiveMode>(),
            Ok(ObjectiveMode::Lexicographic)
        );
        assert_eq!(" weighted ".parse::<ObjectiveMode>(), Ok(ObjectiveMode::Weighted));
        assert!("lexical".parse::<ObjectiveMode>().is_err());
    }

    #[test]
    fn defaults_match_reproducible_single_thread_run() {
        let config = SolverConfig::default();
        assert_eq!(config.threads, 1);
        assert_eq!(config.random_seed, 1234);
        assert_eq!(config.time_limit, None);
        assert_eq!(config.objective, ObjectiveMode::Weighted);
    }

    #[test]
    fn rejects_unusable_time_limits() {
        for bad in ["-1", "NaN", "inf"] {
            // SAFETY: no other test reads or writes this variable.
            unsafe { env::set_var("SCHEDULER_TIME_LIMIT_SECS", bad) };
            let err = SolverConfig::from_env().unwrap_err();
            assert!(matches!(
                err,
                ConfigError::Invalid { key: "SCHEDULER_TIME_LIMIT_SECS", .. }
            ));
        }
        unsafe { env::set_var("SCHEDULER_TIME_LIMIT_SECS", "2.5") };
        assert_eq!(
            SolverConfig::from_env().unwrap().time_limit,
            Some(Duration::from_millis(2500))
        );
        unsafe { env::remove_var("SCHEDULER_TIME_LIMIT_SECS") };
    }

    #[test]
    fn server_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.addr.to_string(), "127.0.0.1:8080");
        assert!(config.roles.contains(&Role::from("Theory")));
        assert!(config.hours.contains(&23));
        assert!(!config.hours.contains(&7));
    }
}
