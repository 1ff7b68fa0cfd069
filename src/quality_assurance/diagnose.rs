use crate::data::{Classes, Role, Teachers};
use log::debug;
use std::fmt;

/// A structural reason a subclass cannot be fully staffed, found from the
/// domain data alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Infeasibility {
    /// Fewer teachers know the subject in this role than the subclass needs.
    InsufficientSupply {
        class_name: String,
        role: Role,
        needed: u32,
        eligible: u32,
    },
    /// Nobody who knows the subject is free at every hour of the subclass.
    NoAvailableTeacher { class_name: String, role: Role },
}

impl fmt::Display for Infeasibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Infeasibility::InsufficientSupply {
                class_name,
                role,
                needed,
                eligible,
            } => write!(
                f,
                "Not enough teachers for {class_name} {role}. Need {needed}, have {eligible}"
            ),
            Infeasibility::NoAvailableTeacher { class_name, role } => write!(
                f,
                "No available teachers found for {class_name} {role} at specified times"
            ),
        }
    }
}

/// Runs both checks over every subclass. The checks are independent, so a
/// subclass nobody knows how to teach is reported by both.
pub fn find_infeasibilities(teachers: &Teachers, classes: &Classes) -> Vec<Infeasibility> {
    let mut issues = Vec::new();

    // enough teachers know each subject and role
    for (class_name, class) in classes {
        for sub_class in &class.sub_classes {
            let eligible = teachers
                .values()
                .filter(|t| t.can_teach(&class.subject, &sub_class.role))
                .count() as u32;
            if eligible < sub_class.num_teachers {
                issues.push(Infeasibility::InsufficientSupply {
                    class_name: class_name.clone(),
                    role: sub_class.role.clone(),
                    needed: sub_class.num_teachers,
                    eligible,
                });
            }
        }
    }

    // somebody eligible is free at every required hour
    for (class_name, class) in classes {
        for sub_class in &class.sub_classes {
            if !teachers.values().any(|t| t.can_take(&class.subject, sub_class)) {
                issues.push(Infeasibility::NoAvailableTeacher {
                    class_name: class_name.clone(),
                    role: sub_class.role.clone(),
                });
            }
        }
    }

    debug!("Infeasibility diagnosis found {} issues", issues.len());
    issues
}

/// Human-readable form of [`find_infeasibilities`].
pub fn diagnose(teachers: &Teachers, classes: &Classes) -> Vec<String> {
    find_infeasibilities(teachers, classes)
        .iter()
        .map(ToString::to_string)
        .collect()
}
