//! Range checks on decoded input before it reaches the scheduling core.

use crate::config::ServerConfig;
use crate::data::{Classes, Role, Teachers, TimeGrid};
use std::collections::BTreeSet;

/// Returns every problem found; empty means the input is usable.
pub fn check_input(teachers: &Teachers, classes: &Classes, config: &ServerConfig) -> Vec<String> {
    let mut errors = Vec::new();

    for (name, teacher) in teachers {
        check_grid(&mut errors, &format!("teacher {name} availability"), &teacher.availability, config);
        for knowledge in &teacher.knowledge {
            check_subject(&mut errors, &format!("teacher {name}"), &knowledge.subject);
            check_roles(&mut errors, &format!("teacher {name}"), &knowledge.roles, config);
        }
        for group in &teacher.groups {
            let context = format!("teacher {name} group");
            check_subject(&mut errors, &context, &group.subject);
            check_roles(&mut errors, &context, &group.my_roles, config);
            for partner in &group.partners {
                check_roles(&mut errors, &context, &partner.roles, config);
            }
        }
    }

    for (name, class) in classes {
        check_subject(&mut errors, &format!("class {name}"), &class.subject);
        let mut seen = BTreeSet::new();
        for sub_class in &class.sub_classes {
            let context = format!("class {name} {}", sub_class.role);
            if !config.roles.contains(&sub_class.role) {
                errors.push(format!("{context}: unknown role `{}`", sub_class.role));
            }
            if !seen.insert(&sub_class.role) {
                errors.push(format!("{context}: role appears more than once"));
            }
            if sub_class.num_teachers == 0 {
                errors.push(format!("{context}: numTeachers must be at least 1"));
            }
            check_grid(&mut errors, &context, &sub_class.times, config);
        }
    }

    errors
}

fn check_subject(errors: &mut Vec<String>, context: &str, subject: &str) {
    if subject.trim().is_empty() {
        errors.push(format!("{context}: subject must not be empty"));
    }
}

fn check_roles(
    errors: &mut Vec<String>,
    context: &str,
    roles: &BTreeSet<Role>,
    config: &ServerConfig,
) {
    for role in roles.iter().filter(|r| !config.roles.contains(*r)) {
        errors.push(format!("{context}: unknown role `{role}`"));
    }
}

fn check_grid(errors: &mut Vec<String>, context: &str, grid: &TimeGrid, config: &ServerConfig) {
    for slot in grid.slots().filter(|s| !config.hours.contains(&s.hour)) {
        errors.push(format!(
            "{context}: hour {} on {} is outside {}..={}",
            slot.hour,
            slot.weekday,
            config.hours.start(),
            config.hours.end()
        ));
    }
}
