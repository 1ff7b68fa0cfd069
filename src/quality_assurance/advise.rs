use crate::data::{Assignment, Class, Classes, Matches, Role, SubClass, Teachers, TimeGrid};
use crate::error::{Result, ScheduleError};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Unassigned,
    PartiallyUnassigned,
}

/// A teacher who could take the subclass without breaking a hard rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub teacher: String,
    pub current_hours: u32,
    /// Weekly hours left before the teacher's cap.
    pub available_hours: u32,
}

/// An unfilled or partly filled subclass that still has candidates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffingIssue {
    pub class_name: String,
    pub role: Role,
    pub subject: String,
    pub kind: IssueKind,
    pub assigned: u32,
    pub needed: u32,
    /// Teachers still missing: `needed - assigned`.
    pub missing: u32,
    pub candidates: Vec<Candidate>,
}

/// What a teacher already does in the assignment.
#[derive(Default)]
struct Load {
    hours: u32,
    busy: TimeGrid,
}

/// Finds teachers who could fill each unassigned or partly assigned subclass.
///
/// Subclasses without any candidate are left out: they are unfillable, not
/// merely unfilled. The assignment is only read.
pub fn advise(
    teachers: &Teachers,
    classes: &Classes,
    assignment: &Assignment,
) -> Result<Vec<StaffingIssue>> {
    let loads = loads(&assignment.matches, teachers, classes)?;

    let mut open: Vec<(&str, &Role, IssueKind)> = assignment
        .unassigned
        .iter()
        .map(|(class_name, role)| (class_name.as_str(), role, IssueKind::Unassigned))
        .collect();
    open.extend(assignment.conflicts.partially_unassigned.iter().map(|p| {
        (
            p.class_name.as_str(),
            &p.role,
            IssueKind::PartiallyUnassigned,
        )
    }));
    info!("Checking {} unresolved subclasses for candidates...", open.len());

    let mut issues = Vec::new();
    for (class_name, role, kind) in open {
        let (class, sub_class) = lookup(classes, class_name, role)?;
        let assigned_now = assignment.assigned(class_name, role);
        let assigned = assigned_now.len() as u32;
        let needed = sub_class.num_teachers;
        let hours = sub_class.hours();

        let candidates: Vec<Candidate> = teachers
            .iter()
            .filter(|(name, _)| !assigned_now.contains(*name))
            .filter(|(_, t)| t.can_take(&class.subject, sub_class))
            .filter_map(|(name, t)| {
                let load = loads.get(name.as_str());
                let current_hours = load.map_or(0, |l| l.hours);
                if load.is_some_and(|l| l.busy.overlaps(&sub_class.times)) {
                    return None;
                }
                if current_hours + hours > t.max_weekly_hours {
                    return None;
                }
                Some(Candidate {
                    teacher: name.clone(),
                    current_hours,
                    available_hours: t.max_weekly_hours - current_hours,
                })
            })
            .collect();

        if candidates.is_empty() {
            debug!("{class_name} {role} has no candidates; correctly unassigned");
            continue;
        }
        issues.push(StaffingIssue {
            class_name: class_name.to_string(),
            role: role.clone(),
            subject: class.subject.clone(),
            kind,
            assigned,
            needed,
            missing: needed.saturating_sub(assigned),
            candidates,
        });
    }
    Ok(issues)
}

fn lookup<'a>(
    classes: &'a Classes,
    class_name: &str,
    role: &Role,
) -> Result<(&'a Class, &'a SubClass)> {
    let class = classes
        .get(class_name)
        .ok_or_else(|| ScheduleError::UnknownClass(class_name.to_string()))?;
    let sub_class = class
        .sub_class(role)
        .ok_or_else(|| ScheduleError::UnknownRole {
            class: class_name.to_string(),
            role: role.clone(),
        })?;
    Ok((class, sub_class))
}

fn loads<'a>(
    matches: &'a Matches,
    teachers: &Teachers,
    classes: &Classes,
) -> Result<BTreeMap<&'a str, Load>> {
    let mut loads: BTreeMap<&str, Load> = BTreeMap::new();
    for (class_name, roles) in matches {
        for (role, names) in roles {
            let (_, sub_class) = lookup(classes, class_name, role)?;
            for name in names {
                if !teachers.contains_key(name) {
                    return Err(ScheduleError::UnknownTeacher(name.clone()));
                }
                let load = loads.entry(name.as_str()).or_default();
                load.hours += sub_class.hours();
                for slot in sub_class.times.slots() {
                    load.busy.insert(slot);
                }
            }
        }
    }
    Ok(loads)
}
