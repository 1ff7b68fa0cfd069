use crate::data::{Class, Classes, Matches, Role, SubClass, Teacher, Teachers, TimeSlot};
use crate::error::{Result, ScheduleError};
use log::debug;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// The first hard rule an assignment was found to break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// The teacher does not know the subject in this role.
    NotQualified {
        teacher: String,
        class_name: String,
        role: Role,
    },
    /// The teacher is not available at one of the subclass hours.
    Unavailable {
        teacher: String,
        class_name: String,
        role: Role,
        slot: TimeSlot,
    },
    Overstaffed {
        class_name: String,
        role: Role,
        assigned: usize,
        needed: u32,
    },
    DuplicateTeacher {
        teacher: String,
        class_name: String,
        role: Role,
    },
    OverHours {
        teacher: String,
        hours: u32,
        max_weekly_hours: u32,
    },
    DoubleBooked {
        teacher: String,
        slot: TimeSlot,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::NotQualified {
                teacher,
                class_name,
                role,
            } => write!(f, "{teacher} cannot teach {class_name} as {role}"),
            Violation::Unavailable {
                teacher,
                class_name,
                role,
                slot,
            } => write!(
                f,
                "{teacher} is not available on {slot} for {class_name} {role}"
            ),
            Violation::Overstaffed {
                class_name,
                role,
                assigned,
                needed,
            } => write!(
                f,
                "{class_name} {role} has {assigned} teachers but needs only {needed}"
            ),
            Violation::DuplicateTeacher {
                teacher,
                class_name,
                role,
            } => write!(f, "{teacher} is listed twice on {class_name} {role}"),
            Violation::OverHours {
                teacher,
                hours,
                max_weekly_hours,
            } => write!(
                f,
                "{teacher} teaches {hours} hours a week, more than the {max_weekly_hours} allowed"
            ),
            Violation::DoubleBooked { teacher, slot } => {
                write!(f, "{teacher} teaches two subclasses on {slot}")
            }
        }
    }
}

struct Placement<'a> {
    teacher_name: &'a str,
    teacher: &'a Teacher,
    class_name: &'a str,
    class: &'a Class,
    sub_class: &'a SubClass,
}

/// Checks any assignment against the hard rules from scratch.
///
/// Every name in `matches` must exist in `teachers` and `classes`; an unknown
/// reference is an error, not a violation. Returns the first violation found.
pub fn find_conflict(
    matches: &Matches,
    teachers: &Teachers,
    classes: &Classes,
) -> Result<Option<Violation>> {
    let placements = resolve(matches, teachers, classes)?;

    // per subclass
    for (class_name, roles) in matches {
        for (role, names) in roles {
            let needed = classes[class_name]
                .sub_class(role)
                .map_or(0, |s| s.num_teachers);
            if names.len() > needed as usize {
                return Ok(Some(Violation::Overstaffed {
                    class_name: class_name.clone(),
                    role: role.clone(),
                    assigned: names.len(),
                    needed,
                }));
            }
            let mut seen = HashSet::new();
            if let Some(twice) = names.iter().find(|name| !seen.insert(name.as_str())) {
                return Ok(Some(Violation::DuplicateTeacher {
                    teacher: twice.clone(),
                    class_name: class_name.clone(),
                    role: role.clone(),
                }));
            }
        }
    }

    // per (teacher, class, role)
    for p in &placements {
        if !p.teacher.can_teach(&p.class.subject, &p.sub_class.role) {
            debug!("teacher cannot teach class");
            return Ok(Some(Violation::NotQualified {
                teacher: p.teacher_name.to_string(),
                class_name: p.class_name.to_string(),
                role: p.sub_class.role.clone(),
            }));
        }
        if let Some(slot) = p
            .sub_class
            .times
            .slots()
            .find(|slot| !p.teacher.availability.contains(*slot))
        {
            debug!("teacher is not available");
            return Ok(Some(Violation::Unavailable {
                teacher: p.teacher_name.to_string(),
                class_name: p.class_name.to_string(),
                role: p.sub_class.role.clone(),
                slot,
            }));
        }
    }

    // per teacher, across everything they teach
    let mut by_teacher: BTreeMap<&str, Vec<&Placement>> = BTreeMap::new();
    for p in &placements {
        by_teacher.entry(p.teacher_name).or_default().push(p);
    }
    for (name, taught) in by_teacher {
        let teacher = taught[0].teacher;
        let hours: u32 = taught.iter().map(|p| p.sub_class.hours()).sum();
        if hours > teacher.max_weekly_hours {
            debug!("teacher has more than weekly hours");
            return Ok(Some(Violation::OverHours {
                teacher: name.to_string(),
                hours,
                max_weekly_hours: teacher.max_weekly_hours,
            }));
        }
        let mut booked = HashSet::new();
        for p in &taught {
            if let Some(slot) = p.sub_class.times.slots().find(|slot| !booked.insert(*slot)) {
                debug!("teacher teaches more than one class at the same time");
                return Ok(Some(Violation::DoubleBooked {
                    teacher: name.to_string(),
                    slot,
                }));
            }
        }
    }

    Ok(None)
}

/// True if `matches` breaks any hard rule.
pub fn are_conflicts(matches: &Matches, teachers: &Teachers, classes: &Classes) -> Result<bool> {
    Ok(find_conflict(matches, teachers, classes)?.is_some())
}

fn resolve<'a>(
    matches: &'a Matches,
    teachers: &'a Teachers,
    classes: &'a Classes,
) -> Result<Vec<Placement<'a>>> {
    let mut placements = Vec::new();
    for (class_name, roles) in matches {
        let class = classes
            .get(class_name)
            .ok_or_else(|| ScheduleError::UnknownClass(class_name.clone()))?;
        for (role, names) in roles {
            let sub_class = class
                .sub_class(role)
                .ok_or_else(|| ScheduleError::UnknownRole {
                    class: class_name.clone(),
                    role: role.clone(),
                })?;
            for name in names {
                let teacher = teachers
                    .get(name)
                    .ok_or_else(|| ScheduleError::UnknownTeacher(name.clone()))?;
                placements.push(Placement {
                    teacher_name: name,
                    teacher,
                    class_name,
                    class,
                    sub_class,
                });
            }
        }
    }
    Ok(placements)
}
