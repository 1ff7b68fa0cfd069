use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// Type aliases for clarity
pub type TeacherName = String;
pub type ClassName = String;
pub type Hour = u8;

/// Teachers keyed by name.
pub type Teachers = BTreeMap<TeacherName, Teacher>;
/// Classes keyed by name.
pub type Classes = BTreeMap<ClassName, Class>;
/// class -> role -> assigned teacher names.
pub type Matches = BTreeMap<ClassName, BTreeMap<Role, Vec<TeacherName>>>;
/// A (class, role) pair identifying one subclass.
pub type SubClassKey = (ClassName, Role);

/// A subject-scoped teaching function such as "Theory" or "Practice".
///
/// The set of valid roles is closed per deployment, so the core treats a role
/// as an opaque label and leaves membership checks to the input layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl From<&str> for Role {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One weekly hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeSlot {
    pub weekday: Weekday,
    pub hour: Hour,
}

impl TimeSlot {
    pub fn new(weekday: Weekday, hour: Hour) -> Self {
        Self { weekday, hour }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:00", self.weekday, self.hour)
    }
}

/// A set of weekly time slots, stored as weekday -> ordered hours.
///
/// Serialises as `{"Monday": [9, 10], "Friday": [14]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeGrid(BTreeMap<Weekday, BTreeSet<Hour>>);

impl TimeGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion of several hours on one day.
    pub fn with(mut self, weekday: Weekday, hours: impl IntoIterator<Item = Hour>) -> Self {
        self.0.entry(weekday).or_default().extend(hours);
        self
    }

    pub fn insert(&mut self, slot: TimeSlot) -> bool {
        self.0.entry(slot.weekday).or_default().insert(slot.hour)
    }

    pub fn contains(&self, slot: TimeSlot) -> bool {
        self.0
            .get(&slot.weekday)
            .is_some_and(|hours| hours.contains(&slot.hour))
    }

    pub fn slots(&self) -> impl Iterator<Item = TimeSlot> + '_ {
        self.0
            .iter()
            .flat_map(|(day, hours)| hours.iter().map(|hour| TimeSlot::new(*day, *hour)))
    }

    /// Number of hours in the grid. This is the weekly workload of a subclass.
    pub fn slot_count(&self) -> u32 {
        self.0.values().map(|hours| hours.len() as u32).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.slot_count() == 0
    }

    /// True if every slot of `other` is also in `self`.
    pub fn covers(&self, other: &TimeGrid) -> bool {
        other.slots().all(|slot| self.contains(slot))
    }

    pub fn overlaps(&self, other: &TimeGrid) -> bool {
        other.slots().any(|slot| self.contains(slot))
    }
}

/// One staffing unit of a class: a role taught at fixed weekly times by
/// `num_teachers` teachers.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubClass {
    pub role: Role,
    pub times: TimeGrid,
    pub num_teachers: u32,
}

impl SubClass {
    pub fn hours(&self) -> u32 {
        self.times.slot_count()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub subject: String,
    pub sub_classes: Vec<SubClass>,
}

impl Class {
    pub fn sub_class(&self, role: &Role) -> Option<&SubClass> {
        self.sub_classes.iter().find(|s| &s.role == role)
    }
}

/// A subject a teacher knows and the roles they may take in it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SubjectKnowledge {
    pub subject: String,
    pub roles: BTreeSet<Role>,
}

/// A named co-teaching partner and the roles they should take.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Partner {
    pub teacher: TeacherName,
    pub roles: BTreeSet<Role>,
}

/// "I want to teach `subject` in one of `my_roles` on the same class as at
/// least one of `partners`."
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPreference {
    pub my_roles: BTreeSet<Role>,
    pub subject: String,
    pub partners: Vec<Partner>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub seniority: u32,
    pub knowledge: Vec<SubjectKnowledge>,
    pub availability: TimeGrid,
    pub max_weekly_hours: u32,
    #[serde(default)]
    pub groups: Vec<GroupPreference>,
}

impl Teacher {
    /// Structural eligibility: knows the subject and may take the role.
    pub fn can_teach(&self, subject: &str, role: &Role) -> bool {
        self.knowledge
            .iter()
            .any(|k| k.subject == subject && k.roles.contains(role))
    }

    pub fn is_available(&self, times: &TimeGrid) -> bool {
        self.availability.covers(times)
    }

    /// Eligible and free at every hour the subclass needs.
    pub fn can_take(&self, subject: &str, sub_class: &SubClass) -> bool {
        self.can_teach(subject, &sub_class.role) && self.is_available(&sub_class.times)
    }
}

/// Terminal state of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum SolveStatus {
    Optimal,
    /// A valid schedule that was not proven optimal, e.g. the time limit hit.
    Feasible,
    Infeasible,
    /// The budget ran out without a usable schedule.
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoursOverrun {
    pub teacher: TeacherName,
    pub assigned_hours: u32,
    pub max_weekly_hours: u32,
}

/// A subclass for which modeling found nobody eligible and available.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UncoveredSubClass {
    pub class_name: ClassName,
    pub role: Role,
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialFill {
    pub class_name: ClassName,
    pub role: Role,
    pub assigned: u32,
    pub needed: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConflictReport {
    pub teachers_without_classes: Vec<TeacherName>,
    pub teachers_over_hours: Vec<HoursOverrun>,
    pub sub_classes_without_teachers: Vec<UncoveredSubClass>,
    pub partially_unassigned: Vec<PartialFill>,
}

impl ConflictReport {
    pub fn is_empty(&self) -> bool {
        self.teachers_without_classes.is_empty()
            && self.teachers_over_hours.is_empty()
            && self.sub_classes_without_teachers.is_empty()
            && self.partially_unassigned.is_empty()
    }
}

/// Realized value of each objective tier, highest priority first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectiveScore {
    pub fully_assigned: u32,
    pub partial_coverage: u32,
    pub teachers_with_classes: u32,
    pub group_matches: u32,
    pub seniority: u64,
}

/// The output of a solve.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub matches: Matches,
    pub unassigned: Vec<SubClassKey>,
    #[serde(default)]
    pub conflicts: ConflictReport,
    pub status: SolveStatus,
    #[serde(default)]
    pub score: ObjectiveScore,
}

impl Assignment {
    pub fn assigned(&self, class_name: &str, role: &Role) -> &[TeacherName] {
        self.matches
            .get(class_name)
            .and_then(|roles| roles.get(role))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Work fixed ahead of a solve.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Commitments {
    /// (teacher, class, role) triples that must be part of the schedule.
    pub pinned: Matches,
    /// Teachers already teaching elsewhere; they need no class from this solve.
    pub committed_teachers: BTreeSet<TeacherName>,
}

impl Commitments {
    pub fn pinned(pinned: Matches) -> Self {
        Self {
            pinned,
            ..Self::default()
        }
    }

    pub fn is_committed(&self, teacher: &str) -> bool {
        self.committed_teachers.contains(teacher)
    }
}
