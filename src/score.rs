use crate::data::{Classes, Commitments, Matches, ObjectiveScore, Teachers};
use std::collections::BTreeSet;

/// Weights of the objective tiers, highest priority first. Each weight is far
/// enough above the next that a unit gain in a tier outweighs any realistic
/// gain in the tiers below it.
pub const TIER_WEIGHTS: [f64; 5] = [1_000_000.0, 100_000.0, 10_000.0, 100.0, 1.0];

impl ObjectiveScore {
    /// Recomputes every tier from a finished schedule.
    ///
    /// Counts only what `matches` actually contains, so the result does not
    /// depend on solver internals and is comparable across solves.
    pub fn evaluate(
        teachers: &Teachers,
        classes: &Classes,
        matches: &Matches,
        commitments: &Commitments,
    ) -> Self {
        let mut score = ObjectiveScore::default();
        let mut busy: BTreeSet<&str> = BTreeSet::new();

        for (class_name, class) in classes {
            for sub_class in &class.sub_classes {
                let assigned = matches
                    .get(class_name)
                    .and_then(|roles| roles.get(&sub_class.role))
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                let count = assigned.len() as u32;

                if count > 0 && count >= sub_class.num_teachers {
                    score.fully_assigned += 1;
                }
                if sub_class.num_teachers > 1 {
                    score.partial_coverage += count.min(sub_class.num_teachers);
                }
                for name in assigned {
                    busy.insert(name);
                    if let Some(teacher) = teachers.get(name) {
                        score.seniority += u64::from(teacher.seniority);
                    }
                }
            }
        }

        score.teachers_with_classes = teachers
            .keys()
            .filter(|name| busy.contains(name.as_str()) && !commitments.is_committed(name))
            .count() as u32;
        score.group_matches = count_group_matches(teachers, classes, matches);
        score
    }

    pub fn tiers(&self) -> [f64; 5] {
        [
            f64::from(self.fully_assigned),
            f64::from(self.partial_coverage),
            f64::from(self.teachers_with_classes),
            f64::from(self.group_matches),
            self.seniority as f64,
        ]
    }

    /// The weighted objective value of this score.
    pub fn weighted(&self) -> f64 {
        self.tiers()
            .iter()
            .zip(TIER_WEIGHTS)
            .map(|(value, weight)| value * weight)
            .sum()
    }
}

/// One point per (teacher, group preference, class of that subject) where the
/// teacher holds one of their roles and some partner holds one of theirs.
fn count_group_matches(teachers: &Teachers, classes: &Classes, matches: &Matches) -> u32 {
    let holds = |class_name: &str, teacher: &str, roles: &BTreeSet<crate::data::Role>| {
        matches.get(class_name).is_some_and(|by_role| {
            by_role
                .iter()
                .any(|(role, names)| roles.contains(role) && names.iter().any(|n| n == teacher))
        })
    };

    let mut total = 0;
    for (name, teacher) in teachers {
        for group in &teacher.groups {
            for (class_name, class) in classes {
                if class.subject != group.subject {
                    continue;
                }
                let mine = holds(class_name, name, &group.my_roles);
                let partnered = group
                    .partners
                    .iter()
                    .any(|p| holds(class_name, &p.teacher, &p.roles));
                if mine && partnered {
                    total += 1;
                }
            }
        }
    }
    total
}
