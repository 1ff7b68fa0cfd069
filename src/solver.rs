use crate::circuit::Circuit;
use crate::config::{ObjectiveMode, SolverConfig};
use crate::data::{
    Assignment, Class, Classes, Commitments, ConflictReport, HoursOverrun, Matches,
    ObjectiveScore, PartialFill, SolveStatus, SubClass, SubClassKey, Teacher, Teachers, TimeSlot,
    UncoveredSubClass,
};
use crate::error::{Result, ScheduleError};
use crate::quality_assurance;
use crate::score::TIER_WEIGHTS;
use good_lp::solvers::SolutionStatus;
use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable, constraint,
    default_solver, variable,
};
use itertools::Itertools;
use log::{debug, error, info, trace, warn};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::{Duration, Instant};

/// Assigns teachers to subclasses with the HiGHS MILP solver.
///
/// Stateless apart from its configuration: every call builds a fresh model,
/// so one `Scheduler` can serve concurrent solves.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    config: SolverConfig,
}

/// Solves with the default configuration, optionally pinning
/// (teacher, class, role) triples into the schedule.
pub fn solve(teachers: &Teachers, classes: &Classes, pinned: Option<&Matches>) -> Result<Assignment> {
    let commitments = pinned.cloned().map(Commitments::pinned).unwrap_or_default();
    Scheduler::default().solve(teachers, classes, &commitments)
}

impl Scheduler {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn solve(
        &self,
        teachers: &Teachers,
        classes: &Classes,
        commitments: &Commitments,
    ) -> Result<Assignment> {
        let start_time = Instant::now();
        let problem = Problem::index(teachers, classes, commitments)?;

        info!(
            "Setting up ILP model with {} teachers, {} classes and {} subclasses...",
            teachers.len(),
            classes.len(),
            problem.slots.len()
        );
        trace!(
            "Generated {} assignment variables out of a theoretical maximum of {}.",
            problem.variable_count(),
            teachers.len() * problem.slots.len()
        );

        let impossible = problem.impossible_pins();
        if !impossible.is_empty() {
            for (teacher, slot) in impossible {
                warn!(
                    "Pinned teacher {} cannot take {} {}: not eligible or not available",
                    problem.teachers[teacher].0,
                    problem.slots[slot].class_name,
                    problem.slots[slot].sub_class.role
                );
            }
            return Ok(problem.infeasible());
        }

        let outcome = if problem.variable_count() == 0 {
            debug!("No teacher can take any subclass; skipping the solver.");
            Outcome::Solved {
                chosen: BTreeSet::new(),
                proven: true,
            }
        } else {
            match self.config.objective {
                ObjectiveMode::Weighted => self.solve_weighted(&problem)?,
                ObjectiveMode::Lexicographic => self.solve_lexicographic(&problem)?,
            }
        };

        let assignment = match outcome {
            Outcome::Infeasible => {
                info!("The problem is infeasible.");
                problem.infeasible()
            }
            Outcome::Unresolved => {
                warn!("Time limit reached before any schedule was found.");
                problem.unresolved()
            }
            Outcome::Solved { chosen, proven } => problem.extract(&chosen, proven)?,
        };
        info!(
            "Solve finished in {:.2?} with status {:?}",
            start_time.elapsed(),
            assignment.status
        );
        Ok(assignment)
    }

    fn solve_weighted(&self, problem: &Problem) -> Result<Outcome> {
        let model = problem.build();
        let objective: Expression = model
            .tiers
            .iter()
            .zip(TIER_WEIGHTS)
            .map(|(tier, weight)| weight * tier.clone())
            .sum();
        info!("Objective function defined with {} weighted tiers.", TIER_WEIGHTS.len());
        self.run(model, objective, &[], self.config.time_limit)
    }

    /// Optimises one tier at a time, holding every earlier tier at its optimum.
    ///
    /// The stages share one time budget: each gets whatever the earlier
    /// stages left over.
    fn solve_lexicographic(&self, problem: &Problem) -> Result<Outcome> {
        let deadline = self.config.time_limit.map(|limit| Instant::now() + limit);
        let mut floors: Vec<(usize, f64)> = Vec::new();
        let mut best: Option<(BTreeSet<(usize, usize)>, bool)> = None;

        for tier in 0..TIER_WEIGHTS.len() {
            let remaining = deadline.map(|d| d.saturating_duration_since(Instant::now()));
            if remaining.is_some_and(|r| r.is_zero()) && best.is_some() {
                warn!("Time limit reached before lexicographic stage {}.", tier + 1);
                best = best.map(|(chosen, _)| (chosen, false));
                break;
            }
            let model = problem.build();
            let objective = model.tiers[tier].clone();
            debug!("Lexicographic stage {} with {} fixed tiers", tier + 1, floors.len());
            match self.run(model, objective, &floors, remaining)? {
                Outcome::Solved { chosen, proven } => {
                    let score = problem.score(&chosen);
                    floors.push((tier, score.tiers()[tier]));
                    let proven = proven && best.as_ref().is_none_or(|(_, p)| *p);
                    best = Some((chosen, proven));
                }
                // Only the first stage can fail outright; later stages fall
                // back to the best schedule found so far.
                failed if best.is_none() => return Ok(failed),
                _ => {
                    warn!("Lexicographic stage {} failed; keeping the previous schedule.", tier + 1);
                    best = best.map(|(chosen, _)| (chosen, false));
                    break;
                }
            }
        }

        Ok(match best {
            Some((chosen, proven)) => Outcome::Solved { chosen, proven },
            None => Outcome::Unresolved,
        })
    }

    fn run(
        &self,
        model: Model,
        objective: Expression,
        floors: &[(usize, f64)],
        time_limit: Option<Duration>,
    ) -> Result<Outcome> {
        let Model {
            vars,
            rows,
            x,
            tiers,
        } = model;

        let mut solver_model = vars
            .maximise(objective)
            .using(default_solver)
            .set_option("threads", self.config.threads as i32)
            .set_option("random_seed", self.config.random_seed)
            // lower tiers are worth less than the default relative gap
            .set_option("mip_rel_gap", 0.0)
            .set_option(
                "log_to_console",
                if self.config.solver_log { "true" } else { "false" },
            );
        if let Some(limit) = time_limit {
            solver_model = solver_model.set_option("time_limit", limit.as_secs_f64());
        }

        for row in rows.into_constraints() {
            solver_model.add_constraint(row);
        }
        for (tier, floor) in floors {
            // Half a unit of slack absorbs solver tolerances on integral tiers.
            let held = tiers[*tier].clone();
            solver_model.add_constraint(constraint!(held >= *floor - 0.5));
        }

        info!("Starting ILP solver...");
        let started = Instant::now();
        let solution = match solver_model.solve() {
            Ok(s) => s,
            Err(ResolutionError::Infeasible) => return Ok(Outcome::Infeasible),
            Err(e) if time_limit.is_some() => {
                warn!("Solver stopped without a schedule: {e}");
                return Ok(Outcome::Unresolved);
            }
            Err(e) => return Err(ScheduleError::Solver(e.to_string())),
        };
        let proven = matches!(solution.status(), SolutionStatus::Optimal);
        info!(
            "Solution found in {:.2?} ({})",
            started.elapsed(),
            if proven { "optimal" } else { "not proven optimal" }
        );

        let chosen = x
            .iter()
            .filter(|(_, var)| solution.value(**var) > 0.5)
            .map(|(key, _)| *key)
            .collect();
        Ok(Outcome::Solved { chosen, proven })
    }
}

enum Outcome {
    /// (teacher, slot) pairs set to 1, and whether optimality was proven.
    Solved {
        chosen: BTreeSet<(usize, usize)>,
        proven: bool,
    },
    Infeasible,
    Unresolved,
}

/// One subclass of one class.
struct Slot<'a> {
    class_name: &'a str,
    class: &'a Class,
    sub_class: &'a SubClass,
    hours: u32,
}

/// A group preference resolved to indices: the teacher's own slots and, for
/// every known partner, the partner's slots, all within one class.
struct GroupLink {
    teacher: usize,
    own: Vec<usize>,
    partners: Vec<(usize, Vec<usize>)>,
}

/// Index of the solve input, built once and reused by every model build.
struct Problem<'a> {
    teachers: Vec<(&'a str, &'a Teacher)>,
    classes: &'a Classes,
    all_teachers: &'a Teachers,
    slots: Vec<Slot<'a>>,
    /// Per slot, the teachers that are eligible and available.
    candidates: Vec<Vec<usize>>,
    pins: BTreeSet<(usize, usize)>,
    groups: Vec<GroupLink>,
    commitments: &'a Commitments,
}

/// Everything `run` needs: the variables, the rows and the tier expressions.
struct Model {
    vars: ProblemVariables,
    rows: Circuit,
    x: BTreeMap<(usize, usize), Variable>,
    tiers: [Expression; 5],
}

impl<'a> Problem<'a> {
    fn index(
        teachers: &'a Teachers,
        classes: &'a Classes,
        commitments: &'a Commitments,
    ) -> Result<Self> {
        let teacher_list: Vec<(&str, &Teacher)> =
            teachers.iter().map(|(name, t)| (name.as_str(), t)).collect();
        let teacher_index: HashMap<&str, usize> = teacher_list
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (*name, i))
            .collect();

        let slots: Vec<Slot> = classes
            .iter()
            .flat_map(|(class_name, class)| {
                class.sub_classes.iter().map(move |sub_class| Slot {
                    class_name: class_name.as_str(),
                    class,
                    sub_class,
                    hours: sub_class.hours(),
                })
            })
            .collect();
        let slots_by_class: HashMap<&str, Vec<usize>> = slots
            .iter()
            .enumerate()
            .map(|(i, slot)| (slot.class_name, i))
            .into_group_map();

        // Ineligible or unavailable pairs never get a variable.
        let candidates: Vec<Vec<usize>> = slots
            .iter()
            .map(|slot| {
                teacher_list
                    .iter()
                    .enumerate()
                    .filter(|(_, (_, t))| t.can_take(&slot.class.subject, slot.sub_class))
                    .map(|(i, _)| i)
                    .collect()
            })
            .collect();

        let mut pins = BTreeSet::new();
        for (class_name, roles) in &commitments.pinned {
            let class = classes
                .get(class_name)
                .ok_or_else(|| ScheduleError::UnknownClass(class_name.clone()))?;
            for (role, names) in roles {
                let slot = slots_by_class
                    .get(class_name.as_str())
                    .into_iter()
                    .flatten()
                    .copied()
                    .find(|s| &slots[*s].sub_class.role == role)
                    .ok_or_else(|| ScheduleError::UnknownRole {
                        class: class_name.clone(),
                        role: role.clone(),
                    })?;
                for name in names {
                    let teacher = *teacher_index
                        .get(name.as_str())
                        .ok_or_else(|| ScheduleError::UnknownTeacher(name.clone()))?;
                    pins.insert((teacher, slot));
                }
            }
        }
        if let Some(unknown) = commitments
            .committed_teachers
            .iter()
            .find(|name| !teachers.contains_key(*name))
        {
            return Err(ScheduleError::UnknownTeacher(unknown.clone()));
        }

        let mut groups = Vec::new();
        for (ti, (name, teacher)) in teacher_list.iter().enumerate() {
            for group in &teacher.groups {
                let partners: Vec<(usize, &_)> = group
                    .partners
                    .iter()
                    .filter_map(|p| match teacher_index.get(p.teacher.as_str()) {
                        Some(pi) => Some((*pi, &p.roles)),
                        None => {
                            warn!("Teacher {name} lists unknown group partner {}", p.teacher);
                            None
                        }
                    })
                    .collect();
                for (class_name, class) in classes {
                    if class.subject != group.subject {
                        continue;
                    }
                    let class_slots = slots_by_class
                        .get(class_name.as_str())
                        .map(Vec::as_slice)
                        .unwrap_or_default();
                    let own: Vec<usize> = class_slots
                        .iter()
                        .copied()
                        .filter(|s| group.my_roles.contains(&slots[*s].sub_class.role))
                        .collect();
                    let partner_slots: Vec<(usize, Vec<usize>)> = partners
                        .iter()
                        .map(|(pi, roles)| {
                            let reach = class_slots
                                .iter()
                                .copied()
                                .filter(|s| roles.contains(&slots[*s].sub_class.role))
                                .collect();
                            (*pi, reach)
                        })
                        .collect();
                    groups.push(GroupLink {
                        teacher: ti,
                        own,
                        partners: partner_slots,
                    });
                }
            }
        }

        Ok(Self {
            teachers: teacher_list,
            classes,
            all_teachers: teachers,
            slots,
            candidates,
            pins,
            groups,
            commitments,
        })
    }

    fn variable_count(&self) -> usize {
        self.candidates.iter().map(Vec::len).sum()
    }

    fn impossible_pins(&self) -> Vec<(usize, usize)> {
        self.pins
            .iter()
            .copied()
            .filter(|(teacher, slot)| !self.candidates[*slot].contains(teacher))
            .collect()
    }

    /// Declares the variables, hard constraints and tier expressions.
    fn build(&self) -> Model {
        let mut vars = ProblemVariables::new();
        let mut rows = Circuit::new();

        // x_ts = 1 if teacher t teaches slot s
        let mut x: BTreeMap<(usize, usize), Variable> = BTreeMap::new();
        for (slot, teachers) in self.candidates.iter().enumerate() {
            for teacher in teachers {
                x.insert((*teacher, slot), vars.add(variable().binary()));
            }
        }

        let mut fully_assigned = Expression::from(0);
        let mut partial_coverage = Expression::from(0);
        let mut teachers_with_classes = Expression::from(0);
        let mut group_matches = Expression::from(0);
        let mut seniority = Expression::from(0);

        // headcount
        trace!("Adding headcount constraints...");
        for (slot_idx, slot) in self.slots.iter().enumerate() {
            let assigned: Vec<Variable> = self.candidates[slot_idx]
                .iter()
                .map(|t| x[&(*t, slot_idx)])
                .collect();
            if assigned.is_empty() {
                continue;
            }
            let needed = f64::from(slot.sub_class.num_teachers);
            let count: Expression = assigned.iter().copied().sum();
            rows.push(constraint!(count.clone() <= needed));
            if slot.sub_class.num_teachers == 0 {
                continue;
            }

            let full = vars.add(variable().binary());
            rows.push(constraint!(needed * full <= count.clone()));
            rows.push(constraint!(count.clone() - full <= needed - 1.0));
            fully_assigned += full;

            if slot.sub_class.num_teachers > 1 {
                for k in 1..=slot.sub_class.num_teachers {
                    let k = f64::from(k);
                    let at_least = vars.add(variable().binary());
                    rows.push(constraint!(k * at_least <= count.clone()));
                    rows.push(constraint!(
                        count.clone() - (needed - k + 1.0) * at_least <= k - 1.0
                    ));
                    partial_coverage += at_least;
                }
            }
        }

        let by_teacher = x.iter().map(|((t, s), var)| (*t, (*s, *var))).into_group_map();

        // no double booking
        trace!("Adding 'no teacher overlap' constraints...");
        for (_, taken) in by_teacher.iter().sorted_by_key(|(t, _)| **t) {
            let busy: BTreeMap<TimeSlot, Vec<Variable>> = taken
                .iter()
                .flat_map(|(slot, var)| {
                    self.slots[*slot]
                        .sub_class
                        .times
                        .slots()
                        .map(move |time| (time, *var))
                })
                .into_group_map()
                .into_iter()
                .collect();
            for vars_at_time in busy.values().filter(|v| v.len() > 1) {
                let occupied: Expression = vars_at_time.iter().copied().sum();
                rows.push(constraint!(occupied <= 1));
            }
        }

        // weekly hour cap
        trace!("Adding weekly hour constraints...");
        for (teacher, taken) in by_teacher.iter().sorted_by_key(|(t, _)| **t) {
            let cap = self.teachers[*teacher].1.max_weekly_hours;
            let most: u32 = taken.iter().map(|(slot, _)| self.slots[*slot].hours).sum();
            if most <= cap {
                continue;
            }
            let hours: Expression = taken
                .iter()
                .map(|(slot, var)| f64::from(self.slots[*slot].hours) * *var)
                .sum();
            rows.push(constraint!(hours <= f64::from(cap)));
        }

        for pin in &self.pins {
            let var = x[pin];
            rows.push(constraint!(var == 1));
        }

        // soft: every uncommitted teacher gets something
        for (teacher, taken) in by_teacher.iter().sorted_by_key(|(t, _)| **t) {
            if self.commitments.is_committed(self.teachers[*teacher].0) {
                continue;
            }
            let own: Vec<Variable> = taken.iter().map(|(_, var)| *var).collect();
            if let Some(has_any) = rows.or(&mut vars, &own) {
                teachers_with_classes += has_any;
            }
        }

        // soft: group preferences
        for link in &self.groups {
            let pick = |teacher: usize, slots: &[usize]| -> Vec<Variable> {
                slots
                    .iter()
                    .filter_map(|s| x.get(&(teacher, *s)).copied())
                    .collect()
            };
            let own = pick(link.teacher, &link.own);
            let Some(teacher_assigned) = rows.or(&mut vars, &own) else {
                continue;
            };
            let mut partner_assigned = Vec::new();
            for (partner, slots) in &link.partners {
                let theirs = pick(*partner, slots);
                if let Some(assigned) = rows.or(&mut vars, &theirs) {
                    partner_assigned.push(assigned);
                }
            }
            let Some(any_partner) = rows.or(&mut vars, &partner_assigned) else {
                continue;
            };
            if let Some(matched) = rows.and(&mut vars, &[teacher_assigned, any_partner]) {
                group_matches += matched;
            }
        }

        // soft: seniority tie-break
        for ((teacher, _), var) in &x {
            seniority += f64::from(self.teachers[*teacher].1.seniority) * *var;
        }

        debug!("Model has {} variables and {} rows.", x.len(), rows.len());
        Model {
            vars,
            rows,
            x,
            tiers: [
                fully_assigned,
                partial_coverage,
                teachers_with_classes,
                group_matches,
                seniority,
            ],
        }
    }

    fn matches_of(&self, chosen: &BTreeSet<(usize, usize)>) -> Matches {
        let mut matches = Matches::new();
        for (slot_idx, slot) in self.slots.iter().enumerate() {
            let names = self.candidates[slot_idx]
                .iter()
                .filter(|t| chosen.contains(&(**t, slot_idx)))
                .map(|t| self.teachers[*t].0.to_string())
                .collect();
            matches
                .entry(slot.class_name.to_string())
                .or_default()
                .insert(slot.sub_class.role.clone(), names);
        }
        matches
    }

    fn score(&self, chosen: &BTreeSet<(usize, usize)>) -> ObjectiveScore {
        ObjectiveScore::evaluate(
            self.all_teachers,
            self.classes,
            &self.matches_of(chosen),
            self.commitments,
        )
    }

    fn uncovered(&self) -> Vec<UncoveredSubClass> {
        self.slots
            .iter()
            .zip(&self.candidates)
            .filter(|(_, candidates)| candidates.is_empty())
            .map(|(slot, _)| UncoveredSubClass {
                class_name: slot.class_name.to_string(),
                role: slot.sub_class.role.clone(),
                subject: slot.class.subject.clone(),
            })
            .collect()
    }

    fn every_slot(&self) -> Vec<SubClassKey> {
        self.slots
            .iter()
            .map(|slot| (slot.class_name.to_string(), slot.sub_class.role.clone()))
            .collect()
    }

    fn infeasible(&self) -> Assignment {
        Assignment {
            matches: Matches::new(),
            unassigned: self.every_slot(),
            conflicts: ConflictReport::default(),
            status: SolveStatus::Infeasible,
            score: ObjectiveScore::default(),
        }
    }

    fn unresolved(&self) -> Assignment {
        Assignment {
            status: SolveStatus::Unresolved,
            ..self.infeasible()
        }
    }

    /// Builds the assignment and its conflict report from the chosen pairs.
    fn extract(&self, chosen: &BTreeSet<(usize, usize)>, proven: bool) -> Result<Assignment> {
        let matches = self.matches_of(chosen);

        // logged only; the report below still lists over-hours
        match quality_assurance::find_conflict(&matches, self.all_teachers, self.classes)? {
            Some(violation) if proven => error!("Solver schedule breaks a hard rule: {violation}"),
            Some(violation) => warn!("Time-limited schedule breaks a hard rule: {violation}"),
            None => {}
        }

        let mut conflicts = ConflictReport {
            sub_classes_without_teachers: self.uncovered(),
            ..ConflictReport::default()
        };
        let mut unassigned = Vec::new();
        let mut hours: BTreeMap<&str, u32> = BTreeMap::new();

        for slot in &self.slots {
            let names = &matches[slot.class_name][&slot.sub_class.role];
            let assigned = names.len() as u32;
            let needed = slot.sub_class.num_teachers;
            if assigned == 0 {
                unassigned.push((slot.class_name.to_string(), slot.sub_class.role.clone()));
            } else if assigned < needed {
                conflicts.partially_unassigned.push(PartialFill {
                    class_name: slot.class_name.to_string(),
                    role: slot.sub_class.role.clone(),
                    assigned,
                    needed,
                });
            }
            for name in names {
                *hours.entry(name.as_str()).or_default() += slot.hours;
            }
        }

        // Checked against the realized schedule, independent of the model rows.
        for (name, teacher) in &self.teachers {
            let worked = hours.get(name).copied().unwrap_or(0);
            if worked > teacher.max_weekly_hours {
                conflicts.teachers_over_hours.push(HoursOverrun {
                    teacher: name.to_string(),
                    assigned_hours: worked,
                    max_weekly_hours: teacher.max_weekly_hours,
                });
            }
            if !hours.contains_key(name) && !self.commitments.is_committed(name) {
                conflicts.teachers_without_classes.push(name.to_string());
            }
        }

        let score = ObjectiveScore::evaluate(
            self.all_teachers,
            self.classes,
            &matches,
            self.commitments,
        );
        debug!("Realized objective tiers: {score:?}");

        Ok(Assignment {
            matches,
            unassigned,
            conflicts,
            status: if proven {
                SolveStatus::Optimal
            } else {
                SolveStatus::Feasible
            },
            score,
        })
    }
}
