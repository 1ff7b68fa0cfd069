use serde_json::{Value, json};
use staff_scheduler::data::{PartialFill, UncoveredSubClass};
use staff_scheduler::{
    Classes, Commitments, Matches, ObjectiveMode, ObjectiveScore, Role, ScheduleError, Scheduler,
    SolveStatus, SolverConfig, Teachers, are_conflicts, solve,
};
use std::time::Duration;

fn domain(teachers: Value, classes: Value) -> (Teachers, Classes) {
    (
        serde_json::from_value(teachers).unwrap(),
        serde_json::from_value(classes).unwrap(),
    )
}

fn matches(value: Value) -> Matches {
    serde_json::from_value(value).unwrap()
}

fn teacher(seniority: u32, subject: &str, roles: &[&str], availability: Value) -> Value {
    json!({
        "seniority": seniority,
        "knowledge": [{"subject": subject, "roles": roles}],
        "availability": availability,
        "maxWeeklyHours": 10
    })
}

fn buddy(teacher: Value, roles: &[&str], subject: &str, partner: &str, partner_roles: &[&str]) -> Value {
    let mut teacher = teacher;
    teacher["groups"] = json!([{
        "myRoles": roles,
        "subject": subject,
        "partners": [{"teacher": partner, "roles": partner_roles}]
    }]);
    teacher
}

#[test]
fn test_no_teachers_no_classes() {
    let (teachers, classes) = domain(json!({}), json!({}));
    let assignment = solve(&teachers, &classes, None).unwrap();
    assert_eq!(assignment.status, SolveStatus::Optimal);
    assert!(assignment.matches.is_empty());
    assert!(assignment.unassigned.is_empty());
    assert!(assignment.conflicts.is_empty());
}

#[test]
fn test_one_teacher_one_class_match() {
    let (teachers, classes) = domain(
        json!({"teacher1": teacher(2, "Math", &["Theory", "Practice"], json!({"Monday": [9, 10]}))}),
        json!({
            "class1": {
                "subject": "Math",
                "subClasses": [{"role": "Theory", "times": {"Monday": [9, 10]}, "numTeachers": 1}]
            }
        }),
    );
    let assignment = solve(&teachers, &classes, None).unwrap();
    assert!(!are_conflicts(&assignment.matches, &teachers, &classes).unwrap());
    assert_eq!(assignment.status, SolveStatus::Optimal);
    assert_eq!(assignment.matches, matches(json!({"class1": {"Theory": ["teacher1"]}})));
    assert!(assignment.unassigned.is_empty());
    assert!(assignment.conflicts.is_empty());
}

#[test]
fn test_one_teacher_one_class_match_only_one_role_of_two() {
    let (teachers, classes) = domain(
        json!({"teacher1": teacher(2, "Arq1", &["Theory", "Practice"], json!({"Monday": [9, 10]}))}),
        json!({
            "class1": {
                "subject": "Arq1",
                "subClasses": [
                    {"role": "Theory", "times": {"Monday": [9, 10]}, "numTeachers": 1},
                    {"role": "Practice", "times": {"Friday": [9, 10]}, "numTeachers": 1}
                ]
            }
        }),
    );
    let assignment = solve(&teachers, &classes, None).unwrap();
    assert!(!are_conflicts(&assignment.matches, &teachers, &classes).unwrap());
    assert_eq!(
        assignment.matches,
        matches(json!({"class1": {"Theory": ["teacher1"], "Practice": []}}))
    );
    assert_eq!(
        assignment.unassigned,
        vec![("class1".to_string(), Role::from("Practice"))]
    );
    assert_eq!(
        assignment.conflicts.sub_classes_without_teachers,
        vec![UncoveredSubClass {
            class_name: "class1".to_string(),
            role: Role::from("Practice"),
            subject: "Arq1".to_string(),
        }]
    );
}

#[test]
fn test_one_teacher_two_class_two_days_match() {
    let (teachers, classes) = domain(
        json!({
            "teacher1": teacher(
                2,
                "Arq1",
                &["Theory"],
                json!({"Monday": [9, 10, 11], "Tuesday": [9, 10], "Friday": [9, 10, 11, 12]})
            )
        }),
        json!({
            "class1": {
                "subject": "Arq1",
                "subClasses": [
                    {"role": "Theory", "times": {"Monday": [9, 10], "Friday": [9, 10]}, "numTeachers": 1}
                ]
            },
            "class2": {
                "subject": "Arq1",
                "subClasses": [
                    {"role": "Theory", "times": {"Tuesday": [9, 10], "Friday": [11, 12]}, "numTeachers": 1}
                ]
            }
        }),
    );
    let assignment = solve(&teachers, &classes, None).unwrap();
    assert_eq!(
        assignment.matches,
        matches(json!({"class1": {"Theory": ["teacher1"]}, "class2": {"Theory": ["teacher1"]}}))
    );
    assert!(!are_conflicts(&assignment.matches, &teachers, &classes).unwrap());
    assert!(assignment.unassigned.is_empty());
    assert!(assignment.conflicts.is_empty());
}

#[test]
fn test_prefer_seniority_for_single_seat() {
    let monday = json!({"Monday": [9, 10]});
    let (teachers, classes) = domain(
        json!({
            "teacher1": teacher(3, "Arq1", &["Theory"], monday.clone()),
            "teacher2": teacher(2, "Arq1", &["Theory"], monday),
        }),
        json!({
            "class1": {
                "subject": "Arq1",
                "subClasses": [{"role": "Theory", "times": {"Monday": [9, 10]}, "numTeachers": 1}]
            }
        }),
    );
    let assignment = solve(&teachers, &classes, None).unwrap();
    assert_eq!(assignment.matches, matches(json!({"class1": {"Theory": ["teacher1"]}})));
    assert_eq!(assignment.conflicts.teachers_without_classes, vec!["teacher2"]);
    assert!(!are_conflicts(&assignment.matches, &teachers, &classes).unwrap());
}

#[test]
fn test_prefer_seniority_for_two_seats() {
    let monday = json!({"Monday": [9, 10, 11]});
    let (teachers, classes) = domain(
        json!({
            "teacher1": teacher(1, "Arq1", &["Theory"], monday.clone()),
            "teacher2": teacher(3, "Arq1", &["Theory"], monday.clone()),
            "teacher3": teacher(2, "Arq1", &["Theory"], monday),
        }),
        json!({
            "class1": {
                "subject": "Arq1",
                "subClasses": [{"role": "Theory", "times": {"Monday": [9, 10]}, "numTeachers": 2}]
            }
        }),
    );
    let assignment = solve(&teachers, &classes, None).unwrap();
    assert_eq!(
        assignment.matches,
        matches(json!({"class1": {"Theory": ["teacher2", "teacher3"]}}))
    );
    assert!(assignment.unassigned.is_empty());
    assert_eq!(assignment.conflicts.teachers_without_classes, vec!["teacher1"]);
}

#[test]
fn test_select_group_over_seniority_class_with_2_teachers() {
    let monday = json!({"Monday": [9, 10, 11]});
    let (teachers, classes) = domain(
        json!({
            "teacher1": buddy(teacher(1, "Arq1", &["Theory"], monday.clone()), &["Theory"], "Arq1", "teacher2", &["Theory"]),
            "teacher2": buddy(teacher(1, "Arq1", &["Theory"], monday.clone()), &["Theory"], "Arq1", "teacher1", &["Theory"]),
            "teacher3": teacher(8, "Arq1", &["Theory"], monday),
        }),
        json!({
            "class1": {
                "subject": "Arq1",
                "subClasses": [{"role": "Theory", "times": {"Monday": [9, 10]}, "numTeachers": 2}]
            }
        }),
    );
    let assignment = solve(&teachers, &classes, None).unwrap();
    assert_eq!(
        assignment.matches,
        matches(json!({"class1": {"Theory": ["teacher1", "teacher2"]}}))
    );
    assert!(!are_conflicts(&assignment.matches, &teachers, &classes).unwrap());
    assert!(assignment.unassigned.is_empty());
    assert_eq!(assignment.conflicts.teachers_without_classes, vec!["teacher3"]);
    assert_eq!(assignment.score.group_matches, 2);
}

#[test]
fn test_select_group_over_seniority_across_roles() {
    let week = json!({"Monday": [9, 10], "Friday": [9, 10]});
    let (teachers, classes) = domain(
        json!({
            "teacher1": buddy(teacher(1, "Arq1", &["Theory"], week.clone()), &["Theory"], "Arq1", "teacher2", &["Practice"]),
            "teacher2": teacher(1, "Arq1", &["Practice"], week.clone()),
            "teacher3": teacher(8, "Arq1", &["Theory", "Practice"], week),
        }),
        json!({
            "class1": {
                "subject": "Arq1",
                "subClasses": [
                    {"role": "Theory", "times": {"Monday": [9, 10]}, "numTeachers": 1},
                    {"role": "Practice", "times": {"Friday": [9, 10]}, "numTeachers": 1}
                ]
            }
        }),
    );
    let assignment = solve(&teachers, &classes, None).unwrap();
    assert_eq!(
        assignment.matches,
        matches(json!({"class1": {"Theory": ["teacher1"], "Practice": ["teacher2"]}}))
    );
    assert_eq!(assignment.conflicts.teachers_without_classes, vec!["teacher3"]);
}

#[test]
fn test_select_seniority_when_group_cannot_complete() {
    // teacher1's partner is not available on Friday, so the pair cannot form
    let (teachers, classes) = domain(
        json!({
            "teacher1": buddy(
                teacher(1, "Arq1", &["Theory"], json!({"Monday": [9, 10]})),
                &["Theory"], "Arq1", "teacher2", &["Practice"]
            ),
            "teacher2": teacher(1, "Arq1", &["Practice"], json!({"Monday": [9, 10]})),
            "teacher3": teacher(8, "Arq1", &["Theory", "Practice"], json!({"Monday": [9, 10], "Friday": [9, 10]})),
        }),
        json!({
            "class1": {
                "subject": "Arq1",
                "subClasses": [
                    {"role": "Theory", "times": {"Monday": [9, 10]}, "numTeachers": 1},
                    {"role": "Practice", "times": {"Friday": [9, 10]}, "numTeachers": 1}
                ]
            }
        }),
    );
    let assignment = solve(&teachers, &classes, None).unwrap();
    assert_eq!(
        assignment.matches,
        matches(json!({"class1": {"Theory": ["teacher1"], "Practice": ["teacher3"]}}))
    );
    assert_eq!(assignment.score.group_matches, 0);
    assert_eq!(assignment.conflicts.teachers_without_classes, vec!["teacher2"]);
}

#[test]
fn test_hour_cap_leaves_subclass_unassigned() {
    let mut capped = teacher(5, "Arq1", &["Theory"], json!({"Monday": [9, 10, 11]}));
    capped["maxWeeklyHours"] = json!(2);
    let (teachers, classes) = domain(
        json!({"teacher1": capped}),
        json!({
            "class1": {
                "subject": "Arq1",
                "subClasses": [{"role": "Theory", "times": {"Monday": [9, 10, 11]}, "numTeachers": 1}]
            }
        }),
    );
    let assignment = solve(&teachers, &classes, None).unwrap();
    assert_eq!(assignment.status, SolveStatus::Optimal);
    assert_eq!(assignment.matches, matches(json!({"class1": {"Theory": []}})));
    assert_eq!(
        assignment.unassigned,
        vec![("class1".to_string(), Role::from("Theory"))]
    );
    // the teacher was a candidate; only the cap kept them out
    assert!(assignment.conflicts.sub_classes_without_teachers.is_empty());
    assert_eq!(assignment.conflicts.teachers_without_classes, vec!["teacher1"]);
    assert!(assignment.conflicts.teachers_over_hours.is_empty());
}

#[test]
fn test_teacher_same_class_at_same_time() {
    let mut busy = teacher(8, "Arq1", &["Theory"], json!({"Monday": [9]}));
    busy["maxWeeklyHours"] = json!(80);
    let (teachers, classes) = domain(
        json!({"teacher1": busy}),
        json!({
            "class1": {
                "subject": "Arq1",
                "subClasses": [{"role": "Theory", "times": {"Monday": [9]}, "numTeachers": 1}]
            },
            "class2": {
                "subject": "Arq1",
                "subClasses": [{"role": "Theory", "times": {"Monday": [9]}, "numTeachers": 1}]
            }
        }),
    );
    let assignment = solve(&teachers, &classes, None).unwrap();
    assert!(!are_conflicts(&assignment.matches, &teachers, &classes).unwrap());
    assert_eq!(assignment.unassigned.len(), 1);
    assert_eq!(assignment.score.fully_assigned, 1);
    let (unfilled, _) = &assignment.unassigned[0];
    let filled = if unfilled == "class1" { "class2" } else { "class1" };
    assert_eq!(assignment.assigned(filled, &Role::from("Theory")), ["teacher1"]);
}

#[test]
fn test_teacher_can_be_assigned_at_most_once_to_each_subclass() {
    let (teachers, classes) = domain(
        json!({"teacher1": teacher(3, "Arq1", &["Theory"], json!({"Monday": [9, 10]}))}),
        json!({
            "class1": {
                "subject": "Arq1",
                "subClasses": [{"role": "Theory", "times": {"Monday": [9, 10]}, "numTeachers": 2}]
            }
        }),
    );
    let assignment = solve(&teachers, &classes, None).unwrap();
    assert_eq!(assignment.matches, matches(json!({"class1": {"Theory": ["teacher1"]}})));
    assert!(assignment.unassigned.is_empty());
    assert_eq!(
        assignment.conflicts.partially_unassigned,
        vec![PartialFill {
            class_name: "class1".to_string(),
            role: Role::from("Theory"),
            assigned: 1,
            needed: 2,
        }]
    );
    assert_eq!(assignment.score.partial_coverage, 1);
    assert_eq!(assignment.score.fully_assigned, 0);
}

#[test]
fn test_partial_coverage_beats_an_empty_subclass() {
    // one teacher, two subclasses at the same hour: completing the lecture
    // outranks half of the lab
    let (teachers, classes) = domain(
        json!({"teacher1": teacher(1, "Arq1", &["Theory"], json!({"Monday": [9]}))}),
        json!({
            "lab": {
                "subject": "Arq1",
                "subClasses": [{"role": "Theory", "times": {"Monday": [9]}, "numTeachers": 2}]
            },
            "lecture": {
                "subject": "Arq1",
                "subClasses": [{"role": "Theory", "times": {"Monday": [9]}, "numTeachers": 1}]
            }
        }),
    );
    let assignment = solve(&teachers, &classes, None).unwrap();
    assert_eq!(
        assignment.matches,
        matches(json!({"lab": {"Theory": []}, "lecture": {"Theory": ["teacher1"]}}))
    );
    assert_eq!(assignment.unassigned, vec![("lab".to_string(), Role::from("Theory"))]);
}

#[test]
fn test_pre_assignments_teachers() {
    let monday = json!({"Monday": [9, 10]});
    let (teachers, classes) = domain(
        json!({
            "teacher1": teacher(2, "Arq1", &["Theory", "Practice"], monday.clone()),
            "teacher2": teacher(1, "Arq1", &["Theory", "Practice"], monday),
        }),
        json!({
            "class1": {
                "subject": "Arq1",
                "subClasses": [{"role": "Theory", "times": {"Monday": [9, 10]}, "numTeachers": 1}]
            }
        }),
    );
    let pinned = matches(json!({"class1": {"Theory": ["teacher2"]}}));
    let assignment = solve(&teachers, &classes, Some(&pinned)).unwrap();
    assert!(!are_conflicts(&assignment.matches, &teachers, &classes).unwrap());
    assert_eq!(assignment.matches, pinned);
    assert_eq!(assignment.conflicts.teachers_without_classes, vec!["teacher1"]);
}

#[test]
fn test_pre_assignments_teachers_add_one_more_teacher() {
    let monday = json!({"Monday": [9, 10]});
    let (teachers, classes) = domain(
        json!({
            "teacher1": teacher(2, "Arq1", &["Theory"], monday.clone()),
            "teacher2": teacher(1, "Arq1", &["Theory"], monday),
        }),
        json!({
            "class1": {
                "subject": "Arq1",
                "subClasses": [{"role": "Theory", "times": {"Monday": [9, 10]}, "numTeachers": 2}]
            }
        }),
    );
    let pinned = matches(json!({"class1": {"Theory": ["teacher1"]}}));
    let assignment = solve(&teachers, &classes, Some(&pinned)).unwrap();
    assert_eq!(
        assignment.matches,
        matches(json!({"class1": {"Theory": ["teacher1", "teacher2"]}}))
    );
    assert!(assignment.conflicts.is_empty());
}

#[test]
fn test_impossible_pin_is_infeasible() {
    let (teachers, classes) = domain(
        json!({"teacher1": teacher(2, "Arq1", &["Theory"], json!({"Tuesday": [9]}))}),
        json!({
            "class1": {
                "subject": "Arq1",
                "subClasses": [{"role": "Theory", "times": {"Monday": [9]}, "numTeachers": 1}]
            }
        }),
    );
    let pinned = matches(json!({"class1": {"Theory": ["teacher1"]}}));
    let assignment = solve(&teachers, &classes, Some(&pinned)).unwrap();
    assert_eq!(assignment.status, SolveStatus::Infeasible);
    assert!(assignment.matches.is_empty());
    assert_eq!(
        assignment.unassigned,
        vec![("class1".to_string(), Role::from("Theory"))]
    );
    assert!(assignment.conflicts.is_empty());
}

#[test]
fn test_clashing_pins_are_infeasible() {
    let (teachers, classes) = domain(
        json!({"teacher1": teacher(2, "Arq1", &["Theory"], json!({"Monday": [9]}))}),
        json!({
            "class1": {
                "subject": "Arq1",
                "subClasses": [{"role": "Theory", "times": {"Monday": [9]}, "numTeachers": 1}]
            },
            "class2": {
                "subject": "Arq1",
                "subClasses": [{"role": "Theory", "times": {"Monday": [9]}, "numTeachers": 1}]
            }
        }),
    );
    let pinned = matches(json!({
        "class1": {"Theory": ["teacher1"]},
        "class2": {"Theory": ["teacher1"]}
    }));
    let assignment = solve(&teachers, &classes, Some(&pinned)).unwrap();
    assert_eq!(assignment.status, SolveStatus::Infeasible);
    assert_eq!(assignment.unassigned.len(), 2);
}

#[test]
fn test_pin_with_unknown_names_is_an_error() {
    let (teachers, classes) = domain(
        json!({"teacher1": teacher(2, "Arq1", &["Theory"], json!({"Monday": [9]}))}),
        json!({
            "class1": {
                "subject": "Arq1",
                "subClasses": [{"role": "Theory", "times": {"Monday": [9]}, "numTeachers": 1}]
            }
        }),
    );
    let ghost = matches(json!({"class1": {"Theory": ["ghost"]}}));
    assert!(matches!(
        solve(&teachers, &classes, Some(&ghost)),
        Err(ScheduleError::UnknownTeacher(_))
    ));
    let wrong_role = matches(json!({"class1": {"Practice": ["teacher1"]}}));
    assert!(matches!(
        solve(&teachers, &classes, Some(&wrong_role)),
        Err(ScheduleError::UnknownRole { .. })
    ));
}

#[test]
fn test_teacher_with_class_already_assigned() {
    let monday = json!({"Monday": [9, 10, 11]});
    let (teachers, classes) = domain(
        json!({
            "teacher1": teacher(8, "Arq1", &["Practice"], monday.clone()),
            "teacher2": teacher(1, "Arq1", &["Practice"], monday.clone()),
            "teacher3": teacher(1, "Arq1", &["Practice"], monday),
        }),
        json!({
            "class1": {
                "subject": "Arq1",
                "subClasses": [{"role": "Practice", "times": {"Monday": [9, 10, 11]}, "numTeachers": 2}]
            }
        }),
    );
    let commitments = Commitments {
        committed_teachers: ["teacher1".to_string()].into(),
        ..Commitments::default()
    };
    let assignment = Scheduler::default()
        .solve(&teachers, &classes, &commitments)
        .unwrap();
    assert_eq!(
        assignment.matches,
        matches(json!({"class1": {"Practice": ["teacher2", "teacher3"]}}))
    );
    assert!(!are_conflicts(&assignment.matches, &teachers, &classes).unwrap());
    assert!(assignment.conflicts.is_empty());
}

#[test]
fn test_lexicographic_mode_agrees_on_small_inputs() {
    let monday = json!({"Monday": [9, 10, 11]});
    let (teachers, classes) = domain(
        json!({
            "teacher1": buddy(teacher(1, "Arq1", &["Theory"], monday.clone()), &["Theory"], "Arq1", "teacher2", &["Theory"]),
            "teacher2": teacher(1, "Arq1", &["Theory"], monday.clone()),
            "teacher3": teacher(8, "Arq1", &["Theory"], monday),
        }),
        json!({
            "class1": {
                "subject": "Arq1",
                "subClasses": [{"role": "Theory", "times": {"Monday": [9, 10]}, "numTeachers": 2}]
            }
        }),
    );
    let weighted = solve(&teachers, &classes, None).unwrap();
    let lexicographic = Scheduler::new(SolverConfig::default().with_objective(ObjectiveMode::Lexicographic))
        .solve(&teachers, &classes, &Commitments::default())
        .unwrap();
    assert_eq!(lexicographic.status, SolveStatus::Optimal);
    assert_eq!(lexicographic.score, weighted.score);
    assert_eq!(
        lexicographic.matches,
        matches(json!({"class1": {"Theory": ["teacher1", "teacher2"]}}))
    );
}

#[test]
fn test_time_limit_still_returns_valid_schedule() {
    let (teachers, classes) = campus();
    let scheduler = Scheduler::new(SolverConfig::default().with_time_limit(Duration::from_secs(30)));
    let assignment = scheduler
        .solve(&teachers, &classes, &Commitments::default())
        .unwrap();
    assert!(matches!(
        assignment.status,
        SolveStatus::Optimal | SolveStatus::Feasible
    ));
    assert!(!are_conflicts(&assignment.matches, &teachers, &classes).unwrap());
}

/// A deterministic, mid-sized input in the shape of a real department.
fn campus() -> (Teachers, Classes) {
    let subjects = ["Arq1", "Arq2", "Agil1", "Da1", "Algorithms"];
    let days = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

    let mut teachers = serde_json::Map::new();
    for i in 0..12usize {
        let mut availability = serde_json::Map::new();
        for (d, day) in days.iter().enumerate() {
            if (i + d) % 3 == 0 {
                continue;
            }
            let hours: Vec<u8> = if (i + d) % 2 == 0 {
                vec![8, 9, 10, 11]
            } else {
                vec![17, 18, 19, 20]
            };
            availability.insert(day.to_string(), json!(hours));
        }
        let first = subjects[i % 5];
        let second = subjects[(i + 2) % 5];
        let mut entry = json!({
            "seniority": i % 10,
            "knowledge": [
                {"subject": first, "roles": ["Theory", "Practice"]},
                {"subject": second, "roles": ["Theory"]}
            ],
            "availability": availability,
            "maxWeeklyHours": 4 + (i * 3) % 9
        });
        if i % 2 == 0 {
            entry["groups"] = json!([{
                "myRoles": ["Theory", "Practice"],
                "subject": first,
                "partners": [{"teacher": format!("teacher{}", i + 1), "roles": ["Theory", "Practice"]}]
            }]);
        }
        teachers.insert(format!("teacher{i}"), entry);
    }

    let mut classes = serde_json::Map::new();
    for j in 0..10usize {
        classes.insert(
            format!("class{j}"),
            json!({
                "subject": subjects[j % 5],
                "subClasses": [
                    {"role": "Theory", "times": {days[j % 5]: [9, 10]}, "numTeachers": 1 + j % 2},
                    {"role": "Practice", "times": {days[(j + 2) % 5]: [18, 19]}, "numTeachers": 1}
                ]
            }),
        );
    }
    domain(Value::Object(teachers), Value::Object(classes))
}

#[test]
fn test_campus_schedule_is_self_consistent() {
    let (teachers, classes) = campus();
    let assignment = solve(&teachers, &classes, None).unwrap();
    assert_eq!(assignment.status, SolveStatus::Optimal);
    assert!(!are_conflicts(&assignment.matches, &teachers, &classes).unwrap());
    assert!(assignment.conflicts.teachers_over_hours.is_empty());

    for (class_name, class) in &classes {
        for sub_class in &class.sub_classes {
            let assigned = assignment.assigned(class_name, &sub_class.role).len() as u32;
            let key = (class_name.clone(), sub_class.role.clone());
            assert!(assigned <= sub_class.num_teachers);
            assert_eq!(assignment.unassigned.contains(&key), assigned == 0);
            let partial = assignment
                .conflicts
                .partially_unassigned
                .iter()
                .any(|p| p.class_name == *class_name && p.role == sub_class.role);
            assert_eq!(partial, assigned > 0 && assigned < sub_class.num_teachers);
        }
    }

    assert_eq!(
        assignment.score,
        ObjectiveScore::evaluate(&teachers, &classes, &assignment.matches, &Commitments::default())
    );
}

#[test]
fn test_repeated_solves_reach_the_same_objective() {
    let (teachers, classes) = campus();
    let first = solve(&teachers, &classes, None).unwrap();
    let second = solve(&teachers, &classes, None).unwrap();
    assert_eq!(first.score, second.score);
    assert_eq!(first.score.weighted(), second.score.weighted());
}

#[test]
fn test_seniority_is_optimised_exactly_on_larger_inputs() {
    // 30 single-seat classes at distinct hours; each teacher can take one.
    // Every schedule fills all classes, so only seniority separates them.
    let days = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];
    let mut availability = serde_json::Map::new();
    for day in days {
        availability.insert(day.to_string(), json!([8, 9, 10, 11, 12, 13]));
    }
    let mut teachers = serde_json::Map::new();
    for i in 0..30 {
        for (prefix, seniority) in [("junior", 1), ("senior", 9)] {
            let mut entry = teacher(seniority, "Arq1", &["Theory"], Value::Object(availability.clone()));
            entry["maxWeeklyHours"] = json!(1);
            teachers.insert(format!("{prefix}{i:02}"), entry);
        }
    }
    let mut classes = serde_json::Map::new();
    for j in 0..30usize {
        classes.insert(
            format!("class{j:02}"),
            json!({
                "subject": "Arq1",
                "subClasses": [{"role": "Theory", "times": {days[j % 5]: [8 + j / 5]}, "numTeachers": 1}]
            }),
        );
    }
    let (teachers, classes) = domain(Value::Object(teachers), Value::Object(classes));

    let assignment = solve(&teachers, &classes, None).unwrap();
    assert_eq!(assignment.status, SolveStatus::Optimal);
    assert_eq!(assignment.score.fully_assigned, 30);
    assert_eq!(assignment.score.teachers_with_classes, 30);
    assert_eq!(assignment.score.seniority, 270);
    assert!(
        assignment
            .conflicts
            .teachers_without_classes
            .iter()
            .all(|name| name.starts_with("junior"))
    );
}

#[test]
fn test_lexicographic_stages_share_the_time_limit() {
    let (teachers, classes) = campus();
    let limit = Duration::from_secs(20);
    let scheduler = Scheduler::new(
        SolverConfig::default()
            .with_time_limit(limit)
            .with_objective(ObjectiveMode::Lexicographic),
    );
    let started = std::time::Instant::now();
    let assignment = scheduler
        .solve(&teachers, &classes, &Commitments::default())
        .unwrap();
    assert!(started.elapsed() < limit + Duration::from_secs(5));
    assert!(matches!(
        assignment.status,
        SolveStatus::Optimal | SolveStatus::Feasible
    ));
    assert!(!are_conflicts(&assignment.matches, &teachers, &classes).unwrap());
}
