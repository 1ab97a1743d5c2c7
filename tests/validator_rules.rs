use std::collections::BTreeSet;

use mechsynth::task::{Behavior, EfId, EfType, ElementalFunction, Task};
use mechsynth::topology::{JointType, MechanismGraph};
use mechsynth::validator::{Rejection, Verdict, check_all_satisfied, check_structure, validate};

fn slider_crank(slider_joint: JointType) -> MechanismGraph {
    let mut graph = MechanismGraph::new(4).unwrap();
    graph.connect(0, 1, JointType::Revolute).unwrap();
    graph.connect(1, 3, JointType::Revolute).unwrap();
    graph.connect(3, 2, JointType::Revolute).unwrap();
    graph.connect(0, 2, slider_joint).unwrap();
    graph
}

fn latch_task() -> Task {
    Task::new("latch")
        .with_element("E0", "frame")
        .with_element("E1", "handle")
        .with_element("E2", "Bolt")
        .with_element("E3", "coupler")
        .with_ef(ElementalFunction::new(
            "EF1",
            EfType::EffortMotion,
            "turning the handle retracts the bolt",
            vec![Behavior::new("E1", "T_in", "rot"), Behavior::new("E2", "0", "lin")],
        ))
        .with_ef(ElementalFunction::new(
            "EF2",
            EfType::Stopper,
            "bolt stops",
            vec![Behavior::new("E2", "0", "0")],
        ))
        .with_ef(ElementalFunction::new(
            "EF3",
            EfType::ReturnSpring,
            "bolt springs back",
            vec![Behavior::new("E2", "F_spring", "lin")],
        ))
}

fn ef<'t>(task: &'t Task, id: &str) -> &'t ElementalFunction {
    task.ef(&EfId::new(id)).unwrap()
}

fn claimed(ids: &[&str]) -> BTreeSet<EfId> {
    ids.iter().map(|id| EfId::new(*id)).collect()
}

#[test]
fn effort_and_motion_pattern_passes() {
    let task = latch_task();
    let verdict = validate(&slider_crank(JointType::Prismatic), ef(&task, "EF1"), &task);
    assert_eq!(verdict, Verdict::Satisfied(EfType::EffortMotion));
    assert_eq!(verdict.to_string(), "Type-1.1 pattern validated");
}

#[test]
fn effort_without_motion_is_a_pattern_mismatch() {
    let task = latch_task();
    let ef = ElementalFunction::new(
        "EF9",
        EfType::VariableInput,
        "push",
        vec![Behavior::new("E1", "F", "0")],
    );
    let verdict = validate(&slider_crank(JointType::Prismatic), &ef, &task);
    assert_eq!(verdict.rejection(), Some(&Rejection::PatternMismatch(EfType::VariableInput)));
}

#[test]
fn disconnected_graph_is_rejected_first() {
    let task = latch_task();
    let mut graph = slider_crank(JointType::Prismatic);
    graph.disconnect(0, 1).unwrap();
    graph.disconnect(0, 2).unwrap();
    let verdict = validate(&graph, ef(&task, "EF1"), &task);
    assert_eq!(verdict.rejection(), Some(&Rejection::NotConnected));
}

#[test]
fn dof_outside_bounds_is_rejected() {
    let mut rigid = slider_crank(JointType::Prismatic);
    rigid.connect(1, 2, JointType::Revolute).unwrap();
    assert_eq!(rigid.calculate_dof(), -1);
    let rejection = check_structure(&rigid).unwrap_err();
    assert_eq!(rejection, Rejection::InvalidDof { dof: -1 });
    assert!(rejection.to_string().contains("over-constrained"));

    let mut loose = MechanismGraph::new(4).unwrap();
    loose.connect(0, 1, JointType::HigherPair).unwrap();
    loose.connect(1, 2, JointType::HigherPair).unwrap();
    loose.connect(2, 3, JointType::HigherPair).unwrap();
    assert_eq!(check_structure(&loose), Err(Rejection::InvalidDof { dof: 6 }));
    assert!(check_structure(&slider_crank(JointType::Prismatic)).is_ok());
}

#[test]
fn missing_elements_are_reported_by_id() {
    let task = latch_task();
    let ef = ElementalFunction::new(
        "EF5",
        EfType::EffortMotion,
        "uses a part the task never named",
        vec![Behavior::new("E1", "F", "0"), Behavior::new("E7", "0", "x")],
    );
    let verdict = validate(&slider_crank(JointType::Prismatic), &ef, &task);
    assert_eq!(verdict.rejection(), Some(&Rejection::MissingElements(vec!["E7".to_string()])));
    assert_eq!(verdict.to_string(), "missing elements in graph: E7");
}

#[test]
fn linear_element_needs_prismatic_joint_to_ground() {
    let task = latch_task();
    let mut graph = MechanismGraph::new(4).unwrap();
    for (a, b) in [(0, 1), (1, 2), (2, 3), (0, 3)] {
        graph.connect(a, b, JointType::Revolute).unwrap();
    }
    let verdict = validate(&graph, ef(&task, "EF1"), &task);
    assert_eq!(
        verdict.rejection(),
        Some(&Rejection::KinematicMismatch {
            element: "E2".to_string(),
            name: "Bolt".to_string(),
            code: 0,
        })
    );
}

#[test]
fn spring_prismatic_satisfies_the_kinematic_check() {
    let task = latch_task();
    let verdict = validate(&slider_crank(JointType::SpringPrismatic), ef(&task, "EF1"), &task);
    assert!(verdict.is_satisfied());
}

#[test]
fn stopper_needs_limited_or_fixed_joint() {
    let task = latch_task();
    let stopper = ef(&task, "EF2");
    assert_eq!(
        validate(&slider_crank(JointType::Prismatic), stopper, &task).rejection(),
        Some(&Rejection::MissingStopper)
    );
    assert!(validate(&slider_crank(JointType::LimitedPrismatic), stopper, &task).is_satisfied());

    let mut fixed = MechanismGraph::new(3).unwrap();
    fixed.connect(0, 1, JointType::Fixed).unwrap();
    fixed.connect(1, 2, JointType::Revolute).unwrap();
    let task = Task::new("fixed")
        .with_element("E2", "arm")
        .with_ef(ElementalFunction::new("EF2", EfType::Stopper, "", vec![Behavior::new("E2", "0", "0")]));
    assert!(validate(&fixed, ef(&task, "EF2"), &task).is_satisfied());
}

#[test]
fn return_spring_needs_spring_joint() {
    let task = latch_task();
    let spring = ef(&task, "EF3");
    assert_eq!(
        validate(&slider_crank(JointType::LimitedPrismatic), spring, &task).rejection(),
        Some(&Rejection::MissingSpring)
    );
    assert!(validate(&slider_crank(JointType::LimitedSpringPrismatic), spring, &task).is_satisfied());
}

#[test]
fn unknown_types_pass_after_the_basic_checks() {
    let task = latch_task();
    let ef = ElementalFunction::new(
        "EF8",
        EfType::from("Type-9"),
        "something new",
        vec![Behavior::new("E1", "0", "0")],
    );
    let verdict = validate(&slider_crank(JointType::Prismatic), &ef, &task);
    assert_eq!(verdict, Verdict::UnknownType("Type-9".to_string()));
    assert!(verdict.is_satisfied());
}

#[test]
fn goal_check_reports_unclaimed_and_broken_claims() {
    let task = latch_task();
    let graph = slider_crank(JointType::LimitedPrismatic);

    let check = check_all_satisfied(&graph, &claimed(&["EF1"]), &task);
    assert_eq!(check.unsatisfied, claimed(&["EF2", "EF3"]));

    // EF3 is claimed but the slider has no spring
    let check = check_all_satisfied(&graph, &claimed(&["EF1", "EF2", "EF3"]), &task);
    assert_eq!(check.unsatisfied, claimed(&["EF3"]));
    assert!(!check.all_satisfied());

    let sprung = slider_crank(JointType::LimitedSpringPrismatic);
    let check = check_all_satisfied(&sprung, &claimed(&["EF1", "EF2", "EF3", "EF99"]), &task);
    assert!(check.all_satisfied());
}

#[test]
fn linear_element_beyond_the_matrix_is_skipped() {
    // E9 is named by the task but the mechanism only has four elements
    let task = latch_task().with_element("E9", "plunger");
    let ef = ElementalFunction::new(
        "EF6",
        EfType::EffortMotion,
        "handle drives a far plunger",
        vec![Behavior::new("E1", "T_in", "0"), Behavior::new("E9", "0", "lin")],
    );
    let verdict = validate(&slider_crank(JointType::Prismatic), &ef, &task);
    assert_eq!(verdict, Verdict::Satisfied(EfType::EffortMotion));
}

#[test]
fn element_key_without_an_index_is_missing() {
    let task = latch_task().with_element("Bolt", "bolt");
    let ef = ElementalFunction::new(
        "EF7",
        EfType::EffortMotion,
        "named by key only",
        vec![Behavior::new("E1", "T_in", "0"), Behavior::new("Bolt", "0", "lin")],
    );
    let verdict = validate(&slider_crank(JointType::Revolute), &ef, &task);
    assert_eq!(verdict.rejection(), Some(&Rejection::MissingElements(vec!["Bolt".to_string()])));
}
