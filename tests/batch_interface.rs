use mechsynth::interface::{InitialCandidate, SynthesisInterface};
use mechsynth::persist::{parse_candidates, parse_rules, parse_task};
use mechsynth::search::FailureReason;
use mechsynth::task::Task;

fn demo_interface() -> (SynthesisInterface, Vec<InitialCandidate>) {
    let task = parse_task(include_str!("../demos/door_latch_task.json")).unwrap();
    let rules = parse_rules(include_str!("../demos/transformation_rules.json")).unwrap();
    let candidates = parse_candidates(include_str!("../demos/candidates.json")).unwrap();
    (SynthesisInterface::new(task, rules), candidates)
}

#[test]
fn every_candidate_gets_a_report() {
    let (interface, candidates) = demo_interface();
    let reports = interface.run_all(&candidates).unwrap();
    assert_eq!(reports.len(), 2);

    let slider_crank = &reports[0];
    assert_eq!(slider_crank.candidate, "Slider-Crank");
    assert_eq!(slider_crank.source, "knowledge_base");
    assert!(slider_crank.is_solved());
    assert_eq!(slider_crank.solution.as_ref().unwrap().path, vec!["R3.1", "R4.1", "R5.2"]);
    assert_eq!(slider_crank.steps.len(), 5);

    // the four-bar has no slider to limit, so no stopper can be added
    let four_bar = &reports[1];
    assert!(!four_bar.is_solved());
    assert_eq!(four_bar.failure, Some(FailureReason::NoSolution));
    assert!(four_bar.elapsed_ms >= 0.0);
}

#[test]
fn parallel_runs_match_sequential_runs() {
    let (interface, candidates) = demo_interface();
    let sequential = interface.run_all(&candidates).unwrap();
    let parallel = interface.run_parallel(candidates).unwrap();
    assert_eq!(sequential.len(), parallel.len());
    for (left, right) in sequential.iter().zip(&parallel) {
        assert_eq!(left.candidate, right.candidate);
        assert_eq!(left.failure, right.failure);
        assert_eq!(left.stats, right.stats);
        assert_eq!(
            left.solution.as_ref().map(|solution| &solution.path),
            right.solution.as_ref().map(|solution| &solution.path)
        );
    }
}

#[test]
fn handles_can_be_joined_one_by_one() {
    let (interface, candidates) = demo_interface();
    let handles = interface.start_all(candidates);
    let names: Vec<String> = handles.iter().map(|handle| handle.candidate.clone()).collect();
    assert_eq!(names, vec!["Slider-Crank", "Four-Bar Linkage"]);
    for handle in handles {
        assert!(handle.elapsed_ms() >= 0.0);
        let report = handle.join().unwrap();
        assert!(names.contains(&report.candidate));
    }
}

#[test]
fn finished_handles_report_it() {
    let (interface, candidates) = demo_interface();
    let handles = interface.start_all(candidates);
    while !handles.iter().all(|handle| handle.is_finished()) {
        std::thread::sleep(std::time::Duration::from_millis(1));
    }
    for handle in handles {
        assert!(handle.is_finished());
        assert!(handle.join().is_ok());
    }
}

#[test]
fn iteration_cap_is_passed_to_every_run() {
    let (interface, candidates) = demo_interface();
    let interface = interface.with_max_iterations(1);
    let report = interface.run(&candidates[0]).unwrap();
    assert_eq!(report.failure, Some(FailureReason::SearchExhausted));
    assert_eq!(report.stats.iterations, 1);
}

#[test]
fn task_without_elemental_functions_fails_every_candidate() {
    let (_, candidates) = demo_interface();
    let interface = SynthesisInterface::new(Task::new("empty"), Vec::new());
    let report = interface.run(&candidates[0]).unwrap();
    assert_eq!(report.failure, Some(FailureReason::MissingFirstEf));
    assert!(report.steps.is_empty());
}

#[test]
fn reports_serialize_without_the_step_log() {
    let (interface, candidates) = demo_interface();
    let reports = interface.run_all(&candidates).unwrap();
    let json = serde_json::to_value(&reports).unwrap();
    assert_eq!(json[0]["solution"]["path"][2], "R5.2");
    assert_eq!(json[1]["failure"], "NoSolution");
    assert!(json[0].get("steps").is_none());
    assert_eq!(json[0]["source_tag"], "knowledge_base");
    assert!(json[1].get("solution").is_none());
}

#[test]
fn rule_file_with_the_largest_cost_still_solves() {
    let task = parse_task(include_str!("../demos/door_latch_task.json")).unwrap();
    let rules = include_str!("../demos/transformation_rules.json").replacen(r#""cost": 1"#, r#""cost": 4294967295"#, 1);
    let rules = parse_rules(&rules).unwrap();
    assert_eq!(rules[0].cost, u32::MAX);
    let candidates = parse_candidates(include_str!("../demos/candidates.json")).unwrap();

    let report = SynthesisInterface::new(task, rules).run(&candidates[0]).unwrap();
    let solution = report.solution.expect("slider-crank still solves");
    assert_eq!(solution.cost, 4_294_967_297);
}
