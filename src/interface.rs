//! Batch interface for running the search once per initial candidate.
//!
//! Candidates are independent: each run owns its copy of the seed topology, its
//! own frontier and its own visited set. They can be run one after the other on
//! the calling thread, or each on a background thread of its own. The task and
//! rule set are shared read-only through `Arc`.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, SynthesisError};
use crate::observe::StepLog;
use crate::search::{DEFAULT_MAX_ITERATIONS, Engine, FailureReason, Outcome, SearchStats, Solution};
use crate::task::Task;
use crate::topology::MechanismGraph;
use crate::transform::Rule;

/// A seed topology handed over by an external provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitialCandidate {
    pub name: String,
    pub topology: MechanismGraph,
    #[serde(default, rename = "source_tag", alias = "source")]
    pub source: String,
}

impl InitialCandidate {
    pub fn new(name: &str, topology: MechanismGraph, source: &str) -> Self {
        Self {
            name: name.to_string(),
            topology,
            source: source.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateReport {
    pub candidate: String,
    #[serde(rename = "source_tag")]
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<Solution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureReason>,
    pub stats: SearchStats,
    pub elapsed_ms: f64,
    #[serde(skip)]
    pub steps: StepLog,
}

impl CandidateReport {
    pub fn is_solved(&self) -> bool {
        self.solution.is_some()
    }
}

fn synthesize(
    task: &Task,
    rules: &[Rule],
    max_iterations: usize,
    candidate: &InitialCandidate,
) -> Result<CandidateReport> {
    let started = Instant::now();
    let mut steps = StepLog::new(&candidate.name);
    let engine = Engine::new(task, rules).with_max_iterations(max_iterations);
    let (solution, failure, stats) = match engine.run(&candidate.topology, &mut steps) {
        Ok(result) => match result.outcome {
            Outcome::Solved(solution) => (Some(solution), None, result.stats),
            Outcome::Failed(reason) => (None, Some(reason), result.stats),
        },
        Err(SynthesisError::MissingFirstEf) => {
            (None, Some(FailureReason::MissingFirstEf), SearchStats::default())
        }
        Err(e) => return Err(e),
    };
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    match (&solution, failure) {
        (Some(solution), _) => {
            info!(candidate = %candidate.name, ms = elapsed_ms, path = %solution.path.join(" -> "), "candidate solved")
        }
        (None, reason) => {
            warn!(candidate = %candidate.name, ms = elapsed_ms, reason = ?reason, "candidate failed")
        }
    }
    Ok(CandidateReport {
        candidate: candidate.name.clone(),
        source: candidate.source.clone(),
        solution,
        failure,
        stats,
        elapsed_ms,
        steps,
    })
}

/// Handle to a candidate running on a background thread.
pub struct SynthesisHandle {
    pub candidate: String,
    started: Instant,
    join: JoinHandle<Result<CandidateReport>>,
}

impl SynthesisHandle {
    /// Wait for the run to finish.
    pub fn join(self) -> Result<CandidateReport> {
        let candidate = self.candidate;
        self.join
            .join()
            .map_err(|_| SynthesisError::Worker(format!("synthesis of '{candidate}' panicked")))?
    }
    pub fn elapsed_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

pub struct SynthesisInterface {
    task: Arc<Task>,
    rules: Arc<Vec<Rule>>,
    max_iterations: usize,
}

impl SynthesisInterface {
    pub fn new(task: Task, rules: Vec<Rule>) -> Self {
        Self {
            task: Arc::new(task),
            rules: Arc::new(rules),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
    pub fn task(&self) -> &Task {
        &self.task
    }
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
    pub fn run(&self, candidate: &InitialCandidate) -> Result<CandidateReport> {
        synthesize(&self.task, &self.rules, self.max_iterations, candidate)
    }
    /// Runs every candidate in order on the calling thread.
    pub fn run_all(&self, candidates: &[InitialCandidate]) -> Result<Vec<CandidateReport>> {
        info!(candidates = candidates.len(), "running synthesis for all initial candidates");
        let reports = candidates
            .iter()
            .map(|candidate| self.run(candidate))
            .collect::<Result<Vec<_>>>()?;
        summarize(&reports);
        Ok(reports)
    }
    /// Starts one background thread per candidate.
    pub fn start_all(&self, candidates: Vec<InitialCandidate>) -> Vec<SynthesisHandle> {
        candidates
            .into_iter()
            .map(|candidate| {
                let task = Arc::clone(&self.task);
                let rules = Arc::clone(&self.rules);
                let max_iterations = self.max_iterations;
                let name = candidate.name.clone();
                let join = std::thread::spawn(move || {
                    synthesize(&task, &rules, max_iterations, &candidate)
                });
                SynthesisHandle {
                    candidate: name,
                    started: Instant::now(),
                    join,
                }
            })
            .collect()
    }
    /// Runs every candidate on its own thread and collects the reports in
    /// candidate order.
    pub fn run_parallel(&self, candidates: Vec<InitialCandidate>) -> Result<Vec<CandidateReport>> {
        let reports = self
            .start_all(candidates)
            .into_iter()
            .map(SynthesisHandle::join)
            .collect::<Result<Vec<_>>>()?;
        summarize(&reports);
        Ok(reports)
    }
}

fn summarize(reports: &[CandidateReport]) {
    let solved = reports.iter().filter(|report| report.is_solved()).count();
    info!(solved, candidates = reports.len(), "synthesis complete");
}
