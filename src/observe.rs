//! Observation hooks for the search engine.
//!
//! An [`Observer`] is told about the seed, every accepted transition and the final
//! solution. It returns nothing, so whatever it does (or fails to do) cannot
//! steer the search.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::task::EfId;
use crate::topology::MechanismGraph;

/// A borrowed view of one observed search step.
#[derive(Debug, Clone, Copy)]
pub struct Step<'s> {
    pub topology: &'s MechanismGraph,
    pub iteration: usize,
    pub rule_id: Option<&'s str>,
    pub satisfied: &'s BTreeSet<EfId>,
    pub description: &'s str,
}

pub trait Observer {
    fn observe(&mut self, step: Step<'_>);
}

/// Discards every step.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unobserved;

impl Observer for Unobserved {
    fn observe(&mut self, _step: Step<'_>) {}
}

impl<F: FnMut(Step<'_>)> Observer for F {
    fn observe(&mut self, step: Step<'_>) {
        self(step)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordedStep {
    pub iteration: usize,
    pub rule_id: Option<String>,
    pub satisfied: Vec<EfId>,
    pub description: String,
    pub dof: i64,
    pub topology: MechanismGraph,
    pub recorded_at: DateTime<Utc>,
}

/// Keeps an owned copy of every observed step, e.g. for an external renderer.
#[derive(Debug, Default, Clone, Serialize)]
pub struct StepLog {
    candidate: String,
    steps: Vec<RecordedStep>,
}

impl StepLog {
    pub fn new(candidate: &str) -> Self {
        Self {
            candidate: candidate.to_string(),
            steps: Vec::new(),
        }
    }
    pub fn candidate(&self) -> &str {
        &self.candidate
    }
    pub fn steps(&self) -> &[RecordedStep] {
        &self.steps
    }
    pub fn len(&self) -> usize {
        self.steps.len()
    }
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Observer for StepLog {
    fn observe(&mut self, step: Step<'_>) {
        self.steps.push(RecordedStep {
            iteration: step.iteration,
            rule_id: step.rule_id.map(str::to_string),
            satisfied: step.satisfied.iter().cloned().collect(),
            description: step.description.to_string(),
            dof: step.topology.calculate_dof(),
            topology: step.topology.clone(),
            recorded_at: Utc::now(),
        });
    }
}
