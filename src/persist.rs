//! JSON records on disk: tasks, rule sets, initial candidates and reports.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, SynthesisError};
use crate::interface::{CandidateReport, InitialCandidate};
use crate::observe::StepLog;
use crate::task::Task;
use crate::transform::Rule;

#[derive(Debug, Serialize, Deserialize)]
pub struct RuleSet {
    pub rules: Vec<Rule>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CandidateSet {
    pub candidates: Vec<InitialCandidate>,
}

pub fn parse_task(json: &str) -> Result<Task> {
    Ok(serde_json::from_str(json)?)
}

/// Parses a rule set, refusing zero costs and repeated rule ids.
pub fn parse_rules(json: &str) -> Result<Vec<Rule>> {
    let set: RuleSet = serde_json::from_str(json)?;
    let mut seen = HashSet::new();
    for rule in &set.rules {
        if rule.cost == 0 {
            return Err(SynthesisError::InvalidRule {
                rule_id: rule.rule_id.clone(),
                message: "cost must be at least 1".to_string(),
            });
        }
        if !seen.insert(rule.rule_id.as_str()) {
            return Err(SynthesisError::InvalidRule {
                rule_id: rule.rule_id.clone(),
                message: "rule id is used more than once".to_string(),
            });
        }
    }
    Ok(set.rules)
}

pub fn parse_candidates(json: &str) -> Result<Vec<InitialCandidate>> {
    let set: CandidateSet = serde_json::from_str(json)?;
    Ok(set.candidates)
}

pub fn load_task(path: &Path) -> Result<Task> {
    let task = parse_task(&fs::read_to_string(path)?)?;
    info!(path = %path.display(), task = %task.task_name, efs = task.elemental_functions.len(), "loaded task");
    Ok(task)
}

pub fn load_rules(path: &Path) -> Result<Vec<Rule>> {
    let rules = parse_rules(&fs::read_to_string(path)?)?;
    info!(path = %path.display(), rules = rules.len(), "loaded transformation rules");
    Ok(rules)
}

pub fn load_candidates(path: &Path) -> Result<Vec<InitialCandidate>> {
    let candidates = parse_candidates(&fs::read_to_string(path)?)?;
    info!(path = %path.display(), candidates = candidates.len(), "loaded initial candidates");
    Ok(candidates)
}

pub fn write_reports(path: &Path, reports: &[CandidateReport]) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(reports)?)?;
    Ok(())
}

pub fn write_steps(path: &Path, logs: &[StepLog]) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(logs)?)?;
    Ok(())
}
