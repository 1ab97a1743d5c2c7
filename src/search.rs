//! A* search over mechanism topologies.
//!
//! A search state is a topology together with the set of elemental functions it
//! is claimed to satisfy. States are expanded cheapest first, where the cost is
//! the summed cost of the applied rules and the heuristic is the number of EFs
//! still unclaimed. Every rule costs at least 1 and every unclaimed EF needs at
//! least one rule, so the heuristic never overestimates.
//!
//! Two states with the same matrix and the same claimed EFs are the same state,
//! whatever path led to them; the visited set makes sure each is queued once.

use core::hash::BuildHasherDefault;
use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, HashSet};

use seahash::SeaHasher;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Result, SynthesisError};
use crate::observe::{Observer, Step};
use crate::task::{EfId, EfType, ElementalFunction, Task};
use crate::topology::MechanismGraph;
use crate::transform::{Rule, apply};
use crate::validator::{check_all_satisfied, check_structure, validate};

/// Safety valve on the number of popped states, not a property of the domain.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

pub type StateHasher = BuildHasherDefault<SeaHasher>;

// ------------- SearchNode -------------
#[derive(Debug, Clone)]
pub struct SearchNode {
    graph: MechanismGraph,
    satisfied: BTreeSet<EfId>,
    // kept apart from the ids so rules keyed on an earlier type can still fire
    satisfied_types: BTreeSet<EfType>,
    path: Vec<String>,
    // u64 so summed u32 rule costs never wrap
    cost: u64,
}

impl SearchNode {
    pub fn seed(graph: MechanismGraph, first: &ElementalFunction) -> Self {
        Self {
            graph,
            satisfied: BTreeSet::from([first.ef_id.clone()]),
            satisfied_types: BTreeSet::from([first.ef_type.clone()]),
            path: Vec::new(),
            cost: 0,
        }
    }
    /// The state reached by applying `rule` to this node to satisfy `target`.
    pub fn successor(&self, graph: MechanismGraph, target: &ElementalFunction, rule: &Rule) -> Self {
        let mut satisfied = self.satisfied.clone();
        satisfied.insert(target.ef_id.clone());
        let mut satisfied_types = self.satisfied_types.clone();
        satisfied_types.insert(target.ef_type.clone());
        let mut path = self.path.clone();
        path.push(rule.rule_id.clone());
        Self {
            graph,
            satisfied,
            satisfied_types,
            path,
            cost: self.cost.saturating_add(u64::from(rule.cost)),
        }
    }
    pub fn state_key(&self) -> StateKey {
        StateKey {
            matrix: self.graph.matrix().to_vec(),
            satisfied: self.satisfied.clone(),
        }
    }
    pub fn graph(&self) -> &MechanismGraph {
        &self.graph
    }
    pub fn satisfied(&self) -> &BTreeSet<EfId> {
        &self.satisfied
    }
    pub fn satisfied_types(&self) -> &BTreeSet<EfType> {
        &self.satisfied_types
    }
    pub fn path(&self) -> &[String] {
        &self.path
    }
    pub fn cost(&self) -> u64 {
        self.cost
    }
}

/// Identity of a search state: matrix contents plus claimed EF ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateKey {
    matrix: Vec<i8>,
    satisfied: BTreeSet<EfId>,
}

#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: HashSet<StateKey, StateHasher>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self {
            seen: HashSet::default(),
        }
    }
    /// Returns false when the state had already been seen.
    pub fn insert(&mut self, key: StateKey) -> bool {
        self.seen.insert(key)
    }
    pub fn contains(&self, key: &StateKey) -> bool {
        self.seen.contains(key)
    }
    pub fn len(&self) -> usize {
        self.seen.len()
    }
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

// ------------- Frontier -------------
// Ties on (priority, cost, path length) fall back to insertion order, which
// makes the pop order total.
#[derive(Debug)]
struct Queued {
    priority: u64,
    cost: u64,
    depth: usize,
    sequence: u64,
    node: SearchNode,
}

impl Queued {
    fn rank(&self) -> (u64, u64, usize, u64) {
        (self.priority, self.cost, self.depth, self.sequence)
    }
}
impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed, BinaryHeap is a max-heap
        other.rank().cmp(&self.rank())
    }
}
impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.rank() == other.rank()
    }
}
impl Eq for Queued {}

#[derive(Debug, Default)]
struct Frontier {
    heap: BinaryHeap<Queued>,
    next_sequence: u64,
}

impl Frontier {
    fn push(&mut self, priority: u64, node: SearchNode) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Queued {
            priority,
            cost: node.cost,
            depth: node.path.len(),
            sequence,
            node,
        });
    }
    fn pop(&mut self) -> Option<(u64, SearchNode)> {
        self.heap.pop().map(|queued| (queued.priority, queued.node))
    }
    fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

// ------------- Outcome -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureReason {
    /// The frontier ran dry: some transition has no rule that makes it.
    NoSolution,
    /// The iteration cap was hit with states still queued.
    SearchExhausted,
    /// The task lists no elemental function to seed the search with.
    MissingFirstEf,
}

#[derive(Debug, Clone, Serialize)]
pub struct Solution {
    pub topology: MechanismGraph,
    pub satisfied: BTreeSet<EfId>,
    pub path: Vec<String>,
    pub cost: u64,
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Solved(Solution),
    Failed(FailureReason),
}

impl Outcome {
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            Outcome::Solved(solution) => Some(solution),
            Outcome::Failed(_) => None,
        }
    }
    pub fn failure(&self) -> Option<FailureReason> {
        match self {
            Outcome::Solved(_) => None,
            Outcome::Failed(reason) => Some(*reason),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    pub iterations: usize,
    pub expanded: usize,
    pub pushed: usize,
    pub dead_ends: usize,
    pub rejected_structure: usize,
    pub rejected_validation: usize,
    pub rejected_visited: usize,
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub outcome: Outcome,
    pub stats: SearchStats,
}

// ------------- Engine -------------
pub struct Engine<'a> {
    task: &'a Task,
    rules: &'a [Rule],
    max_iterations: usize,
}

impl<'a> Engine<'a> {
    pub fn new(task: &'a Task, rules: &'a [Rule]) -> Self {
        Self {
            task,
            rules,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }
    fn heuristic(&self, node: &SearchNode) -> u64 {
        self.task
            .ef_ids()
            .filter(|ef_id| !node.satisfied.contains(*ef_id))
            .count() as u64
    }
    /// The lowest-id EF the node does not claim yet.
    fn next_target(&self, node: &SearchNode) -> Option<&'a ElementalFunction> {
        self.task
            .elemental_functions
            .iter()
            .filter(|ef| !node.satisfied.contains(&ef.ef_id))
            .min_by(|a, b| a.ef_id.cmp(&b.ef_id))
    }
    /// Rules leading from any satisfied type to `required`, first occurrence of
    /// each rule id kept.
    pub fn candidate_rules(
        &self,
        satisfied_types: &BTreeSet<EfType>,
        required: &EfType,
    ) -> Vec<&'a Rule> {
        let mut seen = HashSet::<&str, StateHasher>::default();
        let mut candidates = Vec::new();
        for existing in satisfied_types {
            for rule in self.rules.iter().filter(|rule| rule.applies(existing, required)) {
                if seen.insert(rule.rule_id.as_str()) {
                    candidates.push(rule);
                }
            }
        }
        candidates
    }
    pub fn run(&self, seed: &MechanismGraph, observer: &mut dyn Observer) -> Result<SearchResult> {
        let first = self.task.first_ef().ok_or(SynthesisError::MissingFirstEf)?;
        let verdict = validate(seed, first, self.task);
        if !verdict.is_satisfied() {
            warn!(ef = %first.ef_id, reason = %verdict, "seed topology may not satisfy the first elemental function");
        }

        let start = SearchNode::seed(seed.clone(), first);
        observer.observe(Step {
            topology: &start.graph,
            iteration: 0,
            rule_id: None,
            satisfied: &start.satisfied,
            description: &format!("Initial: {}", first.ef_type),
        });

        let mut stats = SearchStats::default();
        let mut visited = VisitedSet::new();
        let mut frontier = Frontier::default();
        visited.insert(start.state_key());
        frontier.push(self.heuristic(&start), start);

        let outcome = loop {
            if stats.iterations >= self.max_iterations && !frontier.is_empty() {
                info!(iterations = stats.iterations, "search stopped at the iteration cap");
                break Outcome::Failed(FailureReason::SearchExhausted);
            }
            let Some((priority, node)) = frontier.pop() else {
                info!(iterations = stats.iterations, "search failed to find a solution");
                break Outcome::Failed(FailureReason::NoSolution);
            };
            stats.iterations += 1;
            let iteration = stats.iterations;
            debug!(iteration, priority, cost = node.cost, satisfied = ?node.satisfied, path = ?node.path, "popped search node");

            if check_all_satisfied(&node.graph, &node.satisfied, self.task).all_satisfied() {
                info!(iteration, cost = node.cost, path = %node.path.join(" -> "), "goal reached");
                observer.observe(Step {
                    topology: &node.graph,
                    iteration,
                    rule_id: None,
                    satisfied: &node.satisfied,
                    description: "FINAL SOLUTION",
                });
                break Outcome::Solved(Solution {
                    topology: node.graph,
                    satisfied: node.satisfied,
                    path: node.path,
                    cost: node.cost,
                });
            }

            self.expand(&node, iteration, &mut visited, &mut frontier, &mut stats, observer);
        };
        Ok(SearchResult { outcome, stats })
    }
    fn expand(
        &self,
        node: &SearchNode,
        iteration: usize,
        visited: &mut VisitedSet,
        frontier: &mut Frontier,
        stats: &mut SearchStats,
        observer: &mut dyn Observer,
    ) {
        // every claimed EF is known, yet one of them stopped validating
        let Some(target) = self.next_target(node) else {
            stats.dead_ends += 1;
            debug!(iteration, "no unclaimed elemental function left to target");
            return;
        };
        let candidates = self.candidate_rules(&node.satisfied_types, &target.ef_type);
        debug!(iteration, target = %target.ef_id, ef_type = %target.ef_type, rules = candidates.len(), "next elemental function");
        if candidates.is_empty() {
            stats.dead_ends += 1;
            debug!(iteration, ef_type = %target.ef_type, "dead end: no rule leads there");
            return;
        }
        stats.expanded += 1;

        for rule in candidates {
            let (graph, edit) = apply(&node.graph, rule);
            if let Err(rejection) = check_structure(&graph) {
                stats.rejected_structure += 1;
                debug!(rule = %rule.rule_id, %rejection, "skipping candidate");
                continue;
            }
            let verdict = validate(&graph, target, self.task);
            if !verdict.is_satisfied() {
                stats.rejected_validation += 1;
                debug!(rule = %rule.rule_id, reason = %verdict, "skipping candidate");
                continue;
            }
            let successor = node.successor(graph, target, rule);
            if !visited.insert(successor.state_key()) {
                stats.rejected_visited += 1;
                debug!(rule = %rule.rule_id, "skipping candidate: state already visited");
                continue;
            }
            let description = match edit {
                Some(edit) => format!("Applied {} to satisfy {} ({edit})", rule.rule_id, target.ef_id),
                None => format!("Applied {} to satisfy {} (no change)", rule.rule_id, target.ef_id),
            };
            observer.observe(Step {
                topology: &successor.graph,
                iteration,
                rule_id: Some(rule.rule_id.as_str()),
                satisfied: &successor.satisfied,
                description: &description,
            });
            let heuristic = self.heuristic(&successor);
            let priority = successor.cost.saturating_add(heuristic);
            debug!(rule = %rule.rule_id, priority, cost = successor.cost, heuristic, "queued successor");
            frontier.push(priority, successor);
            stats.pushed += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Behavior;

    fn node(cost: u64, path: &[&str]) -> SearchNode {
        let first = ElementalFunction::new(
            "EF1",
            EfType::EffortMotion,
            "motion",
            vec![Behavior::new("E1", "F", "0")],
        );
        let mut node = SearchNode::seed(MechanismGraph::new(2).unwrap(), &first);
        node.cost = cost;
        node.path = path.iter().map(|p| p.to_string()).collect();
        node
    }

    #[test]
    fn frontier_pops_lowest_priority_then_lowest_cost() {
        let mut frontier = Frontier::default();
        frontier.push(3, node(2, &["a", "b"]));
        frontier.push(2, node(1, &["c"]));
        frontier.push(3, node(1, &["d"]));
        let order: Vec<Vec<String>> = std::iter::from_fn(|| frontier.pop())
            .map(|(_, node)| node.path)
            .collect();
        assert_eq!(order, vec![vec!["c"], vec!["d"], vec!["a", "b"]]);
    }

    #[test]
    fn frontier_breaks_full_ties_by_insertion_order() {
        let mut frontier = Frontier::default();
        for name in ["first", "second", "third"] {
            frontier.push(1, node(1, &[name]));
        }
        let order: Vec<String> = std::iter::from_fn(|| frontier.pop())
            .map(|(_, node)| node.path[0].clone())
            .collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }
}
