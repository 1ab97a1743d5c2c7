//! Transformation rules and the edits they make to a topology.
//!
//! Every [`Operation`] looks for its target in a fixed priority order and stops at
//! the first applicable cell. The order is part of the search's determinism, so
//! the small hardcoded indices below are kept exactly as they are.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::task::EfType;
use crate::topology::{JointType, MechanismGraph};

// ------------- Rule -------------
/// The EF type a rule builds on and the EF type it helps to satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicability {
    pub existing_ef: EfType,
    pub required_ef: EfType,
}

fn unit_cost() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub rule_id: String,
    pub applies_to: Applicability,
    pub suggested_operation: Operation,
    #[serde(default = "unit_cost")]
    pub cost: u32,
    #[serde(default)]
    pub description: String,
}

impl Rule {
    pub fn new(
        rule_id: &str,
        existing_ef: EfType,
        required_ef: EfType,
        suggested_operation: Operation,
    ) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            applies_to: Applicability {
                existing_ef,
                required_ef,
            },
            suggested_operation,
            cost: unit_cost(),
            description: String::new(),
        }
    }
    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
    pub fn applies(&self, existing_ef: &EfType, required_ef: &EfType) -> bool {
        &self.applies_to.existing_ef == existing_ef && &self.applies_to.required_ef == required_ef
    }
}

// ------------- Operation -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    AddRevoluteJoint,
    AddPrismaticJoint,
    AddVariableJoint,
    AddStopper,
    AddReturnSpring,
    AddDamper,
    AddOverCenter,
    AddCamMechanism,
    AddGearTrain,
    AddLink,
}

/// What an operation does to one cell of the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Add {
        a: usize,
        b: usize,
        joint: JointType,
    },
    Upgrade {
        a: usize,
        b: usize,
        from: JointType,
        to: JointType,
    },
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Edit::Add { a, b, joint } => write!(f, "add {joint} at E{a}-E{b}"),
            Edit::Upgrade { a, b, from, to } => write!(f, "upgrade {from} to {to} at E{a}-E{b}"),
        }
    }
}

// first vacant cell wins; out-of-range pairs are never vacant
fn first_vacant(
    graph: &MechanismGraph,
    pairs: &[(usize, usize)],
    joint: JointType,
) -> Option<Edit> {
    pairs
        .iter()
        .find(|(a, b)| graph.is_vacant(*a, *b))
        .map(|&(a, b)| Edit::Add { a, b, joint })
}

// first upper-triangle cell holding one of the upgradable joints
fn first_upgrade(
    graph: &MechanismGraph,
    upgrades: &[(JointType, JointType)],
) -> Option<Edit> {
    graph.joints().into_iter().find_map(|(a, b, joint)| {
        upgrades
            .iter()
            .find(|(from, _)| *from == joint)
            .map(|&(from, to)| Edit::Upgrade { a, b, from, to })
    })
}

impl Operation {
    /// The edit this operation would make, or `None` when no target applies.
    pub fn plan(self, graph: &MechanismGraph) -> Option<Edit> {
        use JointType::*;
        match self {
            Operation::AddRevoluteJoint | Operation::AddOverCenter | Operation::AddLink => {
                first_vacant(graph, &[(0, 1)], Revolute)
            }
            Operation::AddPrismaticJoint => first_vacant(graph, &[(0, 2), (0, 1)], Prismatic),
            Operation::AddVariableJoint => first_vacant(graph, &[(1, 2), (0, 1)], Revolute),
            Operation::AddStopper => first_upgrade(
                graph,
                &[
                    (Prismatic, LimitedPrismatic),
                    (SpringPrismatic, LimitedSpringPrismatic),
                ],
            )
            .or_else(|| first_vacant(graph, &[(0, 1)], Fixed)),
            Operation::AddReturnSpring => first_upgrade(
                graph,
                &[
                    (Prismatic, SpringPrismatic),
                    (LimitedPrismatic, LimitedSpringPrismatic),
                ],
            ),
            Operation::AddDamper => first_vacant(graph, &[(2, 3), (1, 2), (0, 1)], Prismatic),
            Operation::AddCamMechanism => first_vacant(graph, &[(1, 2), (0, 1)], HigherPair),
            Operation::AddGearTrain => first_vacant(graph, &[(0, 2), (0, 1)], HigherPair),
        }
    }
}

/// Applies a rule to a copy of the topology; the input is never touched.
pub fn apply(graph: &MechanismGraph, rule: &Rule) -> (MechanismGraph, Option<Edit>) {
    let mut transformed = graph.clone();
    let edit = rule.suggested_operation.plan(graph);
    if let Some(edit) = edit {
        let (a, b, joint) = match edit {
            Edit::Add { a, b, joint } => (a, b, joint),
            Edit::Upgrade { a, b, to, .. } => (a, b, to),
        };
        // planned cells are always in range and off the diagonal
        if transformed.connect(a, b, joint).is_err() {
            return (graph.clone(), None);
        }
    }
    (transformed, edit)
}
