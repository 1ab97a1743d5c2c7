//! Does a topology satisfy an elemental function?
//!
//! [`validate`] runs a fixed pipeline of checks and stops at the first one that
//! fails: connectivity, DOF bounds, referenced elements, kinematic type of
//! linearly moving elements, and finally the pattern required by the EF type.
//! [`check_all_satisfied`] re-runs it for every claimed EF and is the only goal
//! test the search engine uses.

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use crate::task::{EfId, EfType, ElementalFunction, Task, element_index};
use crate::topology::{JointType, MechanismGraph};

pub const MIN_DOF: i64 = 0;
/// Above this the mechanism is no longer meaningfully single-input.
pub const MAX_DOF: i64 = 3;

/// Element names that imply linear motion.
pub const LINEAR_KEYWORDS: [&str; 6] = ["bolt", "rack", "slider", "piston", "ram", "plunger"];

/// Why a topology does not satisfy an elemental function.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("graph is not connected")]
    NotConnected,
    #[error("invalid DOF: {dof} ({})", constraint_label(.dof))]
    InvalidDof { dof: i64 },
    #[error("missing elements in graph: {}", join_elements(.0))]
    MissingElements(Vec<String>),
    #[error("kinematic mismatch: element '{element}' ({name}) requires linear motion (prismatic joint to ground), but found code {code}")]
    KinematicMismatch {
        element: String,
        name: String,
        code: i8,
    },
    #[error("{0} requires both effort input and motion output")]
    PatternMismatch(EfType),
    #[error("Type-2 requires a stopper")]
    MissingStopper,
    #[error("Type-3 requires a spring")]
    MissingSpring,
}

fn constraint_label(dof: &i64) -> &'static str {
    if *dof < MIN_DOF {
        "over-constrained"
    } else {
        "under-constrained for single-input mechanism"
    }
}

fn join_elements(elements: &[String]) -> String {
    elements.join(", ")
}

/// Outcome of a single validation, with the reason either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Satisfied(EfType),
    /// Unknown EF types are never failures.
    UnknownType(String),
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_satisfied(&self) -> bool {
        !matches!(self, Verdict::Rejected(_))
    }
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Verdict::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Verdict::Satisfied(ef_type) => write!(f, "{ef_type} pattern validated"),
            Verdict::UnknownType(tag) => {
                write!(f, "unknown EF type '{tag}' - basic validation passed")
            }
            Verdict::Rejected(rejection) => write!(f, "{rejection}"),
        }
    }
}

impl From<Rejection> for Verdict {
    fn from(rejection: Rejection) -> Self {
        Verdict::Rejected(rejection)
    }
}

/// Structural checks that gate every candidate, independent of the EF.
pub fn check_structure(graph: &MechanismGraph) -> Result<(), Rejection> {
    if !graph.is_connected() {
        return Err(Rejection::NotConnected);
    }
    let dof = graph.calculate_dof();
    if !(MIN_DOF..=MAX_DOF).contains(&dof) {
        return Err(Rejection::InvalidDof { dof });
    }
    Ok(())
}

fn check_elements(ef: &ElementalFunction, task: &Task) -> Result<(), Rejection> {
    let available = task.indexed_elements();
    let missing: BTreeSet<&str> = ef
        .behavior
        .iter()
        .map(|behavior| behavior.element.as_str())
        .filter(|element| !available.contains_key(element))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Rejection::MissingElements(
            missing.into_iter().map(str::to_string).collect(),
        ))
    }
}

fn is_linear(name: &str) -> bool {
    let name = name.to_lowercase();
    LINEAR_KEYWORDS.iter().any(|keyword| name.contains(keyword))
}

fn check_kinematics(
    graph: &MechanismGraph,
    ef: &ElementalFunction,
    task: &Task,
) -> Result<(), Rejection> {
    for behavior in ef.behavior.iter().filter(|behavior| behavior.has_motion()) {
        let Some(name) = task.element_name(&behavior.element) else {
            continue;
        };
        if !is_linear(name) {
            continue;
        }
        // unresolvable elements are skipped, not failed
        let Some(code) = element_index(&behavior.element).and_then(|index| graph.code(0, index))
        else {
            continue;
        };
        let prismatic = JointType::from_code(i32::from(code))
            .is_some_and(JointType::is_prismatic_family);
        if !prismatic {
            return Err(Rejection::KinematicMismatch {
                element: behavior.element.clone(),
                name: name.to_string(),
                code,
            });
        }
    }
    Ok(())
}

fn check_pattern(graph: &MechanismGraph, ef: &ElementalFunction) -> Verdict {
    match &ef.ef_type {
        EfType::EffortMotion | EfType::VariableInput => {
            let has_effort = ef.behavior.iter().any(|behavior| behavior.has_effort());
            let has_motion = ef.behavior.iter().any(|behavior| behavior.has_motion());
            if has_effort && has_motion {
                Verdict::Satisfied(ef.ef_type.clone())
            } else {
                Rejection::PatternMismatch(ef.ef_type.clone()).into()
            }
        }
        EfType::Stopper => {
            if graph.has_joint(JointType::is_stopper) {
                Verdict::Satisfied(EfType::Stopper)
            } else {
                Rejection::MissingStopper.into()
            }
        }
        EfType::ReturnSpring => {
            if graph.has_joint(JointType::is_spring) {
                Verdict::Satisfied(EfType::ReturnSpring)
            } else {
                Rejection::MissingSpring.into()
            }
        }
        EfType::Unknown(tag) => Verdict::UnknownType(tag.clone()),
    }
}

pub fn validate(graph: &MechanismGraph, ef: &ElementalFunction, task: &Task) -> Verdict {
    let checks = check_structure(graph)
        .and_then(|_| check_elements(ef, task))
        .and_then(|_| check_kinematics(graph, ef, task));
    match checks {
        Ok(()) => check_pattern(graph, ef),
        Err(rejection) => Verdict::Rejected(rejection),
    }
}

/// Result of re-validating every claimed EF against one topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalCheck {
    /// EFs never claimed, plus claimed EFs that no longer validate.
    pub unsatisfied: BTreeSet<EfId>,
}

impl GoalCheck {
    pub fn all_satisfied(&self) -> bool {
        self.unsatisfied.is_empty()
    }
}

pub fn check_all_satisfied(
    graph: &MechanismGraph,
    claimed: &BTreeSet<EfId>,
    task: &Task,
) -> GoalCheck {
    let mut unsatisfied: BTreeSet<EfId> = task
        .ef_ids()
        .filter(|ef_id| !claimed.contains(*ef_id))
        .cloned()
        .collect();
    for ef_id in claimed {
        // claims for EFs the task does not know about are ignored
        if let Some(ef) = task.ef(ef_id) {
            if !validate(graph, ef, task).is_satisfied() {
                unsatisfied.insert(ef_id.clone());
            }
        }
    }
    GoalCheck { unsatisfied }
}
