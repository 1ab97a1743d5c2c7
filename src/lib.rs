//! Mechsynth – topology synthesis for multi-state mechanical devices.
//!
//! Mechsynth searches for a sequence of rule-based transformations that takes a
//! seed mechanism to one satisfying an ordered list of *elemental functions*
//! (EFs), the atomic functional requirements of a design task. The moving parts:
//! * A [`topology::MechanismGraph`] is a symmetric adjacency matrix of elements
//!   (element `0` is ground) whose cells hold [`topology::JointType`] codes.
//! * An [`task::ElementalFunction`] has a closed [`task::EfType`] and a behaviour
//!   table saying which elements take effort and which must move.
//! * A [`transform::Rule`] maps a satisfied EF type to a required one and names
//!   one of ten [`transform::Operation`]s that edit the topology.
//!
//! ## Modules
//! * [`topology`] – The joint table, degrees of freedom and connectivity.
//! * [`validator`] – Whether a topology satisfies an EF, and the goal test.
//! * [`transform`] – Rules and the deterministic edits their operations make.
//! * [`search`] – The A* engine over (topology, satisfied EFs) states.
//! * [`observe`] – Hooks for watching a search step by step.
//! * [`interface`] – Running the engine once per initial candidate.
//! * [`persist`] – JSON tasks, rule sets, candidates and reports.
//! * [`settings`] – Layered configuration (defaults, TOML file, environment).
//!
//! ## Degrees of Freedom
//! Mobility follows the Grübler variant `F = 3(n - n_f - 1) - 2 n_1 - n_2` where
//! `n_f` counts fixed joints, `n_1` the revolute and prismatic family and `n_2`
//! the higher pairs. Only topologies with `0 <= F <= 3` are accepted.
//!
//! ## Quick Start
//! ```
//! use mechsynth::observe::Unobserved;
//! use mechsynth::search::Engine;
//! use mechsynth::task::{Behavior, EfType, ElementalFunction, Task};
//! use mechsynth::topology::{JointType, MechanismGraph};
//! use mechsynth::transform::{Operation, Rule};
//!
//! let mut seed = MechanismGraph::new(4).unwrap();
//! seed.connect(0, 1, JointType::Revolute).unwrap();
//! seed.connect(1, 3, JointType::Revolute).unwrap();
//! seed.connect(3, 2, JointType::Revolute).unwrap();
//! seed.connect(0, 2, JointType::Prismatic).unwrap();
//! assert_eq!(seed.calculate_dof(), 1);
//!
//! let task = Task::new("latch")
//!     .with_element("E1", "handle")
//!     .with_element("E2", "bolt")
//!     .with_ef(ElementalFunction::new("EF1", EfType::EffortMotion, "retract",
//!         vec![Behavior::new("E1", "F", "0"), Behavior::new("E2", "0", "x")]))
//!     .with_ef(ElementalFunction::new("EF2", EfType::Stopper, "stop",
//!         vec![Behavior::new("E2", "0", "0")]));
//! let rules = vec![Rule::new("R3.1", EfType::EffortMotion, EfType::Stopper, Operation::AddStopper)];
//!
//! let result = Engine::new(&task, &rules).run(&seed, &mut Unobserved).unwrap();
//! let solution = result.outcome.solution().unwrap();
//! assert_eq!(solution.path, vec!["R3.1"]);
//! assert_eq!(solution.topology.joint(0, 2), Some(JointType::LimitedPrismatic));
//! ```
//!
//! ## Determinism
//! A search is single threaded and fully deterministic: operations pick their
//! targets in a fixed order, candidate rules are collected in a fixed order, and
//! the frontier breaks ties by insertion sequence.

pub mod error;
pub mod interface;
pub mod observe;
pub mod persist;
pub mod search;
pub mod settings;
pub mod task;
pub mod topology;
pub mod transform;
pub mod validator;

pub use error::{Result, SynthesisError};
