//! Mechanism topology: an adjacency matrix of elements and the joints between them.
//!
//! Element `0` is always ground. Cell `(a, b)` of the matrix holds the code of the
//! [`JointType`] connecting elements `a` and `b`, or `0` when they are not joined.
//! The matrix is kept symmetric with a zero diagonal by every mutating operation,
//! so the upper triangle alone describes the mechanism.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthesisError};

// ------------- JointType -------------
/// The closed set of kinematic joints a topology cell can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum JointType {
    Revolute,
    Prismatic,
    HigherPair,
    Fixed,
    LimitedPrismatic,
    SpringPrismatic,
    LimitedSpringPrismatic,
}

pub const JOINT_TYPES: [JointType; 7] = [
    JointType::Revolute,
    JointType::Prismatic,
    JointType::HigherPair,
    JointType::Fixed,
    JointType::LimitedPrismatic,
    JointType::SpringPrismatic,
    JointType::LimitedSpringPrismatic,
];

impl JointType {
    pub const fn code(self) -> i8 {
        match self {
            JointType::Revolute => 1,
            JointType::HigherPair => 2,
            JointType::Prismatic => 3,
            JointType::Fixed => -1,
            JointType::LimitedPrismatic => 5,
            JointType::SpringPrismatic => 6,
            JointType::LimitedSpringPrismatic => 7,
        }
    }
    pub fn from_code(code: i32) -> Option<Self> {
        JOINT_TYPES
            .iter()
            .copied()
            .find(|joint| i32::from(joint.code()) == code)
    }
    pub const fn label(self) -> &'static str {
        match self {
            JointType::Revolute => "R",
            JointType::Prismatic => "P",
            JointType::HigherPair => "X",
            JointType::Fixed => "F",
            JointType::LimitedPrismatic => "LP",
            JointType::SpringPrismatic => "SP",
            JointType::LimitedSpringPrismatic => "LSP",
        }
    }
    /// Joints counted in the 1-DOF term of the mobility formula.
    pub const fn is_single_dof(self) -> bool {
        matches!(
            self,
            JointType::Revolute
                | JointType::Prismatic
                | JointType::LimitedPrismatic
                | JointType::SpringPrismatic
                | JointType::LimitedSpringPrismatic
        )
    }
    /// Joints that let an element translate relative to its partner.
    pub const fn is_prismatic_family(self) -> bool {
        matches!(
            self,
            JointType::Prismatic
                | JointType::LimitedPrismatic
                | JointType::SpringPrismatic
                | JointType::LimitedSpringPrismatic
        )
    }
    pub const fn is_stopper(self) -> bool {
        matches!(
            self,
            JointType::LimitedPrismatic | JointType::LimitedSpringPrismatic | JointType::Fixed
        )
    }
    pub const fn is_spring(self) -> bool {
        matches!(
            self,
            JointType::SpringPrismatic | JointType::LimitedSpringPrismatic
        )
    }
}

impl TryFrom<i32> for JointType {
    type Error = SynthesisError;
    fn try_from(code: i32) -> Result<Self> {
        Self::from_code(code).ok_or_else(|| SynthesisError::UnknownJointType(code.to_string()))
    }
}

impl FromStr for JointType {
    type Err = SynthesisError;
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_uppercase();
        JOINT_TYPES
            .iter()
            .copied()
            .find(|joint| joint.label() == wanted)
            .ok_or_else(|| SynthesisError::UnknownJointType(s.to_string()))
    }
}

impl TryFrom<String> for JointType {
    type Error = SynthesisError;
    fn try_from(label: String) -> Result<Self> {
        label.parse()
    }
}

impl From<JointType> for String {
    fn from(joint: JointType) -> String {
        joint.label().to_string()
    }
}

impl fmt::Display for JointType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ------------- MechanismGraph -------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TopologyRecord", into = "TopologyRecord")]
pub struct MechanismGraph {
    elements: usize,
    matrix: Vec<i8>, // row-major, elements * elements
    names: Vec<String>,
}

impl MechanismGraph {
    pub fn new(elements: usize) -> Result<Self> {
        if elements < 2 {
            return Err(SynthesisError::InvalidTopology(format!(
                "a mechanism must have at least 2 elements, got {elements}"
            )));
        }
        Ok(Self {
            elements,
            matrix: vec![0; elements * elements],
            names: (0..elements).map(default_name).collect(),
        })
    }
    pub fn with_names(mut self, names: Vec<String>) -> Result<Self> {
        if names.len() != self.elements {
            return Err(SynthesisError::InvalidTopology(format!(
                "{} names given for {} elements",
                names.len(),
                self.elements
            )));
        }
        self.names = names;
        Ok(self)
    }
    pub fn elements(&self) -> usize {
        self.elements
    }
    pub fn name(&self, element: usize) -> Option<&str> {
        self.names.get(element).map(String::as_str)
    }
    pub fn names(&self) -> &[String] {
        &self.names
    }
    /// The raw row-major matrix of joint codes.
    pub fn matrix(&self) -> &[i8] {
        &self.matrix
    }
    pub fn rows(&self) -> impl Iterator<Item = &[i8]> {
        self.matrix.chunks(self.elements)
    }
    /// Code in cell `(a, b)`, or `None` when either index is out of range.
    pub fn code(&self, a: usize, b: usize) -> Option<i8> {
        if a < self.elements && b < self.elements {
            Some(self.matrix[a * self.elements + b])
        } else {
            None
        }
    }
    pub fn joint(&self, a: usize, b: usize) -> Option<JointType> {
        self.code(a, b)
            .and_then(|code| JointType::from_code(i32::from(code)))
    }
    /// True when both indices exist and no joint connects them yet.
    pub fn is_vacant(&self, a: usize, b: usize) -> bool {
        a != b && self.code(a, b) == Some(0)
    }
    pub fn add_joint(&mut self, a: usize, b: usize, code: i32) -> Result<()> {
        let joint = JointType::try_from(code)?;
        self.connect(a, b, joint)
    }
    /// Joins two elements, replacing whatever joint was there before.
    pub fn connect(&mut self, a: usize, b: usize, joint: JointType) -> Result<()> {
        self.check_pair(a, b)?;
        self.store(a, b, joint.code());
        Ok(())
    }
    pub fn disconnect(&mut self, a: usize, b: usize) -> Result<()> {
        self.check_pair(a, b)?;
        self.store(a, b, 0);
        Ok(())
    }
    fn check_pair(&self, a: usize, b: usize) -> Result<()> {
        for index in [a, b] {
            if index >= self.elements {
                return Err(SynthesisError::ElementOutOfRange {
                    index,
                    elements: self.elements,
                });
            }
        }
        if a == b {
            return Err(SynthesisError::SelfJoint(a));
        }
        Ok(())
    }
    fn store(&mut self, a: usize, b: usize, code: i8) {
        self.matrix[a * self.elements + b] = code;
        self.matrix[b * self.elements + a] = code;
    }
    /// All joints in the upper triangle, in row-major order.
    pub fn joints(&self) -> Vec<(usize, usize, JointType)> {
        let mut joints = Vec::new();
        for a in 0..self.elements {
            for b in (a + 1)..self.elements {
                if let Some(joint) = self.joint(a, b) {
                    joints.push((a, b, joint));
                }
            }
        }
        joints
    }
    pub fn has_joint(&self, wanted: impl Fn(JointType) -> bool) -> bool {
        self.joints().into_iter().any(|(_, _, joint)| wanted(joint))
    }
    /// Mobility by the Grübler variant `3(n - n_f - 1) - 2 n_1 - n_2`.
    pub fn calculate_dof(&self) -> i64 {
        let (mut fixed, mut single, mut higher) = (0i64, 0i64, 0i64);
        for (_, _, joint) in self.joints() {
            if joint == JointType::Fixed {
                fixed += 1;
            } else if joint == JointType::HigherPair {
                higher += 1;
            } else if joint.is_single_dof() {
                single += 1;
            }
        }
        3 * (self.elements as i64 - fixed - 1) - 2 * single - higher
    }
    // every non-zero cell is treated as a plain edge from here on
    fn neighbours(&self, element: usize) -> impl Iterator<Item = usize> + '_ {
        self.matrix[element * self.elements..(element + 1) * self.elements]
            .iter()
            .enumerate()
            .filter(|(_, code)| **code != 0)
            .map(|(other, _)| other)
    }
    fn distances_from(&self, start: usize) -> Vec<Option<usize>> {
        let mut distances = vec![None; self.elements];
        let mut queue = VecDeque::new();
        distances[start] = Some(0);
        queue.push_back(start);
        while let Some(current) = queue.pop_front() {
            let next = distances[current].unwrap_or(0) + 1;
            for other in self.neighbours(current) {
                if distances[other].is_none() {
                    distances[other] = Some(next);
                    queue.push_back(other);
                }
            }
        }
        distances
    }
    pub fn is_connected(&self) -> bool {
        self.distances_from(0).iter().all(Option::is_some)
    }
    pub fn component_count(&self) -> usize {
        let mut seen = vec![false; self.elements];
        let mut components = 0;
        for start in 0..self.elements {
            if seen[start] {
                continue;
            }
            components += 1;
            for (element, distance) in self.distances_from(start).into_iter().enumerate() {
                if distance.is_some() {
                    seen[element] = true;
                }
            }
        }
        components
    }
    /// Longest shortest path, only defined for a connected topology.
    pub fn diameter(&self) -> Option<usize> {
        if !self.is_connected() {
            return None;
        }
        (0..self.elements)
            .filter_map(|start| self.distances_from(start).into_iter().flatten().max())
            .max()
    }
    pub fn average_clustering(&self) -> f64 {
        let mut total = 0f64;
        for element in 0..self.elements {
            let neighbours: Vec<usize> = self.neighbours(element).collect();
            let degree = neighbours.len();
            if degree < 2 {
                continue;
            }
            let mut links = 0usize;
            for (i, &a) in neighbours.iter().enumerate() {
                for &b in &neighbours[i + 1..] {
                    if self.code(a, b).unwrap_or(0) != 0 {
                        links += 1;
                    }
                }
            }
            total += 2.0 * links as f64 / (degree * (degree - 1)) as f64;
        }
        total / self.elements as f64
    }
    pub fn connectivity(&self) -> ConnectivityInfo {
        ConnectivityInfo {
            is_connected: self.is_connected(),
            components: self.component_count(),
            diameter: self.diameter(),
            average_clustering: self.average_clustering(),
        }
    }
}

fn default_name(element: usize) -> String {
    format!("E{element}")
}

impl fmt::Display for MechanismGraph {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Mechanism with {} elements:", self.elements)?;
        writeln!(f, "Adjacency Matrix:")?;
        for row in self.rows() {
            let cells: Vec<String> = row.iter().map(|code| format!("{code:>2}")).collect();
            writeln!(f, "[{}]", cells.join(" "))?;
        }
        writeln!(f, "Joints:")?;
        for (a, b, joint) in self.joints() {
            writeln!(f, "  {}-{}: {}", self.names[a], self.names[b], joint)?;
        }
        writeln!(f, "DOF: {}", self.calculate_dof())?;
        write!(f, "Connected: {}", self.is_connected())
    }
}

/// Diagnostics for external tooling; the search never branches on these.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectivityInfo {
    pub is_connected: bool,
    pub components: usize,
    pub diameter: Option<usize>,
    pub average_clustering: f64,
}

// ------------- Records -------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointRecord {
    pub a: usize,
    pub b: usize,
    pub joint: JointType,
}

/// Wire shape of a topology: `{elements, names?, joints: [{a, b, joint}]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyRecord {
    pub elements: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<String>>,
    #[serde(default)]
    pub joints: Vec<JointRecord>,
}

impl TryFrom<TopologyRecord> for MechanismGraph {
    type Error = SynthesisError;
    fn try_from(record: TopologyRecord) -> Result<Self> {
        let mut graph = MechanismGraph::new(record.elements)?;
        if let Some(names) = record.names {
            graph = graph.with_names(names)?;
        }
        for joint in record.joints {
            graph.connect(joint.a, joint.b, joint.joint)?;
        }
        Ok(graph)
    }
}

impl From<MechanismGraph> for TopologyRecord {
    fn from(graph: MechanismGraph) -> Self {
        let custom_names = graph
            .names
            .iter()
            .enumerate()
            .any(|(element, name)| *name != default_name(element));
        Self {
            elements: graph.elements,
            joints: graph
                .joints()
                .into_iter()
                .map(|(a, b, joint)| JointRecord { a, b, joint })
                .collect(),
            names: custom_names.then_some(graph.names),
        }
    }
}
