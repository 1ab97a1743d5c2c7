//! Design tasks and the elemental functions (EFs) they require.
//!
//! A [`Task`] names the elements of the device (`"E<index>" -> name`) and lists
//! its elemental functions in order. Every EF carries a closed [`EfType`] tag and
//! a behaviour table saying which elements receive effort and which must move.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    // element ids follow the fixed "E<index>" convention
    static ref ELEMENT_ID: Regex = Regex::new(r"^E(\d+)$").expect("element id pattern");
    static ref EF_ID: Regex = Regex::new(r"^(.*?)(\d+)$").expect("ef id pattern");
}

/// Parses an `E<index>` element id into its index.
pub fn element_index(element: &str) -> Option<usize> {
    ELEMENT_ID
        .captures(element)
        .and_then(|captures| captures[1].parse().ok())
}

// ------------- EfId -------------
/// Identifier of an elemental function. Ids order naturally, so `EF2` comes
/// before `EF10`; this is the order in which unsatisfied EFs are attempted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EfId(String);

impl EfId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
    fn natural_key(&self) -> (&str, Option<u64>) {
        match EF_ID.captures(&self.0) {
            Some(captures) => {
                let prefix = captures.get(1).map_or("", |m| m.as_str());
                (prefix, captures[2].parse().ok())
            }
            None => (self.0.as_str(), None),
        }
    }
}
impl Ord for EfId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.natural_key()
            .cmp(&other.natural_key())
            .then_with(|| self.0.cmp(&other.0))
    }
}
impl PartialOrd for EfId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl fmt::Display for EfId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl From<&str> for EfId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// ------------- EfType -------------
/// The closed set of elemental function types. Tags that are not recognised
/// are kept verbatim in [`EfType::Unknown`] and always pass validation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EfType {
    /// `Type-1.1`: effort in on one element, motion out on another.
    EffortMotion,
    /// `Type-1.2`: like `Type-1.1` with a variable input.
    VariableInput,
    /// `Type-2`: a constraint, realised by a stopper.
    Stopper,
    /// `Type-3`: a return, realised by a spring.
    ReturnSpring,
    Unknown(String),
}

impl EfType {
    pub fn as_str(&self) -> &str {
        match self {
            EfType::EffortMotion => "Type-1.1",
            EfType::VariableInput => "Type-1.2",
            EfType::Stopper => "Type-2",
            EfType::ReturnSpring => "Type-3",
            EfType::Unknown(tag) => tag,
        }
    }
}
impl From<String> for EfType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "Type-1.1" => EfType::EffortMotion,
            "Type-1.2" => EfType::VariableInput,
            "Type-2" => EfType::Stopper,
            "Type-3" => EfType::ReturnSpring,
            _ => EfType::Unknown(tag),
        }
    }
}
impl From<&str> for EfType {
    fn from(tag: &str) -> Self {
        EfType::from(tag.to_string())
    }
}
impl From<EfType> for String {
    fn from(ef_type: EfType) -> String {
        ef_type.as_str().to_string()
    }
}
impl fmt::Display for EfType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ------------- Behavior -------------
pub const ABSENT: &str = "0";

fn absent() -> String {
    ABSENT.to_string()
}

/// One row of an EF's behaviour table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Behavior {
    pub element: String,
    #[serde(default = "absent")]
    pub effort: String,
    #[serde(default = "absent")]
    pub motion: String,
}

impl Behavior {
    pub fn new(element: &str, effort: &str, motion: &str) -> Self {
        Self {
            element: element.to_string(),
            effort: effort.to_string(),
            motion: motion.to_string(),
        }
    }
    pub fn has_effort(&self) -> bool {
        self.effort != ABSENT
    }
    pub fn has_motion(&self) -> bool {
        self.motion != ABSENT
    }
}

// ------------- ElementalFunction -------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementalFunction {
    pub ef_id: EfId,
    #[serde(rename = "type")]
    pub ef_type: EfType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub behavior: Vec<Behavior>,
}

impl ElementalFunction {
    pub fn new(ef_id: &str, ef_type: EfType, description: &str, behavior: Vec<Behavior>) -> Self {
        Self {
            ef_id: EfId::new(ef_id),
            ef_type,
            description: description.to_string(),
            behavior,
        }
    }
}

// ------------- Task -------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(alias = "name")]
    pub task_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub elements: BTreeMap<String, String>,
    #[serde(default)]
    pub elemental_functions: Vec<ElementalFunction>,
}

impl Task {
    pub fn new(task_name: &str) -> Self {
        Self {
            task_name: task_name.to_string(),
            description: String::new(),
            elements: BTreeMap::new(),
            elemental_functions: Vec::new(),
        }
    }
    pub fn with_element(mut self, id: &str, name: &str) -> Self {
        self.elements.insert(id.to_string(), name.to_string());
        self
    }
    pub fn with_ef(mut self, ef: ElementalFunction) -> Self {
        self.elemental_functions.push(ef);
        self
    }
    /// The EF a search is seeded with: the first one listed.
    pub fn first_ef(&self) -> Option<&ElementalFunction> {
        self.elemental_functions.first()
    }
    pub fn ef(&self, ef_id: &EfId) -> Option<&ElementalFunction> {
        self.elemental_functions.iter().find(|ef| &ef.ef_id == ef_id)
    }
    pub fn ef_ids(&self) -> impl Iterator<Item = &EfId> {
        self.elemental_functions.iter().map(|ef| &ef.ef_id)
    }
    /// Element ids that follow the `E<index>` convention, with their index.
    pub fn indexed_elements(&self) -> BTreeMap<&str, usize> {
        self.elements
            .keys()
            .filter_map(|id| element_index(id).map(|index| (id.as_str(), index)))
            .collect()
    }
    pub fn element_name(&self, element: &str) -> Option<&str> {
        self.elements.get(element).map(String::as_str)
    }
}
