use thiserror::Error;

#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),
    #[error("Unknown joint type: {0}")]
    UnknownJointType(String),
    #[error("Element {index} is out of range for a mechanism with {elements} elements")]
    ElementOutOfRange { index: usize, elements: usize },
    #[error("A joint cannot connect element {0} to itself")]
    SelfJoint(usize),
    #[error("Task has no first elemental function to seed the search with")]
    MissingFirstEf,
    #[error("Invalid rule {rule_id}: {message}")]
    InvalidRule { rule_id: String, message: String },
    #[error("Config error: {0}")]
    Config(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Worker failed: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, SynthesisError>;

// Helper conversions
impl From<std::io::Error> for SynthesisError {
    fn from(e: std::io::Error) -> Self { Self::Persistence(e.to_string()) }
}
impl From<serde_json::Error> for SynthesisError {
    fn from(e: serde_json::Error) -> Self { Self::Decode(e.to_string()) }
}
impl From<config::ConfigError> for SynthesisError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
