use stepviz_core::SequencerError;
use stepviz_domain::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("unknown scenario: {0}")]
    UnknownScenario(String),
    #[error("invalid option '{name}': {reason}")]
    InvalidOption { name: String, reason: String },
    #[error(transparent)]
    Sequencer(#[from] SequencerError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}
