//! Errores específicos del core.
//!
//! El secuenciador sólo puede fallar al construirse: `advance` es total.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum SequencerError {
    /// El escenario no puede ejecutarse (lista de pasos vacía, ids repetidos).
    #[error("invalid scenario: {0}")]
    InvalidScenario(String),
}
