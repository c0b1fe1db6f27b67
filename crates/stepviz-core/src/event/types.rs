//! Tipos de evento de una sesión del secuenciador.
//!
//! Rol:
//! - Cada sesión (creación o reset) emite eventos a un `SequencerJournal`
//!   append-only. Al resetear, los eventos de la sesión anterior se descartan.
//! - Los fingerprints de `StepApplied` y `SessionFinished` permiten comprobar
//!   que dos corridas del mismo escenario pasaron por los mismos estados.
//! - `ts` es metadato y nunca entra en un fingerprint.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::step::StepTag;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SequencerEventKind {
    /// Primer evento de toda sesión. `reset_from_step_index` es `Some` cuando
    /// la sesión nace de un reset (-1 si la anterior no había empezado).
    SessionStarted {
        scenario_id: String,
        scenario_hash: String,
        step_count: usize,
        reset_from_step_index: Option<isize>,
    },
    /// Un paso se aplicó; `bag_hash` es el hash del bag resultante.
    StepApplied {
        step_index: usize,
        step_id: String,
        tag: StepTag,
        bag_hash: String,
        fingerprint: String,
    },
    /// Cierre con fingerprint agregado de la corrida.
    SessionFinished { run_fingerprint: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequencerEvent {
    pub seq: u64, // orden de append dentro de la sesión
    pub session_id: Uuid,
    pub kind: SequencerEventKind,
    pub ts: DateTime<Utc>,
}
