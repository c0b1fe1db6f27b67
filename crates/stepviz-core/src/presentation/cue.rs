use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sub-evento cosmético solicitado por un paso.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    /// Clave que la presentación usa para saber qué revelar.
    pub key: String,
    /// Retraso relativo al momento en que se aplicó el paso.
    pub delay_ms: u64,
    pub payload: Value,
}

impl Cue {
    pub fn new(key: impl Into<String>, delay_ms: u64, payload: Value) -> Self {
        Self { key: key.into(),
               delay_ms,
               payload }
    }

    /// Genera una secuencia de cues espaciados `interval_ms`, uno por payload.
    /// El primero dispara inmediatamente (retraso 0).
    pub fn staggered<I>(key: &str, interval_ms: u64, payloads: I) -> Vec<Cue>
        where I: IntoIterator<Item = Value>
    {
        payloads.into_iter()
                .enumerate()
                .map(|(i, p)| Cue::new(key, interval_ms * i as u64, p))
                .collect()
    }
}

/// Identificador de un cue programado. Incluye la generación de la cola, de
/// modo que un handle obtenido antes de un `flush` ya no coincide con nada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CueHandle {
    pub(crate) generation: u64,
    pub(crate) seq: u64,
}

/// Cue que alcanzó su instante de disparo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiredCue {
    pub step_index: usize,
    pub due_at_ms: u64,
    pub key: String,
    pub payload: Value,
}
