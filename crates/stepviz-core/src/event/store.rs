use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use super::{SequencerEvent, SequencerEventKind};

/// Almacenamiento de eventos append-only, particionado por sesión.
pub trait SequencerJournal {
    /// Agrega un evento a partir de su kind y devuelve el evento completo (con seq y ts).
    fn append_kind(&mut self, session_id: Uuid, kind: SequencerEventKind) -> SequencerEvent;
    /// Lista eventos de una sesión (orden ascendente por seq).
    fn list(&self, session_id: Uuid) -> Vec<SequencerEvent>;
    /// Elimina los eventos de una sesión cerrada. Devuelve cuántos había.
    fn discard(&mut self, session_id: Uuid) -> usize;
}

#[derive(Debug, Default)]
pub struct InMemoryJournal {
    pub inner: HashMap<Uuid, Vec<SequencerEvent>>,
}

impl SequencerJournal for InMemoryJournal {
    fn append_kind(&mut self, session_id: Uuid, kind: SequencerEventKind) -> SequencerEvent {
        let events = self.inner.entry(session_id).or_default();
        let ev = SequencerEvent { seq: events.len() as u64,
                                  session_id,
                                  kind,
                                  ts: Utc::now() };
        events.push(ev.clone());
        ev
    }

    fn list(&self, session_id: Uuid) -> Vec<SequencerEvent> {
        self.inner.get(&session_id).cloned().unwrap_or_default()
    }

    fn discard(&mut self, session_id: Uuid) -> usize {
        self.inner.remove(&session_id).map_or(0, |events| events.len())
    }
}

impl InMemoryJournal {
    /// Cantidad de sesiones con eventos retenidos.
    pub fn session_count(&self) -> usize {
        self.inner.len()
    }

    /// Total de eventos retenidos entre todas las sesiones.
    pub fn event_count(&self) -> usize {
        self.inner.values().map(Vec::len).sum()
    }
}
