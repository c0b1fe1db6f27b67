use log::trace;

use super::{Cue, CueHandle, FiredCue};

#[derive(Debug, Clone)]
struct ScheduledCue {
    handle: CueHandle,
    step_index: usize,
    due_at_ms: u64,
    cue: Cue,
}

/// Cola de cues sobre un reloj virtual.
///
/// Orden de disparo: por `due_at_ms` y, a igualdad, por orden de programación.
#[derive(Debug, Default)]
pub struct PresentationQueue {
    now_ms: u64,
    generation: u64,
    next_seq: u64,
    pending: Vec<ScheduledCue>,
}

impl PresentationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instante actual del reloj virtual.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Programa `cue` para `now + cue.delay_ms`.
    pub fn schedule(&mut self, step_index: usize, cue: Cue) -> CueHandle {
        let handle = CueHandle { generation: self.generation,
                                 seq: self.next_seq };
        self.next_seq += 1;
        let due_at_ms = self.now_ms.saturating_add(cue.delay_ms);
        trace!("cue scheduled: key={} step={} due_at={}ms", cue.key, step_index, due_at_ms);
        self.pending.push(ScheduledCue { handle,
                                         step_index,
                                         due_at_ms,
                                         cue });
        handle
    }

    /// Cancela un cue pendiente. Devuelve `false` si ya disparó, ya fue
    /// cancelado o pertenece a una generación anterior.
    pub fn cancel(&mut self, handle: CueHandle) -> bool {
        match self.pending.iter().position(|s| s.handle == handle) {
            Some(pos) => {
                self.pending.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Avanza el reloj y devuelve los cues vencidos, en orden de disparo.
    pub fn tick(&mut self, elapsed_ms: u64) -> Vec<FiredCue> {
        self.now_ms = self.now_ms.saturating_add(elapsed_ms);
        let now = self.now_ms;
        let (mut due, rest): (Vec<ScheduledCue>, Vec<ScheduledCue>) =
            std::mem::take(&mut self.pending).into_iter().partition(|s| s.due_at_ms <= now);
        self.pending = rest;
        due.sort_by_key(|s| (s.due_at_ms, s.handle.seq));
        due.into_iter()
           .map(|s| FiredCue { step_index: s.step_index,
                               due_at_ms: s.due_at_ms,
                               key: s.cue.key,
                               payload: s.cue.payload })
           .collect()
    }

    /// Descarta todos los cues pendientes, reinicia el reloj y cambia de
    /// generación. Devuelve cuántos cues se descartaron.
    pub fn flush(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        self.now_ms = 0;
        self.generation += 1;
        if dropped > 0 {
            trace!("presentation queue flushed: {} cues dropped", dropped);
        }
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fires_in_due_order_then_schedule_order() {
        let mut q = PresentationQueue::new();
        q.schedule(0, Cue::new("late", 800, json!(1)));
        q.schedule(0, Cue::new("first", 0, json!(2)));
        q.schedule(1, Cue::new("also_late", 800, json!(3)));

        let fired = q.tick(0);
        assert_eq!(fired.iter().map(|f| f.key.as_str()).collect::<Vec<_>>(), vec!["first"]);

        assert!(q.tick(799).is_empty());
        let fired = q.tick(1);
        assert_eq!(fired.iter().map(|f| f.key.as_str()).collect::<Vec<_>>(), vec!["late", "also_late"]);
        assert!(q.is_idle());
    }

    #[test]
    fn cancelled_cue_never_fires() {
        let mut q = PresentationQueue::new();
        let h = q.schedule(0, Cue::new("row", 400, json!(null)));
        assert!(q.cancel(h));
        assert!(!q.cancel(h));
        assert!(q.tick(1_000).is_empty());
    }

    #[test]
    fn flush_invalidates_old_handles() {
        let mut q = PresentationQueue::new();
        let old = q.schedule(0, Cue::new("row", 400, json!(null)));
        q.tick(100);
        assert_eq!(q.flush(), 1);
        assert_eq!(q.now_ms(), 0);

        let fresh = q.schedule(0, Cue::new("row", 400, json!(null)));
        assert_ne!(old, fresh);
        assert!(!q.cancel(old));
        assert_eq!(q.tick(400).len(), 1);
    }
}
