use serde::Serialize;

use crate::step::Narration;

/// Estado propio del secuenciador.
///
/// Invariantes:
/// - `cursor` sólo avanza de a uno (`None -> Some(0) -> ... -> Some(N-1)`) y
///   sólo vuelve a `None` creando un estado nuevo.
/// - `finished` es verdadero sii `cursor == Some(N-1)`.
/// - `narration` corresponde siempre al último paso aplicado.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequencerState<B> {
    cursor: Option<usize>,
    step_count: usize,
    finished: bool,
    narration: Narration,
    state_bag: B,
}

impl<B> SequencerState<B> {
    pub(crate) fn initial(state_bag: B, narration: Narration, step_count: usize) -> Self {
        Self { cursor: None,
               step_count,
               finished: false,
               narration,
               state_bag }
    }

    pub(crate) fn commit(&mut self, index: usize, state_bag: B, narration: Narration) {
        debug_assert_eq!(index, self.cursor.map_or(0, |c| c + 1), "cursor must advance by one");
        self.cursor = Some(index);
        self.state_bag = state_bag;
        self.narration = narration;
        self.finished = index + 1 == self.step_count;
    }

    /// Índice del último paso aplicado; -1 si la sesión no empezó.
    pub fn current_step_index(&self) -> isize {
        self.cursor.map_or(-1, |c| c as isize)
    }

    /// Igual que `current_step_index` pero como `Option`.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn is_started(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn narration(&self) -> &Narration {
        &self.narration
    }

    pub fn state_bag(&self) -> &B {
        &self.state_bag
    }

    pub fn into_state_bag(self) -> B {
        self.state_bag
    }
}
