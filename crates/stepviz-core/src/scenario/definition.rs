use std::collections::HashSet;
use std::fmt;

use log::debug;
use serde_json::json;

use crate::constants::{COMPLETE_LABEL, READY_LABEL};
use crate::errors::SequencerError;
use crate::hashing::hash_value;
use crate::sequencer::SequencerState;
use crate::step::{Narration, StateBag, StepDefinition};

use super::ScenarioBuilder;

/// Definición inmutable de un escenario.
///
/// Se construye una vez y se comparte entre sesiones. La validación (pasos no
/// vacíos, ids únicos) ocurre al crear un estado, no aquí, para que
/// `create_state` sea el único punto de fallo.
pub struct Scenario<B> {
    id: String,
    title: String,
    intro: Narration,
    initial_bag: B,
    steps: Vec<Box<dyn StepDefinition<B>>>,
    dataset_hash: Option<String>,
    scenario_hash: String,
}

impl<B> Scenario<B> {
    pub fn new(id: impl Into<String>, initial_bag: B, steps: Vec<Box<dyn StepDefinition<B>>>) -> Self {
        let id = id.into();
        let title = id.clone();
        Self::from_parts(id,
                         title,
                         Narration::new("Ready", "Press next to begin."),
                         initial_bag,
                         steps,
                         None)
    }

    pub fn builder(id: impl Into<String>, initial_bag: B) -> ScenarioBuilder<B> {
        ScenarioBuilder::new(id, initial_bag)
    }

    pub(crate) fn from_parts(id: String,
                             title: String,
                             intro: Narration,
                             initial_bag: B,
                             steps: Vec<Box<dyn StepDefinition<B>>>,
                             dataset_hash: Option<String>)
                             -> Self {
        let scenario_hash = compute_scenario_hash(&id, &steps, dataset_hash.as_deref());
        Self { id,
               title,
               intro: intro.with_label(READY_LABEL),
               initial_bag,
               steps,
               dataset_hash,
               scenario_hash }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Narración mostrada antes del primer paso.
    pub fn intro(&self) -> &Narration {
        &self.intro
    }

    pub fn initial_bag(&self) -> &B {
        &self.initial_bag
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn dataset_hash(&self) -> Option<&str> {
        self.dataset_hash.as_deref()
    }

    /// Hash determinista de id, ids de pasos (en orden) y dataset.
    pub fn scenario_hash(&self) -> &str {
        &self.scenario_hash
    }

    pub fn step_at(&self, index: usize) -> Option<&dyn StepDefinition<B>> {
        self.steps.get(index).map(|s| s.as_ref())
    }

    /// Busca un paso por id simbólico y devuelve su índice junto al paso.
    pub fn step_by_id(&self, id: &str) -> Option<(usize, &dyn StepDefinition<B>)> {
        self.steps
            .iter()
            .enumerate()
            .find(|(_, s)| s.id() == id)
            .map(|(i, s)| (i, s.as_ref()))
    }

    pub fn step_ids(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.id()).collect()
    }

    /// Comprueba que el escenario es ejecutable.
    pub fn validate(&self) -> Result<(), SequencerError> {
        if self.steps.is_empty() {
            return Err(SequencerError::InvalidScenario(format!("scenario '{}' has no steps", self.id)));
        }
        let mut seen = HashSet::new();
        for s in &self.steps {
            if !seen.insert(s.id()) {
                return Err(SequencerError::InvalidScenario(format!("scenario '{}' repeats step id '{}'",
                                                                   self.id,
                                                                   s.id())));
            }
        }
        Ok(())
    }

    /// Etiqueta de progreso para un cursor dado: "Ready", "Step k of N" o
    /// "Complete" en el paso terminal.
    pub fn progress_label(&self, cursor: Option<usize>) -> String {
        match cursor {
            None => READY_LABEL.to_string(),
            Some(i) if i + 1 >= self.steps.len() => COMPLETE_LABEL.to_string(),
            Some(i) => format!("Step {} of {}", i + 1, self.steps.len()),
        }
    }
}

impl<B: StateBag> Scenario<B> {
    /// `create`: estado nuevo, sin pasos aplicados. Falla con
    /// `InvalidScenario` sin producir estado parcial.
    pub fn create_state(&self) -> Result<SequencerState<B>, SequencerError> {
        self.validate()?;
        Ok(SequencerState::initial(self.initial_bag.clone(), self.intro.clone(), self.steps.len()))
    }

    /// `reset`: equivalente a `create_state`.
    pub fn reset(&self) -> Result<SequencerState<B>, SequencerError> {
        self.create_state()
    }

    /// `advance` en forma funcional: consume el estado y devuelve el siguiente.
    /// Con el estado terminado devuelve la entrada sin cambios.
    pub fn advance(&self, mut state: SequencerState<B>) -> SequencerState<B> {
        self.advance_in_place(&mut state);
        state
    }

    /// Aplica el siguiente paso sobre `state`. Devuelve el índice aplicado, o
    /// `None` si el estado ya era terminal.
    pub(crate) fn advance_in_place(&self, state: &mut SequencerState<B>) -> Option<usize> {
        if state.is_finished() {
            return None;
        }
        let next = state.cursor().map_or(0, |c| c + 1);
        let step = self.steps.get(next)?;
        let outcome = step.apply(state.state_bag());
        let narration = outcome.narration.with_label(self.progress_label(Some(next)));
        debug!("scenario '{}': applied step {} ({})", self.id, next, step.id());
        state.commit(next, outcome.bag, narration);
        Some(next)
    }
}

impl<B> fmt::Debug for Scenario<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
         .field("id", &self.id)
         .field("title", &self.title)
         .field("steps", &self.step_ids())
         .field("scenario_hash", &self.scenario_hash)
         .finish()
    }
}

fn compute_scenario_hash<B>(id: &str, steps: &[Box<dyn StepDefinition<B>>], dataset_hash: Option<&str>) -> String {
    let ids: Vec<&str> = steps.iter().map(|s| s.id()).collect();
    hash_value(&json!({
                   "scenario_id": id,
                   "step_ids": ids,
                   "dataset_hash": dataset_hash,
               }))
}
