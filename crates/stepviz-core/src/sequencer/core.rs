//! Motor con journal y cola de presentación.

use log::{debug, info, warn};
use serde_json::json;
use uuid::Uuid;

use crate::constants::ENGINE_VERSION;
use crate::errors::SequencerError;
use crate::event::{InMemoryJournal, SequencerEvent, SequencerEventKind, SequencerJournal};
use crate::hashing::{hash_serializable, hash_str, hash_value};
use crate::presentation::{CueHandle, FiredCue, PresentationQueue};
use crate::scenario::Scenario;
use crate::step::StateBag;

use super::SequencerState;

/// Secuenciador de una sesión.
///
/// Responsable de avanzar el escenario de a un paso, registrar cada
/// transición en el journal con su fingerprint y programar los cues
/// cosméticos del paso aplicado. El estado autoritativo sólo cambia en
/// `advance`, `reset` y `reset_with`.
pub struct StepSequencer<B, J = InMemoryJournal>
    where B: StateBag,
          J: SequencerJournal
{
    scenario: Scenario<B>,
    state: SequencerState<B>,
    journal: J,
    cues: PresentationQueue,
    session_id: Uuid,
    step_fingerprints: Vec<String>,
    ignored_advances: u64,
}

impl<B: StateBag> StepSequencer<B, InMemoryJournal> {
    /// `create` con journal en memoria.
    pub fn create(scenario: Scenario<B>) -> Result<Self, SequencerError> {
        Self::with_journal(scenario, InMemoryJournal::default())
    }
}

impl<B, J> StepSequencer<B, J>
    where B: StateBag,
          J: SequencerJournal
{
    /// `create` con un journal provisto por el llamador.
    pub fn with_journal(scenario: Scenario<B>, journal: J) -> Result<Self, SequencerError> {
        let state = scenario.create_state()?;
        let mut seq = Self { scenario,
                             state,
                             journal,
                             cues: PresentationQueue::new(),
                             session_id: Uuid::new_v4(),
                             step_fingerprints: Vec::new(),
                             ignored_advances: 0 };
        seq.start_session(None);
        Ok(seq)
    }

    fn start_session(&mut self, reset_from_step_index: Option<isize>) {
        info!("session {} started for scenario '{}' ({} steps)",
              self.session_id,
              self.scenario.id(),
              self.scenario.len());
        self.journal.append_kind(self.session_id,
                                 SequencerEventKind::SessionStarted { scenario_id: self.scenario.id().to_string(),
                                                                      scenario_hash: self.scenario
                                                                                         .scenario_hash()
                                                                                         .to_string(),
                                                                      step_count: self.scenario.len(),
                                                                      reset_from_step_index });
    }

    pub fn scenario(&self) -> &Scenario<B> {
        &self.scenario
    }

    pub fn state(&self) -> &SequencerState<B> {
        &self.state
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn journal(&self) -> &J {
        &self.journal
    }

    pub fn presentation(&self) -> &PresentationQueue {
        &self.cues
    }

    /// Avanza un paso. Con la sesión terminada es un no-op: ni el estado ni el
    /// journal cambian; sólo sube `ignored_advances`.
    pub fn advance(&mut self) -> &SequencerState<B> {
        match self.scenario.advance_in_place(&mut self.state) {
            Some(index) => self.after_step(index),
            None => {
                self.ignored_advances = self.ignored_advances.saturating_add(1);
                debug!("session {}: advance ignored, scenario already finished", self.session_id);
            }
        }
        &self.state
    }

    /// Avances recibidos con la sesión actual ya terminada.
    pub fn ignored_advances(&self) -> u64 {
        self.ignored_advances
    }

    fn after_step(&mut self, index: usize) {
        let Some(step) = self.scenario.step_at(index) else {
            return;
        };
        let step_id = step.id().to_string();
        let tag = step.tag();
        let cues = step.cues(self.state.state_bag());

        let bag_hash = self.bag_hash();
        let fingerprint = hash_value(&json!({
                                         "engine_version": ENGINE_VERSION,
                                         "scenario_hash": self.scenario.scenario_hash(),
                                         "step_index": index,
                                         "step_id": step_id,
                                         "bag_hash": bag_hash,
                                     }));
        self.step_fingerprints.push(fingerprint.clone());
        self.journal.append_kind(self.session_id,
                                 SequencerEventKind::StepApplied { step_index: index,
                                                                   step_id,
                                                                   tag,
                                                                   bag_hash,
                                                                   fingerprint });

        for cue in cues {
            self.cues.schedule(index, cue);
        }

        if self.state.is_finished() {
            let run_fingerprint = hash_value(&json!({
                                                 "engine_version": ENGINE_VERSION,
                                                 "scenario_hash": self.scenario.scenario_hash(),
                                                 "step_fingerprints": self.step_fingerprints,
                                             }));
            info!("session {} finished scenario '{}'", self.session_id, self.scenario.id());
            self.journal
                .append_kind(self.session_id, SequencerEventKind::SessionFinished { run_fingerprint });
        }
    }

    fn bag_hash(&self) -> String {
        match hash_serializable(self.state.state_bag()) {
            Ok(h) => h,
            Err(e) => {
                // Un bag no representable en JSON no debe romper `advance`.
                warn!("state bag of scenario '{}' not serializable ({e}); hashing Debug output",
                      self.scenario.id());
                hash_str(&format!("{:?}", self.state.state_bag()))
            }
        }
    }

    /// Avanza hasta `n` pasos; se detiene antes si el escenario termina.
    pub fn run_n(&mut self, n: usize) -> &SequencerState<B> {
        for _ in 0..n {
            if self.state.is_finished() {
                break;
            }
            self.advance();
        }
        &self.state
    }

    /// Avanza hasta el paso terminal.
    pub fn run_to_completion(&mut self) -> &SequencerState<B> {
        while !self.state.is_finished() {
            self.advance();
        }
        &self.state
    }

    /// Vuelve al estado inicial del mismo escenario, descartando los cues
    /// pendientes. Los eventos de la sesión anterior se descartan del journal.
    pub fn reset(&mut self) -> &SequencerState<B> {
        // El escenario ya fue validado al crear el secuenciador.
        let fresh = SequencerState::initial(self.scenario.initial_bag().clone(),
                                            self.scenario.intro().clone(),
                                            self.scenario.len());
        self.replace_session(fresh);
        &self.state
    }

    /// Reemplaza el escenario y reinicia. Si `scenario` es inválido el
    /// secuenciador queda exactamente como estaba.
    pub fn reset_with(&mut self, scenario: Scenario<B>) -> Result<&SequencerState<B>, SequencerError> {
        let fresh = scenario.create_state()?;
        self.scenario = scenario;
        self.replace_session(fresh);
        Ok(&self.state)
    }

    fn replace_session(&mut self, fresh: SequencerState<B>) {
        let from_step_index = self.state.current_step_index();
        let dropped_cues = self.cues.flush();
        let dropped_events = self.journal.discard(self.session_id);
        debug!("session {} reset at step {} ({} cues, {} events dropped)",
               self.session_id, from_step_index, dropped_cues, dropped_events);
        self.state = fresh;
        self.step_fingerprints.clear();
        self.ignored_advances = 0;
        self.session_id = Uuid::new_v4();
        self.start_session(Some(from_step_index));
    }

    /// Avanza el reloj de presentación y devuelve los cues vencidos.
    pub fn tick(&mut self, elapsed_ms: u64) -> Vec<FiredCue> {
        self.cues.tick(elapsed_ms)
    }

    /// Cancela un cue concreto de la sesión actual.
    pub fn cancel_cue(&mut self, handle: CueHandle) -> bool {
        self.cues.cancel(handle)
    }

    /// Eventos de la sesión actual.
    pub fn events(&self) -> Vec<SequencerEvent> {
        self.journal.list(self.session_id)
    }

    /// Variante compacta de eventos de la sesión actual.
    pub fn event_variants(&self) -> Vec<&'static str> {
        self.events()
            .iter()
            .map(|e| match e.kind {
                SequencerEventKind::SessionStarted { .. } => "I",
                SequencerEventKind::StepApplied { .. } => "A",
                SequencerEventKind::SessionFinished { .. } => "C",
            })
            .collect()
    }

    /// Fingerprints de los pasos aplicados en la sesión actual, en orden.
    pub fn step_fingerprints(&self) -> &[String] {
        &self.step_fingerprints
    }

    /// Fingerprint de la corrida si la sesión actual terminó.
    pub fn run_fingerprint(&self) -> Option<String> {
        self.events().iter().rev().find_map(|e| match &e.kind {
                                      SequencerEventKind::SessionFinished { run_fingerprint } => {
                                          Some(run_fingerprint.clone())
                                      }
                                      _ => None,
                                  })
    }
}
