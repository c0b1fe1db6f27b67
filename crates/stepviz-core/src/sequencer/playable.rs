//! Superficie type-erased para la capa de presentación.
//!
//! Cada escenario tiene su propio tipo de bag, así que un host que navega
//! entre escenarios los maneja como `Box<dyn Playable>` y lee `Frame`s.

use serde::Serialize;
use serde_json::Value;

use crate::event::SequencerJournal;
use crate::presentation::FiredCue;
use crate::step::{Highlight, Narration, StateBag, StepTag};

use super::StepSequencer;

/// Instantánea de lo que la presentación necesita dibujar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub scenario_id: String,
    pub scenario_title: String,
    pub step_index: isize,
    pub step_count: usize,
    pub step_id: Option<String>,
    pub progress_label: String,
    pub is_finished: bool,
    pub narration: Narration,
    pub tag: Option<StepTag>,
    pub highlights: Vec<Highlight>,
    pub bag: Value,
}

pub trait Playable {
    fn scenario_id(&self) -> &str;
    fn advance(&mut self);
    fn reset(&mut self);
    fn is_finished(&self) -> bool;
    fn tick(&mut self, elapsed_ms: u64) -> Vec<FiredCue>;
    /// Cues programados que aún no dispararon.
    fn pending_cues(&self) -> usize;
    fn frame(&self) -> Frame;
    fn run_fingerprint(&self) -> Option<String>;
}

impl<B, J> Playable for StepSequencer<B, J>
    where B: StateBag,
          J: SequencerJournal
{
    fn scenario_id(&self) -> &str {
        self.scenario().id()
    }

    fn advance(&mut self) {
        StepSequencer::advance(self);
    }

    fn reset(&mut self) {
        StepSequencer::reset(self);
    }

    fn is_finished(&self) -> bool {
        self.state().is_finished()
    }

    fn tick(&mut self, elapsed_ms: u64) -> Vec<FiredCue> {
        StepSequencer::tick(self, elapsed_ms)
    }

    fn pending_cues(&self) -> usize {
        self.presentation().pending_len()
    }

    fn frame(&self) -> Frame {
        let scenario = self.scenario();
        let state = self.state();
        let current = state.cursor().and_then(|i| scenario.step_at(i));
        Frame { scenario_id: scenario.id().to_string(),
                scenario_title: scenario.title().to_string(),
                step_index: state.current_step_index(),
                step_count: state.step_count(),
                step_id: current.map(|s| s.id().to_string()),
                progress_label: scenario.progress_label(state.cursor()),
                is_finished: state.is_finished(),
                narration: state.narration().clone(),
                tag: current.map(|s| s.tag()),
                highlights: current.map(|s| s.highlights()).unwrap_or_default(),
                bag: serde_json::to_value(state.state_bag()).unwrap_or(Value::Null) }
    }

    fn run_fingerprint(&self) -> Option<String> {
        StepSequencer::run_fingerprint(self)
    }
}
