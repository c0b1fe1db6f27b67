//! Builder para `Scenario`.
//!
//! ```ignore
//! let scenario = Scenario::builder("counter", Counter { count: 0 })
//!     .title("3-step counter")
//!     .intro("Ready", "Press next to count.")
//!     .step(step("inc_1", inc))
//!     .step(step("inc_2", inc))
//!     .build();
//! ```

use crate::step::{Narration, StepDefinition};

use super::Scenario;

pub struct ScenarioBuilder<B> {
    id: String,
    title: Option<String>,
    intro: Option<Narration>,
    initial_bag: B,
    steps: Vec<Box<dyn StepDefinition<B>>>,
    dataset_hash: Option<String>,
}

impl<B> ScenarioBuilder<B> {
    pub(crate) fn new(id: impl Into<String>, initial_bag: B) -> Self {
        Self { id: id.into(),
               title: None,
               intro: None,
               initial_bag,
               steps: Vec::new(),
               dataset_hash: None }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Narración previa al primer paso (título y descripción de bienvenida).
    pub fn intro(mut self, title: impl Into<String>, text: impl Into<String>) -> Self {
        self.intro = Some(Narration::new(title, text));
        self
    }

    /// Hash del dataset fijo del escenario; entra en `scenario_hash`.
    pub fn dataset_hash(mut self, hash: impl Into<String>) -> Self {
        self.dataset_hash = Some(hash.into());
        self
    }

    pub fn step<S>(mut self, step: S) -> Self
        where S: StepDefinition<B> + 'static
    {
        self.steps.push(Box::new(step));
        self
    }

    pub fn boxed_step(mut self, step: Box<dyn StepDefinition<B>>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn steps<I>(mut self, steps: I) -> Self
        where I: IntoIterator<Item = Box<dyn StepDefinition<B>>>
    {
        self.steps.extend(steps);
        self
    }

    pub fn build(self) -> Scenario<B> {
        let title = self.title.unwrap_or_else(|| self.id.clone());
        let intro = self.intro
                        .unwrap_or_else(|| Narration::new("Ready", "Press next to begin."));
        Scenario::from_parts(self.id, title, intro, self.initial_bag, self.steps, self.dataset_hash)
    }
}
