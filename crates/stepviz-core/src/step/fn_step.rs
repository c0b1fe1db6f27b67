//! Adaptador para declarar pasos con closures, sin definir un struct por paso.
//!
//! ```ignore
//! let s = step("seed", |bag: &Counter| StepOutcome::new(Counter { count: bag.count + 1 }, "Seed", "+1"))
//!     .tagged(StepTag::Anchor)
//!     .highlight(Highlight::lines("sql", [2, 3]));
//! ```

use std::fmt;

use super::{Highlight, StepDefinition, StepOutcome, StepTag};
use crate::presentation::Cue;

type ApplyFn<B> = Box<dyn Fn(&B) -> StepOutcome<B>>;
type CuesFn<B> = Box<dyn Fn(&B) -> Vec<Cue>>;

pub struct FnStep<B> {
    id: String,
    name: Option<String>,
    tag: StepTag,
    highlights: Vec<Highlight>,
    apply: ApplyFn<B>,
    cues: Option<CuesFn<B>>,
}

/// Crea un `FnStep` con el id y la transformación indicados.
pub fn step<B, F>(id: impl Into<String>, apply: F) -> FnStep<B>
    where F: Fn(&B) -> StepOutcome<B> + 'static
{
    FnStep { id: id.into(),
             name: None,
             tag: StepTag::Neutral,
             highlights: Vec::new(),
             apply: Box::new(apply),
             cues: None }
}

impl<B> FnStep<B> {
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn tagged(mut self, tag: StepTag) -> Self {
        self.tag = tag;
        self
    }

    pub fn highlight(mut self, highlight: Highlight) -> Self {
        self.highlights.push(highlight);
        self
    }

    pub fn with_cues<F>(mut self, cues: F) -> Self
        where F: Fn(&B) -> Vec<Cue> + 'static
    {
        self.cues = Some(Box::new(cues));
        self
    }
}

impl<B> StepDefinition<B> for FnStep<B> {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    fn tag(&self) -> StepTag {
        self.tag.clone()
    }

    fn highlights(&self) -> Vec<Highlight> {
        self.highlights.clone()
    }

    fn apply(&self, bag: &B) -> StepOutcome<B> {
        (self.apply)(bag)
    }

    fn cues(&self, bag: &B) -> Vec<Cue> {
        self.cues.as_ref().map(|f| f(bag)).unwrap_or_default()
    }
}

impl<B> fmt::Debug for FnStep<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnStep")
         .field("id", &self.id)
         .field("tag", &self.tag)
         .field("highlights", &self.highlights)
         .finish_non_exhaustive()
    }
}
