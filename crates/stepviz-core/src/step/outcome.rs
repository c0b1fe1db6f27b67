use super::Narration;

/// Resultado de aplicar un step: el nuevo bag y su narración.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome<B> {
    pub bag: B,
    pub narration: Narration,
}

impl<B> StepOutcome<B> {
    pub fn new(bag: B, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self { bag,
               narration: Narration::new(title, text) }
    }
}
