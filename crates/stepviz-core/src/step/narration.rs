use serde::{Deserialize, Serialize};

/// Texto explicativo del último paso aplicado.
///
/// `label` ("Ready", "Step 2 of 7", "Complete") lo fija el secuenciador a
/// partir del índice; los pasos sólo aportan `title` y `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narration {
    pub label: String,
    pub title: String,
    pub text: String,
}

impl Narration {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self { label: String::new(),
               title: title.into(),
               text: text.into() }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}
