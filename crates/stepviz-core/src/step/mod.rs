//! Definiciones relacionadas a Steps.
//!
//! Un Step es una transformación pura `(bag) -> (bag', narración)` más
//! metadatos de presentación (tag de color, regiones resaltadas, cues). Este
//! módulo define:
//! - `StepDefinition`: interfaz usada por el secuenciador.
//! - `FnStep` y `step(..)`: adaptador para declarar pasos con closures.
//! - `StepOutcome`, `Narration`, `StepTag`, `Highlight`.

pub mod definition;
mod fn_step;
mod narration;
mod outcome;
mod tag;

pub use definition::{StateBag, StepDefinition};
pub use fn_step::{step, FnStep};
pub use narration::Narration;
pub use outcome::StepOutcome;
pub use tag::{Highlight, StepTag};
