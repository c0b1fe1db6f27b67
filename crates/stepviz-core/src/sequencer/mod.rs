//! Secuenciador de pasos.
//!
//! Provee el estado observable (`SequencerState`), el motor con journal y cola
//! de presentación (`StepSequencer`) y la superficie type-erased (`Playable`,
//! `Frame`) para hosts que manejan escenarios heterogéneos.

pub mod core;
pub mod playable;
mod state;

pub use self::core::StepSequencer;
pub use playable::{Frame, Playable};
pub use state::SequencerState;
