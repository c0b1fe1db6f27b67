//! Eventos cosméticos de presentación.
//!
//! Los pasos pueden pedir que ciertos sub-eventos se revelen con retraso
//! ("mostrar la fila 3 a los 800 ms"). Se modelan como una cola de cues
//! programados sobre un reloj virtual en milisegundos que avanza el host con
//! `tick`. La cola nunca toca el estado autoritativo del secuenciador; al
//! resetear se vacía y sube de generación para que ningún handle viejo dispare.

mod cue;
mod queue;

pub use cue::{Cue, CueHandle, FiredCue};
pub use queue::PresentationQueue;
