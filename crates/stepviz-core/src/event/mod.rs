//! Definiciones de eventos y trait SequencerJournal.

mod store;
mod types;

pub use store::{InMemoryJournal, SequencerJournal};
pub use types::{SequencerEvent, SequencerEventKind};
