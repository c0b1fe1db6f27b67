use std::fmt::Debug;

use serde::Serialize;

use super::{Highlight, StepOutcome, StepTag};
use crate::presentation::Cue;

/// Cotas que el secuenciador exige al state bag de un escenario.
///
/// `Clone` permite volver al estado inicial en `reset`; `Serialize` alimenta
/// los fingerprints y los frames que consume la capa de presentación.
pub trait StateBag: Clone + Serialize + Debug {}

impl<T> StateBag for T where T: Clone + Serialize + Debug {}

/// Trait que define un Step. Implementaciones deben ser puras respecto al bag
/// recibido: mismo bag de entrada, mismo resultado.
pub trait StepDefinition<B> {
    /// Identificador estable y único dentro del escenario.
    fn id(&self) -> &str;

    /// Nombre opcional amigable.
    fn name(&self) -> &str {
        self.id()
    }

    /// Categoría usada para el código de colores.
    fn tag(&self) -> StepTag {
        StepTag::Neutral
    }

    /// Regiones visuales a resaltar mientras este paso es el actual.
    fn highlights(&self) -> Vec<Highlight> {
        Vec::new()
    }

    /// Aplica el paso. Sólo puede depender de `bag` y de la propia definición.
    fn apply(&self, bag: &B) -> StepOutcome<B>;

    /// Eventos cosméticos a programar tras aplicar el paso (`bag` ya es el
    /// resultado de `apply`). No afectan al estado autoritativo.
    fn cues(&self, _bag: &B) -> Vec<Cue> {
        Vec::new()
    }
}
