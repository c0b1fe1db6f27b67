//! Escenario: lista ordenada e inmutable de pasos más el bag inicial.

mod builder;
mod definition;

pub use builder::ScenarioBuilder;
pub use definition::Scenario;
