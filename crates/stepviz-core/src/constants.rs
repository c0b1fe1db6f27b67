//! Constantes del secuenciador.
//!
//! `ENGINE_VERSION` forma parte del input de los fingerprints: cambiarla
//! invalida de forma determinista los fingerprints de corridas anteriores
//! aunque el escenario y el estado no cambien.

/// Versión lógica del secuenciador. Mantener estable mientras no haya cambios
/// incompatibles en la forma de aplicar pasos.
pub const ENGINE_VERSION: &str = "S1.0";

/// Etiqueta de progreso antes de aplicar el primer paso.
pub const READY_LABEL: &str = "Ready";

/// Etiqueta de progreso en el paso terminal.
pub const COMPLETE_LABEL: &str = "Complete";
