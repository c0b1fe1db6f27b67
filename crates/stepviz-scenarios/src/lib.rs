//! stepviz-scenarios: escenarios didácticos sobre el secuenciador.
//!
//! Cada módulo arma un `Scenario` determinista sobre un dataset fijo de
//! `stepviz-domain`:
//! - `counter`: contador de 3 pasos (ejemplo mínimo del contrato).
//! - `recursive_cte`: explosión de BOM con `WITH RECURSIVE` (una iteración y
//!   la corrida completa de 7 pasos).
//! - `index_seek`: table scan vs. B-tree seek (clustered, non-clustered,
//!   covering).
//! - `partition_pruning`: poda de micro-particiones por zone map.
//! - `joins`: INNER/LEFT/RIGHT/FULL/CROSS con semántica de NULL.
//! - `asof_join`: escáner ASOF de trades contra quotes.
//! - `gap_fill`: relleno de buckets NULL (last value o lineal).
//! - `concurrency`: visibilidad MVCC, espera por lock y deadlock.
//! - `window_functions`: ROW_NUMBER/RANK/DENSE_RANK/LEAD/LAG fila a fila.
//! - `null_semantics`: cascada de COALESCE y COUNT(*) frente a COUNT(col).
//!
//! `Catalog` los registra por id para que un host los abra como
//! `Box<dyn Playable>`.

pub mod asof_join;
pub mod catalog;
pub mod concurrency;
pub mod counter;
pub mod error;
pub mod gap_fill;
pub mod index_seek;
pub mod joins;
pub mod null_semantics;
pub mod partition_pruning;
pub mod recursive_cte;
pub mod window_functions;

pub use catalog::{Catalog, CatalogEntry, ScenarioOptions};
pub use error::ScenarioError;
