//! Registro ordenado de escenarios. El host abre cada uno por id y recibe un
//! `Box<dyn Playable>`, sin conocer el tipo de bag concreto.
use std::fmt;

use indexmap::IndexMap;
use stepviz_core::{Playable, Scenario, StateBag, StepSequencer};
use stepviz_domain::{CountMode, FillMethod, IndexStrategy, JoinKind, PruningPredicate, WindowFunc};

use crate::{asof_join, concurrency, counter, gap_fill, index_seek, joins, null_semantics, partition_pruning, recursive_cte,
            window_functions, ScenarioError};

pub const DEFAULT_PREDICATE: &str = "equals:2024-01-15";

/// Parámetros de los escenarios parametrizables. Los que no aplican a un
/// escenario se ignoran.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioOptions {
    pub key: u32,
    pub strategy: IndexStrategy,
    pub predicate: Option<PruningPredicate>,
    pub join: JoinKind,
    pub fill: FillMethod,
    pub window: WindowFunc,
    pub partitioned: bool,
    pub count: CountMode,
}

impl Default for ScenarioOptions {
    fn default() -> Self {
        Self { key: 8,
               strategy: IndexStrategy::Clustered,
               predicate: None,
               join: JoinKind::Inner,
               fill: FillMethod::LastValue,
               window: WindowFunc::RowNumber,
               partitioned: false,
               count: CountMode::Column }
    }
}

impl ScenarioOptions {
    /// Aplica una opción `name=value` recibida como texto.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), ScenarioError> {
        let invalid = |reason: String| ScenarioError::InvalidOption { name: name.to_string(),
                                                                      reason };
        match name {
            "key" => self.key = value.parse().map_err(|e| invalid(format!("{e}")))?,
            "strategy" => self.strategy = IndexStrategy::parse(value).map_err(|e| invalid(e.to_string()))?,
            "predicate" => self.predicate = Some(PruningPredicate::parse(value).map_err(|e| invalid(e.to_string()))?),
            "join" => self.join = JoinKind::parse(value).map_err(|e| invalid(e.to_string()))?,
            "fill" => self.fill = FillMethod::parse(value).map_err(|e| invalid(e.to_string()))?,
            "window" => self.window = WindowFunc::parse(value).map_err(|e| invalid(e.to_string()))?,
            "partition" => self.partitioned = value.parse().map_err(|e| invalid(format!("{e}")))?,
            "count" => self.count = CountMode::parse(value).map_err(|e| invalid(e.to_string()))?,
            _ => return Err(invalid("unknown option".to_string())),
        }
        Ok(())
    }

    fn predicate_or_default(&self) -> Result<PruningPredicate, ScenarioError> {
        match self.predicate {
            Some(p) => Ok(p),
            None => Ok(PruningPredicate::parse(DEFAULT_PREDICATE)?),
        }
    }
}

pub type ScenarioFactory = fn(&ScenarioOptions) -> Result<Box<dyn Playable>, ScenarioError>;

#[derive(Clone)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub title: &'static str,
    pub factory: ScenarioFactory,
}

impl fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogEntry")
         .field("id", &self.id)
         .field("title", &self.title)
         .finish_non_exhaustive()
    }
}

fn playable<B>(scenario: Scenario<B>) -> Result<Box<dyn Playable>, ScenarioError>
    where B: StateBag + 'static
{
    Ok(Box::new(StepSequencer::create(scenario)?))
}

#[derive(Debug, Clone)]
pub struct Catalog {
    entries: IndexMap<&'static str, CatalogEntry>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self { entries: IndexMap::new() }
    }

    /// Escenarios incluidos, en orden de presentación.
    pub fn builtin() -> Self {
        let mut c = Self::empty();
        c.register("counter", "3-step counter", |_| playable(counter::three_step_counter()));
        c.register("recursive_one_hop", "Recursive CTE: one hop", |_| playable(recursive_cte::one_hop()));
        c.register("recursive_cte", "Recursive CTE: BOM explosion", |_| playable(recursive_cte::bom_explosion()));
        c.register("index_seek", "Index seek vs. table scan", |o| playable(index_seek::scenario(o.key, o.strategy)));
        c.register("partition_pruning", "Micro-partition pruning", |o| {
             playable(partition_pruning::scenario(o.predicate_or_default()?))
         });
        c.register("joins", "SQL joins and NULL", |o| playable(joins::scenario(o.join)));
        c.register("asof_join", "ASOF JOIN: trades and quotes", |_| playable(asof_join::scenario()));
        c.register("gap_fill", "Time-series gap filling", |o| playable(gap_fill::scenario(o.fill)));
        c.register("mvcc", "MVCC: readers never block writers", |_| playable(concurrency::mvcc()));
        c.register("locking", "Row locks: writers wait for writers", |_| playable(concurrency::locking()));
        c.register("deadlock", "Deadlock detection", |_| playable(concurrency::deadlock()));
        c.register("window_functions", "Window functions", |o| {
             playable(window_functions::scenario(o.window, o.partitioned))
         });
        c.register("coalesce", "COALESCE: first non-NULL wins", |_| playable(null_semantics::coalesce()));
        c.register("count_nulls", "COUNT(*) vs COUNT(column)", |o| playable(null_semantics::count(o.count)));
        c
    }

    /// Registra (o reemplaza) un escenario. El orden de inserción se conserva.
    pub fn register(&mut self, id: &'static str, title: &'static str, factory: ScenarioFactory) {
        if self.entries
               .insert(id, CatalogEntry { id, title, factory })
               .is_some()
        {
            log::warn!("escenario '{}' reemplazado en el catálogo", id);
        }
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.entries.keys().copied().collect()
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Construye el escenario `id` y devuelve un secuenciador listo en el
    /// índice -1.
    pub fn open(&self, id: &str, options: &ScenarioOptions) -> Result<Box<dyn Playable>, ScenarioError> {
        let entry = self.get(id)
                        .ok_or_else(|| ScenarioError::UnknownScenario(id.to_string()))?;
        log::info!("abriendo escenario '{}'", entry.id);
        (entry.factory)(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_order_is_stable() {
        let c = Catalog::builtin();
        assert_eq!(c.ids(),
                   vec!["counter",
                        "recursive_one_hop",
                        "recursive_cte",
                        "index_seek",
                        "partition_pruning",
                        "joins",
                        "asof_join",
                        "gap_fill",
                        "mvcc",
                        "locking",
                        "deadlock",
                        "window_functions",
                        "coalesce",
                        "count_nulls"]);
    }

    #[test]
    fn unknown_id_is_an_error() {
        let err = Catalog::builtin().open("nope", &ScenarioOptions::default())
                                    .err()
                                    .expect("unknown id");
        assert!(matches!(err, ScenarioError::UnknownScenario(ref id) if id == "nope"));
    }

    #[test]
    fn options_parse_from_text() {
        let mut o = ScenarioOptions::default();
        o.set("key", "13").unwrap();
        o.set("join", "full").unwrap();
        o.set("fill", "linear").unwrap();
        assert_eq!((o.key, o.join, o.fill), (13, JoinKind::Full, FillMethod::Linear));
        assert!(matches!(o.set("fill", "cubic"), Err(ScenarioError::InvalidOption { .. })));
        o.set("window", "dense_rank").unwrap();
        o.set("partition", "true").unwrap();
        assert_eq!((o.window, o.partitioned), (WindowFunc::DenseRank, true));
        assert!(matches!(o.set("partition", "yes"), Err(ScenarioError::InvalidOption { .. })));
        assert!(matches!(o.set("join", "sideways"), Err(ScenarioError::InvalidOption { .. })));
        assert!(matches!(o.set("colour", "red"), Err(ScenarioError::InvalidOption { .. })));
    }
}
