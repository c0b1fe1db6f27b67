//! Poda de micro-particiones: el optimizador lee sólo el zone map (MIN/MAX)
//! de cada partición y descarta las que no pueden contener filas del filtro.
use serde::Serialize;
use serde_json::json;
use stepviz_core::{step, Cue, Highlight, Scenario, StepDefinition, StepOutcome, StepTag};
use stepviz_domain::{MicroPartition, PartitionSet, PruningPredicate, PruningStats};

pub const SUMMARY_CUE_INTERVAL_MS: u64 = 400;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionDecision {
    pub id: u32,
    pub label: String,
    pub scanned: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PruningBag {
    pub predicate: PruningPredicate,
    pub decisions: Vec<PartitionDecision>,
    /// Se completa en el paso de resumen.
    pub stats: Option<PruningStats>,
}

#[derive(Debug)]
struct ZoneMapCheck {
    id: String,
    partition: MicroPartition,
    scanned: bool,
}

impl StepDefinition<PruningBag> for ZoneMapCheck {
    fn id(&self) -> &str {
        &self.id
    }

    fn tag(&self) -> StepTag {
        if self.scanned {
            StepTag::Scan
        } else {
            StepTag::Prune
        }
    }

    fn highlights(&self) -> Vec<Highlight> {
        vec![Highlight::new("partitions", [self.partition.id.to_string()])]
    }

    fn apply(&self, bag: &PruningBag) -> StepOutcome<PruningBag> {
        let p = &self.partition;
        let mut next = bag.clone();
        next.decisions.push(PartitionDecision { id: p.id,
                                                label: p.label.clone(),
                                                scanned: self.scanned });
        let (title, verdict) = if self.scanned {
            (format!("Scan Partition {}", p.id), "the range overlaps the filter, so it must be read")
        } else {
            (format!("Prune Partition {}", p.id), "the range cannot match, so it is skipped without I/O")
        };
        let text = format!("Zone map for {}: MIN {} / MAX {} ({} rows): {verdict}.",
                           p.label, p.min_date, p.max_date, p.rows);
        StepOutcome::new(next, title, text)
    }
}

/// Un paso por partición y un resumen final con `PruningStats`.
pub fn scenario(predicate: PruningPredicate) -> Scenario<PruningBag> {
    let set = PartitionSet::jan_feb_2024();
    let initial = PruningBag { predicate,
                               decisions: Vec::new(),
                               stats: None };
    let checks = set.partitions()
                    .iter()
                    .map(|p| ZoneMapCheck { id: format!("partition_{}", p.id),
                                            scanned: predicate.must_scan(p),
                                            partition: p.clone() })
                    .map(|s| Box::new(s) as Box<dyn StepDefinition<PruningBag>>)
                    .collect::<Vec<_>>();

    let summary_set = set.clone();
    let summary = step("summary", move |bag: &PruningBag| {
                      let stats = summary_set.stats(&bag.predicate);
                      let text = format!("Scanned {} of {} partitions ({} of {} rows). Pruning skipped {}% of \
                                          the data.",
                                         stats.scanned_count,
                                         stats.scanned_count + stats.pruned_count,
                                         stats.scanned_rows,
                                         stats.total_rows,
                                         stats.efficiency_pct);
                      let next = PruningBag { stats: Some(stats),
                                              ..bag.clone() };
                      StepOutcome::new(next, "Pruning Summary", text)
                  }).tagged(StepTag::Summary)
                    .with_cues(|bag: &PruningBag| {
                        Cue::staggered("partition_result",
                                       SUMMARY_CUE_INTERVAL_MS,
                                       bag.decisions.iter().map(|d| json!({"id": d.id, "scanned": d.scanned})))
                    });

    Scenario::builder("partition_pruning", initial)
        .title("Micro-partition pruning")
        .intro("Ready", format!("SELECT * FROM orders {}", predicate.to_sql()))
        .dataset_hash(set.dataset_hash())
        .steps(checks)
        .step(summary)
        .build()
}
