//! Table scan frente a index seek sobre la tabla de piezas.
//!
//! El plan de ejecución se calcula al construir el escenario; cada paso añade
//! sus líneas al log de ejecución y pide un cue de revelado por línea.
use serde::Serialize;
use serde_json::json;
use stepviz_core::{Cue, Highlight, Scenario, StepDefinition, StepOutcome, StepTag};
use stepviz_domain::{BTreeIndex, IndexStrategy, PartRow};

/// Intervalo entre líneas reveladas del log.
pub const LOG_LINE_INTERVAL_MS: u64 = 400;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeekBag {
    pub key: u32,
    pub strategy: IndexStrategy,
    pub log: Vec<String>,
    /// Nodos visitados ("root", "leaf:MIDDLE", "heap:3", ...).
    pub visited: Vec<String>,
    pub rows_scanned: usize,
    pub found: Option<PartRow>,
}

impl SeekBag {
    fn new(key: u32, strategy: IndexStrategy) -> Self {
        Self { key,
               strategy,
               log: Vec::new(),
               visited: Vec::new(),
               rows_scanned: 0,
               found: None }
    }
}

#[derive(Debug, Clone)]
enum Effect {
    None,
    Scan,
    Found(Option<PartRow>),
}

/// Un paso del plan: las líneas de log que emite, el nodo que visita y su
/// efecto sobre el bag.
#[derive(Debug)]
struct PlanStep {
    id: String,
    title: String,
    tag: StepTag,
    lines: Vec<String>,
    visit: Option<String>,
    effect: Effect,
}

impl StepDefinition<SeekBag> for PlanStep {
    fn id(&self) -> &str {
        &self.id
    }

    fn tag(&self) -> StepTag {
        self.tag.clone()
    }

    fn highlights(&self) -> Vec<Highlight> {
        self.visit
            .iter()
            .map(|node| Highlight::new("tree", [node.as_str()]))
            .collect()
    }

    fn apply(&self, bag: &SeekBag) -> StepOutcome<SeekBag> {
        let mut next = bag.clone();
        next.log.extend(self.lines.iter().cloned());
        if let Some(node) = &self.visit {
            next.visited.push(node.clone());
        }
        match &self.effect {
            Effect::None => {}
            Effect::Scan => next.rows_scanned += 1,
            Effect::Found(row) => next.found = row.clone(),
        }
        StepOutcome::new(next, self.title.clone(), self.lines.join("\n"))
    }

    fn cues(&self, _bag: &SeekBag) -> Vec<Cue> {
        let mut cues = Cue::staggered("log_line",
                                      LOG_LINE_INTERVAL_MS,
                                      self.lines.iter().map(|l| json!(l)));
        if let Some(node) = &self.visit {
            cues.push(Cue::new("node_pulse", 0, json!(node)));
        }
        cues
    }
}

fn plan_step(id: impl Into<String>, title: impl Into<String>, tag: StepTag, lines: Vec<String>) -> PlanStep {
    PlanStep { id: id.into(),
               title: title.into(),
               tag,
               lines,
               visit: None,
               effect: Effect::None }
}

fn heap_plan(index: &BTreeIndex, key: u32) -> Vec<PlanStep> {
    let mut steps = vec![plan_step("start_scan",
                                   "Table Scan",
                                   StepTag::Scan,
                                   vec![format!("No index available: scanning the heap for id = {key}")])];
    for probe in index.table_scan(key) {
        let verdict = if probe.matched { "MATCH" } else { "no match" };
        let mut s = plan_step(format!("scan_row_{}", probe.position),
                              format!("Check Row {}", probe.position + 1),
                              StepTag::Scan,
                              vec![format!("Row {}: id = {} ... {verdict}", probe.position + 1, probe.id)]);
        s.visit = Some(format!("heap:{}", probe.position));
        s.effect = Effect::Scan;
        steps.push(s);
    }
    let found = index.rows().iter().find(|r| r.id == key).cloned();
    let mut done = plan_step("summary",
                             "Scan Complete",
                             StepTag::Summary,
                             vec![format!("Table scan read all {} rows. Cost grows with the table: O(n).",
                                          index.rows().len())]);
    done.effect = Effect::Found(found);
    steps.push(done);
    steps
}

fn btree_plan(index: &BTreeIndex, key: u32, strategy: IndexStrategy) -> Vec<PlanStep> {
    let path = index.seek(key);
    let [lo, hi] = path.root_keys;
    let mut steps = Vec::new();

    let mut root = plan_step("root",
                             "Root Node",
                             StepTag::Seek,
                             vec![format!("Root node [{lo} | {hi}]: comparing {key} against the separators"),
                                  format!("Following the {} branch", path.branch.as_str())]);
    root.visit = Some("root".to_string());
    steps.push(root);

    let leaf_text = path.leaf_keys
                        .iter()
                        .map(u32::to_string)
                        .collect::<Vec<_>>()
                        .join(", ");
    let mut leaf = plan_step("leaf",
                             "Leaf Node",
                             StepTag::Seek,
                             vec![format!("Leaf {} holds keys [{leaf_text}]", path.branch.as_str())]);
    leaf.visit = Some(format!("leaf:{}", path.branch.as_str()));
    steps.push(leaf);

    let hit = path.found.is_some();
    let mut found = plan_step("found",
                              if hit { "Key Found" } else { "Key Not Found" },
                              StepTag::Seek,
                              vec![if hit {
                                       format!("Key {key} found in the leaf")
                                   } else {
                                       format!("Key {key} is not in the leaf: no rows")
                                   }]);
    // La hoja del non-clustered sólo guarda el locator: la fila se lee en su
    // posición física del heap.
    let lookup_at = index.rows()
                         .iter()
                         .position(|r| r.id == key)
                         .filter(|_| hit && strategy == IndexStrategy::NonClustered);
    if lookup_at.is_none() {
        found.effect = Effect::Found(path.found.clone());
    }
    steps.push(found);

    if let Some(position) = lookup_at {
        let mut lookup = plan_step("key_lookup",
                                   "Key Lookup",
                                   StepTag::Seek,
                                   vec!["The leaf only stores the key and a row locator".to_string(),
                                        format!("Key lookup: jumping to heap row {} to fetch id {key}", position + 1)]);
        lookup.visit = Some(format!("heap:{position}"));
        lookup.effect = Effect::Found(path.found.clone());
        steps.push(lookup);
    }

    let closing = match strategy {
        IndexStrategy::Clustered => "Clustered index: the leaf is the data row. Two page reads: O(log n).",
        IndexStrategy::NonClustered if hit => "Non-clustered index: seek plus one key lookup into the heap.",
        IndexStrategy::NonClustered => "Non-clustered index: the seek proved the key absent, no lookup needed.",
        _ => "Covering index: every selected column lives in the leaf, no key lookup.",
    };
    steps.push(plan_step("summary", "Seek Complete", StepTag::Summary, vec![closing.to_string()]));
    steps
}

/// Busca `key` en la tabla de piezas con la estrategia indicada.
pub fn scenario(key: u32, strategy: IndexStrategy) -> Scenario<SeekBag> {
    let index = BTreeIndex::parts_sample();
    let plan = if strategy.uses_btree() {
        btree_plan(&index, key, strategy)
    } else {
        heap_plan(&index, key)
    };
    log::debug!("plan de index seek: key={} strategy={} pasos={}", key, strategy.as_str(), plan.len());

    Scenario::builder(format!("index_seek_{}", strategy.as_str()), SeekBag::new(key, strategy))
        .title(format!("Index seek: {} (id = {key})", strategy.as_str()))
        .intro("Ready", format!("SELECT * FROM parts WHERE id = {key}"))
        .dataset_hash(index.dataset_hash())
        .steps(plan.into_iter()
                   .map(|s| Box::new(s) as Box<dyn StepDefinition<SeekBag>>))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepviz_core::StepSequencer;

    #[test]
    fn heap_scan_reads_every_row() {
        let mut seq = StepSequencer::create(scenario(8, IndexStrategy::Heap)).unwrap();
        seq.run_to_completion();
        let bag = seq.state().state_bag();
        assert_eq!(bag.rows_scanned, 8);
        assert_eq!(bag.found.as_ref().map(|r| r.name.as_str()), Some("CYLINDER-LINER"));
    }

    #[test]
    fn nonclustered_adds_key_lookup() {
        let s = scenario(8, IndexStrategy::NonClustered);
        assert!(s.step_by_id("key_lookup").is_some());
        let c = scenario(8, IndexStrategy::Covering);
        assert!(c.step_by_id("key_lookup").is_none());
        assert_eq!(s.len(), c.len() + 1);
    }

    #[test]
    fn key_lookup_highlights_the_matched_heap_row() {
        let index = BTreeIndex::parts_sample();
        for key in [5, 21] {
            let mut seq = StepSequencer::create(scenario(key, IndexStrategy::NonClustered)).unwrap();
            seq.run_to_completion();
            let bag = seq.state().state_bag();
            let heap_node = bag.visited.last().expect("lookup visited the heap").clone();
            let position: usize = heap_node.trim_start_matches("heap:").parse().unwrap();
            assert_eq!(index.rows()[position].id, key, "{heap_node}");
        }
        // id 5 (CAM-BEARING) está en la cuarta fila física del heap.
        let s = scenario(5, IndexStrategy::NonClustered);
        let (_, step) = s.step_by_id("key_lookup").unwrap();
        assert_eq!(step.highlights()[0].keys, vec!["heap:3"]);
    }

    #[test]
    fn missing_key_has_no_lookup() {
        let mut seq = StepSequencer::create(scenario(7, IndexStrategy::NonClustered)).unwrap();
        seq.run_to_completion();
        let bag = seq.state().state_bag();
        assert!(bag.found.is_none());
        assert_eq!(bag.visited, vec!["root", "leaf:MIDDLE"]);
    }
}
