//! Recorrido de un nested-loop join entre las tablas A y B.
use std::rc::Rc;

use serde::Serialize;
use serde_json::json;
use stepviz_core::{step, Cue, Highlight, Scenario, StepDefinition, StepOutcome, StepTag};
use stepviz_domain::{JoinKind, JoinPair, JoinTables, JoinValue};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinBag {
    pub kind: JoinKind,
    pub result: Vec<JoinPair>,
    /// Filas de A ya recorridas.
    pub probed: usize,
}

#[derive(Debug)]
struct ProbeRow {
    id: String,
    tables: Rc<JoinTables>,
    kind: JoinKind,
    left: JoinValue,
}

impl StepDefinition<JoinBag> for ProbeRow {
    fn id(&self) -> &str {
        &self.id
    }

    fn tag(&self) -> StepTag {
        StepTag::Match
    }

    fn highlights(&self) -> Vec<Highlight> {
        let matched = self.tables
                          .probe(self.kind, &self.left)
                          .into_iter()
                          .filter_map(|p| p.right.map(|r| format!("B{}", r.id)));
        vec![Highlight::new("table_a", [format!("A{}", self.left.id)]), Highlight::new("table_b", matched)]
    }

    fn apply(&self, bag: &JoinBag) -> StepOutcome<JoinBag> {
        let pairs = self.tables.probe(self.kind, &self.left);
        let mut next = bag.clone();
        next.probed += 1;
        let text = if !pairs.is_empty() {
            let rights: Vec<&str> = pairs.iter()
                                         .filter_map(|p| p.right.as_ref())
                                         .map(JoinValue::display)
                                         .collect();
            format!("A.value = {} pairs with {} row(s) of B: {}.",
                    self.left.display(),
                    pairs.len(),
                    rights.join(", "))
        } else if self.kind.keeps_unmatched_left() {
            next.result.push(JoinPair { left: Some(self.left.clone()),
                                        right: None });
            format!("A.value = {} has no match; the {} join keeps it with NULL on the right.",
                    self.left.display(),
                    self.kind.as_str().to_uppercase())
        } else if self.left.value.is_none() {
            "A.value is NULL: NULL never equals anything, so the row is dropped.".to_string()
        } else {
            format!("A.value = {} has no match in B and is dropped.", self.left.display())
        };
        next.result.extend(pairs);
        StepOutcome::new(next, format!("Probe A row {}", self.left.id + 1), text)
    }

    fn cues(&self, bag: &JoinBag) -> Vec<Cue> {
        vec![Cue::new("result_rows", 0, json!(bag.result.len()))]
    }
}

/// Un paso por fila de A, las filas de B sin pareja (RIGHT/FULL) y un resumen.
pub fn scenario(kind: JoinKind) -> Scenario<JoinBag> {
    let tables = Rc::new(JoinTables::sample());
    let initial = JoinBag { kind,
                            result: Vec::new(),
                            probed: 0 };

    let mut builder = Scenario::builder(format!("join_{}", kind.as_str()), initial)
        .title(format!("{} JOIN", kind.as_str().to_uppercase()))
        .intro("Ready", kind.to_sql())
        .dataset_hash(tables.dataset_hash());

    for left in &tables.left {
        builder = builder.step(ProbeRow { id: format!("probe_a{}", left.id),
                                          tables: Rc::clone(&tables),
                                          kind,
                                          left: left.clone() });
    }

    if kind.keeps_unmatched_right() {
        let t = Rc::clone(&tables);
        builder = builder.step(step("unmatched_right", move |bag: &JoinBag| {
                                   let orphans = t.unmatched_right();
                                   let shown: Vec<String> = orphans.iter().map(|r| r.display().to_string()).collect();
                                   let mut next = bag.clone();
                                   next.result
                                       .extend(orphans.into_iter().map(|r| JoinPair { left: None,
                                                                                      right: Some(r.clone()) }));
                                   let text = format!("Rows of B never matched ({}) are added with NULL on the left.",
                                                      shown.join(", "));
                                   StepOutcome::new(next, "Unmatched Right Rows", text)
                               }).tagged(StepTag::Match));
    }

    builder.step(step("summary", |bag: &JoinBag| {
                     let text = format!("{} JOIN produced {} rows from {} rows of A.",
                                        bag.kind.as_str().to_uppercase(),
                                        bag.result.len(),
                                        bag.probed);
                     StepOutcome::new(bag.clone(), "Join Complete", text)
                 }).tagged(StepTag::Summary))
           .build()
}
