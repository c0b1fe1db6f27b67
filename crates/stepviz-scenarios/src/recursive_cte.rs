//! Explosión de una lista de materiales (BOM) con una CTE recursiva.
//!
//! El escenario completo sigue la ejecución real de `WITH RECURSIVE`: el
//! miembro ancla corre una sola vez, `UNION ALL` pasa la salida al buffer de
//! entrada, el miembro recursivo une ese buffer contra la tabla y el ciclo se
//! repite hasta que una iteración no devuelve filas.

use std::rc::Rc;

use serde::Serialize;
use stepviz_core::{step, Highlight, Scenario, StepDefinition, StepOutcome, StepTag};
use stepviz_domain::{BomTable, HierarchyRow};

pub const ROOT_PART: &str = "ENGINE-VPI-001";

/// Listado SQL mostrado junto al escenario; las highlights de región `sql`
/// referencian estas líneas (base 1).
pub const SQL_LINES: &[&str] = &["WITH RECURSIVE BOM_Hierarchy AS (",
                                 "  -- ANCHOR: Find root components",
                                 "  SELECT Parent_ID, Child_ID, Qty,",
                                 "         1 AS Level",
                                 "  FROM BOM_COMPONENTS",
                                 "  WHERE Parent_ID = 'ENGINE-VPI-001'",
                                 "",
                                 "  UNION ALL",
                                 "",
                                 "  -- RECURSIVE: Find children",
                                 "  SELECT c.Parent_ID, c.Child_ID, c.Qty,",
                                 "         p.Level + 1",
                                 "  FROM BOM_COMPONENTS c",
                                 "  JOIN BOM_Hierarchy p",
                                 "    ON c.Parent_ID = p.Child_ID",
                                 ")",
                                 "SELECT * FROM BOM_Hierarchy;"];

/// Estado de la explosión completa.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CteBag {
    pub results: Vec<HierarchyRow>,
    pub input_buffer: Vec<HierarchyRow>,
    pub output_buffer: Vec<HierarchyRow>,
    pub level: u32,
    pub iteration: u32,
    /// Claves "PARENT-CHILD" de las filas fuente emparejadas en este paso.
    pub matched: Vec<String>,
    pub processing: bool,
}

fn sql(lines: std::ops::RangeInclusive<u32>) -> Highlight {
    Highlight::lines("sql", lines)
}

fn child_names(rows: &[HierarchyRow]) -> String {
    rows.iter().map(|r| r.child.as_str()).collect::<Vec<_>>().join(", ")
}

#[derive(Debug)]
struct AnchorStep {
    bom: Rc<BomTable>,
    root: String,
}

impl StepDefinition<CteBag> for AnchorStep {
    fn id(&self) -> &str {
        "anchor"
    }

    fn tag(&self) -> StepTag {
        StepTag::Anchor
    }

    fn highlights(&self) -> Vec<Highlight> {
        vec![sql(2..=6)]
    }

    fn apply(&self, bag: &CteBag) -> StepOutcome<CteBag> {
        // La raíz es una constante del escenario y existe en el dataset; si no
        // existiera el ancla simplemente no devuelve filas.
        let rows = self.bom.anchor(&self.root).unwrap_or_default();
        let next = CteBag { results: rows.clone(),
                            matched: rows.iter().map(HierarchyRow::match_key).collect(),
                            output_buffer: rows,
                            level: 1,
                            ..bag.clone() };
        let text = format!("The anchor member runs first and only once. It finds every component whose parent is \
                            '{}' and assigns them level 1: {}.",
                           self.root,
                           child_names(&next.results));
        StepOutcome::new(next, "Anchor Query Executes", text)
    }
}

/// Mueve la salida al buffer de entrada (UNION ALL o preparación del loop).
#[derive(Debug)]
struct FeedStep {
    id: &'static str,
    iteration: u32,
}

impl StepDefinition<CteBag> for FeedStep {
    fn id(&self) -> &str {
        self.id
    }

    fn tag(&self) -> StepTag {
        if self.iteration == 1 {
            StepTag::Union
        } else {
            StepTag::Recursive
        }
    }

    fn highlights(&self) -> Vec<Highlight> {
        if self.iteration == 1 {
            vec![sql(8..=8)]
        } else {
            vec![sql(14..=15)]
        }
    }

    fn apply(&self, bag: &CteBag) -> StepOutcome<CteBag> {
        let next = CteBag { input_buffer: bag.output_buffer.clone(),
                            output_buffer: Vec::new(),
                            iteration: self.iteration,
                            matched: Vec::new(),
                            processing: true,
                            ..bag.clone() };
        let (title, text) = if self.iteration == 1 {
            ("UNION ALL Connects".to_string(),
             "UNION ALL stacks the results. The output moves to the input buffer: these rows become the parents \
              searched in the next pass."
                 .to_string())
        } else {
            ("Loop Repeats".to_string(),
             format!("Level {} rows move to the input buffer and the database loops again.", bag.level))
        };
        StepOutcome::new(next, title, text)
    }
}

#[derive(Debug)]
struct RecurseStep {
    id: &'static str,
    bom: Rc<BomTable>,
    iteration: u32,
}

impl StepDefinition<CteBag> for RecurseStep {
    fn id(&self) -> &str {
        self.id
    }

    fn tag(&self) -> StepTag {
        StepTag::Recursive
    }

    fn highlights(&self) -> Vec<Highlight> {
        vec![sql(10..=15)]
    }

    fn apply(&self, bag: &CteBag) -> StepOutcome<CteBag> {
        let found = self.bom.expand(&bag.input_buffer);
        let mut results = bag.results.clone();
        results.extend(found.iter().cloned());
        let parents: Vec<&str> = {
            let mut p: Vec<&str> = found.iter().map(|r| r.parent.as_str()).collect();
            p.dedup();
            p
        };
        let text = if found.is_empty() {
            "The recursive member found no children for the input buffer.".to_string()
        } else {
            format!("The recursive member joins the input buffer against the source table. Found children for {}: {}.",
                    parents.join(" and "),
                    child_names(&found))
        };
        let next = CteBag { results,
                            matched: found.iter().map(HierarchyRow::match_key).collect(),
                            level: bag.level + 1,
                            output_buffer: found,
                            ..bag.clone() };
        StepOutcome::new(next, format!("Recursive Query: Iteration {}", self.iteration), text)
    }
}

#[derive(Debug)]
struct TerminationStep {
    bom: Rc<BomTable>,
    iteration: u32,
}

impl StepDefinition<CteBag> for TerminationStep {
    fn id(&self) -> &str {
        "termination_check"
    }

    fn tag(&self) -> StepTag {
        StepTag::Terminate
    }

    fn highlights(&self) -> Vec<Highlight> {
        vec![sql(16..=16)]
    }

    fn apply(&self, bag: &CteBag) -> StepOutcome<CteBag> {
        let input = bag.output_buffer.clone();
        let probe = self.bom.expand(&input);
        let text = format!("Level {} moves to the input buffer. Searching for children of {}... Result: {} rows. \
                            The CTE terminates.",
                           bag.level,
                           child_names(&input),
                           probe.len());
        let next = CteBag { input_buffer: input,
                            output_buffer: probe,
                            iteration: self.iteration,
                            matched: Vec::new(),
                            processing: false,
                            ..bag.clone() };
        StepOutcome::new(next, "Termination Check", text)
    }
}

/// Construye la explosión completa en 7 pasos sobre el dataset del motor.
pub fn bom_explosion() -> Scenario<CteBag> {
    let bom = Rc::new(BomTable::engine_sample());
    let complete = step("complete", |bag: &CteBag| {
                       let text = format!("The recursive CTE has finished: a flat table with the whole BOM tree. \
                                           Total: {} components across {} levels.",
                                          bag.results.len(),
                                          bag.level);
                       StepOutcome::new(bag.clone(), "Hierarchy Exploded", text)
                   }).tagged(StepTag::Terminate)
                     .highlight(sql(17..=17));

    Scenario::builder("recursive_cte", CteBag::default())
        .title("Recursive CTE: BOM explosion")
        .intro("Welcome to the Simulator",
               "This scenario shows how a recursive CTE explodes a BOM hierarchy level by level.")
        .dataset_hash(bom.dataset_hash())
        .step(AnchorStep { bom: Rc::clone(&bom),
                           root: ROOT_PART.to_string() })
        .step(FeedStep { id: "union_all", iteration: 1 })
        .step(RecurseStep { id: "recursion_1",
                            bom: Rc::clone(&bom),
                            iteration: 1 })
        .step(FeedStep { id: "loop_setup", iteration: 2 })
        .step(RecurseStep { id: "recursion_2",
                            bom: Rc::clone(&bom),
                            iteration: 2 })
        .step(TerminationStep { bom, iteration: 3 })
        .step(complete)
        .build()
}

/// Estado de la variante de una sola iteración.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OneHopBag {
    pub results: Vec<HierarchyRow>,
    pub buffer: Vec<HierarchyRow>,
    pub input: Vec<HierarchyRow>,
}

/// Ancla, UNION ALL y una expansión: `results` termina con el ancla más los
/// hijos a un salto, en orden de inserción.
pub fn one_hop() -> Scenario<OneHopBag> {
    let bom = Rc::new(BomTable::engine_sample());
    let seed_bom = Rc::clone(&bom);
    let expand_bom = Rc::clone(&bom);

    Scenario::builder("recursive_one_hop", OneHopBag::default())
        .title("Recursive CTE: one hop")
        .dataset_hash(bom.dataset_hash())
        .step(step("seed_anchor", move |_: &OneHopBag| {
                  let anchor = seed_bom.anchor(ROOT_PART).unwrap_or_default();
                  let text = format!("Anchor rows: {}.", child_names(&anchor));
                  StepOutcome::new(OneHopBag { results: anchor.clone(),
                                               buffer: anchor,
                                               input: Vec::new() },
                                   "Seed Anchor",
                                   text)
              }).tagged(StepTag::Anchor)
                .highlight(sql(2..=6)))
        .step(step("union_stack", |bag: &OneHopBag| {
                  let next = OneHopBag { results: bag.results.clone(),
                                         buffer: Vec::new(),
                                         input: bag.buffer.clone() };
                  StepOutcome::new(next, "Union Stack", "The buffer becomes the input of the recursive member.")
              }).tagged(StepTag::Union)
                .highlight(sql(8..=8)))
        .step(step("expand_children", move |bag: &OneHopBag| {
                  let children = expand_bom.expand(&bag.input);
                  let text = format!("Children reachable in one hop: {}.", child_names(&children));
                  let mut results = bag.results.clone();
                  results.extend(children.iter().cloned());
                  StepOutcome::new(OneHopBag { results,
                                               buffer: children,
                                               input: bag.input.clone() },
                                   "Expand Children",
                                   text)
              }).tagged(StepTag::Recursive)
                .highlight(sql(10..=15)))
        .build()
}
