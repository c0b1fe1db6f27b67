//! NULL en expresiones y agregados: la cascada de `COALESCE` y el escáner de
//! `COUNT(*)` frente a `COUNT(col)`.
use serde::Serialize;
use stepviz_core::{step, Highlight, Scenario, StepOutcome, StepTag};
use stepviz_domain::nulls::{aggregate_sample, coalesce_sample, coalesce_stop};
use stepviz_domain::CountMode;

fn shown(v: Option<i64>) -> String {
    v.map_or_else(|| "NULL".to_string(), |v| v.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoalesceBag {
    pub columns: Vec<Option<i64>>,
    /// Columnas ya evaluadas, en orden.
    pub checked: Vec<usize>,
    /// `Some(valor)` una vez resuelta la expresión.
    pub result: Option<Option<i64>>,
}

/// Evalúa las columnas de izquierda a derecha hasta la primera no NULL.
pub fn coalesce_scenario(columns: Vec<Option<i64>>) -> Scenario<CoalesceBag> {
    let stop = coalesce_stop(&columns);
    let last_checked = stop.unwrap_or(columns.len().saturating_sub(1));
    let mut builder = Scenario::builder("coalesce",
                                        CoalesceBag { columns: columns.clone(),
                                                      checked: Vec::new(),
                                                      result: None })
        .title("COALESCE: first non-NULL wins")
        .intro("Ready",
               format!("SELECT COALESCE({})",
                       (1..=columns.len()).map(|i| format!("col_{i}")).collect::<Vec<_>>().join(", ")));

    for (i, value) in columns.iter().copied().enumerate().take(last_checked + 1) {
        let tag = if value.is_some() { StepTag::Match } else { StepTag::Other("fall_through".into()) };
        builder = builder.step(step(format!("check_col_{}", i + 1), move |bag: &CoalesceBag| {
                                   let mut next = bag.clone();
                                   next.checked.push(i);
                                   let text = match value {
                                       Some(v) => format!("col_{} holds {v}: the cascade stops here.", i + 1),
                                       None => format!("col_{} is NULL: fall through to the next column.", i + 1),
                                   };
                                   StepOutcome::new(next, format!("Check col_{}", i + 1), text)
                               }).tagged(tag)
                                 .highlight(Highlight::new("columns", [format!("col_{}", i + 1)])));
    }

    builder.step(step("result", move |bag: &CoalesceBag| {
                     let value = stop.and_then(|i| bag.columns.get(i).copied().flatten());
                     let next = CoalesceBag { result: Some(value),
                                              ..bag.clone() };
                     let text = match stop {
                         Some(i) => format!("COALESCE returns {} from col_{}.", shown(value), i + 1),
                         None => "Every column is NULL, so COALESCE returns NULL.".to_string(),
                     };
                     StepOutcome::new(next, "Result", text)
                 }).tagged(StepTag::Summary))
           .build()
}

pub fn coalesce() -> Scenario<CoalesceBag> {
    coalesce_scenario(coalesce_sample())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountBag {
    pub mode: CountMode,
    pub scanned: usize,
    pub count: usize,
    pub done: bool,
}

/// Un paso por bloque y el resultado del agregado.
pub fn count(mode: CountMode) -> Scenario<CountBag> {
    let blocks = aggregate_sample();
    let total = blocks.len();
    let steps = blocks.iter()
                      .copied()
                      .enumerate()
                      .map(|(i, value)| {
                          let counted = mode.counts(value);
                          step(format!("block_{}", i + 1), move |bag: &CountBag| {
                              let mut next = bag.clone();
                              next.scanned += 1;
                              if counted {
                                  next.count += 1;
                              }
                              let verdict = match (mode, value) {
                                  (CountMode::Star, None) => "COUNT(*) counts the row even though the value is NULL",
                                  (_, None) => "NULL is skipped by COUNT(value)",
                                  (_, Some(_)) => "counted",
                              };
                              let text = format!("Block {} = {}: {verdict}. Running count {}.",
                                                 i + 1,
                                                 shown(value),
                                                 next.count);
                              StepOutcome::new(next, format!("Scan block {}", i + 1), text)
                          }).tagged(if counted { StepTag::Match } else { StepTag::Prune })
                            .highlight(Highlight::new("blocks", [(i + 1).to_string()]))
                      })
                      .collect::<Vec<_>>();

    let mut builder = Scenario::builder("count_nulls",
                                        CountBag { mode,
                                                   scanned: 0,
                                                   count: 0,
                                                   done: false })
        .title("COUNT(*) vs COUNT(column)")
        .intro("Ready", format!("SELECT {} FROM blocks", mode.sql()));
    for s in steps {
        builder = builder.step(s);
    }
    builder.step(step("result", move |bag: &CountBag| {
                     let next = CountBag { done: true,
                                           ..bag.clone() };
                     let text = format!("{} = {} of {total} rows.", bag.mode.sql(), bag.count);
                     StepOutcome::new(next, "Result", text)
                 }).tagged(StepTag::Summary))
           .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepviz_core::StepSequencer;

    #[test]
    fn coalesce_checks_until_the_first_value() {
        let s = coalesce();
        assert_eq!(s.len(), 3);
        let mut seq = StepSequencer::create(s).unwrap();
        seq.run_to_completion();
        let bag = seq.state().state_bag();
        assert_eq!(bag.checked, vec![0, 1]);
        assert_eq!(bag.result, Some(Some(200)));
    }

    #[test]
    fn all_null_columns_fall_through() {
        let mut seq = StepSequencer::create(coalesce_scenario(vec![None, None, None])).unwrap();
        seq.run_to_completion();
        let bag = seq.state().state_bag();
        assert_eq!(bag.checked, vec![0, 1, 2]);
        assert_eq!(bag.result, Some(None));
    }

    #[test]
    fn count_modes_differ_on_nulls() {
        for (mode, expected) in [(CountMode::Star, 5), (CountMode::Column, 3)] {
            let mut seq = StepSequencer::create(count(mode)).unwrap();
            seq.run_to_completion();
            assert_eq!(seq.state().state_bag().count, expected, "{mode:?}");
        }
    }
}
