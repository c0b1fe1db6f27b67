//! Gap filling sobre una serie de buckets: cada paso procesa un bucket y
//! rellena los NULL por arrastre del último valor o por interpolación lineal.
use std::rc::Rc;

use serde::Serialize;
use serde_json::json;
use stepviz_core::{step, Cue, Highlight, Scenario, StepDefinition, StepOutcome, StepTag};
use stepviz_domain::{FillKind, FillMethod, FilledBucket, GapSeries};

/// Retraso de la animación de arrastre ("pipe").
pub const PIPE_DELAY_MS: u64 = 400;
/// Retraso de la animación del puente de interpolación.
pub const BRIDGE_DELAY_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GapFillBag {
    pub method: FillMethod,
    pub filled: Vec<FilledBucket>,
    pub last_kind: Option<FillKind>,
}

#[derive(Debug)]
struct BucketStep {
    id: String,
    pos: usize,
    kind: FillKind,
    series: Rc<GapSeries>,
}

impl StepDefinition<GapFillBag> for BucketStep {
    fn id(&self) -> &str {
        &self.id
    }

    fn tag(&self) -> StepTag {
        match self.kind {
            FillKind::Present => StepTag::Scan,
            FillKind::CarriedForward => StepTag::Other("carry_forward".into()),
            FillKind::Interpolated { .. } => StepTag::Other("interpolate".into()),
            FillKind::Fallback => StepTag::Other("fallback".into()),
        }
    }

    fn highlights(&self) -> Vec<Highlight> {
        vec![Highlight::new("buckets", [format!("T{}", self.pos)])]
    }

    fn apply(&self, bag: &GapFillBag) -> StepOutcome<GapFillBag> {
        let mut next = bag.clone();
        let title = format!("Bucket T{}", self.pos);
        let Some((bucket, kind)) = self.series.fill_at(self.pos, &bag.filled, bag.method) else {
            return StepOutcome::new(next, title, "Bucket out of range.");
        };
        let shown = |v: Option<i64>| v.map_or_else(|| "NULL".to_string(), |v| v.to_string());
        let text = match kind {
            FillKind::Present => format!("Bucket {} contains a value ({}). No filling needed.",
                                         self.pos,
                                         shown(bucket.raw)),
            FillKind::CarriedForward => format!("Bucket {} is NULL: carry forward the last value ({}) with IGNORE \
                                                 NULLS.",
                                                self.pos,
                                                shown(bucket.filled)),
            FillKind::Interpolated { from, to } => format!("Bucket {} is NULL: bridge {from} -> {to} linearly. \
                                                            Calculated: {}.",
                                                           self.pos,
                                                           shown(bucket.filled)),
            FillKind::Fallback => format!("Bucket {} is NULL and no later value exists to interpolate; fall back \
                                           to the last value ({}).",
                                          self.pos,
                                          shown(bucket.filled)),
        };
        next.filled.push(bucket);
        next.last_kind = Some(kind);
        StepOutcome::new(next, title, text)
    }

    fn cues(&self, bag: &GapFillBag) -> Vec<Cue> {
        let value = bag.filled.last().and_then(|b| b.filled);
        match self.kind {
            FillKind::CarriedForward => vec![Cue::new("pipe", PIPE_DELAY_MS, json!({ "bucket": self.pos, "value": value }))],
            FillKind::Interpolated { .. } => {
                vec![Cue::new("bridge", BRIDGE_DELAY_MS, json!({ "bucket": self.pos, "value": value }))]
            }
            FillKind::Present | FillKind::Fallback => Vec::new(),
        }
    }
}

/// Un paso por bucket y un cierre con el método usado.
pub fn scenario(method: FillMethod) -> Scenario<GapFillBag> {
    let series = Rc::new(GapSeries::sensor_sample());
    let planned = series.fill_all(method);
    let mut kinds = Vec::with_capacity(planned.len());
    for pos in 0..planned.len() {
        if let Some((_, kind)) = series.fill_at(pos, &planned[..pos], method) {
            kinds.push(kind);
        }
    }
    let steps = kinds.into_iter()
                     .enumerate()
                     .map(|(pos, kind)| BucketStep { id: format!("bucket_{pos}"),
                                                     pos,
                                                     kind,
                                                     series: Rc::clone(&series) })
                     .map(|s| Box::new(s) as Box<dyn StepDefinition<GapFillBag>>)
                     .collect::<Vec<_>>();

    let complete = step("complete", |bag: &GapFillBag| {
                       let gaps = bag.filled.iter().filter(|b| b.raw.is_none()).count();
                       let text = format!("Gap filling complete with {}: {} NULL bucket(s) filled.",
                                          bag.method.label(),
                                          gaps);
                       StepOutcome::new(bag.clone(), "Gap Filling Complete", text)
                   }).tagged(StepTag::Summary);

    let sql = match method {
        FillMethod::LastValue => "SELECT ts, LAST_VALUE(v IGNORE NULLS) OVER (ORDER BY ts) FROM sensor",
        FillMethod::Linear => "SELECT ts, INTERPOLATE_LINEAR(v) OVER (ORDER BY ts) FROM sensor",
    };
    Scenario::builder("gap_fill", GapFillBag { method,
                                               filled: Vec::new(),
                                               last_kind: None })
        .title("Time-series gap filling")
        .intro("Ready", sql)
        .dataset_hash(series.dataset_hash())
        .steps(steps)
        .step(complete)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepviz_core::StepSequencer;

    fn filled_gaps(method: FillMethod) -> Vec<Option<i64>> {
        let mut seq = StepSequencer::create(scenario(method)).unwrap();
        seq.run_to_completion();
        let filled = &seq.state().state_bag().filled;
        [2, 3, 6].iter().map(|&i| filled[i].filled).collect()
    }

    #[test]
    fn walks_each_bucket_then_completes() {
        let s = scenario(FillMethod::LastValue);
        assert_eq!(s.len(), 10);
        assert_eq!(s.step_at(2).map(|st| st.tag()), Some(StepTag::Other("carry_forward".into())));
        assert_eq!(s.step_at(9).map(|st| st.tag()), Some(StepTag::Summary));
    }

    #[test]
    fn last_value_and_linear_fill_differently() {
        assert_eq!(filled_gaps(FillMethod::LastValue), vec![Some(78), Some(78), Some(87)]);
        assert_eq!(filled_gaps(FillMethod::Linear), vec![Some(80), Some(83), Some(85)]);
    }

    #[test]
    fn interpolated_bucket_schedules_a_bridge() {
        let mut seq = StepSequencer::create(scenario(FillMethod::Linear)).unwrap();
        for _ in 0..3 {
            seq.advance();
        }
        assert_eq!(seq.state().state_bag().last_kind,
                   Some(FillKind::Interpolated { from: 78, to: 85 }));
        assert_eq!(seq.presentation().pending_len(), 1);
    }
}
