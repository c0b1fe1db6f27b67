//! ASOF JOIN de trades contra quotes: por cada trade, el escáner arranca en
//! la quote más reciente y retrocede hasta la última quote no posterior.
use serde::Serialize;
use serde_json::json;
use stepviz_core::{Cue, Highlight, Scenario, StepDefinition, StepOutcome, StepTag};
use stepviz_domain::{format_cents, AsofScan, AsofRow, TickData, Trade};

pub const REJECT_CUE_INTERVAL_MS: u64 = 300;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AsofBag {
    /// Trade en proceso.
    pub trade: Option<u32>,
    /// Quote bajo el escáner.
    pub scanner_at: Option<u32>,
    pub rejected: Vec<u32>,
    pub selected: Option<u32>,
    pub results: Vec<AsofRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Arrive,
    Scan,
    Reject,
    Select,
    Merge,
}

impl Phase {
    const ALL: [Phase; 5] = [Phase::Arrive, Phase::Scan, Phase::Reject, Phase::Select, Phase::Merge];

    fn suffix(self) -> &'static str {
        match self {
            Phase::Arrive => "arrive",
            Phase::Scan => "scan",
            Phase::Reject => "reject",
            Phase::Select => "select",
            Phase::Merge => "merge",
        }
    }
}

#[derive(Debug)]
struct AsofStep {
    id: String,
    phase: Phase,
    trade: Trade,
    scan: AsofScan,
}

impl AsofStep {
    fn selected_id(&self) -> Option<u32> {
        self.scan.selected.as_ref().map(|q| q.id)
    }
}

impl StepDefinition<AsofBag> for AsofStep {
    fn id(&self) -> &str {
        &self.id
    }

    fn tag(&self) -> StepTag {
        match self.phase {
            Phase::Arrive => StepTag::Neutral,
            Phase::Scan => StepTag::Scan,
            Phase::Reject => StepTag::Prune,
            Phase::Select => StepTag::Match,
            Phase::Merge => StepTag::Other("merge".into()),
        }
    }

    fn highlights(&self) -> Vec<Highlight> {
        let trade = Highlight::new("trades", [format!("T{}", self.trade.id)]);
        let quotes = match self.phase {
            Phase::Arrive => return vec![trade],
            Phase::Scan => vec![self.scan.start],
            Phase::Reject => self.scan.rejected.clone(),
            Phase::Select | Phase::Merge => self.selected_id().into_iter().collect(),
        };
        vec![trade, Highlight::new("quotes", quotes.into_iter().map(|q| format!("Q{q}")))]
    }

    fn apply(&self, bag: &AsofBag) -> StepOutcome<AsofBag> {
        let t = &self.trade;
        let mut next = bag.clone();
        let (title, text) = match self.phase {
            Phase::Arrive => {
                next.trade = Some(t.id);
                next.scanner_at = None;
                next.rejected.clear();
                next.selected = None;
                (format!("Trade {} Arrives", t.id),
                 format!("Trade {} at {}: {} {} @ {}. Find the quote in effect at that moment.",
                         t.id,
                         t.ts.format("%H:%M"),
                         t.quantity,
                         t.symbol,
                         format_cents(t.price)))
            }
            Phase::Scan => {
                next.scanner_at = Some(self.scan.start);
                ("Scanner Activates".to_string(),
                 format!("The scanner starts at the latest quote (Q{}) and walks backward in time.",
                         self.scan.start))
            }
            Phase::Reject => {
                next.rejected = self.scan.rejected.clone();
                next.scanner_at = self.selected_id().or(next.scanner_at);
                let text = if self.scan.rejected.is_empty() {
                    "No quote is later than the trade; nothing to skip.".to_string()
                } else {
                    let ids: Vec<String> = self.scan.rejected.iter().map(|q| format!("Q{q}")).collect();
                    format!("{} happened after {}: future quotes are rejected.",
                            ids.join(", "),
                            t.ts.format("%H:%M"))
                };
                ("Reject Future Quotes".to_string(), text)
            }
            Phase::Select => {
                next.selected = self.selected_id();
                let text = match &self.scan.selected {
                    Some(q) => format!("Q{} at {} is the closest quote at or before the trade (bid {} / ask {}).",
                                       q.id,
                                       q.ts.format("%H:%M"),
                                       format_cents(q.bid),
                                       format_cents(q.ask)),
                    None => "No quote precedes the trade; the quote columns will be NULL.".to_string(),
                };
                ("Select Closest Past Quote".to_string(), text)
            }
            Phase::Merge => {
                next.results.push(AsofRow::merge(t, self.scan.selected.as_ref()));
                ("Merge Result Row".to_string(),
                 format!("Trade {} is emitted with its matched quote; the result holds {} row(s).",
                         t.id,
                         next.results.len()))
            }
        };
        StepOutcome::new(next, title, text)
    }

    fn cues(&self, _bag: &AsofBag) -> Vec<Cue> {
        if self.phase != Phase::Reject {
            return Vec::new();
        }
        Cue::staggered("reject_quote",
                       REJECT_CUE_INTERVAL_MS,
                       self.scan.rejected.iter().map(|q| json!({ "quote": q })))
    }
}

/// Cinco pasos por trade: llegada, activación del escáner, rechazo de quotes
/// futuras, selección y emisión de la fila.
pub fn scenario() -> Scenario<AsofBag> {
    let data = TickData::aapl_sample();
    let steps = data.trades()
                    .iter()
                    .filter_map(|t| data.scan_for(t).map(|p| (t, p)))
                    .flat_map(|(t, scan)| {
                        Phase::ALL.into_iter().map(move |phase| AsofStep { id: format!("trade{}_{}", t.id, phase.suffix()),
                                                                           phase,
                                                                           trade: t.clone(),
                                                                           scan: scan.clone() })
                    })
                    .map(|s| Box::new(s) as Box<dyn StepDefinition<AsofBag>>)
                    .collect::<Vec<_>>();

    Scenario::builder("asof_join", AsofBag::default())
        .title("ASOF JOIN: trades and quotes")
        .intro("Ready",
               "SELECT t.*, q.bid, q.ask FROM trades t ASOF JOIN quotes q MATCH_CONDITION (t.ts >= q.ts) ON t.symbol \
                = q.symbol")
        .dataset_hash(data.dataset_hash())
        .steps(steps)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepviz_core::StepSequencer;

    #[test]
    fn five_steps_per_trade() {
        let s = scenario();
        assert_eq!(s.len(), 20);
        assert_eq!(s.step_at(0).map(|st| st.id().to_string()), Some("trade1_arrive".into()));
        assert_eq!(s.step_at(19).map(|st| st.id().to_string()), Some("trade4_merge".into()));
    }

    #[test]
    fn each_trade_joins_its_preceding_quote() {
        let mut seq = StepSequencer::create(scenario()).unwrap();
        seq.run_to_completion();
        let matched: Vec<(u32, Option<u32>)> = seq.state()
                                                  .state_bag()
                                                  .results
                                                  .iter()
                                                  .map(|r| (r.trade_id, r.quote_id))
                                                  .collect();
        assert_eq!(matched, vec![(1, Some(1)), (2, Some(2)), (3, Some(4)), (4, Some(5))]);
    }

    #[test]
    fn reject_step_lists_future_quotes() {
        let mut seq = StepSequencer::create(scenario()).unwrap();
        for _ in 0..3 {
            seq.advance();
        }
        let bag = seq.state().state_bag();
        assert_eq!(bag.trade, Some(1));
        assert_eq!(bag.rejected, vec![5, 4, 3, 2]);
        assert_eq!(bag.scanner_at, Some(1));
        assert_eq!(seq.presentation().pending_len(), 4);
    }
}
