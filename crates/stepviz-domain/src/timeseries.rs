// timeseries.rs
//! Series temporales: trades y quotes para el ASOF JOIN y una serie de
//! buckets con huecos para el gap filling.
use chrono::NaiveTime;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Precio en centavos; evita comparar flotantes.
pub type Cents = u32;

pub fn format_cents(c: Cents) -> String {
    format!("{}.{:02}", c / 100, c % 100)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub id: u32,
    pub ts: NaiveTime,
    pub symbol: String,
    pub price: Cents,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: u32,
    pub ts: NaiveTime,
    pub symbol: String,
    pub bid: Cents,
    pub ask: Cents,
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).expect("hora literal válida")
}

static TRADES: Lazy<Vec<Trade>> = Lazy::new(|| {
    [(1, 2, 15025, 100), (2, 5, 15050, 200), (3, 11, 15075, 150), (4, 14, 15100, 300)]
        .into_iter()
        .map(|(id, m, price, quantity)| Trade { id,
                                               ts: hm(10, m),
                                               symbol: "AAPL".into(),
                                               price,
                                               quantity })
        .collect()
});

static QUOTES: Lazy<Vec<Quote>> = Lazy::new(|| {
    [(1, 0, 15000, 15010), (2, 4, 15020, 15030), (3, 7, 15045, 15055), (4, 9, 15060, 15070), (5, 12, 15080, 15090)]
        .into_iter()
        .map(|(id, m, bid, ask)| Quote { id,
                                         ts: hm(10, m),
                                         symbol: "AAPL".into(),
                                         bid,
                                         ask })
        .collect()
});

/// Recorrido del escáner ASOF para un trade: arranca en la quote más reciente
/// y retrocede hasta la primera con `ts <= trade.ts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsofScan {
    pub trade_id: u32,
    /// Quote donde se activa el escáner.
    pub start: u32,
    /// Quotes posteriores al trade, descartadas en el retroceso.
    pub rejected: Vec<u32>,
    pub selected: Option<Quote>,
}

/// Fila resultado del ASOF JOIN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsofRow {
    pub trade_id: u32,
    pub trade_ts: NaiveTime,
    pub price: Cents,
    pub quote_id: Option<u32>,
    pub quote_ts: Option<NaiveTime>,
    pub bid: Option<Cents>,
    pub ask: Option<Cents>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickData {
    trades: Vec<Trade>,
    quotes: Vec<Quote>,
}

impl TickData {
    /// Las quotes deben venir ordenadas por timestamp.
    pub fn new(trades: Vec<Trade>, quotes: Vec<Quote>) -> Result<Self, DomainError> {
        if quotes.windows(2).any(|w| w[0].ts > w[1].ts) {
            return Err(DomainError::Validation("quotes fuera de orden temporal".into()));
        }
        Ok(Self { trades, quotes })
    }

    /// Cuatro trades y cinco quotes de AAPL entre las 10:00 y las 10:14.
    pub fn aapl_sample() -> Self {
        Self { trades: TRADES.clone(),
               quotes: QUOTES.clone() }
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn dataset_hash(&self) -> String {
        format!("{}:{}", crate::dataset_hash(&self.trades), crate::dataset_hash(&self.quotes))
    }

    pub fn scan_for(&self, trade: &Trade) -> Option<AsofScan> {
        let start = self.quotes.last()?.id;
        let mut rejected = Vec::new();
        let mut selected = None;
        for q in self.quotes.iter().rev() {
            if q.ts > trade.ts {
                rejected.push(q.id);
            } else {
                selected = Some(q.clone());
                break;
            }
        }
        Some(AsofScan { trade_id: trade.id,
                         start,
                         rejected,
                         selected })
    }

    /// `trades ASOF JOIN quotes MATCH_CONDITION (t.ts >= q.ts)`.
    pub fn asof_join(&self) -> Vec<AsofRow> {
        self.trades
            .iter()
            .map(|t| {
                let q = self.scan_for(t).and_then(|p| p.selected);
                AsofRow::merge(t, q.as_ref())
            })
            .collect()
    }
}

impl AsofRow {
    pub fn merge(trade: &Trade, quote: Option<&Quote>) -> Self {
        Self { trade_id: trade.id,
               trade_ts: trade.ts,
               price: trade.price,
               quote_id: quote.map(|q| q.id),
               quote_ts: quote.map(|q| q.ts),
               bid: quote.map(|q| q.bid),
               ask: quote.map(|q| q.ask) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub ts: u32,
    pub value: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMethod {
    /// `LAST_VALUE(v) IGNORE NULLS`
    #[default]
    LastValue,
    /// Interpolación lineal entre el último valor relleno y el siguiente real.
    Linear,
}

impl FillMethod {
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lastvalue" | "last_value" | "last" => Ok(FillMethod::LastValue),
            "linear" => Ok(FillMethod::Linear),
            other => Err(DomainError::Validation(format!("método de relleno desconocido: {other}"))),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FillMethod::LastValue => "IGNORE NULLS (Last Value)",
            FillMethod::Linear => "LINEAR INTERPOLATION",
        }
    }
}

/// Bucket ya procesado por el relleno.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilledBucket {
    pub ts: u32,
    pub raw: Option<i64>,
    pub filled: Option<i64>,
    /// Valor calculado por interpolación.
    pub synthetic: bool,
}

/// Cómo se obtuvo el valor de un bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FillKind {
    Present,
    CarriedForward,
    Interpolated { from: i64, to: i64 },
    /// Sin valor futuro para interpolar: se repite el último.
    Fallback,
}

static SENSOR_BUCKETS: Lazy<Vec<Bucket>> = Lazy::new(|| {
    [Some(75), Some(78), None, None, Some(85), Some(87), None, Some(82), Some(80)]
        .into_iter()
        .enumerate()
        .map(|(i, value)| Bucket { ts: i as u32, value })
        .collect()
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapSeries {
    buckets: Vec<Bucket>,
}

impl GapSeries {
    pub fn new(buckets: Vec<Bucket>) -> Self {
        Self { buckets }
    }

    /// Nueve buckets con tres huecos (T2, T3, T6).
    pub fn sensor_sample() -> Self {
        Self::new(SENSOR_BUCKETS.clone())
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn dataset_hash(&self) -> String {
        crate::dataset_hash(&self.buckets)
    }

    /// Rellena el bucket `pos` dados los ya procesados `done` (posiciones
    /// `0..pos`). El redondeo es half-up.
    pub fn fill_at(&self, pos: usize, done: &[FilledBucket], method: FillMethod) -> Option<(FilledBucket, FillKind)> {
        let bucket = *self.buckets.get(pos)?;
        let last = done.last().and_then(|b| b.filled);
        let filled = |filled, synthetic| FilledBucket { ts: bucket.ts,
                                                        raw: bucket.value,
                                                        filled,
                                                        synthetic };
        if let Some(v) = bucket.value {
            return Some((filled(Some(v), false), FillKind::Present));
        }
        let out = match method {
            FillMethod::LastValue => (filled(last, false), FillKind::CarriedForward),
            FillMethod::Linear => {
                let next = self.buckets[pos + 1..].iter()
                                                  .enumerate()
                                                  .find_map(|(off, b)| b.value.map(|v| (pos + 1 + off, v)));
                match (last, next) {
                    (Some(from), Some((next_idx, to))) => {
                        let gap = (next_idx + 1 - pos) as f64;
                        let step = (to - from) as f64 / gap;
                        let value = (from as f64 + step + 0.5).floor() as i64;
                        (filled(Some(value), true), FillKind::Interpolated { from, to })
                    }
                    _ => (filled(last, false), FillKind::Fallback),
                }
            }
        };
        Some(out)
    }

    pub fn fill_all(&self, method: FillMethod) -> Vec<FilledBucket> {
        let mut done = Vec::with_capacity(self.buckets.len());
        for pos in 0..self.buckets.len() {
            if let Some((b, _)) = self.fill_at(pos, &done, method) {
                done.push(b);
            }
        }
        done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asof_picks_the_closest_preceding_quote() {
        let data = TickData::aapl_sample();
        let matched: Vec<Option<u32>> = data.asof_join().iter().map(|r| r.quote_id).collect();
        assert_eq!(matched, vec![Some(1), Some(2), Some(4), Some(5)]);
    }

    #[test]
    fn scan_rejects_future_quotes_first() {
        let data = TickData::aapl_sample();
        let p = data.scan_for(&data.trades()[0]).unwrap();
        assert_eq!(p.start, 5);
        assert_eq!(p.rejected, vec![5, 4, 3, 2]);
        assert_eq!(p.selected.map(|q| q.id), Some(1));
        let last = data.scan_for(&data.trades()[3]).unwrap();
        assert!(last.rejected.is_empty());
    }

    #[test]
    fn unordered_quotes_are_rejected() {
        let mut quotes = QUOTES.clone();
        quotes.swap(0, 1);
        assert!(TickData::new(TRADES.clone(), quotes).is_err());
    }

    #[test]
    fn last_value_carries_forward() {
        let filled = GapSeries::sensor_sample().fill_all(FillMethod::LastValue);
        let gaps: Vec<Option<i64>> = [2, 3, 6].iter().map(|&i| filled[i].filled).collect();
        assert_eq!(gaps, vec![Some(78), Some(78), Some(87)]);
        assert!(filled.iter().all(|b| !b.synthetic));
    }

    #[test]
    fn linear_bridges_round_half_up() {
        let filled = GapSeries::sensor_sample().fill_all(FillMethod::Linear);
        let gaps: Vec<Option<i64>> = [2, 3, 6].iter().map(|&i| filled[i].filled).collect();
        assert_eq!(gaps, vec![Some(80), Some(83), Some(85)]);
        assert!(filled[2].synthetic && !filled[4].synthetic);
    }

    #[test]
    fn trailing_gap_falls_back_to_last_value() {
        let series = GapSeries::new(vec![Bucket { ts: 0, value: Some(10) }, Bucket { ts: 1, value: None }]);
        let (b, kind) = series.fill_at(1, &series.fill_all(FillMethod::Linear)[..1], FillMethod::Linear)
                              .unwrap();
        assert_eq!((b.filled, kind), (Some(10), FillKind::Fallback));
        assert_eq!(format_cents(15025), "150.25");
        assert_eq!(FillMethod::parse("LINEAR").unwrap(), FillMethod::Linear);
        assert!(FillMethod::parse("spline").is_err());
    }
}
