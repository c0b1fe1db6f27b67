// partition.rs
//! Micro-particiones con zone maps (MIN/MAX por columna de fecha) y poda.
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicroPartition {
    pub id: u32,
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
    pub rows: u64,
    pub label: String,
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("fecha literal válida")
}

static JAN_FEB_2024: Lazy<Vec<MicroPartition>> = Lazy::new(|| {
    vec![MicroPartition { id: 1, min_date: ymd(2024, 1, 1), max_date: ymd(2024, 1, 10), rows: 1_000_000, label: "Jan 1-10".into() },
         MicroPartition { id: 2, min_date: ymd(2024, 1, 11), max_date: ymd(2024, 1, 20), rows: 1_000_000, label: "Jan 11-20".into() },
         MicroPartition { id: 3, min_date: ymd(2024, 1, 21), max_date: ymd(2024, 1, 31), rows: 1_200_000, label: "Jan 21-31".into() },
         MicroPartition { id: 4, min_date: ymd(2024, 2, 1), max_date: ymd(2024, 2, 10), rows: 900_000, label: "Feb 1-10".into() },
         MicroPartition { id: 5, min_date: ymd(2024, 2, 11), max_date: ymd(2024, 2, 20), rows: 1_100_000, label: "Feb 11-20".into() }]
});

/// Filtro de la consulta sobre la columna de fecha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PruningPredicate {
    /// `WHERE date = d`
    Equals { date: NaiveDate },
    /// `WHERE date >= d`
    AtLeast { date: NaiveDate },
    /// `WHERE date BETWEEN start AND end`
    Between { start: NaiveDate, end: NaiveDate },
}

impl PruningPredicate {
    pub fn equals(date: NaiveDate) -> Self {
        PruningPredicate::Equals { date }
    }

    pub fn at_least(date: NaiveDate) -> Self {
        PruningPredicate::AtLeast { date }
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if start > end {
            return Err(DomainError::Validation(format!("BETWEEN con inicio {start} posterior al fin {end}")));
        }
        Ok(PruningPredicate::Between { start, end })
    }

    /// Parsea `equals:YYYY-MM-DD`, `from:YYYY-MM-DD` o
    /// `between:YYYY-MM-DD..YYYY-MM-DD`.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let (kind, rest) = s.split_once(':')
                            .ok_or_else(|| DomainError::Validation(format!("predicado sin tipo: {s}")))?;
        match kind {
            "equals" => Ok(Self::equals(parse_date(rest)?)),
            "from" => Ok(Self::at_least(parse_date(rest)?)),
            "between" => {
                let (a, b) = rest.split_once("..")
                                 .ok_or_else(|| DomainError::Validation(format!("rango sin '..': {rest}")))?;
                Self::between(parse_date(a)?, parse_date(b)?)
            }
            other => Err(DomainError::Validation(format!("tipo de predicado desconocido: {other}"))),
        }
    }

    /// Texto de la cláusula WHERE.
    pub fn to_sql(&self) -> String {
        match self {
            PruningPredicate::Equals { date } => format!("WHERE order_date = '{date}'"),
            PruningPredicate::AtLeast { date } => format!("WHERE order_date >= '{date}'"),
            PruningPredicate::Between { start, end } => format!("WHERE order_date BETWEEN '{start}' AND '{end}'"),
        }
    }

    /// Decide con el zone map si la partición puede contener filas que
    /// cumplan el filtro. `false` = la partición se poda sin leerla.
    pub fn must_scan(&self, p: &MicroPartition) -> bool {
        match *self {
            PruningPredicate::Equals { date } => date >= p.min_date && date <= p.max_date,
            PruningPredicate::AtLeast { date } => p.max_date >= date,
            PruningPredicate::Between { start, end } => p.max_date >= start && p.min_date <= end,
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| DomainError::Validation(format!("fecha '{s}': {e}")))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruningStats {
    pub scanned_count: usize,
    pub pruned_count: usize,
    pub total_rows: u64,
    pub scanned_rows: u64,
    pub pruned_rows: u64,
    /// Porcentaje de filas evitadas, redondeado.
    pub efficiency_pct: u32,
}

impl PruningStats {
    /// Acumula una partición como escaneada o podada.
    pub fn record(&mut self, p: &MicroPartition, scanned: bool) {
        self.total_rows += p.rows;
        if scanned {
            self.scanned_count += 1;
            self.scanned_rows += p.rows;
        } else {
            self.pruned_count += 1;
            self.pruned_rows += p.rows;
        }
        self.efficiency_pct = if self.total_rows == 0 {
            0
        } else {
            ((self.pruned_rows as f64 / self.total_rows as f64) * 100.0).round() as u32
        };
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionSet {
    partitions: Vec<MicroPartition>,
}

impl PartitionSet {
    pub fn new(partitions: Vec<MicroPartition>) -> Self {
        Self { partitions }
    }

    /// Cinco particiones de enero y febrero de 2024.
    pub fn jan_feb_2024() -> Self {
        Self::new(JAN_FEB_2024.clone())
    }

    pub fn partitions(&self) -> &[MicroPartition] {
        &self.partitions
    }

    pub fn dataset_hash(&self) -> String {
        crate::dataset_hash(&self.partitions)
    }

    pub fn stats(&self, predicate: &PruningPredicate) -> PruningStats {
        let mut stats = PruningStats::default();
        for p in &self.partitions {
            stats.record(p, predicate.must_scan(p));
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equals_scans_a_single_partition() {
        let set = PartitionSet::jan_feb_2024();
        let stats = set.stats(&PruningPredicate::equals(ymd(2024, 1, 15)));
        assert_eq!((stats.scanned_count, stats.pruned_count), (1, 4));
        assert_eq!(stats.total_rows, 5_200_000);
        assert_eq!(stats.scanned_rows, 1_000_000);
        assert_eq!(stats.efficiency_pct, 81);
    }

    #[test]
    fn between_uses_overlap() {
        let set = PartitionSet::jan_feb_2024();
        let pred = PruningPredicate::between(ymd(2024, 1, 15), ymd(2024, 2, 5)).unwrap();
        let scanned: Vec<u32> = set.partitions().iter().filter(|p| pred.must_scan(p)).map(|p| p.id).collect();
        assert_eq!(scanned, vec![2, 3, 4]);
    }

    #[test]
    fn at_least_keeps_later_partitions() {
        let set = PartitionSet::jan_feb_2024();
        let pred = PruningPredicate::parse("from:2024-02-01").unwrap();
        assert_eq!(set.stats(&pred).scanned_count, 2);
    }

    #[test]
    fn inverted_between_is_rejected() {
        let err = PruningPredicate::parse("between:2024-02-05..2024-01-15").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(PruningPredicate::parse("equals:not-a-date").is_err());
        assert!(PruningPredicate::parse("2024-01-15").is_err());
    }
}
