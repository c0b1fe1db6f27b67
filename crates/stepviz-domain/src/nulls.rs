// nulls.rs
//! Semántica de NULL: la cascada de COALESCE y la diferencia entre
//! `COUNT(*)` y `COUNT(col)`.
use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Columnas de entrada de `COALESCE(col_1, col_2, col_3)`.
pub fn coalesce_sample() -> Vec<Option<i64>> {
    vec![None, Some(200), Some(300)]
}

/// Bloques de datos que escanea el agregado.
pub fn aggregate_sample() -> Vec<Option<i64>> {
    vec![Some(10), None, Some(20), None, Some(30)]
}

/// Primera posición no NULL; `None` si todas lo son.
pub fn coalesce_stop(columns: &[Option<i64>]) -> Option<usize> {
    columns.iter().position(Option::is_some)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountMode {
    /// `COUNT(*)`: cuenta filas.
    Star,
    /// `COUNT(col)`: ignora los NULL.
    #[default]
    Column,
}

impl CountMode {
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "star" | "*" => Ok(CountMode::Star),
            "col" | "column" => Ok(CountMode::Column),
            other => Err(DomainError::Validation(format!("modo de COUNT desconocido: {other}"))),
        }
    }

    pub fn counts(&self, value: Option<i64>) -> bool {
        matches!(self, CountMode::Star) || value.is_some()
    }

    pub fn sql(&self) -> &'static str {
        match self {
            CountMode::Star => "COUNT(*)",
            CountMode::Column => "COUNT(value)",
        }
    }
}

pub fn count(values: &[Option<i64>], mode: CountMode) -> usize {
    values.iter().filter(|v| mode.counts(**v)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coalesce_stops_at_first_value() {
        assert_eq!(coalesce_stop(&coalesce_sample()), Some(1));
        assert_eq!(coalesce_stop(&[None, None]), None);
    }

    #[test]
    fn count_star_includes_nulls() {
        let blocks = aggregate_sample();
        assert_eq!(count(&blocks, CountMode::Star), 5);
        assert_eq!(count(&blocks, CountMode::Column), 3);
        assert_eq!(CountMode::parse("*").unwrap(), CountMode::Star);
        assert!(CountMode::parse("distinct").is_err());
    }
}
