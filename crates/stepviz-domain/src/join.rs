// join.rs
//! Tablas A/B de una sola columna y semántica de JOIN con NULL.
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinValue {
    pub id: u32,
    pub value: Option<String>,
}

impl JoinValue {
    fn new(id: u32, value: Option<&str>) -> Self {
        Self { id,
               value: value.map(str::to_string) }
    }

    /// Texto a mostrar ("NULL" para valores ausentes).
    pub fn display(&self) -> &str {
        self.value.as_deref().unwrap_or("NULL")
    }

    /// Igualdad SQL: NULL no es igual a nada, ni siquiera a otro NULL.
    pub fn sql_eq(&self, other: &JoinValue) -> bool {
        match (&self.value, &other.value) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinKind::Inner => "inner",
            JoinKind::Left => "left",
            JoinKind::Right => "right",
            JoinKind::Full => "full",
            JoinKind::Cross => "cross",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "inner" => Ok(JoinKind::Inner),
            "left" => Ok(JoinKind::Left),
            "right" => Ok(JoinKind::Right),
            "full" => Ok(JoinKind::Full),
            "cross" => Ok(JoinKind::Cross),
            other => Err(DomainError::Validation(format!("tipo de join desconocido: {other}"))),
        }
    }

    pub fn keeps_unmatched_left(&self) -> bool {
        matches!(self, JoinKind::Left | JoinKind::Full)
    }

    pub fn keeps_unmatched_right(&self) -> bool {
        matches!(self, JoinKind::Right | JoinKind::Full)
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            JoinKind::Inner => "SELECT A.value, B.value FROM A INNER JOIN B ON A.value = B.value",
            JoinKind::Left => "SELECT A.value, B.value FROM A LEFT JOIN B ON A.value = B.value",
            JoinKind::Right => "SELECT A.value, B.value FROM A RIGHT JOIN B ON A.value = B.value",
            JoinKind::Full => "SELECT A.value, B.value FROM A FULL OUTER JOIN B ON A.value = B.value",
            JoinKind::Cross => "SELECT A.value, B.value FROM A CROSS JOIN B",
        }
    }
}

/// Fila del resultado; `None` representa el lado rellenado con NULL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinPair {
    pub left: Option<JoinValue>,
    pub right: Option<JoinValue>,
}

static TABLE_A: Lazy<Vec<JoinValue>> = Lazy::new(|| {
    vec![JoinValue::new(0, Some("1")),
         JoinValue::new(1, Some("2")),
         JoinValue::new(2, Some("0")),
         JoinValue::new(3, Some("0")),
         JoinValue::new(4, None),
         JoinValue::new(5, None),
         JoinValue::new(6, Some("2"))]
});

static TABLE_B: Lazy<Vec<JoinValue>> = Lazy::new(|| {
    vec![JoinValue::new(0, Some("2")),
         JoinValue::new(1, Some("0")),
         JoinValue::new(2, Some("0")),
         JoinValue::new(3, None),
         JoinValue::new(4, Some("4"))]
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinTables {
    pub left: Vec<JoinValue>,
    pub right: Vec<JoinValue>,
}

impl JoinTables {
    pub fn sample() -> Self {
        Self { left: TABLE_A.clone(),
               right: TABLE_B.clone() }
    }

    pub fn dataset_hash(&self) -> String {
        let both: Vec<&JoinValue> = self.left.iter().chain(self.right.iter()).collect();
        crate::dataset_hash(&both)
    }

    /// Pares que produce una fila de A (sin relleno NULL).
    pub fn probe(&self, kind: JoinKind, left: &JoinValue) -> Vec<JoinPair> {
        self.right
            .iter()
            .filter(|r| kind == JoinKind::Cross || left.sql_eq(r))
            .map(|r| JoinPair { left: Some(left.clone()),
                                right: Some(r.clone()) })
            .collect()
    }

    /// Filas de B sin ninguna coincidencia en A.
    pub fn unmatched_right(&self) -> Vec<&JoinValue> {
        self.right
            .iter()
            .filter(|r| !self.left.iter().any(|l| l.sql_eq(r)))
            .collect()
    }

    /// Resultado completo: filas de A en orden con sus pares (o relleno NULL
    /// si el tipo conserva A), luego las filas de B sin pareja si el tipo
    /// conserva B.
    pub fn join_pairs(&self, kind: JoinKind) -> Vec<JoinPair> {
        let mut out = Vec::new();
        for l in &self.left {
            let pairs = self.probe(kind, l);
            if pairs.is_empty() && kind.keeps_unmatched_left() {
                out.push(JoinPair { left: Some(l.clone()),
                                    right: None });
            }
            out.extend(pairs);
        }
        if kind.keeps_unmatched_right() {
            out.extend(self.unmatched_right()
                           .into_iter()
                           .map(|r| JoinPair { left: None,
                                               right: Some(r.clone()) }));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_never_matches() {
        let a = JoinValue::new(0, None);
        let b = JoinValue::new(1, None);
        assert!(!a.sql_eq(&b));
        assert!(!a.sql_eq(&a));
        assert_eq!(a.display(), "NULL");
    }

    #[test]
    fn result_sizes_per_join_kind() {
        let t = JoinTables::sample();
        assert_eq!(t.join_pairs(JoinKind::Inner).len(), 6);
        assert_eq!(t.join_pairs(JoinKind::Left).len(), 9);
        assert_eq!(t.join_pairs(JoinKind::Right).len(), 8);
        assert_eq!(t.join_pairs(JoinKind::Full).len(), 11);
        assert_eq!(t.join_pairs(JoinKind::Cross).len(), 35);
    }

    #[test]
    fn unmatched_right_includes_null_and_four() {
        let t = JoinTables::sample();
        let ids: Vec<u32> = t.unmatched_right().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 4]);
    }

    #[test]
    fn parse_rejects_unknown_kind() {
        assert_eq!(JoinKind::parse("full").unwrap(), JoinKind::Full);
        assert!(JoinKind::parse("semi").is_err());
    }
}
