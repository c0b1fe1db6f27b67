// window.rs
//! Tabla de posiciones para funciones de ventana: ROW_NUMBER, RANK,
//! DENSE_RANK, LEAD y LAG, con o sin `PARTITION BY group`.
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStanding {
    pub id: u32,
    pub team: String,
    pub points: u32,
    /// Net run rate en milésimas.
    pub nrr_milli: i32,
    pub group: String,
}

static WORLD_CUP: Lazy<Vec<TeamStanding>> = Lazy::new(|| {
    [(1, "India", 18, 2570, "A"),
     (2, "South Africa", 14, 1261, "A"),
     (3, "Australia", 14, 841, "A"),
     (4, "New Zealand", 10, 743, "A"),
     (5, "Pakistan", 8, -199, "A"),
     (6, "Afghanistan", 8, -336, "A"),
     (7, "England", 6, -572, "B"),
     (8, "Bangladesh", 4, -1087, "B"),
     (9, "Sri Lanka", 4, -1419, "B"),
     (10, "Netherlands", 4, -1825, "B")]
        .into_iter()
        .map(|(id, team, points, nrr_milli, group)| TeamStanding { id,
                                                                  team: team.into(),
                                                                  points,
                                                                  nrr_milli,
                                                                  group: group.into() })
        .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowFunc {
    #[default]
    RowNumber,
    Rank,
    DenseRank,
    Lead,
    Lag,
}

impl WindowFunc {
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "row_number" => Ok(WindowFunc::RowNumber),
            "rank" => Ok(WindowFunc::Rank),
            "dense_rank" => Ok(WindowFunc::DenseRank),
            "lead" => Ok(WindowFunc::Lead),
            "lag" => Ok(WindowFunc::Lag),
            other => Err(DomainError::Validation(format!("función de ventana desconocida: {other}"))),
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            WindowFunc::RowNumber => "ROW_NUMBER()",
            WindowFunc::Rank => "RANK()",
            WindowFunc::DenseRank => "DENSE_RANK()",
            WindowFunc::Lead => "LEAD(team)",
            WindowFunc::Lag => "LAG(team)",
        }
    }
}

/// Fila con todas las columnas de ventana ya calculadas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedRow {
    pub standing: TeamStanding,
    pub row_number: u32,
    pub rank: u32,
    pub dense_rank: u32,
    pub lead: Option<String>,
    pub lag: Option<String>,
}

impl RankedRow {
    /// Valor de la columna de `func`, como texto (NULL si no hay fila vecina).
    pub fn value_of(&self, func: WindowFunc) -> String {
        match func {
            WindowFunc::RowNumber => self.row_number.to_string(),
            WindowFunc::Rank => self.rank.to_string(),
            WindowFunc::DenseRank => self.dense_rank.to_string(),
            WindowFunc::Lead => self.lead.clone().unwrap_or_else(|| "NULL".into()),
            WindowFunc::Lag => self.lag.clone().unwrap_or_else(|| "NULL".into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standings {
    rows: Vec<TeamStanding>,
}

impl Standings {
    pub fn new(rows: Vec<TeamStanding>) -> Self {
        Self { rows }
    }

    /// Diez selecciones en dos grupos.
    pub fn world_cup() -> Self {
        Self::new(WORLD_CUP.clone())
    }

    pub fn rows(&self) -> &[TeamStanding] {
        &self.rows
    }

    pub fn dataset_hash(&self) -> String {
        crate::dataset_hash(&self.rows)
    }

    /// `ORDER BY points DESC, nrr DESC`, agrupando antes por grupo si hay
    /// partición.
    pub fn sorted(&self, partitioned: bool) -> Vec<TeamStanding> {
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| {
                let by_group = if partitioned { a.group.cmp(&b.group) } else { std::cmp::Ordering::Equal };
                by_group.then(b.points.cmp(&a.points))
                        .then(b.nrr_milli.cmp(&a.nrr_milli))
            });
        rows
    }

    /// Calcula las columnas de ventana. RANK y DENSE_RANK empatan por puntos.
    pub fn rank(&self, partitioned: bool) -> Vec<RankedRow> {
        let sorted = self.sorted(partitioned);
        let mut out = Vec::with_capacity(sorted.len());
        let mut start = 0;
        while start < sorted.len() {
            let end = if partitioned {
                sorted[start..].iter()
                               .position(|r| r.group != sorted[start].group)
                               .map_or(sorted.len(), |n| start + n)
            } else {
                sorted.len()
            };
            let part = &sorted[start..end];
            let (mut rank, mut dense) = (0, 0);
            for (i, row) in part.iter().enumerate() {
                let tie = i > 0 && part[i - 1].points == row.points;
                if !tie {
                    rank = i as u32 + 1;
                    dense += 1;
                }
                out.push(RankedRow { standing: row.clone(),
                                     row_number: i as u32 + 1,
                                     rank,
                                     dense_rank: dense,
                                     lead: part.get(i + 1).map(|r| r.team.clone()),
                                     lag: i.checked_sub(1).map(|p| part[p].team.clone()) });
            }
            start = end;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(rows: &[RankedRow], func: WindowFunc) -> Vec<String> {
        rows.iter().map(|r| r.value_of(func)).collect()
    }

    #[test]
    fn rank_skips_after_ties_dense_rank_does_not() {
        let rows = Standings::world_cup().rank(false);
        assert_eq!(column(&rows, WindowFunc::Rank), ["1", "2", "2", "4", "5", "5", "7", "8", "8", "8"]);
        assert_eq!(column(&rows, WindowFunc::DenseRank), ["1", "2", "2", "3", "4", "4", "5", "6", "6", "6"]);
        assert_eq!(rows[1].standing.team, "South Africa");
    }

    #[test]
    fn partition_restarts_numbering() {
        let rows = Standings::world_cup().rank(true);
        assert_eq!(column(&rows, WindowFunc::RowNumber), ["1", "2", "3", "4", "5", "6", "1", "2", "3", "4"]);
        assert_eq!(column(&rows, WindowFunc::Rank)[6..], ["1", "2", "2", "2"]);
    }

    #[test]
    fn lead_and_lag_stop_at_partition_edges() {
        let rows = Standings::world_cup().rank(true);
        assert_eq!(rows[5].value_of(WindowFunc::Lead), "NULL");
        assert_eq!(rows[6].value_of(WindowFunc::Lag), "NULL");
        assert_eq!(rows[6].value_of(WindowFunc::Lead), "Bangladesh");
        assert!(WindowFunc::parse("ntile").is_err());
    }
}
