// concurrency.rs
//! Control de concurrencia de juguete: versiones MVCC de una fila y una tabla
//! de locks exclusivos con grafo de espera para detectar deadlocks.
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Transacciones del ejemplo. El orden es el de inicio; la más joven es la
/// mayor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TxId {
    System,
    TxA,
    TxB,
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TxId::System => "System",
            TxId::TxA => "TxA",
            TxId::TxB => "TxB",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowVersion {
    pub version: u32,
    pub value: i64,
    pub created_by: TxId,
    pub committed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionStatus {
    /// Última versión confirmada: la que ven todas las transacciones.
    Current,
    /// Versión confirmada reemplazada por otra más nueva.
    Historical,
    /// Sólo visible para la transacción que la creó.
    Uncommitted,
}

/// Cadena de versiones de una única fila.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionStore {
    pub row_id: u32,
    versions: Vec<RowVersion>,
}

impl VersionStore {
    /// Fila con una primera versión ya confirmada por `System`.
    pub fn committed_row(row_id: u32, value: i64) -> Self {
        Self { row_id,
               versions: vec![RowVersion { version: 1,
                                           value,
                                           created_by: TxId::System,
                                           committed: true }] }
    }

    pub fn versions(&self) -> &[RowVersion] {
        &self.versions
    }

    /// Crea una versión nueva, sin confirmar, en nombre de `tx`.
    pub fn update(&mut self, tx: TxId, value: i64) -> &RowVersion {
        let version = self.versions.last().map_or(1, |v| v.version + 1);
        self.versions.push(RowVersion { version,
                                        value,
                                        created_by: tx,
                                        committed: false });
        &self.versions[self.versions.len() - 1]
    }

    /// Confirma las versiones de `tx`. Devuelve cuántas se confirmaron.
    pub fn commit(&mut self, tx: TxId) -> usize {
        let mut n = 0;
        for v in self.versions.iter_mut().filter(|v| v.created_by == tx && !v.committed) {
            v.committed = true;
            n += 1;
        }
        n
    }

    /// Descarta las versiones no confirmadas de `tx`.
    pub fn rollback(&mut self, tx: TxId) -> usize {
        let before = self.versions.len();
        self.versions.retain(|v| v.committed || v.created_by != tx);
        before - self.versions.len()
    }

    /// Lectura READ COMMITTED: la versión más nueva confirmada, o la propia
    /// sin confirmar de `tx`.
    pub fn read(&self, tx: TxId) -> Option<&RowVersion> {
        self.versions
            .iter()
            .rev()
            .find(|v| v.committed || v.created_by == tx)
    }

    pub fn status(&self, v: &RowVersion) -> VersionStatus {
        if !v.committed {
            return VersionStatus::Uncommitted;
        }
        let newest = self.versions
                         .iter()
                         .filter(|x| x.committed)
                         .map(|x| x.version)
                         .max();
        if newest == Some(v.version) {
            VersionStatus::Current
        } else {
            VersionStatus::Historical
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LockOutcome {
    Granted,
    AlreadyHeld,
    Waiting { holder: TxId },
}

/// Locks exclusivos por recurso y cola de espera FIFO.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockTable {
    holders: BTreeMap<String, TxId>,
    waiting: Vec<(TxId, String)>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn holder(&self, resource: &str) -> Option<TxId> {
        self.holders.get(resource).copied()
    }

    pub fn held_by(&self, tx: TxId) -> Vec<String> {
        self.holders
            .iter()
            .filter(|(_, h)| **h == tx)
            .map(|(r, _)| r.clone())
            .collect()
    }

    pub fn waiting_for(&self, tx: TxId) -> Option<&str> {
        self.waiting
            .iter()
            .find(|(w, _)| *w == tx)
            .map(|(_, r)| r.as_str())
    }

    pub fn acquire(&mut self, tx: TxId, resource: &str) -> LockOutcome {
        match self.holder(resource) {
            None => {
                self.holders.insert(resource.to_string(), tx);
                LockOutcome::Granted
            }
            Some(holder) if holder == tx => LockOutcome::AlreadyHeld,
            Some(holder) => {
                if self.waiting_for(tx) != Some(resource) {
                    self.waiting.push((tx, resource.to_string()));
                }
                LockOutcome::Waiting { holder }
            }
        }
    }

    /// Libera todos los locks de `tx` (commit o rollback) y retira sus
    /// esperas. Cada recurso liberado pasa a la primera transacción en espera.
    /// Devuelve `(recurso, nuevo titular)`.
    pub fn release_all(&mut self, tx: TxId) -> Vec<(String, Option<TxId>)> {
        self.waiting.retain(|(w, _)| *w != tx);
        let mut handoffs = Vec::new();
        for resource in self.held_by(tx) {
            self.holders.remove(&resource);
            let next = self.waiting
                           .iter()
                           .position(|(_, r)| *r == resource)
                           .map(|i| self.waiting.remove(i).0);
            if let Some(n) = next {
                self.holders.insert(resource.clone(), n);
            }
            handoffs.push((resource, next));
        }
        handoffs
    }

    /// Busca un ciclo en el grafo de espera (esperador -> titular). Devuelve
    /// las transacciones del ciclo en orden de recorrido.
    pub fn wait_for_cycle(&self) -> Option<Vec<TxId>> {
        let edge = |tx: TxId| {
            self.waiting_for(tx)
                .and_then(|r| self.holder(r))
                .filter(|h| *h != tx)
        };
        for (start, _) in &self.waiting {
            let mut path = vec![*start];
            let mut cur = *start;
            while let Some(next) = edge(cur) {
                if let Some(i) = path.iter().position(|t| *t == next) {
                    return Some(path.split_off(i));
                }
                path.push(next);
                cur = next;
            }
        }
        None
    }
}

/// La víctima de un deadlock es la transacción más joven del ciclo.
pub fn choose_victim(cycle: &[TxId]) -> Option<TxId> {
    cycle.iter().copied().max()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncommitted_version_is_private() {
        let mut row = VersionStore::committed_row(1, 100);
        row.update(TxId::TxA, 200);
        assert_eq!(row.read(TxId::TxA).map(|v| v.value), Some(200));
        assert_eq!(row.read(TxId::TxB).map(|v| v.value), Some(100));
        assert_eq!(row.commit(TxId::TxA), 1);
        assert_eq!(row.read(TxId::TxB).map(|v| v.value), Some(200));
        let statuses: Vec<VersionStatus> = row.versions().iter().map(|v| row.status(v)).collect();
        assert_eq!(statuses, vec![VersionStatus::Historical, VersionStatus::Current]);
    }

    #[test]
    fn rollback_drops_only_own_uncommitted_versions() {
        let mut row = VersionStore::committed_row(1, 100);
        row.update(TxId::TxB, 300);
        assert_eq!(row.rollback(TxId::TxB), 1);
        assert_eq!(row.versions().len(), 1);
        assert_eq!(row.rollback(TxId::TxB), 0);
    }

    #[test]
    fn release_hands_the_lock_to_the_waiter() {
        let mut locks = LockTable::new();
        assert_eq!(locks.acquire(TxId::TxA, "Row_5"), LockOutcome::Granted);
        assert_eq!(locks.acquire(TxId::TxB, "Row_5"), LockOutcome::Waiting { holder: TxId::TxA });
        assert_eq!(locks.acquire(TxId::TxA, "Row_5"), LockOutcome::AlreadyHeld);
        let handoffs = locks.release_all(TxId::TxA);
        assert_eq!(handoffs, vec![("Row_5".to_string(), Some(TxId::TxB))]);
        assert_eq!(locks.holder("Row_5"), Some(TxId::TxB));
        assert_eq!(locks.waiting_for(TxId::TxB), None);
    }

    #[test]
    fn crossed_waits_form_a_cycle() {
        let mut locks = LockTable::new();
        locks.acquire(TxId::TxA, "X");
        locks.acquire(TxId::TxB, "Y");
        locks.acquire(TxId::TxA, "Y");
        assert_eq!(locks.wait_for_cycle(), None);
        locks.acquire(TxId::TxB, "X");
        let cycle = locks.wait_for_cycle().expect("deadlock");
        assert_eq!(cycle.len(), 2);
        assert_eq!(choose_victim(&cycle), Some(TxId::TxB));
        locks.release_all(TxId::TxB);
        assert_eq!(locks.held_by(TxId::TxA), vec!["X".to_string(), "Y".to_string()]);
        assert_eq!(locks.wait_for_cycle(), None);
    }
}
