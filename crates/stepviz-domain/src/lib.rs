// stepviz-domain library entry point
//
// Datasets fijos de los escenarios y las búsquedas cerradas sobre ellos.
pub mod bom;
pub mod btree;
pub mod concurrency;
pub mod error;
pub mod join;
pub mod nulls;
pub mod partition;
pub mod timeseries;
pub mod window;

pub use bom::{BomItem, BomTable, HierarchyRow};
pub use btree::{BTreeIndex, Branch, IndexStrategy, PartRow, SeekPath};
pub use concurrency::{choose_victim, LockOutcome, LockTable, RowVersion, TxId, VersionStatus, VersionStore};
pub use error::DomainError;
pub use join::{JoinKind, JoinPair, JoinTables, JoinValue};
pub use nulls::CountMode;
pub use partition::{MicroPartition, PartitionSet, PruningPredicate, PruningStats};
pub use timeseries::{format_cents, AsofScan, AsofRow, Bucket, Cents, FillKind, FillMethod, FilledBucket, GapSeries, Quote,
                     TickData, Trade};
pub use window::{RankedRow, Standings, TeamStanding, WindowFunc};

use sha2::{Digest, Sha256};

/// Hash de integridad de un dataset: sha256 sobre su JSON serializado.
pub(crate) fn dataset_hash<T: serde::Serialize>(rows: &[T]) -> String {
    let mut hasher = Sha256::new();
    for row in rows {
        // Los tipos del dataset son structs planos; serializar no falla.
        let bytes = serde_json::to_vec(row).unwrap_or_default();
        hasher.update(&bytes);
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}
