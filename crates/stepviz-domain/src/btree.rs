// btree.rs
//! Índice B-tree de dos niveles sobre la tabla de piezas.
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::DomainError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartRow {
    pub id: u32,
    pub name: String,
    pub category: String,
    pub price: u32,
}

static PARTS: Lazy<Vec<PartRow>> = Lazy::new(|| {
    [(1, "BLOCK-ASM", "Assembly", 450),
     (2, "PISTON-SET", "Engine", 280),
     (3, "CRANKSHAFT", "Engine", 890),
     (5, "CAM-BEARING", "Bearing", 45),
     (8, "CYLINDER-LINER", "Engine", 320),
     (9, "WRIST-PIN", "Engine", 65),
     (13, "PISTON-RING", "Engine", 35),
     (21, "STEEL-COAT", "Coating", 120)].into_iter()
                                         .map(|(id, name, category, price)| PartRow { id,
                                                                                      name: name.to_string(),
                                                                                      category: category.to_string(),
                                                                                      price })
                                         .collect()
});

/// Estrategia de acceso simulada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexStrategy {
    /// Sin índice: table scan.
    Heap,
    /// Los datos viven en la hoja del índice.
    Clustered,
    /// La hoja apunta (RID) a la fila en el heap: requiere key lookup.
    NonClustered,
    /// Todas las columnas incluidas en la hoja: sin key lookup.
    Covering,
}

impl IndexStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexStrategy::Heap => "heap",
            IndexStrategy::Clustered => "clustered",
            IndexStrategy::NonClustered => "nonclustered",
            IndexStrategy::Covering => "covering",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "heap" => Ok(IndexStrategy::Heap),
            "clustered" => Ok(IndexStrategy::Clustered),
            "nonclustered" => Ok(IndexStrategy::NonClustered),
            "covering" => Ok(IndexStrategy::Covering),
            other => Err(DomainError::Validation(format!("estrategia de índice desconocida: {other}"))),
        }
    }

    pub fn uses_btree(&self) -> bool {
        !matches!(self, IndexStrategy::Heap)
    }
}

/// Hijo del nodo raíz elegido durante el descenso.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    Left,
    Middle,
    Right,
}

impl Branch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Branch::Left => "LEFT",
            Branch::Middle => "MIDDLE",
            Branch::Right => "RIGHT",
        }
    }
}

/// Camino de un index seek: raíz -> hoja.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeekPath {
    pub key: u32,
    pub root_keys: [u32; 2],
    pub branch: Branch,
    pub leaf_keys: Vec<u32>,
    pub found: Option<PartRow>,
}

/// Una fila inspeccionada durante un table scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanProbe {
    pub position: usize,
    pub id: u32,
    pub matched: bool,
}

/// B-tree de dos niveles: una raíz con dos claves separadoras y tres hojas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BTreeIndex {
    rows: Vec<PartRow>,
    root_keys: [u32; 2],
    leaves: [Vec<u32>; 3],
}

impl BTreeIndex {
    /// Índice de ejemplo con separadores [5, 13].
    pub fn parts_sample() -> Self {
        Self::layout(PARTS.clone(), [5, 13])
    }

    /// Reparte los ids ordenados en las tres hojas según los separadores.
    fn layout(rows: Vec<PartRow>, root_keys: [u32; 2]) -> Self {
        let mut ids: Vec<u32> = rows.iter().map(|r| r.id).collect();
        ids.sort_unstable();
        ids.dedup();
        let mut leaves: [Vec<u32>; 3] = Default::default();
        for id in ids {
            leaves[Self::branch_for(root_keys, id) as usize].push(id);
        }
        Self { rows,
               root_keys,
               leaves }
    }

    fn branch_for(root_keys: [u32; 2], key: u32) -> Branch {
        if key < root_keys[0] {
            Branch::Left
        } else if key < root_keys[1] {
            Branch::Middle
        } else {
            Branch::Right
        }
    }

    pub fn rows(&self) -> &[PartRow] {
        &self.rows
    }

    pub fn root_keys(&self) -> [u32; 2] {
        self.root_keys
    }

    pub fn leaf(&self, branch: Branch) -> &[u32] {
        &self.leaves[branch as usize]
    }

    pub fn dataset_hash(&self) -> String {
        crate::dataset_hash(&self.rows)
    }

    /// Descenso raíz -> hoja y búsqueda de la clave en la hoja.
    pub fn seek(&self, key: u32) -> SeekPath {
        let branch = Self::branch_for(self.root_keys, key);
        let leaf_keys = self.leaf(branch).to_vec();
        let found = if leaf_keys.contains(&key) {
            self.rows.iter().find(|r| r.id == key).cloned()
        } else {
            None
        };
        SeekPath { key,
                   root_keys: self.root_keys,
                   branch,
                   leaf_keys,
                   found }
    }

    /// Recorre el heap completo en orden físico.
    pub fn table_scan(&self, key: u32) -> Vec<ScanProbe> {
        self.rows
            .iter()
            .enumerate()
            .map(|(position, r)| ScanProbe { position,
                                             id: r.id,
                                             matched: r.id == key })
            .collect()
    }
}
