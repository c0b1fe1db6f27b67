// bom.rs
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Fila de la tabla BOM_COMPONENTS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomItem {
    pub parent: String,
    pub child: String,
    pub qty: u32,
}

impl BomItem {
    fn new(parent: &str, child: &str, qty: u32) -> Self {
        Self { parent: parent.to_string(),
               child: child.to_string(),
               qty }
    }

    /// Clave usada para resaltar la fila emparejada ("PARENT-CHILD").
    pub fn match_key(&self) -> String {
        format!("{}-{}", self.parent, self.child)
    }
}

/// Fila del resultado de la CTE recursiva: el componente y su nivel (1 = hijo
/// directo de la raíz).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyRow {
    pub parent: String,
    pub child: String,
    pub qty: u32,
    pub level: u32,
}

impl HierarchyRow {
    pub fn from_item(item: &BomItem, level: u32) -> Self {
        Self { parent: item.parent.clone(),
               child: item.child.clone(),
               qty: item.qty,
               level }
    }

    pub fn match_key(&self) -> String {
        format!("{}-{}", self.parent, self.child)
    }
}

static ENGINE_BOM: Lazy<Vec<BomItem>> = Lazy::new(|| {
    vec![BomItem::new("ENGINE-VPI-001", "BLOCK-ASM", 1),
         BomItem::new("ENGINE-VPI-001", "PISTON-SET", 6),
         BomItem::new("ENGINE-VPI-001", "CRANKSHAFT", 1),
         BomItem::new("BLOCK-ASM", "CYLINDER-LINER", 6),
         BomItem::new("BLOCK-ASM", "CAM-BEARING", 12),
         BomItem::new("PISTON-SET", "PISTON-RING", 3),
         BomItem::new("PISTON-SET", "WRIST-PIN", 1),
         BomItem::new("PISTON-RING", "STEEL-COAT", 1),
         // Ensamble ajeno al motor: nunca debe aparecer en la explosión.
         BomItem::new("TURBO-ASSY", "IMPELLER", 1)]
});

/// Tabla BOM inmutable. Las búsquedas preservan el orden de inserción.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomTable {
    items: Vec<BomItem>,
}

impl BomTable {
    pub fn new(items: Vec<BomItem>) -> Self {
        Self { items }
    }

    /// Dataset del motor ENGINE-VPI-001 (9 filas).
    pub fn engine_sample() -> Self {
        Self::new(ENGINE_BOM.clone())
    }

    pub fn items(&self) -> &[BomItem] {
        &self.items
    }

    pub fn dataset_hash(&self) -> String {
        crate::dataset_hash(&self.items)
    }

    /// Filas cuyo padre es `parent`, en orden de tabla.
    pub fn children_of(&self, parent: &str) -> Vec<&BomItem> {
        self.items.iter().filter(|i| i.parent == parent).collect()
    }

    /// Miembro ancla: hijos directos de `root` con nivel 1.
    pub fn anchor(&self, root: &str) -> Result<Vec<HierarchyRow>, DomainError> {
        let rows: Vec<HierarchyRow> = self.children_of(root)
                                          .into_iter()
                                          .map(|i| HierarchyRow::from_item(i, 1))
                                          .collect();
        if rows.is_empty() {
            return Err(DomainError::NotFound(format!("no hay componentes con padre '{root}'")));
        }
        Ok(rows)
    }

    /// Miembro recursivo: une el buffer de entrada contra la tabla. Para cada
    /// fila de entrada (en orden) emite sus hijos con `level + 1`.
    pub fn expand(&self, input: &[HierarchyRow]) -> Vec<HierarchyRow> {
        input.iter()
             .flat_map(|p| {
                 self.children_of(&p.child)
                     .into_iter()
                     .map(move |c| HierarchyRow::from_item(c, p.level + 1))
             })
             .collect()
    }

    /// Explosión completa (anchor + iteraciones hasta buffer vacío).
    pub fn explode(&self, root: &str) -> Result<Vec<HierarchyRow>, DomainError> {
        let mut frontier = self.anchor(root)?;
        let mut out = frontier.clone();
        while !frontier.is_empty() {
            frontier = self.expand(&frontier);
            out.extend(frontier.iter().cloned());
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_keeps_table_order() {
        let bom = BomTable::engine_sample();
        let anchor = bom.anchor("ENGINE-VPI-001").unwrap();
        let kids: Vec<&str> = anchor.iter().map(|r| r.child.as_str()).collect();
        assert_eq!(kids, vec!["BLOCK-ASM", "PISTON-SET", "CRANKSHAFT"]);
        assert!(anchor.iter().all(|r| r.level == 1));
    }

    #[test]
    fn unknown_root_is_not_found() {
        let bom = BomTable::engine_sample();
        assert!(matches!(bom.anchor("NOPE"), Err(DomainError::NotFound(_))));
    }

    #[test]
    fn explosion_has_three_levels_and_skips_unrelated_rows() {
        let bom = BomTable::engine_sample();
        let rows = bom.explode("ENGINE-VPI-001").unwrap();
        assert_eq!(rows.len(), 8);
        assert_eq!(rows.iter().map(|r| r.level).max(), Some(3));
        assert!(!rows.iter().any(|r| r.child == "IMPELLER"));
        assert_eq!(rows.last().map(|r| r.child.as_str()), Some("STEEL-COAT"));
    }

    #[test]
    fn dataset_hash_is_stable() {
        assert_eq!(BomTable::engine_sample().dataset_hash(), BomTable::engine_sample().dataset_hash());
        let mut items = BomTable::engine_sample().items().to_vec();
        items.pop();
        assert_ne!(BomTable::new(items).dataset_hash(), BomTable::engine_sample().dataset_hash());
    }
}
