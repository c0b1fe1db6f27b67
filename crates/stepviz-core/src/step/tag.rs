use serde::{Deserialize, Serialize};

/// Categoría de un paso, usada por la presentación para el código de colores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepTag {
    Neutral,
    Anchor,
    Union,
    Recursive,
    Terminate,
    Scan,
    Seek,
    Match,
    Prune,
    Summary,
    Other(String),
}

impl StepTag {
    pub fn as_str(&self) -> &str {
        match self {
            StepTag::Neutral => "neutral",
            StepTag::Anchor => "anchor",
            StepTag::Union => "union",
            StepTag::Recursive => "recursive",
            StepTag::Terminate => "terminate",
            StepTag::Scan => "scan",
            StepTag::Seek => "seek",
            StepTag::Match => "match",
            StepTag::Prune => "prune",
            StepTag::Summary => "summary",
            StepTag::Other(s) => s.as_str(),
        }
    }
}

/// Región visual resaltada: un nombre de región (p. ej. "sql", "table") y las
/// claves de los elementos dentro de ella.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub region: String,
    pub keys: Vec<String>,
}

impl Highlight {
    pub fn new<I, K>(region: impl Into<String>, keys: I) -> Self
        where I: IntoIterator<Item = K>,
              K: Into<String>
    {
        Self { region: region.into(),
               keys: keys.into_iter().map(Into::into).collect() }
    }

    /// Atajo para resaltar líneas numeradas de un listado (SQL).
    pub fn lines<I>(region: impl Into<String>, lines: I) -> Self
        where I: IntoIterator<Item = u32>
    {
        Self { region: region.into(),
               keys: lines.into_iter().map(|l| l.to_string()).collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_serializes_as_snake_case() {
        assert_eq!(serde_json::to_string(&StepTag::Recursive).unwrap(), "\"recursive\"");
        assert_eq!(StepTag::Other("gap_fill".into()).as_str(), "gap_fill");
    }

    #[test]
    fn line_highlight_keys_are_strings() {
        let h = Highlight::lines("sql", [2, 3]);
        assert_eq!(h.keys, vec!["2".to_string(), "3".to_string()]);
    }
}
