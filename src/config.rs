//! Configuración del reproductor.
//! Carga variables de entorno (.env) una sola vez y las expone como `AppConfig`.
use once_cell::sync::Lazy;
use dotenvy::dotenv;

use crate::errors::AppError;

pub const DEFAULT_SCENARIO: &str = "recursive_cte";
pub const DEFAULT_CUE_TICK_MS: u64 = 400;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

/// Parámetros del host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Escenario que abre `play` sin id (`STEPVIZ_DEFAULT_SCENARIO`).
    pub default_scenario: String,
    /// Paso del reloj virtual al drenar cues (`STEPVIZ_CUE_TICK_MS`).
    pub cue_tick_ms: u64,
    /// Imprimir el state bag en cada frame (`STEPVIZ_SHOW_BAG`).
    pub show_bag: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { default_scenario: DEFAULT_SCENARIO.to_string(),
               cue_tick_ms: DEFAULT_CUE_TICK_MS,
               show_bag: true }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Construye la configuración a partir de una función de búsqueda; las
    /// variables ausentes toman el valor por defecto.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
        where F: Fn(&str) -> Option<String>
    {
        let defaults = Self::default();
        let default_scenario = lookup("STEPVIZ_DEFAULT_SCENARIO").filter(|s| !s.trim().is_empty())
                                                                 .unwrap_or(defaults.default_scenario);
        let cue_tick_ms = match lookup("STEPVIZ_CUE_TICK_MS") {
            Some(v) => {
                let ms: u64 = v.trim()
                               .parse()
                               .map_err(|e| AppError::Config(format!("STEPVIZ_CUE_TICK_MS='{v}': {e}")))?;
                if ms == 0 {
                    return Err(AppError::Config("STEPVIZ_CUE_TICK_MS debe ser mayor que 0".into()));
                }
                ms
            }
            None => defaults.cue_tick_ms,
        };
        let show_bag = match lookup("STEPVIZ_SHOW_BAG").as_deref().map(str::trim) {
            None => defaults.show_bag,
            Some("1" | "true" | "yes" | "on") => true,
            Some("0" | "false" | "no" | "off") => false,
            Some(other) => return Err(AppError::Config(format!("STEPVIZ_SHOW_BAG='{other}' no es booleano"))),
        };
        Ok(Self { default_scenario,
                  cue_tick_ms,
                  show_bag })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter()
                                                .map(|(k, v)| (k.to_string(), v.to_string()))
                                                .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.default_scenario, "recursive_cte");
    }

    #[test]
    fn reads_overrides() {
        let cfg = AppConfig::from_lookup(lookup(&[("STEPVIZ_DEFAULT_SCENARIO", "joins"),
                                                  ("STEPVIZ_CUE_TICK_MS", "100"),
                                                  ("STEPVIZ_SHOW_BAG", "off")])).unwrap();
        assert_eq!((cfg.default_scenario.as_str(), cfg.cue_tick_ms, cfg.show_bag), ("joins", 100, false));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(AppConfig::from_lookup(lookup(&[("STEPVIZ_CUE_TICK_MS", "fast")])),
                         Err(AppError::Config(_))));
        assert!(matches!(AppConfig::from_lookup(lookup(&[("STEPVIZ_CUE_TICK_MS", "0")])),
                         Err(AppError::Config(_))));
        assert!(matches!(AppConfig::from_lookup(lookup(&[("STEPVIZ_SHOW_BAG", "maybe")])),
                         Err(AppError::Config(_))));
    }
}
