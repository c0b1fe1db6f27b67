use stepviz_scenarios::ScenarioError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Uso inválido: {0}")]
    Usage(String),
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error("Error en IO: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}

impl AppError {
    /// Código de salida del proceso: 2 uso, 4 no encontrado, 5 interno.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Usage(_) | AppError::Scenario(ScenarioError::InvalidOption { .. }) => 2,
            AppError::Scenario(ScenarioError::UnknownScenario(_)) => 4,
            _ => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_variant_from() {
        let io_err = std::io::Error::other("falló IO");
        let err: AppError = io_err.into();
        assert_eq!(err.to_string(), "Error en IO: falló IO");
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(AppError::Usage("x".into()).exit_code(), 2);
        assert_eq!(AppError::Scenario(ScenarioError::UnknownScenario("x".into())).exit_code(), 4);
        let bad = ScenarioError::InvalidOption { name: "key".into(),
                                                 reason: "nan".into() };
        assert_eq!(AppError::Scenario(bad).exit_code(), 2);
    }
}
