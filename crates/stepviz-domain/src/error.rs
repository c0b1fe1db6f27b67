use thiserror::Error;

/// Errores del dominio de datasets de ejemplo
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validación fallida: {0}")]
    Validation(String),
    #[error("Entidad no encontrada: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_variant_format() {
        let err = DomainError::Validation("rango inválido".into());
        assert_eq!(err.to_string(), "Validación fallida: rango inválido");
    }

    #[test]
    fn test_not_found_variant_format() {
        let err = DomainError::NotFound("TURBO".into());
        assert_eq!(err.to_string(), "Entidad no encontrada: TURBO");
    }
}
