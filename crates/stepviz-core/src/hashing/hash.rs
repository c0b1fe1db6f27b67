//! Hash helpers sobre blake3 (hex de 64 caracteres).

use blake3::Hasher;
use serde::Serialize;
use serde_json::Value;

use super::to_canonical_json;

/// Hashea un string y devuelve hex.
pub fn hash_str(input: &str) -> String {
    let mut h = Hasher::new();
    h.update(input.as_bytes());
    h.finalize().to_hex().to_string()
}

/// Hashea un `Value` tras canonicalizarlo: el orden de las claves no afecta.
pub fn hash_value(value: &Value) -> String {
    hash_str(&to_canonical_json(value))
}

/// Hashea cualquier tipo serializable vía su representación JSON canónica.
pub fn hash_serializable<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let v = serde_json::to_value(value)?;
    Ok(hash_value(&v))
}
