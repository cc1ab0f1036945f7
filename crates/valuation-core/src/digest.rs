use sha2::{Digest, Sha256};

/// SHA-256 hex digest of a set of `|`-joined fields, used for `inputs_digest` and
/// `weights_digest` audit trails -- cheap provenance without persisting the full payload.
pub fn field_digest(fields: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            hasher.update(b"|");
        }
        hasher.update(field.as_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_deterministic() {
        assert_eq!(field_digest(&["a", "b"]), field_digest(&["a", "b"]));
    }

    #[test]
    fn distinguishes_field_boundaries() {
        assert_ne!(field_digest(&["a", "bc"]), field_digest(&["ab", "c"]));
    }
}
