//! Stable content fingerprints for generated artifacts.
//!
//! The generated API schema is a pure function of the catalog, so a
//! fingerprint of its serialized form identifies a schema build.

use blake3::Hasher;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut h = Hasher::new();
        h.update(bytes);
        Fingerprint(h.finalize().into())
    }

    pub fn to_hex(&self) -> String {
        use std::fmt::Write as _;
        self.0.iter().fold(String::with_capacity(64), |mut s, b| {
            let _ = write!(&mut s, "{b:02x}");
            s
        })
    }

    /// First 12 hex characters, for log lines.
    pub fn short(&self) -> String {
        self.to_hex()[..12].to_string()
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Fingerprint any serde-serializable value via its JSON encoding.
pub fn fingerprint<T: Serialize>(value: &T) -> Result<Fingerprint, crate::error::Error> {
    let bytes =
        serde_json::to_vec(value).map_err(|e| crate::error::Error::Hash(e.to_string()))?;
    Ok(Fingerprint::of_bytes(&bytes))
}
