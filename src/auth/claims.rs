use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload used for authentication.
#[derive(Debug, Clone, Serialize)]
pub struct Claims {
    pub sub: Uuid,   // user ID
    pub iat: i64,    // issued at (unix timestamp)
    pub exp: i64,    // expires at (unix timestamp)
    pub iss: String, // issuer
    pub aud: String, // audience
}

/// Payload as it arrives on the wire. `sub` stays loose so a token signed
/// with our key but for a different claim shape is rejected by us, not by
/// serde with an opaque error. `iss`/`aud` are checked by `jsonwebtoken`.
#[derive(Debug, Deserialize)]
pub(super) struct RawClaims {
    #[serde(default)]
    pub sub: Option<serde_json::Value>,
    pub exp: i64,
}

impl RawClaims {
    pub(super) fn user_id(&self) -> Option<Uuid> {
        self.sub
            .as_ref()
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok())
            .filter(|id| !id.is_nil())
    }
}

/// Identity extracted from a verified token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
}
