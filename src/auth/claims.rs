use serde::{Deserialize, Serialize};

/// Who a token was issued to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    User,
    Admin,
}

/// JWT payload used for authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,    // user ID, or the admin email
    pub iat: usize,     // issued at (unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<usize>, // only when a TTL is configured
    pub iss: String,    // issuer
    pub aud: String,    // audience
    pub kind: TokenKind
}
