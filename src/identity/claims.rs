use serde::{Deserialize, Serialize};

/// The facts a verified token attests to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Owner user id, server-assigned at registration.
    pub id: String,
    pub username: String,
    /// Issue time, unix seconds.
    pub iat: i64,
    /// Expiry instant, unix seconds. The token is valid strictly before this.
    pub exp: i64,
}
