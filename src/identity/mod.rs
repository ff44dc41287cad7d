//! Identity core: token claims and the stateless token service.
//! Keep the public surface thin and split implementation across sub-modules.

mod claims;
mod token;

pub use claims::Claims;
pub use token::{TokenError, TokenService, TOKEN_TTL_SECS};
