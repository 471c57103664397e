//! Connection identity resolution.
//!
//! Verifying a session token is delegated to an [`IdentityResolver`]; this
//! module only decides what identity a connection ends up with. A rejected
//! token never blocks the connection, it just falls through to the visitor
//! identifier or to an anonymous guest.

use tracing::debug;

use shurahub_types::error::IdentityError;
use shurahub_types::session::Identity;

/// Verifies a session token and returns the account id it names.
pub trait IdentityResolver: Send + Sync {
    fn verify(&self, token: &str) -> Result<String, IdentityError>;
}

/// Resolve the identity of a new connection.
///
/// `resolver` is `None` when token verification is not configured.
pub fn resolve_identity<R: IdentityResolver + ?Sized>(
    resolver: Option<&R>,
    token: Option<&str>,
    visitor_id: Option<String>,
) -> Identity {
    let account = match (resolver, token) {
        (Some(resolver), Some(token)) if !token.is_empty() => match resolver.verify(token) {
            Ok(user_id) => Some(user_id),
            Err(e) => {
                debug!(error = %e, "session token rejected, continuing as guest");
                None
            }
        },
        _ => None,
    };
    Identity::resolve(account, visitor_id)
}
