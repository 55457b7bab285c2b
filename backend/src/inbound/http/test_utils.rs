//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::{HttpResponse, web};

use crate::domain::{Actor, Error};

use super::session::SessionContext;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Route handler that persists the posted actor into the session.
///
/// Endpoint tests mount this under a throwaway path, call it once to obtain
/// a session cookie, and then exercise the real handlers with that cookie.
pub async fn persist_actor_for_tests(
    session: SessionContext,
    actor: web::Json<Actor>,
) -> Result<HttpResponse, Error> {
    session.persist_actor(&actor)?;
    Ok(HttpResponse::Ok().finish())
}
