//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions so handlers only deal with
//! domain-friendly operations such as reading the authenticated actor. The
//! external identity provider's callback writes the user id and role into
//! the session cookie; this service only ever reads them back.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Actor, ActorRole, Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const ROLE_KEY: &str = "role";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated actor in the session cookie.
    ///
    /// Called by the identity provider's callback adapter and by tests.
    pub fn persist_actor(&self, actor: &Actor) -> Result<(), Error> {
        self.0
            .insert(USER_ID_KEY, actor.id.as_ref())
            .and_then(|()| self.0.insert(ROLE_KEY, actor.role.to_string()))
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the current actor from the session, if present and valid.
    pub fn actor(&self) -> Result<Option<Actor>, Error> {
        let raw_id = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        let Some(raw_id) = raw_id else {
            return Ok(None);
        };
        let id = match UserId::new(&raw_id) {
            Ok(id) => id,
            Err(error) => {
                tracing::warn!("invalid user id in session cookie: {error}");
                return Ok(None);
            }
        };

        let role = self
            .0
            .get::<String>(ROLE_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        let role = match role.as_deref().map(str::parse::<ActorRole>) {
            Some(Ok(role)) => role,
            // A session without a stored role predates role support; treat
            // it as a regular member rather than failing every request.
            None => ActorRole::Member,
            Some(Err(error)) => {
                tracing::warn!("invalid role in session cookie: {error}");
                return Ok(None);
            }
        };

        Ok(Some(Actor { id, role }))
    }

    /// Require an authenticated actor or return `401 Unauthorized`.
    pub fn require_actor(&self) -> Result<Actor, Error> {
        self.actor()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Require an authenticated admin or return `401`/`403`.
    pub fn require_admin(&self) -> Result<Actor, Error> {
        let actor = self.require_actor()?;
        if actor.is_admin() {
            Ok(actor)
        } else {
            Err(Error::forbidden("admin role required"))
        }
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
