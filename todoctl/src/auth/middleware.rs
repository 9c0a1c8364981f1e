//! Route protection middleware.
//!
//! Three stages compose in front of a protected handler, outermost first:
//!
//! 1. [`authenticate`] verifies the bearer token and re-reads the identity from
//!    the user store, storing it as a [`CurrentUser`] request extension.
//! 2. [`load_resource`] loads the resource named by the `{id}` path parameter
//!    and stores it as a [`Loaded`] extension.
//! 3. [`require_owner`] compares the two.
//!
//! Each stage either calls the next one or returns an error response; nothing
//! falls through after a failure. With `route_layer`, the layer added last runs
//! first:
//!
//! ```ignore
//! Router::new()
//!     .route("/todos/{id}", get(get_todo))
//!     .route_layer(from_fn(require_owner::<TodoResponse>))
//!     .route_layer(from_fn_with_state(state.clone(), load_resource::<TodoResponse>))
//!     .route_layer(from_fn_with_state(state.clone(), authenticate))
//! ```

use axum::{
    extract::{FromRequestParts, Path, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, trace};

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::bearer::extract_bearer_token,
    errors::Error,
    types::UserId,
};

/// A resource with a single owning identity.
pub trait HasOwner {
    fn owner_id(&self) -> UserId;
}

/// A resource that [`load_resource`] can fetch by numeric id.
#[async_trait::async_trait]
pub trait LoadResource: HasOwner + Clone + Send + Sync + 'static {
    /// Used in log lines and error messages
    const NAME: &'static str;

    async fn load(state: &AppState, id: i64) -> Result<Option<Self>, Error>;
}

/// The resource loaded for this request by [`load_resource`].
#[derive(Debug, Clone)]
pub struct Loaded<R>(pub R);

impl<S, R> FromRequestParts<S> for Loaded<R>
where
    S: Send + Sync,
    R: LoadResource,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Loaded<R>>().cloned().ok_or_else(|| Error::Internal {
            operation: format!("read loaded {}: load_resource is not composed on this route", R::NAME),
        })
    }
}

/// Resolve the caller from the bearer token, or answer 401.
#[instrument(skip_all)]
pub async fn authenticate(State(state): State<AppState>, mut request: Request, next: Next) -> Result<Response, Error> {
    let token = extract_bearer_token(request.headers()).ok_or_else(|| {
        trace!("No Authorization header");
        Error::Unauthenticated { message: None }
    })?;

    let claims = state.session_keys.verify(&token)?;

    let user = state.users.get_by_id(claims.user.id).await?.ok_or_else(|| {
        debug!(user_id = claims.user.id, "Token refers to an identity that no longer exists");
        Error::Unauthenticated { message: None }
    })?;

    trace!(user_id = user.id, "Authenticated request");
    request.extensions_mut().insert(CurrentUser::from(user));
    Ok(next.run(request).await)
}

/// Load the resource named by the `{id}` path parameter, or answer 400/404.
#[instrument(skip_all, fields(resource = R::NAME, id = %id))]
pub async fn load_resource<R: LoadResource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut request: Request,
    next: Next,
) -> Result<Response, Error> {
    let numeric_id: i64 = id.parse().map_err(|_| Error::BadRequest {
        message: format!("Invalid {} id: {id}", R::NAME),
    })?;

    let resource = R::load(&state, numeric_id).await?.ok_or_else(|| Error::NotFound {
        resource: R::NAME.to_string(),
        id: id.clone(),
    })?;

    request.extensions_mut().insert(Loaded(resource));
    Ok(next.run(request).await)
}

/// Answer 403 unless the authenticated caller owns the loaded resource.
///
/// Both extensions must already be present; a missing one means the route was
/// assembled in the wrong order and is reported as a 500.
#[instrument(skip_all, fields(resource = R::NAME))]
pub async fn require_owner<R: LoadResource>(request: Request, next: Next) -> Result<Response, Error> {
    let user_id = request
        .extensions()
        .get::<CurrentUser>()
        .map(|user| user.id)
        .ok_or_else(|| Error::Internal {
            operation: format!("check {} ownership: authenticate is not composed on this route", R::NAME),
        })?;

    let owner_id = request
        .extensions()
        .get::<Loaded<R>>()
        .map(|Loaded(resource)| resource.owner_id())
        .ok_or_else(|| Error::Internal {
            operation: format!("check {} ownership: load_resource is not composed on this route", R::NAME),
        })?;

    if owner_id != user_id {
        debug!(user_id, owner_id, "Caller does not own resource");
        return Err(Error::Forbidden {
            resource: R::NAME.to_string(),
        });
    }

    Ok(next.run(request).await)
}
