use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, MeResponse, RegisterRequest},
        extractors::{AuthUser, TOKEN_COOKIE},
        jwt::TOKEN_TTL,
        repo_types::PublicUser,
        services::{login_user, register_user},
    },
    error::{AppError, AppJson},
    rate_limit::limit_auth,
    response::{Data, Message},
    state::AppState,
};

pub fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route_layer(middleware::from_fn_with_state(state, limit_auth))
        .route("/logout", get(logout))
        .route("/me", get(me))
}

/// Same attributes on set and clear, or browsers keep the old cookie.
fn token_cookie(value: String) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .build()
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<Data<PublicUser>>), AppError> {
    let reg = payload.validate()?;
    let user = register_user(state.users.as_ref(), reg).await?;
    Ok((StatusCode::CREATED, Json(Data::new(user))))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<(CookieJar, Json<Data<PublicUser>>), AppError> {
    let email = payload.validate()?;
    let logged_in = login_user(state.users.as_ref(), &state.jwt, &email, payload.password).await?;

    let mut cookie = token_cookie(logged_in.token);
    cookie.set_max_age(TOKEN_TTL);
    Ok((jar.add(cookie), Json(Data::new(logged_in.user))))
}

/// Tokens are not revoked server-side; this only drops the browser cookie.
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<Message>) {
    let mut cookie = token_cookie(String::new());
    cookie.make_removal();
    (
        jar.add(cookie),
        Json(Message {
            message: "Logged out successfully",
        }),
    )
}

#[instrument]
pub async fn me(AuthUser(user_id): AuthUser) -> Json<MeResponse> {
    Json(MeResponse { id: user_id })
}
