use anyhow::Context;
use tracing::{info, warn};

use super::{
    dto::Registration,
    jwt::JwtKeys,
    password::{burn_verification, hash_password, verify_password},
    repo::UserStore,
    repo_types::{NewUser, PublicUser},
};
use crate::error::AppError;

/// Argon2 is CPU bound; keep it off the async workers.
async fn blocking<T, F>(f: F) -> anyhow::Result<T>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .context("password task panicked")?
}

pub async fn register_user(
    users: &dyn UserStore,
    reg: Registration,
) -> Result<PublicUser, AppError> {
    // Fast path only; the unique index decides races.
    if users.find_by_email(&reg.email).await?.is_some() {
        warn!(email = %reg.email, "email already registered");
        return Err(AppError::Conflict("User already exists".into()));
    }

    let password = reg.password;
    let password_hash = blocking(move || hash_password(&password)).await?;

    let user = users
        .insert(NewUser {
            email: reg.email,
            password_hash,
            name: reg.name,
        })
        .await?;

    info!(user_id = %user.id, "user registered");
    Ok(user.into())
}

#[derive(Debug)]
pub struct LoggedIn {
    pub user: PublicUser,
    pub token: String,
}

/// Unknown email and wrong password fail identically.
pub async fn login_user(
    users: &dyn UserStore,
    keys: &JwtKeys,
    email: &str,
    password: String,
) -> Result<LoggedIn, AppError> {
    let Some(user) = users.find_by_email(email).await? else {
        blocking(move || {
            burn_verification(&password);
            Ok(())
        })
        .await?;
        warn!("login for unknown email");
        return Err(AppError::invalid_credentials());
    };

    let hash = user.password_hash.clone();
    let ok = blocking(move || verify_password(&password, &hash)).await?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::invalid_credentials());
    }

    let token = keys.sign(user.id)?;
    let user = users.update_last_login(user.id).await?;

    info!(user_id = %user.id, "user logged in");
    Ok(LoggedIn {
        user: user.into(),
        token,
    })
}
