//! Account registration and login.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{LoginRequest, RegisterRequest, RegisteredUser};
use crate::responses::Created;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Created<RegisteredUser>> {
    let password_hash = state.passwords.hash(&payload.password)?;
    let user = state
        .users()
        .create(&payload.name, &payload.email, &password_hash)
        .await?;
    Ok(Created::new(RegisteredUser::from(user)))
}

/// Unknown email and wrong password answer identically.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let user = state
        .users()
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| Error::unauthorized("Credencials incorrectes"))?;

    if !state.passwords.verify(&payload.password, &user.password_hash)? {
        return Err(Error::unauthorized("Credencials incorrectes"));
    }

    let token = state.tokens.issue(&crate::models::record_key(&user.id))?;
    Ok(Json(TokenResponse { token }))
}
