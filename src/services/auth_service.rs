use std::collections::HashMap;

use axum_extra::extract::cookie::{Cookie, SameSite};
use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::{
    models::{User, ROLE_CLIENT},
    AppState,
};

use super::user_service;

pub type FieldErrors = HashMap<String, String>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    // user id as decimal string
    pub sub: String,
    // expiry (unix timestamp seconds)
    pub exp: usize,
}

fn form_error(msg: &str) -> FieldErrors {
    let mut errs = FieldErrors::new();
    errs.insert("_form".into(), msg.into());
    errs
}

pub fn make_jwt_with_days(state: &AppState, user_id: i64, days: i64) -> Result<String, String> {
    let exp = (Utc::now() + Duration::days(days)).timestamp() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.settings.jwt_secret.as_bytes()),
    )
    .map_err(|e| e.to_string())
}

pub fn auth_cookie(state: &AppState, token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(state.settings.jwt_cookie_name.clone(), token);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    if state.settings.cookie_secure {
        cookie.set_secure(true);
    }
    cookie
}

pub fn clear_auth_cookie(state: &AppState) -> Cookie<'static> {
    let mut cookie = Cookie::new(state.settings.jwt_cookie_name.clone(), "");
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.make_removal();
    cookie
}

pub async fn login_user(state: &AppState, email: &str, password: &str) -> Result<User, FieldErrors> {
    let user = match user_service::find_by_email(state, email).await {
        Ok(Some(u)) => u,
        Ok(None) => return Err(form_error("Invalid email or password.")),
        Err(e) => {
            error!(error = %e, "user lookup failed during login");
            return Err(form_error("Server error. Please try again."));
        }
    };

    if !verify(password, &user.password_hash).unwrap_or(false) {
        return Err(form_error("Invalid email or password."));
    }

    Ok(user)
}

/// Registers a shop customer.
pub async fn register_user(
    state: &AppState,
    username: &str,
    email: &str,
    password: &str,
) -> Result<i64, FieldErrors> {
    create_user(state, username, email, password, ROLE_CLIENT).await
}

/// Creates an account with the given role after checking email and username are free.
pub async fn create_user(
    state: &AppState,
    username: &str,
    email: &str,
    password: &str,
    role: &str,
) -> Result<i64, FieldErrors> {
    let mut errs = FieldErrors::new();

    match user_service::find_by_email(state, email).await {
        Ok(Some(_)) => {
            errs.insert("email".into(), "Email has already been taken!".into());
            return Err(errs);
        }
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "email uniqueness check failed");
            return Err(form_error("There is a problem registering this user!"));
        }
    }

    match user_service::find_by_username(state, username).await {
        Ok(Some(_)) => {
            errs.insert("username".into(), "Username has already been taken!".into());
            return Err(errs);
        }
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "username uniqueness check failed");
            return Err(form_error("There is a problem registering this user!"));
        }
    }

    let pw_hash = match hash(password, state.settings.bcrypt_cost) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "password hashing failed");
            return Err(form_error("There is a problem registering this user!"));
        }
    };

    user_service::insert_user(state, username, email, &pw_hash, role)
        .await
        .map_err(|e| {
            error!(error = %e, "inserting user failed");
            form_error("There is a problem registering this user!")
        })
}
