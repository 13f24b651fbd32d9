use lazy_static::lazy_static;
use regex::Regex;

use super::dto::{CreateUserRequest, UpdateUserRequest};
use super::password::hash_password;
use super::repo_types::{NewUser, UserPatch};
use crate::error::ApiError;

pub const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn checked_name(name: &str) -> Result<String, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Name is required"));
    }
    Ok(name.to_string())
}

fn checked_email(email: &str) -> Result<String, ApiError> {
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        return Err(ApiError::bad_request("Invalid email"));
    }
    Ok(email)
}

fn hashed_password(password: &str) -> Result<String, ApiError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request("Password too short"));
    }
    Ok(hash_password(password)?)
}

/// Validate a signup request and hash its password.
pub fn new_user(req: CreateUserRequest) -> Result<NewUser, ApiError> {
    Ok(NewUser {
        name: checked_name(&req.name)?,
        email: checked_email(&req.email)?,
        password_hash: hashed_password(&req.password)?,
    })
}

/// Turn an update request into a column patch; a new password is hashed.
pub fn user_patch(req: UpdateUserRequest) -> Result<UserPatch, ApiError> {
    Ok(UserPatch {
        name: req.name.as_deref().map(checked_name).transpose()?,
        email: req.email.as_deref().map(checked_email).transpose()?,
        password_hash: req.password.as_deref().map(hashed_password).transpose()?,
    })
}
