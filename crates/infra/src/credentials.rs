//! Credential store: registration, login verification and password changes
//! on top of a [`UserStore`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use roomshare_auth::user::validate_password;
use roomshare_auth::{
    NewUser, PasswordError, User, authorize_password_change, hash_password, verify_password,
};
use roomshare_core::{DomainError, UserId, ValidationErrors};

use crate::{StoreError, UserStore};

#[derive(Debug, Error)]
pub enum CredentialError {
    /// Unknown account and wrong password are indistinguishable.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is deactivated")]
    Deactivated,

    #[error("User already exists with this email")]
    DuplicateEmail,

    #[error("Invalid current password")]
    InvalidCurrentPassword,

    #[error("{0}")]
    Validation(ValidationErrors),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for CredentialError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => CredentialError::DuplicateEmail,
            StoreError::Rejected(DomainError::Validation(errors)) => CredentialError::Validation(errors),
            other => CredentialError::Store(other),
        }
    }
}

#[derive(Clone)]
pub struct CredentialStore {
    users: Arc<dyn UserStore>,
}

impl CredentialStore {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Validate, hash and store a new account.
    pub async fn register(&self, new: NewUser, now: DateTime<Utc>) -> Result<User, CredentialError> {
        new.validate().map_err(CredentialError::Validation)?;
        let hash = hash_password(&new.password)?;
        let user = User::register(new, hash, now);
        let user = self.users.insert(user).await?;
        tracing::info!(user_id = %user.id, user_type = %user.user_type, "account registered");
        Ok(user)
    }

    /// Check an email/password pair and record the login.
    ///
    /// The password is checked before the active flag, so a deactivated
    /// account is only revealed to someone who knows its password.
    pub async fn verify(&self, email: &str, password: &str, now: DateTime<Utc>) -> Result<User, CredentialError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            return Err(CredentialError::InvalidCredentials);
        };

        match verify_password(password, &user.password_hash) {
            Ok(true) => {}
            Ok(false) => return Err(CredentialError::InvalidCredentials),
            Err(e) => {
                tracing::error!(user_id = %user.id, error = %e, "stored password hash could not be parsed");
                return Err(CredentialError::InvalidCredentials);
            }
        }

        if !user.is_active {
            return Err(CredentialError::Deactivated);
        }

        let user = self
            .users
            .update(
                user.id,
                Box::new(move |u: &mut User| {
                    u.record_login(now);
                    Ok(())
                }),
            )
            .await?;
        tracing::info!(user_id = %user.id, "login succeeded");
        Ok(user)
    }

    /// Replace the password after re-proving the current one.
    ///
    /// The new hash is only written if the stored hash is still the one that
    /// was verified; a concurrent change makes this call fail instead.
    pub async fn change_password(
        &self,
        user_id: UserId,
        current_password: &str,
        new_password: &str,
        now: DateTime<Utc>,
    ) -> Result<(), CredentialError> {
        validate_password("newPassword", new_password).map_err(CredentialError::Validation)?;

        let user = self.users.get(user_id).await?.ok_or(StoreError::NotFound)?;
        authorize_password_change(current_password, &user.password_hash)
            .map_err(|_| CredentialError::InvalidCurrentPassword)?;

        let verified_hash = user.password_hash;
        let new_hash = hash_password(new_password)?;
        self.users
            .update(
                user_id,
                Box::new(move |u: &mut User| {
                    if u.password_hash != verified_hash {
                        return Err(StoreError::from(DomainError::conflict("password changed concurrently")));
                    }
                    u.password_hash = new_hash;
                    u.updated_at = now;
                    Ok(())
                }),
            )
            .await
            .map_err(|e| match e {
                StoreError::Rejected(DomainError::Conflict(_)) => CredentialError::InvalidCurrentPassword,
                other => other.into(),
            })?;

        tracing::info!(user_id = %user_id, "password changed");
        Ok(())
    }
}
