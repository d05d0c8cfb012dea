//! User account model.
//!
//! Accounts are only ever mutated by their owner: the profile patch, password
//! change, picture and deactivation paths all take the acting identity as the
//! target. Accounts are never hard-deleted; deactivation flips `is_active`.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use roomshare_core::{UserId, ValidationErrors};

use crate::UserType;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("email regex is valid")
});

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[\d\s\-()]+$").expect("phone regex is valid"));

pub const MIN_PASSWORD_LEN: usize = 6;

// ─────────────────────────────────────────────────────────────────────────────
// Profile value types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SleepSchedule {
    Early,
    #[default]
    Normal,
    Late,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuestsPolicy {
    Never,
    #[default]
    Occasionally,
    Frequently,
}

/// Roommate-matching preferences. Ratings are on a 1–5 scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lifestyle {
    pub sleep_schedule: SleepSchedule,
    pub cleanliness: u8,
    pub social_level: u8,
    pub noise_tolerance: u8,
    pub pets_allowed: bool,
    pub smoking_allowed: bool,
    pub guests_policy: GuestsPolicy,
}

impl Default for Lifestyle {
    fn default() -> Self {
        Self {
            sleep_schedule: SleepSchedule::Normal,
            cleanliness: 3,
            social_level: 3,
            noise_tolerance: 3,
            pets_allowed: false,
            smoking_allowed: false,
            guests_policy: GuestsPolicy::Occasionally,
        }
    }
}

/// Partial lifestyle update; absent keys keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LifestylePatch {
    pub sleep_schedule: Option<SleepSchedule>,
    pub cleanliness: Option<u8>,
    pub social_level: Option<u8>,
    pub noise_tolerance: Option<u8>,
    pub pets_allowed: Option<bool>,
    pub smoking_allowed: Option<bool>,
    pub guests_policy: Option<GuestsPolicy>,
}

impl LifestylePatch {
    pub fn merge_into(&self, lifestyle: &mut Lifestyle) {
        if let Some(v) = self.sleep_schedule {
            lifestyle.sleep_schedule = v;
        }
        if let Some(v) = self.cleanliness {
            lifestyle.cleanliness = v;
        }
        if let Some(v) = self.social_level {
            lifestyle.social_level = v;
        }
        if let Some(v) = self.noise_tolerance {
            lifestyle.noise_tolerance = v;
        }
        if let Some(v) = self.pets_allowed {
            lifestyle.pets_allowed = v;
        }
        if let Some(v) = self.smoking_allowed {
            lifestyle.smoking_allowed = v;
        }
        if let Some(v) = self.guests_policy {
            lifestyle.guests_policy = v;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User
// ─────────────────────────────────────────────────────────────────────────────

/// A registered account.
///
/// `password_hash` is never serialized; the `Serialize` impl is the public
/// view handed to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    /// Always stored lower-cased.
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub occupation: Option<String>,
    pub university: Option<String>,
    #[serde(default)]
    pub lifestyle: Lifestyle,
    #[serde(default)]
    pub is_email_verified: bool,
    #[serde(default)]
    pub is_phone_verified: bool,
    #[serde(default)]
    pub is_identity_verified: bool,
    pub user_type: UserType,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub average_rating: f64,
    pub total_reviews: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh account from validated registration input.
    pub fn register(new: NewUser, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            first_name: new.first_name.trim().to_string(),
            last_name: new.last_name.trim().to_string(),
            email: normalize_email(&new.email),
            password_hash,
            phone: None,
            date_of_birth: None,
            gender: None,
            profile_picture: None,
            bio: None,
            occupation: None,
            university: None,
            lifestyle: Lifestyle::default(),
            is_email_verified: false,
            is_phone_verified: false,
            is_identity_verified: false,
            user_type: new.user_type.unwrap_or_default(),
            is_active: true,
            last_login: None,
            average_rating: 0.0,
            total_reviews: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Validate the whole record, as done before every write.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check_not_blank("firstName", &self.first_name, "First name is required");
        errors.check_max_length("firstName", Some(self.first_name.as_str()), 50, "First name cannot exceed 50 characters");
        errors.check_not_blank("lastName", &self.last_name, "Last name is required");
        errors.check_max_length("lastName", Some(self.last_name.as_str()), 50, "Last name cannot exceed 50 characters");
        if !EMAIL_RE.is_match(&self.email) {
            errors.push("email", "Please enter a valid email");
        }
        if let Some(phone) = &self.phone {
            if !PHONE_RE.is_match(phone) {
                errors.push("phone", "Please enter a valid phone number");
            }
        }
        errors.check_max_length("bio", self.bio.as_deref(), 500, "Bio cannot exceed 500 characters");

        let l = &self.lifestyle;
        errors.check_range_u8("lifestyle.cleanliness", l.cleanliness, 1, 5, "Cleanliness rating must be between 1-5");
        errors.check_range_u8("lifestyle.socialLevel", l.social_level, 1, 5, "Social level must be between 1-5");
        errors.check_range_u8("lifestyle.noiseTolerance", l.noise_tolerance, 1, 5, "Noise tolerance must be between 1-5");

        errors.finish(())
    }

    /// Set a new profile picture URL.
    pub fn set_profile_picture(&mut self, url: &str, now: DateTime<Utc>) -> Result<(), ValidationErrors> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ValidationErrors::single("profilePicture", "Profile picture URL is required"));
        }
        self.profile_picture = Some(url.to_string());
        self.updated_at = now;
        Ok(())
    }

    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.is_active = false;
        self.updated_at = now;
    }

    pub fn record_login(&mut self, now: DateTime<Utc>) {
        self.last_login = Some(now);
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate a candidate password (length only; hashing happens elsewhere).
pub fn validate_password(field: &str, password: &str) -> Result<(), ValidationErrors> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationErrors::single(
            field,
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Registration
// ─────────────────────────────────────────────────────────────────────────────

/// Registration input.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub user_type: Option<UserType>,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check_not_blank("firstName", &self.first_name, "First name is required");
        errors.check_max_length("firstName", Some(self.first_name.as_str()), 50, "First name cannot exceed 50 characters");
        errors.check_not_blank("lastName", &self.last_name, "Last name is required");
        errors.check_max_length("lastName", Some(self.last_name.as_str()), 50, "Last name cannot exceed 50 characters");

        if self.email.trim().is_empty() {
            errors.push("email", "Email is required");
        } else if !EMAIL_RE.is_match(&normalize_email(&self.email)) {
            errors.push("email", "Please enter a valid email");
        }

        if self.password.is_empty() {
            errors.push("password", "Password is required");
        } else if let Err(e) = validate_password("password", &self.password) {
            errors.extend(e);
        }

        errors.finish(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Profile patch
// ─────────────────────────────────────────────────────────────────────────────

/// Typed profile update. Key membership is checked against
/// [`crate::PROFILE_UPDATE_FIELDS`] before this is decoded.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfilePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub bio: Option<String>,
    pub occupation: Option<String>,
    pub university: Option<String>,
    pub lifestyle: Option<LifestylePatch>,
}

impl ProfilePatch {
    /// Apply onto `user` and re-validate the result. On error `user` may be
    /// partially modified; callers apply patches to a working copy.
    pub fn apply(&self, user: &mut User, now: DateTime<Utc>) -> Result<(), ValidationErrors> {
        if let Some(v) = &self.first_name {
            user.first_name = v.trim().to_string();
        }
        if let Some(v) = &self.last_name {
            user.last_name = v.trim().to_string();
        }
        if let Some(v) = &self.phone {
            user.phone = Some(v.clone());
        }
        if let Some(v) = self.date_of_birth {
            user.date_of_birth = Some(v);
        }
        if let Some(v) = self.gender {
            user.gender = Some(v);
        }
        if let Some(v) = &self.bio {
            user.bio = Some(v.clone());
        }
        if let Some(v) = &self.occupation {
            user.occupation = Some(v.clone());
        }
        if let Some(v) = &self.university {
            user.university = Some(v.clone());
        }
        if let Some(patch) = &self.lifestyle {
            patch.merge_into(&mut user.lifestyle);
        }
        user.updated_at = now;
        user.validate()
    }
}
