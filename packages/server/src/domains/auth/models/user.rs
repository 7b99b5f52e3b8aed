use anyhow::Result;
use chrono::{DateTime, Utc};
use juniper::{GraphQLEnum, GraphQLInputObject};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::onboarding::OnboardingProfile;
use crate::common::{Email, ValidationErrors};

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, GraphQLEnum)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Student,
    University,
    Company,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::University => "university",
            UserRole::Company => "company",
        }
    }

    /// Universities and companies register on behalf of an institution
    pub fn requires_institution(&self) -> bool {
        !matches!(self, UserRole::Student)
    }

    pub fn can_publish_events(&self) -> bool {
        matches!(self, UserRole::University | UserRole::Company)
    }

    pub fn can_publish_jobs(&self) -> bool {
        matches!(self, UserRole::Company)
    }

    /// Study groups are run by students
    pub fn can_create_groups(&self) -> bool {
        matches!(self, UserRole::Student)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "student" | "estudiante" => Ok(UserRole::Student),
            "university" | "universidad" => Ok(UserRole::University),
            "company" | "empresa" => Ok(UserRole::Company),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}

/// Stored user profile, keyed by email.
///
/// Older records carry the role under `legacy_role`; newer ones under
/// `user_type`. Use [`UserProfile::role`] rather than either field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: Email,
    pub name: String,
    pub user_type: Option<UserRole>,
    pub legacy_role: Option<UserRole>,
    pub institution_name: Option<String>,
    pub onboarding_completed: bool,
    pub onboarding: Option<OnboardingProfile>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Fresh profile written right after sign-up
    pub fn registered(
        email: Email,
        name: String,
        role: UserRole,
        institution_name: Option<String>,
    ) -> Self {
        Self {
            email,
            name,
            user_type: Some(role),
            legacy_role: None,
            institution_name,
            onboarding_completed: false,
            onboarding: None,
            created_at: Utc::now(),
        }
    }

    pub fn role(&self) -> Option<UserRole> {
        self.user_type.or(self.legacy_role)
    }

    /// Name shown as organizer/company on things this user publishes
    pub fn display_name(&self) -> &str {
        self.institution_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.name)
    }

    pub fn creator(&self) -> Creator {
        Creator {
            email: self.email.clone(),
            display_name: self.display_name().to_string(),
        }
    }

    /// Where the client should go after login or registration
    pub fn next_view(&self) -> Option<NextView> {
        let view = match self.role()? {
            UserRole::Student if !self.onboarding_completed => NextView::Onboarding,
            UserRole::Student => NextView::StudentDashboard,
            UserRole::University => NextView::UniversityDashboard,
            UserRole::Company => NextView::CompanyDashboard,
        };
        Some(view)
    }
}

/// Author of a published event, job or group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Creator {
    pub email: Email,
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, GraphQLEnum)]
pub enum NextView {
    Onboarding,
    StudentDashboard,
    UniversityDashboard,
    CompanyDashboard,
}

#[derive(Debug, Clone, GraphQLInputObject)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub name: String,
    pub user_type: UserRole,
    pub institution_name: Option<String>,
}

/// Registration details that passed validation
#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub email: Email,
    pub password: String,
    pub name: String,
    pub role: UserRole,
    pub institution_name: Option<String>,
}

impl RegisterInput {
    pub fn validate(self) -> Result<ValidRegistration, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.require("name", &self.name, "name is required");
        errors.require("password", &self.password, "password is required");

        let email = match Email::parse(&self.email) {
            Ok(email) => Some(email),
            Err(e) => {
                errors.push(e.field, e.message);
                None
            }
        };

        if !self.password.is_empty() && self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(
                "password",
                format!("password must be at least {} characters", MIN_PASSWORD_LEN),
            );
        }
        if self.password != self.confirm_password {
            errors.push("confirm_password", "passwords do not match");
        }

        let institution_name = self
            .institution_name
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        if self.user_type.requires_institution() && institution_name.is_none() {
            errors.push("institution_name", "institution name is required");
        }

        errors.into_result()?;

        match email {
            Some(email) => Ok(ValidRegistration {
                email,
                password: self.password,
                name: self.name.trim().to_string(),
                role: self.user_type,
                institution_name,
            }),
            None => Err(ValidationErrors::new()),
        }
    }
}

#[derive(Debug, Clone, GraphQLInputObject)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

impl LoginInput {
    pub fn validate(self) -> Result<(Email, String), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("email", &self.email, "email is required");
        errors.require("password", &self.password, "password is required");
        errors.into_result()?;

        let email = Email::parse(&self.email)?;
        Ok((email, self.password))
    }
}
