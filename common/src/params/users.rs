use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    Role,
    validation::{ValidationErrors, optional_non_blank, required},
};

/// Form fields accepted by the registration endpoint. Sent as
/// `multipart/form-data` alongside an optional `image` file.
#[derive(Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct RegisterUserParams {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,

    /// One of `user`, `admin` or `organizer`. Defaults to `user`.
    pub role: Option<String>,
}

impl fmt::Debug for RegisterUserParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterUserParams")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("role", &self.role)
            .finish()
    }
}

/// A registration that passed validation.
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

impl RegisterUserParams {
    pub fn validate(&self) -> Result<NewUser, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = required(&mut errors, "name", self.name.as_deref());
        let email = required(&mut errors, "email", self.email.as_deref())
            .and_then(|email| check_email(&mut errors, email));
        // Passwords are taken verbatim, whitespace included.
        let password = match self.password.as_deref() {
            Some(p) if !p.is_empty() => Some(p.to_string()),
            _ => {
                errors.add("password", "password is required");
                None
            }
        };
        let role = parse_role(&mut errors, self.role.as_deref()).unwrap_or_default();

        match (name, email, password) {
            (Some(name), Some(email), Some(password)) if errors.is_empty() => Ok(NewUser {
                name,
                email,
                password,
                role,
            }),
            _ => Err(errors),
        }
    }
}

/// Form fields accepted by the user update endpoint. Every field is
/// optional; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateUserParams {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// A validated partial user update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

impl UpdateUserParams {
    pub fn validate(&self) -> Result<UserPatch, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = optional_non_blank(&mut errors, "name", self.name.as_deref());
        let email = optional_non_blank(&mut errors, "email", self.email.as_deref())
            .and_then(|email| check_email(&mut errors, email));
        let role = parse_role(&mut errors, self.role.as_deref());

        errors.finish(UserPatch { name, email, role })
    }
}

/// Lowercases the address and checks it has the `local@domain` shape.
fn check_email(errors: &mut ValidationErrors, email: String) -> Option<String> {
    let email = email.to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Some(email)
        }
        _ => {
            errors.add("email", "email must be a valid email address");
            None
        }
    }
}

fn parse_role(errors: &mut ValidationErrors, role: Option<&str>) -> Option<Role> {
    match role.map(str::trim) {
        None | Some("") => None,
        Some(r) => match r.parse::<Role>() {
            Ok(role) => Some(role),
            Err(e) => {
                errors.add("role", e.to_string());
                None
            }
        },
    }
}
