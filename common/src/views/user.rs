use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::Role;

/// A user as returned to clients. The password hash never leaves the
/// storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The unique identifier for this user.
    pub id: String,

    pub name: String,

    /// The user's email address. Unique across all users.
    pub email: String,

    pub role: Role,

    /// Events this user has joined, in join order.
    pub registered_events: Vec<String>,

    /// Reference to the uploaded profile image, e.g.
    /// `/uploads/users/1700000000000-avatar.png`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterUserResponse {
    pub message: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserResponse {
    pub message: String,
    pub updated_user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteUserResponse {
    pub message: String,
    pub user: User,
}
