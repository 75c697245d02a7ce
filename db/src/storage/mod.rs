use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eventhub_common::Role;
use thiserror::Error;

use crate::models::{DbEvent, DbId, DbUser};

pub mod memory;
pub mod mongodb;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A write violated a unique index. Carries the offending key.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Query Error: {0}")]
    MongoDB(#[from] ::mongodb::error::Error),

    #[error(transparent)]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

#[async_trait]
pub trait Storage: UserStore + EventStore + Send + Sync + 'static {
    async fn ping(&self) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct UserFilter {
    pub id: Option<Vec<DbId>>,
    pub email: Option<Vec<String>>,
}

/// Fields to overwrite on a user. `None` leaves the stored value alone.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub image: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.role.is_none() && self.image.is_none()
    }
}

#[async_trait]
pub trait UserStore {
    async fn get(&self, id: &DbId) -> Result<Option<DbUser>, StoreError>;

    async fn list(&self, filter: UserFilter) -> Result<Vec<DbUser>, StoreError>;

    /// Insert a new user. Fails with [`StoreError::DuplicateKey`] when the
    /// email is already taken.
    async fn create(&self, user: DbUser) -> Result<DbUser, StoreError>;

    /// Apply `update` and return the updated user, or `None` if no user has
    /// this id.
    async fn update(&self, id: &DbId, update: UserUpdate) -> Result<Option<DbUser>, StoreError>;

    /// Remove a user and return what was removed.
    async fn delete(&self, id: &DbId) -> Result<Option<DbUser>, StoreError>;

    /// Add `event` to the user's registered events unless it is already
    /// there. Missing users are ignored.
    async fn add_registered_event(&self, id: &DbId, event: &DbId) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct EventFilter {
    pub id: Option<Vec<DbId>>,
    pub organizer: Option<DbId>,
    pub participant: Option<DbId>,

    /// Literal substring of the title. Case folding covers ASCII letters
    /// only, which is what MongoDB's `$toLower` does; other characters
    /// must match exactly.
    pub title_contains: Option<String>,
}

/// Fields to overwrite on an event. `None` leaves the stored value alone.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EventUpdate {
    pub title: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub image: Option<String>,
}

impl EventUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.date.is_none() && self.location.is_none() && self.image.is_none()
    }
}

/// Result of the conditional add-to-set on an event's participants.
#[derive(Debug, Clone)]
pub enum AddParticipant {
    /// The user was added; carries the event as stored afterwards.
    Added(DbEvent),
    AlreadyPresent,
    EventMissing,
}

#[async_trait]
pub trait EventStore {
    async fn get(&self, id: &DbId) -> Result<Option<DbEvent>, StoreError>;

    async fn list(&self, filter: EventFilter) -> Result<Vec<DbEvent>, StoreError>;

    async fn create(&self, event: DbEvent) -> Result<DbEvent, StoreError>;

    /// Apply `update`, bump `updated_at` and return the updated event, or
    /// `None` if no event has this id.
    async fn update(&self, id: &DbId, update: EventUpdate)
    -> Result<Option<DbEvent>, StoreError>;

    async fn delete(&self, id: &DbId) -> Result<Option<DbEvent>, StoreError>;

    /// Remove every event, returning how many were removed.
    async fn delete_all(&self) -> Result<u64, StoreError>;

    /// Atomically add `user` to the participants of `event` if it is not
    /// already present. Implementations must not read-then-write: two
    /// concurrent calls for the same pair yield one `Added` and one
    /// `AlreadyPresent`.
    async fn add_participant(
        &self,
        event: &DbId,
        user: &DbId,
    ) -> Result<AddParticipant, StoreError>;
}
