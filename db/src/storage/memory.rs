//! In-process storage backend. Every operation runs under a single lock, so
//! the conditional updates keep the same atomicity the MongoDB backend gets
//! from single-document updates.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    models::{DbEvent, DbId, DbUser},
    storage::{
        AddParticipant, EventFilter, EventStore, EventUpdate, Storage, StoreError, UserFilter,
        UserStore, UserUpdate,
    },
};

#[derive(Debug, Default)]
struct State {
    users: Vec<DbUser>,
    events: Vec<DbEvent>,
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: RwLock<State>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn user_matches(user: &DbUser, filter: &UserFilter) -> bool {
    filter.id.as_ref().is_none_or(|ids| ids.contains(&user.id))
        && filter
            .email
            .as_ref()
            .is_none_or(|emails| emails.contains(&user.email))
}

fn event_matches(event: &DbEvent, filter: &EventFilter) -> bool {
    filter.id.as_ref().is_none_or(|ids| ids.contains(&event.id))
        && filter.organizer.is_none_or(|o| event.organizer == o)
        && filter
            .participant
            .is_none_or(|p| event.participants.contains(&p))
        && filter.title_contains.as_ref().is_none_or(|needle| {
            event
                .title
                .to_ascii_lowercase()
                .contains(&needle.to_ascii_lowercase())
        })
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStorage {
    async fn get(&self, id: &DbId) -> Result<Option<DbUser>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == *id).cloned())
    }

    async fn list(&self, filter: UserFilter) -> Result<Vec<DbUser>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .filter(|u| user_matches(u, &filter))
            .cloned()
            .collect())
    }

    async fn create(&self, user: DbUser) -> Result<DbUser, StoreError> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateKey(user.email));
        }
        state.users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: &DbId, update: UserUpdate) -> Result<Option<DbUser>, StoreError> {
        let mut state = self.state.write().await;

        if let Some(email) = &update.email
            && state.users.iter().any(|u| u.id != *id && u.email == *email)
        {
            return Err(StoreError::DuplicateKey(email.clone()));
        }

        let Some(user) = state.users.iter_mut().find(|u| u.id == *id) else {
            return Ok(None);
        };

        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(image) = update.image {
            user.image = Some(image);
        }

        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: &DbId) -> Result<Option<DbUser>, StoreError> {
        let mut state = self.state.write().await;
        let position = state.users.iter().position(|u| u.id == *id);
        Ok(position.map(|i| state.users.remove(i)))
    }

    async fn add_registered_event(&self, id: &DbId, event: &DbId) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if let Some(user) = state.users.iter_mut().find(|u| u.id == *id)
            && !user.registered_events.contains(event)
        {
            user.registered_events.push(*event);
        }
        Ok(())
    }
}

#[async_trait]
impl EventStore for MemoryStorage {
    async fn get(&self, id: &DbId) -> Result<Option<DbEvent>, StoreError> {
        let state = self.state.read().await;
        Ok(state.events.iter().find(|e| e.id == *id).cloned())
    }

    async fn list(&self, filter: EventFilter) -> Result<Vec<DbEvent>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .events
            .iter()
            .filter(|e| event_matches(e, &filter))
            .cloned()
            .collect())
    }

    async fn create(&self, event: DbEvent) -> Result<DbEvent, StoreError> {
        let mut state = self.state.write().await;
        state.events.push(event.clone());
        Ok(event)
    }

    async fn update(
        &self,
        id: &DbId,
        update: EventUpdate,
    ) -> Result<Option<DbEvent>, StoreError> {
        let mut state = self.state.write().await;
        let Some(event) = state.events.iter_mut().find(|e| e.id == *id) else {
            return Ok(None);
        };

        if let Some(title) = update.title {
            event.title = title;
        }
        if let Some(date) = update.date {
            event.date = date;
        }
        if let Some(location) = update.location {
            event.location = location;
        }
        if let Some(image) = update.image {
            event.image = Some(image);
        }
        event.updated_at = Utc::now();

        Ok(Some(event.clone()))
    }

    async fn delete(&self, id: &DbId) -> Result<Option<DbEvent>, StoreError> {
        let mut state = self.state.write().await;
        let position = state.events.iter().position(|e| e.id == *id);
        Ok(position.map(|i| state.events.remove(i)))
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        let count = state.events.len() as u64;
        state.events.clear();
        Ok(count)
    }

    async fn add_participant(
        &self,
        event: &DbId,
        user: &DbId,
    ) -> Result<AddParticipant, StoreError> {
        let mut state = self.state.write().await;
        let Some(stored) = state.events.iter_mut().find(|e| e.id == *event) else {
            return Ok(AddParticipant::EventMissing);
        };

        if stored.participants.contains(user) {
            return Ok(AddParticipant::AlreadyPresent);
        }

        stored.participants.push(*user);
        stored.updated_at = Utc::now();
        Ok(AddParticipant::Added(stored.clone()))
    }
}
