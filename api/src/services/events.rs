use std::{collections::HashMap, sync::Arc};

use eventhub_common::{
    params::{EventPatch, NewEvent},
    views::Event,
};
use eventhub_db::{
    models::{DbEvent, DbId, DbUser},
    storage::{EventFilter, EventStore, EventUpdate, Storage, UserFilter, UserStore},
};
use tracing::{info, instrument};

use super::parse_id;
use crate::error::ApiError;

/// Event records, always returned with their organizer resolved.
#[derive(Clone)]
pub struct EventDirectory {
    db: Arc<dyn Storage>,
}

impl EventDirectory {
    pub fn new(db: Arc<dyn Storage>) -> Self {
        Self { db }
    }

    /// Create an event owned by `organizer_id`.
    #[instrument(skip(self, image))]
    pub async fn create(
        &self,
        new_event: NewEvent,
        organizer_id: &str,
        image: Option<String>,
    ) -> Result<Event, ApiError> {
        let organizer = parse_id("user", organizer_id)?;

        let NewEvent {
            title,
            date,
            location,
        } = new_event;
        let mut event = DbEvent::new(title, date, location, organizer);
        event.image = image;

        let event = EventStore::create(&*self.db, event).await?;
        info!(event_id = %event.id, organizer = %organizer, "Created event");

        self.resolve_one(event).await
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: &str) -> Result<Event, ApiError> {
        let id = parse_id("event", id)?;

        let event = EventStore::get(&*self.db, &id)
            .await?
            .ok_or(ApiError::not_found("Event"))?;

        self.resolve_one(event).await
    }

    pub async fn list_all(&self) -> Result<Vec<Event>, ApiError> {
        self.list(EventFilter::default()).await
    }

    /// Events whose title contains `name`, ignoring case. `name` is matched
    /// literally.
    #[instrument(skip(self))]
    pub async fn search_by_name(&self, name: &str) -> Result<Vec<Event>, ApiError> {
        self.list(EventFilter {
            title_contains: Some(name.to_string()),
            ..Default::default()
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn list_by_organizer(&self, organizer_id: &str) -> Result<Vec<Event>, ApiError> {
        let organizer = parse_id("user", organizer_id)?;

        self.list(EventFilter {
            organizer: Some(organizer),
            ..Default::default()
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn list_by_participant(
        &self,
        participant_id: &str,
    ) -> Result<Vec<Event>, ApiError> {
        let participant = parse_id("user", participant_id)?;

        self.list(EventFilter {
            participant: Some(participant),
            ..Default::default()
        })
        .await
    }

    #[instrument(skip(self, patch, image))]
    pub async fn update(
        &self,
        id: &str,
        patch: EventPatch,
        image: Option<String>,
    ) -> Result<Event, ApiError> {
        let id = parse_id("event", id)?;

        let update = EventUpdate {
            title: patch.title,
            date: patch.date,
            location: patch.location,
            image,
        };

        let event = EventStore::update(&*self.db, &id, update)
            .await?
            .ok_or(ApiError::not_found("Event"))?;
        info!(event_id = %event.id, "Updated event");

        self.resolve_one(event).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<Event, ApiError> {
        let id = parse_id("event", id)?;

        let event = EventStore::delete(&*self.db, &id)
            .await?
            .ok_or(ApiError::not_found("Event"))?;
        info!(event_id = %event.id, "Deleted event");

        self.resolve_one(event).await
    }

    /// Remove every event and return how many were removed. Users keep
    /// their `registered_events` entries.
    pub async fn delete_all(&self) -> Result<u64, ApiError> {
        let deleted = EventStore::delete_all(&*self.db).await?;
        info!(deleted, "Deleted all events");
        Ok(deleted)
    }

    async fn list(&self, filter: EventFilter) -> Result<Vec<Event>, ApiError> {
        let events = EventStore::list(&*self.db, filter).await?;
        self.resolve_many(events).await
    }

    async fn resolve_one(&self, event: DbEvent) -> Result<Event, ApiError> {
        let organizer = UserStore::get(&*self.db, &event.organizer).await?;
        Ok(event.into_view(organizer.as_ref()))
    }

    /// Join in organizers with one user lookup for the whole batch.
    async fn resolve_many(&self, events: Vec<DbEvent>) -> Result<Vec<Event>, ApiError> {
        if events.is_empty() {
            return Ok(Vec::new());
        }

        let mut ids: Vec<DbId> = events.iter().map(|e| e.organizer).collect();
        ids.sort();
        ids.dedup();

        let organizers: HashMap<DbId, DbUser> = UserStore::list(
            &*self.db,
            UserFilter {
                id: Some(ids),
                ..Default::default()
            },
        )
        .await?
        .into_iter()
        .map(|user| (user.id, user))
        .collect();

        Ok(events
            .into_iter()
            .map(|event| {
                let organizer = organizers.get(&event.organizer);
                event.into_view(organizer)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::services::test_support::{seed_user, storage};

    fn new_event(title: &str) -> NewEvent {
        NewEvent {
            title: title.into(),
            date: Utc.with_ymd_and_hms(2025, 6, 1, 18, 0, 0).unwrap(),
            location: "Berlin".into(),
        }
    }

    #[tokio::test]
    async fn create_resolves_organizer() {
        let db = storage();
        let ada = seed_user(&db, "Ada", "ada@example.com").await;
        let directory = EventDirectory::new(db);

        let event = directory
            .create(new_event("RustConf"), &ada.id.to_string(), None)
            .await
            .unwrap();

        let organizer = event.organizer.unwrap();
        assert_eq!(organizer.id, ada.id.to_string());
        assert_eq!(organizer.name, "Ada");
        assert_eq!(organizer.email, "ada@example.com");
        assert!(event.participants.is_empty());
    }

    #[tokio::test]
    async fn missing_organizer_resolves_to_none() {
        let db = storage();
        let directory = EventDirectory::new(db);

        let event = directory
            .create(new_event("Orphaned"), "65f1c0ffee0000000000beef", None)
            .await
            .unwrap();
        assert!(event.organizer.is_none());

        let listed = directory.list_all().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].organizer.is_none());
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_literal() {
        let db = storage();
        let ada = seed_user(&db, "Ada", "ada@example.com").await;
        let directory = EventDirectory::new(db);
        let organizer = ada.id.to_string();

        directory.create(new_event("Rust Meetup"), &organizer, None).await.unwrap();
        directory.create(new_event("Go Night"), &organizer, None).await.unwrap();
        directory.create(new_event("C++ (and C) Day"), &organizer, None).await.unwrap();

        let found = directory.search_by_name("rust").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Rust Meetup");

        let found = directory.search_by_name("C++ (").await.unwrap();
        assert_eq!(found.len(), 1);

        assert!(directory.search_by_name(".*").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_by_organizer_may_be_empty() {
        let db = storage();
        let ada = seed_user(&db, "Ada", "ada@example.com").await;
        let grace = seed_user(&db, "Grace", "grace@example.com").await;
        let directory = EventDirectory::new(db);

        directory
            .create(new_event("Ada's event"), &ada.id.to_string(), None)
            .await
            .unwrap();

        assert_eq!(
            directory
                .list_by_organizer(&ada.id.to_string())
                .await
                .unwrap()
                .len(),
            1
        );
        assert!(
            directory
                .list_by_organizer(&grace.id.to_string())
                .await
                .unwrap()
                .is_empty()
        );
        assert!(matches!(
            directory.list_by_organizer("bogus").await,
            Err(ApiError::InvalidId { .. })
        ));
    }

    #[tokio::test]
    async fn update_and_delete_missing_event() {
        let directory = EventDirectory::new(storage());

        let err = directory
            .update("65f1c0ffee0000000000beef", EventPatch::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound { resource: "Event" }));

        let err = directory.delete("65f1c0ffee0000000000beef").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound { resource: "Event" }));

        let err = directory.get_by_id("nope").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidId { resource: "event", .. }));
    }

    #[tokio::test]
    async fn update_changes_given_fields() {
        let db = storage();
        let ada = seed_user(&db, "Ada", "ada@example.com").await;
        let directory = EventDirectory::new(db);
        let event = directory
            .create(new_event("Draft"), &ada.id.to_string(), None)
            .await
            .unwrap();

        let updated = directory
            .update(
                &event.id,
                EventPatch {
                    title: Some("Final".into()),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Final");
        assert_eq!(updated.location, "Berlin");
        assert!(updated.updated_at >= event.updated_at);
    }

    #[tokio::test]
    async fn delete_all_counts_events() {
        let db = storage();
        let ada = seed_user(&db, "Ada", "ada@example.com").await;
        let directory = EventDirectory::new(db);

        for title in ["a", "b", "c"] {
            directory
                .create(new_event(title), &ada.id.to_string(), None)
                .await
                .unwrap();
        }

        assert_eq!(directory.delete_all().await.unwrap(), 3);
        assert!(directory.list_all().await.unwrap().is_empty());
        assert_eq!(directory.delete_all().await.unwrap(), 0);
    }
}
