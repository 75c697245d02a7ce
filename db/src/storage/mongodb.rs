use async_trait::async_trait;
use bson::{Document, doc};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection, Database, IndexModel,
    error::{ErrorKind, WriteFailure},
    options::{IndexOptions, ReturnDocument},
};
use tracing::{debug, info, instrument};

use crate::{
    models::{DbEvent, DbId, DbUser},
    storage::{
        AddParticipant, EventFilter, EventStore, EventUpdate, Storage, StoreError, UserFilter,
        UserStore, UserUpdate,
    },
};

pub const MONGODB_COLLECTION_USERS: &str = "users";
pub const MONGODB_COLLECTION_EVENTS: &str = "events";

const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug, Clone)]
pub struct MongoDBStorage(Client);

impl MongoDBStorage {
    /// Connect and make sure the indexes the stores rely on exist.
    pub async fn new(uri: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        let storage = Self(client);
        storage.ensure_indexes().await?;
        Ok(storage)
    }

    fn get_db(&self) -> Database {
        self.0
            .default_database()
            .unwrap_or_else(|| self.0.database("eventhub"))
    }

    fn users(&self) -> Collection<DbUser> {
        self.get_db().collection(MONGODB_COLLECTION_USERS)
    }

    fn events(&self) -> Collection<DbEvent> {
        self.get_db().collection(MONGODB_COLLECTION_EVENTS)
    }

    async fn ensure_indexes(&self) -> Result<(), StoreError> {
        self.users()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await?;

        self.events()
            .create_index(IndexModel::builder().keys(doc! { "organizer": 1 }).build())
            .await?;

        self.events()
            .create_index(IndexModel::builder().keys(doc! { "participants": 1 }).build())
            .await?;

        info!("MongoDB indexes ensured");
        Ok(())
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

fn user_filter_doc(filter: UserFilter) -> Document {
    let mut filter_doc = doc! {};
    if let Some(ids) = filter.id {
        filter_doc.insert("_id", doc! { "$in": ids });
    }
    if let Some(emails) = filter.email {
        filter_doc.insert("email", doc! { "$in": emails });
    }
    filter_doc
}

fn event_filter_doc(filter: EventFilter) -> Document {
    let mut filter_doc = doc! {};
    if let Some(ids) = filter.id {
        filter_doc.insert("_id", doc! { "$in": ids });
    }
    if let Some(organizer) = filter.organizer {
        filter_doc.insert("organizer", organizer);
    }
    if let Some(participant) = filter.participant {
        filter_doc.insert("participants", participant);
    }
    if let Some(needle) = filter.title_contains {
        // Literal match, so regex metacharacters in the needle are inert.
        // `$toLower` folds ASCII only, so the needle is folded the same way.
        filter_doc.insert(
            "$expr",
            doc! {
                "$gte": [
                    { "$indexOfCP": [ { "$toLower": "$title" }, needle.to_ascii_lowercase() ] },
                    0
                ]
            },
        );
    }
    filter_doc
}

#[async_trait]
impl Storage for MongoDBStorage {
    async fn ping(&self) -> Result<(), StoreError> {
        self.get_db().run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for MongoDBStorage {
    async fn get(&self, id: &DbId) -> Result<Option<DbUser>, StoreError> {
        let users = UserStore::list(
            self,
            UserFilter {
                id: Some(vec![*id]),
                email: None,
            },
        )
        .await?;

        Ok(users.into_iter().next())
    }

    async fn list(&self, filter: UserFilter) -> Result<Vec<DbUser>, StoreError> {
        self.users()
            .find(user_filter_doc(filter))
            .sort(doc! { "_id": 1 })
            .await?
            .try_collect()
            .await
            .map_err(StoreError::MongoDB)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: DbUser) -> Result<DbUser, StoreError> {
        match self.users().insert_one(&user).await {
            Ok(_) => Ok(user),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::DuplicateKey(user.email)),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, update))]
    async fn update(&self, id: &DbId, update: UserUpdate) -> Result<Option<DbUser>, StoreError> {
        if update.is_empty() {
            return UserStore::get(self, id).await;
        }

        let email = update.email.clone();
        let mut set = doc! {};
        if let Some(name) = update.name {
            set.insert("name", name);
        }
        if let Some(email) = update.email {
            set.insert("email", email);
        }
        if let Some(role) = update.role {
            set.insert("role", role.as_str());
        }
        if let Some(image) = update.image {
            set.insert("image", image);
        }

        let result = self
            .users()
            .find_one_and_update(doc! { "_id": *id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await;

        match result {
            Ok(user) => Ok(user),
            Err(e) if is_duplicate_key(&e) => {
                Err(StoreError::DuplicateKey(email.unwrap_or_default()))
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &DbId) -> Result<Option<DbUser>, StoreError> {
        Ok(self.users().find_one_and_delete(doc! { "_id": *id }).await?)
    }

    async fn add_registered_event(&self, id: &DbId, event: &DbId) -> Result<(), StoreError> {
        self.users()
            .update_one(
                doc! { "_id": *id },
                doc! { "$addToSet": { "registered_events": *event } },
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl EventStore for MongoDBStorage {
    async fn get(&self, id: &DbId) -> Result<Option<DbEvent>, StoreError> {
        Ok(self.events().find_one(doc! { "_id": *id }).await?)
    }

    async fn list(&self, filter: EventFilter) -> Result<Vec<DbEvent>, StoreError> {
        self.events()
            .find(event_filter_doc(filter))
            .sort(doc! { "_id": 1 })
            .await?
            .try_collect()
            .await
            .map_err(StoreError::MongoDB)
    }

    #[instrument(skip(self, event), fields(event_id = %event.id))]
    async fn create(&self, event: DbEvent) -> Result<DbEvent, StoreError> {
        self.events().insert_one(&event).await?;
        Ok(event)
    }

    #[instrument(skip(self, update))]
    async fn update(
        &self,
        id: &DbId,
        update: EventUpdate,
    ) -> Result<Option<DbEvent>, StoreError> {
        let mut set = doc! { "updated_at": bson::DateTime::now() };
        if let Some(title) = update.title {
            set.insert("title", title);
        }
        if let Some(date) = update.date {
            set.insert("date", bson::DateTime::from_chrono(date));
        }
        if let Some(location) = update.location {
            set.insert("location", location);
        }
        if let Some(image) = update.image {
            set.insert("image", image);
        }

        Ok(self
            .events()
            .find_one_and_update(doc! { "_id": *id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &DbId) -> Result<Option<DbEvent>, StoreError> {
        Ok(self.events().find_one_and_delete(doc! { "_id": *id }).await?)
    }

    #[instrument(skip(self))]
    async fn delete_all(&self) -> Result<u64, StoreError> {
        let result = self.events().delete_many(doc! {}).await?;
        Ok(result.deleted_count)
    }

    #[instrument(skip(self))]
    async fn add_participant(
        &self,
        event: &DbId,
        user: &DbId,
    ) -> Result<AddParticipant, StoreError> {
        // The `$ne` guard and `$addToSet` run as one document update, so a
        // concurrent join for the same pair cannot slip in between.
        let updated = self
            .events()
            .find_one_and_update(
                doc! { "_id": *event, "participants": { "$ne": *user } },
                doc! {
                    "$addToSet": { "participants": *user },
                    "$set": { "updated_at": bson::DateTime::now() },
                },
            )
            .return_document(ReturnDocument::After)
            .await?;

        if let Some(event) = updated {
            return Ok(AddParticipant::Added(event));
        }

        let exists = self.events().count_documents(doc! { "_id": *event }).await? > 0;
        debug!(exists, "Participant not added");

        Ok(if exists {
            AddParticipant::AlreadyPresent
        } else {
            AddParticipant::EventMissing
        })
    }
}
