//! Persistence for eventhub: the document models and the storage traits,
//! with a MongoDB backend and an in-memory backend used by tests.

pub mod models;
pub mod password;
pub mod storage;
