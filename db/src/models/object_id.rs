use std::fmt;

use bson::{Bson, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// Document identifier for users and events. Rendered to clients as the
/// 24-character hex form of the underlying ObjectId.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DbId(ObjectId);

impl DbId {
    pub fn new() -> Self {
        DbId(ObjectId::new())
    }

    /// Parses the hex form exactly as given. Returns `None` for anything that
    /// is not exactly 24 hex digits, surrounding whitespace included.
    pub fn parse(s: &str) -> Option<Self> {
        ObjectId::parse_str(s).ok().map(DbId)
    }

    pub fn inner(&self) -> &ObjectId {
        &self.0
    }
}

impl Default for DbId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

impl From<ObjectId> for DbId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl From<DbId> for ObjectId {
    fn from(id: DbId) -> Self {
        id.0
    }
}

// lets you use DbId directly in doc! {} and query filters
impl From<DbId> for Bson {
    fn from(id: DbId) -> Self {
        Bson::ObjectId(id.0)
    }
}
