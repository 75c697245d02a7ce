mod create_user;
mod list_users;
mod purge_events;

pub use create_user::*;
pub use list_users::*;
pub use purge_events::*;
