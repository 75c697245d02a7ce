//! Input parameters for the eventhub endpoints, with the validation that
//! turns them into the checked values the services work with.

mod auth;
pub use auth::*;

mod events;
pub use events::*;

mod users;
pub use users::*;
