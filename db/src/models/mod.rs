pub mod event;
pub mod object_id;
pub mod user;

pub use event::*;
pub use object_id::*;
pub use user::*;
