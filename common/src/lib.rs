//! Types shared between the eventhub API, its storage layer and the operator
//! CLI: request parameters, response views and the authenticated caller.

pub mod caller;
pub mod params;
pub mod role;
pub mod validation;
pub mod views;

pub use role::Role;
