//! Eventhub API service.
//!
//! REST endpoints for user accounts, events and event participation, backed
//! by MongoDB.
//!
//! # Configuration
//!
//! The API needs a MongoDB connection string and an HS256 signing secret for
//! bearer tokens. See [`config::EventhubApiConfig`] for all options.
//!
//! # Authentication
//!
//! `POST /users/login` issues a bearer token; endpoints that act on behalf of
//! a user require `Authorization: Bearer <token>`. See [`auth`].

pub mod auth;
pub mod config;
pub mod error;
pub mod server;
pub mod upload;

pub(crate) mod context;
pub(crate) mod handlers;
pub(crate) mod services;
