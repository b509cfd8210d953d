//! HTTP surface for the vanish ephemeral file sharing service.
//!
//! Exposes three routes over the share gateway: a multipart upload, a
//! streaming download, and a health check, plus Swagger UI documentation.
//! Store backends are chosen at startup from a TOML configuration file.

pub mod api;
pub mod blob_factory;
pub mod config;
pub mod error;
pub mod state_factory;

pub use error::ServerError;
