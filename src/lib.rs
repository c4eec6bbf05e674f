//! # Manyfold
//!
//! A folder-membership service for media libraries: one attachment, many
//! folders. Usable both as a standalone server binary and as a library.
//!
//! Attachments and folders are owned elsewhere (a media manager and a
//! folder tree); manyfold only records which attachment sits in which
//! folders and keeps that relation consistent under concurrent edits.
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use manyfold::server::{AppState, create_router};
//! use manyfold::service::MembershipService;
//! use manyfold::store::{MembershipStore, SqliteStore};
//!
//! let store = SqliteStore::new("./data/manyfold.db").unwrap();
//! store.initialize().unwrap();
//!
//! let service = Arc::new(MembershipService::new(Arc::new(store)));
//! let state = Arc::new(AppState::new(service, "secret-token".to_string()));
//! let router = create_router(state);
//! // Serve with axum...
//! ```

pub mod config;
pub mod error;
pub mod notify;
pub mod server;
pub mod service;
pub mod store;
pub mod types;
