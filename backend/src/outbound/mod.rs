//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL user store using Diesel ORM
//! - **memory**: in-process user store for database-less deployments and tests
//! - **media**: reqwest-backed photo uploads
//! - **jwt**: HS256 access token verification
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod jwt;
pub mod media;
pub mod memory;
pub mod persistence;
