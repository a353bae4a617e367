//! Catalog management REST API.
//!
//! JWT-authenticated catalog administration over a three-level hierarchy
//! (categories, subcategories, products) with user management on top.
//! Layers: `routes` (HTTP) -> `services` (business rules) -> `repository`
//! (Diesel/SQLite), with `domain` carrying the strongly-typed entities.

pub mod auth;
pub mod db;
pub mod domain;
pub mod dto;
pub mod forms;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod routes;
pub mod schema;
pub mod services;
