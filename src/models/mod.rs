//! Diesel row models and their conversions to and from domain entities.

pub mod category;
pub mod config;
pub mod product;
pub mod subcategory;
pub mod user;
