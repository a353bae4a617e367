//! Response DTOs: flat, serializable views of domain entities.

pub mod categories;
pub mod products;
pub mod subcategories;
pub mod users;
