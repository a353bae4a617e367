//! Pure domain entities and value objects.

pub mod category;
pub mod product;
pub mod slug;
pub mod subcategory;
pub mod types;
pub mod user;
