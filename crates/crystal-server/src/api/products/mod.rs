//! Product catalogue handlers.
//!
//! - `GET    /api/v1/products`      listing summaries
//! - `POST   /api/v1/products`      create (JSON or multipart)
//! - `GET    /api/v1/products/{id}` full product
//! - `PATCH  /api/v1/products/{id}` partial update (JSON or multipart)
//! - `DELETE /api/v1/products/{id}` delete

mod read;
mod submission;
mod write;

pub(super) use read::{get_product, list_products};
pub(super) use write::{create_product, delete_product, update_product};
