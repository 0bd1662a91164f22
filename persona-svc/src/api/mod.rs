//! HTTP API handlers for persona-svc

pub mod health;
pub mod persons;

pub use health::health_routes;
pub use persons::{add_person, delete_person, get_persons, update_person};
