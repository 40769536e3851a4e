pub mod admin;
pub mod auth_routes;
pub mod ballot;
pub mod candidate_routes;
pub mod health;
pub mod location_routes;
pub mod public;
