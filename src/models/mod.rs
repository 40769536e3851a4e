pub mod candidate;
pub mod email_outbox;
pub mod location;
pub mod token;
pub mod user;
