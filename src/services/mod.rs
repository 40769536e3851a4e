pub mod candidate_service;
pub mod email_service;
pub mod location_service;
pub mod search_service;
pub mod token_service;
pub mod translation;
