pub mod auth_dto;
pub mod candidate_dto;
pub mod public_dto;
