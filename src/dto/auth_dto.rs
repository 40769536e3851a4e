use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(min = 2, max = 120))]
    pub full_name_en: String,
    pub full_name_ne: Option<String>,

    // English fields are the required inputs; Nepali is optional and filled
    // by machine translation when absent.
    #[validate(length(min = 10, max = 2000))]
    pub bio_en: String,
    pub bio_ne: Option<String>,
    #[validate(length(min = 2, max = 2000))]
    pub education_en: String,
    pub education_ne: Option<String>,
    #[validate(length(min = 2, max = 2000))]
    pub experience_en: String,
    pub experience_ne: Option<String>,
    #[validate(length(min = 20, max = 10000))]
    pub manifesto_en: String,
    pub manifesto_ne: Option<String>,

    pub position_level: String,
    pub province_id: i32,
    pub district_id: i32,
    pub municipality_id: i32,
    pub ward_number: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user_id: uuid::Uuid,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyEmailRequest {
    #[validate(length(equal = 64))]
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RequestPasswordResetRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(equal = 64))]
    pub token: String,
    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

/// Generic acknowledgement used where a specific answer would leak whether an
/// account exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericMessageResponse {
    pub message: String,
}
