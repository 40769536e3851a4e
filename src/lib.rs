pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    candidate_service::CandidateService, email_service::EmailService,
    location_service::LocationService, search_service::SearchService,
    token_service::TokenService,
    translation::{HttpTranslator, TranslationService},
};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub candidate_service: CandidateService,
    pub location_service: LocationService,
    pub search_service: SearchService,
    pub token_service: TokenService,
    pub email_service: EmailService,
    pub translation_service: TranslationService,
}

impl AppState {
    pub fn new(pool: PgPool) -> crate::error::Result<Self> {
        let config = crate::config::get_config();

        let candidate_service = CandidateService::new(pool.clone());
        let location_service = LocationService::new(pool.clone());
        let search_service = SearchService::new(pool.clone());
        let token_service = TokenService::new(pool.clone());
        let email_service = EmailService::new(pool.clone())?;
        let translator = Arc::new(HttpTranslator::new(
            config.translate_api_url.clone(),
            config.translate_api_key.clone(),
        ));
        let translation_service = TranslationService::new(pool.clone(), translator);

        Ok(Self {
            pool,
            candidate_service,
            location_service,
            search_service,
            token_service,
            email_service,
            translation_service,
        })
    }
}
