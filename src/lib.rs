use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod batch;
pub mod config;
pub mod db;
pub mod delivery;
pub mod document;
pub mod payroll;
pub mod payslip;

pub use crate::db::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::auth::handlers::register,
        crate::auth::handlers::login,
        crate::auth::handlers::list_users,
        crate::payslip::handlers::generate_payslips
    ),
    components(
        schemas(
            auth::model::RegisterRequest,
            auth::model::LoginRequest,
            auth::model::TokenResponse,
            auth::model::UserInfo,
            payslip::models::StatusReport,
            payslip::models::PayslipUploadForm,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Operator registration and login."),
        (name = "Payslip Service", description = "Payroll CSV upload and payslip generation.")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Register the `/api` routes.
pub fn api_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(auth::handlers::config)
            .configure(payslip::handlers::config),
    );
}

pub async fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    dotenvy::dotenv().ok(); // Load .env file

    let server_config =
        config::ServerConfig::from_env().context("Failed to read server configuration")?;
    let payslip_config =
        config::PayslipConfig::from_env().context("Failed to read payslip configuration")?;
    payslip_config
        .ensure_directories()
        .context("Failed to create payslip output directories")?;

    if !payslip_config.template_path.exists() {
        log::warn!(
            "Payslip template {} not found, every record will fail until it is provided",
            payslip_config.template_path.display()
        );
    }

    let output_dir = payslip_config.output_dir.clone();
    let app_state = web::Data::new(AppState::new(batch::PayslipBatch::from_config(
        payslip_config,
    )));
    let allowed_origins = server_config.allowed_origins.clone();

    log::info!("Starting server at http://0.0.0.0:{}", server_config.port);

    HttpServer::new(move || {
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(cors)
            .app_data(app_state.clone())
            .configure(api_config)
            .service(actix_files::Files::new("/generated_payslips", output_dir.clone()))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind(("0.0.0.0", server_config.port))
    .with_context(|| format!("Failed to bind port {}", server_config.port))?
    .run()
    .await
    .context("HTTP server terminated with an error")
}
