use actix_web::{web, HttpRequest, HttpResponse, Responder};
use bcrypt::{hash, verify, DEFAULT_COST};

use super::jwt::{generate_access_token, get_access_token_expiry};
use super::middleware::validate_request_token;
use super::model::{LoginRequest, RegisterRequest, TokenResponse, UserInfo};
use super::validation::{validate_email, validate_required, ValidationErrors};
use crate::db::UserStoreError;
use crate::AppState;

/// Register a new operator account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = UserInfo),
        (status = 400, description = "Invalid email or password", body = crate::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::ErrorResponse)
    )
)]
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> impl Responder {
    let mut errors = ValidationErrors::new();
    validate_required(&body.email, "email", "Email", &mut errors);
    validate_email(&body.email, "email", &mut errors);
    validate_required(&body.password, "password", "Password", &mut errors);
    if let Err(message) = errors.into_result() {
        return HttpResponse::BadRequest().json(crate::ErrorResponse::bad_request(&message));
    }

    if state.get_user_by_email(&body.email).is_some() {
        return HttpResponse::Conflict().json(crate::ErrorResponse::new(
            "Conflict",
            "Email already registered",
        ));
    }

    let password_hash = match hash(&body.password, DEFAULT_COST) {
        Ok(h) => h,
        Err(e) => {
            log::error!("Failed to hash password: {:?}", e);
            return HttpResponse::InternalServerError()
                .json(crate::ErrorResponse::internal_error("Failed to register user"));
        }
    };

    match state.create_user(&body.email, &password_hash) {
        Ok(user) => HttpResponse::Created().json(UserInfo::from(user)),
        Err(UserStoreError::DuplicateEmail(_)) => HttpResponse::Conflict().json(
            crate::ErrorResponse::new("Conflict", "Email already registered"),
        ),
    }
}

/// Login endpoint
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = crate::ErrorResponse)
    )
)]
pub async fn login(state: web::Data<AppState>, body: web::Json<LoginRequest>) -> impl Responder {
    let user = match state.get_user_by_email(&body.email) {
        Some(user) => user,
        None => {
            return HttpResponse::Unauthorized().json(crate::ErrorResponse::new(
                "Unauthorized",
                "Invalid email or password",
            ));
        }
    };

    let password_valid = verify(&body.password, &user.password_hash).unwrap_or(false);
    if !password_valid {
        log::warn!("Failed login attempt for {}", user.email);
        return HttpResponse::Unauthorized().json(crate::ErrorResponse::new(
            "Unauthorized",
            "Invalid email or password",
        ));
    }

    let access_token = match generate_access_token(&user.id.to_string(), &user.email) {
        Ok(t) => t,
        Err(e) => {
            log::error!("Failed to generate access token: {:?}", e);
            return HttpResponse::InternalServerError()
                .json(crate::ErrorResponse::internal_error("Failed to generate token"));
        }
    };

    HttpResponse::Ok().json(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: get_access_token_expiry(),
    })
}

/// List registered users (protected)
#[utoipa::path(
    get,
    path = "/api/auth/users",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User list", body = Vec<UserInfo>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_users(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    if let Err(e) = validate_request_token(&req) {
        return e.error_response();
    }

    let users: Vec<UserInfo> = state
        .get_all_users()
        .into_iter()
        .map(UserInfo::from)
        .collect();
    HttpResponse::Ok().json(users)
}

/// Configure auth routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/users", web::get().to(list_users)),
    );
}
