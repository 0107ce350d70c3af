mod common;

use std::sync::atomic::Ordering;

use actix_web::{http::header, http::StatusCode, test, web, App};
use serde_json::json;

use common::{CopyingConverter, OverlapConverter, RecordingMailer, Workspace, JANE_DOE_CSV};
use payslip_generator_server::auth::{generate_access_token, TokenResponse, UserInfo};
use payslip_generator_server::payslip::models::StatusReport;
use payslip_generator_server::{api_config, AppState, ErrorResponse};

const BOUNDARY: &str = "payslip-test-boundary";

fn app_state(workspace: &Workspace) -> AppState {
    AppState::new(workspace.batch(CopyingConverter::default(), RecordingMailer::default()))
}

/// Add a user directly, with a cheap hash to keep tests fast.
fn seed_user(state: &AppState, email: &str, password: &str) {
    let hash = bcrypt::hash(password, 4).unwrap();
    state.create_user(email, &hash).unwrap();
}

/// Seed the standard operator and return an access token for them.
fn seed_operator(state: &AppState) -> String {
    seed_user(state, "hr@example.com", "s3cret");
    let user = state.get_user_by_email("hr@example.com").unwrap();
    generate_access_token(&user.id.to_string(), &user.email).unwrap()
}

/// `(name, filename, data)` parts as a multipart/form-data body.
fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: text/csv\r\n\r\n",
                    name, filename
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
            ),
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn multipart_content_type() -> (header::HeaderName, String) {
    (
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={}", BOUNDARY),
    )
}

#[actix_web::test]
async fn test_register_then_reject_duplicate() {
    let workspace = Workspace::new(&["{Name}"]);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&workspace)))
            .configure(api_config),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({"email": "hr@example.com", "password": "s3cret"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let user: UserInfo = test::read_body_json(resp).await;
    assert_eq!(user.email, "hr@example.com");

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({"email": "HR@example.com", "password": "other"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_register_validates_fields() {
    let workspace = Workspace::new(&["{Name}"]);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&workspace)))
            .configure(api_config),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({"email": "not-an-email", "password": ""}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = test::read_body_json(resp).await;
    assert!(error.message.contains("[email]"));
    assert!(error.message.contains("[password]"));
}

#[actix_web::test]
async fn test_login_and_list_users() {
    let workspace = Workspace::new(&["{Name}"]);
    let state = app_state(&workspace);
    seed_user(&state, "hr@example.com", "s3cret");
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(api_config),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "hr@example.com", "password": "wrong"}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "hr@example.com", "password": "s3cret"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let token: TokenResponse = test::read_body_json(resp).await;
    assert_eq!(token.token_type, "Bearer");
    assert!(token.expires_in > 0);

    let req = test::TestRequest::get().uri("/api/auth/users").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::get()
        .uri("/api/auth/users")
        .insert_header((
            header::AUTHORIZATION,
            format!("Bearer {}", token.access_token),
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let users: Vec<UserInfo> = test::read_body_json(resp).await;
    assert_eq!(users.len(), 1);
}

#[actix_web::test]
async fn test_generate_with_bearer_header() {
    let workspace = Workspace::new(&["Employee: {Name}"]);
    let state = app_state(&workspace);
    let token = seed_operator(&state);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(api_config),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/payslips/generate")
        .insert_header(multipart_content_type())
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .set_payload(multipart_body(&[(
            "csv_file",
            Some("payroll.csv"),
            JANE_DOE_CSV.as_bytes(),
        )]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let report: StatusReport = test::read_body_json(resp).await;
    assert_eq!(report.status_messages.len(), 1);
    assert!(report.status_messages[0].starts_with("Jane_Doe: "));
    assert!(workspace.config.not_sent_dir.read_dir().unwrap().count() == 1);
}

#[actix_web::test]
async fn test_generate_with_form_token() {
    let workspace = Workspace::new(&["Employee: {Name}"]);
    let state = app_state(&workspace);
    let token = seed_operator(&state);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(api_config),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/payslips/generate")
        .insert_header(multipart_content_type())
        .set_payload(multipart_body(&[
            ("token", None, token.as_bytes()),
            ("csv_file", Some("payroll.csv"), JANE_DOE_CSV.as_bytes()),
        ]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_generate_requires_authentication() {
    let workspace = Workspace::new(&["Employee: {Name}"]);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&workspace)))
            .configure(api_config),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/payslips/generate")
        .insert_header(multipart_content_type())
        .set_payload(multipart_body(&[
            ("token", None, b"not-a-token".as_slice()),
            ("csv_file", Some("payroll.csv"), JANE_DOE_CSV.as_bytes()),
        ]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(!workspace.config.not_sent_dir.exists());
}

#[actix_web::test]
async fn test_generate_without_file_is_bad_request() {
    let workspace = Workspace::new(&["Employee: {Name}"]);
    let state = app_state(&workspace);
    let token = seed_operator(&state);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(api_config),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/payslips/generate")
        .insert_header(multipart_content_type())
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .set_payload(multipart_body(&[("note", None, b"no file here".as_slice())]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/payslips/generate")
        .insert_header(multipart_content_type())
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .set_payload(multipart_body(&[(
            "csv_file",
            Some("payroll.csv"),
            b"Name,Salary\n".as_slice(),
        )]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_empty_file_reports_parse_failure() {
    let workspace = Workspace::new(&["Employee: {Name}"]);
    let state = app_state(&workspace);
    let token = seed_operator(&state);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(api_config),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/payslips/generate")
        .insert_header(multipart_content_type())
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .set_payload(multipart_body(&[("csv_file", Some("payroll.csv"), b"".as_slice())]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let report: StatusReport = test::read_body_json(resp).await;
    assert_eq!(
        report.status_messages,
        vec!["Failed to process CSV file: no columns to parse from file".to_string()]
    );
}

#[actix_web::test]
async fn test_simultaneous_uploads_run_one_after_another() {
    let workspace = Workspace::new(&["Employee: {Name}"]);
    let converter = OverlapConverter::default();
    let state = AppState::new(workspace.batch(converter.clone(), RecordingMailer::default()));
    let token = seed_operator(&state);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(api_config),
    )
    .await;

    let upload = |csv: &str| {
        test::TestRequest::post()
            .uri("/api/payslips/generate")
            .insert_header(multipart_content_type())
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .set_payload(multipart_body(&[(
                "csv_file",
                Some("payroll.csv"),
                csv.as_bytes(),
            )]))
            .to_request()
    };
    let second = JANE_DOE_CSV.replace("Jane Doe", "John Smith");

    let (first_resp, second_resp) = futures_util::join!(
        test::call_service(&app, upload(JANE_DOE_CSV)),
        test::call_service(&app, upload(&second)),
    );
    assert_eq!(first_resp.status(), StatusCode::OK);
    assert_eq!(second_resp.status(), StatusCode::OK);

    assert_eq!(converter.inner.converted.lock().len(), 2);
    assert_eq!(converter.max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(workspace.config.not_sent_dir.read_dir().unwrap().count(), 2);
}
