use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{error, info, warn};

use super::models::{PayslipUploadForm, StatusReport};
use super::multipart_parser::MultipartParser;
use crate::auth::{validate_request_token, validate_token_str};
use crate::{AppState, ErrorResponse};

#[utoipa::path(
    context_path = "/api",
    tag = "Payslip Service",
    post,
    path = "/payslips/generate",
    request_body(content = inline(PayslipUploadForm), content_type = "multipart/form-data"),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Batch processed", body = StatusReport),
        (status = 400, description = "No file uploaded or nothing processed", body = ErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn generate_payslips(
    req: HttpRequest,
    payload: Multipart,
    data: web::Data<AppState>,
) -> impl Responder {
    info!("Executing generate_payslips handler");

    let upload = match MultipartParser::parse_payslip_upload(payload).await {
        Ok(upload) => upload,
        Err(e) => {
            warn!("Failed to parse payslip upload: {}", e);
            return HttpResponse::from(e);
        }
    };

    let auth = match upload.token.as_deref() {
        Some(token) => validate_token_str(token),
        None => validate_request_token(&req),
    };
    let claims = match auth {
        Ok(claims) => claims,
        Err(e) => return e.error_response(),
    };

    // An empty part is still an upload; the batch reports it as unparseable.
    let csv = match upload.csv_file {
        Some(bytes) => bytes,
        None => {
            return HttpResponse::BadRequest()
                .json(ErrorResponse::bad_request("No CSV file uploaded"));
        }
    };

    info!(
        "User {} uploaded {} ({} bytes)",
        claims.email,
        upload.filename.as_deref().unwrap_or("payroll CSV"),
        csv.len()
    );

    let batch = data.batch.clone();
    let status_messages = match web::block(move || batch.run(&csv)).await {
        Ok(lines) => lines,
        Err(e) => {
            error!("Payslip batch did not complete: {}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Payslip generation failed"));
        }
    };

    if status_messages.is_empty() {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::bad_request("The uploaded file contains no records"));
    }

    HttpResponse::Ok().json(StatusReport { status_messages })
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payslips").route("/generate", web::post().to(generate_payslips)),
    );
}
