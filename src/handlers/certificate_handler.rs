use actix_web::{get, patch, post, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::request::{GenerateCertificateRequest, RevokeCertificateRequest},
};

#[post("/api/certificates/generate")]
async fn generate_certificate(
    state: web::Data<AppState>,
    request: web::Json<GenerateCertificateRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let certificate = state
        .certificate_service
        .generate(&request.attempt_id)
        .await?;
    Ok(HttpResponse::Created().json(certificate))
}

#[get("/api/certificates/verify/{code}")]
async fn verify_certificate(
    state: web::Data<AppState>,
    code: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let verification = state.certificate_service.verify(&code).await?;
    Ok(HttpResponse::Ok().json(verification))
}

#[patch("/api/certificates/{id}/revoke")]
async fn revoke_certificate(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<RevokeCertificateRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let ack = state
        .certificate_service
        .revoke(&id, &request.reason)
        .await?;
    Ok(HttpResponse::Ok().json(ack))
}

#[get("/api/certificates/{id}/download")]
async fn download_certificate(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let (filename, bytes) = state.certificate_service.download(&id).await?;

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(bytes))
}

#[get("/api/certificates/user/{user_id}")]
async fn user_certificate(
    state: web::Data<AppState>,
    user_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let certificate = state.certificate_service.active_for_user(&user_id).await?;
    Ok(HttpResponse::Ok().json(certificate))
}
