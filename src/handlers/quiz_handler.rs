use actix_web::{get, post, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::request::{
        CreateCategoryRequest, CreateQuestionRequest, FinishQuizRequest, PaginationParams,
        StartQuizRequest, SubmitAnswerRequest,
    },
};

#[post("/api/quiz/start")]
async fn start_quiz(
    state: web::Data<AppState>,
    request: web::Json<StartQuizRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let response = state
        .attempt_service
        .start(&request.user_id, request.total_questions)
        .await?;
    Ok(HttpResponse::Created().json(response))
}

#[post("/api/quiz/answer")]
async fn submit_answer(
    state: web::Data<AppState>,
    request: web::Json<SubmitAnswerRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let feedback = state
        .attempt_service
        .submit_answer(
            &request.attempt_id,
            &request.question_id,
            &request.selected_option_id,
            request.time_spent_seconds,
        )
        .await?;
    Ok(HttpResponse::Ok().json(feedback))
}

#[post("/api/quiz/submit")]
async fn finish_quiz(
    state: web::Data<AppState>,
    request: web::Json<FinishQuizRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let result = state
        .attempt_service
        .finish(&request.attempt_id, request.total_time_seconds)
        .await?;
    Ok(HttpResponse::Ok().json(result))
}

#[get("/api/quiz/result/{attempt_id}")]
async fn quiz_result(
    state: web::Data<AppState>,
    attempt_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let result = state.attempt_service.result(&attempt_id).await?;
    Ok(HttpResponse::Ok().json(result))
}

#[get("/api/quiz/attempts/user/{user_id}")]
async fn user_attempts(
    state: web::Data<AppState>,
    user_id: web::Path<String>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse, AppError> {
    let pagination = query.into_inner();
    let response = state
        .attempt_service
        .attempts_for_user(&user_id, pagination.offset(), pagination.limit())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/api/quiz/categories")]
async fn list_categories(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let categories = state.question_bank_service.active_categories().await?;
    Ok(HttpResponse::Ok().json(categories))
}

#[post("/api/quiz/categories")]
async fn create_category(
    state: web::Data<AppState>,
    request: web::Json<CreateCategoryRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let category = state.question_bank_service.create_category(request).await?;
    Ok(HttpResponse::Created().json(category))
}

#[post("/api/quiz/questions")]
async fn create_question(
    state: web::Data<AppState>,
    request: web::Json<CreateQuestionRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let question = state.question_bank_service.create_question(request).await?;
    Ok(HttpResponse::Created().json(question))
}
