use actix_files::Files;
use actix_web::http::{header, StatusCode};
use actix_web::{middleware, web, App, HttpResponse, HttpServer, ResponseError};
use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use tracing::error;

use crate::form::{
    build_submission, render_csv, render_docx, validate_submission, ExportError, SubmitRequest,
    CSV_FILENAME, DOCX_CONTENT_TYPE, DOCX_FILENAME,
};
use crate::store::{StoreError, SubmissionStore};

pub struct AppState {
    pub records: SubmissionStore,
    pub admin_password: String,
}

#[derive(Deserialize)]
pub struct AdminRequest {
    #[serde(default)]
    password: String,
}

/// Errors surfaced by the API handlers, mapped onto status codes and JSON
/// bodies at the response boundary. Store and export causes are logged
/// server-side and never detailed to the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid password.")]
    Unauthorized,
    #[error("Server error. Please try again later.")]
    Store(#[from] StoreError),
    #[error("Failed to generate document.")]
    Export(#[from] ExportError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Store(_) | ApiError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Store(cause) => error!("store failure: {cause}"),
            ApiError::Export(cause) => error!("export failure: {cause}"),
            _ => {}
        }
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}

fn authorize(state: &AppState, supplied: &str) -> Result<(), ApiError> {
    if supplied == state.admin_password {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}

// Public submission endpoint
async fn submit(
    req: web::Json<SubmitRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let req = req.into_inner();
    validate_submission(&req).map_err(ApiError::Validation)?;

    let mut submissions = state.records.load()?;
    submissions.push(build_submission(req));
    state.records.save(&submissions)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Submission received!"
    })))
}

// Admin listing endpoint
async fn list_submissions(
    req: web::Json<AdminRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    authorize(state.get_ref(), &req.password)?;

    let submissions = state.records.load()?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "submissions": submissions })))
}

// Admin Word-document download endpoint
async fn download_docx(
    req: web::Json<AdminRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    authorize(state.get_ref(), &req.password)?;

    let submissions = state.records.load()?;
    let bytes = render_docx(&submissions, Utc::now())?;
    Ok(HttpResponse::Ok()
        .content_type(DOCX_CONTENT_TYPE)
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={DOCX_FILENAME}"),
        ))
        .body(bytes))
}

// Admin spreadsheet download endpoint
async fn download_csv(
    req: web::Json<AdminRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    authorize(state.get_ref(), &req.password)?;

    let submissions = state.records.load()?;
    let bytes = render_csv(&submissions)?;
    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={CSV_FILENAME}"),
        ))
        .body(bytes))
}

pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/submit", web::post().to(submit))
        .route("/api/submissions", web::post().to(list_submissions))
        .route("/api/download", web::post().to(download_docx))
        .route("/api/download.csv", web::post().to(download_csv));
}

pub async fn start_server(port: u16, state: AppState) -> std::io::Result<()> {
    let state = web::Data::new(state);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(api_routes)
            // The form and admin pages are a prebuilt frontend dropped into
            // static/; the server only hosts them.
            .service(Files::new("/", "static").index_file("index.html"))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
