mod form;
mod store;
mod web;

use std::sync::Arc;

use store::{FsStore, SubmissionStore};
use tracing_subscriber::EnvFilter;
use web::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mode = args.get(1).map(String::as_str).unwrap_or("web");

    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());
    let records = SubmissionStore::new(Arc::new(FsStore::new(&data_dir)));

    match mode {
        "web" => {
            let port = args
                .get(2)
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(8080);
            let admin_password = match std::env::var("ADMIN_PASSWORD") {
                Ok(password) if !password.trim().is_empty() => password,
                _ => return Err("ADMIN_PASSWORD must be set before starting the server".into()),
            };

            tracing::info!("starting web server on port {port}, data dir {data_dir}");
            web::start_server(
                port,
                AppState {
                    records,
                    admin_password,
                },
            )
            .await?;
        }
        "export" => {
            // Writes the Word document straight from the local store,
            // without going through the web server.
            let output = args.get(2).map(String::as_str).unwrap_or(form::DOCX_FILENAME);
            let submissions = records.load()?;
            let bytes = form::render_docx(&submissions, chrono::Utc::now())?;
            std::fs::write(output, bytes)?;
            tracing::info!("wrote {} submissions to {output}", submissions.len());
        }
        other => {
            return Err(format!("unknown mode '{other}' (expected 'web' or 'export')").into());
        }
    }

    Ok(())
}
