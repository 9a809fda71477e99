use actix_web::{web, App, HttpResponse, HttpServer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ramadan_tracker::{
    EngineConfig, EngineError, MemoryStore, Mission, MissionCatalog, ProgressEngine, RankContext,
    SubmitRequest,
};

struct AppState {
    engine: ProgressEngine<MemoryStore>,
}

async fn submit_report(
    state: web::Data<AppState>,
    body: web::Json<SubmitRequest>,
) -> Result<HttpResponse, EngineError> {
    let request = body.into_inner();
    let today = state.engine.local_today();
    let outcome = state.engine.submit_daily_report(
        &request.user_id,
        request.date,
        today,
        request.submission,
        request.display_name.as_deref(),
    )?;
    Ok(HttpResponse::Ok().json(outcome))
}

async fn user_progress(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, EngineError> {
    let progress = state.engine.user_progress(&path.into_inner())?;
    Ok(HttpResponse::Ok().json(progress))
}

// POST because the caller supplies the ranking context it already computed.
async fn user_badges(
    state: web::Data<AppState>,
    path: web::Path<String>,
    ranks: web::Json<RankContext>,
) -> Result<HttpResponse, EngineError> {
    let badges = state
        .engine
        .badges(&path.into_inner(), ranks.into_inner())?;
    Ok(HttpResponse::Ok().json(badges))
}

async fn mission_catalog(state: web::Data<AppState>) -> HttpResponse {
    let missions: Vec<&Mission> = state.engine.catalog().active_missions().collect();
    HttpResponse::Ok().json(missions)
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().body("Ramadan tracker engine is running")
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = EngineConfig::from_env()?;
    let catalog = MissionCatalog::default_catalog();
    // Dies here if the catalog lost a fixed code.
    let engine = ProgressEngine::new(MemoryStore::new(), catalog, config)?;

    let state = web::Data::new(AppState { engine });
    info!("starting Ramadan tracker engine on http://127.0.0.1:8080");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .route("/health", web::get().to(health_check))
            .route("/missions", web::get().to(mission_catalog))
            .route("/reports", web::post().to(submit_report))
            .route("/progress/{user_id}", web::get().to(user_progress))
            .route("/badges/{user_id}", web::post().to(user_badges))
    })
    .bind(("127.0.0.1", 8080))?
    .run()
    .await?;

    Ok(())
}
