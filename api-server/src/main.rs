mod config;
mod handlers;
mod response;
mod store;
mod types;
mod validation;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use racer_core::EngineConfig;

use crate::config::AppState;
use crate::store::RaceStore;

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health))
        .route("/api/races", web::post().to(handlers::submit_race))
        .route(
            "/api/races/leaderboard",
            web::get().to(handlers::leaderboard),
        );
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let bind_addr = config::bind_addr();
    let data_dir = config::data_dir();
    let races = RaceStore::open(&data_dir).map_err(std::io::Error::other)?;
    let state = AppState::new(races, &EngineConfig::arcade());
    let json_limit = state.json_limit;
    let http_workers = state.http_workers;

    tracing::info!(
        "starting racer leaderboard api: bind_addr={} data_dir={} json_limit={} leaderboard_limit={}",
        bind_addr,
        data_dir.display(),
        json_limit,
        state.leaderboard_limit
    );

    let mut server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .expose_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::JsonConfig::default().limit(json_limit))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .configure(routes)
    });
    if let Some(workers) = http_workers {
        server = server.workers(workers);
    }

    server.bind(bind_addr)?.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test as awtest};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn test_state() -> (AppState, TempDir) {
        let dir = TempDir::new().unwrap();
        let races = RaceStore::open(dir.path()).unwrap();
        let state = AppState {
            races: Arc::new(races),
            vehicles: Arc::new(
                EngineConfig::arcade()
                    .vehicle_names()
                    .map(str::to_string)
                    .collect(),
            ),
            leaderboard_limit: config::DEFAULT_LEADERBOARD_LIMIT,
            json_limit: config::DEFAULT_JSON_LIMIT_BYTES,
            http_workers: None,
        };
        (state, dir)
    }

    fn race_body(handle: &str, final_score: u32, race_time: u64) -> Value {
        json!({
            "player_name": "Ada",
            "github_username": handle,
            "base_score": final_score,
            "time_penalty": race_time / 1000,
            "life_bonus": 0,
            "completion_bonus": 0,
            "final_score": final_score,
            "race_time": race_time,
            "vehicle": "TypeScript Truck",
            "driver": "EVAN YOU",
            "lives_remaining": 0
        })
    }

    #[test]
    fn resolve_limit_checks_bounds() {
        assert_eq!(handlers::resolve_limit(None, 10), Ok(10));
        assert_eq!(handlers::resolve_limit(Some(100), 10), Ok(100));
        assert!(handlers::resolve_limit(Some(0), 10).is_err());
        assert!(handlers::resolve_limit(Some(101), 10).is_err());
    }

    #[actix_web::test]
    async fn submit_stores_race_with_prefixed_handle() {
        let (state, _dir) = test_state();
        let app = awtest::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(routes),
        )
        .await;

        let req = awtest::TestRequest::post()
            .uri("/api/races")
            .set_json(race_body("ada", 2158, 42_900))
            .to_request();
        let resp = awtest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = awtest::read_body_json(resp).await;
        assert_eq!(body["success"], Value::Bool(true));
        assert_eq!(body["message"], "Race result saved successfully!");
        assert_eq!(body["data"]["github_username"], "@ada");
        assert_eq!(body["data"]["final_score"], 2158);
        assert!(body["data"]["id"].as_i64().unwrap_or_default() > 0);
    }

    #[actix_web::test]
    async fn submit_rejects_invalid_fields_with_422() {
        let (state, _dir) = test_state();
        let app = awtest::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(routes),
        )
        .await;

        let mut body = race_body("-bad", 10, 10);
        body["vehicle"] = json!("Hover Board");
        let req = awtest::TestRequest::post()
            .uri("/api/races")
            .set_json(body)
            .to_request();
        let resp = awtest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = awtest::read_body_json(resp).await;
        assert_eq!(body["success"], Value::Bool(false));
        assert_eq!(body["error_code"], "validation_failed");
        assert!(body["errors"]["github_username"].is_array());
        assert!(body["errors"]["vehicle"].is_array());
        assert!(body["errors"].get("final_score").is_none());
    }

    #[actix_web::test]
    async fn leaderboard_returns_best_first() {
        let (state, _dir) = test_state();
        let app = awtest::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(routes),
        )
        .await;

        for (score, time) in [(50, 100), (200, 900), (200, 500)] {
            let req = awtest::TestRequest::post()
                .uri("/api/races")
                .set_json(race_body("ada", score, time))
                .to_request();
            let resp = awtest::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::CREATED);
        }

        let req = awtest::TestRequest::get()
            .uri("/api/races/leaderboard")
            .to_request();
        let resp = awtest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = awtest::read_body_json(resp).await;
        let times: Vec<u64> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|race| race["race_time"].as_u64().unwrap())
            .collect();
        assert_eq!(times, vec![500, 900, 100]);
    }

    #[actix_web::test]
    async fn leaderboard_rejects_out_of_range_limit() {
        let (state, _dir) = test_state();
        let app = awtest::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(routes),
        )
        .await;

        let req = awtest::TestRequest::get()
            .uri("/api/races/leaderboard?limit=500")
            .to_request();
        let resp = awtest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = awtest::read_body_json(resp).await;
        assert_eq!(body["error_code"], "invalid_limit");
    }

    #[actix_web::test]
    async fn health_reports_store_state() {
        let (state, _dir) = test_state();
        let app = awtest::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(routes),
        )
        .await;

        let req = awtest::TestRequest::get().uri("/health").to_request();
        let resp = awtest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = awtest::read_body_json(resp).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["stored_races"], 0);
        assert_eq!(body["vehicles"].as_array().map(Vec::len), Some(3));
    }
}
