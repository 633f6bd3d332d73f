//! HTTP surface end to end: screens built on a scripted upstream and the
//! built-in fallbacks, served on an ephemeral port
use chrono::{TimeZone, Utc};
use cosmodeck_backend::config::PollingConfig;
use cosmodeck_backend::module::fallbacks;
use cosmodeck_backend::module::loader::{Backoff, Loader};
use cosmodeck_backend::module::screens::{ScreenContext, Screens};
use cosmodeck_backend::module::sim::{ManualClock, SequenceRandom};
use cosmodeck_backend::module::sources::Sources;
use cosmodeck_backend::service::{self, AppState};
use cosmodeck_backend::test_utils::{Reply, ScriptedFetcher};
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

fn no_polling() -> PollingConfig {
    PollingConfig {
        iss_seconds: 0,
        space_weather_minutes: 0,
        launches_minutes: 0,
        nasa_minutes: 0,
        spacex_minutes: 0,
        crew_minutes: 0,
    }
}

/// Serve the dashboard; every upstream not scripted by `setup` is down
async fn spawn_app(setup: impl FnOnce(&ScriptedFetcher, &Sources)) -> String {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()));
    let random = Arc::new(SequenceRandom::constant(0.5));
    let sources = Sources::new("test-key");

    let fetcher = ScriptedFetcher::new();
    setup(&fetcher, &sources);

    let table = fallbacks::builtin(clock.clone(), random.clone()).build();
    let loader = Loader::new(Arc::new(fetcher), Arc::new(table)).with_backoff(Backoff::fixed(Duration::ZERO));
    let screens = Screens::build(&ScreenContext {
        loader: Arc::new(loader),
        sources,
        clock,
        random,
        polling: no_polling(),
    });

    let app = service::router(AppState::new(Arc::new(screens)));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn get_json(url: &str) -> (StatusCode, Value) {
    let response = reqwest::get(url).await.unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn health_and_index() {
    let base = spawn_app(|_, _| {}).await;

    let health = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(health.text().await.unwrap(), "OK");

    let (status, index) = get_json(&format!("{}/api/screens", base)).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = index["screens"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["today", "tracker", "launches", "events", "space-weather", "spacex", "epic"]
    );
    // Nothing is read yet, so nothing is active
    assert!(
        index["screens"][1]["sections"]
            .as_array()
            .unwrap()
            .iter()
            .all(|s| s["active"] == false)
    );
}

#[tokio::test]
async fn tracker_mixes_live_and_fallback() {
    let base = spawn_app(|fetcher, sources| {
        fetcher.script(
            sources.iss_position().url(),
            vec![Reply::json(json!({
                "message": "success",
                "timestamp": 1714564800,
                "iss_position": {"latitude": "10.0", "longitude": "-20.0"},
            }))],
        );
    })
    .await;

    let (status, tracker) = get_json(&format!("{}/api/screens/tracker", base)).await;
    assert_eq!(status, StatusCode::OK);

    let iss = &tracker["sections"]["iss"];
    assert_eq!(iss["active"], true);
    assert_eq!(iss["states"]["iss-position"]["result"]["status"], "success");
    assert_eq!(iss["view"]["latitude"], 10.0);
    assert_eq!(iss["view"]["longitude"], -20.0);

    // Open Notify crew is down: the built-in roster stands in
    let crew = &tracker["sections"]["crew"];
    assert_eq!(crew["states"]["astronauts"]["result"]["status"], "fallback");
    assert_eq!(crew["states"]["astronauts"]["result"]["reason"]["kind"], "network");
    assert_eq!(crew["view"]["total"], 7);
}

#[tokio::test]
async fn failing_section_does_not_break_its_screen() {
    let base = spawn_app(|_, _| {}).await;

    // Mars photos have no fallback; APOD does
    let (status, today) = get_json(&format!("{}/api/screens/today", base)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        today["sections"]["mars"]["states"]["mars-latest-photos"]["status"],
        "error"
    );
    assert_eq!(
        today["sections"]["apod"]["states"]["apod"]["result"]["status"],
        "fallback"
    );
    assert!(today["sections"]["passes"]["view"].is_array());
}

#[tokio::test]
async fn section_selection_from_query() {
    let base = spawn_app(|_, _| {}).await;

    let (status, crew) = get_json(&format!("{}/api/screens/tracker/crew?craft=Tiangong", base)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(crew["selection"]["craft"], "Tiangong");
    assert_eq!(crew["view"]["people"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn client_errors() {
    let base = spawn_app(|_, _| {}).await;

    let (status, body) = get_json(&format!("{}/api/screens/moon-base", base)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("moon-base"));

    let (status, _) = get_json(&format!("{}/api/screens/tracker/telescope", base)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get_json(&format!("{}/api/screens/space-weather/alerts?severity=extreme", base)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let client = reqwest::Client::new();
    let response = client
        .put(format!("{}/api/epic/date", base))
        .json(&json!({"date": "yesterday"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn game_needs_picks_before_launch() {
    let base = spawn_app(|_, _| {}).await;
    let client = reqwest::Client::new();

    let response = client.post(format!("{}/api/game/launch", base)).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = client
        .post(format!("{}/api/game/select", base))
        .json(&json!({"rocket": "no-such-rocket"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let (status, game) = get_json(&format!("{}/api/game", base)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(game["ready"], false);
}
