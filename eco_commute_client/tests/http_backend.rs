use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use eco_commute_client::{
    backend::CommuteBackend,
    geocoder::{NominatimGeocoder, ReverseGeocoder},
    http::HttpBackend,
    pipeline::StageOutcome,
    ClientConfig, ClientError, CommuteClient,
};
use eco_commute_lib::{trip::TripSummary, Coordinate, TimeOfDay, TravelMode};
use serde_json::{json, Value};

#[derive(Default)]
struct Stub {
    logged: Mutex<Vec<Value>>,
    route_queries: Mutex<Vec<HashMap<String, String>>>,
}

type Shared = Arc<Stub>;

async fn recommend_mode(Path(distance): Path<f64>) -> Response {
    if distance > 10_000. {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let mode = if distance < 5. { "bicycling" } else { "transit" };
    Json(json!({ "recommended_mode": mode })).into_response()
}

async fn route_with_traffic(State(stub): State<Shared>, Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    let nowhere = query.get("origin").map(String::as_str) == Some("0.0000,0.0000");
    stub.route_queries.lock().unwrap().push(query);
    if nowhere {
        return Json(json!({ "message": "No route found." }));
    }
    Json(json!({ "duration": "10 mins", "distance": "1.9 km", "traffic_duration": "13 mins" }))
}

async fn log_trip(State(stub): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    stub.logged.lock().unwrap().push(body);
    Json(json!({ "co2_emitted": 0.0, "co2_saved": 0.3, "badge_earned": "Eco Starter" }))
}

async fn suggest_cleanest_route(
    State(stub): State<Shared>,
    Path(user_id): Path<i64>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    stub.route_queries.lock().unwrap().push(query);
    if user_id != 1 {
        return Json(json!({ "message": "No trips found for this route." }));
    }
    Json(json!({ "mode": "walk", "co2_emitted": 0.0, "duration_min": "18" }))
}

async fn latest_trip(Path(user_id): Path<i64>) -> Response {
    if user_id != 1 {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "No trips found" }))).into_response();
    }
    Json(json!({
        "mode": "bus",
        "distance_km": 12.0,
        "duration_min": 25.0,
        "time_of_day": "morning",
        "co2_emitted": 1.2,
        "co2_saved": 1.1,
    }))
    .into_response()
}

async fn explain_route(Json(body): Json<Value>) -> Json<Value> {
    match body["mode"].as_str() {
        Some("car") => Json(json!({ "error": "model unavailable" })),
        Some(mode) => Json(json!({ "explanation": format!("Taking the {mode} saved {} kg.", body["co2_saved"]) })),
        None => Json(json!({ "error": "missing mode" })),
    }
}

async fn reverse(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    if query.get("format").map(String::as_str) != Some("json") {
        return Json(json!({ "error": "format" }));
    }
    match query.get("lat").and_then(|lat| lat.parse::<f64>().ok()) {
        Some(lat) if lat != 0. => Json(json!({ "display_name": "Trade St, Charlotte" })),
        _ => Json(json!({ "error": "Unable to geocode" })),
    }
}

async fn serve() -> (String, Shared) {
    let stub = Shared::default();
    let app = Router::new()
        .route("/recommend_mode/{distance}", get(recommend_mode))
        .route("/route_with_traffic", get(route_with_traffic))
        .route("/log_trip", post(log_trip))
        .route("/suggest_cleanest_route/{user_id}", get(suggest_cleanest_route))
        .route("/latest_trip/{user_id}", get(latest_trip))
        .route("/explain_route", post(explain_route))
        .route("/reverse", get(reverse))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), stub)
}

fn config(base_url: &str) -> ClientConfig {
    ClientConfig {
        api_base_url: base_url.to_owned(),
        geocoder_url: base_url.to_owned(),
        ..Default::default()
    }
}

fn pt(lat: f64, lng: f64) -> Coordinate {
    Coordinate::new(lat, lng).unwrap()
}

#[tokio::test]
async fn recommendation_folds_service_mode_names() {
    let (base, _) = serve().await;
    let backend = HttpBackend::new(&config(&base)).unwrap();

    assert_eq!(backend.recommend_mode(1.5).await.unwrap(), TravelMode::Bike);
    assert_eq!(backend.recommend_mode(12.).await.unwrap(), TravelMode::Bus);

    let err = backend.recommend_mode(20_000.).await.unwrap_err();
    assert!(matches!(err, ClientError::Status { endpoint: "recommend_mode", .. }));
}

#[tokio::test]
async fn missing_routes_are_not_errors() {
    let (base, stub) = serve().await;
    let backend = HttpBackend::new(&config(&base)).unwrap();

    let route = backend.route_with_traffic(pt(35.2271, -80.8431), pt(35.24, -80.85)).await.unwrap().unwrap();
    assert_eq!(route.duration, "10 mins");
    assert_eq!(route.level().label(), "Moderate");
    assert!(backend.route_with_traffic(pt(0., 0.), pt(1., 1.)).await.unwrap().is_none());

    let cleanest = backend.cleanest_route(1, pt(35.2271, -80.8431), pt(35.24, -80.85)).await.unwrap().unwrap();
    assert_eq!(cleanest.mode, TravelMode::Walk);
    assert_eq!(cleanest.duration_min, Some(18.));
    assert!(backend.cleanest_route(2, pt(1., 1.), pt(2., 2.)).await.unwrap().is_none());

    let queries = stub.route_queries.lock().unwrap();
    assert_eq!(queries[0]["origin"], "35.2271,-80.8431");
    assert_eq!(queries[0]["destination"], "35.2400,-80.8500");
}

#[tokio::test]
async fn latest_trip_and_explanation() {
    let (base, _) = serve().await;
    let backend = HttpBackend::new(&config(&base)).unwrap();

    let summary = backend.latest_trip(1).await.unwrap().unwrap();
    assert_eq!(summary.mode, TravelMode::Bus);
    assert_eq!(summary.time_of_day, TimeOfDay::Morning);
    assert!(backend.latest_trip(7).await.unwrap().is_none());

    let explanation = backend.explain_route(&summary).await.unwrap();
    assert_eq!(explanation, "Taking the bus saved 1.1 kg.");

    let by_car = TripSummary { mode: TravelMode::Car, ..summary };
    let err = backend.explain_route(&by_car).await.unwrap_err();
    assert!(matches!(err, ClientError::Service { ref message, .. } if message == "model unavailable"));
}

#[tokio::test]
async fn logged_trip_body() {
    let (base, stub) = serve().await;
    let client = CommuteClient::start(&config(&base)).unwrap();

    let plan = client.plan("35.2271,-80.8431", " 35.24 , -80.85 ").await.unwrap();

    assert_eq!(plan.mode, StageOutcome::Ready(TravelMode::Bike));
    let trip = plan.trip.ready().unwrap();
    assert_eq!(trip.badge(), Some("Eco Starter"));
    assert_eq!(plan.cleanest.ready().map(|route| route.mode.clone()), Some(TravelMode::Walk));

    let logged = stub.logged.lock().unwrap();
    assert_eq!(logged.len(), 1);
    let body = &logged[0];
    assert_eq!(body["user_id"], 1);
    assert_eq!(body["origin"], "35.2271,-80.8431");
    assert_eq!(body["destination"], "35.2400,-80.8500");
    assert_eq!(body["mode"], "bike");
    assert_eq!(body["duration_min"], 10.0);
    assert!(body["time_of_day"].is_string());
    assert!(body["date"].as_str().unwrap().len() == 10);
}

#[tokio::test]
async fn malformed_input_never_reaches_the_server() {
    let (base, stub) = serve().await;
    let client = CommuteClient::start(&config(&base)).unwrap();

    let err = client.plan("abc", "35.24,-80.85").await.unwrap_err();
    assert!(err.is_validation());
    assert!(stub.logged.lock().unwrap().is_empty());
    assert!(stub.route_queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn reverse_geocoding() {
    let (base, _) = serve().await;
    let geocoder = NominatimGeocoder::new(&config(&base)).unwrap();

    assert_eq!(geocoder.reverse(pt(35.2271, -80.8431)).await.unwrap().as_deref(), Some("Trade St, Charlotte"));
    assert_eq!(geocoder.reverse(pt(0., 0.)).await.unwrap(), None);
}

#[tokio::test]
async fn unreachable_backend_fails_each_stage_but_keeps_distance() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let client = CommuteClient::start(&config(&base)).unwrap();
    let plan = client.plan("35.2271,-80.8431", "35.24,-80.85").await.unwrap();

    assert!((plan.distance_km - 1.565).abs() < 0.005);
    assert!(matches!(plan.mode, StageOutcome::Failed(_)));
    assert!(matches!(plan.traffic, StageOutcome::Failed(_)));
    assert_eq!(plan.trip, StageOutcome::Skipped);
    assert!(matches!(plan.cleanest, StageOutcome::Failed(_)));
}
