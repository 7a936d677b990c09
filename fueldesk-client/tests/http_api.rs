// fueldesk-client/tests/http_api.rs
// HTTP classification tests against an in-process server: the conflict
// phrase and status mapping are the contract the coordinator relies on.

use std::net::SocketAddr;

use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde_json::{Value, json};

use fueldesk_client::{
    ClientConfig, ClientError, HttpShiftApi, ShiftApi, ShiftStart, extract_shift_id,
};

async fn spawn_server(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn shift_json(id: i64) -> Value {
    json!({
        "id": id,
        "openedAt": "2026-03-10",
        "startingStock": 100.0,
        "fuelIntake": 50.0,
        "station": "Pump 1",
        "operatorName": "Ana",
        "responsibleName": "Bruno",
        "closingStock": null,
        "entries": []
    })
}

fn start_params() -> ShiftStart {
    ShiftStart {
        starting_stock: Decimal::from(100),
        fuel_intake: Decimal::from(50),
        station: None,
        operator_name: "Ana".to_string(),
        responsible_name: "Bruno".to_string(),
    }
}

fn api_for(addr: SocketAddr) -> HttpShiftApi<fueldesk_client::NetworkHttpClient> {
    let config = ClientConfig::new(format!("http://{}", addr));
    HttpShiftApi::new(config.build_http_client().unwrap())
}

#[tokio::test]
async fn start_conflict_is_classified_and_id_recoverable() {
    let router = Router::new().route(
        "/api/shifts",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"message": "Existe um turno em aberto (ID: 42)"})),
            )
        }),
    );
    let addr = spawn_server(router).await;

    let err = api_for(addr).start_shift(&start_params()).await.unwrap_err();
    let ClientError::OpenShiftConflict(message) = err else {
        panic!("expected OpenShiftConflict, got {err:?}");
    };
    assert_eq!(extract_shift_id(&message), Some(42));
}

#[tokio::test]
async fn plain_400_is_a_validation_error_surfaced_verbatim() {
    let router = Router::new().route(
        "/api/shifts",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"message": "estoque inicial inválido"})),
            )
        }),
    );
    let addr = spawn_server(router).await;

    let err = api_for(addr).start_shift(&start_params()).await.unwrap_err();
    assert!(
        matches!(err, ClientError::Validation(ref msg) if msg == "estoque inicial inválido"),
        "got {err:?}"
    );
}

#[tokio::test]
async fn missing_shift_is_not_found() {
    let router = Router::new().route(
        "/api/shifts/{id}",
        get(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({"message": "Turno não encontrado"})),
            )
        }),
    );
    let addr = spawn_server(router).await;

    let err = api_for(addr).get_shift(7).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn successful_start_parses_wire_shift() {
    let router = Router::new().route(
        "/api/shifts",
        post(|| async { Json(shift_json(11)) }),
    );
    let addr = spawn_server(router).await;

    let shift = api_for(addr).start_shift(&start_params()).await.unwrap();
    assert_eq!(shift.id, Some(11));
    assert!(shift.is_open());
    assert_eq!(shift.starting_stock, Decimal::from(100));
}

#[tokio::test]
async fn bearer_token_rides_every_call() {
    let router = Router::new().route(
        "/api/shifts/{id}",
        get(|headers: HeaderMap| async move {
            let authorized = headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                == Some("Bearer sekret");
            if authorized {
                (StatusCode::OK, Json(shift_json(5)))
            } else {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"message": "missing credentials"})),
                )
            }
        }),
    );
    let addr = spawn_server(router).await;

    // Without a token the server turns us away.
    let err = api_for(addr).get_shift(5).await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized), "got {err:?}");

    let config = ClientConfig::new(format!("http://{}", addr)).with_token("sekret");
    let api = HttpShiftApi::new(config.build_http_client().unwrap());
    let shift = api.get_shift(5).await.unwrap();
    assert_eq!(shift.id, Some(5));
}

#[tokio::test]
async fn no_open_shift_400_on_add_is_remapped_to_not_found() {
    let router = Router::new().route(
        "/api/shifts/{id}/entries",
        axum::routing::put(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"message": "Não há turno aberto"})),
            )
        }),
    );
    let addr = spawn_server(router).await;

    let err = api_for(addr).add_entries(9, &[]).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)), "got {err:?}");
}
