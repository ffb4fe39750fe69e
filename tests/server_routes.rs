#![cfg(feature = "server")]

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{MockMarket, MockPages, MockStatements, read_fixture, service, snapshot};
use jpquote::server::{AppState, routes};
use jpquote::{BatchOptions, WorkerPool};
use std::time::Duration;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn state(market: Arc<MockMarket>) -> AppState {
    let pages = MockPages::new().with_page("7203.T", read_fixture("name_page/7203.T.html"));
    let service = Arc::new(service(
        market,
        Arc::new(MockStatements::new()),
        Arc::new(pages),
    ));
    AppState::new(service, WorkerPool::new(5).unwrap(), BatchOptions::default())
}

fn toyota_market() -> Arc<MockMarket> {
    Arc::new(MockMarket::new().with_snapshot("7203.T", snapshot(2500.0, 2450.0)))
}

async fn get(state: AppState, uri: &str) -> (StatusCode, Value) {
    let response = routes(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn health_check() {
    let (status, body) = get(state(toyota_market()), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["message"], "Stock data server is running.");
}

#[tokio::test]
async fn stock_data_success() {
    let (status, body) = get(state(toyota_market()), "/stock-data?code=7203").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["companyName"], "トヨタ自動車(株)");
    assert_eq!(body["code"], "7203");
    assert_eq!(body["market"], "東証");
    assert_eq!(body["change"], 50.0);
    assert_eq!(body["changePercent"], 2.04);
    assert_eq!(body["sales_latest"], "---");
}

#[tokio::test]
async fn stock_data_missing_code() {
    let market = toyota_market();
    let (status, body) = get(state(market.clone()), "/stock-data").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "証券コードが指定されていません");
    assert!(market.calls().is_empty());

    let (status, _) = get(state(market.clone()), "/stock-data?code=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stock_data_unknown_code() {
    let (status, body) = get(state(toyota_market()), "/stock-data?code=0000").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "0000");
    assert!(body["error"].as_str().unwrap().contains("0000"));
}

#[tokio::test]
async fn multiple_stock_data_missing_codes() {
    let (status, body) = get(state(toyota_market()), "/multiple-stock-data").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "証券コードのリストが指定されていません");

    let (status, _) = get(state(toyota_market()), "/multiple-stock-data?codes=%20,%20,").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn multiple_stock_data_rejects_21_codes() {
    let market = toyota_market();
    let codes: Vec<String> = (0..21).map(|n| (2000 + n).to_string()).collect();
    let uri = format!("/multiple-stock-data?codes={}", codes.join(","));

    let (status, body) = get(state(market.clone()), &uri).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("20"));
    assert!(market.calls().is_empty());
}

#[tokio::test]
async fn multiple_stock_data_accepts_20_codes() {
    let codes: Vec<String> = (0..19)
        .map(|n| (2000 + n).to_string())
        .chain(std::iter::once("7203".to_string()))
        .collect();
    let uri = format!("/multiple-stock-data?codes={}", codes.join(","));

    let (status, body) = get(state(toyota_market()), &uri).await;

    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 20);
    for code in &codes {
        assert!(entries.iter().any(|e| e["code"] == code.as_str()));
    }
    let toyota = entries.iter().find(|e| e["code"] == "7203").unwrap();
    assert_eq!(toyota["price"], "2,500");
    assert_eq!(entries.iter().filter(|e| e.get("error").is_some()).count(), 19);
}

#[tokio::test]
async fn multiple_stock_data_trims_blank_entries() {
    let (status, body) = get(
        state(toyota_market()),
        "/multiple-stock-data?codes=7203,,%20,0000,",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn single_quotes_wait_for_pool_permits() {
    let mut market = MockMarket::new();
    for n in 0..5 {
        let symbol = format!("100{}.T", n);
        market = market
            .with_snapshot(&symbol, snapshot(100.0, 100.0))
            .with_delay(&symbol, Duration::from_millis(50));
    }
    let market = Arc::new(market);
    let service = Arc::new(service(
        market.clone(),
        Arc::new(MockStatements::new()),
        Arc::new(MockPages::new()),
    ));
    let state = AppState::new(service, WorkerPool::new(1).unwrap(), BatchOptions::default());

    let requests = (0..5).map(|n| {
        let state = state.clone();
        async move { get(state, &format!("/stock-data?code=100{}", n)).await }
    });
    let responses = futures_util::future::join_all(requests).await;

    assert!(responses.iter().all(|(status, _)| *status == StatusCode::OK));
    assert_eq!(market.peak(), 1);
    assert_eq!(state.pool.available(), 1);
}
