//! HTTP API route definitions.

use axum::{extract::State, routing::any, Router};
use strum::IntoEnumIterator;
use tower_http::trace::TraceLayer;

use super::handlers::{config_value, env, health, hello, integration_status, sleep, AppState};
use crate::status::Integration;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", any(hello))
        .route("/health", any(health))
        .route("/env", any(env))
        .route("/sleep", any(sleep))
        .route("/config/:config", any(config_value));

    // One status endpoint per integration, e.g. /postgresql/status
    for integration in Integration::iter() {
        router = router.route(
            &format!("/{integration}/status"),
            any(move |state: State<AppState>| integration_status(state, integration)),
        );
    }

    router
        .fallback(hello)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::{FAILURE_BODY, NOT_IMPLEMENTED_BODY};
    use crate::config::CharmConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use metrics::Counter;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    fn app(environ: &[&str]) -> Router {
        let state = AppState::new(CharmConfig::from_environ(environ), Counter::noop());
        create_router(state)
    }

    async fn get_path(app: Router, uri: &str) -> (StatusCode, String) {
        send(app, Method::GET, uri).await
    }

    async fn send(app: Router, method: Method, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let (status, body) = get_path(app(&[]), "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn root_echoes_path() {
        let (status, body) = get_path(app(&[]), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Hello world! Path: /\n");
    }

    #[tokio::test]
    async fn unknown_path_falls_back_to_hello() {
        let (status, body) = get_path(app(&[]), "/some/where").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Hello world! Path: /some/where\n");
    }

    #[tokio::test]
    async fn config_lookup_returns_json_value() {
        let (status, body) = get_path(app(&["GREETING=hi there"]), "/config/GREETING").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#""hi there""#);
    }

    #[tokio::test]
    async fn config_lookup_of_absent_name_is_bad_request() {
        let (status, body) = get_path(app(&["A=1"]), "/config/MISSING").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Bad Request. Config MISSING not found.");
    }

    #[tokio::test]
    async fn postgres_url_is_not_exposed_as_config() {
        let (status, _) = get_path(
            app(&["POSTGRESQL_DB_CONNECT_STRING=postgres://x"]),
            "/config/POSTGRESQL_DB_CONNECT_STRING",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn sleep_rejects_bad_duration() {
        let (status, body) = get_path(app(&[]), "/sleep?duration=soon").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Bad Request. Wrong duration");

        let (status, _) = get_path(app(&[]), "/sleep").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn sleep_with_zero_duration_returns_immediately() {
        let (status, _) = get_path(app(&[]), "/sleep?duration=0").await;

        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn sleep_with_negative_duration_returns_immediately() {
        let (status, _) = get_path(app(&[]), "/sleep?duration=-1").await;

        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn status_endpoints_accept_any_method() {
        let (status, body) = send(app(&[]), Method::POST, "/postgresql/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, FAILURE_BODY);

        let (status, _) = send(app(&["A=1"]), Method::PUT, "/config/A").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn request_counter_counts_root_env_and_unimplemented() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let counter = metrics::with_local_recorder(&recorder, crate::metrics::request_counter);
        let app = create_router(AppState::new(CharmConfig::from_environ(["A=1"]), counter));

        for uri in [
            "/",
            "/env",
            "/redis/status",
            "/health",
            "/config/A",
            "/postgresql/status",
        ] {
            get_path(app.clone(), uri).await;
        }

        let rendered = handle.render();
        assert!(rendered.contains("request_count 3"), "{rendered}");
    }

    #[tokio::test]
    async fn env_returns_json_array() {
        let (status, body) = get_path(app(&[]), "/env").await;

        assert_eq!(status, StatusCode::OK);
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(parsed.is_array());
    }

    #[tokio::test]
    async fn postgres_status_without_config_reports_failure() {
        let (status, body) = get_path(app(&[]), "/postgresql/status").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, FAILURE_BODY);
    }

    #[tokio::test]
    async fn unwired_status_endpoints_are_not_implemented() {
        for uri in ["/mysql/status", "/s3/status", "/mongodb/status", "/redis/status"] {
            let (status, body) = get_path(app(&[]), uri).await;

            assert_eq!(status, StatusCode::NOT_IMPLEMENTED, "{uri}");
            assert_eq!(body, NOT_IMPLEMENTED_BODY);
        }
    }
}
