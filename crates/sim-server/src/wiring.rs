use axum::{
    http::header,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};

use api::AppState;

pub fn build_app(state: AppState) -> Router {
    debug_assert!(sim_core::module_ready());
    debug_assert!(runtime::module_ready());
    debug_assert!(api::module_ready());
    debug_assert!(ui::module_ready());

    api::app(state)
        .route("/health", get(healthcheck))
        .route("/", get(index))
        .route("/static/styles.css", get(styles))
        .route("/static/app.js", get(script))
}

async fn healthcheck() -> &'static str {
    "ok"
}

async fn index() -> Html<&'static str> {
    Html(ui::index_html())
}

async fn styles() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], ui::styles_css())
}

async fn script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        ui::app_js(),
    )
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use sim_core::SimConfig;
    use tower::ServiceExt;

    fn test_app() -> axum::Router {
        super::build_app(api::AppState::new(
            Vec::new(),
            SimConfig::default(),
            Duration::ZERO,
        ))
    }

    #[tokio::test]
    async fn server_healthcheck_responds_ok() {
        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn root_serves_the_dashboard_shell() {
        let response = test_app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("<!doctype html>"));
    }

    #[tokio::test]
    async fn stylesheet_is_served_with_a_css_content_type() {
        let response = test_app()
            .oneshot(
                Request::get("/static/styles.css")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/css"
        );
    }
}
