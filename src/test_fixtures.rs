//! Test fixtures for exercising the gateway against an in-process backend.

#![cfg(test)]

use axum::Router;
use tokio::net::TcpListener;

/// Serves `router` on an ephemeral localhost port and returns its base URL.
pub async fn spawn_backend(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A localhost URL with nothing listening behind it.
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;

    #[tokio::test]
    async fn test_spawned_backend_answers() {
        let base = spawn_backend(Router::new().route("/ping", get(|| async { "pong" }))).await;
        let body = reqwest::get(format!("{base}/ping")).await.unwrap().text().await.unwrap();
        assert_eq!(body, "pong");
    }

    #[tokio::test]
    async fn test_unreachable_url_refuses_connections() {
        let base = unreachable_base_url().await;
        let err = reqwest::get(format!("{base}/ping")).await.unwrap_err();
        assert!(err.is_connect());
    }
}
