use axum::http::StatusCode;
use axum::Router;

/// Answers every request with `status` and `body`. Returns the base URL.
pub(crate) async fn serve_fixed(status: StatusCode, body: &'static str) -> String {
    // Clients are built after this returns; keep them off any proxy in the environment.
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let app = Router::new().fallback(move || async move { (status, body) });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
