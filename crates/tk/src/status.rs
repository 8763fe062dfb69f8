//! Static liveness page.

use axum::{response::Html, routing::get, Router};
use tokio::net::TcpListener;

const PAGE: &str = "<h2>Thread keeper running</h2>";

pub fn router() -> Router {
    Router::new().route("/", get(index))
}

async fn index() -> Html<&'static str> {
    Html(PAGE)
}

pub async fn serve(port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "status page listening");
    serve_on(listener).await
}

pub async fn serve_on(listener: TcpListener) -> anyhow::Result<()> {
    axum::serve(listener, router()).await?;
    Ok(())
}
