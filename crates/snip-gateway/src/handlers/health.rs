use crate::model::HealthResponse;
use axum::response::Html;
use axum::Json;

const INDEX_PAGE: &str = r#"<!doctype html>
<html>
  <head><title>snip</title></head>
  <body>
    <h1>snip</h1>
    <p>POST a URL to <code>/api/v1/urls</code> to shorten it.</p>
  </body>
</html>
"#;

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_PAGE)
}
