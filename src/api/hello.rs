use axum::Json;

use crate::models::Greeting;

/// GET /api/hello
pub async fn hello() -> Json<Greeting> {
    Json(Greeting {
        message: "Hello, World!".to_string(),
    })
}
