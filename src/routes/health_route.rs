use actix_web::{get, web, HttpResponse};
use serde_json::json;
use sqlx::PgPool;

/// Landing route, also used as a health check.
#[get("/")]
async fn health(pool: web::Data<PgPool>) -> HttpResponse {
    let database = match sqlx::query("select 1").execute(pool.get_ref()).await {
        Ok(_) => "ok",
        Err(e) => {
            log::error!("Database health check failed: {:?}", e);
            "unavailable"
        }
    };

    HttpResponse::Ok().json(json!({"service": "esuits", "database": database}))
}
