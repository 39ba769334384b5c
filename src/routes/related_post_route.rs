use actix_web::{get, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;

use crate::dal::question_db;

use super::{parse_id, CurrentUser};

#[derive(Deserialize)]
struct RelatedPostQuery {
    pk: Option<String>,
}

#[derive(Serialize)]
struct RelatedPostResponse {
    question: String,
    answer: String,
}

/// Other users' posts are reported as not found.
#[get("/related-post")]
async fn get_related_post(
    user: CurrentUser,
    query: web::Query<RelatedPostQuery>,
    pool: web::Data<PgPool>,
) -> HttpResponse {
    let Some(pk) = parse_id(query.pk.as_deref()) else {
        return HttpResponse::BadRequest().json(json!({"error": "pk must be a post id"}));
    };

    match question_db::get_question_for_author(&pool, pk, user.id).await {
        Ok(Some(post)) => HttpResponse::Ok().json(RelatedPostResponse {
            question: post.question,
            answer: post.answer,
        }),
        Ok(None) => HttpResponse::NotFound().json(json!({"error": "post not found"})),
        Err(e) => {
            log::error!("Error fetching related post {}: {:?}", pk, e);
            HttpResponse::InternalServerError().json(json!({"error": "could not load post"}))
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{cookie::Cookie, http::StatusCode, test, web, App};
    use serde_json::Value;
    use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

    use crate::{routes::USER_COOKIE, startup::es_routes};

    #[actix_web::test]
    async fn malformed_pk_is_bad_request() {
        let pool = PgPoolOptions::new().connect_lazy_with(PgConnectOptions::new());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(pool))
                .service(web::scope("/es").configure(es_routes)),
        )
        .await;

        for uri in ["/es/related-post", "/es/related-post?pk=first", "/es/related-post?pk=-"] {
            let req = test::TestRequest::get()
                .uri(uri)
                .cookie(Cookie::new(USER_COOKIE, "1"))
                .to_request();
            let resp = test::call_service(&app, req).await;

            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["error"], "pk must be a post id");
        }
    }

    #[actix_web::test]
    async fn anonymous_request_is_unauthorized() {
        let pool = PgPoolOptions::new().connect_lazy_with(PgConnectOptions::new());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(pool))
                .service(web::scope("/es").configure(es_routes)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/es/related-post?pk=7")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
