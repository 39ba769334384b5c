use actix_web::{get, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;

use crate::{
    dal::entry_sheet_db, domain::company_homepage::FAILED_WORDCLOUD_PATH,
    services::WordcloudResolver,
};

use super::parse_id;

#[derive(Deserialize)]
struct WordcloudPathQuery {
    es_group_id: Option<String>,
}

#[derive(Serialize)]
struct WordcloudPathResponse {
    image_path: String,
}

#[get("/wordcloud-path")]
async fn get_wordcloud_path(
    query: web::Query<WordcloudPathQuery>,
    pool: web::Data<PgPool>,
    resolver: web::Data<WordcloudResolver>,
) -> HttpResponse {
    let Some(es_id) = parse_id(query.es_group_id.as_deref()) else {
        return HttpResponse::BadRequest()
            .json(json!({"error": "es_group_id must be an entry sheet id"}));
    };

    let image_path = match entry_sheet_db::get_entry_sheet(&pool, es_id).await {
        Ok(Some(es)) => resolver.resolve(&es.company, &es.homepage_url).await,
        Ok(None) => {
            return HttpResponse::NotFound().json(json!({"error": "entry sheet not found"}))
        }
        Err(e) => {
            log::error!("Error fetching entry sheet {}: {:?}", es_id, e);
            FAILED_WORDCLOUD_PATH.to_string()
        }
    };

    HttpResponse::Ok().json(WordcloudPathResponse { image_path })
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use actix_web::{http::StatusCode, test, web, App};
    use serde_json::Value;
    use sqlx::{
        postgres::{PgConnectOptions, PgPoolOptions},
        PgPool,
    };

    use crate::{
        configuration::{NewsSettings, WordcloudSettings},
        services::{HomepageWordcloudGenerator, NewsClient, PgHomepageStore, WordcloudResolver},
        startup::es_routes,
    };

    // Never connects: every request here is rejected before touching the database
    fn lazy_pool() -> PgPool {
        PgPoolOptions::new().connect_lazy_with(PgConnectOptions::new())
    }

    fn resolver(pool: &PgPool) -> WordcloudResolver {
        let settings = WordcloudSettings {
            timeout_secs: 1,
            max_words: 10,
            width: 400,
            height: 200,
        };

        WordcloudResolver::new(
            Arc::new(PgHomepageStore::new(pool.clone())),
            Arc::new(HomepageWordcloudGenerator::new(std::env::temp_dir(), &settings)),
            true,
            Duration::from_secs(1),
        )
    }

    #[actix_web::test]
    async fn malformed_es_group_id_is_bad_request() {
        let pool = lazy_pool();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(resolver(&pool)))
                .app_data(web::Data::new(pool))
                .service(web::scope("/es").configure(es_routes)),
        )
        .await;

        for uri in [
            "/es/wordcloud-path",
            "/es/wordcloud-path?es_group_id=",
            "/es/wordcloud-path?es_group_id=acme",
            "/es/wordcloud-path?es_group_id=1.5",
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;

            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["error"], "es_group_id must be an entry sheet id");
        }
    }

    #[actix_web::test]
    async fn named_routes_are_not_taken_for_entry_sheet_ids() {
        let pool = lazy_pool();
        let news_client = NewsClient::new(&NewsSettings {
            base_url: "https://news.example".to_string(),
            api_key: "".to_string(),
            page_size: 5,
        });
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(news_client))
                .app_data(web::Data::new(resolver(&pool)))
                .app_data(web::Data::new(pool))
                .service(web::scope("/es").configure(es_routes)),
        )
        .await;

        // The entry sheet page would demand a login first
        let req = test::TestRequest::get()
            .uri("/es/wordcloud-path?es_group_id=x")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get().uri("/es/12").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get().uri("/es/12abc").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
