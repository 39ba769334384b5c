use std::net::TcpListener;

use actix_files::Files;
use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};
use sqlx::PgPool;

use crate::{
    routes::{es_edit_route, health_route, related_post_route, wordcloud_route},
    services::{NewsClient, WordcloudResolver},
};

pub fn run(
    listener: TcpListener,
    db_pool: PgPool,
    news_client: NewsClient,
    wordcloud_resolver: WordcloudResolver,
    media_dir: String,
) -> Result<Server, std::io::Error> {
    let db_pool = web::Data::new(db_pool);
    let news_client = web::Data::new(news_client);
    let wordcloud_resolver = web::Data::new(wordcloud_resolver);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(Files::new("/static", "./static").prefer_utf8(true))
            .service(Files::new("/media", media_dir.clone()).prefer_utf8(true))
            .service(health_route::health)
            .service(web::scope("/es").configure(es_routes))
            .app_data(db_pool.clone())
            .app_data(news_client.clone())
            .app_data(wordcloud_resolver.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

/// Entry sheet routes, mounted under `/es`.
pub fn es_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(related_post_route::get_related_post)
        .service(wordcloud_route::get_wordcloud_path)
        .service(es_edit_route::es_edit_page)
        .service(es_edit_route::save_answers);
}
