use std::{net::TcpListener, sync::Arc, time::Duration};

use env_logger::Env;
use esuits::{
    configuration::get_configuration,
    services::{HomepageWordcloudGenerator, NewsClient, PgHomepageStore, WordcloudResolver},
    startup::run,
};
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().expect("Failed to read configuration.");

    let pool_options = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(15 * 60)) // 15 minutes
        .max_lifetime(None);

    let connection_pool = pool_options.connect_lazy_with(configuration.database.with_db());
    if let Err(e) = sqlx::migrate!("./migrations").run(&connection_pool).await {
        log::error!("Failed to run database migrations: {:?}", e);
    }

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(address)?;

    let news_client = NewsClient::new(&configuration.news);
    let generator = HomepageWordcloudGenerator::new(
        &configuration.application.media_dir,
        &configuration.wordcloud,
    );
    let wordcloud_resolver = WordcloudResolver::new(
        Arc::new(PgHomepageStore::new(connection_pool.clone())),
        Arc::new(generator),
        configuration.application.debug,
        configuration.wordcloud.timeout(),
    );
    log::info!(
        "Word cloud generation is {}",
        match configuration.application.debug {
            true => "enabled",
            false => "disabled",
        }
    );

    run(
        listener,
        connection_pool,
        news_client,
        wordcloud_resolver,
        configuration.application.media_dir,
    )?
    .await
}
