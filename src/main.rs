use geo_quiz_leaderboard::config::Config;
use rocket::launch;
use tracing_subscriber::EnvFilter;

#[launch]
async fn rocket() -> _ {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env().expect("invalid configuration");
    let store = geo_quiz_leaderboard::connect_store(&config)
        .await
        .expect("failed to connect to a database");

    // Build the rocket
    geo_quiz_leaderboard::build(config, store)
}
