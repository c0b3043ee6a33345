#[macro_use]
extern crate rocket;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

use office_arena_server::config::Env;

#[launch]
fn rocket() -> _ {
    dotenv::dotenv().ok();

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().pretty());
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    let env = Env::from_env().expect("Failed to load environment variables");
    tracing::info!("Starting with {:?} storage", env.storage);

    office_arena_server::rocket(env).expect("Failed to build the server")
}
