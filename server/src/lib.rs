#[macro_use]
extern crate rocket;

use std::sync::Arc;

use rocket::{fairing::AdHoc, Build, Rocket};
use rocket_prometheus::PrometheusMetrics;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod db;
pub mod entrypoints;
pub mod error;
pub mod fairings;
pub mod homepage;
pub mod memory;
pub mod session;
pub mod store;
pub mod types;

use config::{Env, StorageKind};
use db::types::{PERK_CATEGORY, STORE_CATEGORY};
use memory::MemoryStore;
use store::Store;

/// Rewards offered when the catalog is empty.
pub const DEFAULT_CATALOG: [(&str, i64, &str); 4] = [
    ("Coffee Voucher", 50, PERK_CATEGORY),
    ("Amazon Gift Card", 200, PERK_CATEGORY),
    ("Team Lunch", 300, STORE_CATEGORY),
    ("Office Chair Upgrade", 500, STORE_CATEGORY),
];

/// Fills an empty reward catalog with [`DEFAULT_CATALOG`]. Returns the number of rewards added.
pub async fn seed_catalog(store: &dyn Store) -> anyhow::Result<usize> {
    if !store.rewards(None).await?.is_empty() {
        return Ok(0);
    }
    for (name, points, category) in DEFAULT_CATALOG {
        store.create_reward(name, points, category).await?;
    }
    Ok(DEFAULT_CATALOG.len())
}

fn catalog_stage() -> AdHoc {
    AdHoc::on_liftoff("Seed reward catalog", |rocket| {
        Box::pin(async move {
            let Some(store) = rocket.state::<Arc<dyn Store>>() else {
                tracing::error!("No store is managed, skipping catalog seeding");
                return;
            };
            match seed_catalog(store.as_ref()).await {
                Ok(0) => {}
                Ok(added) => tracing::info!("Seeded reward catalog with {added} rewards"),
                Err(e) => tracing::error!("Failed to seed reward catalog: {e:#}"),
            }
        })
    })
}

/// Assembles the server for the configured storage backend.
pub fn rocket(env: Env) -> anyhow::Result<Rocket<Build>> {
    let prometheus = PrometheusMetrics::new();
    let cors = rocket_cors::CorsOptions::default().to_cors()?;

    let mut rocket = rocket::build()
        .attach(fairings::RequestTimer)
        .attach(prometheus.clone())
        .attach(cors);

    rocket = match env.storage {
        StorageKind::Postgres => rocket.attach(db::stage()),
        StorageKind::Memory => {
            let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
            rocket.manage(store)
        }
    };
    if env.seed_catalog {
        rocket = rocket.attach(catalog_stage());
    }

    Ok(rocket
        .attach(entrypoints::stage())
        .mount("/metrics", prometheus)
        .mount(
            "/",
            SwaggerUi::new("/swagger-ui/<_..>")
                .url("/api-docs/openapi.json", entrypoints::ApiDoc::openapi()),
        )
        .register("/", catchers![error::default_catcher]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rocket::async_test]
    async fn seeds_only_an_empty_catalog() {
        let store = MemoryStore::new();
        assert_eq!(seed_catalog(&store).await.unwrap(), 4);
        assert_eq!(seed_catalog(&store).await.unwrap(), 0);

        let perks = store.rewards(Some(PERK_CATEGORY)).await.unwrap();
        let names: Vec<_> = perks.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Coffee Voucher", "Amazon Gift Card"]);
    }
}
