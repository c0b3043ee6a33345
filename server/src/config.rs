use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Postgres,
    Memory,
}

/// Process settings read from the environment (and `.env`).
#[derive(Debug, Clone, Deserialize)]
pub struct Env {
    #[serde(default)]
    pub storage: StorageKind,
    #[serde(default = "default_seed_catalog")]
    pub seed_catalog: bool,
}

fn default_seed_catalog() -> bool {
    true
}

impl Default for Env {
    fn default() -> Self {
        Self {
            storage: StorageKind::default(),
            seed_catalog: default_seed_catalog(),
        }
    }
}

impl Env {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Ok(envy::from_env::<Env>()?)
    }

    pub fn memory() -> Self {
        Self {
            storage: StorageKind::Memory,
            ..Default::default()
        }
    }
}
