use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub storage_mode: String,
    pub storage_root: String,
    pub public_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let storage_mode = env::var("STORAGE_MODE").unwrap_or_else(|_| "fs".to_string());
        let storage_root =
            env::var("STORAGE_ROOT").unwrap_or_else(|_| "./data/storage".to_string());
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{host}:{port}/storage"));
        Ok(Self {
            port,
            database_url,
            host,
            storage_mode,
            storage_root,
            public_base_url,
        })
    }
}
