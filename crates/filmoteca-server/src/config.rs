use std::path::PathBuf;

use crate::error::Result;
pub use clap::Parser;
use url::Url;

#[derive(Debug, Clone, clap::Parser)]
pub struct ServerConfig {
    #[arg(
        short,
        long,
        default_value_t = 3000,
        env = "FILMOTECA_LISTEN_PORT",
        help = "Port to listen on"
    )]
    pub port: u16,
    #[arg(
        short,
        long,
        default_value = "127.0.0.1",
        env = "FILMOTECA_LISTEN_ADDRESS",
        help = "Address to listen on"
    )]
    pub listen_address: String,

    #[arg(
        long,
        env = "FILMOTECA_BASE_URL",
        default_value = "http://localhost:3000",
        help = "Base URL of server, as visible to clients"
    )]
    pub base_url: Url,

    #[arg(
        long,
        env = "FILMOTECA_DATABASE_URL",
        help = "Database URL e.g. sqlite://file.db, default is sqlite://[data-dir]/filmoteca.db, where data-dir is set by --data-dir"
    )]
    database_url: Option<String>,

    #[arg(
        long,
        env = "FILMOTECA_DATA_DIR",
        help = "Data directory, default is system default like ~/.local/share/filmoteca",
        default_value_t = default_data_dir()
    )]
    data_dir: String,

    #[arg(
        long,
        env = "FILMOTECA_MAX_CONNECTIONS",
        default_value_t = filmoteca_dal::DEFAULT_MAX_CONNECTIONS,
        help = "Maximum number of database connections"
    )]
    pub max_connections: u32,

    #[arg(long, env = "FILMOTECA_NO_CORS", help = "Disable CORS")]
    pub no_cors: bool,

    #[arg(
        long,
        env = "FILMOTECA_NO_LEGACY_ROUTES",
        help = "Do not serve movies on /api/peliculas"
    )]
    pub no_legacy_routes: bool,
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("filmoteca"))
        .unwrap_or_else(|| PathBuf::from("filmoteca"))
        .to_string_lossy()
        .to_string()
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        ServerConfig::try_parse().map_err(|e| e.into())
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    pub fn database_url(&self) -> String {
        self.database_url
            .clone()
            .unwrap_or_else(|| format!("sqlite://{}/filmoteca.db", self.data_dir))
    }
}
