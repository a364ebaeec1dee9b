use serde::Deserialize;
use std::fs;
use std::path::Path;

const DEFAULT_SERVER_PORT: u16 = 8000;
const DEFAULT_DB_PORT: u16 = 5432;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub openai_api_key: String,
    pub log_dir: String,
}

// Partial config for layering. Aliases accept the short env names
// (SERVER, DBHOST, SECRET, ...) alongside the descriptive ones.
#[derive(Deserialize, Default, Debug)]
pub struct PartialServerConfig {
    #[serde(alias = "server")]
    server_port: Option<u16>,
    database_url: Option<String>,
    #[serde(alias = "dbhost")]
    db_host: Option<String>,
    #[serde(alias = "dbport")]
    db_port: Option<u16>,
    #[serde(alias = "dbuser")]
    db_user: Option<String>,
    #[serde(alias = "dbpass")]
    db_password: Option<String>,
    #[serde(alias = "dbname")]
    db_name: Option<String>,
    #[serde(alias = "secret")]
    jwt_secret: Option<String>,
    openai_api_key: Option<String>,
    log_dir: Option<String>,
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl ServerConfig {
    /// Loads `.env`, then the optional TOML file, then the process environment.
    /// Environment values override file values.
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();

        let file_config = match config_path {
            Some(path_str) => Self::read_file(Path::new(path_str))?,
            None => PartialServerConfig::default(),
        };

        let env_config: PartialServerConfig = envy::from_env::<PartialServerConfig>()
            .map_err(|e| format!("Failed to load config from environment: {e}"))?;

        Self::merge(env_config, file_config)
    }

    fn read_file(path: &Path) -> Result<PartialServerConfig, String> {
        if !path.exists() {
            return Ok(PartialServerConfig::default());
        }
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))
    }

    pub fn merge(env: PartialServerConfig, file: PartialServerConfig) -> Result<Self, String> {
        let database_url = match env.database_url.or(file.database_url) {
            Some(url) => url,
            None => {
                let host = env.db_host.or(file.db_host);
                let user = env.db_user.or(file.db_user);
                let name = env.db_name.or(file.db_name);
                let (Some(host), Some(user), Some(name)) = (host, user, name) else {
                    return Err("DATABASE_URL or DBHOST, DBUSER and DBNAME are required".to_string());
                };
                let port = env.db_port.or(file.db_port).unwrap_or(DEFAULT_DB_PORT);
                let password = env.db_password.or(file.db_password).unwrap_or_default();
                format!("postgres://{user}:{password}@{host}:{port}/{name}")
            }
        };

        Ok(ServerConfig {
            server_port: env.server_port.or(file.server_port).unwrap_or(DEFAULT_SERVER_PORT),
            database_url,
            jwt_secret: env
                .jwt_secret
                .or(file.jwt_secret)
                .filter(|secret| !secret.is_empty())
                .ok_or("JWT_SECRET is required")?,
            openai_api_key: env.openai_api_key.or(file.openai_api_key).unwrap_or_default(),
            log_dir: env.log_dir.or(file.log_dir).unwrap_or_else(default_log_dir),
        })
    }
}
