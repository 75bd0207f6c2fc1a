use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_OPENLIBRARY_API_URL: &str = "https://openlibrary.org";
pub const DEFAULT_OPENLIBRARY_COVERS_URL: &str = "https://covers.openlibrary.org";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub profile: String,
    /// Base URL of the Open Library books and search APIs
    pub openlibrary_api_url: String,
    /// Base URL of the Open Library covers service
    pub openlibrary_covers_url: String,
    /// Directory uploaded covers are written to, served under `/assets`
    pub assets_dir: PathBuf,
    /// Externally reachable base URL used to build public asset URLs
    pub public_base_url: String,
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://shelfmark.db?mode=rwc".to_string(),
            port: 8000,
            cors_allowed_origins: Vec::new(),
            profile: "default".to_string(),
            openlibrary_api_url: DEFAULT_OPENLIBRARY_API_URL.to_string(),
            openlibrary_covers_url: DEFAULT_OPENLIBRARY_COVERS_URL.to_string(),
            assets_dir: PathBuf::from("assets"),
            public_base_url: "http://localhost:8000".to_string(),
            http_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_env_with_profile(None)
    }

    /// Load configuration from the environment. A profile passed on the
    /// command line wins over `PROFILE`.
    pub fn from_env_with_profile(profile: Option<String>) -> Self {
        let defaults = Self::default();

        let profile = profile
            .or_else(|| env::var("PROFILE").ok())
            .unwrap_or_else(|| "default".to_string());

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| {
            if profile == "default" {
                defaults.database_url.clone()
            } else {
                format!("sqlite://shelfmark_{}.db?mode=rwc", profile)
            }
        });

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);

        Self {
            database_url,
            port,
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            openlibrary_api_url: env::var("OPENLIBRARY_API_URL")
                .unwrap_or(defaults.openlibrary_api_url),
            openlibrary_covers_url: env::var("OPENLIBRARY_COVERS_URL")
                .unwrap_or(defaults.openlibrary_covers_url),
            assets_dir: env::var("ASSETS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.assets_dir),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", port)),
            http_timeout: env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
            profile,
        }
    }
}
