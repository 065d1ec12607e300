//! Runtime configuration, read once at startup from `PB_*` environment
//! variables. Every setting has a default suitable for local development.

use std::env;
use std::path::PathBuf;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE: &str = "portfolio_builder.sqlite";
const DEFAULT_TEMPLATES_DIR: &str = "templates";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// SQLite file holding portfolios and history.
    pub database: PathBuf,
    /// Directory served under `/templates`; holds one folder per template.
    pub templates_dir: PathBuf,
    /// Serve the frontend from this directory instead of the embedded bundle.
    pub static_dir: Option<PathBuf>,
    /// Origin used to build share links, e.g. `https://folio.example.com`.
    pub public_base_url: String,
    pub open_browser: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = get("PB_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get("PB_PORT").map(|p| p.parse::<u16>()) {
            Some(Ok(port)) => port,
            Some(Err(e)) => {
                log::warn!("ignoring invalid PB_PORT ({e}), using {DEFAULT_PORT}");
                DEFAULT_PORT
            }
            None => DEFAULT_PORT,
        };
        let public_base_url = get("PB_PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://{host}:{port}"))
            .trim_end_matches('/')
            .to_string();
        let open_browser = get("PB_OPEN_BROWSER")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Config {
            database: get("PB_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string()).into(),
            templates_dir: get("PB_TEMPLATES_DIR")
                .unwrap_or_else(|| DEFAULT_TEMPLATES_DIR.to_string())
                .into(),
            static_dir: get("PB_STATIC_DIR").map(PathBuf::from),
            host,
            port,
            public_base_url,
            open_browser,
        }
    }

    pub fn bind_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let c = config(&[]);
        assert_eq!(c.port, 8080);
        assert_eq!(c.public_base_url, "http://127.0.0.1:8080");
        assert_eq!(c.static_dir, None);
        assert!(!c.open_browser);
    }

    #[test]
    fn overrides_and_invalid_port() {
        let c = config(&[
            ("PB_PORT", "not-a-port"),
            ("PB_PUBLIC_BASE_URL", "https://folio.example.com/"),
            ("PB_OPEN_BROWSER", "true"),
            ("PB_STATIC_DIR", "frontend/dist"),
        ]);
        assert_eq!(c.port, 8080);
        assert_eq!(c.public_base_url, "https://folio.example.com");
        assert!(c.open_browser);
        assert_eq!(c.static_dir, Some(PathBuf::from("frontend/dist")));
    }
}
