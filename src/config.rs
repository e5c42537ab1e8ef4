use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Overrides the portfolio file location for a single run.
pub const PORTFOLIO_ENV: &str = "FOLIO_PORTFOLIO";

/// Form-handling endpoint the contact form posts to by default.
pub const DEFAULT_CONTACT_ENDPOINT: &str = "https://formspree.io/f/xwpbwloq";

#[derive(Debug, Default, Serialize, Deserialize)]
/// Persisted UI/application settings for Folio.
pub struct AppConfig {
    pub window_width: Option<f32>,
    pub window_height: Option<f32>,
    pub portfolio_path: Option<PathBuf>,
    pub contact_endpoint: Option<String>,
    pub last_category: Option<String>,
    pub last_section: Option<String>,
}

impl AppConfig {
    /// Returns the user config file path, if a config directory is available.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("folio").join("config.toml"))
    }

    /// Loads config from disk, falling back to defaults on any error.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        let Ok(contents) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        Self::parse(&contents)
    }

    fn parse(contents: &str) -> Self {
        toml::from_str(contents).unwrap_or_else(|err| {
            tracing::warn!("ignoring unreadable config: {err}");
            Self::default()
        })
    }

    /// Writes config to disk, ignoring filesystem/serialization errors.
    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            return;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Ok(s) = toml::to_string_pretty(self) {
            let _ = std::fs::write(&path, s);
        }
    }

    /// Picks the portfolio file: environment, then config, then the data dir.
    pub fn resolve_portfolio_path(&self) -> PathBuf {
        resolve_portfolio_path_with(
            std::env::var_os(PORTFOLIO_ENV).map(PathBuf::from),
            self.portfolio_path.clone(),
            dirs::data_dir(),
        )
    }

    pub fn contact_endpoint(&self) -> String {
        self.contact_endpoint
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_CONTACT_ENDPOINT)
            .to_string()
    }
}

fn resolve_portfolio_path_with(
    from_env: Option<PathBuf>,
    from_config: Option<PathBuf>,
    data_dir: Option<PathBuf>,
) -> PathBuf {
    from_env
        .filter(|p| !p.as_os_str().is_empty())
        .or(from_config)
        .unwrap_or_else(|| {
            data_dir
                .unwrap_or_else(|| PathBuf::from("."))
                .join("folio")
                .join("portfolio.toml")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_override_beats_config() {
        let p = resolve_portfolio_path_with(
            Some(PathBuf::from("/env/p.toml")),
            Some(PathBuf::from("/cfg/p.toml")),
            Some(PathBuf::from("/data")),
        );
        assert_eq!(p, PathBuf::from("/env/p.toml"));
    }

    #[test]
    fn empty_env_value_is_ignored() {
        let p = resolve_portfolio_path_with(
            Some(PathBuf::new()),
            Some(PathBuf::from("/cfg/p.toml")),
            None,
        );
        assert_eq!(p, PathBuf::from("/cfg/p.toml"));
    }

    #[test]
    fn falls_back_to_data_dir() {
        let p = resolve_portfolio_path_with(None, None, Some(PathBuf::from("/data")));
        assert_eq!(p, PathBuf::from("/data/folio/portfolio.toml"));
    }

    #[test]
    fn malformed_config_yields_defaults() {
        let cfg = AppConfig::parse("window_width = \"wide\"");
        assert!(cfg.window_width.is_none());
    }

    #[test]
    fn blank_endpoint_uses_default() {
        let cfg = AppConfig {
            contact_endpoint: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(cfg.contact_endpoint(), DEFAULT_CONTACT_ENDPOINT);
    }
}
