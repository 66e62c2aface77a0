use crate::db::Database;
use crate::llm::{gemini, DEFAULT_MODEL};
use crate::navigation::{DEFAULT_HEADER_HEIGHT, DEFAULT_SCROLL_OFFSET};

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Somewhere an API key can be read from at session-creation time.
pub trait CredentialSource: Send + Sync {
    /// The key, or `None` when absent. Blank values count as absent.
    fn resolve(&self) -> Option<String>;

    /// Human-readable origin, used only in logs.
    fn describe(&self) -> String;
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Reads the key from an environment variable.
#[derive(Debug, Clone)]
pub struct EnvCredential {
    pub var: String,
}

impl EnvCredential {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCredential {
    fn default() -> Self {
        Self::new(API_KEY_ENV)
    }
}

impl CredentialSource for EnvCredential {
    fn resolve(&self) -> Option<String> {
        non_blank(std::env::var(&self.var).ok())
    }

    fn describe(&self) -> String {
        format!("environment variable {}", self.var)
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticCredential(pub Option<String>);

impl CredentialSource for StaticCredential {
    fn resolve(&self) -> Option<String> {
        non_blank(self.0.clone())
    }

    fn describe(&self) -> String {
        "static value".into()
    }
}

impl<T: CredentialSource + ?Sized> CredentialSource for std::sync::Arc<T> {
    fn resolve(&self) -> Option<String> {
        (**self).resolve()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Tries each source in order; the first non-blank key wins.
#[derive(Default)]
pub struct CredentialChain {
    sources: Vec<Box<dyn CredentialSource>>,
}

impl CredentialChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: impl CredentialSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }
}

impl CredentialSource for CredentialChain {
    fn resolve(&self) -> Option<String> {
        self.sources.iter().find_map(|s| s.resolve())
    }

    fn describe(&self) -> String {
        let parts: Vec<String> = self.sources.iter().map(|s| s.describe()).collect();
        if parts.is_empty() {
            "no configured source".into()
        } else {
            parts.join(", ")
        }
    }
}

/// Shortens a secret for display: `abcd...wxyz`, or stars when too short.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "********".to_string()
    }
}

/// Runtime knobs, read from the settings table with built-in defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub model: String,
    pub gemini_base_url: String,
    pub scroll_offset: f64,
    pub header_height: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            gemini_base_url: gemini::DEFAULT_BASE_URL.to_string(),
            scroll_offset: DEFAULT_SCROLL_OFFSET,
            header_height: DEFAULT_HEADER_HEIGHT,
        }
    }
}

impl AppConfig {
    pub fn load(db: &Database) -> Self {
        let defaults = Self::default();
        let setting = |key: &str| non_blank(db.get_setting(key).ok().flatten());
        let number = |key: &str, fallback: f64| {
            setting(key)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite() && *v >= 0.0)
                .unwrap_or(fallback)
        };

        Self {
            model: setting("gemini_model").unwrap_or(defaults.model),
            gemini_base_url: setting("gemini_base_url").unwrap_or(defaults.gemini_base_url),
            scroll_offset: number("scroll_offset", defaults.scroll_offset),
            header_height: number("header_height", defaults.header_height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_static_credential_is_absent() {
        assert_eq!(StaticCredential(Some("   ".into())).resolve(), None);
        assert_eq!(StaticCredential(None).resolve(), None);
        assert_eq!(
            StaticCredential(Some("key".into())).resolve().as_deref(),
            Some("key")
        );
    }

    #[test]
    fn test_env_credential_missing_var() {
        let source = EnvCredential::new("PORTFOLIO_TEST_DEFINITELY_UNSET_KEY");
        assert_eq!(source.resolve(), None);
        assert!(source.describe().contains("PORTFOLIO_TEST_DEFINITELY_UNSET_KEY"));
    }

    #[test]
    fn test_chain_first_present_wins() {
        let chain = CredentialChain::new()
            .with(StaticCredential(None))
            .with(StaticCredential(Some("second".into())))
            .with(StaticCredential(Some("third".into())));
        assert_eq!(chain.resolve().as_deref(), Some("second"));
        assert_eq!(CredentialChain::new().resolve(), None);
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("AIzaSyExample1234"), "AIza...1234");
        assert_eq!(mask_secret("short"), "********");
    }

    #[test]
    fn test_config_reads_settings_with_fallbacks() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path()).unwrap();
        assert_eq!(AppConfig::load(&db), AppConfig::default());

        db.set_setting("gemini_model", "gemini-2.0-flash").unwrap();
        db.set_setting("scroll_offset", "64").unwrap();
        db.set_setting("header_height", "not a number").unwrap();
        let config = AppConfig::load(&db);
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.scroll_offset, 64.0);
        assert_eq!(config.header_height, DEFAULT_HEADER_HEIGHT);
    }
}
