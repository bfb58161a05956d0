//! Client configuration baked in at build time.
//!
//! Values come from `option_env!` so the WASM bundle needs no runtime config
//! fetch before the session bootstrap can start.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_OPENPROJECT_URL: &str = "http://localhost:8080";
pub const DEFAULT_BRAND_COLOR: &str = "#1d4ed8";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing build-time variable {var}")]
    Missing { var: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Supabase project URL without trailing slash.
    pub supabase_url: String,
    pub supabase_anon_key: String,
    /// OpenProject base URL without trailing slash.
    pub openproject_url: String,
    pub brand_color: String,
}

impl ClientConfig {
    /// Build config from the variables captured at compile time.
    ///
    /// Required: `SUPABASE_URL`, `SUPABASE_ANON_KEY`.
    /// Optional: `OPENPROJECT_URL`, `BRAND_COLOR`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when a required variable is absent.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        Self::from_values(
            option_env!("SUPABASE_URL"),
            option_env!("SUPABASE_ANON_KEY"),
            option_env!("OPENPROJECT_URL"),
            option_env!("BRAND_COLOR"),
        )
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when a required value is absent or blank.
    pub fn from_values(
        supabase_url: Option<&str>,
        supabase_anon_key: Option<&str>,
        openproject_url: Option<&str>,
        brand_color: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let supabase_url = required(supabase_url, "SUPABASE_URL")?;
        let supabase_anon_key = required(supabase_anon_key, "SUPABASE_ANON_KEY")?;
        Ok(Self {
            supabase_url: trim_url(&supabase_url),
            supabase_anon_key,
            openproject_url: trim_url(non_blank(openproject_url).unwrap_or(DEFAULT_OPENPROJECT_URL)),
            brand_color: non_blank(brand_color).unwrap_or(DEFAULT_BRAND_COLOR).to_owned(),
        })
    }

    /// Config used when the Supabase variables were not provided.
    ///
    /// The provider built from it has no endpoint, so the app behaves as
    /// permanently signed out.
    pub fn offline() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            openproject_url: DEFAULT_OPENPROJECT_URL.to_owned(),
            brand_color: DEFAULT_BRAND_COLOR.to_owned(),
        }
    }

    pub fn is_offline(&self) -> bool {
        self.supabase_url.is_empty()
    }

    /// Load build-time config, falling back to [`ClientConfig::offline`].
    pub fn load() -> Self {
        Self::from_build_env().unwrap_or_else(|e| {
            log::error!("{e}; authentication disabled");
            Self::offline()
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn required(value: Option<&str>, var: &'static str) -> Result<String, ConfigError> {
    non_blank(value).map(str::to_owned).ok_or(ConfigError::Missing { var })
}

fn trim_url(raw: &str) -> String {
    raw.trim_end_matches('/').to_owned()
}
