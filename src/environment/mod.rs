//! # Harness Configuration
//!
//! One immutable `HarnessConfig` is built at startup and passed by reference
//! to every client. Values are layered with increasing precedence:
//! built-in defaults < TOML file < environment variables.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::HarnessError;

pub const DEFAULT_BASE_URL: &str = "http://example.com/api/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Prefix of generated emails, searchable in the backend database.
pub const DEFAULT_RUN_LABEL: &str = "labelfordb";

/// Environment keys read by `HarnessConfig::load`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessEnv {
    BaseUrl,
    TimeoutSecs,
    RunLabel,
    ConfigFile,
}

impl HarnessEnv {
    pub const fn as_str(self) -> &'static str {
        match self {
            HarnessEnv::BaseUrl => "FCLE_BASE_URL",
            HarnessEnv::TimeoutSecs => "FCLE_TIMEOUT_SECS",
            HarnessEnv::RunLabel => "FCLE_RUN_LABEL",
            HarnessEnv::ConfigFile => "FCLE_CONFIG_FILE",
        }
    }
}

/// Backend resources the suites talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Resource {
    Signup,
    SetPassword,
    Login,
    ForgotPassword,
    ResetPassword,
    ChangePassword,
    GetProfile,
    Deposit,
    BuyPackage,
    AccountBalance,
    AccountTransactions,
    TerminatePackage,
    FavoriteTeachers,
    UserLanguages,
    LearningMaterials,
    TeacherDocuments,
    TeachingExperiences,
    TeacherEducations,
}

impl Resource {
    pub const ALL: [Resource; 18] = [
        Resource::Signup,
        Resource::SetPassword,
        Resource::Login,
        Resource::ForgotPassword,
        Resource::ResetPassword,
        Resource::ChangePassword,
        Resource::GetProfile,
        Resource::Deposit,
        Resource::BuyPackage,
        Resource::AccountBalance,
        Resource::AccountTransactions,
        Resource::TerminatePackage,
        Resource::FavoriteTeachers,
        Resource::UserLanguages,
        Resource::LearningMaterials,
        Resource::TeacherDocuments,
        Resource::TeachingExperiences,
        Resource::TeacherEducations,
    ];

    /// Key used for this resource in the `[endpoints]` table.
    pub fn key(self) -> &'static str {
        match self {
            Resource::Signup => "signup",
            Resource::SetPassword => "set-password",
            Resource::Login => "login",
            Resource::ForgotPassword => "forgot-password",
            Resource::ResetPassword => "reset-password",
            Resource::ChangePassword => "change-password",
            Resource::GetProfile => "get-profile",
            Resource::Deposit => "deposit",
            Resource::BuyPackage => "buy-package",
            Resource::AccountBalance => "account-balance",
            Resource::AccountTransactions => "account-transactions",
            Resource::TerminatePackage => "terminate-package",
            Resource::FavoriteTeachers => "favorite-teachers",
            Resource::UserLanguages => "user-languages",
            Resource::LearningMaterials => "learning-materials",
            Resource::TeacherDocuments => "teacher-documents",
            Resource::TeachingExperiences => "teaching-experiences",
            Resource::TeacherEducations => "teacher-educations",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Resource::ALL.into_iter().find(|resource| resource.key() == key)
    }

    pub fn default_path(self) -> &'static str {
        match self {
            Resource::Signup => "auth/signup",
            Resource::SetPassword => "auth/set-password",
            Resource::Login => "auth/login",
            Resource::ForgotPassword => "auth/forgot-password",
            Resource::ResetPassword => "auth/reset-password",
            Resource::ChangePassword => "auth/change-password",
            Resource::GetProfile => "Users/get-profile",
            Resource::Deposit => "Accounting/deposit",
            Resource::BuyPackage => "Accounting/buy-package",
            Resource::AccountBalance => "Accounting/user-account-balance",
            Resource::AccountTransactions => "Accounting/user-account-transactions",
            Resource::TerminatePackage => "Accounting/terminate-package",
            Resource::FavoriteTeachers => "favoriteteachers",
            Resource::UserLanguages => "UserLanguages",
            Resource::LearningMaterials => "LearningMaterials",
            Resource::TeacherDocuments => "TeacherDocuments",
            Resource::TeachingExperiences => "TeachingExperiences",
            Resource::TeacherEducations => "TeacherEducations",
        }
    }
}

/// Path per resource, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRegistry {
    paths: BTreeMap<Resource, String>,
}

impl Default for EndpointRegistry {
    fn default() -> Self {
        let paths = Resource::ALL
            .into_iter()
            .map(|resource| (resource, resource.default_path().to_string()))
            .collect();
        Self { paths }
    }
}

impl EndpointRegistry {
    pub fn path(&self, resource: Resource) -> &str {
        self.paths
            .get(&resource)
            .map(String::as_str)
            .unwrap_or_else(|| resource.default_path())
    }

    fn override_with(&mut self, overrides: BTreeMap<String, String>) -> Result<(), HarnessError> {
        for (key, path) in overrides {
            let resource = Resource::from_key(&key)
                .ok_or_else(|| HarnessError::Config(format!("unknown endpoint key `{key}`")))?;
            if !path.trim().is_empty() {
                self.paths.insert(resource, path.trim().to_string());
            }
        }
        Ok(())
    }
}

/// Shape of the optional TOML file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    run_label: Option<String>,
    #[serde(default)]
    endpoints: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    base_url: String,
    timeout: Duration,
    run_label: String,
    endpoints: EndpointRegistry,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            run_label: DEFAULT_RUN_LABEL.to_string(),
            endpoints: EndpointRegistry::default(),
        }
    }
}

impl HarnessConfig {
    /// Defaults, then the file named by `FCLE_CONFIG_FILE`, then env overrides.
    pub fn load() -> Result<Self, HarnessError> {
        let file = read_env_nonempty(HarnessEnv::ConfigFile.as_str())?.map(PathBuf::from);
        Self::load_with(file.as_deref(), |key| std::env::var(key).ok())
    }

    /// Same layering as `load`, with the environment supplied by the caller.
    pub fn load_with(file: Option<&Path>, env: impl Fn(&str) -> Option<String>) -> Result<Self, HarnessError> {
        let mut config = Self::default();

        if let Some(path) = file {
            let raw = fs::read_to_string(path).map_err(|source| HarnessError::Io {
                context: format!("Failed to read config file `{}`", path.display()),
                source,
            })?;
            config.apply_file(&raw, path)?;
        }

        if let Some(base_url) = nonempty(env(HarnessEnv::BaseUrl.as_str()), HarnessEnv::BaseUrl)? {
            config.base_url = base_url;
        }
        if let Some(raw) = nonempty(env(HarnessEnv::TimeoutSecs.as_str()), HarnessEnv::TimeoutSecs)? {
            config.timeout = parse_timeout_secs(&raw)?;
        }
        if let Some(label) = nonempty(env(HarnessEnv::RunLabel.as_str()), HarnessEnv::RunLabel)? {
            config.run_label = label;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, HarnessError> {
        let mut config = Self::default();
        config.apply_file(raw, Path::new("<inline>"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn run_label(&self) -> &str {
        &self.run_label
    }

    pub fn endpoints(&self) -> &EndpointRegistry {
        &self.endpoints
    }

    /// Absolute URL of a resource, without trailing slash.
    pub fn url(&self, resource: Resource) -> String {
        build_url(&self.base_url, self.endpoints.path(resource))
    }

    /// Absolute URL of one item below a resource (`<resource>/<segment>`).
    pub fn item_url(&self, resource: Resource, segment: &str) -> String {
        format!("{}/{}", self.url(resource), segment.trim_matches('/'))
    }

    fn apply_file(&mut self, raw: &str, path: &Path) -> Result<(), HarnessError> {
        let file: ConfigFile = toml::from_str(raw)
            .map_err(|err| HarnessError::Config(format!("Failed to parse config file `{}`: {err}", path.display())))?;

        if let Some(base_url) = file.base_url {
            self.base_url = base_url;
        }
        if let Some(secs) = file.timeout_secs {
            if secs == 0 {
                return Err(HarnessError::Config("timeout_secs must be greater than zero".into()));
            }
            self.timeout = Duration::from_secs(secs);
        }
        if let Some(label) = file.run_label {
            self.run_label = label;
        }
        self.endpoints.override_with(file.endpoints)
    }

    fn validate(&self) -> Result<(), HarnessError> {
        let base = self.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(HarnessError::Config(format!(
                "base URL must start with http:// or https://, got `{}`",
                self.base_url
            )));
        }
        if self.run_label.trim().is_empty() {
            return Err(HarnessError::Config("run label cannot be empty".into()));
        }
        Ok(())
    }
}

/// Join a base URL and an endpoint; absolute endpoints are returned as is.
pub fn build_url(base: &str, endpoint: &str) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        return endpoint.trim_end_matches('/').to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        endpoint.trim_start_matches('/').trim_end_matches('/')
    )
}

/// The URL without and with a trailing slash, in that order.
pub fn url_variants(url: &str) -> Vec<String> {
    let cleaned = url.trim_end_matches('/');
    if cleaned.is_empty() {
        return Vec::new();
    }
    vec![cleaned.to_string(), format!("{cleaned}/")]
}

fn read_env_nonempty(key: &str) -> Result<Option<String>, HarnessError> {
    match std::env::var(key) {
        Ok(value) => nonempty_value(value, key),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(HarnessError::Config(format!("{key} must be valid UTF-8"))),
    }
}

fn nonempty(value: Option<String>, key: HarnessEnv) -> Result<Option<String>, HarnessError> {
    match value {
        Some(value) => nonempty_value(value, key.as_str()),
        None => Ok(None),
    }
}

fn nonempty_value(value: String, key: &str) -> Result<Option<String>, HarnessError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(HarnessError::Config(format!("{key} is set but empty")));
    }
    Ok(Some(trimmed.to_string()))
}

fn parse_timeout_secs(raw: &str) -> Result<Duration, HarnessError> {
    let secs: u64 = raw.trim().parse().map_err(|_| {
        HarnessError::Config(format!(
            "{} must be a positive integer number of seconds",
            HarnessEnv::TimeoutSecs.as_str()
        ))
    })?;
    if secs == 0 {
        return Err(HarnessError::Config(format!(
            "{} must be greater than zero",
            HarnessEnv::TimeoutSecs.as_str()
        )));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_the_documented_paths() {
        let config = HarnessConfig::default();
        assert_eq!(config.url(Resource::Deposit), "http://example.com/api/Accounting/deposit");
        assert_eq!(config.url(Resource::Signup), "http://example.com/api/auth/signup");
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn env_overrides_file_which_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "base_url = \"http://file.local/api\"\ntimeout_secs = 5\n[endpoints]\ndeposit = \"Billing/deposit\""
        )
        .unwrap();

        let config = HarnessConfig::load_with(
            Some(file.path()),
            env_of(&[("FCLE_BASE_URL", "https://env.local/api/"), ("FCLE_RUN_LABEL", "ci")]),
        )
        .unwrap();

        assert_eq!(config.base_url(), "https://env.local/api/");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.run_label(), "ci");
        assert_eq!(config.url(Resource::Deposit), "https://env.local/api/Billing/deposit");
        assert_eq!(config.url(Resource::BuyPackage), "https://env.local/api/Accounting/buy-package");
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = HarnessConfig::load_with(None, env_of(&[("FCLE_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn empty_env_value_is_rejected() {
        let err = HarnessConfig::load_with(None, env_of(&[("FCLE_BASE_URL", "  ")])).unwrap_err();
        assert!(err.to_string().contains("FCLE_BASE_URL"));
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        assert!(HarnessConfig::from_toml_str("base_uri = \"http://typo\"").is_err());
    }

    #[test]
    fn unknown_endpoint_key_is_rejected() {
        let err = HarnessConfig::from_toml_str("[endpoints]\nwallet = \"Wallet\"").unwrap_err();
        assert!(err.to_string().contains("wallet"));
    }

    #[test]
    fn resource_keys_round_trip() {
        for resource in Resource::ALL {
            assert_eq!(Resource::from_key(resource.key()), Some(resource));
        }
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        assert!(HarnessConfig::from_toml_str("base_url = \"ftp://example.com\"").is_err());
    }

    #[test]
    fn build_url_normalizes_slashes() {
        assert_eq!(build_url("http://h/api/", "/auth/login/"), "http://h/api/auth/login");
        assert_eq!(build_url("http://h/api", "https://other/x/"), "https://other/x");
    }

    #[test]
    fn item_url_appends_segment() {
        let config = HarnessConfig::default();
        assert_eq!(
            config.item_url(Resource::TerminatePackage, "1"),
            "http://example.com/api/Accounting/terminate-package/1"
        );
    }

    #[test]
    fn url_variants_without_then_with_slash() {
        assert_eq!(url_variants("http://h/a/"), vec!["http://h/a".to_string(), "http://h/a/".to_string()]);
        assert!(url_variants("").is_empty());
    }
}
