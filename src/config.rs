use serde::Deserialize;
use serde_json::Value;
use std::{env, fmt, fs, path::Path, path::PathBuf};

pub const DEFAULT_API_BASE: &str = "https://api.saasus.io/v1";
pub const DEFAULT_ENV_ID: u64 = 3;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Credentials and endpoint for the identity service.
#[derive(Clone, Deserialize)]
pub struct IdentityConfig {
    pub saas_id: String,
    pub api_key: String,
    pub secret_key: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("saas_id", &self.saas_id)
            .field("api_key", &self.api_key)
            .field("secret_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Environment ids used when granting roles and issuing invitations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct EnvironmentConfig {
    #[serde(default = "default_env_id")]
    pub role_env_id: u64,
    #[serde(default = "default_env_id")]
    pub invitation_env_id: u64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            role_env_id: DEFAULT_ENV_ID,
            invitation_env_id: DEFAULT_ENV_ID,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Single origin allowed to call the gateway with credentials.
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
    /// Mark the refresh-token cookie `Secure`.
    #[serde(default)]
    pub secure_cookies: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            cors_origin: default_cors_origin(),
            secure_cookies: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    pub identity: IdentityConfig,
    #[serde(default)]
    pub environments: EnvironmentConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_env_id() -> u64 {
    DEFAULT_ENV_ID
}

fn default_cors_origin() -> String {
    DEFAULT_CORS_ORIGIN.to_string()
}

impl GatewayConfig {
    /// Parse a JSON document, expanding `${VAR}` in every string value first.
    pub fn from_json_str(raw: &str) -> anyhow::Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        Ok(serde_json::from_value(expand_value(value))?)
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {}", path.display(), e))
    }

    /// Build the configuration from environment variables alone.
    pub fn from_env() -> anyhow::Result<Self> {
        let identity = IdentityConfig {
            saas_id: required_var("SAASUS_SAAS_ID")?,
            api_key: required_var("SAASUS_API_KEY")?,
            secret_key: required_var("SAASUS_SECRET_KEY")?,
            api_base: env::var("SAASUS_API_BASE").unwrap_or_else(|_| default_api_base()),
            request_timeout_secs: parsed_var(
                "GATEWAY_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
        };

        let environments = EnvironmentConfig {
            role_env_id: parsed_var("GATEWAY_ROLE_ENV_ID", DEFAULT_ENV_ID)?,
            invitation_env_id: parsed_var("GATEWAY_INVITATION_ENV_ID", DEFAULT_ENV_ID)?,
        };

        let http = HttpConfig {
            cors_origin: env::var("GATEWAY_CORS_ORIGIN").unwrap_or_else(|_| default_cors_origin()),
            secure_cookies: parsed_var("GATEWAY_SECURE_COOKIES", false)?,
        };

        Ok(Self {
            identity,
            environments,
            http,
        })
    }
}

fn required_var(name: &str) -> anyhow::Result<String> {
    env::var(name).map_err(|_| anyhow::anyhow!("{} is not set", name))
}

fn parsed_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value `{}`: {}", name, raw, e)),
        Err(_) => Ok(default),
    }
}

pub fn resolve_gateway_config_path() -> Option<PathBuf> {
    if let Ok(p) = env::var("GATEWAY_CONFIG") {
        return Some(PathBuf::from(p));
    }

    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let candidate = PathBuf::from(xdg)
            .join("tenant-gateway")
            .join("gateway.json");
        if candidate.exists() {
            return Some(candidate);
        }
    }

    let candidate = PathBuf::from("gateway.json");
    if candidate.exists() {
        return Some(candidate);
    }

    None
}

/// Load from the first config file found, falling back to the environment.
pub fn load_gateway_config() -> anyhow::Result<GatewayConfig> {
    match resolve_gateway_config_path() {
        Some(path) => GatewayConfig::from_path(&path),
        None => GatewayConfig::from_env(),
    }
}

fn expand_env_vars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next(); // consume '{'
            let mut name = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                name.push(c);
            }
            if let Ok(val) = env::var(&name) {
                out.push_str(&val);
            } else {
                out.push_str("${");
                out.push_str(&name);
                out.push('}');
            }
        } else {
            out.push(ch);
        }
    }

    out
}

fn expand_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(expand_env_vars(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(expand_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, expand_value(v)))
                .collect(),
        ),
        other => other,
    }
}
