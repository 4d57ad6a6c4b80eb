use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub upload: UploadConfig,
    pub export: ExportConfig,
    pub workspace: WorkspaceConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    File,
    Redis,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub accounts_path: String,
    pub redis_url: String,
    pub redis_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub bcrypt_cost: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    pub max_file_size: usize,  // bytes, applies to the whole request body
}

#[derive(Debug, Deserialize, Clone)]
pub struct WorkspaceConfig {
    pub idle_timeout_secs: u64,  // an unused workspace is dropped after this long
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    pub scale: u32,  // oversampling factor for the captured preview
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
    pub max_concurrent: usize,
    pub timeout_secs: u64,
    pub font_family: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
impl Config {
    /// Configuration used by unit and router tests: in-memory friendly and fast to hash.
    pub fn for_tests() -> Self {
        Self {
            server: ServerConfig { host: "127.0.0.1".into(), port: 0 },
            storage: StorageConfig {
                backend: StorageBackend::File,
                accounts_path: "data/accounts.json".into(),
                redis_url: "redis://127.0.0.1/".into(),
                redis_key: "users".into(),
            },
            auth: AuthConfig { bcrypt_cost: 4 },
            upload: UploadConfig { max_file_size: 10 * 1024 * 1024 },
            export: ExportConfig {
                scale: 2,
                page_width_mm: 210.0,
                page_height_mm: 297.0,
                margin_mm: 10.0,
                max_concurrent: 2,
                timeout_secs: 30,
                font_family: "sans-serif".into(),
            },
            workspace: WorkspaceConfig { idle_timeout_secs: 7200, sweep_interval_secs: 300 },
        }
    }
}
