// ==========================================
// 商品目录服务 - 运行配置
// ==========================================
// 来源: 环境变量（缺省或空白时取默认值）
// 职责: 数据库路径 / 监听地址 / 上传上限 / 默认分页
// ==========================================

use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// 环境变量键
pub mod env_keys {
    pub const DB_PATH: &str = "PRODUCT_CATALOG_DB_PATH";
    pub const HOST: &str = "PRODUCT_CATALOG_HOST";
    pub const PORT: &str = "PRODUCT_CATALOG_PORT";
    pub const MAX_UPLOAD_BYTES: &str = "PRODUCT_CATALOG_MAX_UPLOAD_BYTES";
    pub const DEFAULT_PAGE_LIMIT: &str = "PRODUCT_CATALOG_DEFAULT_PAGE_LIMIT";
}

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// 配置错误
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("配置项 {key} 无法解析: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("配置项 {key} 必须 >= 1")]
    NonPositive { key: String },
}

// ==========================================
// AppConfig
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub db_path: String,
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub default_page_limit: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            default_page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl AppConfig {
    /// 从进程环境变量读取
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取（便于测试注入）
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value_of = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let db_path = value_of(env_keys::DB_PATH).unwrap_or_else(default_db_path);
        let host = value_of(env_keys::HOST).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or(env_keys::PORT, value_of(env_keys::PORT), DEFAULT_PORT)?;
        let max_upload_bytes = parse_or(
            env_keys::MAX_UPLOAD_BYTES,
            value_of(env_keys::MAX_UPLOAD_BYTES),
            DEFAULT_MAX_UPLOAD_BYTES,
        )?;
        let default_page_limit = parse_or(
            env_keys::DEFAULT_PAGE_LIMIT,
            value_of(env_keys::DEFAULT_PAGE_LIMIT),
            DEFAULT_PAGE_LIMIT,
        )?;

        if max_upload_bytes == 0 {
            return Err(ConfigError::NonPositive {
                key: env_keys::MAX_UPLOAD_BYTES.to_string(),
            });
        }
        if default_page_limit < 1 {
            return Err(ConfigError::NonPositive {
                key: env_keys::DEFAULT_PAGE_LIMIT.to_string(),
            });
        }

        Ok(Self {
            db_path,
            host,
            port,
            max_upload_bytes,
            default_page_limit,
        })
    }

    /// 监听地址
    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.parse::<T>().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        }),
    }
}

/// 默认数据库路径：用户数据目录下的 product-catalog/products.db
///
/// 拿不到数据目录或无法创建时回退到当前目录
pub fn default_db_path() -> String {
    let mut path = PathBuf::from("./products.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("product-catalog");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("products.db");
        }
    }

    path.to_string_lossy().to_string()
}
