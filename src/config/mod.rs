// ==========================================
// 商品目录服务 - 配置层
// ==========================================
// 职责: 从环境变量加载运行配置
// ==========================================

pub mod app_config;

// 重导出核心配置
pub use app_config::{default_db_path, env_keys, AppConfig, ConfigError};
