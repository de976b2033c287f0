// ==========================================
// 商品目录服务 - 核心库
// ==========================================
// 技术栈: actix-web + Rust + SQLite
// 功能: CSV/Excel 批量导入（逐行校验、按 sku upsert）、分页列表、条件检索
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 运行配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 共享状态
pub mod app;

// HTTP 层 - actix-web 服务
pub mod server;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::{IngestSummary, ProductFilter, ProductPage, ProductRecord, RowError};
pub use api::{ApiError, CatalogApi, ImportApi};
pub use app::AppState;
pub use config::AppConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
