// ==========================================
// 商品目录服务 - API 层
// ==========================================
// 职责: 业务接口，供 HTTP 处理器与命令行调用
// ==========================================

pub mod catalog_api;
pub mod error;
pub mod import_api;

// 重导出核心类型
pub use catalog_api::{CatalogApi, ListQuery, SearchQuery};
pub use error::{ApiError, ApiResult};
pub use import_api::ImportApi;
