// ==========================================
// 商品目录服务 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 生命周期: 打开数据库 → 服务 → 随状态一起释放连接
// ==========================================

use std::sync::Arc;

use crate::api::{CatalogApi, ImportApi};
use crate::config::AppConfig;
use crate::repository::ProductRepositoryImpl;

/// 应用状态
///
/// 导入与查询共用同一个数据库连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 商品导入API
    pub import_api: Arc<ImportApi<ProductRepositoryImpl>>,

    /// 商品查询API
    pub catalog_api: Arc<CatalogApi<ProductRepositoryImpl>>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 打开（必要时创建）数据库并确保表结构存在
    pub fn new(config: &AppConfig) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", config.db_path);

        let repo = ProductRepositoryImpl::new(&config.db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;

        Ok(Self::from_repository(config.db_path.clone(), repo, config))
    }

    /// 从已打开的仓储创建
    pub fn from_repository(db_path: String, repo: ProductRepositoryImpl, config: &AppConfig) -> Self {
        let repo = Arc::new(repo);

        Self {
            db_path,
            import_api: Arc::new(ImportApi::new(repo.clone(), config.max_upload_bytes)),
            catalog_api: Arc::new(CatalogApi::new(repo, config.default_page_limit)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_state_creates_schema_on_open() {
        let temp = NamedTempFile::new().unwrap();
        let config = AppConfig {
            db_path: temp.path().to_string_lossy().to_string(),
            ..AppConfig::default()
        };

        let state = AppState::new(&config).unwrap();
        let page = state.catalog_api.list_products(1, 10).unwrap();
        assert_eq!(page.total, 0);
    }

    #[test]
    fn test_state_rejects_unopenable_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            db_path: dir.path().join("missing").join("catalog.db").to_string_lossy().to_string(),
            ..AppConfig::default()
        };

        let err = AppState::new(&config).err().expect("missing parent directory should fail");
        assert!(err.contains("无法打开数据库"));
    }
}
