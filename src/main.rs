// ==========================================
// 商品目录服务 - HTTP 主入口
// ==========================================
// 启动顺序: 日志 → 配置 → 数据库 → 服务
// ==========================================

use anyhow::{Context, Result};
use product_catalog::app::AppState;
use product_catalog::config::AppConfig;
use product_catalog::logging;
use product_catalog::server::ApiServer;

#[actix_web::main]
async fn main() -> Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("商品目录服务");
    tracing::info!("系统版本: {}", product_catalog::VERSION);
    tracing::info!("==================================================");

    let config = AppConfig::from_env().context("配置加载失败")?;
    tracing::info!("使用数据库: {}", config.db_path);

    let state = AppState::new(&config)
        .map_err(anyhow::Error::msg)
        .context("无法初始化AppState")?;

    ApiServer::from_config(&config).run(state).await
}
