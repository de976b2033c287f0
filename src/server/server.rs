// ==========================================
// 商品目录服务 - HTTP 服务器
// ==========================================
// 框架: actix-web
// 职责: 绑定地址，挂载共享状态与路由
// ==========================================

use crate::app::AppState;
use crate::config::AppConfig;
use crate::server::routes;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};

/// HTTP 服务器（监听地址来自配置）
pub struct ApiServer {
    pub host: String,
    pub port: u16,
}

impl ApiServer {
    /// 从已加载的配置创建
    pub fn from_config(config: &AppConfig) -> Self {
        let (host, port) = config.bind_address();
        Self { host, port }
    }

    /// 启动 HTTP 服务（阻塞直到服务退出）
    pub async fn run(self, state: AppState) -> Result<()> {
        let bind_addr = format!("{}:{}", self.host, self.port);

        tracing::info!(
            host = %self.host,
            port = %self.port,
            db_path = %state.db_path,
            "商品目录服务启动"
        );

        let state = web::Data::new(state);

        HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .wrap(Logger::default())
                .configure(routes::configure_routes)
        })
        .bind(&bind_addr)
        .with_context(|| format!("无法绑定地址 {}", bind_addr))?
        .run()
        .await
        .context("HTTP 服务异常退出")?;

        Ok(())
    }
}
