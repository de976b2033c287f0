// ==========================================
// 商品目录服务 - 路由配置
// ==========================================

use crate::server::handlers;
use actix_web::web;

/// 注册全部路由
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // 健康检查（不访问数据库）
        .route("/health", web::get().to(handlers::health_check))
        // 导入
        .route("/upload", web::post().to(handlers::upload_products))
        // 查询
        .route("/products", web::get().to(handlers::list_products))
        .route("/products/search", web::get().to(handlers::search_products));
}
