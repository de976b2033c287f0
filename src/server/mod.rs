// ==========================================
// 商品目录服务 - HTTP 层
// ==========================================
// 组成: server（启动）/ routes（路由）/ handlers（处理函数）
// ==========================================

pub mod handlers;
pub mod routes;
#[allow(clippy::module_inception)]
pub mod server;

pub use routes::configure_routes;
pub use server::ApiServer;
