// ==========================================
// 商品目录服务 - 应用层
// ==========================================
// 职责: 组装共享状态，供 HTTP 服务与命令行使用
// ==========================================

pub mod state;

pub use state::AppState;
