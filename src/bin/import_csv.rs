// ==========================================
// 商品目录服务 - 命令行导入工具
// ==========================================
// 用法: cargo run --bin import_csv -- <file> [--db <path>]
// 说明: 与 POST /upload 使用同一导入流程，不启动 HTTP 服务
//       导入结果以 JSON 输出到标准输出
// ==========================================

use anyhow::{bail, Context, Result};
use product_catalog::app::AppState;
use product_catalog::config::AppConfig;
use product_catalog::logging;

struct Args {
    file: String,
    db_path: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut file = None;
    let mut db_path = None;
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => {
                db_path = Some(args.next().context("--db 需要指定数据库路径")?);
            }
            "-h" | "--help" => {
                bail!("usage: import_csv <file> [--db <path>]");
            }
            other if file.is_none() => file = Some(other.to_string()),
            other => bail!("无法识别的参数: {}", other),
        }
    }

    Ok(Args {
        file: file.context("usage: import_csv <file> [--db <path>]")?,
        db_path,
    })
}

fn main() -> Result<()> {
    logging::init_cli();

    let args = parse_args()?;
    let mut config = AppConfig::from_env().context("配置无效")?;
    if let Some(db_path) = args.db_path {
        config.db_path = db_path;
    }

    let state = AppState::new(&config).map_err(anyhow::Error::msg)?;
    let summary = state
        .import_api
        .import_file(&args.file)
        .with_context(|| format!("导入失败: {}", args.file))?;

    tracing::info!(
        file = %args.file,
        stored = summary.stored,
        failed = summary.failed.len(),
        "命令行导入完成"
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
