use std::io::Write;

use version_server::{server, version, CONFIG};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        let reason = info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| info.payload().downcast_ref::<String>().map(String::as_str))
            .unwrap_or("未知原因");
        let location = info
            .location()
            .map(ToString::to_string)
            .unwrap_or_else(|| "未知位置".to_string());

        eprintln!("[PANIC] {location}: {reason}");
        std::io::stderr().flush().ok();
    }));

    let mut args = std::env::args();
    let _ = args.next();

    match args.next().as_deref() {
        Some("version") | Some("--version") | Some("-v") => {
            // 版本输出要么完整要么没有：任何错误直接以非零状态退出
            if let Err(err) =
                version::print_version(&CONFIG.program.name, &CONFIG.program.internal_version)
            {
                eprintln!("版本信息输出失败: {}", err);
                std::process::exit(1);
            }
            std::process::exit(0)
        }
        _ => server::start_server().await,
    }
}
