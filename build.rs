use chrono::Utc;
use std::{fs, process::Command};

fn main() {
    println!("cargo:rerun-if-changed=VERSION");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads");
    println!("cargo:rerun-if-env-changed=BUILD_COMMENT");

    set_build_metadata();
}

// 编译时注入构建元数据，未能确定的值以空字符串传入
fn set_build_metadata() {
    let release_version = fs::read_to_string("VERSION")
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    println!("cargo:rustc-env=APP_BUILD_VERSION={}", release_version);
    println!(
        "cargo:rustc-env=APP_BUILD_BRANCH={}",
        command_stdout("git", &["rev-parse", "--abbrev-ref", "HEAD"])
    );
    println!(
        "cargo:rustc-env=APP_BUILD_COMMIT={}",
        command_stdout("git", &["rev-parse", "--short", "HEAD"])
    );
    println!("cargo:rustc-env=APP_BUILD_TIMESTAMP={}", Utc::now().to_rfc3339());
    println!(
        "cargo:rustc-env=APP_BUILD_COMMENT={}",
        std::env::var("BUILD_COMMENT").unwrap_or_default()
    );

    let rustc = std::env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    println!(
        "cargo:rustc-env=APP_RUSTC_VERSION={}",
        command_stdout(&rustc, &["--version"])
    );
}

fn command_stdout(program: &str, args: &[&str]) -> String {
    let stdout = match Command::new(program).args(args).output() {
        Ok(out) if out.status.success() => out.stdout,
        _ => return String::new(),
    };
    String::from_utf8_lossy(&stdout).trim().to_string()
}
