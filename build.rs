use chrono::Utc;

fn main() {
    // Stamp build time for /api/health / 记录构建时间
    let stamp = Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    println!("cargo:rustc-env=FILE_EXCHANGE_BUILD_TIME={}", stamp);
    println!("cargo:rerun-if-changed=build.rs");
}
