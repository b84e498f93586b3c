// build.rs

use chrono::Utc;
use std::env;
use std::fs;
use std::path::Path;

fn main() {
    let out_dir = env::var("OUT_DIR").expect("cargo sets OUT_DIR for build scripts");
    let dest_path = Path::new(&out_dir).join("build_info.rs");

    let build_date = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();

    // BUILD_DATE is include!()'d by main.rs and logged at startup
    fs::write(
        &dest_path,
        format!("pub const BUILD_DATE: &str = \"{}\";\n", build_date),
    )
    .expect("build_info.rs must be writable");

    println!("cargo:rerun-if-changed=build.rs");
}
