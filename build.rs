// build.rs - expose the compile-time target triple as a rustc env var.
//
// Cargo sets `TARGET` for build scripts only. Re-exporting it lets the
// `host` platform source read it with `env!("EXTBUILD_TARGET")` and map it
// to a DuckDB platform identifier.

fn main() {
    let target = std::env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=EXTBUILD_TARGET={target}");
    println!("cargo:rerun-if-changed=build.rs");
}
