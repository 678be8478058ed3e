use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");

    let crate_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap_or_default());
    let include_dir = crate_dir.join("include");
    if let Err(err) = std::fs::create_dir_all(&include_dir) {
        println!("cargo:warning=could not create {}: {err}", include_dir.display());
        return;
    }

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("STATS_FFI_H")
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(include_dir.join("stats_ffi.h"));
        }
        Err(err) => println!("cargo:warning=cbindgen skipped: {err}"),
    }
}
