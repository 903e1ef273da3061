fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    #[cfg(feature = "native")]
    build_shim();
}

/// Compile the C ABI shim and link it against libiqtree2.
///
/// `IQTREE_LIB_DIR` points at the directory holding the library;
/// `IQTREE_INCLUDE_DIR` is added to the include path when set.
#[cfg(feature = "native")]
fn build_shim() {
    println!("cargo:rerun-if-changed=native/iqtree_shim.cpp");
    println!("cargo:rerun-if-env-changed=IQTREE_LIB_DIR");
    println!("cargo:rerun-if-env-changed=IQTREE_INCLUDE_DIR");

    let mut build = cc::Build::new();
    build
        .cpp(true)
        .file("native/iqtree_shim.cpp")
        .flag_if_supported("-std=c++17");
    if let Ok(include) = std::env::var("IQTREE_INCLUDE_DIR") {
        build.include(include);
    }
    build.compile("piqtree_shim");

    match std::env::var("IQTREE_LIB_DIR") {
        Ok(dir) => println!("cargo:rustc-link-search=native={dir}"),
        Err(_) => println!(
            "cargo:warning=IQTREE_LIB_DIR is not set; relying on the default linker search path for libiqtree2"
        ),
    }
    println!("cargo:rustc-link-lib=iqtree2");
}
