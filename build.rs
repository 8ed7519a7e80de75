//! Build program that stages the C headers in `$OUT_DIR/include`.
//!
//! `wasmbed.h` is copied as-is. `wasmbed/conf.h` is generated so that C
//! code can tell which version it's compiling against and which optional
//! parts of the API were built in.

use std::env;
use std::fs;
use std::path::PathBuf;

// Cargo feature, `conf.h` define.
const FEATURES: &[(&str, &str)] = &[
    ("WASI", "WASMBED_WASI_ENABLED"),
    ("WAT", "WASMBED_WAT_ENABLED"),
    ("CRANELIFT", "WASMBED_CRANELIFT_ENABLED"),
    ("WINCH", "WASMBED_SINGLEPASS_ENABLED"),
    ("JIT", "WASMBED_JIT_ENABLED"),
    ("NATIVE", "WASMBED_NATIVE_ENABLED"),
];

fn enabled(feature: &str) -> bool {
    env::var_os(format!("CARGO_FEATURE_{feature}")).is_some()
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=include");

    let out_dir =
        PathBuf::from(env::var("OUT_DIR").expect("The OUT_DIR environment variable must be set"));
    let include = out_dir.join("include");
    fs::create_dir_all(include.join("wasmbed")).expect("creating include directory");
    fs::copy("include/wasmbed.h", include.join("wasmbed.h")).expect("copying wasmbed.h");

    let version = env::var("CARGO_PKG_VERSION").expect("cargo sets CARGO_PKG_VERSION");
    let mut conf = String::from(
        "// Generated when the library was built. Do not edit.\n\
         #ifndef WASMBED_CONF_H\n\
         #define WASMBED_CONF_H\n\n",
    );
    conf.push_str(&format!("#define WASMBED_VERSION \"{version}\"\n"));
    for (part, var) in [
        ("MAJOR", "CARGO_PKG_VERSION_MAJOR"),
        ("MINOR", "CARGO_PKG_VERSION_MINOR"),
        ("PATCH", "CARGO_PKG_VERSION_PATCH"),
    ] {
        let value = env::var(var).expect("cargo sets the version components");
        conf.push_str(&format!("#define WASMBED_VERSION_{part} {value}\n"));
    }
    let pre = env::var("CARGO_PKG_VERSION_PRE").unwrap_or_default();
    conf.push_str(&format!("#define WASMBED_VERSION_PRE \"{pre}\"\n\n"));

    for (feature, define) in FEATURES {
        if enabled(feature) {
            conf.push_str(&format!("#define {define}\n"));
        }
    }
    // At least one backend can compile, so modules can be loaded at all.
    if enabled("CRANELIFT") || enabled("WINCH") {
        conf.push_str("#define WASMBED_COMPILER_ENABLED\n");
        if enabled("JIT") || enabled("NATIVE") {
            conf.push_str("#define WASMBED_ENGINE_ENABLED\n");
        }
    }
    conf.push_str("\n#endif // WASMBED_CONF_H\n");
    fs::write(include.join("wasmbed/conf.h"), conf).expect("writing conf.h");

    println!("cargo:include={}", include.display());
}
