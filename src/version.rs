//! Version of this C API, as seen from C.
//!
//! The generated `wasmbed/conf.h` header carries the same numbers as
//! preprocessor constants; both come from the package version.

use std::os::raw::c_char;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");
const VERSION_PRE: &str = concat!(env!("CARGO_PKG_VERSION_PRE"), "\0");
const VERSION_MAJOR: u8 = parse_u8(env!("CARGO_PKG_VERSION_MAJOR"));
const VERSION_MINOR: u8 = parse_u8(env!("CARGO_PKG_VERSION_MINOR"));
const VERSION_PATCH: u8 = parse_u8(env!("CARGO_PKG_VERSION_PATCH"));

const fn parse_u8(s: &str) -> u8 {
    let bytes = s.as_bytes();
    let mut value = 0u8;
    let mut i = 0;
    while i < bytes.len() {
        assert!(bytes[i].is_ascii_digit());
        value = value * 10 + (bytes[i] - b'0');
        i += 1;
    }
    value
}

/// Gets the full semver version of this C API.
///
/// The returned string is statically allocated. It must _not_ be freed!
#[unsafe(no_mangle)]
pub extern "C" fn wasmbed_version() -> *const c_char {
    VERSION.as_ptr().cast()
}

#[unsafe(no_mangle)]
pub extern "C" fn wasmbed_version_major() -> u8 {
    VERSION_MAJOR
}

#[unsafe(no_mangle)]
pub extern "C" fn wasmbed_version_minor() -> u8 {
    VERSION_MINOR
}

#[unsafe(no_mangle)]
pub extern "C" fn wasmbed_version_patch() -> u8 {
    VERSION_PATCH
}

/// Gets the pre-release part of the version, empty for a release.
///
/// The returned string is statically allocated. It must _not_ be freed!
#[unsafe(no_mangle)]
pub extern "C" fn wasmbed_version_pre() -> *const c_char {
    VERSION_PRE.as_ptr().cast()
}
