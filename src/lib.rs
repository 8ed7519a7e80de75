//! This crate is the implementation of Wasmbed's C API.
//!
//! This crate is normally not intended to be used from Rust itself. For that,
//! see the `wasmtime` crate which backs it. It is possible to use this crate
//! via Cargo, for Rust crates that wrap C libraries that use wasmbed. Most
//! often, this crate is compiled as a cdylib or staticlib.
//!
//! Documentation for this crate largely lives in the header files of the
//! `include` directory for this crate.
//!
//! At a high level this crate implements a subset of the `wasm.h` API on top
//! of `wasmtime`, and an accompanying `wasmbed.h` API provides the
//! non-standard pieces: backend selection, WASI environments, module names,
//! `wat2wasm`, the last-error channel and version reporting.

#![expect(non_camel_case_types, reason = "matching C style, not Rust")]

pub use wasmtime;

mod config;
mod engine;
mod error;
mod r#extern;
mod func;
mod instance;
mod memory;
mod module;
mod store;
mod trap;
mod val;
mod vec;
mod version;

pub use crate::config::*;
pub use crate::engine::*;
pub use crate::error::*;
pub use crate::func::*;
pub use crate::instance::*;
pub use crate::memory::*;
pub use crate::module::*;
pub use crate::r#extern::*;
pub use crate::store::*;
pub use crate::trap::*;
pub use crate::val::*;
pub use crate::vec::*;
pub use crate::version::*;

#[cfg(feature = "wasi")]
mod wasi;
#[cfg(feature = "wasi")]
pub use crate::wasi::*;

#[cfg(feature = "wat")]
mod wat2wasm;
#[cfg(feature = "wat")]
pub use crate::wat2wasm::*;

#[cfg(feature = "wasi")]
use std::ffi::CStr;
#[cfg(feature = "wasi")]
use std::os::raw::c_char;

/// Helper for creating Rust slices from C inputs.
///
/// This specifically disregards the `ptr` argument if the length is zero. The
/// `ptr` in that case maybe `NULL` or invalid, and it's not valid to have a
/// zero-length Rust slice with a `NULL` pointer.
unsafe fn slice_from_raw_parts<'a, T>(ptr: *const T, len: usize) -> &'a [T] {
    if len == 0 {
        &[]
    } else {
        unsafe { std::slice::from_raw_parts(ptr, len) }
    }
}

/// Same as above, but for `*_mut`
#[cfg(feature = "wasi")]
unsafe fn slice_from_raw_parts_mut<'a, T>(ptr: *mut T, len: usize) -> &'a mut [T] {
    if len == 0 {
        &mut []
    } else {
        unsafe { std::slice::from_raw_parts_mut(ptr, len) }
    }
}

/// Copies a NUL-terminated C string into owned bytes, `None` for `NULL`.
#[cfg(feature = "wasi")]
unsafe fn cstr_to_bytes(ptr: *const c_char) -> Option<Vec<u8>> {
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_bytes().to_vec())
}
