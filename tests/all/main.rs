//! Integration tests driving the C API through its exported functions.

use std::os::raw::c_char;
use wasmbed_c_api::*;

#[cfg(all(
    any(feature = "cranelift", feature = "winch"),
    any(feature = "jit", feature = "native")
))]
mod backend;
mod module;

/// Drains the calling thread's pending error the way a C host would.
pub(crate) fn last_error() -> Option<String> {
    let len = wasmbed_last_error_length();
    if len == 0 {
        return None;
    }
    let mut buf = vec![0u8; len as usize];
    let written = unsafe { wasmbed_last_error_message(buf.as_mut_ptr().cast::<c_char>(), len) };
    assert_eq!(written, len);
    assert_eq!(buf.pop(), Some(0));
    Some(String::from_utf8(buf).unwrap())
}

pub(crate) fn binary(wat: &str) -> wasm_byte_vec_t {
    wat::parse_str(wat).unwrap().into()
}

pub(crate) fn engine_and_store() -> (Box<wasm_engine_t>, Box<wasm_store_t>) {
    let _ = env_logger::try_init();
    let engine = wasm_engine_new().expect("default engine");
    let store = wasm_store_new(&engine);
    (engine, store)
}

pub(crate) fn compile(store: &mut wasm_store_t, wat: &str) -> Box<wasm_module_t> {
    match wasm_module_new(store, &binary(wat)) {
        Some(module) => module,
        None => panic!("failed to compile: {:?}", last_error()),
    }
}

pub(crate) fn instantiate(
    store: &mut wasm_store_t,
    module: &wasm_module_t,
    imports: &wasm_extern_vec_t,
) -> Box<wasm_instance_t> {
    match wasm_instance_new(store, module, imports, None) {
        Some(instance) => instance,
        None => panic!("failed to instantiate: {:?}", last_error()),
    }
}

pub(crate) fn i32_val(value: i32) -> wasm_val_t {
    wasm_val_t {
        kind: WASM_I32,
        of: wasm_val_union { i32: value },
    }
}
