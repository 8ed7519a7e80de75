//! Entry points older embedders still call. Instantiation now wires
//! everything up on its own, so these only log.

use crate::{wasi_env_t, wasm_instance_t, wasm_memory_t};

/// Always succeeds.
#[unsafe(no_mangle)]
pub extern "C" fn wasi_env_set_instance(
    _env: &mut wasi_env_t,
    _instance: &wasm_instance_t,
) -> bool {
    log::warn!("`wasi_env_set_instance` is deprecated and has no effect");
    true
}

#[unsafe(no_mangle)]
pub extern "C" fn wasi_env_set_memory(_env: &mut wasi_env_t, _memory: &wasm_memory_t) {
    log::warn!("`wasi_env_set_memory` is deprecated and has no effect");
}
