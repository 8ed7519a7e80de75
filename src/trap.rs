use crate::wasm_name_t;
use anyhow::Error;

#[repr(C)]
pub struct wasm_trap_t {
    pub(crate) error: Error,
}

wasmbed_c_api_macros::declare_own!(wasm_trap_t);

impl wasm_trap_t {
    pub(crate) fn new(error: Error) -> wasm_trap_t {
        wasm_trap_t { error }
    }
}

pub type wasm_message_t = wasm_name_t;

/// Writes the trap's NUL-terminated message into `out`.
#[unsafe(no_mangle)]
pub extern "C" fn wasm_trap_message(trap: &wasm_trap_t, out: &mut wasm_message_t) {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(format!("{:?}", trap.error).as_bytes());
    buffer.reserve_exact(1);
    buffer.push(0);
    out.set_buffer(buffer);
}

/// Returns `true` and the exit code if the trap is a WASI `proc_exit`.
#[unsafe(no_mangle)]
pub extern "C" fn wasmbed_trap_exit_status(trap: &wasm_trap_t, status: &mut i32) -> bool {
    #[cfg(feature = "wasi")]
    if let Some(exit) = trap.error.downcast_ref::<wasmtime_wasi::I32Exit>() {
        *status = exit.0;
        return true;
    }

    false
}
