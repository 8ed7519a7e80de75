use crate::{update_last_error, wasm_byte_vec_t};

/// Parses in-memory bytes as either the text format or a binary module.
///
/// On failure `out` is left with a zero size and a `NULL` data pointer, and
/// the parse error is recorded as the last error.
#[unsafe(no_mangle)]
pub extern "C" fn wat2wasm(wat: &wasm_byte_vec_t, out: &mut wasm_byte_vec_t) {
    match wat::parse_bytes(wat.as_slice()) {
        Ok(bytes) => out.set_buffer(bytes.into_owned()),
        Err(e) => {
            update_last_error(e);
            out.set_buffer(Vec::new());
        }
    }
}
