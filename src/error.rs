//! The last-error channel.
//!
//! Failures inside this crate are plain `anyhow::Result`s. Only at the C
//! boundary are they turned into a signaled result (a `NULL`, a `false`, an
//! empty vector) plus a message parked in a thread-local slot that the host
//! drains with [`wasmbed_last_error_message`].

use std::cell::RefCell;
use std::fmt;
use std::os::raw::{c_char, c_int};
use std::ptr;

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Overwrites the calling thread's pending error.
pub(crate) fn update_last_error(err: impl fmt::Display) {
    let message = format!("{err:#}");
    log::debug!("recording last error: {message}");
    LAST_ERROR.with(|prev| *prev.borrow_mut() = Some(message));
}

/// Removes and returns the calling thread's pending error.
pub(crate) fn take_last_error() -> Option<String> {
    LAST_ERROR.with(|prev| prev.borrow_mut().take())
}

/// Runs `ok` on success, otherwise records the error and returns `None`.
pub(crate) fn handle_result<T, U>(
    result: anyhow::Result<T>,
    ok: impl FnOnce(T) -> U,
) -> Option<U> {
    match result {
        Ok(value) => Some(ok(value)),
        Err(err) => {
            update_last_error(err);
            None
        }
    }
}

/// Gets the length in bytes of the last error if any, zero otherwise.
///
/// The length includes the trailing NUL character, so it can be used as is
/// to allocate the buffer handed to [`wasmbed_last_error_message`].
#[unsafe(no_mangle)]
pub extern "C" fn wasmbed_last_error_length() -> c_int {
    LAST_ERROR.with(|prev| match *prev.borrow() {
        Some(ref err) => c_int::try_from(err.len() + 1).unwrap_or(c_int::MAX),
        None => 0,
    })
}

/// Gets the last error message if any into `buffer`, up to `length` bytes.
///
/// Returns the number of bytes written including the trailing NUL, `0` if no
/// error is pending, or `-1` if `buffer` is `NULL` or too small.
///
/// If `buffer` is non-null the pending error is cleared, whether or not the
/// copy succeeds.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wasmbed_last_error_message(buffer: *mut c_char, length: c_int) -> c_int {
    if buffer.is_null() {
        return -1;
    }

    let err = match take_last_error() {
        Some(err) => err,
        None => return 0,
    };

    let length = match usize::try_from(length) {
        Ok(length) => length,
        Err(_) => return -1,
    };
    if err.len() >= length {
        return -1;
    }

    unsafe {
        ptr::copy_nonoverlapping(err.as_ptr(), buffer.cast::<u8>(), err.len());
        *buffer.add(err.len()) = 0;
    }

    c_int::try_from(err.len() + 1).unwrap_or(c_int::MAX)
}
