use crate::wasm_extern_t;
use wasmtime::{Extern, Memory, SharedMemory};

/// A linear memory. Shared memories are viewed through the same type.
#[derive(Clone)]
#[repr(transparent)]
pub struct wasm_memory_t {
    pub(crate) ext: wasm_extern_t,
}

wasmbed_c_api_macros::declare_ty!(wasm_memory_t);

pub type wasm_memory_pages_t = u32;

enum Which<'a> {
    Local(Memory),
    Shared(&'a SharedMemory),
}

impl wasm_memory_t {
    pub(crate) fn try_from(e: &wasm_extern_t) -> Option<&wasm_memory_t> {
        match &e.which {
            Extern::Memory(_) | Extern::SharedMemory(_) => {
                Some(unsafe { &*(e as *const _ as *const _) })
            }
            _ => None,
        }
    }

    fn which(&self) -> Which<'_> {
        match &self.ext.which {
            Extern::Memory(m) => Which::Local(*m),
            Extern::SharedMemory(m) => Which::Shared(m),
            _ => unreachable!(),
        }
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn wasm_memory_as_extern(m: &wasm_memory_t) -> &wasm_extern_t {
    &m.ext
}

#[unsafe(no_mangle)]
pub extern "C" fn wasm_memory_data(m: &wasm_memory_t) -> *mut u8 {
    match m.which() {
        Which::Local(memory) => {
            let store = unsafe { m.ext.store.context() };
            memory.data_ptr(&store)
        }
        Which::Shared(memory) => memory.data().as_ptr().cast_mut().cast::<u8>(),
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn wasm_memory_data_size(m: &wasm_memory_t) -> usize {
    match m.which() {
        Which::Local(memory) => {
            let store = unsafe { m.ext.store.context() };
            memory.data_size(&store)
        }
        Which::Shared(memory) => memory.data_size(),
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn wasm_memory_size(m: &wasm_memory_t) -> wasm_memory_pages_t {
    let pages = match m.which() {
        Which::Local(memory) => {
            let store = unsafe { m.ext.store.context() };
            memory.size(&store)
        }
        Which::Shared(memory) => memory.size(),
    };
    u32::try_from(pages).unwrap_or(u32::MAX)
}
