use crate::wasm_engine_t;
use std::cell::UnsafeCell;
use std::sync::Arc;
use wasmtime::{AsContext, AsContextMut, Store, StoreContext, StoreContextMut};

/// Host state carried by every store.
pub struct StoreData {
    /// One guest OS facade per `wasi_env_t` created on this store, indexed
    /// by the environment's slot. Slots are never removed: instances keep
    /// calling into them after their environment is deleted.
    #[cfg(feature = "wasi")]
    pub(crate) wasi: Vec<wasmtime_wasi::preview1::WasiP1Ctx>,
}

impl StoreData {
    fn new() -> StoreData {
        StoreData {
            #[cfg(feature = "wasi")]
            wasi: Vec::new(),
        }
    }
}

/// A shared handle to a store.
///
/// Externs and WASI environments keep one of these so they can reach the
/// store they belong to. Nothing here is synchronized: the C API requires
/// that a store is used from one thread at a time.
#[derive(Clone)]
pub struct StoreRef {
    store: Arc<UnsafeCell<Store<StoreData>>>,
}

impl StoreRef {
    pub unsafe fn context(&self) -> StoreContext<'_, StoreData> {
        unsafe { (*self.store.get()).as_context() }
    }

    pub unsafe fn context_mut(&self) -> StoreContextMut<'_, StoreData> {
        unsafe { (*self.store.get()).as_context_mut() }
    }

    pub(crate) fn same(&self, other: &StoreRef) -> bool {
        Arc::ptr_eq(&self.store, &other.store)
    }
}

#[repr(C)]
#[derive(Clone)]
pub struct wasm_store_t {
    pub(crate) store: StoreRef,
    pub(crate) engine: wasm_engine_t,
}

wasmbed_c_api_macros::declare_own!(wasm_store_t);

#[unsafe(no_mangle)]
pub extern "C" fn wasm_store_new(engine: &wasm_engine_t) -> Box<wasm_store_t> {
    let store = Store::new(&engine.engine, StoreData::new());
    Box::new(wasm_store_t {
        store: StoreRef {
            store: Arc::new(UnsafeCell::new(store)),
        },
        engine: engine.clone(),
    })
}
