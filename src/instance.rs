use crate::{
    StoreRef, update_last_error, wasm_extern_t, wasm_extern_vec_t, wasm_module_t,
    wasm_store_t, wasm_trap_t,
};
use anyhow::{Result, anyhow, bail};
use wasmtime::{Extern, Instance, Trap};

#[derive(Clone)]
pub struct wasm_instance_t {
    pub(crate) store: StoreRef,
    pub(crate) instance: Instance,
}

wasmbed_c_api_macros::declare_own!(wasm_instance_t);

impl wasm_instance_t {
    pub(crate) fn get_export(&self, name: &str) -> Option<wasm_extern_t> {
        let mut store = unsafe { self.store.context_mut() };
        let which = self.instance.get_export(&mut store, name)?;
        Some(wasm_extern_t {
            store: self.store.clone(),
            which,
        })
    }
}

fn collect_imports(store: &StoreRef, imports: &wasm_extern_vec_t) -> Result<Vec<Extern>> {
    imports
        .as_slice()
        .iter()
        .enumerate()
        .map(|(i, import)| {
            let import = import
                .as_ref()
                .ok_or_else(|| anyhow!("import #{i} is null"))?;
            if !import.store.same(store) {
                bail!("import #{i} belongs to a different store");
            }
            Ok(import.which.clone())
        })
        .collect()
}

/// Instantiates `module` with `imports`, given in the module's import order.
///
/// If instantiation traps (for example in the start function) and `trap` is
/// non-null, the trap is handed over there. Any other failure is reported
/// through the last error.
#[unsafe(no_mangle)]
pub extern "C" fn wasm_instance_new(
    store: &mut wasm_store_t,
    module: &wasm_module_t,
    imports: &wasm_extern_vec_t,
    trap: Option<&mut *mut wasm_trap_t>,
) -> Option<Box<wasm_instance_t>> {
    let imports = match collect_imports(&store.store, imports) {
        Ok(imports) => imports,
        Err(e) => {
            update_last_error(e);
            return None;
        }
    };

    let ctx = unsafe { store.store.context_mut() };
    match Instance::new(ctx, &module.module, &imports) {
        Ok(instance) => Some(Box::new(wasm_instance_t {
            store: store.store.clone(),
            instance,
        })),
        Err(e) => {
            match trap {
                Some(trap) if e.is::<Trap>() => {
                    *trap = Box::into_raw(Box::new(wasm_trap_t::new(e)));
                }
                _ => update_last_error(e),
            }
            None
        }
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn wasm_instance_exports(instance: &wasm_instance_t, out: &mut wasm_extern_vec_t) {
    let mut store = unsafe { instance.store.context_mut() };
    let exports = instance
        .instance
        .exports(&mut store)
        .map(|e| {
            Some(Box::new(wasm_extern_t {
                store: instance.store.clone(),
                which: e.into_extern(),
            }))
        })
        .collect::<Vec<_>>();
    out.set_buffer(exports);
}
