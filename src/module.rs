use crate::{handle_result, update_last_error, wasm_byte_vec_t, wasm_name_t, wasm_store_t};
use anyhow::Context;
use std::str;
use std::sync::Arc;
use wasmtime::{Engine, Module};

/// The part of a module that may be rewritten after compilation.
#[derive(Debug)]
struct ModuleIdentity {
    name: Option<String>,
}

#[repr(C)]
pub struct wasm_module_t {
    pub(crate) module: Module,
    identity: Arc<ModuleIdentity>,
}

// Copies get an identity of their own so renaming one leaves the other alone.
impl Clone for wasm_module_t {
    fn clone(&self) -> wasm_module_t {
        wasm_module_t {
            module: self.module.clone(),
            identity: Arc::new(ModuleIdentity {
                name: self.identity.name.clone(),
            }),
        }
    }
}

wasmbed_c_api_macros::declare_ty!(wasm_module_t);

impl wasm_module_t {
    pub(crate) fn new(module: Module) -> wasm_module_t {
        let identity = ModuleIdentity {
            name: module.name().map(str::to_owned),
        };
        wasm_module_t {
            module,
            identity: Arc::new(identity),
        }
    }

    pub(crate) fn name(&self) -> Option<&str> {
        self.identity.name.as_deref()
    }

    /// Renames the module, unless its identity is currently shared.
    pub(crate) fn set_name(&mut self, name: &str) -> bool {
        match Arc::get_mut(&mut self.identity) {
            Some(identity) => {
                identity.name = Some(name.to_owned());
                true
            }
            None => false,
        }
    }
}

/// A module snapshot which can be moved to another store of the same engine.
///
/// While a snapshot is alive the module's name is frozen.
#[repr(C)]
pub struct wasm_shared_module_t {
    module: Module,
    identity: Arc<ModuleIdentity>,
}

wasmbed_c_api_macros::declare_own!(wasm_shared_module_t);

#[unsafe(no_mangle)]
pub extern "C" fn wasm_module_new(
    store: &mut wasm_store_t,
    binary: &wasm_byte_vec_t,
) -> Option<Box<wasm_module_t>> {
    handle_result(store.engine.compile(binary.as_slice()), |module| {
        Box::new(wasm_module_t::new(module))
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn wasm_module_validate(store: &mut wasm_store_t, binary: &wasm_byte_vec_t) -> bool {
    handle_result(
        Module::validate(&store.engine.engine, binary.as_slice()),
        |()| {},
    )
    .is_some()
}

/// Non-standard API to get the module's name.
///
/// If the module has no name `out` is set to a zero-length vector with a
/// `NULL` data pointer.
#[unsafe(no_mangle)]
pub extern "C" fn wasm_module_name(module: &wasm_module_t, out: &mut wasm_name_t) {
    let name = module.name().map(str::to_owned).unwrap_or_default();
    out.set_buffer(name.into_bytes());
}

/// Non-standard API to set the module's name.
///
/// Returns `false` without touching the module if the name isn't valid UTF-8
/// or if a `wasm_shared_module_t` of this module is still alive.
#[unsafe(no_mangle)]
pub extern "C" fn wasm_module_set_name(module: &mut wasm_module_t, name: &wasm_name_t) -> bool {
    let name = match str::from_utf8(name.as_slice()) {
        Ok(name) => name,
        Err(e) => {
            update_last_error(anyhow::Error::new(e).context("module name is not valid UTF-8"));
            return false;
        }
    };
    module.set_name(name)
}

#[unsafe(no_mangle)]
pub extern "C" fn wasm_module_share(module: &wasm_module_t) -> Box<wasm_shared_module_t> {
    Box::new(wasm_shared_module_t {
        module: module.module.clone(),
        identity: module.identity.clone(),
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn wasm_module_obtain(
    store: &mut wasm_store_t,
    shared_module: &wasm_shared_module_t,
) -> Option<Box<wasm_module_t>> {
    if !Engine::same(&store.engine.engine, shared_module.module.engine()) {
        update_last_error("shared module belongs to a different engine");
        return None;
    }
    Some(Box::new(wasm_module_t {
        module: shared_module.module.clone(),
        identity: shared_module.identity.clone(),
    }))
}

#[unsafe(no_mangle)]
pub extern "C" fn wasm_module_serialize(module: &wasm_module_t, ret: &mut wasm_byte_vec_t) {
    let bytes = handle_result(module.module.serialize(), |bytes| bytes);
    ret.set_buffer(bytes.unwrap_or_default());
}

/// Loads a module previously produced by `wasm_module_serialize`.
///
/// The bytes are trusted: passing anything else is undefined behavior.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wasm_module_deserialize(
    store: &mut wasm_store_t,
    binary: &wasm_byte_vec_t,
) -> Option<Box<wasm_module_t>> {
    let engine = &store.engine.engine;
    let module = unsafe { Module::deserialize(engine, binary.as_slice()) }
        .context("failed to deserialize module");
    handle_result(module, |module| Box::new(wasm_module_t::new(module)))
}
