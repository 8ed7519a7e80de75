use crate::{default_for, wasm_extern_t, wasm_trap_t, wasm_val_t, wasm_val_vec_t};
use anyhow::{Result, bail};
use wasmtime::{Extern, Func};

#[derive(Clone)]
#[repr(transparent)]
pub struct wasm_func_t {
    pub(crate) ext: wasm_extern_t,
}

wasmbed_c_api_macros::declare_ty!(wasm_func_t);

impl wasm_func_t {
    pub(crate) fn try_from(e: &wasm_extern_t) -> Option<&wasm_func_t> {
        match &e.which {
            Extern::Func(_) => Some(unsafe { &*(e as *const _ as *const _) }),
            _ => None,
        }
    }

    pub(crate) fn func(&self) -> Func {
        match self.ext.which {
            Extern::Func(f) => f,
            _ => unreachable!(),
        }
    }

    fn call(&self, params: &[wasm_val_t]) -> Result<Vec<wasm_val_t>> {
        let func = self.func();
        let mut store = unsafe { self.ext.store.context_mut() };
        let ty = func.ty(&store);
        if params.len() != ty.params().len() {
            bail!(
                "expected {} arguments, got {}",
                ty.params().len(),
                params.len()
            );
        }
        let params = params
            .iter()
            .map(|p| p.val())
            .collect::<Result<Vec<_>>>()?;
        let mut results = ty
            .results()
            .map(|ty| default_for(&ty))
            .collect::<Result<Vec<_>>>()?;
        func.call(&mut store, &params, &mut results)?;
        results.iter().map(wasm_val_t::from_val).collect()
    }
}

/// Calls `func`.
///
/// `results` must have been allocated by the caller with room for every
/// result. On failure the returned trap describes what went wrong.
#[unsafe(no_mangle)]
pub extern "C" fn wasm_func_call(
    func: &wasm_func_t,
    args: &wasm_val_vec_t,
    results: &mut wasm_val_vec_t,
) -> Option<Box<wasm_trap_t>> {
    match func.call(args.as_slice()) {
        Ok(values) => {
            for (slot, val) in results.as_uninit_slice().iter_mut().zip(values) {
                slot.write(val);
            }
            None
        }
        Err(err) => Some(Box::new(wasm_trap_t::new(err))),
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn wasm_func_param_arity(func: &wasm_func_t) -> usize {
    let store = unsafe { func.ext.store.context() };
    func.func().ty(&store).params().len()
}

#[unsafe(no_mangle)]
pub extern "C" fn wasm_func_result_arity(func: &wasm_func_t) -> usize {
    let store = unsafe { func.ext.store.context() };
    func.func().ty(&store).results().len()
}

#[unsafe(no_mangle)]
pub extern "C" fn wasm_func_as_extern(func: &wasm_func_t) -> &wasm_extern_t {
    &func.ext
}

