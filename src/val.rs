use anyhow::{Result, bail};
use std::mem::MaybeUninit;
use wasmtime::{Val, ValType};

pub type wasm_valkind_t = u8;
pub const WASM_I32: wasm_valkind_t = 0;
pub const WASM_I64: wasm_valkind_t = 1;
pub const WASM_F32: wasm_valkind_t = 2;
pub const WASM_F64: wasm_valkind_t = 3;

/// A numeric WebAssembly value. Reference values are not representable here.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct wasm_val_t {
    pub kind: wasm_valkind_t,
    pub of: wasm_val_union,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub union wasm_val_union {
    pub i32: i32,
    pub i64: i64,
    pub u32: u32,
    pub u64: u64,
    pub f32: f32,
    pub f64: f64,
}

impl Default for wasm_val_t {
    fn default() -> Self {
        wasm_val_t {
            kind: WASM_I32,
            of: wasm_val_union { i32: 0 },
        }
    }
}

impl wasm_val_t {
    pub(crate) fn from_val(val: &Val) -> Result<wasm_val_t> {
        Ok(match val {
            Val::I32(i) => wasm_val_t {
                kind: WASM_I32,
                of: wasm_val_union { i32: *i },
            },
            Val::I64(i) => wasm_val_t {
                kind: WASM_I64,
                of: wasm_val_union { i64: *i },
            },
            Val::F32(f) => wasm_val_t {
                kind: WASM_F32,
                of: wasm_val_union { u32: *f },
            },
            Val::F64(f) => wasm_val_t {
                kind: WASM_F64,
                of: wasm_val_union { u64: *f },
            },
            _ => bail!("value `{val:?}` cannot be represented as a `wasm_val_t`"),
        })
    }

    pub(crate) fn val(&self) -> Result<Val> {
        Ok(match self.kind {
            WASM_I32 => Val::I32(unsafe { self.of.i32 }),
            WASM_I64 => Val::I64(unsafe { self.of.i64 }),
            WASM_F32 => Val::F32(unsafe { self.of.u32 }),
            WASM_F64 => Val::F64(unsafe { self.of.u64 }),
            kind => bail!("unsupported value kind {kind}"),
        })
    }
}

/// Placeholder result slot of the right type for `ty`.
pub(crate) fn default_for(ty: &ValType) -> Result<Val> {
    Ok(match ty {
        ValType::I32 => Val::I32(0),
        ValType::I64 => Val::I64(0),
        ValType::F32 => Val::F32(0),
        ValType::F64 => Val::F64(0),
        _ => bail!("type `{ty:?}` cannot be represented as a `wasm_val_t`"),
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn wasm_val_copy(out: &mut MaybeUninit<wasm_val_t>, source: &wasm_val_t) {
    out.write(*source);
}

#[unsafe(no_mangle)]
pub extern "C" fn wasm_val_delete(_val: &mut wasm_val_t) {}
