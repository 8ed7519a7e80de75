use crate::wasi::capture::CapturePipe;
use crate::wasi::config::BuiltContext;
use crate::{
    StoreData, StoreRef, handle_result, slice_from_raw_parts_mut, update_last_error,
    wasi_config_t, wasi_version_t, wasm_extern_t, wasm_extern_vec_t, wasm_func_t,
    wasm_instance_t, wasm_module_t, wasm_store_t,
};
use anyhow::{Result, anyhow, bail};
use std::os::raw::c_char;
use wasmtime::{Extern, Linker, Module};
use wasmtime_wasi::preview1::{self, WasiP1Ctx};
use wasmtime_wasi::preview0;

/// The guest's OS facade once it has been bound to a store.
pub struct wasi_env_t {
    store: StoreRef,
    /// Index of this environment's context in `StoreData::wasi`.
    slot: usize,
    version: wasi_version_t,
    stdout: Option<CapturePipe>,
    stderr: Option<CapturePipe>,
}

wasmbed_c_api_macros::declare_own!(wasi_env_t);

fn wasi_ctx(
    slot: usize,
) -> impl Fn(&mut StoreData) -> &mut WasiP1Ctx + Copy + Send + Sync + 'static {
    move |data| &mut data.wasi[slot]
}

impl wasi_env_t {
    fn new(store: &StoreRef, module: &Module, config: wasi_config_t) -> Result<wasi_env_t> {
        let version = match wasi_version_t::detect(module) {
            wasi_version_t::WASI_VERSION_NONE => bail!("module does not import WASI"),
            wasi_version_t::WASI_VERSION_UNKNOWN => {
                bail!("module imports an unsupported or mixed set of WASI versions")
            }
            version => version,
        };
        let BuiltContext {
            ctx,
            stdout,
            stderr,
        } = config.build()?;
        let mut context = unsafe { store.context_mut() };
        let contexts = &mut context.data_mut().wasi;
        let slot = contexts.len();
        contexts.push(ctx);
        log::debug!("installed WASI context #{slot} ({version:?})");
        Ok(wasi_env_t {
            store: store.clone(),
            slot,
            version,
            stdout,
            stderr,
        })
    }

    /// Resolves every import of `module`, in order, against this
    /// environment.
    fn imports(&self, store: &StoreRef, module: &Module) -> Result<Vec<Extern>> {
        if !self.store.same(store) {
            bail!("WASI environment belongs to a different store");
        }
        let mut ctx = unsafe { store.context_mut() };
        let mut linker = Linker::<StoreData>::new(ctx.engine());
        match self.version {
            wasi_version_t::WASI_VERSION_SNAPSHOT0 => {
                preview0::add_to_linker_sync(&mut linker, wasi_ctx(self.slot))?
            }
            _ => preview1::add_to_linker_sync(&mut linker, wasi_ctx(self.slot))?,
        }
        module
            .imports()
            .map(|import| {
                linker.get_by_import(&mut ctx, &import).ok_or_else(|| {
                    anyhow!(
                        "failed to resolve import `{}`.`{}`",
                        import.module(),
                        import.name()
                    )
                })
            })
            .collect()
    }
}

/// Binds `config` to `store` for instances of `module`.
///
/// The config is consumed whether or not this succeeds.
#[unsafe(no_mangle)]
pub extern "C" fn wasi_env_new(
    store: &mut wasm_store_t,
    module: &wasm_module_t,
    config: Box<wasi_config_t>,
) -> Option<Box<wasi_env_t>> {
    handle_result(
        wasi_env_t::new(&store.store, &module.module, *config),
        Box::new,
    )
}

/// Fills `imports` with the externs `module` needs, in import order.
///
/// Returns `false` and records the last error if any import is neither a
/// WASI function of the environment's version nor otherwise resolvable.
#[unsafe(no_mangle)]
pub extern "C" fn wasi_get_imports(
    store: &wasm_store_t,
    module: &wasm_module_t,
    env: &wasi_env_t,
    imports: &mut wasm_extern_vec_t,
) -> bool {
    match env.imports(&store.store, &module.module) {
        Ok(externs) => {
            imports.set_buffer(
                externs
                    .into_iter()
                    .map(|which| {
                        Some(Box::new(wasm_extern_t {
                            store: store.store.clone(),
                            which,
                        }))
                    })
                    .collect(),
            );
            true
        }
        Err(e) => {
            update_last_error(e);
            imports.set_buffer(Vec::new());
            false
        }
    }
}

unsafe fn read_captured(
    stream: Option<&CapturePipe>,
    name: &str,
    buffer: *mut c_char,
    buffer_len: usize,
) -> isize {
    let Some(stream) = stream else {
        update_last_error(format!("{name} is inherited and was not captured"));
        return -1;
    };
    if buffer.is_null() {
        update_last_error("output buffer must not be null");
        return -1;
    }
    let buf = unsafe { slice_from_raw_parts_mut(buffer.cast::<u8>(), buffer_len) };
    stream.read(buf) as isize
}

/// Moves captured guest stdout into `buffer`.
///
/// Returns the number of bytes written, `0` once everything has been read,
/// or `-1` if stdout was inherited or `buffer` is `NULL`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wasi_env_read_stdout(
    env: &mut wasi_env_t,
    buffer: *mut c_char,
    buffer_len: usize,
) -> isize {
    unsafe { read_captured(env.stdout.as_ref(), "stdout", buffer, buffer_len) }
}

/// Same as [`wasi_env_read_stdout`], for stderr.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wasi_env_read_stderr(
    env: &mut wasi_env_t,
    buffer: *mut c_char,
    buffer_len: usize,
) -> isize {
    unsafe { read_captured(env.stderr.as_ref(), "stderr", buffer, buffer_len) }
}

/// Looks up the WASI command entry point, `_start`.
#[unsafe(no_mangle)]
pub extern "C" fn wasi_get_start_function(
    instance: &wasm_instance_t,
) -> Option<Box<wasm_func_t>> {
    let ext = instance.get_export("_start")?;
    match ext.which {
        Extern::Func(_) => Some(Box::new(wasm_func_t { ext })),
        _ => {
            update_last_error("export `_start` is not a function");
            None
        }
    }
}
