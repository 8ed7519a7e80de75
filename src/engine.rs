use crate::{BackendError, handle_result, wasm_config_new, wasm_config_t, wasmbed_engine_kind_t};
use anyhow::Result;
use wasmtime::{Engine, Module};

#[repr(C)]
#[derive(Clone)]
pub struct wasm_engine_t {
    pub(crate) engine: Engine,
    pub(crate) kind: wasmbed_engine_kind_t,
}

wasmbed_c_api_macros::declare_own!(wasm_engine_t);

impl wasm_engine_t {
    pub(crate) fn from_config(config: wasm_config_t) -> Result<wasm_engine_t> {
        let (config, kind) = config.resolve()?;
        let engine = Engine::new(&config)?;
        log::debug!("created {} engine", kind.name());
        Ok(wasm_engine_t { engine, kind })
    }

    /// Compiles `binary` the way this engine's kind dictates.
    pub(crate) fn compile(&self, binary: &[u8]) -> Result<Module> {
        log::trace!("compiling {} bytes with the {} engine", binary.len(), self.kind.name());
        match self.kind {
            #[cfg(all(feature = "jit", any(feature = "cranelift", feature = "winch")))]
            wasmbed_engine_kind_t::JIT => Module::from_binary(&self.engine, binary),
            #[cfg(all(feature = "native", any(feature = "cranelift", feature = "winch")))]
            wasmbed_engine_kind_t::NATIVE => {
                let artifact = self.engine.precompile_module(binary)?;
                // SAFETY: the artifact was produced by this very engine.
                unsafe { Module::deserialize(&self.engine, &artifact) }
            }
            kind => Err(BackendError::EngineNotEnabled(kind.name()).into()),
        }
    }
}

fn init_logging() {
    // Enable the `env_logger` crate since this is as good a place as any to
    // support some "top level initialization" for the C API. Almost all
    // embeddings go through here, so this makes `RUST_LOG` work.
    //
    // Note that we `drop` the result here since this fails after the first
    // initialization attempt.
    #[cfg(feature = "logging")]
    drop(env_logger::try_init());
}

/// Creates an engine with the default engine kind and compiler.
#[unsafe(no_mangle)]
pub extern "C" fn wasm_engine_new() -> Option<Box<wasm_engine_t>> {
    wasm_engine_new_with_config(wasm_config_new())
}

/// Creates an engine from `config`, taking ownership of it.
///
/// Returns `NULL` and records the last error if the selected compiler or
/// engine isn't part of this build.
#[unsafe(no_mangle)]
pub extern "C" fn wasm_engine_new_with_config(
    config: Box<wasm_config_t>,
) -> Option<Box<wasm_engine_t>> {
    init_logging();
    handle_result(wasm_engine_t::from_config(*config), Box::new)
}
