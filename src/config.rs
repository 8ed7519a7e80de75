//! Backend selection.
//!
//! Selecting a compiler or an engine never fails by itself: the choice is
//! only recorded in the [`wasm_config_t`]. Whether the selected backend is
//! actually part of this build is checked when the configuration is consumed
//! by [`wasm_engine_new_with_config`](crate::wasm_engine_new_with_config).

use thiserror::Error;
use wasmtime::{Config, Strategy};

/// Kind of compilers that can be used by the engines.
///
/// The discriminants are part of the ABI.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum wasmbed_compiler_kind_t {
    /// The Cranelift optimizing compiler.
    CRANELIFT = 0,
    /// An LLVM-based compiler. No build of this crate carries it.
    LLVM = 1,
    /// The Winch single-pass baseline compiler.
    SINGLEPASS = 2,
}

/// Kind of engines that can be used by the store.
///
/// The discriminants are part of the ABI.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum wasmbed_engine_kind_t {
    /// Modules are compiled to machine code in memory and run directly.
    JIT = 0,
    /// Modules are compiled to a native artifact which is then loaded.
    NATIVE = 1,
    /// Modules are compiled to object files. No build carries it.
    OBJECT_FILE = 2,
}

#[repr(u8)]
#[derive(Clone, Copy, Debug)]
pub enum wasmbed_opt_level_t {
    WASMBED_OPT_LEVEL_NONE,
    WASMBED_OPT_LEVEL_SPEED,
    WASMBED_OPT_LEVEL_SPEED_AND_SIZE,
}

/// Errors raised when a configuration is turned into an engine.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BackendError {
    #[error("compiler `{0}` is not enabled in this build")]
    CompilerNotEnabled(&'static str),
    #[error("engine `{0}` is not enabled in this build")]
    EngineNotEnabled(&'static str),
    #[error("no execution engine is enabled in this build")]
    NoEngine,
}

impl wasmbed_compiler_kind_t {
    pub fn name(self) -> &'static str {
        match self {
            wasmbed_compiler_kind_t::CRANELIFT => "cranelift",
            wasmbed_compiler_kind_t::LLVM => "llvm",
            wasmbed_compiler_kind_t::SINGLEPASS => "singlepass",
        }
    }

    pub fn is_enabled(self) -> bool {
        match self {
            wasmbed_compiler_kind_t::CRANELIFT => cfg!(feature = "cranelift"),
            wasmbed_compiler_kind_t::LLVM => false,
            wasmbed_compiler_kind_t::SINGLEPASS => cfg!(feature = "winch"),
        }
    }

    fn strategy(self) -> Result<Strategy, BackendError> {
        match self {
            #[cfg(feature = "cranelift")]
            wasmbed_compiler_kind_t::CRANELIFT => Ok(Strategy::Cranelift),
            #[cfg(feature = "winch")]
            wasmbed_compiler_kind_t::SINGLEPASS => Ok(Strategy::Winch),
            other => Err(BackendError::CompilerNotEnabled(other.name())),
        }
    }
}

impl wasmbed_engine_kind_t {
    pub fn name(self) -> &'static str {
        match self {
            wasmbed_engine_kind_t::JIT => "jit",
            wasmbed_engine_kind_t::NATIVE => "native",
            wasmbed_engine_kind_t::OBJECT_FILE => "object-file",
        }
    }

    /// Both engines drive a compiler, so neither is usable without one.
    pub fn is_enabled(self) -> bool {
        let compiler = cfg!(any(feature = "cranelift", feature = "winch"));
        match self {
            wasmbed_engine_kind_t::JIT => compiler && cfg!(feature = "jit"),
            wasmbed_engine_kind_t::NATIVE => compiler && cfg!(feature = "native"),
            wasmbed_engine_kind_t::OBJECT_FILE => false,
        }
    }

    /// The engine used when the host doesn't pick one: JIT, then native.
    pub fn default_kind() -> Result<wasmbed_engine_kind_t, BackendError> {
        [wasmbed_engine_kind_t::JIT, wasmbed_engine_kind_t::NATIVE]
            .into_iter()
            .find(|kind| kind.is_enabled())
            .ok_or(BackendError::NoEngine)
    }
}

#[repr(C)]
#[derive(Clone, Default)]
pub struct wasm_config_t {
    pub(crate) config: Config,
    pub(crate) compiler: Option<wasmbed_compiler_kind_t>,
    pub(crate) engine: Option<wasmbed_engine_kind_t>,
}

wasmbed_c_api_macros::declare_own!(wasm_config_t);

impl wasm_config_t {
    /// Checks the pending backend choice and folds it into the `Config`.
    pub(crate) fn resolve(self) -> Result<(Config, wasmbed_engine_kind_t), BackendError> {
        let wasm_config_t {
            mut config,
            compiler,
            engine,
        } = self;

        let engine = match engine {
            Some(kind) if kind.is_enabled() => kind,
            Some(kind) => return Err(BackendError::EngineNotEnabled(kind.name())),
            None => wasmbed_engine_kind_t::default_kind()?,
        };
        if let Some(compiler) = compiler {
            config.strategy(compiler.strategy()?);
        }
        log::debug!("resolved backend: engine={engine:?} compiler={compiler:?}");
        Ok((config, engine))
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn wasm_config_new() -> Box<wasm_config_t> {
    Box::new(wasm_config_t::default())
}

/// Updates the configuration to specify a particular compiler to use.
#[cfg(any(feature = "cranelift", feature = "winch"))]
#[unsafe(no_mangle)]
pub extern "C" fn wasm_config_set_compiler(
    config: &mut wasm_config_t,
    compiler: wasmbed_compiler_kind_t,
) {
    config.compiler = Some(compiler);
}

/// Updates the configuration to specify a particular engine to use.
#[cfg(all(
    any(feature = "cranelift", feature = "winch"),
    any(feature = "jit", feature = "native")
))]
#[unsafe(no_mangle)]
pub extern "C" fn wasm_config_set_engine(
    config: &mut wasm_config_t,
    engine: wasmbed_engine_kind_t,
) {
    config.engine = Some(engine);
}

#[unsafe(no_mangle)]
pub extern "C" fn wasmbed_compiler_available(compiler: wasmbed_compiler_kind_t) -> bool {
    compiler.is_enabled()
}

#[unsafe(no_mangle)]
pub extern "C" fn wasmbed_engine_available(engine: wasmbed_engine_kind_t) -> bool {
    engine.is_enabled()
}

#[unsafe(no_mangle)]
pub extern "C" fn wasmbed_config_debug_info_set(c: &mut wasm_config_t, enable: bool) {
    c.config.debug_info(enable);
}

#[cfg(any(feature = "cranelift", feature = "winch"))]
#[unsafe(no_mangle)]
pub extern "C" fn wasmbed_config_opt_level_set(
    c: &mut wasm_config_t,
    opt_level: wasmbed_opt_level_t,
) {
    use wasmbed_opt_level_t::*;
    c.config.cranelift_opt_level(match opt_level {
        WASMBED_OPT_LEVEL_NONE => wasmtime::OptLevel::None,
        WASMBED_OPT_LEVEL_SPEED => wasmtime::OptLevel::Speed,
        WASMBED_OPT_LEVEL_SPEED_AND_SIZE => wasmtime::OptLevel::SpeedAndSize,
    });
}
