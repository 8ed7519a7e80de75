use crate::wasm_module_t;
use wasmtime::Module;

/// The WASI snapshot a module was built against.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum wasi_version_t {
    /// The module imports nothing from a WASI namespace.
    WASI_VERSION_NONE = -1,
    /// The newest snapshot this build implements. Never reported by
    /// detection, only useful as an alias when asking for an environment.
    WASI_VERSION_LATEST = 0,
    WASI_VERSION_SNAPSHOT0 = 1,
    WASI_VERSION_SNAPSHOT1 = 2,
    /// The module mixes snapshots or uses one this build doesn't know.
    WASI_VERSION_UNKNOWN = 3,
}

impl wasi_version_t {
    /// Classifies a module by the WASI namespaces it imports from.
    pub(crate) fn detect(module: &Module) -> wasi_version_t {
        let mut found = None;
        for import in module.imports() {
            let version = match import.module() {
                "wasi_unstable" => wasi_version_t::WASI_VERSION_SNAPSHOT0,
                "wasi_snapshot_preview1" => wasi_version_t::WASI_VERSION_SNAPSHOT1,
                ns if ns.starts_with("wasi") => return wasi_version_t::WASI_VERSION_UNKNOWN,
                _ => continue,
            };
            match found {
                None => found = Some(version),
                Some(prev) if prev == version => {}
                Some(_) => return wasi_version_t::WASI_VERSION_UNKNOWN,
            }
        }
        found.unwrap_or(wasi_version_t::WASI_VERSION_NONE)
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn wasi_get_wasi_version(module: &wasm_module_t) -> wasi_version_t {
    wasi_version_t::detect(&module.module)
}
