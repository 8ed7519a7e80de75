use super::*;
use crate::module::call_add;
use wasmbed_compiler_kind_t::*;
use wasmbed_engine_kind_t::*;

const COMPILERS: [wasmbed_compiler_kind_t; 3] = [CRANELIFT, LLVM, SINGLEPASS];
const ENGINES: [wasmbed_engine_kind_t; 3] = [JIT, NATIVE, OBJECT_FILE];

const ADD: &str = r#"
    (module
        (func (export "add") (param i32 i32) (result i32)
            local.get 0
            local.get 1
            i32.add))
"#;

fn engine_for(
    compiler: wasmbed_compiler_kind_t,
    engine: wasmbed_engine_kind_t,
) -> Option<Box<wasm_engine_t>> {
    let mut config = wasm_config_new();
    wasm_config_set_compiler(&mut config, compiler);
    wasm_config_set_engine(&mut config, engine);
    wasm_engine_new_with_config(config)
}

#[test]
fn unavailable_backends_are_reported() {
    assert!(!wasmbed_compiler_available(LLVM));
    assert!(!wasmbed_engine_available(OBJECT_FILE));
    assert_eq!(wasmbed_compiler_available(CRANELIFT), cfg!(feature = "cranelift"));
    assert_eq!(wasmbed_compiler_available(SINGLEPASS), cfg!(feature = "winch"));
}

#[test]
fn selection_is_checked_at_engine_creation() {
    let mut config = wasm_config_new();
    wasm_config_set_compiler(&mut config, LLVM);
    assert_eq!(wasmbed_last_error_length(), 0);
    assert!(wasm_engine_new_with_config(config).is_none());
    assert_eq!(
        last_error().as_deref(),
        Some("compiler `llvm` is not enabled in this build")
    );
}

#[test]
fn every_available_pair_runs_code() {
    for compiler in COMPILERS {
        for kind in ENGINES {
            let expected = wasmbed_compiler_available(compiler) && wasmbed_engine_available(kind);
            let engine = engine_for(compiler, kind);
            assert_eq!(
                engine.is_some(),
                expected,
                "{compiler:?}/{kind:?}: {:?}",
                last_error()
            );
            let Some(engine) = engine else { continue };

            let mut store = wasm_store_new(&engine);
            let module = compile(&mut store, ADD);
            assert_eq!(call_add(&mut store, &module), 42, "{compiler:?}/{kind:?}");
        }
    }
}

#[cfg(all(feature = "cranelift", feature = "jit", feature = "native"))]
#[test]
fn native_artifacts_load_in_a_jit_engine() {
    let native = engine_for(CRANELIFT, NATIVE).unwrap();
    let mut store = wasm_store_new(&native);
    let module = compile(&mut store, ADD);
    let mut bytes = wasm_byte_vec_t::from(Vec::new());
    wasm_module_serialize(&module, &mut bytes);

    let jit = engine_for(CRANELIFT, JIT).unwrap();
    let mut store = wasm_store_new(&jit);
    let module = unsafe { wasm_module_deserialize(&mut store, &bytes) }.unwrap();
    assert_eq!(call_add(&mut store, &module), 42);
}

#[test]
fn opt_level_and_debug_info_are_accepted() {
    let mut config = wasm_config_new();
    wasmbed_config_opt_level_set(&mut config, wasmbed_opt_level_t::WASMBED_OPT_LEVEL_NONE);
    wasmbed_config_debug_info_set(&mut config, false);
    let engine = wasm_engine_new_with_config(config).unwrap();
    let mut store = wasm_store_new(&engine);
    let module = compile(&mut store, ADD);
    assert_eq!(call_add(&mut store, &module), 42);
}
