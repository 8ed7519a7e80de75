use super::*;

const ADD: &str = r#"
    (module $adder
        (func (export "add") (param i32 i32) (result i32)
            local.get 0
            local.get 1
            i32.add))
"#;

fn name_of(module: &wasm_module_t) -> Vec<u8> {
    let mut out = wasm_name_t::from(Vec::new());
    wasm_module_name(module, &mut out);
    out.as_slice().to_vec()
}

fn set_name(module: &mut wasm_module_t, name: &[u8]) -> bool {
    wasm_module_set_name(module, &name.to_vec().into())
}

pub(crate) fn call_add(store: &mut wasm_store_t, module: &wasm_module_t) -> i32 {
    let instance = instantiate(store, module, &Vec::new().into());
    let mut exports = wasm_extern_vec_t::from(Vec::new());
    wasm_instance_exports(&instance, &mut exports);
    let add = exports.as_slice()[0].as_ref().unwrap();
    let add = wasm_extern_as_func(add).expect("`add` is a function");
    assert_eq!(wasm_func_param_arity(add), 2);
    assert_eq!(wasm_func_result_arity(add), 1);

    let args = wasm_val_vec_t::from(vec![i32_val(2), i32_val(40)]);
    let mut results = wasm_val_vec_t::from(vec![wasm_val_t::default()]);
    assert!(wasm_func_call(add, &args, &mut results).is_none());
    let result = results.as_slice()[0];
    assert_eq!(result.kind, WASM_I32);
    unsafe { result.of.i32 }
}

#[test]
fn name_comes_from_the_name_section() {
    let (_engine, mut store) = engine_and_store();
    let module = compile(&mut store, ADD);
    assert_eq!(name_of(&module), b"adder");

    let anonymous = compile(&mut store, "(module)");
    let mut out = wasm_name_t::from(Vec::new());
    wasm_module_name(&anonymous, &mut out);
    assert_eq!(out.size, 0);
    assert!(out.data.is_null());
}

#[test]
fn set_name_round_trips() {
    let (_engine, mut store) = engine_and_store();
    let mut module = compile(&mut store, "(module)");
    assert!(name_of(&module).is_empty());
    assert!(set_name(&mut module, b"hello"));
    assert_eq!(name_of(&module), b"hello");
    assert_eq!(wasmbed_last_error_length(), 0);
}

#[test]
fn set_name_rejects_invalid_utf8() {
    let (_engine, mut store) = engine_and_store();
    let mut module = compile(&mut store, ADD);
    assert!(!set_name(&mut module, &[0xff, 0xfe]));
    assert_eq!(name_of(&module), b"adder");
    assert!(last_error().unwrap().contains("UTF-8"));
}

#[test]
fn shared_module_freezes_the_name() {
    let (_engine, mut store) = engine_and_store();
    let mut module = compile(&mut store, ADD);
    let shared = wasm_module_share(&module);
    assert!(!set_name(&mut module, b"renamed"));

    let obtained = wasm_module_obtain(&mut store, &shared).unwrap();
    assert_eq!(name_of(&obtained), b"adder");
    drop(obtained);
    drop(shared);

    assert!(set_name(&mut module, b"renamed"));
    assert_eq!(name_of(&module), b"renamed");
}

#[test]
fn copies_are_renamed_independently() {
    let (_engine, mut store) = engine_and_store();
    let module = compile(&mut store, ADD);
    let mut copy = wasm_module_copy(&module);
    assert!(set_name(&mut copy, b"copy"));
    assert_eq!(name_of(&copy), b"copy");
    assert_eq!(name_of(&module), b"adder");
}

#[test]
fn obtain_requires_the_same_engine() {
    let (_engine, mut store) = engine_and_store();
    let module = compile(&mut store, ADD);
    let shared = wasm_module_share(&module);

    let (_other_engine, mut other_store) = engine_and_store();
    assert!(wasm_module_obtain(&mut other_store, &shared).is_none());
    assert!(last_error().unwrap().contains("different engine"));
}

#[test]
fn validate() {
    let (_engine, mut store) = engine_and_store();
    assert!(wasm_module_validate(&mut store, &binary(ADD)));
    assert!(!wasm_module_validate(
        &mut store,
        &b"\0asm\x02\0\0\0".to_vec().into()
    ));
}

#[test]
fn instantiate_and_call() {
    let (_engine, mut store) = engine_and_store();
    let module = compile(&mut store, ADD);
    assert_eq!(call_add(&mut store, &module), 42);
}

#[test]
fn call_with_wrong_arity_traps() {
    let (_engine, mut store) = engine_and_store();
    let module = compile(&mut store, ADD);
    let instance = instantiate(&mut store, &module, &Vec::new().into());
    let mut exports = wasm_extern_vec_t::from(Vec::new());
    wasm_instance_exports(&instance, &mut exports);
    let add = wasm_extern_as_func(exports.as_slice()[0].as_ref().unwrap()).unwrap();

    let args = wasm_val_vec_t::from(vec![i32_val(1)]);
    let mut results = wasm_val_vec_t::from(vec![wasm_val_t::default()]);
    let trap = wasm_func_call(add, &args, &mut results).expect("arity mismatch");
    let mut message = wasm_message_t::from(Vec::new());
    wasm_trap_message(&trap, &mut message);
    let text = message.as_slice();
    assert_eq!(text.last(), Some(&0));
    assert!(String::from_utf8_lossy(text).contains("expected 2 arguments, got 1"));
}

#[test]
fn serialize_round_trip() {
    let (_engine, mut store) = engine_and_store();
    let module = compile(&mut store, ADD);
    let mut bytes = wasm_byte_vec_t::from(Vec::new());
    wasm_module_serialize(&module, &mut bytes);
    assert!(bytes.size > 0);

    let restored = unsafe { wasm_module_deserialize(&mut store, &bytes) }.unwrap();
    assert_eq!(name_of(&restored), b"adder");
    assert_eq!(call_add(&mut store, &restored), 42);
}

#[test]
fn memory_exports() {
    let (_engine, mut store) = engine_and_store();
    let module = compile(
        &mut store,
        r#"(module (memory (export "mem") 2) (data (i32.const 0) "hi"))"#,
    );
    let instance = instantiate(&mut store, &module, &Vec::new().into());
    let mut exports = wasm_extern_vec_t::from(Vec::new());
    wasm_instance_exports(&instance, &mut exports);
    let ext = exports.as_slice()[0].as_ref().unwrap();
    assert_eq!(wasm_extern_kind(ext), WASM_EXTERN_MEMORY);
    assert!(wasm_extern_as_func(ext).is_none());

    let memory = wasm_extern_as_memory(ext).unwrap();
    assert_eq!(wasm_memory_size(memory), 2);
    assert_eq!(wasm_memory_data_size(memory), 2 * 65536);
    let data = unsafe { std::slice::from_raw_parts(wasm_memory_data(memory), 2) };
    assert_eq!(data, b"hi");
}
