//! Live iteration semantics of Set Iterators

use otter_vm_collections::intrinsics::well_known;
use otter_vm_collections::object::PropertyKey;
use otter_vm_collections::{NativeContext, SetData, Value, VmContext, VmError, VmRuntime};
use tracing_subscriber::filter::EnvFilter;

/// Compaction and cursor logs show up with `RUST_LOG=otter_vm_collections=trace`
fn create_test_context() -> VmContext {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    VmRuntime::new().create_context()
}

fn call(ncx: &mut NativeContext<'_>, this: &Value, key: PropertyKey, args: &[Value]) -> Result<Value, VmError> {
    let obj = this.as_object().unwrap().clone();
    let method = ncx.get(&obj, &key)?;
    ncx.call_function(&method, this, args)
}

fn new_set(ncx: &mut NativeContext<'_>, items: &[Value]) -> Value {
    let ctor = Value::object(ncx.intrinsics().set_constructor.clone());
    let set = ncx.construct(&ctor, &[]).unwrap();
    for item in items {
        call(ncx, &set, "add".into(), &[item.clone()]).unwrap();
    }
    set
}

/// `iter.next()` as `(value, done)`
fn step(ncx: &mut NativeContext<'_>, iter: &Value) -> (Value, bool) {
    let result = call(ncx, iter, "next".into(), &[]).unwrap();
    let result = result.as_object().unwrap().clone();
    let value = ncx.get(&result, &"value".into()).unwrap();
    let done = ncx.get(&result, &"done".into()).unwrap().to_boolean();
    (value, done)
}

fn data_of(set: &Value) -> std::sync::Arc<SetData> {
    set.as_object().unwrap().as_set_data().unwrap().clone()
}

#[test]
fn test_value_added_mid_iteration_is_visited() {
    let mut ctx = create_test_context();
    let mut ncx = ctx.native();
    let (a, b) = (Value::from("A"), Value::from("B"));
    let set = new_set(&mut ncx, &[a.clone()]);
    let iter = call(&mut ncx, &set, "values".into(), &[]).unwrap();

    assert_eq!(step(&mut ncx, &iter), (a, false));
    call(&mut ncx, &set, "add".into(), &[b.clone()]).unwrap();
    assert_eq!(step(&mut ncx, &iter), (b, false));
    assert_eq!(step(&mut ncx, &iter), (Value::undefined(), true));
}

#[test]
fn test_deleted_value_is_skipped() {
    let mut ctx = create_test_context();
    let mut ncx = ctx.native();
    let set = new_set(&mut ncx, &[Value::int32(1), Value::int32(2), Value::int32(3)]);
    let iter = call(&mut ncx, &set, "values".into(), &[]).unwrap();

    assert_eq!(step(&mut ncx, &iter), (Value::int32(1), false));
    call(&mut ncx, &set, "delete".into(), &[Value::int32(2)]).unwrap();
    assert_eq!(step(&mut ncx, &iter), (Value::int32(3), false));
    assert!(step(&mut ncx, &iter).1);
}

#[test]
fn test_exhaustion_is_terminal() {
    let mut ctx = create_test_context();
    let mut ncx = ctx.native();
    let set = new_set(&mut ncx, &[Value::int32(1)]);
    let iter = call(&mut ncx, &set, "values".into(), &[]).unwrap();
    step(&mut ncx, &iter);
    assert!(step(&mut ncx, &iter).1);
    call(&mut ncx, &set, "add".into(), &[Value::int32(2)]).unwrap();
    assert_eq!(step(&mut ncx, &iter), (Value::undefined(), true));
}

#[test]
fn test_clear_during_iteration_ends_iterator() {
    let mut ctx = create_test_context();
    let mut ncx = ctx.native();
    let set = new_set(&mut ncx, &[Value::int32(1), Value::int32(2), Value::int32(3)]);
    let iter = call(&mut ncx, &set, "values".into(), &[]).unwrap();
    assert_eq!(step(&mut ncx, &iter), (Value::int32(1), false));

    call(&mut ncx, &set, "clear".into(), &[]).unwrap();
    assert_eq!(step(&mut ncx, &iter), (Value::undefined(), true));
}

#[test]
fn test_values_added_after_clear_are_visited() {
    let mut ctx = create_test_context();
    let mut ncx = ctx.native();
    let set = new_set(&mut ncx, &[Value::int32(1), Value::int32(2)]);
    let iter = call(&mut ncx, &set, "values".into(), &[]).unwrap();
    assert_eq!(step(&mut ncx, &iter), (Value::int32(1), false));

    call(&mut ncx, &set, "clear".into(), &[]).unwrap();
    call(&mut ncx, &set, "add".into(), &[Value::int32(9)]).unwrap();
    assert_eq!(step(&mut ncx, &iter), (Value::int32(9), false));
    assert!(step(&mut ncx, &iter).1);
}

#[test]
fn test_entries_yield_pairs() {
    let mut ctx = create_test_context();
    let mut ncx = ctx.native();
    let set = new_set(&mut ncx, &[Value::from("x")]);
    let iter = call(&mut ncx, &set, "entries".into(), &[]).unwrap();
    let (pair, done) = step(&mut ncx, &iter);
    assert!(!done);
    let pair = pair.as_object().unwrap();
    assert!(pair.is_array());
    assert_eq!(pair.array_values(), vec![Value::from("x"), Value::from("x")]);
}

#[test]
fn test_iterator_protocol_surface() {
    let mut ctx = create_test_context();
    let mut ncx = ctx.native();
    let set = new_set(&mut ncx, &[]);
    let iter = call(&mut ncx, &set, PropertyKey::Symbol(well_known::ITERATOR), &[]).unwrap();

    // %SetIteratorPrototype% inherits %IteratorPrototype%[@@iterator]
    let same = call(&mut ncx, &iter, PropertyKey::Symbol(well_known::ITERATOR), &[]).unwrap();
    assert_eq!(same, iter);

    let obj_proto = ncx.intrinsics().object_prototype.clone();
    let to_string = ncx.get(&obj_proto, &"toString".into()).unwrap();
    let tag = ncx.call_function(&to_string, &iter, &[]).unwrap();
    assert_eq!(tag, Value::from("[object Set Iterator]"));
}

#[test]
fn test_no_compaction_while_iterating() {
    let mut ctx = create_test_context();
    let mut ncx = ctx.native();
    let values: Vec<Value> = (0..64).map(Value::int32).collect();
    let set = new_set(&mut ncx, &values);
    let data = data_of(&set);
    let iter = call(&mut ncx, &set, "values".into(), &[]).unwrap();
    assert_eq!(step(&mut ncx, &iter), (Value::int32(0), false));

    for i in 1..60 {
        call(&mut ncx, &set, "delete".into(), &[Value::int32(i)]).unwrap();
    }
    assert_eq!(data.slot_count(), 64);
    assert_eq!(data.attached_cursors(), 1);

    let mut rest = Vec::new();
    loop {
        let (value, done) = step(&mut ncx, &iter);
        if done {
            break;
        }
        rest.push(value);
    }
    assert_eq!(rest, (60..64).map(Value::int32).collect::<Vec<_>>());

    // Detached on exhaustion, so storage compacts and keeps live order
    assert_eq!(data.attached_cursors(), 0);
    assert_eq!(data.slot_count(), 5);
    assert_eq!(
        data.values(),
        [0, 60, 61, 62, 63].into_iter().map(Value::int32).collect::<Vec<_>>()
    );
}

#[test]
fn test_abandoned_iterator_releases_storage() {
    let mut ctx = create_test_context();
    let mut ncx = ctx.native();
    let values: Vec<Value> = (0..40).map(Value::int32).collect();
    let set = new_set(&mut ncx, &values);
    let data = data_of(&set);
    {
        let iter = call(&mut ncx, &set, "values".into(), &[]).unwrap();
        step(&mut ncx, &iter);
        assert_eq!(data.attached_cursors(), 1);
    }
    assert_eq!(data.attached_cursors(), 0);
    for i in 0..30 {
        call(&mut ncx, &set, "delete".into(), &[Value::int32(i)]).unwrap();
    }
    assert!(data.slot_count() < 40);
    assert_eq!(data.size(), 10);
}
