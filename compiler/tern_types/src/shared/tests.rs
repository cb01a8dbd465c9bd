use super::*;
use crate::decl::{BasicKind, FieldDecl, MethodDecl, Signature};
use pretty_assertions::assert_eq;
use tern_ir::SharedInterner;

fn ok<T>(result: Result<T, TypeError>) -> T {
    result.unwrap_or_else(|e| panic!("unexpected type error: {e}"))
}

/// A universe with `type Counter struct { n int }` and two bound methods.
fn counter_universe() -> (TypeUniverse, TypeId) {
    let mut u = TypeUniverse::new(SharedInterner::new());
    let int = u.basic(BasicKind::Int);
    let n = u.interner().intern("n");
    let name = u.interner().intern("Counter");
    let counter = ok(u.declare_named(name, None));
    let body = u.struct_of(vec![FieldDecl {
        name: n,
        ty: int,
        embedded: false,
    }]);
    ok(u.set_underlying(counter, body));
    for method in ["Get", "Reset"] {
        let method = u.interner().intern(method);
        ok(u.add_method(counter, MethodDecl::new(method, Signature::new(vec![], vec![int]))));
        let func = u.alloc_func();
        ok(u.bind_method(counter, method, func));
    }
    (u, counter)
}

#[test]
fn config_selects_handle_kind() {
    let (u, _) = counter_universe();
    assert!(!UniverseHandle::new(u, UniverseConfig::default()).is_thread_safe());
    let (u, _) = counter_universe();
    assert!(UniverseHandle::new(u, UniverseConfig { thread_safe: true }).is_thread_safe());
}

#[test]
fn local_handle_resolves_and_caches() {
    let (u, counter) = counter_universe();
    let handle = UniverseHandle::new(u, UniverseConfig::default());
    let first = ok(handle.method(counter, 1));
    let second = ok(handle.method(counter, 1));
    assert_eq!(first, second);
    assert_eq!(handle.read(TypeUniverse::stats).slots_synthesized, 1);
}

#[test]
fn concurrent_resolution_synthesizes_each_slot_once() {
    let (u, counter) = counter_universe();
    let handle = UniverseHandle::new(u, UniverseConfig { thread_safe: true });
    let UniverseHandle::Shared(shared) = &handle else {
        panic!("expected a shared handle");
    };

    let results: Vec<Vec<Method>> = std::thread::scope(|s| {
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let shared = shared.clone();
                s.spawn(move || {
                    let handle = UniverseHandle::Shared(shared);
                    (0..50)
                        .map(|i| ok(handle.method(counter, i % 2)))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        workers
            .into_iter()
            .map(|w| w.join().unwrap_or_else(|_| panic!("worker panicked")))
            .collect()
    });

    let expected_get = ok(handle.method(counter, 0));
    let expected_reset = ok(handle.method(counter, 1));
    for methods in &results {
        for (i, m) in methods.iter().enumerate() {
            let expected = if i % 2 == 0 { &expected_get } else { &expected_reset };
            assert_eq!(m, expected);
        }
    }
    let stats = handle.read(TypeUniverse::stats);
    assert_eq!(stats.slots_synthesized, 2);
    assert_eq!(stats.descriptors, 1);
}

#[test]
fn errors_pass_through_the_handle() {
    let (mut u, counter) = counter_universe();
    let pointer = u.pointer_to(counter);
    let handle = UniverseHandle::new(u, UniverseConfig { thread_safe: true });
    assert!(matches!(
        handle.method(pointer, 0),
        Err(TypeError::MethodOnPointer { .. })
    ));
    assert!(matches!(
        handle.method(counter, 5),
        Err(TypeError::MethodIndexOutOfRange { count: 2, .. })
    ));
}
