use super::*;
use crate::decl::{BasicKind, FieldDecl, MethodDecl, Signature};
use pretty_assertions::assert_eq;

fn universe() -> TypeUniverse {
    TypeUniverse::new(SharedInterner::new())
}

fn ok<T>(result: Result<T, TypeError>) -> T {
    result.unwrap_or_else(|e| panic!("unexpected type error: {e}"))
}

fn named_struct(u: &mut TypeUniverse, name: &str, fields: Vec<FieldDecl>) -> TypeId {
    let name = u.interner().intern(name);
    let ty = ok(u.declare_named(name, None));
    let body = u.struct_of(fields);
    ok(u.set_underlying(ty, body));
    ty
}

fn nullary(u: &mut TypeUniverse, name: &str) -> MethodDecl {
    let name = u.interner().intern(name);
    MethodDecl::new(name, Signature::default())
}

fn embed(ty: TypeId) -> FieldDecl {
    FieldDecl {
        name: Name::EMPTY,
        ty,
        embedded: true,
    }
}

#[test]
fn basic_pointer_and_slice_types_are_interned() {
    let mut u = universe();
    let int = u.basic(BasicKind::Int);
    assert_eq!(u.basic(BasicKind::Int), int);
    let p = u.pointer_to(int);
    assert_eq!(u.pointer_to(int), p);
    let s = u.slice_of(int);
    assert_eq!(u.slice_of(int), s);
    assert_ne!(p, s);
}

#[test]
fn struct_with_embedded_field_counts_promoted_methods() {
    let mut u = universe();
    let f = named_struct(&mut u, "F", vec![]);
    let m1 = nullary(&mut u, "Open");
    let m2 = nullary(&mut u, "Close");
    ok(u.add_method(f, m1));
    ok(u.add_method(f, m2));

    let field = embed(f);
    let t = named_struct(&mut u, "T", vec![field]);
    let own = nullary(&mut u, "Run");
    ok(u.add_method(t, own));

    assert_eq!(u.num_method(t), 1);
    assert_eq!(u.num_explicit_method(t), 1);
    assert_eq!(u.num_all_method(t), 3);
}

#[test]
fn embedded_pointer_field_is_unwrapped_once() {
    let mut u = universe();
    let f = named_struct(&mut u, "F", vec![]);
    let m = nullary(&mut u, "Open");
    ok(u.add_method(f, m));
    let pf = u.pointer_to(f);
    let field = embed(pf);
    let t = named_struct(&mut u, "T", vec![field]);

    assert_eq!(u.num_method(t), 0);
    assert_eq!(u.num_all_method(t), 1);
}

#[test]
fn self_embedding_struct_terminates() {
    let mut u = universe();
    let name = u.interner().intern("Node");
    let node = ok(u.declare_named(name, None));
    let pnode = u.pointer_to(node);
    let body = u.struct_of(vec![embed(pnode)]);
    ok(u.set_underlying(node, body));
    let m = nullary(&mut u, "Next");
    ok(u.add_method(node, m));

    assert_eq!(u.num_all_method(node), 1);
}

#[test]
fn interface_counts_include_embedded_methods() {
    let mut u = universe();
    let read = nullary(&mut u, "Read");
    let reader = ok(u.interface_of(vec![read], vec![]));
    let close = nullary(&mut u, "Close");
    let write = nullary(&mut u, "Write");
    let rwc = ok(u.interface_of(vec![write, close], vec![reader]));

    assert_eq!(u.num_method(rwc), 3);
    assert_eq!(u.num_explicit_method(rwc), 2);
    assert_eq!(u.num_all_method(rwc), 3);

    let TypeData::Interface(data) = u.data(rwc) else {
        panic!("not an interface");
    };
    let names: Vec<&str> = data.all.iter().map(|m| u.interner().lookup(m.name)).collect();
    assert_eq!(names, vec!["Close", "Read", "Write"]);
}

#[test]
fn interface_explicit_methods_get_interface_receiver() {
    let mut u = universe();
    let area = nullary(&mut u, "Area");
    let iface = ok(u.interface_of(vec![area], vec![]));
    let TypeData::Interface(data) = u.data(iface) else {
        panic!("not an interface");
    };
    assert_eq!(data.explicit[0].sig.recv, Some(iface));
}

#[test]
fn duplicate_embedded_methods_are_merged() {
    let mut u = universe();
    let close = nullary(&mut u, "Close");
    let closer = ok(u.interface_of(vec![close.clone()], vec![]));
    let other = ok(u.interface_of(vec![close], vec![]));
    let both = ok(u.interface_of(vec![], vec![closer, other]));
    assert_eq!(u.num_method(both), 1);
}

#[test]
fn interface_cannot_embed_struct() {
    let mut u = universe();
    let s = named_struct(&mut u, "S", vec![]);
    let err = u.interface_of(vec![], vec![s]);
    assert!(matches!(err, Err(TypeError::EmbeddedNotInterface { .. })));
}

#[test]
fn unnamed_non_interface_types_have_no_methods() {
    let mut u = universe();
    let int = u.basic(BasicKind::Int);
    let s = u.struct_of(vec![]);
    assert_eq!(u.num_method(int), 0);
    assert_eq!(u.num_explicit_method(s), 0);
    assert_eq!(u.num_all_method(s), 0);
}

#[test]
fn named_underlying_is_unwrapped() {
    let mut u = universe();
    let a = named_struct(&mut u, "A", vec![]);
    let b_name = u.interner().intern("B");
    let b = ok(u.declare_named(b_name, None));
    ok(u.set_underlying(b, a));

    assert_eq!(u.underlying(b), u.underlying(a));
    assert_eq!(u.kind_of(b), Kind::Struct);
}

#[test]
fn underlying_errors() {
    let mut u = universe();
    let name = u.interner().intern("T");
    let t = ok(u.declare_named(name, None));
    assert_eq!(u.kind_of(t), Kind::Invalid);
    assert!(matches!(
        u.set_underlying(t, t),
        Err(TypeError::SelfUnderlying { .. })
    ));
    let int = u.basic(BasicKind::Int);
    ok(u.set_underlying(t, int));
    assert!(matches!(
        u.set_underlying(t, int),
        Err(TypeError::UnderlyingAlreadySet { .. })
    ));
    assert!(matches!(
        u.set_underlying(int, int),
        Err(TypeError::SelfUnderlying { .. })
    ));
    assert!(matches!(
        u.declare_named(name, None),
        Err(TypeError::DuplicateType { .. })
    ));
    assert_eq!(u.lookup_named(name), Some(t));
}

#[test]
fn add_method_validation() {
    let mut u = universe();
    let t = named_struct(&mut u, "T", vec![]);
    let other = named_struct(&mut u, "U", vec![]);

    let run = nullary(&mut u, "Run");
    assert_eq!(ok(u.add_method(t, run.clone())), 0);
    assert!(matches!(
        u.add_method(t, run),
        Err(TypeError::DuplicateMethod { .. })
    ));

    let mut foreign = nullary(&mut u, "Stop");
    foreign.sig.recv = Some(other);
    assert!(matches!(
        u.add_method(t, foreign.clone()),
        Err(TypeError::InvalidReceiver { .. })
    ));

    let pt = u.pointer_to(t);
    foreign.sig.recv = Some(pt);
    assert_eq!(ok(u.add_method(t, foreign)), 1);

    let int = u.basic(BasicKind::Int);
    let stop = nullary(&mut u, "Stop");
    assert!(matches!(
        u.add_method(int, stop),
        Err(TypeError::NotNamed { .. })
    ));
}

#[test]
fn methods_cannot_be_declared_on_named_interface_or_pointer() {
    let mut u = universe();
    let iface = ok(u.interface_of(vec![], vec![]));
    let name = u.interner().intern("I");
    let named_iface = ok(u.declare_named(name, None));
    ok(u.set_underlying(named_iface, iface));
    let m = nullary(&mut u, "M");
    assert!(matches!(
        u.add_method(named_iface, m.clone()),
        Err(TypeError::InvalidMethodOwner { kind: Kind::Interface, .. })
    ));

    let int = u.basic(BasicKind::Int);
    let pint = u.pointer_to(int);
    let pname = u.interner().intern("P");
    let p = ok(u.declare_named(pname, None));
    ok(u.set_underlying(p, pint));
    assert!(matches!(
        u.add_method(p, m),
        Err(TypeError::InvalidMethodOwner { kind: Kind::Ptr, .. })
    ));
}

#[test]
fn recursive_named_struct_has_a_representation() {
    let mut u = universe();
    let name = u.interner().intern("List");
    let next = u.interner().intern("next");
    let list = ok(u.declare_named(name, None));
    let plist = u.pointer_to(list);
    let body = u.struct_of(vec![FieldDecl {
        name: next,
        ty: plist,
        embedded: false,
    }]);
    ok(u.set_underlying(list, body));

    let repr = ok(u.repr_of(list));
    let ReprKind::Struct(fields) = &u.repr(repr).kind else {
        panic!("expected a struct representation");
    };
    let field_repr = fields[0].repr;
    assert_eq!(u.repr(field_repr).kind, ReprKind::Pointer(repr));
    assert_eq!(ok(u.repr_of(list)), repr);
}

#[test]
fn incomplete_named_type_has_no_representation() {
    let mut u = universe();
    let name = u.interner().intern("T");
    let t = ok(u.declare_named(name, None));
    assert!(matches!(u.repr_of(t), Err(TypeError::IncompleteType { .. })));
    assert!(matches!(u.descriptor(t), Err(TypeError::IncompleteType { .. })));
    // a later completion still works
    let int = u.basic(BasicKind::Int);
    ok(u.set_underlying(t, int));
    assert!(u.repr_of(t).is_ok());
}

#[test]
fn emulated_interface_layout() {
    let mut u = universe();
    let int = u.basic(BasicKind::Int);
    let area = u.interner().intern("Area");
    let perimeter = u.interner().intern("Perimeter");
    let iface = ok(u.interface_of(
        vec![
            MethodDecl::new(perimeter, Signature::new(vec![], vec![int])),
            MethodDecl::new(area, Signature::new(vec![int], vec![int])),
        ],
        vec![],
    ));
    let repr = ok(u.repr_of(iface));
    let fields = u
        .emulated_interface_fields(repr)
        .unwrap_or_else(|| panic!("not emulated"))
        .to_vec();

    assert_eq!(fields.len(), 2 + 2);
    assert_eq!(u.repr(fields[0].repr).kind, ReprKind::InterfaceHeader);
    assert!(matches!(u.repr(fields[1].repr).kind, ReprKind::Array { len: 0, .. }));
    assert_eq!(fields[2].name, area);
    // slot types never carry the receiver
    let ReprKind::Func(area_ty) = &u.repr(fields[2].repr).kind else {
        panic!("slot is not a func");
    };
    assert_eq!(area_ty.num_in(), 1);
    assert_eq!(fields[3].name, perimeter);
}

#[test]
fn native_interface_registration() {
    let mut u = universe();
    let close = nullary(&mut u, "Close");
    let hidden = nullary(&mut u, "reset");
    let iface = ok(u.interface_of(vec![hidden, close], vec![]));

    let repr = ok(u.register_native_interface(iface));
    let ReprKind::Interface(methods) = &u.repr(repr).kind else {
        panic!("expected a native interface");
    };
    assert_eq!(methods.len(), 1);
    assert!(u.emulated_interface_fields(repr).is_none());
    assert!(matches!(
        u.register_native_interface(iface),
        Err(TypeError::ReprAlreadyBuilt { .. })
    ));

    let int = u.basic(BasicKind::Int);
    assert!(matches!(
        u.register_native_interface(int),
        Err(TypeError::NotInterface { .. })
    ));
}

#[test]
fn bind_method_uses_receiver_representation() {
    let mut u = universe();
    let t = named_struct(&mut u, "T", vec![]);
    let value = nullary(&mut u, "Get");
    let mut pointer = nullary(&mut u, "Set");
    let pt = u.pointer_to(t);
    pointer.sig.recv = Some(pt);
    ok(u.add_method(t, value.clone()));
    ok(u.add_method(t, pointer.clone()));

    let f1 = u.alloc_func();
    let f2 = u.alloc_func();
    assert_ne!(f1, f2);
    let get = ok(u.bind_method(t, value.name, f1));
    let set = ok(u.bind_method(t, pointer.name, f2));

    let t_repr = ok(u.repr_of(t));
    let pt_repr = ok(u.repr_of(pt));
    assert_eq!(get.ty.params, vec![t_repr]);
    assert_eq!(set.ty.params, vec![pt_repr]);
    assert_eq!(u.repr(t_repr).method_by_name(value.name), Some(&get));
    assert_eq!(u.repr(pt_repr).method_by_name(pointer.name), Some(&set));
    assert!(u.repr(t_repr).method_by_name(pointer.name).is_none());

    let missing = u.interner().intern("Missing");
    assert!(matches!(
        u.bind_method(t, missing, f1),
        Err(TypeError::UndeclaredMethod { .. })
    ));
}

#[test]
fn descriptors_are_created_once() {
    let mut u = universe();
    let t = named_struct(&mut u, "T", vec![]);
    let repr = ok(u.descriptor(t)).repr();
    assert_eq!(ok(u.descriptor(t)).repr(), repr);
    assert_eq!(u.stats().descriptors, 1);

    let d = u.peek_descriptor(t).unwrap_or_else(|| panic!("missing descriptor"));
    assert_eq!(d.kind(), Kind::Struct);
    assert!(d.is_named());
    assert_eq!(d.slot_count(), 0);
}
