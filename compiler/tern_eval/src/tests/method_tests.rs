use pretty_assertions::assert_eq;
use tern_ir::{BinaryOp, ExprId, Name, StmtId};
use tern_types::{
    BasicKind, FieldDecl, MethodDecl, Signature, TypeError, TypeId, TypeUniverse, UniverseConfig,
};

use super::harness::{assert_kind, Ast};
use crate::{EvalErrorKind, FunctionValue, Interpreter, Value};

fn ok<T>(result: Result<T, TypeError>) -> T {
    result.unwrap_or_else(|e| panic!("unexpected type error: {e}"))
}

/// Method bodies, written as function literals with the receiver first.
struct Bodies {
    /// `func(r) { return r.W * r.H }`
    area: ExprId,
    /// `func(r, k) { return r.W * k }`
    scale: ExprId,
}

impl Bodies {
    fn new(ast: &mut Ast) -> Self {
        let r = ast.ident("r");
        let w = ast.selector(r, "W");
        let r = ast.ident("r");
        let h = ast.selector(r, "H");
        let product = ast.binary(BinaryOp::Mul, w, h);
        let ret = ast.ret(vec![product]);
        let area = ast.func_lit(&["r"], vec![ret]);

        let r = ast.ident("r");
        let w = ast.selector(r, "W");
        let k = ast.ident("k");
        let product = ast.binary(BinaryOp::Mul, w, k);
        let ret = ast.ret(vec![product]);
        let scale = ast.func_lit(&["r", "k"], vec![ret]);

        Bodies { area, scale }
    }
}

/// Type ids declared by [`declare_shapes`].
struct Shapes {
    rect: TypeId,
    square: TypeId,
    int: TypeId,
}

fn field(name: Name, ty: TypeId, embedded: bool) -> FieldDecl {
    FieldDecl { name, ty, embedded }
}

fn func_value(interp: &mut Interpreter<'_>, lit: ExprId) -> FunctionValue {
    match interp.eval(lit) {
        Ok(Value::Func(function)) => function,
        other => panic!("expected a function value, got {other:?}"),
    }
}

fn method_decl(interp: &Interpreter<'_>, name: &str, sig: Signature) -> MethodDecl {
    MethodDecl::new(interp.interner.intern(name), sig)
}

/// `type Rect struct { W, H int }` with `Area() int` on the value and
/// `Scale(k int) int` on the pointer, plus `type Square struct { Rect }`.
fn declare_shapes(interp: &mut Interpreter<'_>, bodies: &Bodies) -> Shapes {
    let (rect, square, int) = interp.universe.write(|u| {
        let int = u.basic(BasicKind::Int);
        let (w, h) = (u.interner().intern("W"), u.interner().intern("H"));
        let rect_name = u.interner().intern("Rect");
        let rect = ok(u.declare_named(rect_name, None));
        let body = u.struct_of(vec![field(w, int, false), field(h, int, false)]);
        ok(u.set_underlying(rect, body));

        let square_name = u.interner().intern("Square");
        let square = ok(u.declare_named(square_name, None));
        let body = u.struct_of(vec![field(rect_name, rect, true)]);
        ok(u.set_underlying(square, body));
        (rect, square, int)
    });

    let area = func_value(interp, bodies.area);
    let decl = method_decl(interp, "Area", Signature::new(vec![], vec![int]));
    let index = interp
        .declare_method(rect, decl, area, false)
        .unwrap_or_else(|e| panic!("declaring Area failed: {e}"));
    assert_eq!(index, 0);

    let scale = func_value(interp, bodies.scale);
    let decl = method_decl(interp, "Scale", Signature::new(vec![int], vec![int]));
    let index = interp
        .declare_method(rect, decl, scale, true)
        .unwrap_or_else(|e| panic!("declaring Scale failed: {e}"));
    assert_eq!(index, 1);

    Shapes { rect, square, int }
}

/// `r := Rect{3, 4}`
fn define_rect(ast: &mut Ast) -> StmtId {
    let three = ast.int(3);
    let four = ast.int(4);
    let lit = ast.composite("Rect", vec![three, four]);
    ast.define(&["r"], vec![lit])
}

/// `s := Square{Rect{3, 4}}`
fn define_square(ast: &mut Ast) -> StmtId {
    let three = ast.int(3);
    let four = ast.int(4);
    let inner = ast.composite("Rect", vec![three, four]);
    let lit = ast.composite("Square", vec![inner]);
    ast.define(&["s"], vec![lit])
}

fn run(interp: &mut Interpreter<'_>, program: &[StmtId]) -> Value {
    interp
        .run_program(program)
        .unwrap_or_else(|e| panic!("program failed: {e}"))
}

mod dispatch_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn value_and_pointer_receivers() {
        let mut ast = Ast::new();
        let bodies = Bodies::new(&mut ast);
        let def = define_rect(&mut ast);
        let area = ast.method_call("r", "Area", vec![]);
        let area = ast.expr_stmt(area);
        let two = ast.int(2);
        let scale = ast.method_call("r", "Scale", vec![two]);
        let scale = ast.expr_stmt(scale);

        let mut interp = ast.interpreter();
        declare_shapes(&mut interp, &bodies);
        assert_eq!(run(&mut interp, &[def, area]), Value::int(12));
        assert_eq!(run(&mut interp, &[scale]), Value::int(6));
    }

    #[test]
    fn promoted_method_receives_embedded_value() {
        let mut ast = Ast::new();
        let bodies = Bodies::new(&mut ast);
        let def = define_square(&mut ast);
        let area = ast.method_call("s", "Area", vec![]);
        let area = ast.expr_stmt(area);

        let mut interp = ast.interpreter();
        declare_shapes(&mut interp, &bodies);
        assert_eq!(run(&mut interp, &[def, area]), Value::int(12));
    }

    #[test]
    fn promoted_and_embedded_fields() {
        let mut ast = Ast::new();
        let bodies = Bodies::new(&mut ast);
        let def = define_square(&mut ast);
        let s = ast.ident("s");
        let w = ast.selector(s, "W");
        let w = ast.expr_stmt(w);
        let s = ast.ident("s");
        let inner = ast.selector(s, "Rect");
        let h = ast.selector(inner, "H");
        let h = ast.expr_stmt(h);

        let mut interp = ast.interpreter();
        declare_shapes(&mut interp, &bodies);
        assert_eq!(run(&mut interp, &[def, w]), Value::int(3));
        assert_eq!(run(&mut interp, &[h]), Value::int(4));
    }

    #[test]
    fn method_value_can_be_stored_and_called_later() {
        // f := r.Area; f()
        let mut ast = Ast::new();
        let bodies = Bodies::new(&mut ast);
        let def = define_rect(&mut ast);
        let r = ast.ident("r");
        let area = ast.selector(r, "Area");
        let store = ast.define(&["f"], vec![area]);
        let call = ast.call_named("f", vec![]);
        let call = ast.expr_stmt(call);

        let mut interp = ast.interpreter();
        declare_shapes(&mut interp, &bodies);
        assert_eq!(run(&mut interp, &[def, store, call]), Value::int(12));
    }

    #[test]
    fn method_arguments_are_checked() {
        let mut ast = Ast::new();
        let bodies = Bodies::new(&mut ast);
        let def = define_rect(&mut ast);
        let scale = ast.method_call("r", "Scale", vec![]);
        let scale = ast.expr_stmt(scale);

        let mut interp = ast.interpreter();
        declare_shapes(&mut interp, &bodies);
        let err = interp
            .run_program(&[def, scale])
            .err()
            .unwrap_or_else(|| panic!("expected an arity error"));
        assert_eq!(err.message, "Scale expects 2 arguments, got 1");
    }

    #[test]
    fn resolved_slots_are_cached() {
        let mut ast = Ast::new();
        let bodies = Bodies::new(&mut ast);
        let def = define_rect(&mut ast);
        let first = ast.method_call("r", "Area", vec![]);
        let first = ast.expr_stmt(first);
        let second = ast.method_call("r", "Area", vec![]);
        let second = ast.expr_stmt(second);

        let mut interp = ast.interpreter();
        declare_shapes(&mut interp, &bodies);
        run(&mut interp, &[def, first, second]);
        assert_eq!(
            interp.universe.read(TypeUniverse::stats).slots_synthesized,
            1
        );
    }

    #[test]
    fn thread_safe_universe_dispatches_the_same() {
        let mut ast = Ast::new();
        let bodies = Bodies::new(&mut ast);
        let def = define_square(&mut ast);
        let area = ast.method_call("s", "Area", vec![]);
        let area = ast.expr_stmt(area);

        let mut interp = ast
            .builder()
            .universe_config(UniverseConfig { thread_safe: true })
            .build();
        assert!(interp.universe.is_thread_safe());
        declare_shapes(&mut interp, &bodies);
        assert_eq!(run(&mut interp, &[def, area]), Value::int(12));
    }
}

mod universe_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn declared_methods_are_counted() {
        let mut ast = Ast::new();
        let bodies = Bodies::new(&mut ast);
        let mut interp = ast.interpreter();
        let Shapes { rect, square, .. } = declare_shapes(&mut interp, &bodies);
        interp.universe.read(|u| {
            assert_eq!(u.num_method(rect), 2);
            assert_eq!(u.num_explicit_method(rect), 2);
            assert_eq!(u.num_method(square), 0);
            assert_eq!(u.num_all_method(square), 2);
        });
    }

    #[test]
    fn method_strings_include_receiver() {
        let mut ast = Ast::new();
        let bodies = Bodies::new(&mut ast);
        let mut interp = ast.interpreter();
        let Shapes { rect, .. } = declare_shapes(&mut interp, &bodies);
        let area = ok(interp.universe.method(rect, 0));
        let scale = ok(interp.universe.method(rect, 1));
        assert!(area.func.is_some());
        assert!(scale.func.is_some());
        interp.universe.read(|u| {
            assert_eq!(u.method_string(&area), "Area func(Rect) int");
            assert_eq!(u.method_string(&scale), "Scale func(*Rect, int) int");
        });
    }

    #[test]
    fn interface_counts_all_methods() {
        // type Shape interface { Area() int; Scale(int) int; Named }
        let mut ast = Ast::new();
        let bodies = Bodies::new(&mut ast);
        let mut interp = ast.interpreter();
        let Shapes { int, .. } = declare_shapes(&mut interp, &bodies);
        let (area, scale, name) = (
            method_decl(&interp, "Area", Signature::new(vec![], vec![int])),
            method_decl(&interp, "Scale", Signature::new(vec![int], vec![int])),
            method_decl(&interp, "Name", Signature::default()),
        );
        interp.universe.write(|u| {
            let named = ok(u.interface_of(vec![name], vec![]));
            let shape = ok(u.interface_of(vec![scale, area], vec![named]));
            assert_eq!(u.num_method(shape), 3);
            assert_eq!(u.num_explicit_method(shape), 2);
            assert_eq!(u.num_all_method(shape), 3);
            let first = ok(u.method(shape, 0));
            assert_eq!(u.interner().lookup(first.name), "Area");
            assert!(first.func.is_none());
        });
    }
}

mod error_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn receiver_counts_toward_arity() {
        let mut ast = Ast::new();
        let bodies = Bodies::new(&mut ast);
        let mut interp = ast.interpreter();
        let Shapes { rect, int, .. } = declare_shapes(&mut interp, &bodies);
        // Scale's literal takes the receiver and one argument
        let scale = func_value(&mut interp, bodies.scale);
        let decl = method_decl(&interp, "Grow", Signature::new(vec![int, int], vec![]));
        let err = interp
            .declare_method(rect, decl, scale, false)
            .err()
            .unwrap_or_else(|| panic!("expected an arity error"));
        assert_kind(
            &err,
            &EvalErrorKind::ArityMismatch {
                name: "Grow".to_string(),
                expected: 3,
                got: 2,
            },
        );
    }

    #[test]
    fn duplicate_method_is_a_type_system_error() {
        let mut ast = Ast::new();
        let bodies = Bodies::new(&mut ast);
        let mut interp = ast.interpreter();
        let Shapes { rect, int, .. } = declare_shapes(&mut interp, &bodies);
        let area = func_value(&mut interp, bodies.area);
        let decl = method_decl(&interp, "Area", Signature::new(vec![], vec![int]));
        let err = interp
            .declare_method(rect, decl, area, false)
            .err()
            .unwrap_or_else(|| panic!("expected a duplicate method error"));
        assert!(err.is_fatal());
    }

    #[test]
    fn unknown_selector() {
        let mut ast = Ast::new();
        let bodies = Bodies::new(&mut ast);
        let def = define_rect(&mut ast);
        let r = ast.ident("r");
        let missing = ast.selector(r, "Depth");
        let missing = ast.expr_stmt(missing);

        let mut interp = ast.interpreter();
        declare_shapes(&mut interp, &bodies);
        let err = interp
            .run_program(&[def, missing])
            .err()
            .unwrap_or_else(|| panic!("expected an undefined field"));
        assert_kind(
            &err,
            &EvalErrorKind::UndefinedField {
                field: "Depth".to_string(),
                type_name: "Rect".to_string(),
            },
        );
    }

    #[test]
    fn unbound_unexported_method() {
        let mut ast = Ast::new();
        let bodies = Bodies::new(&mut ast);
        let def = define_rect(&mut ast);
        let call = ast.method_call("r", "hidden", vec![]);
        let call = ast.expr_stmt(call);

        let mut interp = ast.interpreter();
        let Shapes { rect, .. } = declare_shapes(&mut interp, &bodies);
        let decl = method_decl(&interp, "hidden", Signature::default());
        ok(interp.universe.write(|u| u.add_method(rect, decl)));
        let err = interp
            .run_program(&[def, call])
            .err()
            .unwrap_or_else(|| panic!("expected a missing implementation"));
        assert_eq!(err.message, "method hidden of Rect has no implementation");
    }

    #[test]
    fn composite_literals_are_checked() {
        let mut ast = Ast::new();
        let bodies = Bodies::new(&mut ast);
        let one = ast.int(1);
        let short = ast.composite("Rect", vec![one]);
        let one = ast.int(1);
        let unknown = ast.composite("Circle", vec![one]);

        let mut interp = ast.interpreter();
        declare_shapes(&mut interp, &bodies);
        let err = interp
            .eval(short)
            .err()
            .unwrap_or_else(|| panic!("expected a field count error"));
        assert_kind(
            &err,
            &EvalErrorKind::AssignmentMismatch {
                names: 2,
                values: 1,
            },
        );
        let err = interp
            .eval(unknown)
            .err()
            .unwrap_or_else(|| panic!("expected an undefined type"));
        assert_eq!(err.message, "undefined type: Circle");
    }

    #[test]
    fn only_structs_have_fields() {
        let mut ast = Ast::new();
        let five = ast.int(5);
        let sel = ast.selector(five, "W");
        let err = ast
            .interpreter()
            .eval(sel)
            .err()
            .unwrap_or_else(|| panic!("expected an undefined field"));
        assert_eq!(err.message, "int has no field or method W");
    }
}
