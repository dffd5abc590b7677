//! End-to-end tests: assemble KYC module images, run them through the
//! full pipeline, and assert on printed output or the reported failure.

mod support;

use kyro::{CollectStringPrint, ExcType, Exception, LoadError, RunFailure, Runner};
use pretty_assertions::assert_eq;
use support::*;

/// Runs a module body, expecting a clean exit; returns printed output.
fn run_ok(code: &CodeBld) -> String {
    let image = module_image(code);
    let runner = Runner::load(&image).expect("module image failed to load");
    let mut print = CollectStringPrint::new();
    runner.run(&mut print).expect("module raised unexpectedly");
    print.into_output()
}

/// Runs a module body, expecting an unhandled guest exception.
fn run_exc(code: &CodeBld) -> Exception {
    let image = module_image(code);
    let runner = Runner::load(&image).expect("module image failed to load");
    let mut print = CollectStringPrint::new();
    match runner.run(&mut print) {
        Err(RunFailure::Exception(exc)) => exc,
        Ok(()) => panic!("module exited cleanly, output: {:?}", print.output()),
        Err(RunFailure::Fatal(fault)) => panic!("engine fault instead of guest exception: {fault}"),
    }
}

#[test]
fn print_upper_on_a_string_literal() {
    // print("HELLO".upper())
    let mut module = CodeBld::module();
    module.names = vec!["print", "upper"];
    module.consts = vec![Obj::Str("hello"), Obj::None];
    module.instrs = vec![
        (LOAD_NAME, 0),
        (LOAD_CONST, 0),
        (LOAD_METHOD, 1),
        (CALL_METHOD, 0),
        (CALL_FUNCTION, 1),
        (POP_TOP, 0),
        (LOAD_CONST, 1),
        (RETURN_VALUE, 0),
    ];
    assert_eq!(run_ok(&module), "HELLO\n");
}

#[test]
fn module_level_names_and_addition() {
    // x = 1; y = 2; print(x + y)
    let mut module = CodeBld::module();
    module.names = vec!["x", "y", "print"];
    module.consts = vec![Obj::Int(1), Obj::Int(2), Obj::None];
    module.instrs = vec![
        (LOAD_CONST, 0),
        (STORE_NAME, 0),
        (LOAD_CONST, 1),
        (STORE_NAME, 1),
        (LOAD_NAME, 2),
        (LOAD_NAME, 0),
        (LOAD_NAME, 1),
        (BINARY_ADD, 0),
        (CALL_FUNCTION, 1),
        (POP_TOP, 0),
        (LOAD_CONST, 2),
        (RETURN_VALUE, 0),
    ];
    assert_eq!(run_ok(&module), "3\n");
}

/// `def f(a, b): return a + b`, assembled.
fn adder_function() -> CodeBld {
    let mut f = CodeBld::new("f");
    f.argcount = 2;
    f.nlocals = 2;
    f.varnames = vec!["a", "b"];
    f.instrs = vec![
        (LOAD_FAST, 0),
        (LOAD_FAST, 1),
        (BINARY_ADD, 0),
        (RETURN_VALUE, 0),
    ];
    f
}

#[test]
fn defaults_fill_missing_positionals() {
    // def f(a, b=10): return a + b
    // print(f(5)); print(f(5, 7))
    let mut module = CodeBld::module();
    module.names = vec!["f", "print"];
    module.consts = vec![
        Obj::Tuple(vec![Obj::Int(10)]),
        Obj::Code(adder_function()),
        Obj::Str("f"),
        Obj::Int(5),
        Obj::Int(7),
        Obj::None,
    ];
    module.instrs = vec![
        (LOAD_CONST, 0),
        (LOAD_CONST, 1),
        (LOAD_CONST, 2),
        (MAKE_FUNCTION, 0x01),
        (STORE_NAME, 0),
        (LOAD_NAME, 1),
        (LOAD_NAME, 0),
        (LOAD_CONST, 3),
        (CALL_FUNCTION, 1),
        (CALL_FUNCTION, 1),
        (POP_TOP, 0),
        (LOAD_NAME, 1),
        (LOAD_NAME, 0),
        (LOAD_CONST, 3),
        (LOAD_CONST, 4),
        (CALL_FUNCTION, 2),
        (CALL_FUNCTION, 1),
        (POP_TOP, 0),
        (LOAD_CONST, 5),
        (RETURN_VALUE, 0),
    ];
    assert_eq!(run_ok(&module), "15\n12\n");
}

#[test]
fn int_constructor_failure_is_a_value_error() {
    // print(int("abc"))
    let mut module = CodeBld::module();
    module.names = vec!["print", "int"];
    module.consts = vec![Obj::Str("abc"), Obj::None];
    module.instrs = vec![
        (LOAD_NAME, 0),
        (LOAD_NAME, 1),
        (LOAD_CONST, 0),
        (CALL_FUNCTION, 1),
        (CALL_FUNCTION, 1),
        (POP_TOP, 0),
        (LOAD_CONST, 1),
        (RETURN_VALUE, 0),
    ];
    let exc = run_exc(&module);
    assert_eq!(exc.exc_type(), ExcType::ValueError);
    assert!(exc.message().unwrap().contains("'abc'"));
    let rendered = exc.to_string();
    assert!(rendered.contains("ValueError"));
    assert!(rendered.contains("'abc'"));
}

#[test]
fn unknown_name_is_a_name_error_with_traceback() {
    // print(nonexistent)
    let mut module = CodeBld::module();
    module.names = vec!["print", "nonexistent"];
    module.consts = vec![Obj::None];
    module.instrs = vec![
        (LOAD_NAME, 0),
        (LOAD_NAME, 1),
        (CALL_FUNCTION, 1),
        (POP_TOP, 0),
        (LOAD_CONST, 0),
        (RETURN_VALUE, 0),
    ];
    let exc = run_exc(&module);
    assert_eq!(exc.exc_type(), ExcType::NameError);
    assert_eq!(exc.message(), Some("name 'nonexistent' is not defined"));
    assert_eq!(exc.traceback().len(), 1);
    assert_eq!(exc.traceback()[0].filename, "test.kyc");
    assert_eq!(exc.traceback()[0].code_name, "<module>");
    let rendered = exc.to_string();
    assert!(rendered.contains("Traceback (most recent call last):"));
    assert!(rendered.contains("NameError: name 'nonexistent' is not defined"));
}

#[test]
fn bad_magic_fails_before_the_interpreter() {
    let mut image = module_image(&CodeBld::module());
    image[0] = b'X';
    let err = Runner::load(&image).unwrap_err();
    assert_eq!(err, LoadError::BadMagic { found: *b"XYC" });
    assert!(err.to_string().contains("bad magic"));
}

#[test]
fn module_store_is_visible_from_function_frames() {
    // x = 41
    // def g(): return x
    // print(g())
    let mut g = CodeBld::new("g");
    g.names = vec!["x"];
    g.instrs = vec![(LOAD_GLOBAL, 0), (RETURN_VALUE, 0)];

    let mut module = CodeBld::module();
    module.names = vec!["x", "g", "print"];
    module.consts = vec![Obj::Int(41), Obj::Code(g), Obj::Str("g"), Obj::None];
    module.instrs = vec![
        (LOAD_CONST, 0),
        (STORE_NAME, 0),
        (LOAD_CONST, 1),
        (LOAD_CONST, 2),
        (MAKE_FUNCTION, 0),
        (STORE_NAME, 1),
        (LOAD_NAME, 2),
        (LOAD_NAME, 1),
        (CALL_FUNCTION, 0),
        (CALL_FUNCTION, 1),
        (POP_TOP, 0),
        (LOAD_CONST, 3),
        (RETURN_VALUE, 0),
    ];
    assert_eq!(run_ok(&module), "41\n");
}

#[test]
fn attribute_access_yields_a_callable_bound_method() {
    // f = "Hello".lower; print(f())
    let mut module = CodeBld::module();
    module.names = vec!["lower", "f", "print"];
    module.consts = vec![Obj::Str("Hello"), Obj::None];
    module.instrs = vec![
        (LOAD_CONST, 0),
        (LOAD_ATTR, 0),
        (STORE_NAME, 1),
        (LOAD_NAME, 2),
        (LOAD_NAME, 1),
        (CALL_FUNCTION, 0),
        (CALL_FUNCTION, 1),
        (POP_TOP, 0),
        (LOAD_CONST, 1),
        (RETURN_VALUE, 0),
    ];
    assert_eq!(run_ok(&module), "hello\n");
}

#[test]
fn keyword_call_binds_by_name_and_applies_defaults() {
    // def f(a, b=1, c=2): return (a, b, c)
    // print(f(1, c=5))
    let mut f = CodeBld::new("f");
    f.argcount = 3;
    f.nlocals = 3;
    f.varnames = vec!["a", "b", "c"];
    f.instrs = vec![
        (LOAD_FAST, 0),
        (LOAD_FAST, 1),
        (LOAD_FAST, 2),
        (BUILD_TUPLE, 3),
        (RETURN_VALUE, 0),
    ];

    let mut module = CodeBld::module();
    module.names = vec!["f", "print"];
    module.consts = vec![
        Obj::Tuple(vec![Obj::Int(1), Obj::Int(2)]),
        Obj::Code(f),
        Obj::Str("f"),
        Obj::Int(1),
        Obj::Int(5),
        Obj::Tuple(vec![Obj::Str("c")]),
        Obj::None,
    ];
    module.instrs = vec![
        (LOAD_CONST, 0),
        (LOAD_CONST, 1),
        (LOAD_CONST, 2),
        (MAKE_FUNCTION, 0x01),
        (STORE_NAME, 0),
        (LOAD_NAME, 1),
        (LOAD_NAME, 0),
        (LOAD_CONST, 3), // positional a=1
        (LOAD_CONST, 4), // keyword value for c
        (LOAD_CONST, 5), // keyword names tuple ("c",)
        (CALL_FUNCTION_KW, 2),
        (CALL_FUNCTION, 1),
        (POP_TOP, 0),
        (LOAD_CONST, 6),
        (RETURN_VALUE, 0),
    ];
    assert_eq!(run_ok(&module), "(1, 1, 5)\n");
}

#[test]
fn star_args_collects_excess_positionals() {
    // def f(a, *rest): return rest
    // print(f(1, 2, 3))
    let mut f = CodeBld::new("f");
    f.argcount = 1;
    f.nlocals = 2;
    f.flags = CO_VARARGS;
    f.varnames = vec!["a", "rest"];
    f.instrs = vec![(LOAD_FAST, 1), (RETURN_VALUE, 0)];

    let mut module = CodeBld::module();
    module.names = vec!["f", "print"];
    module.consts = vec![
        Obj::Code(f),
        Obj::Str("f"),
        Obj::Int(1),
        Obj::Int(2),
        Obj::Int(3),
        Obj::None,
    ];
    module.instrs = vec![
        (LOAD_CONST, 0),
        (LOAD_CONST, 1),
        (MAKE_FUNCTION, 0),
        (STORE_NAME, 0),
        (LOAD_NAME, 1),
        (LOAD_NAME, 0),
        (LOAD_CONST, 2),
        (LOAD_CONST, 3),
        (LOAD_CONST, 4),
        (CALL_FUNCTION, 3),
        (CALL_FUNCTION, 1),
        (POP_TOP, 0),
        (LOAD_CONST, 5),
        (RETURN_VALUE, 0),
    ];
    assert_eq!(run_ok(&module), "(2, 3)\n");
}

#[test]
fn keyword_star_collects_unknown_keywords() {
    // def f(**kw): return kw
    // print(f(x=1))
    let mut f = CodeBld::new("f");
    f.nlocals = 1;
    f.flags = CO_VARKEYWORDS;
    f.varnames = vec!["kw"];
    f.instrs = vec![(LOAD_FAST, 0), (RETURN_VALUE, 0)];

    let mut module = CodeBld::module();
    module.names = vec!["f", "print"];
    module.consts = vec![
        Obj::Code(f),
        Obj::Str("f"),
        Obj::Int(1),
        Obj::Tuple(vec![Obj::Str("x")]),
        Obj::None,
    ];
    module.instrs = vec![
        (LOAD_CONST, 0),
        (LOAD_CONST, 1),
        (MAKE_FUNCTION, 0),
        (STORE_NAME, 0),
        (LOAD_NAME, 1),
        (LOAD_NAME, 0),
        (LOAD_CONST, 2),
        (LOAD_CONST, 3),
        (CALL_FUNCTION_KW, 1),
        (CALL_FUNCTION, 1),
        (POP_TOP, 0),
        (LOAD_CONST, 4),
        (RETURN_VALUE, 0),
    ];
    assert_eq!(run_ok(&module), "{'x': 1}\n");
}

#[test]
fn uncaught_exception_unwinds_every_frame() {
    // def c(): raise ValueError("boom")
    // def b(): return c()
    // def a(): return b()
    // a()
    let mut c = CodeBld::new("c");
    c.names = vec!["ValueError"];
    c.consts = vec![Obj::Str("boom")];
    c.firstlineno = 30;
    c.instrs = vec![
        (LOAD_GLOBAL, 0),
        (LOAD_CONST, 0),
        (CALL_FUNCTION, 1),
        (RAISE_VARARGS, 1),
    ];

    let mut b = CodeBld::new("b");
    b.names = vec!["c"];
    b.firstlineno = 20;
    b.instrs = vec![(LOAD_GLOBAL, 0), (CALL_FUNCTION, 0), (RETURN_VALUE, 0)];

    let mut a = CodeBld::new("a");
    a.names = vec!["b"];
    a.firstlineno = 10;
    a.instrs = vec![(LOAD_GLOBAL, 0), (CALL_FUNCTION, 0), (RETURN_VALUE, 0)];

    let mut module = CodeBld::module();
    module.names = vec!["c", "b", "a"];
    module.consts = vec![
        Obj::Code(c),
        Obj::Str("c"),
        Obj::Code(b),
        Obj::Str("b"),
        Obj::Code(a),
        Obj::Str("a"),
        Obj::None,
    ];
    module.instrs = vec![
        (LOAD_CONST, 0),
        (LOAD_CONST, 1),
        (MAKE_FUNCTION, 0),
        (STORE_NAME, 0),
        (LOAD_CONST, 2),
        (LOAD_CONST, 3),
        (MAKE_FUNCTION, 0),
        (STORE_NAME, 1),
        (LOAD_CONST, 4),
        (LOAD_CONST, 5),
        (MAKE_FUNCTION, 0),
        (STORE_NAME, 2),
        (LOAD_NAME, 2),
        (CALL_FUNCTION, 0),
        (POP_TOP, 0),
        (LOAD_CONST, 6),
        (RETURN_VALUE, 0),
    ];
    let exc = run_exc(&module);
    assert_eq!(exc.exc_type(), ExcType::ValueError);
    assert_eq!(exc.message(), Some("boom"));
    let code_names: Vec<&str> = exc.traceback().iter().map(|f| f.code_name.as_str()).collect();
    assert_eq!(code_names, vec!["<module>", "a", "b", "c"]);
    let linenos: Vec<u32> = exc.traceback().iter().map(|f| f.lineno).collect();
    assert_eq!(linenos, vec![1, 10, 20, 30]);
}

#[test]
fn oversupplying_a_function_is_a_type_error() {
    // def f(a, b): return a + b
    // f(1, 2, 3)
    let mut module = CodeBld::module();
    module.names = vec!["f"];
    module.consts = vec![
        Obj::Code(adder_function()),
        Obj::Str("f"),
        Obj::Int(1),
        Obj::Int(2),
        Obj::Int(3),
        Obj::None,
    ];
    module.instrs = vec![
        (LOAD_CONST, 0),
        (LOAD_CONST, 1),
        (MAKE_FUNCTION, 0),
        (STORE_NAME, 0),
        (LOAD_NAME, 0),
        (LOAD_CONST, 2),
        (LOAD_CONST, 3),
        (LOAD_CONST, 4),
        (CALL_FUNCTION, 3),
        (POP_TOP, 0),
        (LOAD_CONST, 5),
        (RETURN_VALUE, 0),
    ];
    let exc = run_exc(&module);
    assert_eq!(exc.exc_type(), ExcType::TypeError);
    assert_eq!(
        exc.message(),
        Some("f() takes 2 positional arguments but 3 were given")
    );
}

#[test]
fn containers_build_and_subscript() {
    // print({"k": 1}["k"] + [10, 20][1] + (1,)[0])
    let mut module = CodeBld::module();
    module.names = vec!["print"];
    module.consts = vec![
        Obj::Str("k"),
        Obj::Int(1),
        Obj::Int(10),
        Obj::Int(20),
        Obj::Int(0),
        Obj::None,
    ];
    module.instrs = vec![
        (LOAD_NAME, 0),
        (LOAD_CONST, 0),
        (LOAD_CONST, 1),
        (BUILD_MAP, 1),
        (LOAD_CONST, 0),
        (BINARY_SUBSCR, 0),
        (LOAD_CONST, 2),
        (LOAD_CONST, 3),
        (BUILD_LIST, 2),
        (LOAD_CONST, 1),
        (BINARY_SUBSCR, 0),
        (BINARY_ADD, 0),
        (LOAD_CONST, 1),
        (BUILD_TUPLE, 1),
        (LOAD_CONST, 4),
        (BINARY_SUBSCR, 0),
        (BINARY_ADD, 0),
        (CALL_FUNCTION, 1),
        (POP_TOP, 0),
        (LOAD_CONST, 5),
        (RETURN_VALUE, 0),
    ];
    assert_eq!(run_ok(&module), "22\n");
}

#[test]
fn comparison_drives_conditional_jumps() {
    // print(1 if 2 < 3 else 0)
    let mut module = CodeBld::module();
    module.names = vec!["print"];
    module.consts = vec![Obj::Int(2), Obj::Int(3), Obj::Int(1), Obj::Int(0), Obj::None];
    module.instrs = vec![
        (LOAD_NAME, 0),        // 0
        (LOAD_CONST, 0),       // 1
        (LOAD_CONST, 1),       // 2
        (COMPARE_OP, 0),       // 3: <
        (POP_JUMP_IF_FALSE, 7), // 4
        (LOAD_CONST, 2),       // 5
        (JUMP_ABSOLUTE, 8),    // 6
        (LOAD_CONST, 3),       // 7
        (CALL_FUNCTION, 1),    // 8
        (POP_TOP, 0),          // 9
        (LOAD_CONST, 4),       // 10
        (RETURN_VALUE, 0),     // 11
    ];
    assert_eq!(run_ok(&module), "1\n");
}

#[test]
fn backward_jumps_run_loops() {
    // i = 0
    // while i < 3: i = i + 1
    // print(i)
    let mut module = CodeBld::module();
    module.names = vec!["print"];
    module.nlocals = 1;
    module.varnames = vec!["i"];
    module.consts = vec![Obj::Int(0), Obj::Int(3), Obj::Int(1), Obj::None];
    module.instrs = vec![
        (LOAD_CONST, 0),        // 0
        (STORE_FAST, 0),        // 1
        (LOAD_FAST, 0),         // 2: loop head
        (LOAD_CONST, 1),        // 3
        (COMPARE_OP, 0),        // 4: <
        (POP_JUMP_IF_FALSE, 11), // 5
        (LOAD_FAST, 0),         // 6
        (LOAD_CONST, 2),        // 7
        (BINARY_ADD, 0),        // 8
        (STORE_FAST, 0),        // 9
        (JUMP_ABSOLUTE, 2),     // 10
        (LOAD_NAME, 0),         // 11
        (LOAD_FAST, 0),         // 12
        (CALL_FUNCTION, 1),     // 13
        (POP_TOP, 0),           // 14
        (LOAD_CONST, 3),        // 15
        (RETURN_VALUE, 0),      // 16
    ];
    assert_eq!(run_ok(&module), "3\n");
}

#[test]
fn raise_at_module_scope_renders_a_traceback() {
    // raise ValueError("boom")
    let mut module = CodeBld::module();
    module.names = vec!["ValueError"];
    module.consts = vec![Obj::Str("boom")];
    module.instrs = vec![
        (LOAD_NAME, 0),
        (LOAD_CONST, 0),
        (CALL_FUNCTION, 1),
        (RAISE_VARARGS, 1),
    ];
    let exc = run_exc(&module);
    let rendered = exc.to_string();
    assert!(rendered.contains("Traceback (most recent call last):"));
    assert!(rendered.contains("  File \"test.kyc\", line 1, in <module>"));
    assert!(rendered.ends_with("ValueError: boom"));
}

#[test]
fn unassigned_function_local_raises_unbound_local_error() {
    // def f(): return v   (v never assigned)
    let mut f = CodeBld::new("f");
    f.nlocals = 1;
    f.varnames = vec!["v"];
    f.instrs = vec![(LOAD_FAST, 0), (RETURN_VALUE, 0)];

    let mut module = CodeBld::module();
    module.names = vec!["f"];
    module.consts = vec![Obj::Code(f), Obj::Str("f"), Obj::None];
    module.instrs = vec![
        (LOAD_CONST, 0),
        (LOAD_CONST, 1),
        (MAKE_FUNCTION, 0),
        (STORE_NAME, 0),
        (LOAD_NAME, 0),
        (CALL_FUNCTION, 0),
        (POP_TOP, 0),
        (LOAD_CONST, 2),
        (RETURN_VALUE, 0),
    ];
    let exc = run_exc(&module);
    assert_eq!(exc.exc_type(), ExcType::UnboundLocalError);
    assert!(exc.message().unwrap().contains("'v'"));
}

#[test]
fn print_accepts_sep_and_end_keywords() {
    // print("x", "y", sep="--", end="!")
    let mut module = CodeBld::module();
    module.names = vec!["print"];
    module.consts = vec![
        Obj::Str("x"),
        Obj::Str("y"),
        Obj::Str("--"),
        Obj::Str("!"),
        Obj::Tuple(vec![Obj::Str("sep"), Obj::Str("end")]),
        Obj::None,
    ];
    module.instrs = vec![
        (LOAD_NAME, 0),
        (LOAD_CONST, 0),
        (LOAD_CONST, 1),
        (LOAD_CONST, 2),
        (LOAD_CONST, 3),
        (LOAD_CONST, 4),
        (CALL_FUNCTION_KW, 4),
        (POP_TOP, 0),
        (LOAD_CONST, 5),
        (RETURN_VALUE, 0),
    ];
    assert_eq!(run_ok(&module), "x--y!");
}

#[test]
fn list_mutation_is_visible_through_every_alias() {
    // l = [1]; m = l; m.append(2); print(l, len(l))
    let mut module = CodeBld::module();
    module.names = vec!["l", "m", "append", "print", "len"];
    module.consts = vec![Obj::Int(1), Obj::Int(2), Obj::None];
    module.instrs = vec![
        (LOAD_CONST, 0),
        (BUILD_LIST, 1),
        (STORE_NAME, 0),
        (LOAD_NAME, 0),
        (STORE_NAME, 1),
        (LOAD_NAME, 1),
        (LOAD_METHOD, 2),
        (LOAD_CONST, 1),
        (CALL_METHOD, 1),
        (POP_TOP, 0),
        (LOAD_NAME, 3),
        (LOAD_NAME, 0),
        (LOAD_NAME, 4),
        (LOAD_NAME, 0),
        (CALL_FUNCTION, 1),
        (CALL_FUNCTION, 2),
        (POP_TOP, 0),
        (LOAD_CONST, 2),
        (RETURN_VALUE, 0),
    ];
    assert_eq!(run_ok(&module), "[1, 2] 2\n");
}

#[test]
fn dict_and_str_methods_compose() {
    // d = {"a": 1}; d.update({"b": 2}); print(d.keys(), " - ".join(["x", "y"]))
    let mut module = CodeBld::module();
    module.names = vec!["d", "update", "print", "keys", "join"];
    module.consts = vec![
        Obj::Str("a"),
        Obj::Int(1),
        Obj::Str("b"),
        Obj::Int(2),
        Obj::Str(" - "),
        Obj::Str("x"),
        Obj::Str("y"),
        Obj::None,
    ];
    module.instrs = vec![
        (LOAD_CONST, 0),
        (LOAD_CONST, 1),
        (BUILD_MAP, 1),
        (STORE_NAME, 0),
        (LOAD_NAME, 0),
        (LOAD_METHOD, 1),
        (LOAD_CONST, 2),
        (LOAD_CONST, 3),
        (BUILD_MAP, 1),
        (CALL_METHOD, 1),
        (POP_TOP, 0),
        (LOAD_NAME, 2),
        (LOAD_NAME, 0),
        (LOAD_METHOD, 3),
        (CALL_METHOD, 0),
        (LOAD_CONST, 4),
        (LOAD_METHOD, 4),
        (LOAD_CONST, 5),
        (LOAD_CONST, 6),
        (BUILD_LIST, 2),
        (CALL_METHOD, 1),
        (CALL_FUNCTION, 2),
        (POP_TOP, 0),
        (LOAD_CONST, 7),
        (RETURN_VALUE, 0),
    ];
    assert_eq!(run_ok(&module), "['a', 'b'] x - y\n");
}

#[test]
fn raise_with_cause_chains_exceptions() {
    // raise ValueError("outer") from TypeError
    let mut module = CodeBld::module();
    module.names = vec!["ValueError", "TypeError"];
    module.consts = vec![Obj::Str("outer")];
    module.instrs = vec![
        (LOAD_NAME, 0),
        (LOAD_CONST, 0),
        (CALL_FUNCTION, 1),
        (LOAD_NAME, 1),
        (RAISE_VARARGS, 2),
    ];
    let exc = run_exc(&module);
    assert_eq!(exc.exc_type(), ExcType::ValueError);
    assert_eq!(exc.message(), Some("outer"));
    let cause = exc.cause().expect("cause missing");
    assert_eq!(cause.exc_type(), ExcType::TypeError);
    assert!(exc
        .to_string()
        .contains("The above exception was the direct cause of the following exception:"));
}

#[test]
fn recursion_without_a_base_case_hits_the_depth_limit() {
    // def f(): return f()
    // f()
    // Frames recurse on the host stack, so this runs on a thread with
    // room for the full guest depth limit.
    let handle = std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(|| {
            let mut f = CodeBld::new("f");
            f.names = vec!["f"];
            f.instrs = vec![(LOAD_GLOBAL, 0), (CALL_FUNCTION, 0), (RETURN_VALUE, 0)];

            let mut module = CodeBld::module();
            module.names = vec!["f"];
            module.consts = vec![Obj::Code(f), Obj::Str("f"), Obj::None];
            module.instrs = vec![
                (LOAD_CONST, 0),
                (LOAD_CONST, 1),
                (MAKE_FUNCTION, 0),
                (STORE_NAME, 0),
                (LOAD_NAME, 0),
                (CALL_FUNCTION, 0),
                (POP_TOP, 0),
                (LOAD_CONST, 2),
                (RETURN_VALUE, 0),
            ];
            run_exc(&module)
        })
        .expect("spawn test thread");
    let exc = handle.join().expect("test thread panicked");
    assert_eq!(exc.exc_type(), ExcType::RecursionError);
}

#[test]
fn lnotab_maps_instructions_to_source_lines() {
    // Line 1: x = 1        (instructions 0-1, 4 bytes)
    // Line 2: raise ...    (instructions 2-)
    let mut module = CodeBld::module();
    module.names = vec!["x", "RuntimeError"];
    module.consts = vec![Obj::Int(1)];
    module.lnotab = vec![4, 1];
    module.instrs = vec![
        (LOAD_CONST, 0),
        (STORE_NAME, 0),
        (LOAD_NAME, 1),
        (RAISE_VARARGS, 1),
    ];
    let exc = run_exc(&module);
    assert_eq!(exc.exc_type(), ExcType::RuntimeError);
    assert_eq!(exc.traceback()[0].lineno, 2);
}
