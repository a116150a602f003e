use trylang::run_str_with_stdin;

#[test]
fn fib_via_recursion_and_input() {
    let src = r#"
        int fib(int n) { if (n < 3) { return 1; } return fib(n-2)+fib(n-1); }
        void main(){ print(fib(input() to int)); }
    "#;
    let out = run_str_with_stdin(src, "10").unwrap();
    assert_eq!(out, "55\n");
}

#[test]
fn print_formats_every_value_kind() {
    let src = r#"void main() { print(8, 1.5, "text", true); }"#;
    let out = run_str_with_stdin(src, "").unwrap();
    assert_eq!(out, "8 1.5 text true\n");
}

#[test]
fn while_continue_break_interleave() {
    let src = r#"
        void main() {
            x = 5;
            while (x > 0) {
                if (x % 2 == 0) { x = x - 1; continue; }
                print(x);
                x = x - 1;
            }
        }
    "#;
    let out = run_str_with_stdin(src, "").unwrap();
    assert_eq!(out, "5\n3\n1\n");
}

#[test]
fn user_exception_throw_and_catch_basic() {
    let src = r#"
        exception ValueError(int value) { message: string = "Bad "+value to string; }
        void main(){ try { throw ValueError(7); } catch (BasicException e){ print(e.message); } }
    "#;
    let out = run_str_with_stdin(src, "").unwrap();
    assert_eq!(out, "Bad 7\n");
}

#[test]
fn named_catch_does_not_match_other_exceptions() {
    let src = r#"
        exception Foo() { }
        exception Bar() { }
        void main() {
            try {
                throw Bar();
            } catch (Foo f) {
                print("wrong handler");
            }
        }
    "#;
    let err = run_str_with_stdin(src, "").unwrap_err();
    assert!(err.to_string().contains("Bar"));
}

#[test]
fn break_exits_enclosing_loop_only() {
    let src = r#"
        void main() {
            x = 0;
            while (x < 5) {
                x = x + 1;
                if (x == 3) { break; }
            }
            print(x);
        }
    "#;
    let out = run_str_with_stdin(src, "").unwrap();
    assert_eq!(out, "3\n");
}

#[test]
fn deeply_nested_throw_unwinds_to_matching_try() {
    let src = r#"
        void helper() {
            if (true) {
                if (true) {
                    throw BasicException("deep");
                }
            }
        }
        void main() {
            try {
                helper();
            } catch (BasicException e) {
                print(e.message);
            }
        }
    "#;
    let out = run_str_with_stdin(src, "").unwrap();
    assert_eq!(out, "deep\n");
}

#[test]
fn casts_round_trip_through_every_type() {
    let src = r#"
        void main() {
            print(5 to float);
            print(5 to bool);
            print(0 to bool);
            print("true" to bool);
            print("42" to int);
            print(3.9 to int);
        }
    "#;
    let out = run_str_with_stdin(src, "").unwrap();
    assert_eq!(out, "5.0\ntrue\nfalse\ntrue\n42\n3\n");
}
