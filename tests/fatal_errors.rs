use trylang::run_str;

#[test]
fn division_by_zero_reports_position() {
    let err = run_str("void main(){ print(1/0); }").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Division by zero"));
    assert!(message.contains("Line 1"));
}

#[test]
fn missing_main_is_reported() {
    let err = run_str("void notMain() {}").unwrap_err();
    assert!(err.to_string().contains("main"));
}

#[test]
fn recursion_limit_terminates_unconditional_recursion() {
    let src = "void loop() { loop(); } void main() { loop(); }";
    let err = run_str(src).unwrap_err();
    assert!(err.to_string().to_lowercase().contains("recursion"));
}

#[test]
fn mismatched_binary_operand_types_is_fatal() {
    let err = run_str(r#"void main() { x = 1 + 1.0; }"#).unwrap_err();
    assert!(err.to_string().contains("match"));
}

#[test]
fn undefined_variable_is_fatal() {
    let err = run_str("void main() { print(missing); }").unwrap_err();
    assert!(err.to_string().contains("missing"));
}

#[test]
fn wrong_argument_count_is_fatal() {
    let src = "int addOne(int n) { return n + 1; } void main() { print(addOne(1, 2)); }";
    let err = run_str(src).unwrap_err();
    assert!(err.to_string().contains("Wrong number of arguments"));
}

#[test]
fn void_function_result_used_as_value_is_fatal() {
    let src = "void main() { x = print(\"hi\"); }";
    let err = run_str(src).unwrap_err();
    assert!(err.to_string().to_lowercase().contains("void"));
}

#[test]
fn parser_rejects_duplicate_function_names() {
    let err = run_str("void main() {} void main() {}").unwrap_err();
    assert!(err.to_string().contains("main"));
}

#[test]
fn lexer_rejects_unterminated_string() {
    let err = run_str("void main() { print(\"oops); }").unwrap_err();
    assert!(err.to_string().to_lowercase().contains("string"));
}
