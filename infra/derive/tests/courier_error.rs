#[test]
fn courier_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/courier_error_pass.rs");
    t.pass("tests/ui/courier_error_context.rs");
}
