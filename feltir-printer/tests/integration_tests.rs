//! Printing emitted functions

use feltir_codegen::{compile, conditional_transform, default_registry, emit_module};
use feltir_printer::{print_declarations, print_function, print_module};
use feltir_spec::{CodegenConfig, Felt};

#[test]
fn test_conditional_transform_text() {
    let func = compile(&conditional_transform("double", Felt::from_u64(2))).unwrap();
    let text = print_function(&func, &CodegenConfig::DEFAULT).unwrap();

    assert!(text.starts_with("; double(felt252) -> (felt252)\n"));
    assert!(text.contains("define i256 @double(i256 %0) {"));
    for label in ["bb1(", "bb2(", "bb3:", "bb4(", "bb5("] {
        assert!(text.contains(label), "missing block {}", label);
    }
    assert!(text.contains("call @felt252_mul("));
    assert!(text.contains("= const i256 2"));
    assert_eq!(text.matches("cond_br i1 ").count(), 1);
    assert_eq!(text.matches("  ret i256 ").count(), 1);
}

#[test]
fn test_module_text_lists_each_helper_once() {
    let sources = vec![
        conditional_transform("double", Felt::from_u64(2)),
        conditional_transform("triple", Felt::from_u64(3)),
    ];
    let output = emit_module(&sources, default_registry(), CodegenConfig::DEFAULT).unwrap();
    assert!(output.is_complete());

    let text = print_module(&output.module, &CodegenConfig::DEFAULT).unwrap();
    assert_eq!(text.matches("define i256 @felt252_mul(").count(), 1);
    assert_eq!(text.matches("@rename<felt252>(i256 %a) {").count(), 1);
    assert!(text.contains("define i256 @double("));
    assert!(text.contains("define i256 @triple("));

    let decls = print_declarations(&output.module, &CodegenConfig::DEFAULT).unwrap();
    assert_eq!(decls.lines().count(), output.module.helpers().len());
    assert!(decls.lines().all(|line| line.starts_with("declare ")));
}

#[test]
fn test_wider_target() {
    let func = compile(&conditional_transform("double", Felt::from_u64(2))).unwrap();
    let config = CodegenConfig::new(384).unwrap();
    let text = print_function(&func, &config).unwrap();
    assert!(text.contains("define i384 @double(i384 %0) {"));
    assert!(!text.contains("i256"));
}
