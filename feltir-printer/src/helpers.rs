//! # Helper definitions
//!
//! Declarations and bodies of the intrinsic helpers, lowered at a target
//! width. Felt helpers reduce with a signed remainder by the prime literal;
//! the multiply helper works at double width so the full product fits.

use crate::formatter::format_result_types;
use feltir_spec::{CodegenConfig, Intrinsic, ValueType, PRIME};

const PARAM_NAMES: [&str; 2] = ["%a", "%b"];

fn param_list(intrinsic: &Intrinsic, width: u32) -> String {
    intrinsic
        .params()
        .iter()
        .zip(PARAM_NAMES)
        .map(|(ty, name)| format!("{} {}", ty.lowered_name(width), name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `declare i256 @felt252_mul(i256 %a, i256 %b)`
pub fn helper_declaration(intrinsic: &Intrinsic, config: &CodegenConfig) -> String {
    let width = config.target_width;
    format!(
        "declare {} @{}({})",
        format_result_types(&intrinsic.results(), width),
        intrinsic.symbol(),
        param_list(intrinsic, width)
    )
}

/// Full helper definition, ending with a newline
pub fn helper_definition(intrinsic: &Intrinsic, config: &CodegenConfig) -> String {
    let width = config.target_width;
    let felt = format!("i{}", width);
    let wide = format!("i{}", config.wide_width());

    let body: Vec<String> = match intrinsic {
        // ========== Lifecycle ==========
        Intrinsic::Dup(ty) => {
            let t = ty.lowered_name(width);
            vec![format!("ret {t} %a, {t} %a")]
        }
        Intrinsic::StoreTemp(ty) | Intrinsic::Rename(ty) => {
            vec![format!("ret {} %a", ty.lowered_name(width))]
        }

        // ========== Felt252 ==========
        Intrinsic::Felt252Mul => vec![
            format!("%a_wide = sext {felt} %a to {wide}"),
            format!("%b_wide = sext {felt} %b to {wide}"),
            format!("%product = mul {wide} %a_wide, %b_wide"),
            format!("%reduced = srem {wide} %product, {}", PRIME),
            format!("%result = trunc {wide} %reduced to {felt}"),
            format!("ret {felt} %result"),
        ],
        Intrinsic::Felt252Add => vec![
            format!("%sum = add {felt} %a, %b"),
            format!("%result = srem {felt} %sum, {}", PRIME),
            format!("ret {felt} %result"),
        ],
        Intrinsic::Felt252Sub => vec![
            format!("%diff = sub {felt} %a, %b"),
            format!("%result = srem {felt} %diff, {}", PRIME),
            format!("ret {felt} %result"),
        ],

        // ========== U32 ==========
        Intrinsic::U32OverflowingAdd => vec![
            "%result = add i32 %a, %b".to_string(),
            "%overflow = cmp ult i32 %result, %a".to_string(),
            "ret i32 %result, i1 %overflow".to_string(),
        ],
        Intrinsic::U32OverflowingSub => vec![
            "%result = sub i32 %a, %b".to_string(),
            "%overflow = cmp ult i32 %a, %b".to_string(),
            "ret i32 %result, i1 %overflow".to_string(),
        ],
        Intrinsic::U32Divmod => vec![
            "%quotient = udiv i32 %a, %b".to_string(),
            "%remainder = urem i32 %a, %b".to_string(),
            "ret i32 %quotient, i32 %remainder".to_string(),
        ],
        Intrinsic::U32ToFelt252 => vec![
            format!("%result = zext i32 %a to {felt}"),
            format!("ret {felt} %result"),
        ],
        Intrinsic::U32TryFromFelt252 => vec![
            format!("%negative = cmp slt {felt} %a, 0"),
            format!("%shifted = add {felt} %a, {}", PRIME),
            format!("%canonical = select i1 %negative, {felt} %shifted, {felt} %a"),
            format!("%fits = cmp ult {felt} %canonical, 4294967296"),
            format!("%low = trunc {felt} %canonical to i32"),
            "ret i1 %fits, i32 %low".to_string(),
        ],
    };

    let mut text = format!(
        "define {} @{}({}) {{\nentry:\n",
        format_result_types(&intrinsic.results(), width),
        intrinsic.symbol(),
        param_list(intrinsic, width)
    );
    for line in body {
        text.push_str("  ");
        text.push_str(&line);
        text.push('\n');
    }
    text.push_str("}\n");
    text
}

/// Every helper a lifecycle operation on `ty` can reference
pub fn lifecycle_helpers(ty: ValueType) -> [Intrinsic; 3] {
    [
        Intrinsic::Dup(ty),
        Intrinsic::StoreTemp(ty),
        Intrinsic::Rename(ty),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIME_DEC: &str =
        "3618502788666131213697322783095070105623107215331596699973092056135872020481";

    #[test]
    fn test_mul_definition_widens() {
        let text = helper_definition(&Intrinsic::Felt252Mul, &CodegenConfig::DEFAULT);
        assert!(text.starts_with("define i256 @felt252_mul(i256 %a, i256 %b) {"));
        assert!(text.contains("sext i256 %a to i512"));
        assert!(text.contains("mul i512 %a_wide, %b_wide"));
        assert!(text.contains(&format!("srem i512 %product, {}", PRIME_DEC)));
        assert!(text.contains("trunc i512 %reduced to i256"));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_definition_follows_width() {
        let config = CodegenConfig::new(320).unwrap();
        let text = helper_definition(&Intrinsic::Felt252Mul, &config);
        assert!(text.contains("sext i320 %a to i640"));
    }

    #[test]
    fn test_declarations() {
        let config = CodegenConfig::DEFAULT;
        assert_eq!(
            helper_declaration(&Intrinsic::Dup(ValueType::Felt252), &config),
            "declare {i256, i256} @dup<felt252>(i256 %a)"
        );
        assert_eq!(
            helper_declaration(&Intrinsic::U32TryFromFelt252, &config),
            "declare {i1, i32} @u32_try_from_felt252(i256 %a)"
        );
    }

    #[test]
    fn test_every_helper_has_a_body() {
        let config = CodegenConfig::DEFAULT;
        let all = Intrinsic::FIXED
            .into_iter()
            .chain(ValueType::ALL.into_iter().flat_map(lifecycle_helpers));
        for intrinsic in all {
            let text = helper_definition(&intrinsic, &config);
            assert!(text.contains("  ret "), "{} has no return", intrinsic);
        }
    }
}
