//! Integration Test: Panic Prohibition
//!
//! **Policy**: Production code propagates errors with `?` and typed errors.
//! `unwrap()` and `expect()` are allowed in test code only. Fallible
//! conversions use `unwrap_or`, `unwrap_or_else` or `unwrap_or_default`.

use architectural_enforcement::{code_part, is_in_test_code, production_sources, report};

#[test]
fn test_no_unwrap_in_production_code() {
    let mut violations = Vec::new();

    for source in production_sources() {
        let lines = source.line_refs();
        for (idx, line) in lines.iter().enumerate() {
            if is_in_test_code(&lines, idx) {
                break;
            }
            let code = code_part(line);

            if code.contains(".unwrap()") {
                violations.push(source.violation(idx, "unwrap()"));
            }
            if code.contains(".expect(") {
                violations.push(source.violation(idx, "expect()"));
            }
        }
    }

    report(
        &violations,
        "Panicking unwraps found in production code!",
        &[
            "✅ REQUIRED:",
            "  - Return Result and use ?",
            "  - thiserror enums in newsbot-core, anyhow::Context in the CLI",
        ],
    );
}
