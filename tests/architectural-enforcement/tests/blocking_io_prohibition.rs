//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: Async code MUST NOT use blocking I/O.
//! **Required**: `tokio::fs`, `tokio::net`, `tokio::io`, async `reqwest`.
//!
//! Blocking calls are tolerated in plain functions (config loading before the
//! panel opens, writing a rendered chunk to stdout) and in test code.

use architectural_enforcement::{
    code_part, is_in_async_function, is_in_test_code, production_sources, report,
};

#[test]
fn test_no_blocking_io_in_production_code() {
    let mut violations = Vec::new();

    for source in production_sources() {
        let lines = source.line_refs();
        for (idx, line) in lines.iter().enumerate() {
            if is_in_test_code(&lines, idx) {
                break;
            }
            let code = code_part(line);

            // Never acceptable, sync context or not
            if code.contains("reqwest::blocking") {
                violations.push(source.violation(idx, "Blocking HTTP client"));
                continue;
            }

            if !is_in_async_function(&lines, idx) {
                continue;
            }

            if code.contains("std::fs::") {
                violations.push(source.violation(idx, "Blocking file I/O"));
            }
            if code.contains("std::net::") {
                violations.push(source.violation(idx, "Blocking network I/O"));
            }
            if code.contains("std::process::Command") {
                violations.push(source.violation(idx, "Blocking process I/O"));
            }
            if code.contains("std::io::stdin()") || code.contains("std::io::stdout()") {
                violations.push(source.violation(idx, "Blocking stdin/stdout in async"));
            }
        }
    }

    report(
        &violations,
        "Blocking I/O calls found in async production code!",
        &[
            "❌ FORBIDDEN in async code:",
            "  - std::fs::*, std::net::*, std::process::Command",
            "  - std::io::stdin(), std::io::stdout()",
            "  - reqwest::blocking::* (anywhere)",
            "✅ REQUIRED:",
            "  - tokio::io::stdin() with AsyncBufReadExt",
            "  - reqwest::Client with .await",
        ],
    );
}
