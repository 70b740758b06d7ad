//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT block a runtime thread with
//! `std::thread::sleep`. Timer sleeps (`tokio::time::sleep*`) are allowed only
//! where the panel schedules user-visible timing: the reveal cadence and the
//! settle delay. The cooldown uses `tokio::time::interval`.

use architectural_enforcement::{code_part, is_in_test_code, production_sources, report};

/// Files allowed to await timer sleeps
const TIMER_SLEEP_ALLOWED: &[&str] = &["reveal.rs", "panel.rs"];

#[test]
fn test_no_sleep_in_production_code() {
    let mut violations = Vec::new();

    for source in production_sources() {
        let lines = source.line_refs();
        for (idx, line) in lines.iter().enumerate() {
            if is_in_test_code(&lines, idx) {
                break;
            }
            let code = code_part(line);

            if code.contains("thread::sleep") {
                violations.push(source.violation(idx, "Thread sleep"));
            } else if (code.contains("::sleep(") || code.contains("::sleep_until("))
                && !TIMER_SLEEP_ALLOWED.contains(&source.file_name())
            {
                violations.push(source.violation(idx, "Timer sleep outside scheduled timing"));
            }
        }
    }

    report(
        &violations,
        "Sleep calls found in production code!",
        &[
            "✅ ACCEPTABLE:",
            "  - tokio::time::sleep_until for reveal cadence (reveal.rs)",
            "  - tokio::time::sleep for the settle delay (panel.rs)",
            "  - tokio::time::interval for periodic ticks",
            "  - Test code",
            "❌ FORBIDDEN:",
            "  - std::thread::sleep anywhere",
            "  - Sleep as poor man's synchronization",
        ],
    );
}

#[test]
fn test_production_sources_are_found() {
    let sources = production_sources();
    assert!(
        sources.iter().any(|s| s.file_name() == "panel.rs"),
        "Scanner must see the core crate"
    );
    assert!(
        sources.iter().any(|s| s.file_name() == "main.rs"),
        "Scanner must see the CLI crate"
    );
}
