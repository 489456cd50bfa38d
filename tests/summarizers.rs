// Integration tests for summarizer selection and the per-family parsers
use condense::config::SummaryConfig;
use condense::summarize::{SummarizerSet, SummaryOptions};

fn set() -> SummarizerSet {
    SummarizerSet::new(SummaryConfig::default())
}

#[test]
fn test_server_endpoint_aggregation_scenario() {
    let mut text = String::new();
    for _ in 0..10 {
        text.push_str("GET /api/users/42 200 15ms\n");
    }
    for _ in 0..2 {
        text.push_str("GET /api/users/43 404 5ms\n");
    }

    let set = set();
    assert_eq!(set.select(&text).name(), "server");

    let summary = set.summarize(&text, &SummaryOptions::default());
    assert_eq!(summary.endpoints.len(), 1);
    assert_eq!(summary.endpoints[0].endpoint, "GET /api/users/:id");
    assert_eq!(summary.endpoints[0].count, 12);

    // 4xx responses surface as one deduplicated warning-level entry
    assert_eq!(summary.warnings.len(), 1);
    assert_eq!(summary.warnings[0].count, 2);
}

#[test]
fn test_machine_summary_line_is_authoritative() {
    let text = "✓ creates a user\n✗ rejects duplicates\n5 passed, 1 failed in 2.3s\n";
    let summary = set().summarize(&text.to_string(), &SummaryOptions::default());
    assert_eq!(summary.summarizer, "test");

    let tests = summary.tests.unwrap();
    assert_eq!(tests.pass_count, 5);
    assert_eq!(tests.fail_count, 1);
    assert_eq!(tests.duration_ms, Some(2300));
}

#[test]
fn test_selection_prefers_server_over_test() {
    // Request lines dominate; a stray "passed" word must not reroute
    let mut text = String::new();
    for i in 0..20 {
        text.push_str(&format!("POST /api/jobs/{} 201 8ms\n", i));
    }
    text.push_str("health check passed\n");
    assert_eq!(set().select(&text).name(), "server");
}

#[test]
fn test_build_selected_for_bundler_output() {
    let text = "vite v5.0.0 building for production...\n\
                dist/index.js 142.3 kB\n\
                ✓ built in 3.21s\n";
    let set = set();
    assert_eq!(set.select(text).name(), "build");

    let summary = set.summarize(text, &SummaryOptions::default());
    let build = summary.build.unwrap();
    assert_eq!(build.tool.as_deref(), Some("vite"));
    assert_eq!(build.duration_ms, Some(3210));
}

#[test]
fn test_generic_fallback_always_applies() {
    let text = "a line of narration\nanother line of narration\n";
    let set = set();
    let selected = set.select(text);
    assert_eq!(selected.name(), "generic");
    assert!(selected.can_summarize(text));

    let summary = set.summarize(text, &SummaryOptions::default());
    assert_eq!(summary.statistics.total_lines, 2);
}

#[test]
fn test_summary_render_is_deterministic() {
    let mut text = String::new();
    for i in 0..25 {
        text.push_str(&format!("2024-02-01 08:00:{:02} [ERROR] shard 'db-{}' timed out\n", i % 60, i));
    }
    let a = set().summarize(&text, &SummaryOptions::default()).render();
    let b = set().summarize(&text, &SummaryOptions::default()).render();
    assert_eq!(a, b);
}
