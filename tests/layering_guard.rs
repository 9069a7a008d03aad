//! Layering guardrails for the workspace crates.
//!
//! The syntax frontend must stay synchronous and free of the runtime stack: `tenet_syntax` may not depend on
//! `tokio`, and `tenet_core` may not depend on anything at all. This test scans their manifests.

fn dependencies(manifest: &str) -> Vec<String> {
    let mut in_dependencies = false;
    let mut deps = Vec::new();

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit the `[dependencies]` table.
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
            continue;
        }

        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line_no_comment = line.split('#').next().unwrap_or("").trim();
        if let Some((name, _)) = line_no_comment.split_once('=') {
            deps.push(name.trim().to_string());
        }
    }
    deps
}

#[test]
fn syntax_crate_does_not_depend_on_runtime() {
    let deps = dependencies(include_str!("../crates/tenet_syntax/Cargo.toml"));
    assert!(deps.iter().any(|d| d == "tenet_core"));
    for forbidden in ["tokio", "tenet"] {
        assert!(
            !deps.iter().any(|d| d == forbidden),
            "`{forbidden}` must not appear in tenet_syntax [dependencies]"
        );
    }
}

#[test]
fn core_crate_has_no_dependencies() {
    let deps = dependencies(include_str!("../crates/tenet_core/Cargo.toml"));
    assert!(deps.is_empty(), "tenet_core must stay dependency-free, found {deps:?}");
}
