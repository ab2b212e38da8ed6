//! Heuristic parsers for elan's human-oriented output.
//!
//! elan has no machine-readable output mode, so both parsers are best-effort
//! and deliberately lenient.

/// Message elan prints instead of a list when nothing is installed.
const NO_TOOLCHAINS: &str = "no installed toolchains";

/// Extracts a version from `<tool> --version` output.
///
/// Scans line by line for a token containing `tool` (case-insensitive) and
/// returns the token that follows it. Falls back to the first non-empty line
/// when no such pair exists, and to `None` for blank output.
#[must_use]
pub fn parse_version(output: &str, tool: &str) -> Option<String> {
    let needle = tool.to_lowercase();
    for line in output.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        for pair in tokens.windows(2) {
            if pair[0].to_lowercase().contains(&needle) {
                return Some(pair[1].to_string());
            }
        }
    }
    output.lines().map(str::trim).find(|line| !line.is_empty()).map(String::from)
}

/// Extracts toolchain names from `elan toolchain list` output.
///
/// Blank lines and `#` comments are skipped; for every other line only the
/// first token is kept, which drops markers such as `(default)`.
#[must_use]
pub fn parse_toolchains(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| !line.eq_ignore_ascii_case(NO_TOOLCHAINS))
        .filter_map(|line| line.split_whitespace().next())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_follows_tool_name() {
        assert_eq!(parse_version("elan 1.4.2\n", "elan").as_deref(), Some("1.4.2"));
    }

    #[test]
    fn version_ignores_trailing_build_metadata() {
        let output = "elan 3.1.1 (71ddc6633 2024-02-22)\n";
        assert_eq!(parse_version(output, "elan").as_deref(), Some("3.1.1"));
    }

    #[test]
    fn version_matches_tool_name_case_insensitively_inside_tokens() {
        assert_eq!(parse_version("Elan-init 2.0.0\n", "elan").as_deref(), Some("2.0.0"));
    }

    #[test]
    fn version_scans_past_unrelated_lines() {
        let output = "info: syncing channel updates\nelan 1.4.2 (abc 2023-01-01)\n";
        assert_eq!(parse_version(output, "elan").as_deref(), Some("1.4.2"));
    }

    #[test]
    fn version_falls_back_to_first_line() {
        assert_eq!(
            parse_version("\n  4.0.0-nightly\nmore\n", "elan").as_deref(),
            Some("4.0.0-nightly")
        );
    }

    #[test]
    fn version_of_lonely_tool_name_falls_back() {
        assert_eq!(parse_version("elan\n", "elan").as_deref(), Some("elan"));
    }

    #[test]
    fn version_of_blank_output_is_none() {
        assert_eq!(parse_version("  \n\n", "elan"), None);
    }

    #[test]
    fn toolchains_strip_markers_and_comments() {
        let output = "stable (default)\nleanprover/lean4:v4.0.0\n# comment\n\n";
        assert_eq!(parse_toolchains(output), vec!["stable", "leanprover/lean4:v4.0.0"]);
    }

    #[test]
    fn toolchains_handle_indentation_and_override_markers() {
        let output = "  leanprover/lean4:nightly (override)\n\tleanprover/lean4:v4.9.0\n";
        assert_eq!(
            parse_toolchains(output),
            vec!["leanprover/lean4:nightly", "leanprover/lean4:v4.9.0"]
        );
    }

    #[test]
    fn toolchains_empty_message_yields_empty_list() {
        assert!(parse_toolchains("no installed toolchains\n").is_empty());
        assert!(parse_toolchains("").is_empty());
    }
}
