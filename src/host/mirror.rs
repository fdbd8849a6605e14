//! Package-source rewrite planning
//!
//! Pure inspection of a sources file: decide whether the mirror
//! substitution is needed before any elevated edit is issued.

use regex::Regex;

/// Decision about what the mirror rewrite has to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewritePlan {
    /// Active entries reference the stock archive; substitution required
    Substitute,
    /// The mirror already appears on active entries and the stock archive does not
    AlreadyApplied,
    /// Neither host appears on an active entry; nothing to rewrite
    PatternMissing,
}

/// Match the host on an active (non-comment) package-source entry
fn active_entry(host: &str) -> Option<Regex> {
    Regex::new(&format!(r"(?m)^\s*deb(?:-src)?\s[^\n#]*{}", regex::escape(host))).ok()
}

fn host_is_active(contents: &str, host: &str) -> bool {
    match active_entry(host) {
        Some(re) => re.is_match(contents),
        // Escaped host is always a valid pattern; fall back to a plain
        // substring match just in case
        None => contents.contains(host),
    }
}

/// Plan the rewrite of `stock` to `mirror` over the given file contents
pub fn plan_rewrite(contents: &str, stock: &str, mirror: &str) -> RewritePlan {
    if host_is_active(contents, stock) {
        RewritePlan::Substitute
    } else if host_is_active(contents, mirror) {
        RewritePlan::AlreadyApplied
    } else {
        RewritePlan::PatternMissing
    }
}
