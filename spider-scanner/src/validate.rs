//! Link eligibility for traversal.

use crate::normalize::resolve;
use url::Url;

const ALLOWED_SCHEMES: [&str; 2] = ["http", "https"];

/// Decide whether `candidate`, found on a page at `base`, may be traversed.
///
/// The candidate must be non-empty, must not be a bare fragment, must use
/// http(s) when a scheme is given, and must resolve to exactly the same
/// host and port as `base`. Subdomains count as different hosts.
pub fn is_valid(candidate: &str, base: &Url) -> bool {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return false;
    }

    let without_fragment = candidate.split('#').next().unwrap_or_default();
    if without_fragment.trim().is_empty() {
        return false;
    }

    // Relative references fail to parse on their own; only absolute ones carry a scheme
    if let Ok(absolute) = Url::parse(candidate)
        && !ALLOWED_SCHEMES.contains(&absolute.scheme())
    {
        return false;
    }

    match resolve(base, candidate) {
        Some(resolved) => {
            ALLOWED_SCHEMES.contains(&resolved.scheme()) && is_same_domain(&resolved, base)
        }
        None => false,
    }
}

/// Exact netloc comparison: host string and explicit port must both match.
pub fn is_same_domain(url: &Url, base: &Url) -> bool {
    match (url.host_str(), base.host_str()) {
        (Some(host), Some(base_host)) => host == base_host && url.port() == base.port(),
        _ => false,
    }
}
