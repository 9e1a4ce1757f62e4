// # Domain Name Normalization
//
// Cache lookups compare names byte-for-byte, so every name that enters the
// cache (or is used to query it) goes through `normalize_domain` first.

/// Canonicalize a domain name for cache comparison
///
/// Lower-cases the input and strips exactly one trailing root separator.
///
/// ```rust
/// use dnsmirror_core::normalize_domain;
///
/// assert_eq!(normalize_domain("Example.COM."), "example.com");
/// assert_eq!(normalize_domain("example.com"), "example.com");
/// ```
pub fn normalize_domain(name: &str) -> String {
    let mut domain = name.to_lowercase();
    if domain.ends_with('.') {
        domain.pop();
    }
    domain
}
