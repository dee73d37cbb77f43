//! Cookie header lookup for the anti-forgery token.

use percent_encoding::percent_decode_str;

/// Finds `name` in a `Cookie` header value (`a=1; b=2`) and returns its
/// percent-decoded value. Malformed escapes are kept verbatim and `+` is
/// not treated as a space.
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    header
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(name)?.strip_prefix('='))
        .map(|raw| percent_decode_str(raw).decode_utf8_lossy().into_owned())
}
