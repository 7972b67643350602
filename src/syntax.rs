//! Syntax Rules - Value Grammars
//!
//! Leaf predicates over the three accepted value grammars. Pure functions,
//! no state.

use regex::Regex;

/// Injected feature keys accepted inside a memory topology string.
///
/// `feature_enable` is reserved: the key is accepted but no value grammar
/// is enforced for it yet.
pub const SUPPORTED_INJECTED_FEATURES: [&str; 3] =
    ["opt_enable", "feature_enable", "debug_features_enable"];

/// Whether `key` is in the injected-feature allow-list.
pub fn is_supported_feature(key: &str) -> bool {
    SUPPORTED_INJECTED_FEATURES.contains(&key)
}

/// Bare topology count token: digits with an optional trailing `x`.
pub fn is_count_token(s: &str) -> bool {
    Regex::new(r"^\d+x?$").expect("static pattern").is_match(s)
}

/// `opt_enable` value: 8 hex digits, `0x`-prefixed, optional leading `&`.
pub fn is_opt_enable_value(s: &str) -> bool {
    Regex::new(r"^&?0x[0-9A-Fa-f]{8}$")
        .expect("static pattern")
        .is_match(s)
}

/// `debug_features_enable` value: 16 hex digits, `0x`-prefixed, optional
/// leading `&`.
pub fn is_debug_features_value(s: &str) -> bool {
    Regex::new(r"^&?0x[0-9A-Fa-f]{16}$")
        .expect("static pattern")
        .is_match(s)
}

/// Resource quantity: signed decimal magnitude with an optional binary
/// suffix (Ki..Ei), SI suffix (n, u, m, k, M, G, T, P, E) or decimal
/// exponent. No whitespace anywhere between magnitude and suffix.
pub fn is_quantity(s: &str) -> bool {
    Regex::new(r"^[+-]?(\d+|\d+\.\d*|\.\d+)(Ki|Mi|Gi|Ti|Pi|Ei|[numkMGTPE]|[eE][+-]?\d+)?$")
        .expect("static pattern")
        .is_match(s)
}

const NAME_PART_MAX: usize = 63;
const PREFIX_MAX: usize = 253;

/// Reasons why `s` is not a qualified configuration key.
///
/// A qualified name is `[prefix/]name` where `name` is alphanumeric plus
/// `-`, `_`, `.` (alphanumeric at both ends, at most 63 characters) and the
/// optional `prefix` is a lowercase DNS subdomain of at most 253 characters.
/// Empty result means the name is valid.
pub fn qualified_name_violations(s: &str) -> Vec<String> {
    let mut reasons = Vec::new();

    let parts: Vec<&str> = s.split('/').collect();
    let name = match parts.len() {
        1 => parts[0],
        2 => {
            let prefix = parts[0];
            if prefix.is_empty() {
                reasons.push("prefix part must be non-empty".to_string());
            } else if !is_dns_subdomain(prefix) {
                reasons.push(
                    "prefix part must be a lowercase DNS subdomain (alphanumeric labels separated by '.', '-' allowed inside labels)"
                        .to_string(),
                );
            }
            parts[1]
        }
        _ => {
            reasons.push(
                "must consist of a name with an optional DNS subdomain prefix and '/' (e.g. 'example.com/my-key')"
                    .to_string(),
            );
            parts[parts.len() - 1]
        }
    };

    if name.is_empty() {
        reasons.push("name part must be non-empty".to_string());
    } else {
        if name.len() > NAME_PART_MAX {
            reasons.push(format!(
                "name part must be no more than {} characters",
                NAME_PART_MAX
            ));
        }
        let name_re = Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9._-]*[A-Za-z0-9])?$")
            .expect("static pattern");
        if !name_re.is_match(name) {
            reasons.push(
                "name part must consist of alphanumeric characters, '-', '_' or '.', and must start and end with an alphanumeric character"
                    .to_string(),
            );
        }
    }

    reasons
}

fn is_dns_subdomain(s: &str) -> bool {
    if s.len() > PREFIX_MAX {
        return false;
    }
    let label_re = Regex::new(r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?$").expect("static pattern");
    s.split('.').all(|label| label_re.is_match(label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_token() {
        assert!(is_count_token("123"));
        assert!(is_count_token("123x"));
        assert!(!is_count_token("123a"));
        assert!(!is_count_token("x321"));
        assert!(!is_count_token("abc"));
        assert!(!is_count_token(""));
    }

    #[test]
    fn test_hex_values() {
        assert!(is_opt_enable_value("&0xffffffff"));
        assert!(is_opt_enable_value("0x00ABCDEF"));
        assert!(!is_opt_enable_value("&0xfffffff"));
        assert!(!is_opt_enable_value("&0xfffffffff"));

        assert!(is_debug_features_value("&0xffffffffffffffff"));
        assert!(!is_debug_features_value("&0xfffffffffffffff"));
    }

    #[test]
    fn test_quantity() {
        for ok in ["123", "123m", "123G", "1Ki", "1.5Gi", "12e3", "+2", "-3M", "500u"] {
            assert!(is_quantity(ok), "expected valid quantity: {}", ok);
        }
        for bad in ["123x", "123 m", "123 G", "abc", "x321", "", " 123", "1Kib"] {
            assert!(!is_quantity(bad), "expected invalid quantity: {}", bad);
        }
    }

    #[test]
    fn test_qualified_names() {
        assert!(qualified_name_violations("simple").is_empty());
        assert!(qualified_name_violations("with-dash_and.dot").is_empty());
        assert!(qualified_name_violations("example.com/my-key").is_empty());

        assert!(!qualified_name_violations("").is_empty());
        assert!(!qualified_name_violations("abc;def").is_empty());
        assert!(!qualified_name_violations("-leading").is_empty());
        assert!(!qualified_name_violations("trailing-").is_empty());
        assert!(!qualified_name_violations("a/b/c").is_empty());
        assert!(!qualified_name_violations("/no-prefix").is_empty());
        assert!(!qualified_name_violations(&"x".repeat(64)).is_empty());
    }

    #[test]
    fn test_feature_allow_list() {
        assert!(is_supported_feature("opt_enable"));
        assert!(is_supported_feature("feature_enable"));
        assert!(is_supported_feature("debug_features_enable"));
        assert!(!is_supported_feature("abcd"));
    }
}
