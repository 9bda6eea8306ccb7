use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for domain ids: "domain-" followed by 12 hex characters
    /// - Valid: "domain-123456789012", "domain-abcdef012345"
    /// - Invalid: "domain-", "domain-XYZ", "dom-123456789012"
    pub static ref DOMAIN_ID_REGEX: Regex = Regex::new(r"^domain-[0-9a-f]{12}$").unwrap();

    /// Regex for protocol ids: "protocol-" followed by 12 hex characters
    pub static ref PROTOCOL_ID_REGEX: Regex = Regex::new(r"^protocol-[0-9a-f]{12}$").unwrap();

    /// Regex for quota ids: "quota-" followed by 12 hex characters
    pub static ref QUOTA_ID_REGEX: Regex = Regex::new(r"^quota-[0-9a-f]{12}$").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_id_regex_valid() {
        assert!(DOMAIN_ID_REGEX.is_match("domain-123456789012"));
        assert!(DOMAIN_ID_REGEX.is_match("domain-abcdef012345"));
    }

    #[test]
    fn test_domain_id_regex_invalid() {
        assert!(!DOMAIN_ID_REGEX.is_match("domain-")); // no suffix
        assert!(!DOMAIN_ID_REGEX.is_match("domain-12345678901")); // too short
        assert!(!DOMAIN_ID_REGEX.is_match("domain-1234567890123")); // too long
        assert!(!DOMAIN_ID_REGEX.is_match("domain-ABCDEF012345")); // uppercase
        assert!(!DOMAIN_ID_REGEX.is_match("dom-123456789012")); // wrong prefix
        assert!(!DOMAIN_ID_REGEX.is_match("")); // empty
    }

    #[test]
    fn test_protocol_and_quota_id_regex() {
        assert!(PROTOCOL_ID_REGEX.is_match("protocol-0a1b2c3d4e5f"));
        assert!(!PROTOCOL_ID_REGEX.is_match("quota-0a1b2c3d4e5f"));
        assert!(QUOTA_ID_REGEX.is_match("quota-0a1b2c3d4e5f"));
        assert!(!QUOTA_ID_REGEX.is_match("quota-0a1b2c3d4e5g")); // non-hex
    }
}
