//! Email address helpers shared by accounts and the newsletter.

/// Canonical form used for storage and lookups.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Accepts `local@domain.tld` with no whitespace and exactly one `@`.
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Mask the local part so addresses can appear in logs.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{first}***@{domain}")
        }
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("x@example.com"));
        assert!(is_valid_email("first.last@sub.domain.io"));
    }

    #[test]
    fn test_invalid_emails() {
        for email in ["", "plain", "@example.com", "x@example", "x@.com", "x @example.com", "x@a@b.com"] {
            assert!(!is_valid_email(email), "{email} should be rejected");
        }
    }

    #[test]
    fn test_normalize_and_mask() {
        assert_eq!(normalize_email("  Reader@Example.COM "), "reader@example.com");
        assert_eq!(mask_email("reader@example.com"), "r***@example.com");
        assert_eq!(mask_email("nope"), "***");
    }
}
