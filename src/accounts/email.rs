//! Email address canonicalization.

/// Canonical form of an email address: surrounding whitespace removed, lowercased.
///
/// No syntax validation happens here. Idempotent.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_and_lowercases() {
        assert_eq!(normalize_email("  UPPERCASE@EXAMPLE.COM  "), "uppercase@example.com");
        assert_eq!(normalize_email("\tMixed.Case@Example.org\n"), "mixed.case@example.org");
    }

    #[test]
    fn test_idempotent() {
        for raw in ["", "   ", "a@b.c", " A@B.C ", "ÉLAN@EXAMPLE.FR", "x y@z"] {
            let once = normalize_email(raw);
            assert_eq!(normalize_email(&once), once, "input {raw:?}");
        }
    }

    #[test]
    fn test_whitespace_only_becomes_empty() {
        assert!(normalize_email(" \t\n ").is_empty());
    }

    #[test]
    fn test_no_syntax_checks() {
        assert_eq!(normalize_email("not-an-email"), "not-an-email");
    }
}
