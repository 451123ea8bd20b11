//! Utility functions

/// Mask an email address for log output. Counts characters, not bytes, so
/// multibyte local parts never split mid-character.
pub fn mask_email(email: &str) -> String {
    match email.find('@') {
        Some(at_pos) => {
            let (local, domain) = email.split_at(at_pos);
            let keep = if local.chars().count() > 2 { 2 } else { 1 };
            let shown: String = local.chars().take(keep).collect();
            format!("{shown}***{domain}")
        }
        None => "***".to_string(),
    }
}

/// Derive a URL-safe slug from a display name: lowercase, alphanumeric
/// runs joined by single dashes, no leading/trailing dash.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("agent@example.com"), "ag***@example.com");
        assert_eq!(mask_email("a@example.com"), "a***@example.com");
        assert_eq!(mask_email("not-an-email"), "***");
    }

    #[test]
    fn test_mask_email_empty_local_part() {
        assert_eq!(mask_email("@example.com"), "***@example.com");
    }

    #[test]
    fn test_mask_email_multibyte_local_part() {
        assert_eq!(mask_email("müller@example.com"), "mü***@example.com");
        assert_eq!(mask_email("日本@example.com"), "日***@example.com");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("MT Umrah Portal"), "mt-umrah-portal");
        assert_eq!(slugify("  Desert & Dunes  Travel "), "desert-dunes-travel");
        assert_eq!(slugify("Already-Slugged"), "already-slugged");
        assert_eq!(slugify("***"), "");
    }
}
