//! PII masking for log output. Every log line that would carry an email,
//! username, or phone number goes through these first.

/// `jdoe@example.com` -> `j***@example.com`
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let first = local.chars().next().unwrap();
            format!("{}***@{}", first, domain)
        }
        _ => "***".to_string(),
    }
}

/// Keeps the last two digits only.
pub fn mask_phone(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 3 {
        return "***".to_string();
    }
    let tail: String = digits[digits.len() - 2..].iter().collect();
    format!("*******{}", tail)
}

/// Keeps the first character only.
pub fn mask_username(username: &str) -> String {
    match username.chars().next() {
        Some(first) => format!("{}***", first),
        None => "***".to_string(),
    }
}

/// Strips control characters and trims; bilingual text passes through
/// untouched otherwise.
pub fn clean_text(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || *c == '\n')
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_email() {
        assert_eq!(mask_email("jdoe@example.com"), "j***@example.com");
        assert_eq!(mask_email("not-an-email"), "***");
        assert_eq!(mask_email("@example.com"), "***");
    }

    #[test]
    fn masks_phone() {
        assert_eq!(mask_phone("+977-9841-123456"), "*******56");
        assert_eq!(mask_phone("12"), "***");
    }

    #[test]
    fn masks_username() {
        assert_eq!(mask_username("ram_bahadur"), "r***");
        assert_eq!(mask_username(""), "***");
    }

    #[test]
    fn clean_text_strips_controls_keeps_nepali() {
        assert_eq!(clean_text("  नमस्ते\u{0000} world \r"), "नमस्ते world");
        assert_eq!(clean_text("line1\nline2"), "line1\nline2");
    }
}
