use regex::Regex;
use std::sync::OnceLock;

// WHATWG "valid e-mail address", lightly modified
const VALID_EMAIL_PATTERN: &str = concat!(
    r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@",
    r"[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?",
    r"(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
);

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(VALID_EMAIL_PATTERN).expect("email pattern is a valid regex"))
}

/// Strict check used when collecting addresses from people (signup forms).
/// Requires a dotted domain, so `joe@localhost` is rejected.
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}
