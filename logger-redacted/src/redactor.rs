use base64::{engine::general_purpose, Engine as _};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use sha2::{Digest, Sha256};

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("email pattern");
    static ref PHONE_REGEX: Regex =
        Regex::new(r"(?:\+\d{1,3}[-.\s]?)?\b\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b").expect("phone pattern");
    static ref CARD_REGEX: Regex =
        Regex::new(r"\b\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?(\d{4})\b").expect("card pattern");
}

/// PII redaction configuration
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub redact_emails: bool,
    pub redact_phones: bool,
    pub redact_cards: bool,
    /// Replace matches with a short hash so redacted values can still be correlated
    pub hash_for_correlation: bool,
    /// Extra patterns such as policy numbers, with the label used in the replacement
    pub custom_patterns: Vec<(Regex, String)>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            redact_emails: true,
            redact_phones: true,
            redact_cards: true,
            hash_for_correlation: false,
            custom_patterns: Vec::new(),
        }
    }
}

impl RedactionConfig {
    /// Redact anything matching `pattern`, labelling it `label`
    pub fn with_pattern(mut self, pattern: &str, label: &str) -> Result<Self, regex::Error> {
        self.custom_patterns.push((Regex::new(pattern)?, label.to_string()));
        Ok(self)
    }
}

/// PII redactor for log lines and error messages
#[derive(Debug, Clone, Default)]
pub struct PiiRedactor {
    config: RedactionConfig,
}

impl PiiRedactor {
    pub fn new(config: RedactionConfig) -> Self {
        Self { config }
    }

    pub fn redact(&self, text: &str) -> String {
        let mut result = text.to_string();

        if self.config.redact_emails {
            result = EMAIL_REGEX
                .replace_all(&result, |caps: &Captures| self.replacement("EMAIL", &caps[0], || {
                    mask_email(&caps[0])
                }))
                .into_owned();
        }

        // Cards before phones: a 16-digit run also contains a phone-shaped run.
        if self.config.redact_cards {
            result = CARD_REGEX
                .replace_all(&result, |caps: &Captures| self.replacement("CARD", &caps[0], || {
                    format!("****-****-****-{}", &caps[1])
                }))
                .into_owned();
        }

        if self.config.redact_phones {
            result = PHONE_REGEX
                .replace_all(&result, |caps: &Captures| self.replacement("PHONE", &caps[0], || {
                    "***-***-****".to_string()
                }))
                .into_owned();
        }

        for (pattern, label) in &self.config.custom_patterns {
            result = pattern
                .replace_all(&result, |caps: &Captures| self.replacement(label, &caps[0], || {
                    format!("{label}[REDACTED]")
                }))
                .into_owned();
        }

        result
    }

    fn replacement(&self, label: &str, value: &str, mask: impl FnOnce() -> String) -> String {
        if self.config.hash_for_correlation {
            format!("{label}[{}]", hash_value(value))
        } else {
            mask()
        }
    }
}

/// Keep only the first character of a person's name
pub fn mask_name(name: &str) -> String {
    name.split_whitespace()
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => format!("{first}***"),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            let domain_first = domain.chars().next().map(String::from).unwrap_or_default();
            format!("{first}***@{domain_first}***")
        }
        None => "***@***".to_string(),
    }
}

fn hash_value(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    general_purpose::STANDARD_NO_PAD.encode(digest.get(..6).unwrap_or_default())
}
