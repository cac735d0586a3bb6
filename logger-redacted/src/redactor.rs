use base64::{engine::general_purpose, Engine as _};
use lazy_static::lazy_static;
use regex::Regex;
use sha2::{Digest, Sha256};

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap();
    static ref PHONE_REGEX: Regex = Regex::new(r"(?:\+1[-.\s]?)?(?:\(\d{3}\)|\b\d{3})[-.\s]?\d{3}[-.\s]?\d{4}\b").unwrap();
    static ref SSN_REGEX: Regex = Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap();
    static ref MRN_REGEX: Regex = Regex::new(r"(?i)\bMRN[-:\s]?\d{4,}\b").unwrap();
}

/// PII / PHI redaction configuration
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub redact_emails: bool,
    pub redact_phones: bool,
    pub redact_ssn: bool,
    pub redact_mrn: bool,
    /// Replace matches with a short hash instead of a mask, so the same
    /// value can be correlated across log lines
    pub hash_for_correlation: bool,
    pub custom_patterns: Vec<(Regex, String)>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            redact_emails: true,
            redact_phones: true,
            redact_ssn: true,
            redact_mrn: true,
            hash_for_correlation: true,
            custom_patterns: Vec::new(),
        }
    }
}

impl RedactionConfig {
    /// Pass text through untouched (`redact_logs: false`)
    pub fn disabled() -> Self {
        Self {
            redact_emails: false,
            redact_phones: false,
            redact_ssn: false,
            redact_mrn: false,
            hash_for_correlation: false,
            custom_patterns: Vec::new(),
        }
    }
}

/// Redactor for log messages.
///
/// Besides pattern-based PII, a redactor can be taught the doctor and patient
/// names of the session it logs for; those are replaced wherever they appear.
#[derive(Debug, Clone, Default)]
pub struct PiiRedactor {
    config: RedactionConfig,
    names: Vec<Regex>,
}

impl PiiRedactor {
    pub fn new(config: RedactionConfig) -> Self {
        Self { config, names: Vec::new() }
    }

    /// Register names that must never reach a log verbatim. Blank names are skipped.
    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            if let Ok(re) = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(name))) {
                self.names.push(re);
            }
        }
        self
    }

    pub fn redact(&self, text: &str) -> String {
        let mut result = text.to_string();

        for name in &self.names {
            result = name
                .replace_all(&result, |caps: &regex::Captures| self.mask("NAME", &caps[0], "[NAME]"))
                .to_string();
        }

        if self.config.redact_emails {
            result = self.replace(&EMAIL_REGEX, &result, "EMAIL", "***@***");
        }

        if self.config.redact_ssn {
            result = self.replace(&SSN_REGEX, &result, "SSN", "***-**-****");
        }

        if self.config.redact_phones {
            result = self.replace(&PHONE_REGEX, &result, "PHONE", "(***) ***-****");
        }

        if self.config.redact_mrn {
            result = self.replace(&MRN_REGEX, &result, "MRN", "MRN******");
        }

        for (pattern, replacement) in &self.config.custom_patterns {
            result = pattern.replace_all(&result, replacement.as_str()).to_string();
        }

        result
    }

    /// Describe clinical free text (transcripts, summaries) without its content
    pub fn describe_text(&self, text: &str) -> String {
        if text.is_empty() {
            return "TEXT[empty]".to_string();
        }
        format!("TEXT[{} chars, {}]", text.chars().count(), self.hash_value(text))
    }

    fn replace(&self, pattern: &Regex, text: &str, label: &str, masked: &str) -> String {
        pattern
            .replace_all(text, |caps: &regex::Captures| self.mask(label, &caps[0], masked))
            .to_string()
    }

    fn mask(&self, label: &str, value: &str, masked: &str) -> String {
        if self.config.hash_for_correlation {
            format!("{}[{}]", label, self.hash_value(value))
        } else {
            masked.to_string()
        }
    }

    fn hash_value(&self, value: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(value.to_lowercase().as_bytes());
        let result = hasher.finalize();
        general_purpose::STANDARD_NO_PAD.encode(&result[..6])
    }
}
