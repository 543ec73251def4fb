//! Request payload validation.
//!
//! Payload types implement [`Validate`] by chaining rules on a
//! [`Validator`]. Violations come back in the order the rules were declared.

use serde::Serialize;

/// A single failed constraint on a payload field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Violation {
    pub fn new(field: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            tag: tag.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

pub trait Validate {
    fn validate(&self) -> Vec<Violation>;
}

/// Values that can be checked by the `required` rule.
pub trait Presence {
    fn is_present(&self) -> bool;
}

impl Presence for Option<String> {
    fn is_present(&self) -> bool {
        self.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false)
    }
}

impl Presence for Option<f64> {
    fn is_present(&self) -> bool {
        self.is_some()
    }
}

/// Rule builder. Each field yields at most one violation: once a field has
/// failed, later rules on the same field are skipped.
#[derive(Debug, Default)]
pub struct Validator {
    violations: Vec<Violation>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required<T: Presence>(mut self, field: &str, value: &T) -> Self {
        if !self.has_failed(field) && !value.is_present() {
            self.violations.push(Violation::new(field, "required"));
        }
        self
    }

    /// Basic `local@domain.tld` shape check, skipped when the value is absent.
    pub fn email(mut self, field: &str, value: Option<&str>) -> Self {
        if let Some(email) = value {
            if !self.has_failed(field) && !looks_like_email(email) {
                self.violations.push(Violation::new(field, "email"));
            }
        }
        self
    }

    /// Case-insensitive membership check, skipped when the value is absent.
    pub fn one_of(mut self, field: &str, value: Option<&str>, allowed: &[&str]) -> Self {
        if let Some(v) = value {
            let matches = allowed.iter().any(|a| a.eq_ignore_ascii_case(v.trim()));
            if !self.has_failed(field) && !matches {
                self.violations
                    .push(Violation::new(field, "oneof").with_value(allowed.join(" ")));
            }
        }
        self
    }

    /// Rejects supplied-but-blank strings on partial updates.
    pub fn not_blank(mut self, field: &str, value: Option<&str>) -> Self {
        if let Some(v) = value {
            if !self.has_failed(field) && v.trim().is_empty() {
                self.violations.push(Violation::new(field, "required"));
            }
        }
        self
    }

    /// Calendar date in `YYYY-MM-DD` form, skipped when the value is absent.
    pub fn date(mut self, field: &str, value: Option<&str>) -> Self {
        if let Some(v) = value {
            let valid = chrono::NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").is_ok();
            if !self.has_failed(field) && !valid {
                self.violations
                    .push(Violation::new(field, "date").with_value("YYYY-MM-DD"));
            }
        }
        self
    }

    pub fn finish(self) -> Vec<Violation> {
        self.violations
    }

    fn has_failed(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

fn looks_like_email(email: &str) -> bool {
    let mut parts = email.trim().split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_reports_missing_and_blank_fields_in_order() {
        let name: Option<String> = None;
        let email = Some("   ".to_string());
        let amount: Option<f64> = None;

        let violations = Validator::new()
            .required("name", &name)
            .required("email", &email)
            .required("amount", &amount)
            .finish();

        let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "email", "amount"]);
        assert!(violations.iter().all(|v| v.tag == "required"));
    }

    #[test]
    fn a_field_is_reported_once() {
        let email: Option<String> = None;
        let violations = Validator::new()
            .required("email", &email)
            .email("email", email.as_deref())
            .required("email", &email)
            .finish();
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn zero_is_a_present_number() {
        let amount = Some(0.0);
        assert!(Validator::new().required("amount", &amount).finish().is_empty());
    }

    #[test]
    fn email_shape() {
        assert!(looks_like_email("ann@x.com"));
        assert!(!looks_like_email("ann"));
        assert!(!looks_like_email("ann@x"));
        assert!(!looks_like_email("@x.com"));
        assert!(!looks_like_email("a@b@c.com"));
    }

    #[test]
    fn one_of_carries_allowed_values() {
        let violations = Validator::new()
            .one_of("status", Some("lost"), &["pending", "paid"])
            .finish();
        assert_eq!(violations[0].tag, "oneof");
        assert_eq!(violations[0].value.as_deref(), Some("pending paid"));

        assert!(Validator::new()
            .one_of("status", Some("PAID"), &["pending", "paid"])
            .finish()
            .is_empty());
    }

    #[test]
    fn date_must_be_a_calendar_day() {
        let check = |v: &str| Validator::new().date("date", Some(v)).finish();
        assert!(check("2024-02-29").is_empty());
        assert_eq!(check("2023-02-29")[0].tag, "date");
        assert_eq!(check("03/01/2024")[0].value.as_deref(), Some("YYYY-MM-DD"));
        assert!(Validator::new().date("date", None).finish().is_empty());
    }
}
