use crate::model::{Coaching, MembershipPlan, StudentStatus};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"));

pub const MIN_AGE: i64 = 1;
pub const MAX_AGE: i64 = 100;

/// Raw form input for the add/edit dialog. Age stays a string until
/// validation so that non-numeric input can be reported, not lost.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentDraft {
    pub name: String,
    pub age: String,
    pub email: String,
    pub coaching: Coaching,
    pub status: StudentStatus,
    pub plan: MembershipPlan,
}

impl Default for StudentDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            age: String::new(),
            email: String::new(),
            coaching: Coaching::Coach,
            status: StudentStatus::Active,
            plan: MembershipPlan::Monthly,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidStudent {
    pub name: String,
    pub age: i64,
    pub email: String,
    pub coaching: Coaching,
    pub status: StudentStatus,
    pub plan: MembershipPlan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in all required fields (Name, Age, and Email)")]
    MissingRequired,
    #[error("Please enter a valid age between 1 and 100")]
    InvalidAge,
    #[error("Please enter a valid email address")]
    InvalidEmail,
}

impl ValidationError {
    pub fn field(self) -> &'static str {
        match self {
            Self::MissingRequired => "required",
            Self::InvalidAge => "age",
            Self::InvalidEmail => "email",
        }
    }
}

pub fn parse_age(raw: &str) -> Result<i64, ValidationError> {
    let age = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidAge)?;
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(ValidationError::InvalidAge);
    }
    Ok(age)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Checks run in the order the form reports them: presence first, then age,
/// then email shape.
pub fn validate_draft(draft: &StudentDraft) -> Result<ValidStudent, ValidationError> {
    let name = draft.name.trim();
    let email = draft.email.trim();
    if name.is_empty() || draft.age.trim().is_empty() || email.is_empty() {
        return Err(ValidationError::MissingRequired);
    }

    let age = parse_age(&draft.age)?;
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }

    Ok(ValidStudent {
        name: name.to_string(),
        age,
        email: email.to_string(),
        coaching: draft.coaching,
        status: draft.status,
        plan: draft.plan,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, age: &str, email: &str) -> StudentDraft {
        StudentDraft {
            name: name.into(),
            age: age.into(),
            email: email.into(),
            ..StudentDraft::default()
        }
    }

    #[test]
    fn age_bounds_are_inclusive() {
        assert_eq!(parse_age("1"), Ok(1));
        assert_eq!(parse_age("100"), Ok(100));
        assert_eq!(parse_age(" 42 "), Ok(42));
        assert_eq!(parse_age("0"), Err(ValidationError::InvalidAge));
        assert_eq!(parse_age("101"), Err(ValidationError::InvalidAge));
        assert_eq!(parse_age("abc"), Err(ValidationError::InvalidAge));
        assert_eq!(parse_age("12.5"), Err(ValidationError::InvalidAge));
    }

    #[test]
    fn empty_age_is_a_missing_field() {
        assert_eq!(
            validate_draft(&draft("Ana", "", "ana@pool.co")),
            Err(ValidationError::MissingRequired)
        );
        assert_eq!(
            validate_draft(&draft("Ana", "abc", "ana@pool.co")),
            Err(ValidationError::InvalidAge)
        );
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a.com"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("a b@c.de"));
        assert!(!is_valid_email("a@@b.co"));
    }

    #[test]
    fn blank_name_or_email_is_missing() {
        assert_eq!(
            validate_draft(&draft("   ", "10", "a@b.co")),
            Err(ValidationError::MissingRequired)
        );
        assert_eq!(
            validate_draft(&draft("Ana", "10", "  ")),
            Err(ValidationError::MissingRequired)
        );
        assert_eq!(
            validate_draft(&draft("Ana", "10", "a@b")),
            Err(ValidationError::InvalidEmail)
        );
    }

    #[test]
    fn valid_draft_is_trimmed() {
        let v = validate_draft(&draft("  Ana Costa ", "9", " ana@pool.co ")).expect("valid");
        assert_eq!(v.name, "Ana Costa");
        assert_eq!(v.email, "ana@pool.co");
        assert_eq!(v.age, 9);
        assert_eq!(v.plan, MembershipPlan::Monthly);
    }
}
