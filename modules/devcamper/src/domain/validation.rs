//! Field rules shared by the create and update paths.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::contract::model::{Career, MinimumSkill, Role};
use crate::domain::error::{DomainError, FieldError};

static WEBSITE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"https?://(www\.)?[-a-zA-Z0-9@:%._\+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_\+.~#?&//=]*)",
    )
    .expect("valid website regex")
});

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\w+([\.-]?\w+)*@\w+([\.-]?\w+)*(\.\w{2,3})+$")
        .expect("valid email regex")
});

pub const MAX_NAME_LEN: usize = 50;
pub const MAX_DESCRIPTION_LEN: usize = 500;
pub const MAX_PHONE_LEN: usize = 20;
pub const MAX_REVIEW_TITLE_LEN: usize = 100;
pub const MIN_PASSWORD_LEN: usize = 6;

pub fn is_valid_email(raw: &str) -> bool {
    EMAIL_RE.is_match(raw)
}

pub fn is_valid_website(raw: &str) -> bool {
    WEBSITE_RE.is_match(raw)
}

/// Collects every failed rule so one response can report all of them.
#[derive(Debug, Default)]
pub struct Violations(Vec<FieldError>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.push(field, message);
        }
    }

    pub fn required(&mut self, value: &str, field: &str, message: &str) {
        self.check(!value.trim().is_empty(), field, message);
    }

    pub fn max_len(&mut self, value: &str, max: usize, field: &str, message: &str) {
        self.check(value.chars().count() <= max, field, message);
    }

    pub fn website(&mut self, value: Option<&str>) {
        if let Some(v) = value {
            self.check(
                is_valid_website(v),
                "website",
                "Please use a valid URL with HTTP or HTTPS",
            );
        }
    }

    pub fn email(&mut self, value: &str) {
        self.check(is_valid_email(value), "email", "Please add a valid email");
    }

    /// Parse career labels; reports unknown ones and an empty list.
    pub fn careers(&mut self, labels: &[String]) -> Vec<Career> {
        if labels.is_empty() {
            self.push("careers", "Please add at least one career");
            return Vec::new();
        }
        let mut out = Vec::with_capacity(labels.len());
        for label in labels {
            match Career::from_label(label) {
                Some(c) if !out.contains(&c) => out.push(c),
                Some(_) => {}
                None => self.push("careers", format!("`{label}` is not a valid career")),
            }
        }
        out
    }

    pub fn minimum_skill(&mut self, raw: &str) -> Option<MinimumSkill> {
        if raw.trim().is_empty() {
            self.push("minimumSkill", "Please add a minimum skill");
            return None;
        }
        let skill = MinimumSkill::parse(raw);
        if skill.is_none() {
            self.push(
                "minimumSkill",
                "Minimum skill must be beginner, intermediate or advanced",
            );
        }
        skill
    }

    pub fn rating(&mut self, rating: Option<f64>) {
        match rating {
            None => self.push("rating", "Please add a rating between 1-10"),
            Some(r) => self.check(
                (1.0..=10.0).contains(&r),
                "rating",
                "Please add a rating between 1-10",
            ),
        }
    }

    /// `allowed` lists the roles the caller may assign.
    pub fn role(&mut self, raw: Option<&str>, allowed: &[Role]) -> Role {
        let Some(raw) = raw else {
            return Role::User;
        };
        match Role::parse(raw) {
            Some(role) if allowed.contains(&role) => role,
            _ => {
                let names: Vec<&str> = allowed.iter().map(Role::as_str).collect();
                self.push("role", format!("Role must be one of: {}", names.join(", ")));
                Role::User
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), DomainError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation { errors: self.0 })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn website_requires_scheme() {
        assert!(is_valid_website("https://devworks.com"));
        assert!(is_valid_website("http://www.example.io/path?x=1"));
        assert!(!is_valid_website("devworks.com"));
        assert!(!is_valid_website("ftp://devworks.com"));
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("john@gmail.com"));
        assert!(is_valid_email("first.last@mail.example.org"));
        assert!(!is_valid_email("john@"));
        assert!(!is_valid_email("not an email"));
    }

    #[test]
    fn collects_every_violation() {
        let mut v = Violations::new();
        v.required("", "name", "Please add a name");
        v.max_len(&"x".repeat(51), MAX_NAME_LEN, "name", "Name cannot be more than 50 characters");
        v.rating(Some(11.0));
        match v.into_result() {
            Err(DomainError::Validation { errors }) => {
                assert_eq!(errors.len(), 3);
                assert_eq!(errors[2].field, "rating");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn careers_are_parsed_and_deduplicated() {
        let mut v = Violations::new();
        let careers = v.careers(&[
            "Web Development".to_string(),
            "UI/UX".to_string(),
            "Web Development".to_string(),
        ]);
        assert!(v.is_empty());
        assert_eq!(careers, vec![Career::WebDevelopment, Career::UiUx]);

        let mut v = Violations::new();
        v.careers(&["Cooking".to_string()]);
        assert!(!v.is_empty());
    }

    #[test]
    fn admin_role_is_not_self_assignable() {
        let mut v = Violations::new();
        let role = v.role(Some("admin"), &[Role::User, Role::Publisher]);
        assert_eq!(role, Role::User);
        assert!(!v.is_empty());

        let mut v = Violations::new();
        assert_eq!(v.role(Some("publisher"), &[Role::User, Role::Publisher]), Role::Publisher);
        assert_eq!(v.role(None, &[Role::User]), Role::User);
        assert!(v.is_empty());
    }
}
