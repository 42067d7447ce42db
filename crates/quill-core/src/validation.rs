//! Input validation, one validator per entity.
//!
//! Create and update paths for the same entity share the same input type, so a
//! rule only ever lives in one place.

use std::borrow::Cow;

use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::DomainError;

/// Registration credentials.
#[derive(Debug, Clone, Validate)]
pub struct Credentials {
    #[validate(
        length(
            min = 2,
            max = 50,
            message = "Username must be between 2 and 50 characters long"
        ),
        custom(function = "letters_and_digits")
    )]
    pub username: String,

    #[validate(
        length(
            min = 3,
            max = 100,
            message = "Password must be between 3 and 100 characters long"
        ),
        custom(function = "password_strength")
    )]
    pub password: String,
}

/// Fields a caller may set on a post.
#[derive(Debug, Clone, Validate)]
pub struct PostInput {
    #[validate(
        length(
            min = 3,
            max = 100,
            message = "Title must be between 3 and 100 characters long"
        ),
        custom(function = "not_blank")
    )]
    pub title: String,

    #[validate(
        length(
            min = 10,
            max = 5000,
            message = "Content must be between 10 and 5000 characters long"
        ),
        custom(function = "not_blank")
    )]
    pub content: String,

    pub category_id: Option<i32>,
}

/// Fields a caller may set on a category.
#[derive(Debug, Clone, Validate)]
pub struct CategoryInput {
    #[validate(
        length(
            min = 2,
            max = 50,
            message = "Category name must be between 2 and 50 characters long"
        ),
        custom(function = "not_blank")
    )]
    pub name: String,

    #[validate(length(
        max = 200,
        message = "Category description cannot exceed 200 characters"
    ))]
    pub description: Option<String>,
}

/// Validate any input type, mapping failures to [`DomainError::Validation`].
pub fn check<T: Validate>(input: &T) -> Result<(), DomainError> {
    input.validate().map_err(DomainError::from)
}

/// Post ids are generated from 1 upwards.
pub fn validate_post_id(id: i32) -> Result<(), DomainError> {
    if id <= 0 {
        return Err(DomainError::Validation("Invalid post ID".to_string()));
    }
    Ok(())
}

/// Flatten validation errors into one message, ordered by field name.
pub fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid ({})", field, e.code),
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn failure(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(failure("blank", "Value cannot be null or empty"));
    }
    Ok(())
}

fn letters_and_digits(username: &str) -> Result<(), ValidationError> {
    if !username.chars().all(char::is_alphanumeric) {
        return Err(failure(
            "username_chars",
            "Username can only contain letters and digits",
        ));
    }
    Ok(())
}

fn password_strength(password: &str) -> Result<(), ValidationError> {
    if !password.chars().any(char::is_uppercase) {
        return Err(failure(
            "password_upper",
            "Password must contain at least one uppercase letter",
        ));
    }
    if !password.chars().any(char::is_lowercase) {
        return Err(failure(
            "password_lower",
            "Password must contain at least one lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(failure(
            "password_digit",
            "Password must contain at least one digit",
        ));
    }
    if password.chars().all(char::is_alphanumeric) {
        return Err(failure(
            "password_special",
            "Password must contain at least one special character",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    fn validation_message(result: Result<(), DomainError>) -> String {
        match result {
            Err(DomainError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn accepts_strong_credentials() {
        assert!(check(&credentials("alice", "Secret1!")).is_ok());
    }

    #[test]
    fn password_without_digit_is_rejected() {
        let msg = validation_message(check(&credentials("alice", "Secret!!")));
        assert!(msg.contains("digit"), "{msg}");
    }

    #[test]
    fn password_without_special_character_is_rejected() {
        let msg = validation_message(check(&credentials("alice", "Secret11")));
        assert!(msg.contains("special"), "{msg}");
    }

    #[test]
    fn password_without_upper_or_lower_is_rejected() {
        assert!(check(&credentials("alice", "secret1!")).is_err());
        assert!(check(&credentials("alice", "SECRET1!")).is_err());
    }

    #[test]
    fn username_rules() {
        assert!(check(&credentials("a", "Secret1!")).is_err());
        assert!(check(&credentials("al ice", "Secret1!")).is_err());
        assert!(check(&credentials("al_ice", "Secret1!")).is_err());
        assert!(check(&credentials(&"a".repeat(51), "Secret1!")).is_err());
        assert!(check(&credentials(&"a".repeat(50), "Secret1!")).is_ok());
    }

    #[test]
    fn post_length_bounds() {
        let post = |title: &str, content: &str| PostInput {
            title: title.to_string(),
            content: content.to_string(),
            category_id: None,
        };

        assert!(check(&post("Hello World", "1234567890")).is_ok());
        assert!(check(&post("Hi", "1234567890")).is_err());
        assert!(check(&post("Hello", "123456789")).is_err());
        assert!(check(&post(&"t".repeat(101), "1234567890")).is_err());
        assert!(check(&post("Hello", &"c".repeat(5001))).is_err());
        assert!(check(&post("   ", "1234567890")).is_err());
    }

    #[test]
    fn failures_are_reported_per_field_in_order() {
        let input = PostInput {
            title: "Hi".to_string(),
            content: "short".to_string(),
            category_id: None,
        };
        let msg = validation_message(check(&input));
        let content_at = msg.find("Content").unwrap();
        let title_at = msg.find("Title").unwrap();
        assert!(content_at < title_at, "{msg}");
    }

    #[test]
    fn category_rules() {
        let category = |name: &str, description: Option<&str>| CategoryInput {
            name: name.to_string(),
            description: description.map(str::to_string),
        };

        assert!(check(&category("Tech", None)).is_ok());
        assert!(check(&category("Tech", Some(&"d".repeat(200)))).is_ok());
        assert!(check(&category("T", None)).is_err());
        assert!(check(&category("Tech", Some(&"d".repeat(201)))).is_err());
    }

    #[test]
    fn post_ids_must_be_positive() {
        assert!(validate_post_id(1).is_ok());
        assert!(validate_post_id(0).is_err());
        assert!(validate_post_id(-4).is_err());
    }
}
