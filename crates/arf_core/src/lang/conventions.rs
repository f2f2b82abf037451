//! Shared naming conventions and well-known constants.
//!
//! ## Examples
//! ```rust
//! use arf_core::lang::conventions::{self, NamingConvention};
//!
//! assert!(NamingConvention::CamelCase.accepts("ContactList"));
//! assert!(NamingConvention::SnakeCase.accepts("first_name"));
//! assert!(conventions::is_reserved("string"));
//! assert!(conventions::is_reserved("service"));
//! ```

use super::{keywords, primitives};

/// Extension appended to import literals that do not carry one.
pub const FILE_EXTENSION: &str = "arf";

/// A naming rule applied to declared identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamingConvention {
    /// `ContactList`: struct, enum and service names.
    CamelCase,
    /// `GetContact` or `getContact`: method names.
    MethodCase,
    /// `first_name`: fields, parameters, package components and import aliases.
    SnakeCase,
    /// `PHONE_HOME`: enum options.
    ScreamingSnakeCase,
}

impl NamingConvention {
    /// Return `true` if `name` follows this convention.
    pub fn accepts(self, name: &str) -> bool {
        match self {
            NamingConvention::CamelCase => is_camel_case(name),
            NamingConvention::MethodCase => is_method_case(name),
            NamingConvention::SnakeCase => is_snake_case(name),
            NamingConvention::ScreamingSnakeCase => is_screaming_snake_case(name),
        }
    }

    /// Human-readable name of the convention, for diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            NamingConvention::CamelCase => "CamelCase",
            NamingConvention::MethodCase => "CamelCase or camelCase",
            NamingConvention::SnakeCase => "snake_case",
            NamingConvention::ScreamingSnakeCase => "SCREAMING_SNAKE_CASE",
        }
    }
}

/// `[A-Z][A-Za-z0-9]*`
pub fn is_camel_case(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase()) && chars.all(|c| c.is_ascii_alphanumeric())
}

/// `[A-Za-z][A-Za-z0-9]*`
pub fn is_method_case(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic()) && chars.all(|c| c.is_ascii_alphanumeric())
}

/// `[a-z][a-z0-9]*(_[a-z0-9]+)*`
pub fn is_snake_case(name: &str) -> bool {
    words_match(name, |c| c.is_ascii_lowercase(), |c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

/// `[A-Z][A-Z0-9]*(_[A-Z0-9]+)*`
pub fn is_screaming_snake_case(name: &str) -> bool {
    words_match(name, |c| c.is_ascii_uppercase(), |c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// Return `true` if `name` is a language keyword or a primitive type name.
///
/// ## Notes
/// - The check is exact and case-sensitive: `String` is not reserved, `string` is.
pub fn is_reserved(name: &str) -> bool {
    keywords::from_str(name).is_some() || primitives::from_str(name).is_some()
}

/// Shared shape of the two underscore-separated conventions: the first word starts with `first`, every
/// character is `rest`, and words are separated by exactly one underscore.
fn words_match(name: &str, first: impl Fn(char) -> bool, rest: impl Fn(char) -> bool) -> bool {
    if !name.chars().next().is_some_and(&first) {
        return false;
    }
    name.split('_').all(|word| !word.is_empty() && word.chars().all(&rest))
}
