//! ORDER BY support: sort directions and identifier allow-lists.
//!
//! Column identifiers cannot be bound as parameters, so any identifier that
//! varies per request must be checked before it is written into a statement.
//! [`FieldAllowList`] performs that check and substitutes a default when the
//! requested field is not permitted.

use std::fmt;

/// Maximum length accepted by [`is_valid_identifier`].
pub const MAX_IDENTIFIER_LEN: usize = 50;

/// Sort direction for an ORDER BY clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    #[default]
    Desc,
}

impl SortDirection {
    /// Parses a direction leniently.
    ///
    /// `asc` and `desc` are accepted in any case. Anything else yields
    /// [`SortDirection::Desc`].
    #[must_use]
    pub fn parse_lenient(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("asc") {
            Self::Asc
        } else {
            Self::Desc
        }
    }

    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Returns true if `name` is a plain identifier: 1 to 50 ASCII letters,
/// digits or underscores.
#[must_use]
pub fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_IDENTIFIER_LEN
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Policy {
    Explicit(&'static [&'static str]),
    CharacterClass,
}

/// The set of identifiers a caller may sort by, plus the fallback used when
/// a request names anything else.
///
/// Prefer [`FieldAllowList::explicit`]. The character-class list only rejects
/// injection syntax; it still lets a caller name any real column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldAllowList {
    policy: Policy,
    default_field: &'static str,
}

impl FieldAllowList {
    /// Creates an allow-list of explicitly enumerated columns.
    ///
    /// `default_field` is returned for any field not in `fields`.
    #[must_use]
    pub const fn explicit(fields: &'static [&'static str], default_field: &'static str) -> Self {
        Self {
            policy: Policy::Explicit(fields),
            default_field,
        }
    }

    /// Creates an allow-list that accepts any [`is_valid_identifier`] name.
    #[must_use]
    pub const fn character_class(default_field: &'static str) -> Self {
        Self {
            policy: Policy::CharacterClass,
            default_field,
        }
    }

    /// Returns the fallback field.
    #[must_use]
    pub const fn default_field(&self) -> &'static str {
        self.default_field
    }

    /// Returns true if `field` may be placed in a statement as-is.
    #[must_use]
    pub fn permits(&self, field: &str) -> bool {
        match self.policy {
            Policy::Explicit(fields) => fields.contains(&field),
            Policy::CharacterClass => is_valid_identifier(field),
        }
    }

    /// Returns `field` if permitted, otherwise the default field.
    #[must_use]
    pub fn resolve<'a>(&self, field: &'a str) -> &'a str {
        if self.permits(field) {
            field
        } else {
            self.default_field
        }
    }
}

impl Default for FieldAllowList {
    fn default() -> Self {
        Self::character_class("created_at")
    }
}
