//! Data model for memberships and notifications

use crate::clock::display_time;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Kind of joinable entity
///
/// Each kind owns an independent collection under its own storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// A class the student attends
    Class,
    /// A quiz the student takes part in
    Quiz,
}

impl Kind {
    /// All kinds, in display order
    pub const ALL: [Kind; 2] = [Kind::Class, Kind::Quiz];

    /// Lowercase label, also the notification id prefix
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Quiz => "quiz",
        }
    }

    /// Title of the notice emitted on join
    #[inline]
    #[must_use]
    pub fn join_title(self) -> &'static str {
        match self {
            Self::Class => "Joined class",
            Self::Quiz => "Joined quiz",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "class" => Ok(Self::Class),
            "quiz" => Ok(Self::Quiz),
            other => Err(format!("unknown kind: {other}")),
        }
    }
}

/// A joined class or quiz
///
/// `code` is the dedup key within a kind. Fields other than `code` and
/// `name` (a class's `lecturer`, for instance) are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipRecord {
    /// Unique code within the kind, compared exactly
    pub code: String,
    /// Display label
    pub name: String,
    /// Opaque pass-through fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MembershipRecord {
    /// Create record with no extra fields
    #[inline]
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            extra: Map::new(),
        }
    }

    /// With an extra pass-through field
    #[inline]
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Get an extra field
    #[inline]
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// Entry in the local notification log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEntry {
    /// `"<kind>-<epochMillis>"` for ledger-generated entries
    pub id: String,
    /// Headline
    pub title: String,
    /// Body text
    pub body: String,
    /// Human-readable creation time
    pub time: String,
    /// Not yet seen by the student
    #[serde(default = "default_unread")]
    pub unread: bool,
}

fn default_unread() -> bool {
    true
}

impl NotificationEntry {
    /// Create unread entry
    #[inline]
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            time: time.into(),
            unread: true,
        }
    }

    /// Entry announcing a join of `kind` named `name` at `at`
    #[must_use]
    pub fn joined(kind: Kind, name: &str, at: &DateTime<Local>) -> Self {
        Self::new(
            format!("{kind}-{}", at.timestamp_millis()),
            kind.join_title(),
            name,
            display_time(at),
        )
    }

    /// Mark as already read
    #[inline]
    #[must_use]
    pub fn read(mut self) -> Self {
        self.unread = false;
        self
    }
}

/// Result of a successful join attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Record was prepended to the collection
    Added,
    /// A record with the same code was already present
    AlreadyJoined,
}

impl JoinOutcome {
    /// Check if the collection changed
    #[inline]
    #[must_use]
    pub fn is_added(self) -> bool {
        matches!(self, Self::Added)
    }
}
