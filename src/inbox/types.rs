//! Inbox types for Inboxen.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use chrono::{DateTime, Utc};

/// Inbox flag bitmask, stored as an integer column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct InboxFlags(i64);

impl InboxFlags {
    /// No flags set.
    pub const EMPTY: InboxFlags = InboxFlags(0);
    /// The owner deleted the inbox; the address stays reserved.
    pub const DELETED: InboxFlags = InboxFlags(1);
    /// The inbox has unread mail.
    pub const NEW: InboxFlags = InboxFlags(1 << 1);
    /// Keep this inbox out of the unified inbox view.
    pub const EXCLUDE_FROM_UNIFIED: InboxFlags = InboxFlags(1 << 2);
    /// Incoming mail for this inbox is rejected.
    pub const DISABLED: InboxFlags = InboxFlags(1 << 3);

    /// Build flags from a stored value.
    pub fn from_bits(bits: i64) -> Self {
        InboxFlags(bits)
    }

    /// Stored value of these flags.
    pub fn bits(&self) -> i64 {
        self.0
    }

    /// Check whether every flag in `other` is set.
    pub fn contains(&self, other: InboxFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set or clear the flags in `other`.
    pub fn set(&mut self, other: InboxFlags, value: bool) {
        if value {
            self.0 |= other.0;
        } else {
            self.0 &= !other.0;
        }
    }
}

impl BitOr for InboxFlags {
    type Output = InboxFlags;

    fn bitor(self, rhs: InboxFlags) -> InboxFlags {
        InboxFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for InboxFlags {
    fn bitor_assign(&mut self, rhs: InboxFlags) {
        self.0 |= rhs.0;
    }
}

/// An inbox: one address under one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbox {
    /// Inbox ID.
    pub id: i64,
    /// Local part of the address (unique per domain).
    pub inbox: String,
    /// Owning domain ID.
    pub domain_id: i64,
    /// Owning domain name.
    pub domain: String,
    /// Owner, if any.
    pub user_id: Option<i64>,
    /// Creation timestamp (UTC).
    pub created_at: DateTime<Utc>,
    /// Flags.
    pub flags: InboxFlags,
    /// Free-form description set by the owner.
    pub description: Option<String>,
}

impl Inbox {
    /// Full email address of this inbox.
    pub fn address(&self) -> String {
        format!("{}@{}", self.inbox, self.domain)
    }

    /// Check whether the inbox is flagged deleted.
    pub fn is_deleted(&self) -> bool {
        self.flags.contains(InboxFlags::DELETED)
    }
}

impl fmt::Display for Inbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.inbox, self.domain)
    }
}

/// Optional fields for a new inbox.
#[derive(Debug, Clone, Default)]
pub struct InboxOptions {
    /// Owner.
    pub user_id: Option<i64>,
    /// Initial flags.
    pub flags: InboxFlags,
    /// Description.
    pub description: Option<String>,
}

impl InboxOptions {
    /// Options with nothing set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the owner.
    pub fn with_user(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Set the initial flags.
    pub fn with_flags(mut self, flags: InboxFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// How lookups treat the deleted flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletedFilter {
    /// Only inboxes flagged deleted.
    Deleted,
    /// Only inboxes not flagged deleted.
    #[default]
    NotDeleted,
    /// Ignore the flag.
    Any,
}

/// Internal struct for mapping joined inbox rows.
#[derive(sqlx::FromRow)]
pub(crate) struct InboxRow {
    id: i64,
    inbox: String,
    domain_id: i64,
    domain: String,
    user_id: Option<i64>,
    created_at: DateTime<Utc>,
    flags: i64,
    description: Option<String>,
}

impl InboxRow {
    pub(crate) fn into_inbox(self) -> Inbox {
        Inbox {
            id: self.id,
            inbox: self.inbox,
            domain_id: self.domain_id,
            domain: self.domain,
            user_id: self.user_id,
            created_at: self.created_at,
            flags: InboxFlags::from_bits(self.flags),
            description: self.description,
        }
    }
}
