use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

// Visibility tier of a snippet
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Personal,
    Team,
    Org,
}

// Workflow state of a snippet; only published snippets are eligible for insertion
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Draft,
    Published,
    Deprecated,
    Archived,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Snippet {
    pub id: String,
    pub name: String,
    pub body: String,
    pub shortcut: Option<String>,
    pub category: Option<String>,
    pub owner_id: String,
    pub scope: Scope,
    pub status: Status,
    pub version: u32,
    pub tags: Option<String>, // comma-joined
    pub usage_count: u64,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    // Populated from the owning user when returning to the client, never stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
}

// Immutable snapshot of a snippet's content fields at one version number.
// Unique per (snippet_id, version); deleted only when the parent snippet is.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SnippetVersion {
    pub id: String,
    pub snippet_id: String,
    pub version: u32,
    pub name: String,
    pub body: String,
    pub shortcut: Option<String>,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CreateSnippetRequest {
    pub name: String,
    pub body: String,
    pub shortcut: Option<String>,
    pub category: Option<String>,
    pub scope: Option<Scope>,
    pub status: Option<Status>,
    pub tags: Option<String>,
}

// Partial update: absent fields keep their prior values
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct UpdateSnippetRequest {
    pub name: Option<String>,
    pub body: Option<String>,
    pub shortcut: Option<String>,
    pub category: Option<String>,
    pub scope: Option<Scope>,
    pub status: Option<Status>,
    pub tags: Option<String>,
}

impl UpdateSnippetRequest {
    // Version history tracks content, not workflow state: only these four
    // fields cause a version bump and a snapshot row
    pub fn touches_content(&self) -> bool {
        self.name.is_some()
            || self.body.is_some()
            || self.shortcut.is_some()
            || self.category.is_some()
    }
}

// Query-string filters for the list operation
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct SnippetFilters {
    pub status: Option<Status>,
    pub category: Option<String>,
    pub scope: Option<Scope>,
    pub search: Option<String>,
}
