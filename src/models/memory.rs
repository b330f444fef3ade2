use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_CONTEXT_LEN: usize = 1000;
pub const MAX_TAG_LEN: usize = 50;
pub const MAX_DETAIL_LEN: usize = 2000;

/// A saved note record, always owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub title: String,
    pub context: String,
    pub tag: String,
    pub detail: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Validated memory content as submitted by the client.
///
/// Updates replace all four fields wholesale: an omitted optional field is
/// written back as empty, matching the client's full-form submission model.
#[derive(Debug, Clone)]
pub struct MemoryFields {
    pub title: String,
    pub context: String,
    pub tag: String,
    pub detail: String,
}

impl MemoryFields {
    /// Trim and validate client-submitted fields at the service boundary.
    pub fn validate(
        title: Option<&str>,
        context: Option<&str>,
        tag: Option<&str>,
        detail: Option<&str>,
    ) -> Result<Self, String> {
        let title = title.unwrap_or("").trim().to_string();
        if title.is_empty() {
            return Err("Title is required".to_string());
        }
        if title.len() > MAX_TITLE_LEN {
            return Err(format!("Title must be at most {} characters", MAX_TITLE_LEN));
        }

        let context = context.unwrap_or("").trim().to_string();
        if context.len() > MAX_CONTEXT_LEN {
            return Err(format!(
                "Context must be at most {} characters",
                MAX_CONTEXT_LEN
            ));
        }

        let tag = tag.unwrap_or("").trim().to_string();
        if tag.len() > MAX_TAG_LEN {
            return Err(format!("Tag must be at most {} characters", MAX_TAG_LEN));
        }

        let detail = detail.unwrap_or("").trim().to_string();
        if detail.len() > MAX_DETAIL_LEN {
            return Err(format!(
                "Detail must be at most {} characters",
                MAX_DETAIL_LEN
            ));
        }

        Ok(Self {
            title,
            context,
            tag,
            detail,
        })
    }
}

/// Search scope selector for the list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFilter {
    Title,
    Context,
    Tag,
    All,
}

impl FieldFilter {
    /// Unrecognized values yield `None`, which disables filtering.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "title" => Some(Self::Title),
            "context" => Some(Self::Context),
            "tag" => Some(Self::Tag),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}
