// EntPost - the blog post that comments hang off

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::Entity;
use crate::core::{EntityType, PostId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Option<PostId>,
    pub title: String,
    pub slug: String,
    pub published_at: DateTime<Utc>,
    pub author: UserId,
}

impl Post {
    pub fn new(title: impl Into<String>, author: UserId) -> Self {
        let title = title.into();
        let slug = slugify(&title);
        Self {
            id: None,
            title,
            slug,
            published_at: Utc::now().trunc_subsecs(6),
            author,
        }
    }
}

impl Entity for Post {
    fn entity_type() -> EntityType {
        EntityType::Post
    }
}

/// Lowercase ASCII slug, runs of other characters collapse to one dash.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
