// Domain entities for the blog: authors, groups, posts, comments and follows

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type AuthorId = i64;
pub type GroupId = i64;
pub type PostId = i64;
pub type CommentId = i64;

/// Number of characters of a post shown in its short representation
pub const POST_SUMMARY_CHARS: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    pub username: String,
    pub full_name: String,
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.username)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: AuthorId,
    pub group_id: Option<GroupId>,
    /// Storage path relative to the media root, e.g. `posts/cat.gif`
    pub image: Option<String>,
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary: String = self.text.chars().take(POST_SUMMARY_CHARS).collect();
        write!(f, "{}", summary)
    }
}

/// Author and group summaries embedded in listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    pub id: AuthorId,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
    pub id: GroupId,
    pub title: String,
    pub slug: String,
}

/// A post joined with its author and group, as listed on every feed page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostView {
    pub id: PostId,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub image: Option<String>,
    pub author: AuthorRef,
    pub group: Option<GroupRef>,
}

impl PostView {
    pub fn is_owned_by(&self, author: &Author) -> bool {
        self.author.id == author.id
    }

    /// Public URL of the attached image
    pub fn image_url(&self) -> Option<String> {
        self.image.as_ref().map(|path| format!("/media/{}", path))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author: AuthorRef,
    pub text: String,
    pub pub_date: DateTime<Utc>,
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Directed subscription: `user` follows `author`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow {
    pub id: i64,
    pub author: AuthorRef,
    pub user: AuthorRef,
}

impl fmt::Display for Follow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} follows {}", self.user.username, self.author.username)
    }
}

/// Which slice of the post table a feed shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(GroupId),
    Author(AuthorId),
    FollowedBy(AuthorId),
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub text: String,
    pub author_id: AuthorId,
    pub group_id: Option<GroupId>,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PostChanges {
    pub text: String,
    pub group_id: Option<GroupId>,
    /// `None` keeps the current image
    pub image: Option<String>,
}

pub fn current_time_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_display_is_truncated() {
        let post = Post {
            id: 1,
            text: "Post text Post text".to_string(),
            pub_date: Utc::now(),
            author_id: 1,
            group_id: None,
            image: None,
        };
        assert_eq!(post.to_string(), "Post text Post ");
    }

    #[test]
    fn test_post_display_counts_characters_not_bytes() {
        let post = Post {
            id: 1,
            text: "Текст поста Текст поста".to_string(),
            pub_date: Utc::now(),
            author_id: 1,
            group_id: None,
            image: None,
        };
        assert_eq!(post.to_string(), "Текст поста Тек");
    }

    #[test]
    fn test_follow_display() {
        let follow = Follow {
            id: 1,
            author: AuthorRef { id: 1, username: "leo".into() },
            user: AuthorRef { id: 2, username: "tiger".into() },
        };
        assert_eq!(follow.to_string(), "tiger follows leo");
    }

    #[test]
    fn test_group_and_comment_display() {
        let group = Group {
            id: 1,
            title: "Cats".into(),
            slug: "cats".into(),
            description: "All about cats".into(),
        };
        assert_eq!(group.to_string(), "Cats");

        let comment = Comment {
            id: 1,
            post_id: 1,
            author: AuthorRef { id: 1, username: "leo".into() },
            text: "Nice".into(),
            pub_date: Utc::now(),
        };
        assert_eq!(comment.to_string(), "Nice");
    }

    #[test]
    fn test_millis_round_trip() {
        let now = current_time_millis();
        assert_eq!(millis_to_datetime(now).timestamp_millis(), now);
    }
}
