//! GitHub resource models.
//!
//! # Design
//! Models decode leniently: every struct is `#[serde(default)]`, so fields
//! GitHub omits (or adds) never fail a call. A payload that does not decode
//! at all degrades to `Default` in `Response::from_raw`. The mock server
//! defines its own copies of the shapes it serves; integration tests catch
//! drift between the two crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user or organization account.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct User {
    pub login: String,
    pub id: u64,
    pub name: Option<String>,
    pub avatar_url: String,
    pub gravatar_id: Option<String>,
    pub url: String,
    pub html_url: String,
    pub company: Option<String>,
    #[serde(rename = "blog")]
    pub blog_url: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub hireable: Option<bool>,
    pub bio: Option<String>,
    pub public_repos: u32,
    pub public_gists: u32,
    pub followers: u32,
    pub following: u32,
    pub created_at: Option<DateTime<Utc>>,
    /// `"User"` or `"Organization"`.
    #[serde(rename = "type")]
    pub account_type: String,

    // Only present for the authenticated user.
    pub total_private_repos: Option<u32>,
    pub owned_private_repos: Option<u32>,
    pub private_gists: Option<u32>,
    pub collaborators: Option<u32>,
    pub disk_usage: Option<u64>,
    pub plan: Option<Plan>,
}

impl User {
    pub fn is_organization(&self) -> bool {
        self.account_type.eq_ignore_ascii_case("organization")
    }
}

/// Billing plan of the authenticated user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Plan {
    pub name: String,
    pub space: u64,
    pub collaborators: u32,
    pub private_repos: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub owner: User,
    pub description: Option<String>,
    pub private: bool,
    pub fork: bool,
    pub url: String,
    pub html_url: String,
    pub clone_url: String,
    pub git_url: String,
    pub ssh_url: String,
    pub homepage: Option<String>,
    pub language: Option<String>,
    pub forks: u32,
    pub watchers: u32,
    pub size: u64,
    pub master_branch: Option<String>,
    pub open_issues: u32,
    pub pushed_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Issue {
    pub url: String,
    pub html_url: String,
    pub number: u64,
    pub state: String,
    pub title: String,
    pub body: Option<String>,
    pub user: User,
    pub labels: Vec<Label>,
    pub assignee: Option<User>,
    pub milestone: Option<Milestone>,
    pub comments: u32,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Label {
    pub url: String,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Milestone {
    pub url: String,
    pub number: u64,
    pub state: String,
    pub title: String,
    pub description: Option<String>,
    pub creator: Option<User>,
    pub open_issues: u32,
    pub closed_issues: u32,
    pub created_at: Option<DateTime<Utc>>,
    pub due_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Comment {
    pub id: u64,
    pub url: String,
    pub body: String,
    pub user: User,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Branch {
    pub name: String,
    pub commit: CommitRef,
}

/// The `{sha, url}` pair GitHub uses to point at a commit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CommitRef {
    pub sha: String,
    pub url: String,
}

/// A repository commit as returned by `/repos/{owner}/{repo}/commits`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Commit {
    pub sha: String,
    pub url: String,
    pub commit: CommitSummary,
    pub author: Option<User>,
    pub committer: Option<User>,
    pub parents: Vec<CommitRef>,
}

/// The git-level part of a commit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CommitSummary {
    pub message: String,
    pub author: CommitUser,
    pub committer: CommitUser,
    pub tree: CommitRef,
}

/// Git author or committer identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CommitUser {
    pub name: String,
    pub email: String,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PullRequest {
    pub url: String,
    pub html_url: String,
    pub diff_url: String,
    pub patch_url: String,
    pub number: u64,
    pub state: String,
    pub title: String,
    pub body: Option<String>,
    pub user: User,
    pub merged: bool,
    pub mergeable: Option<bool>,
    pub comments: u32,
    pub commits: u32,
    pub additions: u32,
    pub deletions: u32,
    pub changed_files: u32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
}

/// Payload for creating an issue. Only `title` is required by GitHub.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewIssue {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

impl NewIssue {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Payload for creating an issue comment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewComment {
    pub body: String,
}
