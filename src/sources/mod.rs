//! Corpus source adapters: thin shims converting stored repository records
//! (issues, pull requests, releases) into matchable text units.
//!
//! Every adapter that deals with authored text applies the shared bot filter:
//! accounts whose name contains "bot" as a whole word are automated accounts
//! and are excluded, unless the exact name is allow-listed.

pub mod files;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::CorpusUnit;

/// Known human accounts whose names happen to end in a "bot"-like suffix.
pub const NON_ROBOT_USERS: [&str; 5] = [
    "olgabot",
    "hugtalbot",
    "arrogantrobot",
    "robot-chenwei",
    "Bot-Enigma-0",
];

static BOT_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)bot\b").unwrap());

/// Excludes records authored by automated accounts.
#[derive(Debug, Clone)]
pub struct BotFilter {
    allow_list: Vec<String>,
}

impl Default for BotFilter {
    fn default() -> Self {
        Self {
            allow_list: NON_ROBOT_USERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl BotFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allow_list(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            allow_list: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a record authored by `user` passes the filter. Records with no
    /// recorded author (deleted accounts) are kept.
    pub fn keeps(&self, user: Option<&str>) -> bool {
        match user {
            None => true,
            Some(name) => {
                !BOT_PATTERN.is_match(name) || self.allow_list.iter().any(|allowed| allowed == name)
            }
        }
    }
}

/// A stored issue or PR comment, as fetched from the document store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredComment {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A stored issue, with its comments embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredIssue {
    pub html_url: String,
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub comments_data: Vec<StoredComment>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
}

/// A stored release.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRelease {
    pub html_url: String,
    #[serde(default)]
    pub tag_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

/// A stored pull request, with its comments and related issues embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredPullRequest {
    pub html_url: String,
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub comments_data: Vec<StoredComment>,
    #[serde(default)]
    pub issues: Vec<StoredIssue>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
}

impl StoredPullRequest {
    /// A PR passes the filter when either author field does; fetched records
    /// carry the login in `author` or `user` depending on fetcher version.
    fn passes(&self, filter: &BotFilter) -> bool {
        filter.keeps(self.author.as_deref()) || filter.keeps(self.user.as_deref())
    }
}

fn title_body_text(title: Option<&str>, body: Option<&str>) -> String {
    format!(
        "{}; {}",
        title.unwrap_or_default(),
        body.unwrap_or_default()
    )
}

/// One unit per issue: `title; body`, filtered by issue author.
pub fn issue_units(issues: &[StoredIssue], filter: &BotFilter) -> Vec<CorpusUnit> {
    issues
        .iter()
        .filter(|issue| filter.keeps(issue.author.as_deref()))
        .map(|issue| {
            CorpusUnit::new(
                title_body_text(issue.title.as_deref(), issue.body.as_deref()),
                &issue.html_url,
            )
        })
        .collect()
}

/// One unit per issue comment, carrying the parent issue's permalink,
/// filtered by commenter.
pub fn issue_comment_units(issues: &[StoredIssue], filter: &BotFilter) -> Vec<CorpusUnit> {
    issues
        .iter()
        .flat_map(|issue| {
            issue
                .comments_data
                .iter()
                .filter(|comment| filter.keeps(comment.user.as_deref()))
                .map(|comment| {
                    CorpusUnit::new(
                        comment.body.clone().unwrap_or_default(),
                        &issue.html_url,
                    )
                })
        })
        .collect()
}

/// One unit per release: trimmed body. Releases are repository-authored, so
/// no bot filter applies.
pub fn release_units(releases: &[StoredRelease]) -> Vec<CorpusUnit> {
    releases
        .iter()
        .map(|release| {
            CorpusUnit::new(
                release.body.as_deref().unwrap_or_default().trim(),
                &release.html_url,
            )
        })
        .collect()
}

/// One unit per PR: `title; body`, filtered by PR author.
pub fn pr_units(prs: &[StoredPullRequest], filter: &BotFilter) -> Vec<CorpusUnit> {
    prs.iter()
        .filter(|pr| pr.passes(filter))
        .map(|pr| {
            CorpusUnit::new(
                title_body_text(pr.title.as_deref(), pr.body.as_deref()),
                &pr.html_url,
            )
        })
        .collect()
}

/// One unit per PR comment, carrying the parent PR's permalink.
pub fn pr_comment_units(prs: &[StoredPullRequest], filter: &BotFilter) -> Vec<CorpusUnit> {
    prs.iter()
        .flat_map(|pr| {
            pr.comments_data
                .iter()
                .filter(|comment| filter.keeps(comment.user.as_deref()))
                .map(|comment| {
                    CorpusUnit::new(comment.body.clone().unwrap_or_default(), &pr.html_url)
                })
        })
        .collect()
}

/// One unit per issue referenced by a PR: `title; body`, carrying the
/// issue's own permalink.
pub fn pr_related_issue_units(prs: &[StoredPullRequest], filter: &BotFilter) -> Vec<CorpusUnit> {
    prs.iter()
        .flat_map(|pr| {
            pr.issues
                .iter()
                .filter(|issue| filter.keeps(issue.author.as_deref()))
                .map(|issue| {
                    CorpusUnit::new(
                        title_body_text(issue.title.as_deref(), issue.body.as_deref()),
                        &issue.html_url,
                    )
                })
        })
        .collect()
}

/// One unit per comment on a PR-referenced issue, carrying the parent
/// issue's permalink.
pub fn pr_related_issue_comment_units(
    prs: &[StoredPullRequest],
    filter: &BotFilter,
) -> Vec<CorpusUnit> {
    prs.iter()
        .flat_map(|pr| pr.issues.iter())
        .flat_map(|issue| {
            issue
                .comments_data
                .iter()
                .filter(|comment| filter.keeps(comment.user.as_deref()))
                .map(|comment| {
                    CorpusUnit::new(
                        comment.body.clone().unwrap_or_default(),
                        &issue.html_url,
                    )
                })
        })
        .collect()
}

/// One unit per PR joining the PR's own text, its filtered comments, its
/// related issues' texts, and their filtered comments, newline-separated.
pub fn pr_corpus_units(prs: &[StoredPullRequest], filter: &BotFilter) -> Vec<CorpusUnit> {
    prs.iter()
        .map(|pr| {
            let mut pieces =
                vec![title_body_text(pr.title.as_deref(), pr.body.as_deref())];

            for comment in &pr.comments_data {
                if filter.keeps(comment.user.as_deref()) {
                    pieces.push(comment.body.clone().unwrap_or_default());
                }
            }
            for issue in &pr.issues {
                if filter.keeps(issue.author.as_deref()) {
                    pieces.push(title_body_text(issue.title.as_deref(), issue.body.as_deref()));
                }
                for comment in &issue.comments_data {
                    if filter.keeps(comment.user.as_deref()) {
                        pieces.push(comment.body.clone().unwrap_or_default());
                    }
                }
            }

            let text = pieces
                .into_iter()
                .filter(|piece| !piece.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            CorpusUnit::new(text, &pr.html_url)
        })
        .collect()
}
