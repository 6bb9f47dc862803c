use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
/// Public struct `GithubUser` used across Tau components.
pub struct GithubUser {
    #[serde(default)]
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Conversation comment on the pull request's issue thread.
pub struct GithubIssueComment {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub user: GithubUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Inline comment attached to a diff line.
pub struct GithubReviewComment {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub user: GithubUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Submitted (or pending) pull request review.
pub struct GithubReview {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user: GithubUser,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Source-independent comment shape consumed by the reconciliation pass.
pub struct ApprovalComment {
    pub id: u64,
    pub body: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub html_url: String,
}

impl From<&GithubIssueComment> for ApprovalComment {
    fn from(comment: &GithubIssueComment) -> Self {
        Self {
            id: comment.id,
            body: comment.body.clone().unwrap_or_default(),
            author: comment.user.login.clone(),
            created_at: comment.created_at,
            html_url: comment.html_url.clone(),
        }
    }
}

impl From<&GithubReviewComment> for ApprovalComment {
    fn from(comment: &GithubReviewComment) -> Self {
        Self {
            id: comment.id,
            body: comment.body.clone().unwrap_or_default(),
            author: comment.user.login.clone(),
            created_at: comment.created_at,
            html_url: comment.html_url.clone(),
        }
    }
}

impl From<&GithubReview> for ApprovalComment {
    fn from(review: &GithubReview) -> Self {
        Self {
            id: review.id,
            body: review.body.clone().unwrap_or_default(),
            author: review.user.login.clone(),
            // Pending reviews carry no submission time and sort first.
            created_at: review.submitted_at.unwrap_or(DateTime::<Utc>::MIN_UTC),
            html_url: review.html_url.clone(),
        }
    }
}

pub fn comments_from_issue_comments(comments: &[GithubIssueComment]) -> Vec<ApprovalComment> {
    comments.iter().map(ApprovalComment::from).collect()
}

pub fn comments_from_review_comments(comments: &[GithubReviewComment]) -> Vec<ApprovalComment> {
    comments.iter().map(ApprovalComment::from).collect()
}

pub fn comments_from_reviews(reviews: &[GithubReview]) -> Vec<ApprovalComment> {
    reviews.iter().map(ApprovalComment::from).collect()
}

/// Merges the three comment sources into one chronological timeline.
///
/// The sort is stable over the concatenation issue comments, review comments,
/// reviews, so equal timestamps keep that precedence. Which of two commands by
/// the same author wins depends on this order.
pub fn unify_comment_timeline(
    issue_comments: &[GithubIssueComment],
    review_comments: &[GithubReviewComment],
    reviews: &[GithubReview],
) -> Vec<ApprovalComment> {
    let mut timeline = comments_from_issue_comments(issue_comments);
    timeline.extend(comments_from_review_comments(review_comments));
    timeline.extend(comments_from_reviews(reviews));
    timeline.sort_by_key(|comment| comment.created_at);
    timeline
}
