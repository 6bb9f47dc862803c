//! Shared fakes for reconciliation tests.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::approval_tracker::ApprovalTracker;
use crate::approve_comment::{
    ApprovalComment, GithubIssueComment, GithubReview, GithubReviewComment, GithubUser,
};
use crate::github_client::{ApproveGithubClient, GithubIssueEvent, GithubLabel};

const BASE_UNIX_SECONDS: i64 = 1_767_225_600;

pub(crate) fn ts(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(BASE_UNIX_SECONDS + seconds, 0)
        .single()
        .expect("valid timestamp")
}

pub(crate) fn comment_at(id: u64, author: &str, body: &str, seconds: i64) -> ApprovalComment {
    ApprovalComment {
        id,
        body: body.to_string(),
        author: author.to_string(),
        created_at: ts(seconds),
        html_url: format!("https://example.test/comment/{id}"),
    }
}

pub(crate) fn issue_comment(id: u64, author: &str, body: &str, seconds: i64) -> GithubIssueComment {
    GithubIssueComment {
        id,
        body: Some(body.to_string()),
        html_url: format!("https://example.test/comment/{id}"),
        created_at: ts(seconds),
        user: GithubUser {
            login: author.to_string(),
        },
    }
}

pub(crate) fn review_comment(
    id: u64,
    author: &str,
    body: &str,
    seconds: i64,
) -> GithubReviewComment {
    GithubReviewComment {
        id,
        body: Some(body.to_string()),
        html_url: format!("https://example.test/review-comment/{id}"),
        created_at: ts(seconds),
        user: GithubUser {
            login: author.to_string(),
        },
    }
}

pub(crate) fn review(id: u64, author: &str, body: &str, seconds: i64) -> GithubReview {
    GithubReview {
        id,
        body: Some(body.to_string()),
        html_url: format!("https://example.test/review/{id}"),
        submitted_at: Some(ts(seconds)),
        user: GithubUser {
            login: author.to_string(),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TrackerCall {
    Approve(String, bool),
    SelfApprove(String, bool),
    Lgtm(String, bool),
    Remove(String),
    Assignee(String),
}

#[derive(Debug, Default)]
/// Tracker fake with set-with-overwrite membership and a call log.
pub(crate) struct RecordingTracker {
    pub(crate) calls: Vec<TrackerCall>,
    pub(crate) approvers: BTreeMap<String, String>,
    pub(crate) lgtmers: BTreeMap<String, String>,
}

impl ApprovalTracker for RecordingTracker {
    fn add_approver(&mut self, login: &str, reference: &str, no_issue: bool) {
        self.calls
            .push(TrackerCall::Approve(login.to_string(), no_issue));
        self.lgtmers.remove(login);
        self.approvers
            .insert(login.to_string(), reference.to_string());
    }

    fn add_author_self_approver(&mut self, login: &str, _reference: &str, no_issue: bool) {
        self.calls
            .push(TrackerCall::SelfApprove(login.to_string(), no_issue));
    }

    fn add_lgtmer(&mut self, login: &str, reference: &str, no_issue: bool) {
        self.calls.push(TrackerCall::Lgtm(login.to_string(), no_issue));
        self.approvers.remove(login);
        self.lgtmers.insert(login.to_string(), reference.to_string());
    }

    fn remove_approver(&mut self, login: &str) {
        self.calls.push(TrackerCall::Remove(login.to_string()));
        self.approvers.remove(login);
        self.lgtmers.remove(login);
    }

    fn add_assignee(&mut self, login: &str) {
        self.calls.push(TrackerCall::Assignee(login.to_string()));
    }

    fn is_approved(&self) -> bool {
        !self.approvers.is_empty() || !self.lgtmers.is_empty()
    }

    fn render_message(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MutationCall {
    AddLabel(String),
    RemoveLabel(String),
    CreateComment(String),
    DeleteComment(u64),
}

#[derive(Debug)]
pub(crate) struct FakeGithubState {
    pub(crate) bot_login: String,
    pub(crate) changed_files: Vec<String>,
    pub(crate) labels: Vec<GithubLabel>,
    pub(crate) issue_comments: Vec<GithubIssueComment>,
    pub(crate) review_comments: Vec<GithubReviewComment>,
    pub(crate) reviews: Vec<GithubReview>,
    pub(crate) issue_events: Vec<GithubIssueEvent>,
    pub(crate) failing_read: Option<&'static str>,
    pub(crate) fail_add_label: bool,
    pub(crate) fail_remove_label: bool,
    pub(crate) fail_create_comment: bool,
    pub(crate) fail_delete_comment: bool,
    pub(crate) mutations: Vec<MutationCall>,
    pub(crate) attempted_creates: usize,
    pub(crate) issue_event_fetches: usize,
    next_comment_id: u64,
}

impl Default for FakeGithubState {
    fn default() -> Self {
        Self {
            bot_login: "bot".to_string(),
            changed_files: Vec::new(),
            labels: Vec::new(),
            issue_comments: Vec::new(),
            review_comments: Vec::new(),
            reviews: Vec::new(),
            issue_events: Vec::new(),
            failing_read: None,
            fail_add_label: false,
            fail_remove_label: false,
            fail_create_comment: false,
            fail_delete_comment: false,
            mutations: Vec::new(),
            attempted_creates: 0,
            issue_event_fetches: 0,
            next_comment_id: 9_000,
        }
    }
}

#[derive(Debug, Default)]
/// In-memory pull request whose mutations feed back into later reads.
pub(crate) struct FakeGithubClient {
    state: Mutex<FakeGithubState>,
}

impl FakeGithubClient {
    pub(crate) fn state(&self) -> MutexGuard<'_, FakeGithubState> {
        self.state.lock().expect("fake github state")
    }

    pub(crate) fn mutation_count(&self) -> usize {
        self.state().mutations.len()
    }

    fn read<T: Clone>(
        &self,
        resource: &'static str,
        select: impl Fn(&FakeGithubState) -> T,
    ) -> Result<T> {
        let state = self.state();
        if state.failing_read == Some(resource) {
            bail!("fake {resource} unavailable");
        }
        Ok(select(&state))
    }
}

#[async_trait]
impl ApproveGithubClient for FakeGithubClient {
    async fn bot_login(&self) -> Result<String> {
        self.read("bot_login", |state| state.bot_login.clone())
    }

    async fn list_changed_files(&self, _org: &str, _repo: &str, _number: u64) -> Result<Vec<String>> {
        self.read("changed_files", |state| state.changed_files.clone())
    }

    async fn list_labels(&self, _org: &str, _repo: &str, _number: u64) -> Result<Vec<GithubLabel>> {
        self.read("labels", |state| state.labels.clone())
    }

    async fn list_issue_comments(
        &self,
        _org: &str,
        _repo: &str,
        _number: u64,
    ) -> Result<Vec<GithubIssueComment>> {
        self.read("issue_comments", |state| state.issue_comments.clone())
    }

    async fn list_review_comments(
        &self,
        _org: &str,
        _repo: &str,
        _number: u64,
    ) -> Result<Vec<GithubReviewComment>> {
        self.read("review_comments", |state| state.review_comments.clone())
    }

    async fn list_reviews(&self, _org: &str, _repo: &str, _number: u64) -> Result<Vec<GithubReview>> {
        self.read("reviews", |state| state.reviews.clone())
    }

    async fn list_issue_events(
        &self,
        _org: &str,
        _repo: &str,
        _number: u64,
    ) -> Result<Vec<GithubIssueEvent>> {
        self.state().issue_event_fetches += 1;
        self.read("issue_events", |state| state.issue_events.clone())
    }

    async fn add_label(&self, _org: &str, _repo: &str, _number: u64, label: &str) -> Result<()> {
        let mut state = self.state();
        if state.fail_add_label {
            bail!("fake add label failure");
        }
        state.labels.push(GithubLabel {
            name: label.to_string(),
        });
        state.mutations.push(MutationCall::AddLabel(label.to_string()));
        Ok(())
    }

    async fn remove_label(&self, _org: &str, _repo: &str, _number: u64, label: &str) -> Result<()> {
        let mut state = self.state();
        if state.fail_remove_label {
            bail!("fake remove label failure");
        }
        state.labels.retain(|existing| existing.name != label);
        state
            .mutations
            .push(MutationCall::RemoveLabel(label.to_string()));
        Ok(())
    }

    async fn create_comment(&self, _org: &str, _repo: &str, _number: u64, body: &str) -> Result<()> {
        let mut state = self.state();
        state.attempted_creates += 1;
        if state.fail_create_comment {
            bail!("fake create comment failure");
        }
        state.next_comment_id += 1;
        let id = state.next_comment_id;
        let login = state.bot_login.clone();
        state.issue_comments.push(issue_comment(id, &login, body, 10_000));
        state
            .mutations
            .push(MutationCall::CreateComment(body.to_string()));
        Ok(())
    }

    async fn delete_comment(&self, _org: &str, _repo: &str, comment_id: u64) -> Result<()> {
        let mut state = self.state();
        if state.fail_delete_comment {
            bail!("fake delete comment failure");
        }
        state.issue_comments.retain(|comment| comment.id != comment_id);
        state.mutations.push(MutationCall::DeleteComment(comment_id));
        Ok(())
    }
}
