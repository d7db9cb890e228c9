//! In-memory stand-in for the slice of the GitHub API the client core uses.
//!
//! v3 routes are served from the root, the v2 user lookup under
//! `/api/v2/json` and the OAuth code exchange under `/login/oauth`, so a
//! single base URL covers every endpoint family.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};

/// Login of the account the valid credentials belong to.
pub const AUTHENTICATED_LOGIN: &str = "octocat";
/// Token accepted as `Authorization: token ...`.
pub const VALID_TOKEN: &str = "secret-token";
/// `Authorization` value for `octocat:hunter2` basic credentials.
pub const VALID_BASIC: &str = "Basic b2N0b2NhdDpodW50ZXIy";
/// Authorization code the OAuth endpoint exchanges for `ISSUED_TOKEN`.
pub const VALID_CODE: &str = "valid-code";
pub const ISSUED_TOKEN: &str = "issued-token";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub login: String,
    pub id: u64,
    #[serde(rename = "type")]
    pub account_type: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub owner: User,
    pub watchers: u32,
    pub forks: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub state: String,
    pub title: String,
    pub body: Option<String>,
    pub user: User,
    pub labels: Vec<Label>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub body: String,
    pub user: User,
}

#[derive(Deserialize)]
pub struct NewIssue {
    pub title: Option<String>,
    pub body: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
}

#[derive(Deserialize)]
pub struct NewComment {
    pub body: String,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub state: Option<String>,
}

#[derive(Deserialize)]
pub struct TokenRequest {
    pub client_id: String,
    pub client_secret: String,
    pub code: String,
}

type RepoKey = (String, String);

#[derive(Default)]
pub struct Store {
    users: HashMap<String, User>,
    followers: HashMap<String, Vec<String>>,
    following: HashSet<String>,
    repos: HashMap<RepoKey, Repository>,
    issues: HashMap<RepoKey, Vec<Issue>>,
    comments: HashMap<(String, String, u64), Vec<Comment>>,
    merged: HashSet<(String, String, u64)>,
    next_id: u64,
}

impl Store {
    /// A store with `octocat`, `hubot`, `octocat/Hello-World` and one issue.
    pub fn seeded() -> Self {
        let mut store = Store {
            next_id: 100,
            ..Store::default()
        };
        let octocat = store.add_user(AUTHENTICATED_LOGIN, "User");
        let hubot = store.add_user("hubot", "User");
        store.add_user("github", "Organization");
        store
            .followers
            .insert(AUTHENTICATED_LOGIN.to_string(), vec![hubot.login.clone()]);
        store.following.insert(hubot.login.clone());

        let key = (AUTHENTICATED_LOGIN.to_string(), "Hello-World".to_string());
        store.repos.insert(
            key.clone(),
            Repository {
                id: 1296269,
                name: "Hello-World".to_string(),
                full_name: format!("{AUTHENTICATED_LOGIN}/Hello-World"),
                owner: octocat.clone(),
                watchers: 80,
                forks: 9,
            },
        );
        store.issues.insert(
            key,
            vec![Issue {
                number: 1,
                state: "open".to_string(),
                title: "Found a bug".to_string(),
                body: Some("I'm having a problem with this.".to_string()),
                user: octocat,
                labels: vec![Label {
                    name: "bug".to_string(),
                }],
            }],
        );
        store
            .merged
            .insert((AUTHENTICATED_LOGIN.to_string(), "Hello-World".to_string(), 2));
        store
    }

    fn add_user(&mut self, login: &str, account_type: &str) -> User {
        self.next_id += 1;
        let user = User {
            login: login.to_string(),
            id: self.next_id,
            account_type: account_type.to_string(),
        };
        self.users.insert(login.to_string(), user.clone());
        user
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));
    Router::new()
        .route("/users/{user}", get(get_user))
        .route("/users/{user}/followers", get(get_followers))
        .route("/user", get(get_authenticated_user))
        .route(
            "/user/following/{user}",
            get(is_following).put(follow).delete(unfollow),
        )
        .route("/repos/{owner}/{repo}", get(get_repository))
        .route(
            "/repos/{owner}/{repo}/issues",
            get(list_issues).post(create_issue),
        )
        .route("/repos/{owner}/{repo}/issues/{number}", get(get_issue))
        .route(
            "/repos/{owner}/{repo}/issues/{number}/comments",
            get(list_comments).post(create_comment),
        )
        .route("/repos/{owner}/{repo}/pulls/{number}/merge", get(is_merged))
        .route("/status/{code}", get(status))
        .route("/api/v2/json/user/show/{user}", get(v2_show_user))
        .route("/login/oauth/access_token", post(access_token))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "mock GitHub API listening");
    }
    axum::serve(listener, app()).await
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn not_found() -> Response {
    error(StatusCode::NOT_FOUND, "Not Found")
}

/// Login of the caller, if the `Authorization` header carries valid credentials.
fn caller(headers: &HeaderMap) -> Option<&'static str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    if value == VALID_BASIC || value == format!("token {VALID_TOKEN}") {
        return Some(AUTHENTICATED_LOGIN);
    }
    None
}

fn require_caller(headers: &HeaderMap) -> Result<&'static str, Response> {
    caller(headers).ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Requires authentication"))
}

fn first_page<T: Clone>(items: &[T], page: Option<u32>) -> Vec<T> {
    match page {
        None | Some(0) | Some(1) => items.to_vec(),
        Some(_) => Vec::new(),
    }
}

async fn get_user(State(db): State<Db>, Path(user): Path<String>) -> Response {
    let store = db.read().await;
    match store.users.get(&user) {
        Some(user) => Json(user.clone()).into_response(),
        None => not_found(),
    }
}

async fn get_followers(
    State(db): State<Db>,
    Path(user): Path<String>,
    Query(query): Query<ListQuery>,
) -> Response {
    let store = db.read().await;
    if !store.users.contains_key(&user) {
        return not_found();
    }
    let followers: Vec<User> = store
        .followers
        .get(&user)
        .into_iter()
        .flatten()
        .filter_map(|login| store.users.get(login).cloned())
        .collect();
    Json(first_page(&followers, query.page)).into_response()
}

async fn get_authenticated_user(State(db): State<Db>, headers: HeaderMap) -> Response {
    let login = match require_caller(&headers) {
        Ok(login) => login,
        Err(response) => return response,
    };
    let store = db.read().await;
    match store.users.get(login) {
        Some(user) => {
            let mut body = serde_json::to_value(user).unwrap_or_default();
            body["plan"] = json!({"name": "free", "space": 976562499, "collaborators": 0, "private_repos": 10000});
            Json(body).into_response()
        }
        None => not_found(),
    }
}

async fn is_following(State(db): State<Db>, headers: HeaderMap, Path(user): Path<String>) -> Response {
    if let Err(response) = require_caller(&headers) {
        return response;
    }
    if db.read().await.following.contains(&user) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found()
    }
}

async fn follow(State(db): State<Db>, headers: HeaderMap, Path(user): Path<String>) -> Response {
    if let Err(response) = require_caller(&headers) {
        return response;
    }
    let mut store = db.write().await;
    if !store.users.contains_key(&user) {
        return not_found();
    }
    store.following.insert(user);
    StatusCode::NO_CONTENT.into_response()
}

async fn unfollow(State(db): State<Db>, headers: HeaderMap, Path(user): Path<String>) -> Response {
    if let Err(response) = require_caller(&headers) {
        return response;
    }
    db.write().await.following.remove(&user);
    StatusCode::NO_CONTENT.into_response()
}

async fn get_repository(State(db): State<Db>, Path(key): Path<RepoKey>) -> Response {
    let store = db.read().await;
    match store.repos.get(&key) {
        Some(repo) => Json(repo.clone()).into_response(),
        None => not_found(),
    }
}

async fn list_issues(
    State(db): State<Db>,
    Path(key): Path<RepoKey>,
    Query(query): Query<ListQuery>,
) -> Response {
    let store = db.read().await;
    if !store.repos.contains_key(&key) {
        return not_found();
    }
    let state = query.state.as_deref().unwrap_or("open");
    let issues: Vec<Issue> = store
        .issues
        .get(&key)
        .into_iter()
        .flatten()
        .filter(|issue| issue.state == state)
        .cloned()
        .collect();
    Json(first_page(&issues, query.page)).into_response()
}

async fn create_issue(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(key): Path<RepoKey>,
    Json(input): Json<NewIssue>,
) -> Response {
    let login = match require_caller(&headers) {
        Ok(login) => login,
        Err(response) => return response,
    };
    let title = match input.title {
        Some(title) if !title.is_empty() => title,
        _ => return error(StatusCode::UNPROCESSABLE_ENTITY, "Validation Failed"),
    };
    let mut store = db.write().await;
    if !store.repos.contains_key(&key) {
        return not_found();
    }
    let Some(user) = store.users.get(login).cloned() else {
        return not_found();
    };
    let issues = store.issues.entry(key).or_default();
    let issue = Issue {
        number: issues.len() as u64 + 1,
        state: "open".to_string(),
        title,
        body: input.body,
        user,
        labels: input.labels.into_iter().map(|name| Label { name }).collect(),
    };
    issues.push(issue.clone());
    tracing::debug!(number = issue.number, "issue created");
    (StatusCode::CREATED, Json(issue)).into_response()
}

async fn get_issue(State(db): State<Db>, Path((owner, repo, number)): Path<(String, String, u64)>) -> Response {
    let store = db.read().await;
    store
        .issues
        .get(&(owner, repo))
        .and_then(|issues| issues.iter().find(|issue| issue.number == number))
        .map(|issue| Json(issue.clone()).into_response())
        .unwrap_or_else(not_found)
}

async fn list_comments(
    State(db): State<Db>,
    Path(key): Path<(String, String, u64)>,
    Query(query): Query<ListQuery>,
) -> Response {
    let store = db.read().await;
    let comments = store.comments.get(&key).cloned().unwrap_or_default();
    Json(first_page(&comments, query.page)).into_response()
}

async fn create_comment(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(key): Path<(String, String, u64)>,
    Json(input): Json<NewComment>,
) -> Response {
    let login = match require_caller(&headers) {
        Ok(login) => login,
        Err(response) => return response,
    };
    let mut store = db.write().await;
    let issue_exists = store
        .issues
        .get(&(key.0.clone(), key.1.clone()))
        .is_some_and(|issues| issues.iter().any(|issue| issue.number == key.2));
    if !issue_exists {
        return not_found();
    }
    let Some(user) = store.users.get(login).cloned() else {
        return not_found();
    };
    store.next_id += 1;
    let comment = Comment {
        id: store.next_id,
        body: input.body,
        user,
    };
    store.comments.entry(key).or_default().push(comment.clone());
    (StatusCode::CREATED, Json(comment)).into_response()
}

async fn is_merged(State(db): State<Db>, Path(key): Path<(String, String, u64)>) -> Response {
    if db.read().await.merged.contains(&key) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found()
    }
}

/// Answers with the requested status, for exercising error classification.
async fn status(Path(code): Path<u16>) -> Response {
    match StatusCode::from_u16(code) {
        Ok(status) => error(status, status.canonical_reason().unwrap_or("Status")),
        Err(_) => error(StatusCode::BAD_REQUEST, "Invalid status"),
    }
}

async fn v2_show_user(State(db): State<Db>, Path(user): Path<String>) -> Response {
    let store = db.read().await;
    match store.users.get(&user) {
        Some(user) => Json(json!({ "user": user })).into_response(),
        None => not_found(),
    }
}

/// Mirrors GitHub: a bad code still answers 200, with an `error` field.
async fn access_token(Form(input): Form<TokenRequest>) -> Response {
    tracing::debug!(client_id = %input.client_id, "access token requested");
    let body = if input.code == VALID_CODE && !input.client_secret.is_empty() {
        format!("access_token={ISSUED_TOKEN}&token_type=bearer")
    } else {
        "error=bad_verification_code".to_string()
    };
    (
        [(header::CONTENT_TYPE, "application/x-www-form-urlencoded")],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_serializes_type_field() {
        let user = User {
            login: "octocat".to_string(),
            id: 1,
            account_type: "User".to_string(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["type"], "User");
        assert_eq!(json["login"], "octocat");
    }

    #[test]
    fn seeded_store_has_fixture_data() {
        let store = Store::seeded();
        assert!(store.users.contains_key(AUTHENTICATED_LOGIN));
        assert!(store.following.contains("hubot"));
        assert_eq!(
            store.issues[&(AUTHENTICATED_LOGIN.to_string(), "Hello-World".to_string())].len(),
            1
        );
    }

    #[test]
    fn caller_accepts_token_and_basic() {
        let mut headers = HeaderMap::new();
        assert_eq!(caller(&headers), None);

        headers.insert(header::AUTHORIZATION, format!("token {VALID_TOKEN}").parse().unwrap());
        assert_eq!(caller(&headers), Some(AUTHENTICATED_LOGIN));

        headers.insert(header::AUTHORIZATION, VALID_BASIC.parse().unwrap());
        assert_eq!(caller(&headers), Some(AUTHENTICATED_LOGIN));

        headers.insert(header::AUTHORIZATION, "token wrong".parse().unwrap());
        assert_eq!(caller(&headers), None);
    }

    #[test]
    fn new_issue_title_is_optional_on_the_wire() {
        let input: NewIssue = serde_json::from_str(r#"{"body":"no title"}"#).unwrap();
        assert!(input.title.is_none());
        assert!(input.labels.is_empty());
    }

    #[test]
    fn first_page_only_serves_page_one() {
        let items = vec![1, 2, 3];
        assert_eq!(first_page(&items, None), items);
        assert_eq!(first_page(&items, Some(1)), items);
        assert!(first_page(&items, Some(2)).is_empty());
    }
}
