use super::*;
use chrono::TimeZone;

fn signature(name: &str) -> Signature {
    Signature {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        when: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
    }
}

fn commit(sha: &str, message: &str, parents: &[&str]) -> Commit {
    let sig = signature("Test");
    Commit {
        sha: sha.to_string(),
        message: message.to_string(),
        author: sig.clone(),
        committer: sig.clone(),
        committed_date: sig.when,
        parents: parents.iter().map(|p| p.to_string()).collect(),
    }
}

#[test]
fn test_commit_depth_positive_is_bounded() {
    let depth = CommitDepth::from_raw(3);
    assert!(depth.is_bounded());
    assert_eq!(depth.limit(), Some(3));
    assert!(!depth.is_reached(2));
    assert!(depth.is_reached(3));
}

#[test]
fn test_commit_depth_zero_is_unbounded() {
    let depth = CommitDepth::from_raw(0);
    assert_eq!(depth, CommitDepth::UNBOUNDED);
    assert!(!depth.is_reached(usize::MAX));
}

#[test]
fn test_commit_depth_negative_is_unbounded() {
    assert_eq!(CommitDepth::from(-1), CommitDepth::UNBOUNDED);
    assert_eq!(CommitDepth::from(i64::MIN), CommitDepth::UNBOUNDED);
}

#[test]
fn test_commit_depth_display() {
    assert_eq!(CommitDepth::from_raw(30).to_string(), "30");
    assert_eq!(CommitDepth::from_raw(-5).to_string(), "unbounded");
}

#[test]
fn test_commit_summary_is_first_line() {
    let c = commit("abc", "Fix parser\n\nLonger explanation", &[]);
    assert_eq!(c.summary(), "Fix parser");
    assert!(!c.is_merge());
}

#[test]
fn test_commit_is_merge() {
    let c = commit("abc", "Merge branch", &["p1", "p2"]);
    assert!(c.is_merge());
}

#[test]
fn test_commit_empty_message_summary() {
    let c = commit("abc", "", &[]);
    assert_eq!(c.summary(), "");
}

#[test]
fn test_search_request_defaults() {
    let req = SearchRequest::new("Hello");
    assert_eq!(req.query, "Hello");
    assert_eq!(req.mode, MatchMode::Literal);
    assert!(req.path.is_none());
    assert!(!req.case_insensitive);
}

#[test]
fn test_search_request_builder() {
    let req = SearchRequest::new("eval\\(")
        .with_mode(MatchMode::Regex)
        .with_path("src/**")
        .case_insensitive(true);
    assert_eq!(req.mode, MatchMode::Regex);
    assert_eq!(req.path.as_deref(), Some("src/**"));
    assert!(req.case_insensitive);
}

#[test]
fn test_search_request_deserialize_minimal() {
    let req: SearchRequest = serde_json::from_str(r#"{"query":"Hello"}"#).unwrap();
    assert_eq!(req, SearchRequest::new("Hello"));
}

#[test]
fn test_match_mode_serializes_lowercase() {
    let json = serde_json::to_string(&MatchMode::Regex).unwrap();
    assert_eq!(json, "\"regex\"");
}

#[test]
fn test_search_response_default_is_empty() {
    let response = SearchResponse::default();
    assert!(response.is_empty());
    assert_eq!(response.hits, 0);
}

#[test]
fn test_search_response_serialization_field_names() {
    let response = SearchResponse {
        results: vec![SearchResult {
            path: "file".to_string(),
        }],
        hits: 2,
    };
    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["hits"], 2);
    assert_eq!(value["results"][0]["path"], "file");
    assert_eq!(response.paths().collect::<Vec<_>>(), vec!["file"]);
}

#[test]
fn test_commit_serialization_roundtrip() {
    let c = commit("0123abcd", "Initial commit", &[]);
    let json = serde_json::to_string(&c).unwrap();
    let back: Commit = serde_json::from_str(&json).unwrap();
    assert_eq!(back, c);
}
