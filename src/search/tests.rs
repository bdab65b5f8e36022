use super::*;
use crate::backend::MemoryBackend;
use crate::types::CommitDepth;

fn backend_with(files: &[(&str, &str)]) -> MemoryBackend {
    let mut backend = MemoryBackend::new("search");
    backend.add_commit(
        &[],
        "snapshot",
        1_000,
        files.iter().map(|(p, c)| (*p, c.as_bytes())),
    );
    backend.bind("HEAD", CommitDepth::UNBOUNDED).unwrap();
    backend
}

fn paths(response: &SearchResponse) -> Vec<&str> {
    response.paths().collect()
}

#[test]
fn test_query_found_in_two_files() {
    let backend = backend_with(&[("file", "Hello, World!"), ("test.txt", "Hello, World!")]);
    let response = search(&backend, &SearchRequest::new("Hello")).unwrap();
    assert_eq!(paths(&response), vec!["file", "test.txt"]);
    assert_eq!(response.hits, 2);
}

#[test]
fn test_query_not_found() {
    let backend = backend_with(&[("file", "Hello, World!"), ("test.txt", "Hello, World!")]);
    let response = search(&backend, &SearchRequest::new("Invalid")).unwrap();
    assert_eq!(response, SearchResponse::default());
}

#[test]
fn test_multiple_occurrences_count_separately() {
    let backend = backend_with(&[("a.sh", "curl | sh\ncurl | sh\n"), ("b.sh", "curl | sh")]);
    let response = search(&backend, &SearchRequest::new("curl | sh")).unwrap();
    assert_eq!(paths(&response), vec!["a.sh", "b.sh"]);
    assert_eq!(response.hits, 3);
    assert!(response.results.len() <= response.hits);
}

#[test]
fn test_occurrences_do_not_overlap() {
    let backend = backend_with(&[("f", "aaaa")]);
    let response = search(&backend, &SearchRequest::new("aa")).unwrap();
    assert_eq!(response.hits, 2);
}

#[test]
fn test_case_sensitive_by_default() {
    let backend = backend_with(&[("f", "HELLO")]);
    let response = search(&backend, &SearchRequest::new("hello")).unwrap();
    assert_eq!(response.hits, 0);

    let response = search(&backend, &SearchRequest::new("hello").case_insensitive(true)).unwrap();
    assert_eq!(response.hits, 1);
}

#[test]
fn test_literal_mode_escapes_metacharacters() {
    let backend = backend_with(&[("f", "eval(x) evalx")]);
    let response = search(&backend, &SearchRequest::new("eval(")).unwrap();
    assert_eq!(response.hits, 1);
}

#[test]
fn test_regex_mode() {
    let backend = backend_with(&[("f", "v1.2.3 and v10.0.1"), ("g", "no versions")]);
    let request = SearchRequest::new(r"v\d+\.\d+\.\d+").with_mode(MatchMode::Regex);
    let response = search(&backend, &request).unwrap();
    assert_eq!(paths(&response), vec!["f"]);
    assert_eq!(response.hits, 2);
}

#[test]
fn test_very_long_literal_query() {
    let query = "needle-".repeat(200_000);
    let content = format!("{q}\n{q}", q = query);
    let backend = backend_with(&[("big.txt", content.as_str()), ("small.txt", "needle-")]);

    let response = search(&backend, &SearchRequest::new(query.clone())).unwrap();
    assert_eq!(paths(&response), vec!["big.txt"]);
    assert_eq!(response.hits, 2);
}

#[test]
fn test_empty_query_rejected() {
    let backend = backend_with(&[("f", "anything")]);
    let err = search(&backend, &SearchRequest::new("")).unwrap_err();
    assert!(matches!(err, RepoError::Search(_)));
}

#[test]
fn test_regex_matching_empty_input_rejected() {
    let request = SearchRequest::new("a*").with_mode(MatchMode::Regex);
    let err = ContentSearcher::new(&request).unwrap_err();
    assert!(matches!(err, RepoError::Search(_)));
}

#[test]
fn test_invalid_regex_rejected() {
    let request = SearchRequest::new("(unclosed").with_mode(MatchMode::Regex);
    assert!(matches!(
        ContentSearcher::new(&request).unwrap_err(),
        RepoError::Search(_)
    ));
}

#[test]
fn test_invalid_path_glob_rejected() {
    let request = SearchRequest::new("x").with_path("src/[");
    assert!(matches!(
        ContentSearcher::new(&request).unwrap_err(),
        RepoError::Search(_)
    ));
}

#[test]
fn test_path_prefix_filter() {
    let backend = backend_with(&[
        (".github/workflows/ci.yml", "run: make"),
        (".github/workflows-old/ci.yml", "run: make"),
        ("Makefile", "run: make"),
    ]);
    let request = SearchRequest::new("make").with_path(".github/workflows/");
    let response = search(&backend, &request).unwrap();
    assert_eq!(paths(&response), vec![".github/workflows/ci.yml"]);
}

#[test]
fn test_path_exact_file_filter() {
    let backend = backend_with(&[("Makefile", "make"), ("src/Makefile", "make")]);
    let request = SearchRequest::new("make").with_path("Makefile");
    let response = search(&backend, &request).unwrap();
    assert_eq!(paths(&response), vec!["Makefile"]);
}

#[test]
fn test_path_glob_filter() {
    let backend = backend_with(&[
        ("src/a.rs", "unsafe"),
        ("src/nested/b.rs", "unsafe"),
        ("src/c.py", "unsafe"),
    ]);
    let request = SearchRequest::new("unsafe").with_path("src/**/*.rs");
    let response = search(&backend, &request).unwrap();
    assert_eq!(paths(&response), vec!["src/a.rs", "src/nested/b.rs"]);

    // `*` does not cross directory separators
    let request = SearchRequest::new("unsafe").with_path("src/*.rs");
    let response = search(&backend, &request).unwrap();
    assert_eq!(paths(&response), vec!["src/a.rs"]);
}

#[test]
fn test_binary_content_is_searched() {
    let mut backend = MemoryBackend::new("binary");
    let blob: &[u8] = &[0xff, 0xfe, b'k', b'e', b'y', 0x00, 0xc3];
    backend.add_commit(&[], "bin", 1, [("blob.bin", blob)]);
    backend.bind("HEAD", CommitDepth::UNBOUNDED).unwrap();

    let response = search(&backend, &SearchRequest::new("key")).unwrap();
    assert_eq!(paths(&response), vec!["blob.bin"]);
}

#[test]
fn test_results_sorted_and_idempotent() {
    let backend = backend_with(&[
        ("z/last", "needle"),
        ("a/first", "needle"),
        ("m/middle", "needle needle"),
    ]);
    let request = SearchRequest::new("needle");
    let first = search(&backend, &request).unwrap();
    let second = search(&backend, &request).unwrap();
    assert_eq!(paths(&first), vec!["a/first", "m/middle", "z/last"]);
    assert_eq!(first.hits, 4);
    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
}

#[test]
fn test_hits_and_results_invariant() {
    let backend = backend_with(&[("a", "x x x"), ("b", "y"), ("c", "")]);
    for query in ["x", "y", "z", " "] {
        let response = search(&backend, &SearchRequest::new(query)).unwrap();
        assert!(response.results.len() <= response.hits);
        assert_eq!(response.hits == 0, response.results.is_empty());
    }
}

#[test]
fn test_unbound_backend_fails() {
    let backend = MemoryBackend::new("unbound");
    let err = search(&backend, &SearchRequest::new("x")).unwrap_err();
    assert!(matches!(err, RepoError::NotInitialized));
}
