use std::collections::HashMap;

use strand::http::request::{Request, RequestBuilder};

fn request_with(headers: &[(&str, &str)]) -> Request {
    Request {
        method: "GET".to_string(),
        path: "/".to_string(),
        version: "HTTP/1.1".to_string(),
        headers: headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        ..Default::default()
    }
}

#[test]
fn test_request_header_retrieval() {
    let req = request_with(&[("Host", "example.com"), ("Content-Type", "application/json")]);

    assert_eq!(req.header("Host"), Some("example.com"));
    assert_eq!(req.header("Content-Type"), Some("application/json"));
    assert_eq!(req.header("Missing"), None);
}

#[test]
fn test_request_header_case_insensitive_fallback() {
    let req = request_with(&[("content-length", "7")]);

    assert_eq!(req.header("Content-Length"), Some("7"));
    assert_eq!(req.content_length(), 7);
}

#[test]
fn test_request_content_length_missing() {
    let req = request_with(&[]);
    assert_eq!(req.content_length(), 0);
}

#[test]
fn test_request_content_length_invalid() {
    let req = request_with(&[("Content-Length", "not-a-number")]);
    assert_eq!(req.content_length(), 0);
}

#[test]
fn test_request_is_chunked() {
    assert!(request_with(&[("Transfer-Encoding", "chunked")]).is_chunked());
    assert!(!request_with(&[("Transfer-Encoding", "gzip")]).is_chunked());
    assert!(!request_with(&[]).is_chunked());
}

#[test]
fn test_request_keep_alive_http11_default() {
    assert!(request_with(&[]).keep_alive());
}

#[test]
fn test_request_keep_alive_http10_default() {
    let mut req = request_with(&[]);
    req.version = "HTTP/1.0".to_string();
    assert!(!req.keep_alive());

    req.headers
        .insert("Connection".to_string(), "Keep-Alive".to_string());
    assert!(req.keep_alive());
}

#[test]
fn test_request_keep_alive_close() {
    assert!(!request_with(&[("Connection", "close")]).keep_alive());
    assert!(!request_with(&[("Connection", "Close")]).keep_alive());
}

#[test]
fn test_request_url_uses_host_header() {
    let mut req = request_with(&[("Host", "example.com:8080")]);
    req.path = "/search?q=rust&page=2".to_string();

    let url = req.url().unwrap();
    assert_eq!(url.host_str(), Some("example.com"));
    assert_eq!(url.port(), Some(8080));
    assert_eq!(url.path(), "/search");

    let query: HashMap<_, _> = url.query_pairs().into_owned().collect();
    assert_eq!(query.get("q").map(String::as_str), Some("rust"));
    assert_eq!(query.get("page").map(String::as_str), Some("2"));
}

#[test]
fn test_request_url_defaults_to_localhost() {
    let req = request_with(&[]);
    assert_eq!(req.url().unwrap().as_str(), "http://localhost/");
}

#[test]
fn test_request_builder() {
    let req = RequestBuilder::new()
        .method("POST")
        .path("/api")
        .header("Content-Type", "text/plain")
        .body(b"hello".to_vec())
        .build()
        .unwrap();

    assert_eq!(req.method, "POST");
    assert_eq!(req.version, "HTTP/1.1");
    assert_eq!(req.body_length, Some(5));
    assert_eq!(req.header("Content-Type"), Some("text/plain"));
}

#[test]
fn test_request_builder_requires_method_and_path() {
    assert_eq!(RequestBuilder::new().path("/").build(), Err("method missing"));
    assert_eq!(RequestBuilder::new().method("GET").build(), Err("path missing"));
}
