//! Mark lookups against a stand-in web service.

use geodetic_marks::gdb::{HttpSource, HttpSourceConfig, MarkSource, SourceError};
use geodetic_marks::{CacheMode, FileCache, FileCacheConfig, GdbError, MarkCode, MarkFetcher};
use httpmock::prelude::*;
use std::time::Duration;
use tempfile::TempDir;

fn fetcher_for(server: &MockServer) -> MarkFetcher {
    let config = HttpSourceConfig::new()
        .with_url_template(server.url("/api/gdbweb/mark?code={code}"))
        .with_timeout(5);
    MarkFetcher::with_source(Box::new(HttpSource::new(config).unwrap()))
}

#[test]
fn fetches_mark_from_service() {
    let server = MockServer::start();
    let mark = server.mock(|when, then| {
        when.method(GET)
            .path("/api/gdbweb/mark")
            .query_param("code", "ABCD");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "code": "ABCD",
                "name": "Test Trig",
                "_links": {"self": "/mark/ABCD"},
                "coordinates": [{"system": "NZGD2000", "_source": 3}]
            }));
    });

    let mut fetcher = fetcher_for(&server);
    let record = fetcher.get("abcd", CacheMode::Memory).unwrap();

    mark.assert();
    assert_eq!(record.get_str("name"), Some("Test Trig"));
    assert!(!record.contains("_links"));
    assert_eq!(
        record.get("coordinates"),
        Some(&serde_json::json!([{"system": "NZGD2000"}]))
    );

    // Second lookup is served from memory
    fetcher.get("ABCD", CacheMode::Memory).unwrap();
    mark.assert_hits(1);
}

#[test]
fn numeric_id_is_sent_as_id_code() {
    let server = MockServer::start();
    let mark = server.mock(|when, then| {
        when.method(GET)
            .path("/api/gdbweb/mark")
            .query_param("code", "ID:1234");
        then.status(200).body(r#"{"id":1234,"code":"WXYZ"}"#);
    });

    let mut fetcher = fetcher_for(&server);
    let record = fetcher.get_by_id(1234, CacheMode::NoCache).unwrap();

    mark.assert();
    assert_eq!(record.get_str("code"), Some("WXYZ"));
}

#[test]
fn not_found_is_unknown_mark() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/gdbweb/mark");
        then.status(404);
    });

    let mut fetcher = fetcher_for(&server);
    let err = fetcher.get("ZZZZ", CacheMode::Memory).unwrap_err();

    assert!(matches!(err, GdbError::UnknownMark(_)));
}

#[test]
fn null_body_is_unknown_mark() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/gdbweb/mark");
        then.status(200).body("null");
    });

    let mut fetcher = fetcher_for(&server);
    let err = fetcher.get("ZZZZ", CacheMode::Memory).unwrap_err();

    assert!(matches!(err, GdbError::UnknownMark(_)));
}

#[test]
fn server_error_is_reported_by_source() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/gdbweb/mark");
        then.status(500).body("database offline");
    });

    let config =
        HttpSourceConfig::new().with_url_template(server.url("/api/gdbweb/mark?code={code}"));
    let source = HttpSource::new(config).unwrap();
    let err = source.fetch(&MarkCode::parse("ABCD").unwrap()).unwrap_err();

    match err {
        SourceError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "database offline");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn server_error_without_cache_is_connection_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/gdbweb/mark");
        then.status(500);
    });

    let mut fetcher = fetcher_for(&server);
    let err = fetcher.get("ABCD", CacheMode::Memory).unwrap_err();

    assert!(matches!(err, GdbError::Connection { .. }));
}

#[test]
fn server_error_falls_back_to_expired_cache() {
    let dir = TempDir::new().unwrap();
    let cache_config = FileCacheConfig::new(dir.path().join("gdb.cache")).with_expiry(Duration::ZERO);
    FileCache::configure(cache_config.clone())
        .store(&MarkCode::parse("ABCD").unwrap(), r#"{"code":"ABCD","name":"Cached"}"#);

    let server = MockServer::start();
    let mark = server.mock(|when, then| {
        when.method(GET).path("/api/gdbweb/mark");
        then.status(503);
    });

    let mut fetcher = fetcher_for(&server);
    fetcher.set_cached(cache_config);
    let record = fetcher.get("ABCD", CacheMode::Persistent).unwrap();

    mark.assert();
    assert_eq!(record.get_str("name"), Some("Cached"));
}

#[test]
fn fresh_cache_avoids_request() {
    let dir = TempDir::new().unwrap();
    let cache_config = FileCacheConfig::new(dir.path().join("gdb.cache"));
    FileCache::configure(cache_config.clone())
        .store(&MarkCode::parse("AAAA").unwrap(), r#"{"code":"AAAA"}"#);

    let server = MockServer::start();
    let mark = server.mock(|when, then| {
        when.method(GET).path("/api/gdbweb/mark");
        then.status(200).body(r#"{"code":"AAAA","from":"server"}"#);
    });

    let mut fetcher = fetcher_for(&server);
    fetcher.set_cached(cache_config);
    let record = fetcher.get("AAAA", CacheMode::Persistent).unwrap();

    mark.assert_hits(0);
    assert!(!record.contains("from"));
}

#[test]
fn unreachable_service_is_connection_error() {
    // Nothing listens on port 1
    let config = HttpSourceConfig::new()
        .with_url_template("http://127.0.0.1:1/mark?code={code}")
        .with_timeout(2);
    let mut fetcher = MarkFetcher::with_source(Box::new(HttpSource::new(config).unwrap()));

    let err = fetcher.get("ABCD", CacheMode::NoCache).unwrap_err();

    match err {
        GdbError::Connection { code, source } => {
            assert_eq!(code.to_string(), "ABCD");
            assert!(matches!(source, SourceError::Http(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
}
