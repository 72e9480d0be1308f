//! Tests for the HTTP parser.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use serde::{Deserialize, Serialize};

    use crate::parser::{HttpRequest, Method, HttpVersion, Error, parse_head, parse_request};

    #[test]
    fn test_parse_simple_get_request() {
        let request = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.method, Method::GET);
        assert_eq!(result.path, "/index.html");
        assert_eq!(result.version, HttpVersion::Http11);
        assert_eq!(result.headers.get("Host").unwrap(), "example.com");
        assert!(result.body.is_empty());
    }

    #[test]
    fn test_parse_request_with_multiple_headers() {
        let request = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\nUser-Agent: test\r\nAccept: */*\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.headers.len(), 3);
        assert_eq!(result.headers.get("User-Agent").unwrap(), "test");
        assert_eq!(result.headers.get("Accept").unwrap(), "*/*");
    }

    #[test]
    fn test_header_keys_kept_as_received() {
        let request = b"GET / HTTP/1.1\r\nx-custom-Header: v\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.headers.get("x-custom-Header").unwrap(), "v");
        assert!(result.headers.get("X-Custom-Header").is_none());
        assert!(result.has_header("X-CUSTOM-HEADER"));
    }

    #[test]
    fn test_host_header_not_required() {
        let request = b"GET /counter HTTP/1.1\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.path, "/counter");
        assert!(result.headers.is_empty());
    }

    #[test]
    fn test_invalid_method() {
        let request = b"INVALID /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidMethod(ref m)) if m == "INVALID"));
    }

    #[test]
    fn test_patch_is_not_a_routable_method() {
        let request = b"PATCH /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidMethod(ref m)) if m == "PATCH"));
    }

    #[test]
    fn test_lowercase_method_rejected() {
        let result = parse_request(b"get / HTTP/1.1\r\n\r\n");
        assert!(matches!(result, Err(Error::InvalidMethod(_))));
    }

    #[test]
    fn test_invalid_http_version() {
        let request = b"GET /index.html HTTP/9.9\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidVersion(ref v)) if v == "HTTP/9.9"));
    }

    #[test]
    fn test_http2_version_rejected() {
        let request = b"GET /index.html HTTP/2\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidVersion(ref v)) if v == "HTTP/2"));
    }

    #[test]
    fn test_invalid_header_format() {
        let request = b"GET /index.html HTTP/1.1\r\nInvalidHeader\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidHeaderFormat)));
    }

    #[test]
    fn test_header_with_empty_name() {
        let request = b"GET /index.html HTTP/1.1\r\n: value\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidHeaderFormat)));
    }

    #[test]
    fn test_empty_request() {
        let result = parse_request(b"");
        assert!(matches!(result, Err(Error::EmptyRequest)));
    }

    #[test]
    fn test_incomplete_request_line() {
        let result = parse_request(b"GET\r\n");
        assert!(matches!(result, Err(Error::MalformedRequestLine(_))));
    }

    #[test]
    fn test_unterminated_header_block() {
        let result = parse_request(b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n");
        assert!(matches!(result, Err(Error::IncompleteHeaders)));
    }

    #[test]
    fn test_path_must_be_origin_form() {
        let result = parse_request(b"GET index.html HTTP/1.1\r\n\r\n");
        assert!(matches!(result, Err(Error::InvalidPath)));
    }

    #[test]
    fn test_all_methods() {
        let methods = vec![
            ("GET", Method::GET),
            ("POST", Method::POST),
            ("PUT", Method::PUT),
            ("DELETE", Method::DELETE),
            ("OPTIONS", Method::OPTIONS),
            ("HEAD", Method::HEAD),
        ];

        for (token, expected_method) in methods {
            let request = format!("{token} /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n");
            let result = parse_request(request.as_bytes()).unwrap();
            assert_eq!(result.method, expected_method);
            assert_eq!(result.method.to_string(), token);
        }
    }

    #[test]
    fn test_headers_with_multiple_colons() {
        let request = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\nX-Test: value:with:colons\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.headers.get("X-Test").unwrap(), "value:with:colons");
    }

    #[test]
    fn test_http10_version() {
        let request = b"GET /index.html HTTP/1.0\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.version, HttpVersion::Http10);
        assert!(result.headers.is_empty());
    }

    #[test]
    fn test_http_version_display() {
        assert_eq!(HttpVersion::Http10.to_string(), "HTTP/1.0");
        assert_eq!(HttpVersion::Http11.to_string(), "HTTP/1.1");
    }

    #[test]
    fn test_headers_with_trailing_whitespace() {
        let request = b"GET /index.html HTTP/1.1\r\nHost: example.com  \r\nUser-Agent:  test  \r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.headers.get("Host").unwrap(), "example.com");
        assert_eq!(result.headers.get("User-Agent").unwrap(), "test");
    }

    #[test]
    fn test_mixed_line_endings() {
        let request = b"GET /index.html HTTP/1.1\r\nHost: example.com\nUser-Agent: test\r\n\r\nbody";
        let result = parse_request(request).unwrap();
        assert_eq!(result.headers.get("Host").unwrap(), "example.com");
        assert_eq!(result.headers.get("User-Agent").unwrap(), "test");
        assert_eq!(result.body, b"body");
    }

    #[test]
    fn test_request_line_with_extra_whitespace() {
        let request = b"GET  /index.html  HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.method, Method::GET);
        assert_eq!(result.path, "/index.html");
    }

    #[test]
    fn test_empty_path() {
        let request = b"GET  HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::MalformedRequestLine(_))));
    }

    #[test]
    fn test_path_with_query_parameters() {
        let request = b"GET /search?q=test&flag&empty= HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.path, "/search?q=test&flag&empty=");
        assert_eq!(result.get_query_param("q").unwrap(), "test");
        assert_eq!(result.get_query_param("flag").unwrap(), "");
        assert!(result.has_query_param("empty"));
        assert!(!result.has_query_param("missing"));
    }

    #[test]
    fn test_malformed_utf8_in_head() {
        let request = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\nX-Test: \xFF\xFF\xFF\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::MalformedRequestLine(ref s)) if s == "Invalid UTF-8"));
    }

    #[test]
    fn test_binary_body_is_accepted() {
        let request = b"POST /upload HTTP/1.1\r\nContent-Length: 3\r\n\r\n\xFF\x00\xFE";
        let result = parse_request(request).unwrap();
        assert_eq!(result.body, vec![0xFF, 0x00, 0xFE]);
        assert!(result.body_str().is_none());
    }

    #[test]
    fn test_duplicate_headers() {
        let request = b"GET /index.html HTTP/1.1\r\nX-Test: value1\r\nX-Test: value2\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.headers.get("X-Test").unwrap(), "value2");
    }

    #[test]
    fn test_parse_head_reports_body_offset() {
        let request = b"POST /a HTTP/1.1\r\nHost: x\r\n\r\nrest";
        let head = parse_head(request).unwrap();
        assert_eq!(head.method, Method::POST);
        assert_eq!(&request[head.body_offset..], b"rest");
    }

    #[test]
    fn test_body_truncated_to_content_length() {
        let request = b"POST /echo HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello world";
        let result = parse_request(request).unwrap();
        assert_eq!(result.body, b"hello");
    }

    #[test]
    fn test_body_without_content_length_is_remaining_bytes() {
        let request = b"POST /echo HTTP/1.1\r\nHost: x\r\n\r\nhello world";
        let result = parse_request(request).unwrap();
        assert_eq!(result.body, b"hello world");
    }

    #[test]
    fn test_short_body_is_never_padded() {
        let request = b"POST /echo HTTP/1.1\r\nContent-Length: 50\r\n\r\nshort";
        let result = parse_request(request).unwrap();
        assert_eq!(result.body, b"short");
    }

    #[test]
    fn test_zero_content_length_drops_trailing_bytes() {
        let request = b"POST /echo HTTP/1.1\r\nContent-Length: 0\r\n\r\nignored";
        let result = parse_request(request).unwrap();
        assert!(result.body.is_empty());
    }

    #[test]
    fn test_content_length_name_is_case_insensitive() {
        let request = b"POST /echo HTTP/1.1\r\ncontent-length: 2\r\n\r\nabcdef";
        let result = parse_request(request).unwrap();
        assert_eq!(result.body, b"ab");
    }

    #[test]
    fn test_content_length_variants_resolve_deterministically() {
        // Exact spelling wins over other case variants.
        let request = b"POST /echo HTTP/1.1\r\ncontent-length: 2\r\nContent-Length: 5\r\n\r\nabcdefgh";
        for _ in 0..20 {
            assert_eq!(parse_request(request).unwrap().body, b"abcde");
        }

        // Without it, the variant that sorts first is used.
        let request = b"POST /echo HTTP/1.1\r\ncontent-length: 2\r\nCONTENT-LENGTH: 4\r\n\r\nabcdefgh";
        for _ in 0..20 {
            assert_eq!(parse_request(request).unwrap().body, b"abcd");
        }
    }

    #[test]
    fn test_unparseable_content_length_keeps_body() {
        let request = b"POST /echo HTTP/1.1\r\nContent-Length: -3\r\n\r\nabcdef";
        let result = parse_request(request).unwrap();
        assert_eq!(result.body, b"abcdef");
    }

    #[test]
    fn test_http_request_methods() {
        let mut headers = HashMap::new();
        headers.insert("Host".to_string(), "example.com".to_string());
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        let request = HttpRequest::new(Method::GET, "/index.html".to_string(), HttpVersion::Http11, headers.clone());

        assert_eq!(request.get_header("host").unwrap(), "example.com");
        assert_eq!(request.get_header("HOST").unwrap(), "example.com");
        assert!(request.get_header("X-Test").is_none());
        assert!(request.has_header("Host"));
        assert!(!request.has_header("X-Test"));
        assert!(request.is_json());

        let body = b"{\"key\":\"value\"}".to_vec();
        let request_with_body = HttpRequest::with_body(Method::POST, "/api".to_string(), HttpVersion::Http11, headers, body);
        assert_eq!(request_with_body.method, Method::POST);
        assert_eq!(request_with_body.body_str(), Some("{\"key\":\"value\"}"));
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestUser {
        name: String,
        email: String,
    }

    #[test]
    fn test_json_parsing() {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        let body = r#"{"name":"John Doe","email":"john@example.com"}"#.as_bytes().to_vec();
        let request = HttpRequest::with_body(Method::POST, "/api/users".to_string(), HttpVersion::Http11, headers.clone(), body.clone());

        let user: TestUser = request.json().unwrap();
        assert_eq!(user.name, "John Doe");
        assert_eq!(user.email, "john@example.com");

        let mut headers_no_json = headers.clone();
        headers_no_json.insert("Content-Type".to_string(), "text/plain".to_string());
        let request_no_json = HttpRequest::with_body(Method::POST, "/api/users".to_string(), HttpVersion::Http11, headers_no_json, body);
        let result: Result<TestUser, _> = request_no_json.json();
        assert!(matches!(result, Err(Error::MissingHeader(_))));

        let invalid_body = r#"{"name":"John Doe","email":}"#.as_bytes().to_vec();
        let request_invalid_json = HttpRequest::with_body(Method::POST, "/api/users".to_string(), HttpVersion::Http11, headers, invalid_body);
        let result: Result<TestUser, _> = request_invalid_json.json();
        assert!(matches!(result, Err(Error::JsonError(_))));
    }

    #[test]
    fn test_complex_request() {
        let request = b"POST /api/users?role=admin HTTP/1.1\r\n\
            Host: example.com\r\n\
            User-Agent: test-client/1.0\r\n\
            Content-Type: application/json\r\n\
            Content-Length: 46\r\n\
            X-API-Key: secret-key\r\n\
            \r\n\
            {\"name\":\"John Doe\",\"email\":\"john@example.com\"}trailing";

        let result = parse_request(request).unwrap();
        assert_eq!(result.method, Method::POST);
        assert_eq!(result.path, "/api/users?role=admin");
        assert_eq!(result.headers.get("X-API-Key").unwrap(), "secret-key");
        assert_eq!(result.query_params.get("role").unwrap(), "admin");

        let user: TestUser = result.json().unwrap();
        assert_eq!(user.name, "John Doe");
    }
}
