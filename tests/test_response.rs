use httpwire::http::response::{StatusCode, default_headers};

#[test]
fn test_status_code_as_u16() {
    assert_eq!(StatusCode::Ok.as_u16(), 200);
    assert_eq!(StatusCode::BadRequest.as_u16(), 400);
    assert_eq!(StatusCode::InternalServerError.as_u16(), 500);
}

#[test]
fn test_status_code_reason_phrase() {
    assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    assert_eq!(StatusCode::BadRequest.reason_phrase(), "Bad Request");
    assert_eq!(
        StatusCode::InternalServerError.reason_phrase(),
        "Internal Server Error"
    );
}

#[test]
fn test_status_code_from_u16() {
    for status in [
        StatusCode::Ok,
        StatusCode::BadRequest,
        StatusCode::InternalServerError,
    ] {
        assert_eq!(StatusCode::from_u16(status.as_u16()), Some(status));
    }

    assert_eq!(StatusCode::from_u16(201), None);
    assert_eq!(StatusCode::from_u16(404), None);
}

#[test]
fn test_default_headers() {
    let headers = default_headers(13);

    let entries: Vec<_> = headers.iter().collect();
    assert_eq!(
        entries,
        vec![
            ("Content-Length", "13"),
            ("Connection", "close"),
            ("Content-Type", "text/plain"),
        ]
    );
}

#[test]
fn test_default_headers_can_switch_to_chunked() {
    let mut headers = default_headers(0);
    headers.remove("Content-Length");
    headers.set("Transfer-Encoding", "chunked");

    assert_eq!(headers.get("Content-Length"), None);
    assert_eq!(headers.get("transfer-encoding"), Some("chunked"));
    assert_eq!(headers.len(), 3);
}

#[test]
fn test_default_headers_override_content_type() {
    let mut headers = default_headers(4);
    headers.set("Content-type", "text/html");

    assert_eq!(headers.get("Content-Type"), Some("text/html"));
    assert_eq!(headers.len(), 3);
}
