use httpwire::http::headers::HeaderMap;
use httpwire::http::response::default_headers;
use httpwire::http::writer::{ResponseWriter, WriteError, WriterPhase};

/// Minimal chunked-body decoder: returns the body and trailer lines.
fn decode_chunked(mut input: &[u8]) -> (Vec<u8>, Vec<String>) {
    fn take_line<'a>(input: &mut &'a [u8]) -> &'a [u8] {
        let end = input
            .windows(2)
            .position(|w| w == b"\r\n")
            .expect("missing CRLF");
        let line = &input[..end];
        *input = &input[end + 2..];
        line
    }

    let mut body = Vec::new();
    loop {
        let size_line = std::str::from_utf8(take_line(&mut input)).unwrap();
        let size = usize::from_str_radix(size_line, 16).unwrap();
        if size == 0 {
            break;
        }
        body.extend_from_slice(&input[..size]);
        input = &input[size..];
        assert_eq!(take_line(&mut input), b"", "chunk data must end with CRLF");
    }

    let mut trailers = Vec::new();
    loop {
        let line = take_line(&mut input);
        if line.is_empty() {
            break;
        }
        trailers.push(String::from_utf8(line.to_vec()).unwrap());
    }
    assert!(input.is_empty(), "bytes after the final CRLF");

    (body, trailers)
}

#[tokio::test]
async fn test_fixed_length_response() {
    let mut writer = ResponseWriter::new(Vec::<u8>::new());

    writer.write_status_line(200).await.unwrap();
    writer.write_headers(&default_headers(5)).await.unwrap();
    writer.write_body(b"he").await.unwrap();
    writer.write_body(b"llo").await.unwrap();

    assert_eq!(writer.phase(), WriterPhase::Body);
    assert_eq!(
        writer.into_inner(),
        b"HTTP/1.1 200 OK\r\n\
Content-Length: 5\r\n\
Connection: close\r\n\
Content-Type: text/plain\r\n\
\r\n\
hello"
            .to_vec()
    );
}

#[tokio::test]
async fn test_status_lines() {
    for (code, line) in [
        (200, &b"HTTP/1.1 200 OK\r\n"[..]),
        (400, b"HTTP/1.1 400 Bad Request\r\n"),
        (500, b"HTTP/1.1 500 Internal Server Error\r\n"),
    ] {
        let mut writer = ResponseWriter::new(Vec::<u8>::new());
        writer.write_status_line(code).await.unwrap();
        assert_eq!(writer.phase(), WriterPhase::Headers);
        assert_eq!(writer.into_inner(), line.to_vec());
    }
}

#[tokio::test]
async fn test_unknown_status_code_writes_nothing() {
    let mut writer = ResponseWriter::new(Vec::<u8>::new());

    let result = writer.write_status_line(404).await;

    assert!(matches!(result, Err(WriteError::UnknownStatusCode(404))));
    assert_eq!(writer.phase(), WriterPhase::StatusLine);

    writer.write_status_line(200).await.unwrap();
    assert_eq!(writer.into_inner(), b"HTTP/1.1 200 OK\r\n".to_vec());
}

#[tokio::test]
async fn test_header_names_keep_their_spelling() {
    let mut headers = HeaderMap::new();
    headers.set("Content-Length", "0");
    headers.set("x-lower", "a");
    headers.set("X-Request-ID", "b");
    headers.set("content-length", "2");

    let mut writer = ResponseWriter::new(Vec::<u8>::new());
    writer.write_status_line(200).await.unwrap();
    writer.write_headers(&headers).await.unwrap();

    assert_eq!(
        writer.into_inner(),
        b"HTTP/1.1 200 OK\r\n\
Content-Length: 2\r\n\
x-lower: a\r\n\
X-Request-ID: b\r\n\
\r\n"
            .to_vec()
    );
}

#[tokio::test]
async fn test_headers_before_status_line_is_rejected() {
    let mut writer = ResponseWriter::new(Vec::<u8>::new());

    let result = writer.write_headers(&default_headers(0)).await;

    assert!(matches!(
        result,
        Err(WriteError::OrderViolation {
            expected: WriterPhase::Headers,
            actual: WriterPhase::StatusLine,
        })
    ));
    assert!(writer.into_inner().is_empty());
}

#[tokio::test]
async fn test_phases_cannot_repeat_or_skip() {
    let mut writer = ResponseWriter::new(Vec::<u8>::new());

    assert!(writer.write_body(b"x").await.is_err());
    writer.write_status_line(200).await.unwrap();
    assert!(writer.write_status_line(200).await.is_err());
    assert!(writer.write_chunked_body(b"x").await.is_err());
    writer.write_headers(&HeaderMap::new()).await.unwrap();
    assert!(writer.write_headers(&HeaderMap::new()).await.is_err());
    assert!(writer.write_trailers(&HeaderMap::new()).await.is_err());

    assert_eq!(writer.into_inner(), b"HTTP/1.1 200 OK\r\n\r\n".to_vec());
}

#[tokio::test]
async fn test_chunked_round_trip() {
    let mut headers = default_headers(0);
    headers.remove("Content-Length");
    headers.set("Transfer-Encoding", "chunked");

    let mut writer = ResponseWriter::new(Vec::<u8>::new());
    writer.write_status_line(200).await.unwrap();
    writer.write_headers(&headers).await.unwrap();
    writer.write_chunked_body(b"abc").await.unwrap();
    writer.write_chunked_body_done().await.unwrap();
    writer.write_trailers(&HeaderMap::new()).await.unwrap();
    assert_eq!(writer.phase(), WriterPhase::Done);

    let out = writer.into_inner();
    let head_end = out.windows(4).position(|w| w == b"\r\n\r\n").unwrap() + 4;
    assert_eq!(&out[head_end..], b"3\r\nabc\r\n0\r\n\r\n");

    let (body, trailers) = decode_chunked(&out[head_end..]);
    assert_eq!(body, b"abc");
    assert!(trailers.is_empty());
}

#[tokio::test]
async fn test_chunked_body_with_trailers() {
    let mut writer = ResponseWriter::new(Vec::<u8>::new());
    writer.write_status_line(200).await.unwrap();
    writer.write_headers(&HeaderMap::new()).await.unwrap();

    let payload = vec![b'z'; 300];
    let mut written = 0;
    for part in payload.chunks(128) {
        written += writer.write_chunked_body(part).await.unwrap();
    }
    assert_eq!(writer.write_chunked_body_done().await.unwrap(), 3);

    let mut trailers = HeaderMap::new();
    trailers.set("X-Content-Length", "300");
    trailers.set("X-Content-SHA256", "AbC");
    writer.write_trailers(&trailers).await.unwrap();

    let out = writer.into_inner();
    let chunks = &out[b"HTTP/1.1 200 OK\r\n\r\n".len()..];
    assert!(chunks.starts_with(b"80\r\n"));
    assert_eq!(written, 2 * (4 + 128 + 2) + (4 + 44 + 2));

    let (body, trailers) = decode_chunked(chunks);
    assert_eq!(body, payload);
    assert_eq!(
        trailers,
        vec!["X-Content-Length: 300", "X-Content-SHA256: AbC"]
    );
}

#[tokio::test]
async fn test_trailers_only_once() {
    let mut writer = ResponseWriter::new(Vec::<u8>::new());
    writer.write_status_line(200).await.unwrap();
    writer.write_headers(&HeaderMap::new()).await.unwrap();
    writer.write_chunked_body_done().await.unwrap();

    assert!(writer.write_chunked_body(b"late").await.is_err());
    writer.write_trailers(&HeaderMap::new()).await.unwrap();

    let result = writer.write_trailers(&HeaderMap::new()).await;
    assert!(matches!(
        result,
        Err(WriteError::OrderViolation {
            expected: WriterPhase::Trailers,
            actual: WriterPhase::Done,
        })
    ));
}
