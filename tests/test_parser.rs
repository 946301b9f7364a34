use rawhttp::http::error::Error;
use rawhttp::http::parser::{ParserState, RequestParser};
use rawhttp::http::request::Request;

/// Feeds `data` in `chunk_size` pieces the way the connection driver does:
/// append, parse, drop the consumed prefix. Returns the parser and whatever
/// was left unconsumed.
fn feed_in_chunks(data: &[u8], chunk_size: usize) -> (RequestParser, Vec<u8>) {
    let mut parser = RequestParser::new();
    let mut buffer = Vec::new();

    for piece in data.chunks(chunk_size) {
        buffer.extend_from_slice(piece);
        let consumed = parser.parse(&buffer).unwrap();
        buffer.drain(..consumed);
    }

    (parser, buffer)
}

fn parse_whole(data: &[u8]) -> Request {
    let (parser, _) = feed_in_chunks(data, data.len());
    parser.finish().unwrap()
}

#[test]
fn test_parse_simple_get_request() {
    let req = b"GET / HTTP/1.1\r\nHost: localhost:42069\r\nUser-Agent: curl/7.81.0\r\nAccept: */*\r\n\r\n";
    let mut parser = RequestParser::new();
    let consumed = parser.parse(req).unwrap();

    assert_eq!(consumed, req.len());
    assert_eq!(parser.state(), ParserState::Done);

    let parsed = parser.finish().unwrap();
    assert_eq!(parsed.method(), "GET");
    assert_eq!(parsed.target(), "/");
    assert_eq!(parsed.request_line.http_version, "1.1");
    assert_eq!(parsed.header("host"), Some("localhost:42069"));
    assert_eq!(parsed.header("user-agent"), Some("curl/7.81.0"));
    assert_eq!(parsed.header("accept"), Some("*/*"));
    assert!(parsed.body.is_empty());
}

#[test]
fn test_parse_post_request_with_body() {
    let req = b"POST /coffee HTTP/1.1\r\nHost: localhost\r\nContent-Length: 22\r\n\r\n{\"flavor\":\"dark mode\"}";
    let parsed = parse_whole(req);

    assert_eq!(parsed.method(), "POST");
    assert_eq!(parsed.target(), "/coffee");
    assert_eq!(&parsed.body[..], b"{\"flavor\":\"dark mode\"}");
}

#[test]
fn test_parse_request_with_path_and_query_string() {
    let parsed = parse_whole(b"GET /search?q=rust HTTP/1.1\r\nHost: example.com\r\n\r\n");

    assert_eq!(parsed.target(), "/search?q=rust");
}

#[test]
fn test_parse_request_with_binary_body() {
    let parsed = parse_whole(b"POST /upload HTTP/1.1\r\nContent-Length: 4\r\n\r\n\x00\x01\x02\x03");

    assert_eq!(&parsed.body[..], &[0, 1, 2, 3]);
}

#[test]
fn test_parse_duplicate_headers_are_merged() {
    let parsed = parse_whole(b"GET / HTTP/1.1\r\nAccept: a\r\nAccept: b\r\n\r\n");

    assert_eq!(parsed.header("Accept"), Some("a,b"));
}

#[test]
fn test_chunk_boundary_invariance() {
    let req = b"POST /submit HTTP/1.1\r\nHost: localhost:42069\r\nX-Tag: a\r\nX-Tag: b\r\nContent-Length: 13\r\n\r\nhello, world!";
    let expected = parse_whole(req);

    for chunk_size in 1..=req.len() {
        let (parser, leftover) = feed_in_chunks(req, chunk_size);
        assert!(leftover.is_empty(), "chunk size {chunk_size}");
        assert_eq!(parser.finish().unwrap(), expected, "chunk size {chunk_size}");
    }
}

#[test]
fn test_trailing_bytes_are_not_consumed() {
    let req = b"POST /a HTTP/1.1\r\nContent-Length: 3\r\n\r\nabcGET /next HTTP/1.1\r\n";
    let mut parser = RequestParser::new();

    let consumed = parser.parse(req).unwrap();

    assert_eq!(&req[consumed..], b"GET /next HTTP/1.1\r\n");
    assert_eq!(&parser.finish().unwrap().body[..], b"abc");
}

#[test]
fn test_trailing_bytes_survive_byte_by_byte_feeding() {
    let req = b"GET / HTTP/1.1\r\n\r\nleftover";
    let (parser, leftover) = feed_in_chunks(req, 1);

    assert!(parser.is_done());
    assert_eq!(leftover, b"leftover");
}

#[test]
fn test_done_is_idempotent() {
    let req = b"GET / HTTP/1.1\r\n\r\n";
    let mut parser = RequestParser::new();

    assert_eq!(parser.parse(req).unwrap(), req.len());
    assert_eq!(parser.parse(b"more data").unwrap(), 0);
    assert!(parser.is_done());
}

#[test]
fn test_parse_incomplete_request_line() {
    let mut parser = RequestParser::new();

    assert_eq!(parser.parse(b"GET / HTT").unwrap(), 0);
    assert_eq!(parser.state(), ParserState::Init);
}

#[test]
fn test_parse_incomplete_headers() {
    let mut parser = RequestParser::new();
    let data = b"GET / HTTP/1.1\r\nHost: example.com\r\n";

    assert_eq!(parser.parse(data).unwrap(), data.len());
    assert_eq!(parser.state(), ParserState::Headers);
    assert!(parser.finish().is_none());
}

#[test]
fn test_parse_incomplete_body() {
    let mut parser = RequestParser::new();
    let data = b"POST /api HTTP/1.1\r\nContent-Length: 10\r\n\r\nhello";

    assert_eq!(parser.parse(data).unwrap(), data.len());
    assert_eq!(parser.state(), ParserState::Body);
}

#[test]
fn test_body_beyond_content_length_is_left() {
    let mut parser = RequestParser::new();
    let data = b"POST /api HTTP/1.1\r\nContent-Length: 2\r\n\r\nhello";

    assert_eq!(parser.parse(data).unwrap(), data.len() - 3);
    assert_eq!(&parser.finish().unwrap().body[..], b"he");
}

#[test]
fn test_non_numeric_content_length_means_empty_body() {
    let data = b"POST /api HTTP/1.1\r\nContent-Length: abc\r\n\r\nhello";
    let mut parser = RequestParser::new();

    let consumed = parser.parse(data).unwrap();

    assert_eq!(&data[consumed..], b"hello");
    let parsed = parser.finish().unwrap();
    assert!(parsed.body.is_empty());
    assert_eq!(parsed.content_length(), 0);
}

#[test]
fn test_zero_content_length() {
    let parsed = parse_whole(b"POST /api HTTP/1.1\r\nContent-Length: 0\r\n\r\n");

    assert!(parsed.body.is_empty());
}

#[test]
fn test_malformed_request_line_wrong_part_count() {
    for req in [
        &b"/coffee HTTP/1.1\r\n\r\n"[..],
        b"GET /coffee extra HTTP/1.1\r\n\r\n",
        b"GET  / HTTP/1.1\r\n\r\n",
    ] {
        let mut parser = RequestParser::new();
        assert!(matches!(parser.parse(req), Err(Error::MalformedRequestLine)));
    }
}

#[test]
fn test_malformed_request_line_bad_version() {
    for req in [
        &b"GET / HTTP/1.0\r\n\r\n"[..],
        b"GET / HTTP/2\r\n\r\n",
        b"GET / FTP/1.1\r\n\r\n",
        b"GET / http/1.1\r\n\r\n",
    ] {
        let mut parser = RequestParser::new();
        assert!(matches!(parser.parse(req), Err(Error::MalformedRequestLine)));
    }
}

#[test]
fn test_malformed_header_name() {
    let mut parser = RequestParser::new();
    let result = parser.parse(b"GET / HTTP/1.1\r\nHost : localhost\r\n\r\n");

    assert!(matches!(result, Err(Error::MalformedFieldName)));
    assert_eq!(parser.state(), ParserState::Error);
}

#[test]
fn test_malformed_header_line() {
    let mut parser = RequestParser::new();
    let result = parser.parse(b"GET / HTTP/1.1\r\nBrokenHeader\r\n\r\n");

    assert!(matches!(result, Err(Error::MalformedFieldLine)));
}

#[test]
fn test_error_state_is_absorbing() {
    let mut parser = RequestParser::new();
    assert!(parser.parse(b"BROKEN\r\n").is_err());
    assert!(parser.is_error());

    let result = parser.parse(b"GET / HTTP/1.1\r\n\r\n");

    assert!(matches!(result, Err(Error::RequestInErrorState)));
    assert!(parser.is_error());
    assert!(parser.finish().is_none());
}

#[test]
fn test_header_error_split_across_reads() {
    let mut parser = RequestParser::new();

    assert_eq!(parser.parse(b"GET / HTTP/1.1\r\nHo").unwrap(), 16);
    let result = parser.parse(b"Host : x\r\n");

    assert!(matches!(result, Err(Error::MalformedFieldName)));
    assert!(matches!(parser.parse(b"\r\n"), Err(Error::RequestInErrorState)));
}

#[test]
fn test_non_utf8_header_value_is_accepted() {
    let req = b"GET / HTTP/1.1\r\nX-Name: caf\xe9\r\n\r\n";
    let mut parser = RequestParser::new();

    assert_eq!(parser.parse(req).unwrap(), req.len());
    let parsed = parser.finish().unwrap();
    assert_eq!(parsed.header("X-Name"), Some("caf\u{fffd}"));
}

#[test]
fn test_non_utf8_target_is_accepted() {
    let req = b"GET /caf\xe9 HTTP/1.1\r\n\r\n";
    let mut parser = RequestParser::new();

    assert_eq!(parser.parse(req).unwrap(), req.len());
    let parsed = parser.finish().unwrap();
    assert_eq!(parsed.target(), "/caf\u{fffd}");
    assert_eq!(parsed.method(), "GET");
}
