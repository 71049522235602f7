use portico::http::response::{Headers, Response, ResponseBuilder};
use portico::http::status::Status;
use portico::transport::cgi::CgiWriter;
use portico::transport::{Recorder, Transport};
use portico::WebError;

fn headers(pairs: &[(&str, &str)]) -> Headers {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_empty_response() {
    let response = Response::default();

    assert_eq!(response.body(), "");
    assert_eq!(response.status_code(), 202);
    assert_eq!(response.status_message(), "Accepted");
    assert!(response.headers().is_empty());
}

#[test]
fn test_response_with_body() {
    let body = "Body content for the HTTP response";
    let response = Response::new(body, Status::Accepted, Headers::new()).unwrap();

    assert_eq!(response.body(), body);
    assert_eq!(response.status_code(), 202);
    assert!(response.headers().is_empty());
}

#[test]
fn test_response_with_status_enum() {
    let response = Response::new("", Status::Continue, Headers::new()).unwrap();

    assert_eq!(response.status_code(), 100);
    assert_eq!(response.status_message(), "Continue");
}

#[test]
fn test_response_with_valid_status_code() {
    let response = Response::new("", 200, Headers::new()).unwrap();

    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.status_message(), "OK");
}

#[test]
fn test_response_with_invalid_status_code() {
    let err = Response::new("", 999, Headers::new()).unwrap_err();

    assert_eq!(err, WebError::UndefinedStatusCode(999));
    assert_eq!(err.code(), 2301);
}

#[test]
fn test_every_listed_code_builds_a_response() {
    for status in Status::ALL {
        let code = status.as_u16();
        let response = Response::new("", i64::from(code), Headers::new()).unwrap();
        assert_eq!(response.status_code(), code);
        assert_eq!(status.to_string(), format!("{code} {}", response.status_message()));
    }
}

#[test]
fn test_every_unlisted_code_fails() {
    for code in 0u16..=1000 {
        if Status::from_code(code).is_some() {
            continue;
        }
        assert_eq!(
            Response::new("", code, Headers::new()),
            Err(WebError::UndefinedStatusCode(code.into()))
        );
    }
    assert!(Response::new("", -1, Headers::new()).is_err());
}

#[test]
fn test_response_with_headers() {
    let hdrs = headers(&[("Content-Type", "application/json")]);
    let response = Response::new("", 202, hdrs.clone()).unwrap();

    assert_eq!(response.headers(), &hdrs);
    assert_eq!(response.header("Content-Type"), Some("application/json"));
}

#[test]
fn test_builder_defaults_and_overrides() {
    let response = ResponseBuilder::new().build().unwrap();
    assert_eq!(response, Response::default());

    let response = Response::builder()
        .status(Status::Created)
        .header("Location", "/items/1")
        .body("created")
        .build()
        .unwrap();
    assert_eq!(response.status_code(), 201);
    assert_eq!(response.body(), "created");
    assert_eq!(response.header("Location"), Some("/items/1"));
}

#[test]
fn test_builder_reports_invalid_status() {
    let result = ResponseBuilder::new().status(600).body("x").build();
    assert_eq!(result, Err(WebError::UndefinedStatusCode(600)));
}

#[test]
fn test_helpers() {
    assert_eq!(Response::ok("fine").status(), Status::Ok);
    assert_eq!(Response::not_found().status(), Status::NotFound);

    let resp = Response::from_error(&WebError::UndefinedRequestMethod("BREW".into()));
    assert_eq!(resp.status(), Status::NotImplemented);
    assert!(resp.body().contains("BREW"));

    let resp = Response::from_error(&WebError::UndefinedRequestScheme("FTP".into()));
    assert_eq!(resp.status(), Status::BadRequest);

    let resp = Response::from_error(&WebError::UndefinedStatusCode(999));
    assert_eq!(resp.status(), Status::InternalServerError);
}

#[test]
fn test_emit_order_and_content() {
    let hdrs = headers(&[("X-Second", "2"), ("X-First", "1"), ("Content-Type", "text/plain")]);
    let response = Response::new("hello", 418, hdrs).unwrap();

    let mut recorder = Recorder::new();
    response.emit(&mut recorder).unwrap();

    assert_eq!(recorder.status, Some(Status::ImATeapot));
    assert_eq!(
        recorder.headers,
        vec![
            ("X-Second".to_string(), "2".to_string()),
            ("X-First".to_string(), "1".to_string()),
            ("Content-Type".to_string(), "text/plain".to_string()),
        ]
    );
    assert_eq!(recorder.flushes, 1);
    assert_eq!(recorder.body_str(), Some("hello"));
}

#[test]
fn test_emit_finishes_the_transport() {
    let mut recorder = Recorder::new();
    Response::default().emit(&mut recorder).unwrap();

    assert!(recorder.is_finished());
    assert!(recorder.write_header("X-Late", "1").is_err());
    assert!(Response::ok("again").emit(&mut recorder).is_err());
}

#[test]
fn test_emit_rejects_header_injection() {
    let response = Response::new("", 200, headers(&[("X-Bad", "a\r\nSet-Cookie: x=1")])).unwrap();
    let mut recorder = Recorder::new();

    assert!(response.emit(&mut recorder).is_err());
    assert!(!recorder.is_finished());
}

#[test]
fn test_emit_cgi_format() {
    let response = Response::new("{}", 404, headers(&[("Content-Type", "application/json")])).unwrap();
    let mut writer = CgiWriter::new(Vec::new());
    response.emit(&mut writer).unwrap();

    let out = String::from_utf8(writer.into_inner()).unwrap();
    assert_eq!(out, "Status: 404 Not Found\r\nContent-Type: application/json\r\n\r\n{}");
}
