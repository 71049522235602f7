use portico::http::form::FormValue;
use portico::http::parser::parse;
use portico::http::request::{Method, Scheme};
use portico::transport::TransportState;

#[test]
fn test_cgi_vars_to_request() {
    let vars = [
        ("REQUEST_METHOD", "post"),
        ("REQUEST_SCHEME", "https"),
        ("SERVER_NAME", "example.com"),
        ("SERVER_PORT", "443"),
        ("REQUEST_URI", "/app/users/42/?expand&fields[]=name"),
        ("SCRIPT_NAME", "/app/index.cgi"),
        ("CONTENT_TYPE", "application/x-www-form-urlencoded"),
        ("CONTENT_LENGTH", "13"),
        ("HTTP_USER_AGENT", "curl/8.0"),
        ("HTTP_COOKIE", "sid=abc; lang=en"),
        ("PATH", "/usr/bin"),
    ];
    let state = TransportState::from_cgi_vars(vars, b"name=Ada+King");
    let req = parse(&state).unwrap();

    assert_eq!(req.method(), Method::POST);
    assert_eq!(req.scheme(), Scheme::HTTPS);
    assert_eq!(req.host(), "example.com");
    assert_eq!(req.port(), 443);
    assert_eq!(req.path(), "app");
    assert_eq!(req.uri(), "users/42");
    assert_eq!(req.flags(), ["expand".to_string()]);
    assert_eq!(
        req.parameter("fields").and_then(|v| v.get("0")),
        Some(&FormValue::from("name"))
    );
    assert_eq!(req.value("name"), Some(&FormValue::from("Ada King")));
    assert_eq!(req.cookie("lang"), Some("en"));
    assert_eq!(req.header("User-Agent"), Some("curl/8.0"));
    assert_eq!(req.header("Content-Type"), Some("application/x-www-form-urlencoded"));
    assert_eq!(req.header("Path"), None);
}

#[test]
fn test_cgi_https_flag_selects_scheme() {
    let state = TransportState::from_cgi_vars([("HTTPS", "on")], b"");
    assert_eq!(parse(&state).unwrap().scheme(), Scheme::HTTPS);

    let state = TransportState::from_cgi_vars([("HTTPS", "off")], b"");
    assert_eq!(parse(&state).unwrap().scheme(), Scheme::HTTP);

    let state = TransportState::from_cgi_vars([("HTTPS", "on"), ("REQUEST_SCHEME", "http")], b"");
    assert_eq!(parse(&state).unwrap().scheme(), Scheme::HTTP);
}

#[test]
fn test_cgi_root_script() {
    let state = TransportState::from_cgi_vars(
        [("SCRIPT_NAME", "/index.cgi"), ("REQUEST_URI", "/index.cgi/extra")],
        b"",
    );
    let req = parse(&state).unwrap();

    assert_eq!(req.path(), "");
    assert_eq!(req.uri(), "index.cgi/extra");
}

#[test]
fn test_cgi_body_ignored_without_form_content_type() {
    let state = TransportState::from_cgi_vars([("CONTENT_TYPE", "text/plain")], b"a=1");
    assert!(state.form.is_empty());
}
