use http::{HeaderMap, HeaderValue, Method, StatusCode};

use crate::client::{request, Call, Outgoing};
use crate::{Agent, Config, Error, Upid, Url};

use super::scenario::{as_str, split_prelude};
use super::server::{closed_address, TestServer};

const OK: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok";

#[async_std::test]
async fn get_round_trip() {
    let server = TestServer::start(OK).await;
    let url = server.url("/a/b");

    let response = crate::get(&url, None).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), b"ok");

    let received = server.received().await;
    let (line, headers, body) = split_prelude(as_str(&received));

    assert_eq!(line, "GET /a/b HTTP/1.1");
    assert!(headers.contains(&"connection: close"));
    assert!(!headers.iter().any(|h| h.starts_with("content-length")));
    assert_eq!(body, "");
}

#[async_std::test]
async fn post_round_trip() {
    let server = TestServer::start(OK).await;
    let url = server.url("/submit");

    let mut headers = HeaderMap::new();
    headers.insert("x-request-id", HeaderValue::from_static("42"));

    let response = crate::post(
        &url,
        Some(headers),
        Some(b"name=value".to_vec()),
        Some("application/x-www-form-urlencoded"),
    )
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let received = server.received().await;
    let (line, headers, body) = split_prelude(as_str(&received));

    assert_eq!(line, "POST /submit HTTP/1.1");
    assert!(headers.contains(&"x-request-id: 42"));
    assert!(headers.contains(&"content-type: application/x-www-form-urlencoded"));
    assert!(headers.contains(&"content-length: 10"));
    assert_eq!(body, "name=value");
}

#[async_std::test]
async fn put_content_type_without_body() {
    // Nothing listens here, the precondition fails before connecting.
    let address = closed_address().await;
    let url = Url::from_ip("http", address.ip(), address.port(), "/");

    let err = crate::put(&url, None, None, Some("text/plain"))
        .await
        .unwrap_err();

    assert_eq!(err, Error::ContentTypeWithoutBody(Method::PUT));
}

#[async_std::test]
async fn post_content_type_without_body() {
    let address = closed_address().await;
    let url = Url::from_ip("http", address.ip(), address.port(), "/");

    let err = crate::post(&url, None, None, Some("text/plain"))
        .await
        .unwrap_err();

    assert_eq!(err, Error::ContentTypeWithoutBody(Method::POST));
}

#[async_std::test]
async fn put_without_content_type() {
    let server = TestServer::start(b"HTTP/1.1 204 No Content\r\n\r\n").await;
    let url = server.url("/");

    let response = crate::put(&url, None, None, None).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let received = server.received().await;
    let (line, headers, _) = split_prelude(as_str(&received));

    assert_eq!(line, "PUT / HTTP/1.1");
    assert!(!headers.iter().any(|h| h.starts_with("content-")));
}

#[async_std::test]
async fn unsupported_scheme() {
    let url: Url = "https://127.0.0.1/".parse().unwrap();

    let err = crate::get(&url, None).await.unwrap_err();

    assert_eq!(err, Error::UnsupportedScheme("https".into()));
}

#[async_std::test]
async fn connection_refused() {
    let address = closed_address().await;
    let url = Url::from_ip("http", address.ip(), address.port(), "/");

    let err = crate::get(&url, None).await.unwrap_err();

    assert!(matches!(err, Error::Connect(_)), "{:?}", err);
}

#[async_std::test]
async fn garbage_response() {
    let server = TestServer::start(b"SSH-2.0-OpenSSH_9.6\r\n").await;
    let url = server.url("/");

    let err = crate::get(&url, None).await.unwrap_err();

    assert_eq!(err, Error::Decode("SSH-2.0-OpenSSH_9.6\r\n".into()));
}

#[async_std::test]
async fn pipelined_responses_keep_first() {
    let mut response = OK.to_vec();
    response.extend_from_slice(b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\n\r\n");

    let server = TestServer::start(&response).await;
    let url = server.url("/");

    let response = crate::get(&url, None).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[async_std::test]
async fn response_too_large() {
    let server = TestServer::start(OK).await;
    let url = server.url("/");

    let agent = Agent::with_config(Config::new().max_response_size(Some(10)));
    let err = agent.get(&url, None).await.unwrap_err();

    assert_eq!(err, Error::ResponseTooLarge(10));
}

#[async_std::test]
async fn response_within_max_size() {
    let server = TestServer::start(OK).await;
    let url = server.url("/");

    let agent = Agent::with_config(Config::new().max_response_size(Some(OK.len())));
    let response = agent.get(&url, None).await.unwrap();

    assert_eq!(response.body(), b"ok");
}

#[async_std::test]
async fn domain_is_resolved() {
    let server = TestServer::start(OK).await;
    let port = server.address().port();
    let url = Url::from_domain("http", "localhost", port, "/");

    let response = crate::get(&url, None).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let received = server.received().await;
    let (_, headers, _) = split_prelude(as_str(&received));

    // The host header is the resolved address, not the domain.
    let host = format!("host: 127.0.0.1:{}", port);
    assert!(headers.contains(&host.as_str()));
}

#[async_std::test]
async fn get_process_with_query() {
    let server = TestServer::start(OK).await;
    let upid = Upid::new("master", server.address());

    let response = crate::get_process(&upid, Some("state"), Some("?jsonp=cb"), None)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let received = server.received().await;
    let (line, _, _) = split_prelude(as_str(&received));

    assert_eq!(line, "GET /master/state?jsonp=cb HTTP/1.1");
}

#[async_std::test]
async fn get_process_bad_query() {
    let upid = Upid::new("master", closed_address().await);

    let err = crate::get_process(&upid, None, Some("a=%zz"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::QueryDecode(_)));
}

#[async_std::test]
async fn post_process() {
    let server = TestServer::start(OK).await;
    let upid = Upid::new("scheduler(1)", server.address());

    crate::post_process(&upid, Some("/call"), None, Some(b"{}".to_vec()), Some("application/json"))
        .await
        .unwrap();

    let received = server.received().await;
    let (line, headers, body) = split_prelude(as_str(&received));

    assert_eq!(line, "POST /scheduler(1)/call HTTP/1.1");
    assert!(headers.contains(&"content-type: application/json"));
    assert_eq!(body, "{}");
}

#[async_std::test]
async fn stepwise_call() {
    let server = TestServer::start(OK).await;
    let url = server.url("/step");

    let call = Call::new(
        url,
        Outgoing::new(Method::GET, None, None, None).unwrap(),
        Config::default(),
    )
    .unwrap();

    let call = call.proceed().await.unwrap();
    assert_eq!(call.address(), server.address());

    let call = call.proceed().await.unwrap();
    assert!(call.prelude().unwrap().starts_with(b"GET /step HTTP/1.1\r\n"));

    let call = call.proceed().await.unwrap();
    let call = call.proceed().await.unwrap();
    assert_eq!(call.buffer(), OK);

    let response = call.proceed().unwrap();
    assert_eq!(response.body(), b"ok");
}

#[async_std::test]
async fn request_fn() {
    let server = TestServer::start(OK).await;

    let response = request(
        server.url("/"),
        Outgoing::new(Method::GET, None, None, None).unwrap(),
        &Config::default(),
    )
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
