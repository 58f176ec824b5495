//! Fetches against the live mock server over real HTTP.
//!
//! # Design
//! Starts the mock server on a random port and drives the client through a
//! `ureq`-backed transport. The echo endpoint reports what actually reached
//! the server, which validates URL composition, parameter encoding and header
//! routing end-to-end; the document endpoints validate content negotiation.

use std::future::Future;
use std::net::SocketAddr;

use fetch_core::{Client, Method, RawResponse, Request, Transport, WireRequest};
use mock_server::{Echo, Person};

/// Sends a `WireRequest` with ureq.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`.
struct Ureq {
    agent: ureq::Agent,
}

impl Ureq {
    fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for Ureq {
    type Error = ureq::Error;

    async fn send(&self, req: WireRequest) -> Result<RawResponse, ureq::Error> {
        let headers = req.headers.iter().chain(&req.content_headers);
        let mut response = match req.method {
            Method::GET => headers
                .fold(self.agent.get(&req.uri), |builder, (name, value)| builder.header(name, value))
                .call()?,
            Method::DELETE => headers
                .fold(self.agent.delete(&req.uri), |builder, (name, value)| builder.header(name, value))
                .call()?,
            Method::POST => headers
                .fold(self.agent.post(&req.uri), |builder, (name, value)| builder.header(name, value))
                .content_type(&req.content_type)
                .send(req.body.as_bytes())?,
            Method::PUT => headers
                .fold(self.agent.put(&req.uri), |builder, (name, value)| builder.header(name, value))
                .content_type(&req.content_type)
                .send(req.body.as_bytes())?,
            other => panic!("unsupported method in test transport: {other}"),
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.body_mut().read_to_vec()?;

        Ok(RawResponse {
            status,
            headers,
            content_headers: Vec::new(),
            body: body.into(),
        })
    }
}

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

fn client() -> Client<Ureq> {
    let addr = start_server();
    Client::with_base_url(Ureq::new(), &format!("http://{addr}")).unwrap()
}

#[test]
fn form_post_reaches_server_as_composed() {
    let client = client();
    client.set_default_header("X-Api-Key", "secret");

    let request = Request::new("/echo/items?page=2")
        .with_method(Method::POST)
        .with_query("q", "a b")
        .with_body_param("name", "Ada Lovelace")
        .with_body_param("tags", ["x", "y"]);
    let response = block_on(client.fetch(request)).unwrap();

    assert_eq!(response.status(), 200);
    let echo: Echo = response.parse().expect("echo is served as json");
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.path, "/echo/items");
    assert_eq!(echo.query.as_deref(), Some("page=2&q=a%20b"));
    assert_eq!(echo.body, "name=Ada%20Lovelace&tags[]=x&tags[]=y");
    assert_eq!(echo.header("content-type"), Some("application/x-www-form-encoded"));
    assert_eq!(echo.header("x-api-key"), Some("secret"));
}

#[test]
fn request_header_wins_over_default() {
    let client = client();
    client.set_default_header("X-Api-Key", "default");

    let request = Request::new("echo").with_header("x-api-key", "override");
    let echo: Echo = block_on(client.fetch_as(request)).unwrap().unwrap();
    assert_eq!(echo.method, "GET");
    assert_eq!(echo.header("x-api-key"), Some("override"));
}

#[test]
fn json_body_is_sent_with_its_content_type() {
    let client = client();
    let person = Person {
        name: "Ada".to_string(),
        age: 36,
    };

    let request = Request::new("echo/people")
        .with_method(Method::PUT)
        .with_json_body(&person)
        .unwrap();
    let echo: Echo = block_on(client.fetch_as(request)).unwrap().unwrap();
    assert_eq!(echo.method, "PUT");
    assert_eq!(echo.header("content-type"), Some("application/json"));
    let sent: Person = serde_json::from_str(&echo.body).unwrap();
    assert_eq!(sent, person);
}

#[test]
fn json_document_is_parsed_by_content_type() {
    let client = client();
    let person: Option<Person> = block_on(client.fetch_as(Request::new("people/Ada"))).unwrap();
    assert_eq!(
        person,
        Some(Person {
            name: "Ada".to_string(),
            age: 36
        })
    );
}

#[test]
fn xml_document_is_parsed_by_content_type() {
    let client = client();
    let response = block_on(client.fetch_url("xml/people/Grace")).unwrap();
    assert_eq!(response.content_type(), Some("application/xml; charset=utf-8"));
    let person: Person = response.parse().expect("xml person");
    assert_eq!(person.name, "Grace");
    assert_eq!(person.age, 36);
}

#[test]
fn repeated_response_headers_are_joined() {
    let client = client();
    let response = block_on(client.fetch_url("multi")).unwrap();
    assert_eq!(response.content(), "ok");
    assert_eq!(response.header("X-Multi"), Some("one,two"));
    assert_eq!(response.header("set-cookie"), Some("a=1,b=2"));
}

#[test]
fn error_status_is_data_not_failure() {
    let client = client();
    let response = block_on(client.fetch_with("status/404", Method::DELETE)).unwrap();
    assert_eq!(response.status(), 404);
    assert!(!response.is_success());
    assert_eq!(response.parse::<Person>(), None);
}

#[test]
fn every_request_is_logged_by_the_server() {
    let client = client();
    block_on(client.fetch_url("echo/one")).unwrap();
    block_on(client.fetch_with("echo/two", Method::DELETE)).unwrap();

    let log: Vec<Echo> = block_on(client.fetch_as(Request::new("requests"))).unwrap().unwrap();
    let seen: Vec<(&str, &str)> = log.iter().map(|e| (e.method.as_str(), e.path.as_str())).collect();
    assert_eq!(seen, vec![("GET", "/echo/one"), ("DELETE", "/echo/two")]);
}
