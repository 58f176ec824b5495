//! Runs the echo server on its own, e.g. to poke at it with curl.

use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let host = std::env::var("MOCK_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("MOCK_PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(8080);
    let listener = TcpListener::bind((host.as_str(), port)).await?;
    println!("echo server listening on {}", listener.local_addr()?);
    mock_server::run(listener).await
}
