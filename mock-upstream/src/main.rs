use tokio::net::TcpListener;

/// Stand-in backend for local runs: `MOCK_UPSTREAM_ADDR=127.0.0.1:8000`.
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let addr = std::env::var("MOCK_UPSTREAM_ADDR").unwrap_or_else(|_| "127.0.0.1:8000".to_string());
    let listener = TcpListener::bind(&addr).await?;
    println!("mock upstream serving /api/v1 on {}", listener.local_addr()?);
    mock_upstream::run(listener).await
}
