use edge_gateway::{logging::init_logging, GatewayConfig, GatewayError};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), GatewayError> {
    let config = GatewayConfig::load()?;
    init_logging(&config);
    let listener = TcpListener::bind(config.listen_addr).await?;
    edge_gateway::run(listener, &config).await
}
