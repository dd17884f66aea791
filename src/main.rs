//! The item tracker web service.

use item_tracker::infra::{config, logging};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    dotenvy::dotenv().ok();
    color_eyre::install()?;
    let _guard = logging::init_logging("./logs");
    let config = config::load_config()?;

    let listener = TcpListener::bind(format!(
        "{}:{}",
        config.server.http_address, config.server.http_port
    ))
    .await?;
    item_tracker::server::run(listener, config).await
}
