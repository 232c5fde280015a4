use tenpercent::prelude::*;
use tenpercent::TenPercentServerBuilder;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), TenPercentError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tenpercent=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let server = TenPercentServerBuilder::from_config(ServerConfig::from_env())
        .build()
        .await?;
    info!(addr = %server.local_addr()?, "TenPercent server running");

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
            Ok(())
        }
    }
}
