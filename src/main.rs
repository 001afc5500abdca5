use statik::config::Config;
use statik::server::Listener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::load()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .init();

    let listener = match Listener::bind(&cfg).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Startup failed: {:#}", e);
            return Err(e);
        }
    };

    tokio::select! {
        res = listener.run() => {
            if let Err(e) = &res {
                tracing::error!("Server stopped: {:#}", e);
            }
            res?;
        }

        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => tracing::info!("Shutdown signal received"),
                Err(e) => {
                    tracing::error!("Failed to listen for shutdown signal: {}", e);
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}
