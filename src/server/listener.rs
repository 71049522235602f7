use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::transport::connection::{Connection, Handler};

pub async fn run(cfg: &Config, handler: Handler) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("Listening on {}", cfg.listen_addr);

    let ctx = cfg.server_context();
    loop {
        let (socket, peer) = listener.accept().await?;
        info!("Accepted connection from {}", peer);

        let ctx = ctx.clone();
        let handler = handler.clone();
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, ctx, handler);
            if let Err(e) = conn.run().await {
                tracing::error!("Connection error from {}: {}", peer, e);
            }
        });
    }
}
