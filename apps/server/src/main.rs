use anyhow::Context;
use platter::domain::config::ApiConfig;
use platter::kernel::config::load_config;
use platter_logger::Logger;
use platter_server::Server;

#[platter_runtime::main(high_performance)]
async fn main() -> anyhow::Result<()> {
    let cfg: ApiConfig = load_config(Some("server")).context("Critical: Configuration is malformed")?;

    let logging = &cfg.logging;
    let logger = Logger::builder()
        .name(env!("CARGO_PKG_NAME"))
        .level(Logger::parse_level(&logging.level)?)
        .env_filter(logging.filter.clone().unwrap_or_default())
        .console_json(logging.json);
    let _log = match &logging.dir {
        Some(dir) => logger.path(dir).init()?,
        None => logger.init()?,
    };

    Server::builder().config(cfg).build().await?.run().await
}
