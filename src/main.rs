use clap::Parser;
use dbarena::api::BenchApi;
use dbarena::conf::Config;
use dbarena::core::{CliArgs, setup_logging};
use dbarena::service::BenchService;
use log::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging();
    let args = CliArgs::parse();
    info!(args = args; "dbarena started.");

    let config = Config::load(args.config.as_deref())?;
    let addr = config.server.addr();
    let service = BenchService::new(config);
    info!("Benchmark backends: {:?}", service.backend_ids());

    BenchApi::new(service).serve(&addr).await?;
    Ok(())
}
