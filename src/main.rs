use clap::Parser;
use color_eyre::Result;
use graylog_gatherer::{
    init_errors,
    init_logging,
    App,
    Args,
    Config,
    SAMPLE_CONFIG,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_errors()?;
    let args = Args::parse();

    if args.sample_config {
        print!("{SAMPLE_CONFIG}");
        return Ok(());
    }

    let config = Config::new(&args)?;
    init_logging(config.verbose)?;
    App::new(config)?.run().await
}
