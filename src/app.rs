use crate::render::render;
use eyre::{
    Context as _,
    Result,
};
use graylog_gatherer_config::Config;
use graylog_gatherer_core::{
    Collector,
    MetricRecord,
    Orchestrator,
    RecordingAccumulator,
};
use std::sync::Arc;
use tokio::time::MissedTickBehavior;

/// Runs gather cycles on the configured interval and prints their records.
pub struct App {
    config: Config,
    collector: Box<dyn Collector>,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let collector = Box::new(Orchestrator::from_settings(config.graylog_settings()));
        Ok(Self::with_collector(config, collector))
    }

    pub fn with_collector(config: Config, collector: Box<dyn Collector>) -> Self {
        Self { config, collector }
    }

    pub async fn run(self) -> Result<()> {
        info!(
            collector = self.collector.name(),
            servers = self.config.servers.len(),
            interval = ?self.config.interval,
            "{}",
            self.collector.description()
        );

        if self.config.once {
            return self.cycle().await;
        }

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                res = &mut shutdown => {
                    res.context("Failed to listen for Ctrl-C")?;
                    info!("Received Ctrl-C, stopping");
                    return Ok(());
                }
                result = async {
                    ticker.tick().await;
                    self.cycle().await
                } => {
                    if let Err(err) = result {
                        warn!("Gather cycle failed:\n{err}");
                    }
                }
            }
        }
    }

    /// Gather once, print what was gathered and report the failed servers.
    ///
    /// Records of the servers that succeeded are printed even when others failed.
    pub async fn cycle(&self) -> Result<()> {
        let acc = Arc::new(RecordingAccumulator::new());
        let result = self.collector.gather(acc.clone()).await;

        let records = acc.take();
        self.emit(&records).await?;

        result.context("Gathering metrics failed")
    }

    async fn emit(&self, records: &[MetricRecord]) -> Result<()> {
        println!("{}", render(records, self.config.output)?);

        if let Some(output_file) = &self.config.output_file {
            let json_string = serde_json::to_string_pretty(records)?;
            tokio::fs::write(output_file, json_string)
                .await
                .wrap_err_with(|| format!("Failed to write records to {}", output_file.display()))?;
            debug!(records = records.len(), path = %output_file.display(), "Records exported");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graylog_gatherer_config::Args;
    use graylog_gatherer_core::{
        Accumulator,
        Fields,
        GatherError,
        GatherErrors,
        Tags,
    };
    use std::{
        future::Future,
        pin::Pin,
    };
    use temp_dir::TempDir;

    /// Emits one record and then fails with one error.
    struct HalfFailing;

    impl Collector for HalfFailing {
        fn gather(
            &self,
            acc: Arc<dyn Accumulator>,
        ) -> Pin<Box<dyn Future<Output = Result<(), GatherErrors>> + Send + '_>> {
            Box::pin(async move {
                acc.add_fields(
                    "jvm.threads.count",
                    Fields::from([("value".to_string(), 42.0)]),
                    Tags::from([("server".to_string(), "good".to_string())]),
                );
                Err(GatherError::InvalidServerUrl {
                    url: "bad url".to_string(),
                }
                .into())
            })
        }

        fn name(&self) -> &'static str {
            "half-failing"
        }

        fn description(&self) -> &'static str {
            "test collector"
        }
    }

    fn config(dir: &TempDir) -> Config {
        let path = dir.child("config.yaml");
        std::fs::write(&path, "servers: [\"http://graylog:12900/system/metrics/multiple\"]\noutput: line\n").unwrap();
        let mut config = Config::new(&Args {
            config: Some(path),
            once: true,
            ..Args::default()
        })
        .unwrap();
        config.output_file = Some(dir.child("records.json"));
        config
    }

    #[tokio::test]
    async fn cycle_exports_records_and_reports_failures() {
        let dir = TempDir::new().unwrap();
        let app = App::with_collector(config(&dir), Box::new(HalfFailing));

        let err = app.cycle().await.unwrap_err();
        assert!(format!("{err:#}").contains("Invalid server URL \"bad url\""));

        let exported: Vec<MetricRecord> =
            serde_json::from_str(&std::fs::read_to_string(dir.child("records.json")).unwrap()).unwrap();
        assert_eq!(exported.len(), 1);
        assert_eq!(exported[0].measurement, "jvm.threads.count");
        assert_eq!(exported[0].tags["server"], "good");
    }
}
