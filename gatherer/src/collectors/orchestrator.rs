use crate::{
    collectors::{
        Collector,
        GraylogCollector,
    },
    http_client::ReqwestHttpClient,
    metrics::Accumulator,
    settings::GraylogSettings,
    GatherError,
    GatherErrors,
};
use futures::future::join_all;
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
};
use tokio::sync::mpsc;

/// Gathers every configured server concurrently and reports their failures together
pub struct Orchestrator {
    collector: Arc<GraylogCollector>,
}

impl Orchestrator {
    pub fn new(collector: GraylogCollector) -> Self {
        Self {
            collector: Arc::new(collector),
        }
    }

    /// Create an orchestrator talking to the servers through a `reqwest` transport
    pub fn from_settings(settings: GraylogSettings) -> Self {
        let client = ReqwestHttpClient::new(settings.tls.clone(), settings.timeouts);
        Self::new(GraylogCollector::new(settings, Arc::new(client)))
    }

    pub fn collector(&self) -> &GraylogCollector {
        &self.collector
    }

    /// Run one gather cycle over all servers.
    ///
    /// Every server gets its own task and a failing server never stops the
    /// others. Returns once all tasks have finished; the error lists every
    /// failed server.
    pub async fn gather_all(&self, acc: Arc<dyn Accumulator>) -> Result<(), GatherErrors> {
        self.collector.client().prepare().await?;

        let servers = self.collector.settings().servers.clone();
        let started = tokio::time::Instant::now();
        info!(servers = servers.len(), "orchestrator: gather cycle starting");

        // One slot per server, so reporting an error never waits.
        let (error_tx, mut error_rx) = mpsc::channel::<GatherError>(servers.len().max(1));

        let handles = servers
            .into_iter()
            .map(|server| {
                let collector = Arc::clone(&self.collector);
                let acc = Arc::clone(&acc);
                let error_tx = error_tx.clone();
                tokio::spawn(async move {
                    if let Err(err) = collector.gather_server(acc.as_ref(), &server).await {
                        debug!(url = %server.url, error = %err, "orchestrator: server failed");
                        if let Err(err) = error_tx.try_send(err) {
                            error!("orchestrator: error channel full: {err}");
                        }
                    }
                })
            })
            .collect::<Vec<_>>();
        drop(error_tx);

        let joined = join_all(handles).await;

        let mut errors = GatherErrors::default();
        while let Some(err) = error_rx.recv().await {
            errors.push(err);
        }
        for result in joined {
            if let Err(err) = result {
                errors.push(GatherError::TaskFailed(err.to_string()));
            }
        }

        info!(
            failed = errors.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "orchestrator: gather cycle finished"
        );
        errors.into_result()
    }
}

impl Collector for Orchestrator {
    fn gather(&self, acc: Arc<dyn Accumulator>) -> Pin<Box<dyn Future<Output = Result<(), GatherErrors>> + Send + '_>> {
        Box::pin(self.gather_all(acc))
    }

    fn name(&self) -> &'static str {
        "graylog"
    }

    fn description(&self) -> &'static str {
        "Read flattened metrics from one or more GrayLog HTTP endpoints"
    }
}
