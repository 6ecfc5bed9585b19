/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use log::info;
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::aggregate::{CycleAccumulator, ErrorAggregator};
use super::dispatch;
use crate::config::service::ServiceConfig;
use crate::processor::ArcProcessor;
use crate::resolve::ResolvedAddresses;
use crate::stat::ScrapeMetrics;
use crate::store::{ArcErrorsRepository, ErrorsRepository};

/// The per-service orchestrator. All scrape state is owned by this one task;
/// resolution events and cycle runs are serialized through its event loop, so
/// no state here needs locking.
pub(super) struct ScrapeTask {
    config: Arc<ServiceConfig>,
    addr_receiver: mpsc::UnboundedReceiver<ResolvedAddresses>,
    resolver_alive: bool,
    resolved_addresses: ResolvedAddresses,
    processor: ArcProcessor,
    repository: ArcErrorsRepository,
    aggregator: ErrorAggregator,
    metrics: Option<ScrapeMetrics>,
}

impl ScrapeTask {
    pub(super) fn new(
        config: Arc<ServiceConfig>,
        addr_receiver: mpsc::UnboundedReceiver<ResolvedAddresses>,
        processor: ArcProcessor,
        repository: ArcErrorsRepository,
        metrics: Option<ScrapeMetrics>,
    ) -> Self {
        let aggregator = ErrorAggregator::new(config.max_latest_errors);
        ScrapeTask {
            config,
            addr_receiver,
            resolver_alive: true,
            resolved_addresses: ResolvedAddresses::empty(),
            processor,
            repository,
            aggregator,
            metrics,
        }
    }

    pub(super) async fn into_running(mut self) {
        // the timer is stopped while a cycle runs and re-armed afterwards,
        // so the refresh interval is measured between cycles
        let sleep = tokio::time::sleep(self.config.refresh_interval);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                biased;

                r = self.addr_receiver.recv(), if self.resolver_alive => {
                    match r {
                        Some(resolved) => {
                            info!(
                                "{}: received new resolution result, {} addresses",
                                self.config.name(),
                                resolved.addresses.len()
                            );
                            self.resolved_addresses = resolved;
                        }
                        None => self.resolver_alive = false,
                    }
                }
                () = &mut sleep => {
                    self.run_cycle().await;
                    sleep.as_mut().reset(Instant::now() + self.config.refresh_interval);
                }
            }
        }
    }

    async fn run_cycle(&mut self) {
        let service = self.config.name().clone();
        let addresses = self.resolved_addresses.addresses.clone();

        let mut accumulator = CycleAccumulator::default();
        let mut rsp_receiver =
            dispatch::scrape_instances(&addresses, &self.config.endpoint, &self.processor);
        while let Some(payload) = rsp_receiver.recv().await {
            let observations = self.aggregator.combine(payload, &mut accumulator);
            for observation in &observations {
                if let Some(metrics) = &mut self.metrics {
                    metrics.add_error_occurrences(observation);
                }
                // a recurrence reopens a previously resolved error
                self.repository
                    .remove_resolved(service.as_str(), &observation.aggregation_key);
            }
        }

        crate::store::store(
            service.as_str(),
            self.repository.as_ref(),
            self.aggregator.iter(),
        );

        let num_instances = addresses.len();
        let num_errors = self.aggregator.len();
        if let Some(metrics) = &mut self.metrics {
            metrics.set_instances_scraped(num_instances);
            metrics.add_errors_scraped(num_errors);
            metrics.flush();
        }
        info!("{service}: scraped {num_errors} errors from {num_instances} instances");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::{FetchRequest, Processor};
    use crate::store::MemoryErrorsRepository;
    use crate::types::{ErrorAggregate, ResponsePayload};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;
    use yaml_rust::{Yaml, YamlLoader};

    fn service_config(refresh_interval: &str) -> Arc<ServiceConfig> {
        let conf = format!(
            r#"
                name: web
                refresh_interval: {refresh_interval}
                resolver:
                  type: static
                  addresses: []
            "#
        );
        let doc = YamlLoader::load_from_str(&conf).unwrap().pop().unwrap();
        let Yaml::Hash(map) = doc else { panic!("not a map") };
        Arc::new(ServiceConfig::parse(&map).unwrap())
    }

    struct ScriptedProcessor {
        // target -> queue of per-cycle reports
        reports: Mutex<HashMap<String, Vec<Vec<ErrorAggregate>>>>,
    }

    impl ScriptedProcessor {
        fn new() -> Self {
            ScriptedProcessor {
                reports: Mutex::new(HashMap::new()),
            }
        }

        fn push_report(&self, target: &str, report: Vec<ErrorAggregate>) {
            let mut ht = self.reports.lock().unwrap();
            ht.entry(target.to_string()).or_default().push(report);
        }
    }

    impl Processor for ScriptedProcessor {
        fn enqueue(&self, request: FetchRequest) {
            let report = {
                let mut ht = self.reports.lock().unwrap();
                match ht.get_mut(&request.target) {
                    Some(queue) if !queue.is_empty() => Some(queue.remove(0)),
                    _ => None,
                }
            };
            tokio::spawn(async move {
                if let Some(error_aggregate) = report {
                    let _ = request
                        .rsp_sender
                        .send(ResponsePayload {
                            target: request.target,
                            error_aggregate,
                        })
                        .await;
                }
            });
        }
    }

    fn item(key: &str, total_count: u64) -> ErrorAggregate {
        ErrorAggregate {
            aggregation_key: key.to_string(),
            total_count,
            severity: "error".to_string(),
            latest_errors: Vec::new(),
        }
    }

    async fn advance(duration: Duration) {
        // let the task and its fetch workers run between time steps
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        tokio::time::sleep(duration).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cycles_follow_the_timer() {
        let config = service_config("60s");
        let processor = Arc::new(ScriptedProcessor::new());
        processor.push_report("http://10.0.0.1:3000/errors", vec![item("k1", 5)]);
        processor.push_report("http://10.0.0.1:3000/errors", vec![item("k1", 8)]);

        let repository: ArcErrorsRepository = Arc::new(MemoryErrorsRepository::default());
        let (addr_sender, addr_receiver) = mpsc::unbounded_channel();

        let task = ScrapeTask::new(
            config,
            addr_receiver,
            processor.clone() as ArcProcessor,
            repository.clone(),
            None,
        );
        tokio::spawn(task.into_running());

        addr_sender
            .send(ResolvedAddresses {
                addresses: vec!["10.0.0.1:3000".to_string()],
            })
            .unwrap();

        // nothing is stored before the first timer fire
        advance(Duration::from_secs(30)).await;
        assert!(repository.get_errors("web").is_empty());

        // first cycle: baseline 5
        advance(Duration::from_secs(31)).await;
        let errors = repository.get_errors("web");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].aggregation_key, "k1");
        assert_eq!(errors[0].total_count, 5);

        // second cycle: the instance moved to 8, the aggregate follows
        advance(Duration::from_secs(61)).await;
        let errors = repository.get_errors("web");
        assert_eq!(errors[0].total_count, 8);

        // third cycle: the target stopped responding, the view is unchanged
        advance(Duration::from_secs(61)).await;
        let errors = repository.get_errors("web");
        assert_eq!(errors[0].total_count, 8);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_cycle_rearms_the_timer() {
        let config = service_config("60s");
        let processor = Arc::new(ScriptedProcessor::new());
        processor.push_report("http://10.0.0.1:3000/errors", vec![item("k1", 2)]);

        let repository: ArcErrorsRepository = Arc::new(MemoryErrorsRepository::default());
        let (addr_sender, addr_receiver) = mpsc::unbounded_channel();

        let task = ScrapeTask::new(
            config,
            addr_receiver,
            processor.clone() as ArcProcessor,
            repository.clone(),
            None,
        );
        tokio::spawn(task.into_running());

        // first cycle runs with no addresses at all
        advance(Duration::from_secs(61)).await;
        assert!(repository.get_errors("web").is_empty());

        // a resolution event between cycles takes effect on the next one
        addr_sender
            .send(ResolvedAddresses {
                addresses: vec!["10.0.0.1:3000".to_string()],
            })
            .unwrap();
        advance(Duration::from_secs(61)).await;
        let errors = repository.get_errors("web");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].total_count, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn resolved_errors_reopen_on_recurrence() {
        let config = service_config("60s");
        let processor = Arc::new(ScriptedProcessor::new());
        processor.push_report("http://10.0.0.1:3000/errors", vec![item("k1", 1)]);
        processor.push_report("http://10.0.0.1:3000/errors", vec![item("k1", 2)]);

        let repository: ArcErrorsRepository = Arc::new(MemoryErrorsRepository::default());
        let (addr_sender, addr_receiver) = mpsc::unbounded_channel();

        let task = ScrapeTask::new(
            config,
            addr_receiver,
            processor.clone() as ArcProcessor,
            repository.clone(),
            None,
        );
        tokio::spawn(task.into_running());

        addr_sender
            .send(ResolvedAddresses {
                addresses: vec!["10.0.0.1:3000".to_string()],
            })
            .unwrap();

        advance(Duration::from_secs(61)).await;
        assert_eq!(repository.get_errors("web").len(), 1);

        // the operator dismisses the error between cycles
        repository.mark_resolved("web", "k1");

        // it recurs, so the next cycle reopens and stores it again
        advance(Duration::from_secs(61)).await;
        assert!(!repository.search_resolved("web", "k1"));
        let errors = repository.get_errors("web");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].total_count, 2);
    }
}
