use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use crossbeam_channel::RecvTimeoutError;

use crate::matching::domain::classification::ClassificationResult;
use crate::pipeline::classification_scheduler::{
    ClassificationScheduler, ClassifyFn, Completion,
};
use crate::pipeline::errors::ItemError;
use crate::shared::capability::CapabilityError;

type WorkerResult = (usize, Result<ClassificationResult, CapabilityError>);

/// Sliding-window scheduler: at most `concurrency` classifications are in
/// flight, and a new one starts as soon as any slot frees up.
///
/// Layout: `coordinator → N worker threads → results channel → coordinator`
///
/// Each in-flight item runs on its own thread. With an `item_timeout`, an
/// item that has not answered by its deadline is reported as
/// [`ItemError::Timeout`] and its slot is handed to the next item; the
/// stuck thread is detached and any late answer is discarded.
pub struct ThreadedWindowScheduler {
    concurrency: NonZeroUsize,
    item_timeout: Option<Duration>,
}

struct InFlight {
    item: String,
    deadline: Option<Instant>,
}

impl ThreadedWindowScheduler {
    pub fn new(concurrency: NonZeroUsize, item_timeout: Option<Duration>) -> Self {
        Self {
            concurrency,
            item_timeout,
        }
    }
}

impl ClassificationScheduler for ThreadedWindowScheduler {
    fn run(
        &self,
        items: Vec<String>,
        classify: ClassifyFn,
        on_complete: &mut dyn FnMut(Completion),
    ) {
        let limit = self.concurrency.get();
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<WorkerResult>();
        let mut pending = items.into_iter().enumerate();
        let mut in_flight: HashMap<usize, InFlight> = HashMap::with_capacity(limit);

        loop {
            while in_flight.len() < limit {
                let Some((index, item)) = pending.next() else {
                    break;
                };
                match spawn_worker(index, &item, &classify, &result_tx) {
                    Ok(()) => {
                        let deadline = self.item_timeout.map(|t| Instant::now() + t);
                        in_flight.insert(index, InFlight { item, deadline });
                    }
                    Err(e) => on_complete(Completion {
                        index,
                        outcome: Err(ItemError::Classification {
                            item: item.clone(),
                            source: format!("failed to start worker: {e}").into(),
                        }),
                        item,
                    }),
                }
            }

            if in_flight.is_empty() {
                break;
            }

            let next_deadline = in_flight.values().filter_map(|f| f.deadline).min();
            let received = match next_deadline {
                Some(deadline) => result_rx.recv_deadline(deadline),
                None => result_rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            match received {
                Ok((index, result)) => {
                    // A timed-out item may still answer; its slot is gone.
                    let Some(task) = in_flight.remove(&index) else {
                        log::debug!("Discarding late result for item #{index}");
                        continue;
                    };
                    let outcome = result.map_err(|source| ItemError::Classification {
                        item: task.item.clone(),
                        source,
                    });
                    on_complete(Completion {
                        index,
                        item: task.item,
                        outcome,
                    });
                }
                Err(RecvTimeoutError::Timeout) => {
                    let now = Instant::now();
                    let mut expired: Vec<usize> = in_flight
                        .iter()
                        .filter(|(_, f)| f.deadline.is_some_and(|d| d <= now))
                        .map(|(index, _)| *index)
                        .collect();
                    expired.sort_unstable();
                    for index in expired {
                        let Some(task) = in_flight.remove(&index) else {
                            continue;
                        };
                        let after = self.item_timeout.unwrap_or_default();
                        on_complete(Completion {
                            index,
                            outcome: Err(ItemError::Timeout {
                                item: task.item.clone(),
                                after,
                            }),
                            item: task.item,
                        });
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    // Unreachable while `result_tx` is alive; bail out rather than spin.
                    log::error!("Classification result channel closed unexpectedly");
                    break;
                }
            }
        }
    }
}

fn spawn_worker(
    index: usize,
    item: &str,
    classify: &ClassifyFn,
    result_tx: &crossbeam_channel::Sender<WorkerResult>,
) -> std::io::Result<()> {
    let classify = classify.clone();
    let result_tx = result_tx.clone();
    let item = item.to_string();
    std::thread::Builder::new()
        .name(format!("classify-{index}"))
        .spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| classify(&item)))
                .unwrap_or_else(|_| Err("classification panicked".into()));
            // The coordinator may already have given up on this item.
            let _ = result_tx.send((index, result));
        })
        .map(|_| ())
}
