//! Debounced re-rendering for interactive editing.
//!
//! Every call to [`Debouncer::submit`] aborts the pending render task and
//! schedules a new one after a fixed quiet period. Each task carries the
//! generation number of the input that created it and may publish its
//! result only while that generation is still the latest. The check and the
//! publish happen under the `watch` channel's lock, so a superseded result
//! never reaches subscribers, not even briefly.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::debug;

/// A published render result and the input generation it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Published<O> {
    pub generation: u64,
    pub value: O,
}

/// Cancel-and-restart scheduler for an async render function.
pub struct Debouncer<I, O, F> {
    delay: Duration,
    generation: Arc<AtomicU64>,
    pending: Option<JoinHandle<()>>,
    render: Arc<F>,
    tx: Arc<watch::Sender<Option<Published<O>>>>,
    _input: PhantomData<fn(I)>,
}

impl<I, O, F, Fut> Debouncer<I, O, F>
where
    I: Send + 'static,
    O: Send + Sync + 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = O> + Send + 'static,
{
    pub fn new(delay: Duration, render: F) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
            pending: None,
            render: Arc::new(render),
            tx: Arc::new(tx),
            _input: PhantomData,
        }
    }

    /// Receiver that observes the latest published result.
    pub fn subscribe(&self) -> watch::Receiver<Option<Published<O>>> {
        self.tx.subscribe()
    }

    /// Generation number of the most recent input.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Schedule a render of `input`, superseding any earlier input.
    ///
    /// Must be called from within a Tokio runtime. Returns the generation
    /// assigned to `input`.
    pub fn submit(&mut self, input: I) -> u64 {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = self.pending.take() {
            previous.abort();
        }

        let delay = self.delay;
        let generation = Arc::clone(&self.generation);
        let render = Arc::clone(&self.render);
        let tx = Arc::clone(&self.tx);

        self.pending = Some(tokio::spawn(async move {
            sleep(delay).await;
            if generation.load(Ordering::SeqCst) != ticket {
                debug!(ticket, "Superseded before render");
                return;
            }

            let value = render(input).await;
            let published = tx.send_if_modified(|slot| {
                if generation.load(Ordering::SeqCst) != ticket {
                    return false;
                }
                *slot = Some(Published {
                    generation: ticket,
                    value,
                });
                true
            });

            if published {
                debug!(ticket, "Published render");
            } else {
                debug!(ticket, "Discarded stale render");
            }
        }));
        ticket
    }
}

impl<I, O, F> Drop for Debouncer<I, O, F> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    fn upper_with_log(
        log: Arc<Mutex<Vec<String>>>,
    ) -> impl Fn(String) -> std::future::Ready<String> + Send + Sync + 'static {
        move |text: String| {
            log.lock().unwrap().push(text.clone());
            std::future::ready(text.to_uppercase())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_edits_publish_only_the_last() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut debouncer = Debouncer::new(Duration::from_millis(300), upper_with_log(log.clone()));
        let mut rx = debouncer.subscribe();

        debouncer.submit("L".to_string());
        sleep(Duration::from_millis(100)).await;
        debouncer.submit("Li".to_string());
        sleep(Duration::from_millis(100)).await;
        let last = debouncer.submit("Line one".to_string());

        rx.changed().await.unwrap();
        let published = rx.borrow_and_update().clone().unwrap();
        assert_eq!(published.generation, last);
        assert_eq!(published.value, "LINE ONE");

        // Nothing else arrives afterwards, and no intermediate render ran.
        sleep(Duration::from_secs(5)).await;
        assert!(!rx.has_changed().unwrap());
        assert_eq!(*log.lock().unwrap(), vec!["Line one".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_edits_each_publish() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut debouncer = Debouncer::new(Duration::from_millis(300), upper_with_log(log.clone()));
        let mut rx = debouncer.subscribe();

        debouncer.submit("a".to_string());
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().as_ref().unwrap().value, "A");

        debouncer.submit("b".to_string());
        rx.changed().await.unwrap();
        let published = rx.borrow_and_update().clone().unwrap();
        assert_eq!(published.value, "B");
        assert_eq!(published.generation, 2);
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_render_is_superseded() {
        let started = Arc::new(AtomicUsize::new(0));
        let counter = started.clone();
        let mut debouncer = Debouncer::new(Duration::from_millis(300), move |text: String| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move {
                // Slow render, e.g. waiting on the API.
                sleep(Duration::from_secs(2)).await;
                text
            }
        });
        let mut rx = debouncer.subscribe();

        debouncer.submit("stale".to_string());
        // Past the quiet period: the first render is now in flight.
        sleep(Duration::from_millis(500)).await;
        assert_eq!(started.load(Ordering::SeqCst), 1);

        debouncer.submit("fresh".to_string());
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().as_ref().unwrap().value, "fresh");

        sleep(Duration::from_secs(10)).await;
        assert!(!rx.has_changed().unwrap());
        assert_eq!(started.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_published_before_delay() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut debouncer = Debouncer::new(Duration::from_millis(300), upper_with_log(log.clone()));
        let rx = debouncer.subscribe();

        debouncer.submit("x".to_string());
        sleep(Duration::from_millis(299)).await;
        assert!(rx.borrow().is_none());
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(debouncer.generation(), 1);
    }
}
