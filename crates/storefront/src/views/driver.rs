//! Runs a [`SyncedCartView`] on the tokio runtime.

use std::future;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, instrument};

use super::SyncedCartView;
use crate::bus::{BusEvent, Subscription};

/// How a driver feeds events to its view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverOptions {
    /// Collapse cart notifications arriving within this window into one
    /// reload, run once the window has passed without a new one.
    pub debounce: Option<Duration>,
    /// Reload on this period even without events.
    pub refresh_every: Option<Duration>,
}

/// Background task that keeps a view in sync until stopped.
///
/// Dropping the driver stops the task, which unmounts the view.
#[derive(Debug)]
pub struct ViewDriver {
    view: SyncedCartView,
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ViewDriver {
    /// Subscribe, mount the view and start processing events.
    ///
    /// The view is mounted before this returns. Must be called within a
    /// tokio runtime.
    #[must_use]
    pub fn spawn(view: SyncedCartView, options: DriverOptions) -> Self {
        // Subscribe first so nothing published after mount is missed
        let subscription = view.bus().subscribe();
        view.mount();

        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(run(view.clone(), subscription, options, stop_rx));

        Self {
            view,
            stop: Some(stop_tx),
            task: Some(task),
        }
    }

    /// The view being driven.
    #[must_use]
    pub const fn view(&self) -> &SyncedCartView {
        &self.view
    }

    /// Stop the task and wait until the view is unmounted.
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for ViewDriver {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

#[instrument(skip_all, fields(widget = %view.id()))]
async fn run(
    view: SyncedCartView,
    mut subscription: Subscription,
    options: DriverOptions,
    mut stop: oneshot::Receiver<()>,
) {
    let mut pending: Option<Instant> = None;
    let mut ticker = options.refresh_every.map(|period| {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });

    loop {
        tokio::select! {
            _ = &mut stop => break,
            event = subscription.next() => {
                let Some(event) = event else { break };
                match (options.debounce, &event) {
                    (Some(window), BusEvent::CartUpdated(_)) => {
                        if view.reacts_to(&event) {
                            pending = Some(Instant::now() + window);
                        }
                    }
                    _ => {
                        view.handle(&event);
                    }
                }
            }
            () = sleep_until(pending) => {
                pending = None;
                view.refresh();
            }
            () = tick(ticker.as_mut()) => {
                view.refresh();
            }
        }
    }

    view.unmount();
    debug!("View driver stopped");
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => future::pending().await,
    }
}

async fn tick(interval: Option<&mut Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => future::pending().await,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use vitrine_core::{CartAction, ChangeNotification, WidgetId};

    use crate::views::tests::{fixture, new_item};

    fn foreign(action: CartAction) -> ChangeNotification {
        ChangeNotification::new(WidgetId::new("cartPopup"), action)
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_reloads_on_foreign_event() {
        let (repository, bus, _) = fixture();
        let view = SyncedCartView::new(WidgetId::new("headerCart"), repository.clone(), bus.clone());
        let driver = ViewDriver::spawn(view, DriverOptions::default());
        assert!(driver.view().is_mounted());

        repository.add_item(new_item("Preto", 2));
        bus.publish(foreign(CartAction::AddItem));
        tokio::time::sleep(Duration::from_millis(1)).await;

        assert_eq!(driver.view().total_quantity(), 2);
        let view = driver.view().clone();
        driver.stop().await;
        assert!(!view.is_mounted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_collapses_burst_into_one_reload() {
        let (repository, bus, _) = fixture();
        let view = SyncedCartView::new(WidgetId::new("headerBadge"), repository.clone(), bus.clone());
        let driver = ViewDriver::spawn(
            view,
            DriverOptions {
                debounce: Some(Duration::from_millis(100)),
                refresh_every: None,
            },
        );

        for _ in 0..5 {
            repository.add_item(new_item("Preto", 1));
            bus.publish(foreign(CartAction::AddItem));
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(driver.view().reload_count(), 0);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(driver.view().reload_count(), 1);
        assert_eq!(driver.view().total_quantity(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_ignores_own_events() {
        let (repository, bus, _) = fixture();
        let view = SyncedCartView::new(WidgetId::new("headerBadge"), repository, bus.clone());
        let driver = ViewDriver::spawn(
            view,
            DriverOptions {
                debounce: Some(Duration::from_millis(100)),
                refresh_every: None,
            },
        );

        bus.publish(ChangeNotification::new(
            WidgetId::new("headerBadge"),
            CartAction::ClearCart,
        ));
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(driver.view().reload_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_refresh_drops_expired_items() {
        let (repository, bus, clock) = fixture();
        repository.add_item(new_item("Preto", 3));
        let view = SyncedCartView::new(WidgetId::new("headerBadge"), repository, bus.clone());
        let driver = ViewDriver::spawn(
            view,
            DriverOptions {
                debounce: None,
                refresh_every: Some(Duration::from_secs(60)),
            },
        );
        assert_eq!(driver.view().total_quantity(), 3);

        clock.advance(ChronoDuration::minutes(16));
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(driver.view().total_quantity(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_driver_unmounts() {
        let (repository, bus, _) = fixture();
        let view = SyncedCartView::new(WidgetId::new("headerCart"), repository, bus.clone());
        let driver = ViewDriver::spawn(view.clone(), DriverOptions::default());
        drop(driver);
        tokio::time::sleep(Duration::from_millis(1)).await;

        assert!(!view.is_mounted());
        assert_eq!(bus.subscriber_count(), 0);
    }
}
