use crate::subscription::{SubscriptionId, SubscriptionSource};
use futures::stream::BoxStream;
use futures::StreamExt;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;

/// A repeating timer that fires at a fixed interval.
///
/// The first tick arrives one full `interval` after the timer starts, not
/// immediately. Identity is `(name, generation)`: returning the same pair from
/// consecutive `subscriptions()` calls keeps one timer running, while bumping
/// the generation restarts it from zero.
///
/// # Example
///
/// ```rust,ignore
/// use std::time::Duration;
/// use vitrine_core::{subscribe, Every};
///
/// let sub = subscribe(Every::new(Duration::from_secs(5), "auto-slide").generation(3))
///     .map(|_| Msg::Advance);
/// ```
#[derive(Debug, Clone)]
pub struct Every {
    /// The interval between ticks.
    pub interval: Duration,
    /// Name distinguishing this timer from others.
    pub name: String,
    /// Restart counter folded into the identity.
    pub generation: u64,
}

impl Every {
    /// Create a repeating timer with the given interval and name.
    pub fn new(interval: Duration, name: impl Into<String>) -> Self {
        Self {
            interval,
            name: name.into(),
            generation: 0,
        }
    }

    /// Set the generation folded into the identity.
    pub fn generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }
}

impl SubscriptionSource for Every {
    type Output = Instant;

    fn id(&self) -> SubscriptionId {
        SubscriptionId::keyed::<Self>(&self.name, self.generation)
    }

    fn stream(self) -> BoxStream<'static, Instant> {
        let period = self.interval.max(Duration::from_millis(1));
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let stream = tokio_stream::wrappers::IntervalStream::new(interval).map(|t| t.into_std());
        Box::pin(stream)
    }
}
