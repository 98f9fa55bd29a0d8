use futures::stream::BoxStream;
use futures::StreamExt;
use std::any::TypeId;
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

/// A long-lived event source managed by the runtime.
///
/// Subscriptions are declared by [`Model::subscriptions`](crate::Model::subscriptions)
/// and reconciled after every update: a subscription whose
/// [`SubscriptionId`] was not running is started, one that disappeared is
/// aborted, and one that is still present keeps running untouched.
///
/// Because identity decides everything, a widget restarts a timer by changing
/// the id it returns (see [`SubscriptionId::keyed`]) and stops it by not
/// returning it at all. Two declarations with the same id never produce two
/// running sources.
pub struct Subscription<Msg: Send + 'static> {
    pub(crate) id: SubscriptionId,
    pub(crate) spawn: Box<dyn FnOnce(mpsc::UnboundedSender<Msg>) -> AbortHandle + Send>,
}

/// Identity used to diff subscriptions between update cycles.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId {
    type_id: TypeId,
    discriminant: u64,
}

impl SubscriptionId {
    /// Identity from a type and a numeric discriminant.
    pub fn new<T: 'static>(discriminant: u64) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            discriminant,
        }
    }

    /// Identity from a type alone, for singleton sources.
    pub fn of<T: 'static>() -> Self {
        Self::new::<T>(0)
    }

    /// Identity from a type and a string name.
    pub fn with_str<T: 'static>(name: &str) -> Self {
        Self::keyed::<T>(name, 0)
    }

    /// Identity from a type, a name, and a generation number.
    ///
    /// Bumping `generation` yields a new identity, which makes the runtime
    /// abort the running source and start a fresh one on the next reconcile.
    pub fn keyed<T: 'static>(name: &str, generation: u64) -> Self {
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        generation.hash(&mut hasher);
        Self::new::<T>(hasher.finish())
    }
}

/// A type that produces a stream of values for a subscription.
pub trait SubscriptionSource: Send + 'static {
    /// The values this source emits.
    type Output: Send + 'static;

    /// Identity of this source instance.
    fn id(&self) -> SubscriptionId;

    /// Build the stream. Called once, when the subscription first starts.
    fn stream(self) -> BoxStream<'static, Self::Output>;
}

/// Turn a [`SubscriptionSource`] into a [`Subscription`].
pub fn subscribe<S>(source: S) -> Subscription<S::Output>
where
    S: SubscriptionSource,
{
    let id = source.id();
    Subscription::from_stream(id, source.stream())
}

impl<Msg: Send + 'static> Subscription<Msg> {
    /// Create from a raw stream and id. The stream is driven by a tokio task
    /// that forwards each item until the runtime hangs up or aborts it.
    pub fn from_stream(id: SubscriptionId, stream: BoxStream<'static, Msg>) -> Self {
        Subscription {
            id,
            spawn: Box::new(move |tx| {
                let handle = tokio::spawn(async move {
                    let mut stream = stream;
                    while let Some(msg) = stream.next().await {
                        if tx.send(msg).is_err() {
                            break;
                        }
                    }
                });
                handle.abort_handle()
            }),
        }
    }

    /// The identity this subscription is reconciled by.
    pub fn id(&self) -> &SubscriptionId {
        &self.id
    }

    /// Transform the message type (for component composition).
    pub fn map<NewMsg: Send + 'static>(
        self,
        f: impl Fn(Msg) -> NewMsg + Send + Sync + 'static,
    ) -> Subscription<NewMsg> {
        let f = Arc::new(f);
        Subscription {
            id: self.id,
            spawn: Box::new(move |new_tx: mpsc::UnboundedSender<NewMsg>| {
                let (inner_tx, mut inner_rx) = mpsc::unbounded_channel::<Msg>();
                let abort = (self.spawn)(inner_tx);

                // Ends on its own once the source task is aborted and
                // `inner_tx` is dropped.
                tokio::spawn(async move {
                    while let Some(msg) = inner_rx.recv().await {
                        if new_tx.send(f(msg)).is_err() {
                            break;
                        }
                    }
                });

                abort
            }),
        }
    }
}

/// Running subscriptions, keyed by identity.
pub(crate) struct SubscriptionManager<Msg: Send + 'static> {
    active: HashMap<SubscriptionId, AbortHandle>,
    msg_tx: mpsc::UnboundedSender<Msg>,
}

impl<Msg: Send + 'static> SubscriptionManager<Msg> {
    pub fn new(msg_tx: mpsc::UnboundedSender<Msg>) -> Self {
        Self {
            active: HashMap::new(),
            msg_tx,
        }
    }

    /// Start new ids, abort vanished ids, keep the rest.
    pub fn reconcile(&mut self, wanted: Vec<Subscription<Msg>>) {
        let mut wanted: HashMap<SubscriptionId, Subscription<Msg>> = wanted
            .into_iter()
            .map(|sub| (sub.id.clone(), sub))
            .collect();

        self.active.retain(|id, handle| {
            if wanted.contains_key(id) {
                true
            } else {
                handle.abort();
                false
            }
        });

        for (id, sub) in wanted.drain() {
            if !self.active.contains_key(&id) {
                tracing::trace!(?id, "starting subscription");
                let handle = (sub.spawn)(self.msg_tx.clone());
                self.active.insert(id, handle);
            }
        }
    }

    pub fn shutdown(&mut self) {
        for (_, handle) in self.active.drain() {
            handle.abort();
        }
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    fn pending(id: SubscriptionId) -> Subscription<i32> {
        Subscription::from_stream(id, Box::pin(futures::stream::pending()))
    }

    #[test]
    fn keyed_ids_differ_by_generation() {
        let a = SubscriptionId::keyed::<Marker>("carousel-1", 0);
        let b = SubscriptionId::keyed::<Marker>("carousel-1", 1);
        let c = SubscriptionId::keyed::<Marker>("carousel-1", 0);
        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn ids_differ_by_type() {
        assert_ne!(SubscriptionId::of::<Marker>(), SubscriptionId::of::<String>());
    }

    #[tokio::test]
    async fn duplicate_ids_start_once() {
        let (tx, _rx) = mpsc::unbounded_channel::<i32>();
        let mut manager = SubscriptionManager::new(tx);
        let id = SubscriptionId::with_str::<Marker>("auto-slide");

        manager.reconcile(vec![pending(id.clone()), pending(id)]);
        assert_eq!(manager.active_count(), 1);
    }

    #[tokio::test]
    async fn changed_generation_replaces_source() {
        let (tx, _rx) = mpsc::unbounded_channel::<i32>();
        let mut manager = SubscriptionManager::new(tx);

        manager.reconcile(vec![pending(SubscriptionId::keyed::<Marker>("t", 0))]);
        manager.reconcile(vec![pending(SubscriptionId::keyed::<Marker>("t", 1))]);
        assert_eq!(manager.active_count(), 1);
    }

    #[tokio::test]
    async fn removed_and_shutdown() {
        let (tx, _rx) = mpsc::unbounded_channel::<i32>();
        let mut manager = SubscriptionManager::new(tx);

        manager.reconcile(vec![
            pending(SubscriptionId::new::<Marker>(1)),
            pending(SubscriptionId::new::<Marker>(2)),
        ]);
        assert_eq!(manager.active_count(), 2);

        manager.reconcile(vec![pending(SubscriptionId::new::<Marker>(2))]);
        assert_eq!(manager.active_count(), 1);

        manager.shutdown();
        assert_eq!(manager.active_count(), 0);
    }

    #[tokio::test]
    async fn mapped_subscription_forwards() {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let mut manager = SubscriptionManager::new(tx);
        let sub = Subscription::from_stream(
            SubscriptionId::of::<Marker>(),
            Box::pin(futures::stream::iter(vec![1, 2])),
        )
        .map(|n: i32| format!("tick {n}"));

        manager.reconcile(vec![sub]);
        assert_eq!(rx.recv().await.as_deref(), Some("tick 1"));
        assert_eq!(rx.recv().await.as_deref(), Some("tick 2"));
    }
}
