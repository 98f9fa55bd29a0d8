use crate::command::Command;
use crate::subscription::Subscription;
use ratatui::{layout::Rect, Frame};

/// A reusable widget that owns its state and renders into a given [`Rect`].
///
/// A component looks like a [`Model`](crate::Model) except that
/// [`view`](Component::view) receives the area to draw into, so a parent
/// decides where each widget lives in its layout.
///
/// # Embedding
///
/// Wrap the widget's message type in a variant of the parent message and lift
/// the returned command with [`Command::map`]:
///
/// ```rust,ignore
/// use vitrine_core::{Command, Component, Model};
/// use vitrine_widgets::carousel::{self, Carousel};
///
/// struct Pricing { plans: Carousel }
///
/// enum Msg { Plans(carousel::Message) }
///
/// impl Model for Pricing {
///     // ...
///     fn update(&mut self, msg: Msg) -> Command<Msg> {
///         match msg {
///             Msg::Plans(m) => self.plans.update(m).map(Msg::Plans),
///         }
///     }
///
///     fn subscriptions(&self) -> Vec<Subscription<Msg>> {
///         self.plans
///             .subscriptions()
///             .into_iter()
///             .map(|s| s.map(Msg::Plans))
///             .collect()
///     }
/// }
/// ```
pub trait Component: Send + 'static {
    /// The widget's message type.
    type Message: Send + 'static;

    /// Process a message and return follow-up work.
    ///
    /// The returned command uses the widget's own message type; the parent
    /// lifts it with [`.map()`](Command::map).
    fn update(&mut self, msg: Self::Message) -> Command<Self::Message>;

    /// Render into `area`. Implementations must not draw outside it.
    fn view(&self, frame: &mut Frame, area: Rect);

    /// Long-lived event sources this widget needs right now.
    ///
    /// Parents collect these into their own
    /// [`Model::subscriptions`](crate::Model::subscriptions). Returning a
    /// different set after an update starts and stops sources accordingly.
    fn subscriptions(&self) -> Vec<Subscription<Self::Message>> {
        vec![]
    }

    /// Whether this widget currently takes keyboard input.
    fn focused(&self) -> bool {
        false
    }
}
