use crate::command::Command;
use crate::subscription::Subscription;
use ratatui::Frame;

/// The top-level application trait, following the [Elm Architecture].
///
/// The runtime drives an **init → update → view** cycle:
///
/// 1. [`init`](Model::init) builds the initial state and may return a
///    [`Command`] (for example, fetching page fragments).
/// 2. [`view`](Model::view) draws the state to a ratatui [`Frame`].
/// 3. Events arrive as messages through [`Subscription`]s.
/// 4. [`update`](Model::update) handles one message and returns follow-up
///    work.
///
/// # Example
///
/// ```rust,ignore
/// use vitrine_core::{Command, Model};
/// use ratatui::Frame;
/// use ratatui::widgets::Paragraph;
///
/// struct Slides { current: usize, total: usize }
///
/// enum Msg { Next }
///
/// impl Model for Slides {
///     type Message = Msg;
///     type Flags = usize;
///
///     fn init(total: usize) -> (Self, Command<Msg>) {
///         (Slides { current: 0, total }, Command::none())
///     }
///
///     fn update(&mut self, msg: Msg) -> Command<Msg> {
///         match msg {
///             Msg::Next => self.current = (self.current + 1) % self.total,
///         }
///         Command::none()
///     }
///
///     fn view(&self, frame: &mut Frame) {
///         let text = format!("{}/{}", self.current + 1, self.total);
///         frame.render_widget(Paragraph::new(text), frame.area());
///     }
/// }
/// ```
///
/// [Elm Architecture]: https://guide.elm-lang.org/architecture/
pub trait Model: Sized + Send + 'static {
    /// Every event that can change the application state.
    type Message: Send + 'static;

    /// Startup data handed to [`Model::init`]. Use `()` when none is needed.
    type Flags: Send + 'static;

    /// Create the initial state and an optional startup command.
    fn init(flags: Self::Flags) -> (Self, Command<Self::Message>);

    /// Handle one message. The runtime re-renders and reconciles
    /// subscriptions after every call.
    fn update(&mut self, msg: Self::Message) -> Command<Self::Message>;

    /// Draw the current state. Must be a pure read of `self`.
    fn view(&self, frame: &mut Frame);

    /// Subscriptions that should be active for the current state.
    ///
    /// The runtime diffs the returned set against the running one by
    /// [`SubscriptionId`](crate::SubscriptionId): new ids start, missing ids
    /// are aborted, unchanged ids keep running.
    fn subscriptions(&self) -> Vec<Subscription<Self::Message>> {
        vec![]
    }
}
