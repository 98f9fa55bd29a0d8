use crate::command::{Action, Command, CommandInner};
use crate::component::Component;
use crate::model::Model;
use crate::subscription::{Subscription, SubscriptionId, SubscriptionManager};
use ratatui::buffer::Buffer;
use ratatui::Terminal;
use std::time::Duration;
use tokio::sync::mpsc;

/// A headless harness that drives a [`Model`] without a terminal.
///
/// Synchronous commands ([`Command::message`]) are queued and flushed with
/// [`drain_messages`](TestProgram::drain_messages). Async commands and
/// terminal commands are counted but not executed; timers never fire on their
/// own, so tests deliver tick messages explicitly.
///
/// ```rust,ignore
/// use vitrine_core::testing::TestProgram;
///
/// let mut prog = TestProgram::<PricingPage>::new(flags);
/// prog.send(Msg::Plans(carousel::Message::Next));
/// assert_eq!(prog.model().plans.current_slide(), 1);
/// assert!(prog.render_string(80, 12).contains("Pro"));
/// ```
pub struct TestProgram<M: Model> {
    model: M,
    pending_messages: Vec<M::Message>,
    async_commands: usize,
    quit_requested: bool,
}

impl<M: Model> TestProgram<M> {
    /// Call [`Model::init`] and queue any synchronous startup messages.
    pub fn new(flags: M::Flags) -> Self {
        let (model, init_cmd) = M::init(flags);
        let mut program = Self {
            model,
            pending_messages: Vec::new(),
            async_commands: 0,
            quit_requested: false,
        };
        program.collect(init_cmd);
        program
    }

    /// Run one update with `msg`. Follow-up messages are queued, not run.
    pub fn send(&mut self, msg: M::Message) {
        let cmd = self.model.update(msg);
        self.collect(cmd);
    }

    /// Run queued messages until none remain.
    pub fn drain_messages(&mut self) {
        while !self.pending_messages.is_empty() {
            let messages: Vec<_> = self.pending_messages.drain(..).collect();
            for msg in messages {
                let cmd = self.model.update(msg);
                self.collect(cmd);
            }
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Direct access for arranging state outside the message flow.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// How many async commands (fetches, delays) updates have returned so far.
    pub fn async_commands(&self) -> usize {
        self.async_commands
    }

    /// Whether any update returned [`Command::quit`].
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Identities of the subscriptions the model currently declares.
    pub fn subscription_ids(&self) -> Vec<SubscriptionId> {
        self.model
            .subscriptions()
            .iter()
            .map(|s| s.id().clone())
            .collect()
    }

    /// Render into a [`Buffer`] of the given size.
    pub fn render(&self, width: u16, height: u16) -> Buffer {
        draw(width, height, |frame| self.model.view(frame))
    }

    /// Render and return the screen as text, rows joined by newlines.
    pub fn render_string(&self, width: u16, height: u16) -> String {
        buffer_to_string(&self.render(width, height))
    }

    fn collect(&mut self, cmd: Command<M::Message>) {
        match cmd.inner {
            CommandInner::None | CommandInner::Terminal(_) => {}
            CommandInner::Action(Action::Message(msg)) => self.pending_messages.push(msg),
            CommandInner::Action(Action::Quit) => self.quit_requested = true,
            CommandInner::Future(_) => self.async_commands += 1,
            CommandInner::Batch(cmds) => {
                for cmd in cmds {
                    self.collect(cmd);
                }
            }
        }
    }
}

/// Run a command to completion and return every message it produces, in
/// order. Async work is awaited; quit and terminal commands yield nothing.
pub async fn resolve_command<Msg: Send + 'static>(cmd: Command<Msg>) -> Vec<Msg> {
    let mut out = Vec::new();
    let mut pending = vec![cmd];
    while let Some(cmd) = pending.pop() {
        match cmd.inner {
            CommandInner::None | CommandInner::Terminal(_) | CommandInner::Action(Action::Quit) => {}
            CommandInner::Action(Action::Message(msg)) => out.push(msg),
            CommandInner::Future(fut) => out.push(fut.await),
            CommandInner::Batch(cmds) => pending.extend(cmds.into_iter().rev()),
        }
    }
    out
}

/// Subscriptions running for real, reconciled the way the runtime does it.
///
/// Must be used inside a tokio runtime. Everything still running is aborted
/// on drop.
///
/// ```rust,ignore
/// let mut live = LiveSubscriptions::new();
/// live.reconcile(carousel.subscriptions());
/// for msg in live.collect_for(Duration::from_millis(100)).await {
///     carousel.update(msg);
/// }
/// ```
pub struct LiveSubscriptions<Msg: Send + 'static> {
    manager: SubscriptionManager<Msg>,
    rx: mpsc::UnboundedReceiver<Msg>,
}

impl<Msg: Send + 'static> LiveSubscriptions<Msg> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            manager: SubscriptionManager::new(tx),
            rx,
        }
    }

    /// Start new ids, stop vanished ones, keep the rest running.
    pub fn reconcile(&mut self, wanted: Vec<Subscription<Msg>>) {
        self.manager.reconcile(wanted);
    }

    /// How many subscriptions are running.
    pub fn active(&self) -> usize {
        self.manager.active_count()
    }

    /// Messages delivered so far, without waiting.
    pub fn drain(&mut self) -> Vec<Msg> {
        let mut out = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            out.push(msg);
        }
        out
    }

    /// Messages delivered within the next `window`.
    pub async fn collect_for(&mut self, window: Duration) -> Vec<Msg> {
        let deadline = tokio::time::Instant::now() + window;
        let mut out = Vec::new();
        while let Ok(Some(msg)) = tokio::time::timeout_at(deadline, self.rx.recv()).await {
            out.push(msg);
        }
        out
    }
}

impl<Msg: Send + 'static> Default for LiveSubscriptions<Msg> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Msg: Send + 'static> Drop for LiveSubscriptions<Msg> {
    fn drop(&mut self) {
        self.manager.shutdown();
    }
}

/// Render a single [`Component`] into a buffer covering the whole area.
pub fn render_component<C: Component>(component: &C, width: u16, height: u16) -> Buffer {
    draw(width, height, |frame| component.view(frame, frame.area()))
}

/// Flatten a buffer into text, rows joined by newlines.
pub fn buffer_to_string(buf: &Buffer) -> String {
    let area = buf.area;
    let mut out = String::new();
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            out.push_str(buf[(x, y)].symbol());
        }
        if y + 1 < area.bottom() {
            out.push('\n');
        }
    }
    out
}

fn draw(width: u16, height: u16, f: impl FnOnce(&mut ratatui::Frame)) -> Buffer {
    let backend = ratatui::backend::TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).expect("test backend never fails");
    let mut f = Some(f);
    terminal
        .draw(|frame| {
            if let Some(f) = f.take() {
                f(frame);
            }
        })
        .expect("test backend never fails");
    terminal.backend().buffer().clone()
}
