use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A side effect returned from [`Model::update`](crate::Model::update),
/// [`Model::init`](crate::Model::init), or a widget's
/// [`Component::update`](crate::Component::update).
///
/// Commands describe work the runtime performs on the model's behalf: an
/// immediate follow-up message, an async task whose result comes back as a
/// message, terminal management, or quitting.
///
/// # Examples
///
/// ```rust,ignore
/// // Nothing to do:
/// let cmd = Command::none();
///
/// // Fetch a fragment and route the result back into update:
/// let cmd = Command::perform(loader.load_head(page, "head.html"), Msg::HeadLoaded);
///
/// // Leave the program:
/// let cmd = Command::quit();
/// ```
pub struct Command<Msg: Send + 'static> {
    pub(crate) inner: CommandInner<Msg>,
}

pub(crate) enum CommandInner<Msg: Send + 'static> {
    None,
    Action(Action<Msg>),
    Future(BoxFuture<'static, Msg>),
    Batch(Vec<Command<Msg>>),
    Terminal(TerminalCommand),
}

/// Synchronous actions handled by the runtime without spawning a task.
pub enum Action<Msg> {
    /// Deliver a message on the next loop iteration.
    Message(Msg),
    /// Stop the program.
    Quit,
}

/// Terminal management commands executed by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCommand {
    /// Start reporting mouse presses, drags, releases, and motion.
    EnableMouseCapture,
    /// Stop reporting mouse events.
    DisableMouseCapture,
    /// Set the terminal window title.
    SetTitle(String),
    /// Clear the entire screen.
    ClearScreen,
}

impl<Msg: Send + 'static> Command<Msg> {
    /// No-op command.
    pub fn none() -> Self {
        Command {
            inner: CommandInner::None,
        }
    }

    /// Run an async future and map its output to a message.
    pub fn perform<F, T>(future: F, map: impl FnOnce(T) -> Msg + Send + 'static) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Command {
            inner: CommandInner::Future(Box::pin(async move { map(future.await) })),
        }
    }

    /// Send a message immediately.
    pub fn message(msg: Msg) -> Self {
        Command {
            inner: CommandInner::Action(Action::Message(msg)),
        }
    }

    /// Quit the program.
    pub fn quit() -> Self {
        Command {
            inner: CommandInner::Action(Action::Quit),
        }
    }

    /// Run several commands concurrently. Empty batches collapse to
    /// [`Command::none`], single-element batches to their only command.
    pub fn batch(cmds: impl IntoIterator<Item = Command<Msg>>) -> Self {
        let mut cmds: Vec<_> = cmds.into_iter().filter(|cmd| !cmd.is_none()).collect();
        match cmds.len() {
            0 => Command::none(),
            1 => cmds.pop().unwrap_or_else(Command::none),
            _ => Command {
                inner: CommandInner::Batch(cmds),
            },
        }
    }

    /// Terminal management command.
    pub fn terminal(cmd: TerminalCommand) -> Self {
        Command {
            inner: CommandInner::Terminal(cmd),
        }
    }

    /// One-shot delay: fires once after `duration`.
    pub fn tick(duration: Duration, map: impl FnOnce(Instant) -> Msg + Send + 'static) -> Self {
        Command {
            inner: CommandInner::Future(Box::pin(async move {
                tokio::time::sleep(duration).await;
                map(Instant::now())
            })),
        }
    }

    /// Query the current terminal size, `(columns, rows)`.
    ///
    /// Widgets that react to the viewport width use this to learn their
    /// starting breakpoint regime before the first resize event arrives.
    pub fn window_size(map: impl FnOnce(u16, u16) -> Msg + Send + 'static) -> Self {
        Command {
            inner: CommandInner::Future(Box::pin(async move {
                let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
                map(cols, rows)
            })),
        }
    }

    /// Enable mouse capture so press/drag/release sequences reach the model.
    pub fn enable_mouse_capture() -> Self {
        Command::terminal(TerminalCommand::EnableMouseCapture)
    }

    /// Disable mouse capture.
    pub fn disable_mouse_capture() -> Self {
        Command::terminal(TerminalCommand::DisableMouseCapture)
    }

    /// Set the terminal window title.
    pub fn set_title(title: impl Into<String>) -> Self {
        Command::terminal(TerminalCommand::SetTitle(title.into()))
    }

    /// Transform the message type (for component composition).
    pub fn map<NewMsg: Send + 'static>(
        self,
        f: impl Fn(Msg) -> NewMsg + Send + Sync + 'static,
    ) -> Command<NewMsg> {
        self.map_with(Arc::new(f))
    }

    fn map_with<NewMsg: Send + 'static>(
        self,
        f: Arc<dyn Fn(Msg) -> NewMsg + Send + Sync>,
    ) -> Command<NewMsg> {
        match self.inner {
            CommandInner::None => Command::none(),
            CommandInner::Action(Action::Message(msg)) => Command::message(f(msg)),
            CommandInner::Action(Action::Quit) => Command::quit(),
            CommandInner::Future(fut) => Command {
                inner: CommandInner::Future(Box::pin(async move { f(fut.await) })),
            },
            CommandInner::Batch(cmds) => Command {
                inner: CommandInner::Batch(
                    cmds.into_iter().map(|cmd| cmd.map_with(f.clone())).collect(),
                ),
            },
            CommandInner::Terminal(tcmd) => Command::terminal(tcmd),
        }
    }

    // --- Inspection (mostly for tests) ---

    /// Returns `true` if this is a no-op command.
    pub fn is_none(&self) -> bool {
        matches!(self.inner, CommandInner::None)
    }

    /// Returns `true` if this command runs an async task.
    pub fn is_async(&self) -> bool {
        matches!(self.inner, CommandInner::Future(_))
    }

    /// If this command is an immediate message, return it.
    pub fn into_message(self) -> Option<Msg> {
        match self.inner {
            CommandInner::Action(Action::Message(msg)) => Some(msg),
            _ => None,
        }
    }

    /// Flatten this command into every immediate message it carries, in
    /// order. Async work and terminal commands are dropped.
    pub fn into_messages(self) -> Vec<Msg> {
        let mut out = Vec::new();
        self.collect_messages(&mut out);
        out
    }

    fn collect_messages(self, out: &mut Vec<Msg>) {
        match self.inner {
            CommandInner::Action(Action::Message(msg)) => out.push(msg),
            CommandInner::Batch(cmds) => {
                for cmd in cmds {
                    cmd.collect_messages(out);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_none() {
        let cmd: Command<()> = Command::none();
        assert!(cmd.is_none());
    }

    #[test]
    fn message_round_trips_through_into_message() {
        let cmd: Command<i32> = Command::message(7);
        assert_eq!(cmd.into_message(), Some(7));
    }

    #[test]
    fn batch_drops_noops_and_unwraps_single() {
        let cmd: Command<i32> = Command::batch(vec![Command::none(), Command::message(1)]);
        assert_eq!(cmd.into_message(), Some(1));

        let cmd: Command<i32> = Command::batch(vec![Command::none(), Command::none()]);
        assert!(cmd.is_none());
    }

    #[test]
    fn batch_keeps_order_of_messages() {
        let cmd: Command<i32> = Command::batch(vec![
            Command::message(1),
            Command::enable_mouse_capture(),
            Command::message(2),
        ]);
        assert_eq!(cmd.into_messages(), vec![1, 2]);
    }

    #[test]
    fn map_message_and_batch() {
        let cmd: Command<i32> = Command::batch(vec![Command::message(4), Command::message(5)]);
        let mapped: Command<String> = cmd.map(|n| format!("slide {n}"));
        assert_eq!(mapped.into_messages(), vec!["slide 4", "slide 5"]);
    }

    #[test]
    fn map_preserves_quit_and_terminal() {
        let quit: Command<String> = Command::<i32>::quit().map(|n| n.to_string());
        assert!(matches!(quit.inner, CommandInner::Action(Action::Quit)));

        let title: Command<String> = Command::<i32>::set_title("pricing").map(|n| n.to_string());
        match title.inner {
            CommandInner::Terminal(TerminalCommand::SetTitle(t)) => assert_eq!(t, "pricing"),
            _ => panic!("expected SetTitle"),
        }
    }

    #[test]
    fn tick_is_async() {
        let cmd: Command<()> = Command::tick(Duration::from_millis(100), |_| ());
        assert!(cmd.is_async());
        assert!(cmd.into_message().is_none());
    }
}
