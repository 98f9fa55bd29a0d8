//! Core runtime for **vitrine** terminal widgets.
//!
//! Programs follow the [Elm Architecture]: state changes only in
//! `update`, drawing happens in `view`, and side effects are described as
//! [`Command`]s and [`Subscription`]s that the runtime executes.
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Model`] | Top-level application (init / update / view) |
//! | [`Component`] | Reusable widget that renders into a [`ratatui::layout::Rect`] |
//! | [`Command`] | One-off side effect (message, async task, terminal control, quit) |
//! | [`Subscription`] | Long-lived source (terminal events, repeating timers) |
//! | [`Page`] | Shared element tree widgets attach to |
//! | [`Breakpoint`] | Width threshold between mobile and desktop regimes |
//! | [`Program`] | Runs a [`Model`] against a real terminal |
//! | [`TestProgram`](testing::TestProgram) | Headless harness for tests |
//!
//! [Elm Architecture]: https://guide.elm-lang.org/architecture/

pub mod breakpoint;
pub mod command;
pub mod component;
pub mod event;
pub mod logging;
mod markup;
pub mod model;
pub mod page;
pub mod runtime;
pub mod subscription;
pub mod subscriptions;
pub mod testing;

pub use breakpoint::{Breakpoint, ViewportClass};
pub use command::{Command, TerminalCommand};
pub use component::Component;
pub use event::TerminalEvent;
pub use model::Model;
pub use page::{Element, NodeKey, Page, PageError};
pub use runtime::{OutputTarget, Program, ProgramError, ProgramHandle, ProgramOptions};
pub use subscription::{subscribe, Subscription, SubscriptionId, SubscriptionSource};
pub use subscriptions::{terminal_events, Every};

/// Run a program with default options.
pub async fn run<M: Model>(flags: M::Flags) -> Result<M, ProgramError> {
    Program::<M>::new(flags)?.run().await
}

/// Run with custom options.
pub async fn run_with<M: Model>(
    flags: M::Flags,
    options: ProgramOptions,
) -> Result<M, ProgramError> {
    Program::<M>::with_options(flags, options)?.run().await
}
