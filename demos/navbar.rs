//! # Navbar Example
//!
//! A dropdown navbar whose markup arrives after startup:
//! - The navbar markup is a fragment loaded from disk a moment after start;
//!   the navbar stays pending and retries [`navbar::Message::Ready`] until
//!   the markup shows up
//! - Narrow terminals (100 columns or fewer) use the mobile regime: a
//!   "Menu" switch and click-to-open groups, one at a time
//! - Wider terminals show dropdowns on hover; resizing closes open groups
//!
//! Run with: `cargo run --example navbar`

use std::time::Duration;
use vitrine::crossterm::event::{KeyCode, KeyModifiers};
use vitrine::ratatui::layout::{Constraint, Layout};
use vitrine::ratatui::style::{Color, Style};
use vitrine::ratatui::text::{Line, Span};
use vitrine::ratatui::widgets::Paragraph;
use vitrine::ratatui::Frame;
use vitrine::widgets::navbar::{self, Navbar, NavbarOptions};
use vitrine::widgets::FragmentLoader;
use vitrine::{
    terminal_events, Breakpoint, Command, Component, Element, Model, Page, ProgramOptions,
    Subscription, TerminalEvent,
};

struct Site {
    page: Page,
    nav: Navbar,
    location: String,
}

#[derive(Debug)]
enum Msg {
    Nav(navbar::Message),
    LoadMarkup,
    MarkupLoaded(Result<(), String>),
    Quit,
}

impl Model for Site {
    type Message = Msg;
    type Flags = Page;

    fn init(page: Page) -> (Self, Command<Msg>) {
        let options = NavbarOptions::default().with_breakpoint(Breakpoint::COLUMNS);
        let mut nav = Navbar::new(&page, options);
        nav.focus();
        (
            Site {
                page,
                nav,
                location: "/".into(),
            },
            Command::batch([
                Command::message(Msg::Nav(navbar::Message::Ready)),
                Command::tick(Duration::from_millis(350), |_| Msg::LoadMarkup),
                Command::window_size(|cols, _| Msg::Nav(navbar::Message::Resize(cols))),
            ]),
        )
    }

    fn update(&mut self, msg: Msg) -> Command<Msg> {
        match msg {
            Msg::Nav(navbar::Message::Navigate(href)) => {
                self.location = href;
                Command::none()
            }
            Msg::Nav(m) => self.nav.update(m).map(Msg::Nav),
            Msg::LoadMarkup => {
                let fragments = concat!(env!("CARGO_MANIFEST_DIR"), "/../../demos/fragments");
                FragmentLoader::new().with_base_dir(fragments).load_component_cmd(
                    &self.page,
                    "header",
                    "navbar.html",
                    |result| Msg::MarkupLoaded(result.map(|_| ()).map_err(|e| e.to_string())),
                )
            }
            Msg::MarkupLoaded(Ok(())) => Command::none(),
            Msg::MarkupLoaded(Err(err)) => {
                self.location = format!("navbar unavailable: {err}");
                Command::none()
            }
            Msg::Quit => Command::quit(),
        }
    }

    fn view(&self, frame: &mut Frame) {
        let [bar, body, help] = Layout::vertical([
            Constraint::Length(12),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        if self.nav.is_attached() {
            self.nav.view(frame, bar);
        } else {
            frame.render_widget(
                Paragraph::new(Span::styled("Loading navigation…", Style::default().fg(Color::DarkGray))),
                bar,
            );
        }

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::raw("Current page: "),
                Span::styled(self.location.as_str(), Style::default().fg(Color::Cyan)),
            ])),
            body,
        );
        let regime = if self.nav.is_mobile() { "mobile" } else { "desktop" };
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("{regime} layout · ←/→ focus · enter toggle · esc close · q quit"),
                Style::default().fg(Color::DarkGray),
            )),
            help,
        );
    }

    fn subscriptions(&self) -> Vec<Subscription<Msg>> {
        vec![terminal_events(|ev| match ev {
            TerminalEvent::Key(key) => match key.code {
                KeyCode::Char('q') => Some(Msg::Quit),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    Some(Msg::Quit)
                }
                _ => Some(Msg::Nav(navbar::Message::KeyPress(key))),
            },
            TerminalEvent::Mouse(m) => Some(Msg::Nav(navbar::Message::Mouse(m))),
            TerminalEvent::Resize(cols, _) => Some(Msg::Nav(navbar::Message::Resize(cols))),
            _ => None,
        })]
    }
}

#[vitrine::tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let page = Page::new();
    page.append(page.body(), Element::new("header").with_id("header"))?;

    let model = vitrine::run_with::<Site>(
        page,
        ProgramOptions {
            title: Some("Navbar".into()),
            log_file: Some("navbar.log".into()),
            ..ProgramOptions::default()
        },
    )
    .await?;
    println!("Last page: {}", model.location);
    Ok(())
}
