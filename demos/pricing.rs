//! # Pricing Example
//!
//! A pricing page with a plan carousel:
//! - Building a [`Page`] and attaching a [`Carousel`] to it
//! - Auto-advance that pauses while the mouse hovers the cards
//! - Mouse drags as swipe gestures, clicks on arrows and dots
//! - Loading a banner fragment from disk with [`FragmentLoader`]
//!
//! Run with: `cargo run --example pricing`

use std::time::Duration;
use vitrine::crossterm::event::{KeyCode, KeyModifiers};
use vitrine::ratatui::layout::{Constraint, Layout};
use vitrine::ratatui::style::{Color, Modifier, Style};
use vitrine::ratatui::text::{Line, Span};
use vitrine::ratatui::widgets::{Paragraph, Wrap};
use vitrine::ratatui::Frame;
use vitrine::widgets::carousel::{self, Carousel, CarouselOptions, GestureConfig};
use vitrine::widgets::FragmentLoader;
use vitrine::{
    terminal_events, Breakpoint, Command, Component, Element, Model, Page, ProgramOptions,
    Subscription, TerminalEvent,
};

const PLANS: [(&str, &str, &str); 5] = [
    ("Starter", "$0/mo", "1 project"),
    ("Basic", "$9/mo", "5 projects"),
    ("Pro", "$29/mo", "Unlimited projects"),
    ("Team", "$79/mo", "10 seats included"),
    ("Enterprise", "Contact us", "SSO and audit logs"),
];

struct Pricing {
    page: Page,
    plans: Carousel,
    status: String,
}

#[derive(Debug)]
enum Msg {
    Plans(carousel::Message),
    BannerLoaded(Result<String, String>),
    Quit,
}

fn build_page() -> Result<Page, vitrine::PageError> {
    let page = Page::new();
    let body = page.body();
    page.append(body, Element::new("div").with_id("banner"))?;
    let wrapper = page.append(body, Element::new("section").with_class("carousel-container"))?;
    let track = page.append(wrapper, Element::new("div").with_id("pricingCarousel"))?;
    for (name, price, detail) in PLANS {
        let card = page.append(track, Element::new("div").with_class("pricing-card"))?;
        page.append(card, Element::new("h3").with_text(name))?;
        page.append(card, Element::new("p").with_class("price").with_text(price))?;
        page.append(card, Element::new("p").with_text(detail))?;
        page.append(
            card,
            Element::new("a")
                .with_attr("href", format!("/signup?plan={}", name.to_lowercase()))
                .with_text(format!("Choose {name}")),
        )?;
    }
    Ok(page)
}

impl Model for Pricing {
    type Message = Msg;
    type Flags = (Page, Carousel);

    fn init((page, plans): (Page, Carousel)) -> (Self, Command<Msg>) {
        let fragments = concat!(env!("CARGO_MANIFEST_DIR"), "/../../demos/fragments");
        let banner = FragmentLoader::new().with_base_dir(fragments).load_component_cmd(
            &page,
            "banner",
            "banner.txt",
            |result| Msg::BannerLoaded(result.map_err(|e| e.to_string())),
        );
        let size = Command::window_size(|cols, _| Msg::Plans(carousel::Message::Resize(cols)));
        (
            Pricing {
                page,
                plans,
                status: "Drag the cards, click the arrows or dots, or use ←/→".into(),
            },
            Command::batch([banner, size]),
        )
    }

    fn update(&mut self, msg: Msg) -> Command<Msg> {
        match msg {
            Msg::Plans(carousel::Message::Activated(target)) => {
                let href = self.page.attr(target, "href").unwrap_or_default();
                self.status = format!("Would open {href}");
                Command::none()
            }
            Msg::Plans(m) => self.plans.update(m).map(Msg::Plans),
            Msg::BannerLoaded(Ok(_)) => Command::none(),
            Msg::BannerLoaded(Err(e)) => {
                self.status = format!("Banner unavailable: {e}");
                Command::none()
            }
            Msg::Quit => Command::quit(),
        }
    }

    fn view(&self, frame: &mut Frame) {
        let [title, banner, cards, status, help] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(9),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .areas(frame.area());

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "Choose a plan",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ))),
            title,
        );

        let banner_text = self
            .page
            .find("banner")
            .and_then(|key| self.page.get(key))
            .map(|el| el.text().trim().to_string())
            .unwrap_or_default();
        frame.render_widget(
            Paragraph::new(banner_text)
                .style(Style::default().fg(Color::Yellow))
                .wrap(Wrap { trim: true }),
            banner,
        );

        self.plans.view(frame, cards);

        let slide = format!(
            "Plan {}/{}  ",
            self.plans.current_slide() + 1,
            self.plans.total_slides()
        );
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(slide, Style::default().fg(Color::Cyan)),
                Span::raw(self.status.as_str()),
            ])),
            status,
        );
        frame.render_widget(
            Paragraph::new(Span::styled("q quit", Style::default().fg(Color::DarkGray))),
            help,
        );
    }

    fn subscriptions(&self) -> Vec<Subscription<Msg>> {
        let mut subs = vec![terminal_events(|ev| match ev {
            TerminalEvent::Key(key) => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => Some(Msg::Quit),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    Some(Msg::Quit)
                }
                _ => Some(Msg::Plans(carousel::Message::KeyPress(key))),
            },
            TerminalEvent::Mouse(m) => Some(Msg::Plans(carousel::Message::Mouse(m))),
            TerminalEvent::Resize(cols, _) => Some(Msg::Plans(carousel::Message::Resize(cols))),
            _ => None,
        })];
        subs.extend(
            self.plans
                .subscriptions()
                .into_iter()
                .map(|s| s.map(Msg::Plans)),
        );
        subs
    }
}

#[vitrine::tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let page = build_page()?;
    let options = CarouselOptions::default()
        .with_auto_slide(Duration::from_secs(4))
        .with_gesture(GestureConfig::cells())
        .with_breakpoint(Breakpoint::COLUMNS);
    let mut plans = Carousel::create(&page, "pricingCarousel", options)?;
    plans.focus();

    let model = vitrine::run_with::<Pricing>(
        (page, plans),
        ProgramOptions {
            title: Some("Pricing".into()),
            log_file: Some("pricing.log".into()),
            ..ProgramOptions::default()
        },
    )
    .await?;
    println!("Last plan shown: {}", model.plans.current_slide() + 1);
    Ok(())
}
