//! Card carousel attached to a container element of a [`Page`].
//!
//! The carousel captures the container's children as its cards and shows a
//! window of `cards_per_view` of them starting at the current slide. Indices
//! wrap: advancing past the last card returns to the first, and there is one
//! dot per card. Each navigation rotates the container's children so the
//! window leads, and marks the matching `.dot` element `active`, so anything
//! else holding the page sees the same state the terminal view draws.
//!
//! Input arrives as [`Message`]s:
//!
//! - mouse presses on the rendered arrows and dots navigate directly;
//! - press, drag, release over the cards is run through a
//!   [`gesture::Recognizer`]: a horizontal swipe changes the slide once, a
//!   press that did not move is forwarded to the nearest link or button as
//!   [`Message::Activated`];
//! - pointer hover pauses auto-advance, leaving resumes it;
//! - `Left`/`Right` (or `h`/`l`) navigate while focused.
//!
//! Auto-advance is a [`Every`] subscription whose identity carries a
//! generation. Starting or resetting the timer bumps the generation, so the
//! runtime replaces the old timer instead of adding a second one, and ticks
//! from an older generation are dropped.
//!
//! ```rust,ignore
//! use vitrine_widgets::carousel::{Carousel, CarouselOptions};
//!
//! let plans = Carousel::create(&page, "pricingCarousel", CarouselOptions::default())?;
//! assert_eq!(plans.total_slides(), 4);
//! ```

pub mod dots;
pub mod gesture;
mod options;

pub use dots::{Dots, DotsStyle};
pub use gesture::{GestureConfig, GestureOutcome, MoveUpdate, Point, Recognizer, SwipeDirection};
pub use options::{CarouselOptions, CarouselStyle};

use crate::error::WidgetError;
use crate::text::{single_line, truncate};
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use std::cell::RefCell;
use vitrine_core::{subscribe, Command, Component, Element, Every, NodeKey, Page, Subscription};

/// Attribute marking a container as owned by a carousel.
pub const OWNER_ATTR: &str = "data-carousel-owner";
/// Id of the page-wide dots container.
pub const DOTS_ID: &str = "carouselDots";

/// Messages for the carousel.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Next,
    Prev,
    /// Go to a slide. Out-of-range and negative indices wrap.
    GoTo(isize),
    StartAutoSlide,
    PauseAutoSlide,
    /// A key press, handled while focused.
    KeyPress(KeyEvent),
    /// A mouse event in screen coordinates.
    Mouse(MouseEvent),
    /// A click the host observed on a page element (an arrow or a `.dot`).
    Click(NodeKey),
    /// Touch sequence start; the first point is used. Empty lists are ignored.
    TouchStart(Vec<Point>),
    TouchMove(Vec<Point>),
    /// Touch sequence end, carrying the changed touches.
    TouchEnd(Vec<Point>),
    HoverEnter,
    HoverLeave,
    /// Timer tick for the given generation.
    AutoAdvance { generation: u64 },
    /// New viewport width.
    Resize(u16),
    Refresh,
    Destroy,
    /// Emitted when a tap lands on a link or button inside a card. The
    /// carousel itself ignores this message; hosts intercept it.
    Activated(NodeKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Control {
    key: NodeKey,
    created: bool,
}

impl Control {
    fn supplied(key: NodeKey) -> Self {
        Self {
            key,
            created: false,
        }
    }

    fn created(key: NodeKey) -> Self {
        Self { key, created: true }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct AutoSlide {
    running: bool,
    generation: u64,
}

/// Rectangles from the last render.
#[derive(Debug, Default)]
struct HitMap {
    area: Rect,
    prev: Option<Rect>,
    next: Option<Rect>,
    dots: Option<Rect>,
    cards: Vec<(Rect, NodeKey)>,
    lines: Vec<(Rect, NodeKey)>,
}

enum Hit {
    Prev,
    Next,
    Dot(usize),
    Track,
    Outside,
}

/// A wrapping card carousel.
pub struct Carousel {
    page: Page,
    container_id: String,
    container: NodeKey,
    wrapper: Option<NodeKey>,
    cards: Vec<NodeKey>,
    current: usize,
    options: CarouselOptions,
    prev: Option<Control>,
    next: Option<Control>,
    dots: Option<Control>,
    recognizer: Recognizer,
    timer: AutoSlide,
    hovered: bool,
    viewport_width: Option<u16>,
    destroyed: bool,
    focus: bool,
    style: CarouselStyle,
    hits: RefCell<HitMap>,
}

impl Carousel {
    /// Attach to the element with id `container_id`.
    ///
    /// Finds the arrows (`.carousel-nav.prev` / `.carousel-nav.next` inside
    /// the container's parent) and the `#carouselDots` element, creating
    /// whichever is missing. Fails if the container does not exist or is
    /// already driven by another carousel.
    pub fn create(
        page: &Page,
        container_id: &str,
        options: CarouselOptions,
    ) -> Result<Self, WidgetError> {
        let options = options.normalized();
        let Some(container) = page.find(container_id) else {
            tracing::error!(id = container_id, "carousel element not found");
            return Err(WidgetError::MissingElement {
                id: container_id.to_string(),
            });
        };
        if page.attr(container, OWNER_ATTR).is_some() {
            tracing::error!(id = container_id, "carousel element already attached");
            return Err(WidgetError::AlreadyAttached {
                id: container_id.to_string(),
            });
        }
        page.set_attr(container, OWNER_ATTR, container_id);

        let mut carousel = Self {
            page: page.clone(),
            container_id: container_id.to_string(),
            container,
            wrapper: page.parent(container),
            cards: page.children(container),
            current: 0,
            recognizer: Recognizer::new(options.gesture),
            options,
            prev: None,
            next: None,
            dots: None,
            timer: AutoSlide::default(),
            hovered: false,
            viewport_width: None,
            destroyed: false,
            focus: false,
            style: CarouselStyle::default(),
            hits: RefCell::new(HitMap::default()),
        };
        carousel.find_or_create_navigation();

        page.toggle_class(container, "carousel-initialized", true);
        if let Some(wrapper) = carousel.wrapper {
            page.toggle_class(wrapper, "carousel-ready", true);
        }
        carousel.render_page();
        if carousel.options.auto_slide {
            carousel.start_auto_slide();
        }

        tracing::debug!(
            id = container_id,
            cards = carousel.cards.len(),
            "carousel attached"
        );
        Ok(carousel)
    }

    pub fn with_style(mut self, style: CarouselStyle) -> Self {
        self.style = style;
        self
    }

    pub fn focus(&mut self) {
        self.focus = true;
    }

    pub fn blur(&mut self) {
        self.focus = false;
    }

    pub fn current_slide(&self) -> usize {
        self.current
    }

    /// Number of cards captured at creation (or the last refresh).
    pub fn total_slides(&self) -> usize {
        self.cards.len()
    }

    /// Cards in the visible window, in display order.
    pub fn visible_cards(&self) -> Vec<NodeKey> {
        let n = self.cards.len();
        let shown = self.options.cards_per_view.min(n);
        (0..shown)
            .map(|i| self.cards[(self.current + i) % n])
            .collect()
    }

    pub fn options(&self) -> &CarouselOptions {
        &self.options
    }

    pub fn container(&self) -> NodeKey {
        self.container
    }

    /// The dots container in use, supplied or created.
    pub fn dots_element(&self) -> Option<NodeKey> {
        self.dots.map(|c| c.key)
    }

    /// The previous/next arrow elements in use.
    pub fn arrow_elements(&self) -> Option<(NodeKey, NodeKey)> {
        Some((self.prev?.key, self.next?.key))
    }

    /// Whether the auto-advance timer is currently running.
    pub fn is_auto_sliding(&self) -> bool {
        self.timer.running && !self.destroyed
    }

    /// Whether the current press-drag sequence has become a horizontal drag.
    pub fn is_dragging(&self) -> bool {
        self.recognizer.is_dragging()
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Last width reported through [`Message::Resize`].
    pub fn viewport_width(&self) -> Option<u16> {
        self.viewport_width
    }

    // --- navigation ---

    /// Show the window starting at `index`, wrapping it into range. Resets
    /// the auto-advance timer. Does nothing without cards.
    pub fn go_to_slide(&mut self, index: isize) {
        if !self.show(index) {
            return;
        }
        self.reset_auto_slide();
    }

    pub fn next_slide(&mut self) {
        self.go_to_slide(self.current as isize + 1);
    }

    pub fn prev_slide(&mut self) {
        self.go_to_slide(self.current as isize - 1);
    }

    fn show(&mut self, index: isize) -> bool {
        if self.destroyed || self.cards.is_empty() {
            return false;
        }
        let n = self.cards.len() as isize;
        self.current = index.rem_euclid(n) as usize;
        self.render_page();
        tracing::debug!(id = %self.container_id, slide = self.current, "slide changed");
        true
    }

    // --- auto-advance ---

    /// Start the timer, replacing any running one. Does nothing unless
    /// auto-advance is enabled.
    pub fn start_auto_slide(&mut self) {
        if self.destroyed || !self.options.auto_slide {
            return;
        }
        self.timer.generation = self.timer.generation.wrapping_add(1);
        self.timer.running = true;
    }

    pub fn pause_auto_slide(&mut self) {
        self.timer.running = false;
    }

    pub fn reset_auto_slide(&mut self) {
        if self.options.auto_slide {
            self.start_auto_slide();
        }
    }

    fn timer_name(&self) -> String {
        format!("carousel#{}", self.container_id)
    }

    fn auto_advance(&mut self, generation: u64) {
        if !self.is_auto_sliding() || generation != self.timer.generation {
            tracing::trace!(generation, "stale carousel tick");
            return;
        }
        // Advance without restarting the timer; it is already on schedule.
        self.show(self.current as isize + 1);
    }

    // --- gestures ---

    /// Begin a press-drag sequence and pause auto-advance.
    pub fn touch_start(&mut self, point: Point) {
        if self.destroyed || !self.options.enable_touch {
            return;
        }
        self.recognizer.start(point);
        self.pause_auto_slide();
    }

    /// Feed a move. [`MoveUpdate::SuppressScroll`] means the host should not
    /// scroll for this move.
    pub fn touch_move(&mut self, point: Point) -> MoveUpdate {
        if self.destroyed || !self.options.enable_touch {
            return MoveUpdate::PassThrough;
        }
        self.recognizer.move_to(point)
    }

    /// Finish the sequence: swipe, forward a tap, or nothing. Resumes
    /// auto-advance. A release with no sequence in progress is ignored.
    pub fn touch_end(&mut self, point: Point) -> Command<Message> {
        if self.destroyed || !self.options.enable_touch {
            return Command::none();
        }
        let Some(outcome) = self.recognizer.end(point) else {
            return Command::none();
        };
        let cmd = match outcome {
            GestureOutcome::Swipe(SwipeDirection::Next) => {
                self.next_slide();
                Command::none()
            }
            GestureOutcome::Swipe(SwipeDirection::Prev) => {
                self.prev_slide();
                Command::none()
            }
            GestureOutcome::Tap(at) => match self.tap_target(at) {
                Some(target) => Command::message(Message::Activated(target)),
                None => Command::none(),
            },
            GestureOutcome::Ignored => Command::none(),
        };
        self.start_auto_slide();
        cmd
    }

    /// Abandon the sequence in progress without classifying it. Auto-advance
    /// resumes as it would after a normal release.
    pub fn touch_cancel(&mut self) {
        if self.destroyed || !self.recognizer.is_active() {
            return;
        }
        self.recognizer.cancel();
        self.start_auto_slide();
    }

    /// The link or button under `at`, resolved through the last render.
    fn tap_target(&self, at: Point) -> Option<NodeKey> {
        if at.x < 0.0 || at.y < 0.0 {
            return None;
        }
        let pos = Position::new(at.x as u16, at.y as u16);
        let under = {
            let hits = self.hits.borrow();
            hits.lines
                .iter()
                .chain(hits.cards.iter())
                .find(|(rect, _)| rect.contains(pos))
                .map(|(_, key)| *key)?
        };
        self.page.closest(under, Element::is_interactive)
    }

    // --- hover ---

    fn hover_enter(&mut self) {
        self.hovered = true;
        if self.options.auto_slide {
            self.pause_auto_slide();
        }
    }

    fn hover_leave(&mut self) {
        self.hovered = false;
        self.start_auto_slide();
    }

    // --- lifecycle ---

    /// Re-capture the container's children as the cards, in their current
    /// order, and show the window from the first of them. Created dots are
    /// rebuilt for the new count.
    pub fn refresh(&mut self) {
        if self.destroyed {
            return;
        }
        self.cards = self.page.children(self.container);
        self.current = 0;
        if let Some(dots) = self.dots.filter(|d| d.created) {
            for dot in self.page.children(dots.key) {
                self.page.remove(dot);
            }
            self.append_dots(dots.key);
        }
        self.render_page();
        tracing::debug!(id = %self.container_id, cards = self.cards.len(), "carousel refreshed");
    }

    /// Stop the timer and remove the controls this carousel created.
    /// Controls the page supplied stay. Every later message is ignored.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.pause_auto_slide();
        self.recognizer.cancel();
        for control in [self.prev.take(), self.next.take(), self.dots.take()]
            .into_iter()
            .flatten()
        {
            if control.created {
                self.page.remove(control.key);
            }
        }
        self.page.remove_attr(self.container, OWNER_ATTR);
        self.destroyed = true;
        *self.hits.borrow_mut() = HitMap::default();
        tracing::debug!(id = %self.container_id, "carousel destroyed");
    }

    fn resize(&mut self, width: u16) {
        let previous = self.viewport_width.replace(width);
        if let Some(class) = previous.and_then(|from| self.options.breakpoint.crossed(from, width)) {
            tracing::debug!(id = %self.container_id, ?class, "carousel viewport changed");
        }
        if !self.options.breakpoint.is_mobile(width) {
            self.render_page();
        }
    }

    // --- page mirroring ---

    fn find_or_create_navigation(&mut self) {
        let Some(wrapper) = self.wrapper else {
            return;
        };
        if self.options.enable_arrows {
            self.prev = self.find_or_create_arrow(wrapper, "prev", "prevBtn", "Previous slide");
            self.next = self.find_or_create_arrow(wrapper, "next", "nextBtn", "Next slide");
        }
        if self.options.enable_dots {
            self.dots = match self.page.find(DOTS_ID) {
                Some(key) => Some(Control::supplied(key)),
                None => self.create_dots(wrapper),
            };
        }
    }

    fn find_or_create_arrow(
        &self,
        wrapper: NodeKey,
        side: &str,
        id: &str,
        label: &str,
    ) -> Option<Control> {
        if let Some(key) = self.page.query_class(wrapper, &["carousel-nav", side]) {
            return Some(Control::supplied(key));
        }
        let mut arrow = Element::new("button")
            .with_class(&format!("carousel-nav {side}"))
            .with_attr("aria-label", label);
        if self.page.find(id).is_none() {
            arrow = arrow.with_id(id);
        }
        match self.page.append(wrapper, arrow) {
            Ok(key) => Some(Control::created(key)),
            Err(err) => {
                tracing::warn!(%err, side, "could not create carousel arrow");
                None
            }
        }
    }

    fn create_dots(&self, wrapper: NodeKey) -> Option<Control> {
        let container = Element::new("div")
            .with_class("carousel-dots")
            .with_id(DOTS_ID);
        match self.page.insert_after(wrapper, container) {
            Ok(key) => {
                self.append_dots(key);
                Some(Control::created(key))
            }
            Err(err) => {
                tracing::warn!(%err, "could not create carousel dots");
                None
            }
        }
    }

    fn append_dots(&self, parent: NodeKey) {
        for i in 0..self.cards.len() {
            let dot = Element::new("div")
                .with_class("dot")
                .with_attr("data-slide", i.to_string());
            if let Err(err) = self.page.append(parent, dot) {
                tracing::warn!(%err, "could not create carousel dot");
            }
        }
    }

    /// Rotate the container's children so the window leads and mark the
    /// active dot.
    fn render_page(&self) {
        if self.destroyed {
            return;
        }
        let n = self.cards.len();
        if n > 0 {
            let order: Vec<NodeKey> = (0..n).map(|i| self.cards[(self.current + i) % n]).collect();
            if let Err(err) = self.page.reorder_children(self.container, &order) {
                tracing::warn!(%err, id = %self.container_id, "cards changed since capture; refresh the carousel");
            }
        }
        if let Some(dots) = self.dots {
            let dot_keys = self.page.query_all(dots.key, |el| el.has_class("dot"));
            for (i, key) in dot_keys.into_iter().enumerate() {
                self.page.toggle_class(key, "active", i == self.current);
            }
        }
    }

    /// Arrow or dot clicked in the page.
    fn click_element(&mut self, key: NodeKey) {
        if self.prev.is_some_and(|c| c.key == key) {
            self.prev_slide();
        } else if self.next.is_some_and(|c| c.key == key) {
            self.next_slide();
        } else if let Some(dots) = self.dots {
            if !self.page.is_within(key, dots.key) || !self.page.has_class(key, "dot") {
                return;
            }
            if let Some(slide) = self
                .page
                .attr(key, "data-slide")
                .and_then(|s| s.parse::<isize>().ok())
            {
                self.go_to_slide(slide);
            }
        }
    }

    // --- terminal input ---

    fn hit(&self, x: u16, y: u16) -> Hit {
        let pos = Position::new(x, y);
        let hits = self.hits.borrow();
        if hits.prev.is_some_and(|r| r.contains(pos)) {
            return Hit::Prev;
        }
        if hits.next.is_some_and(|r| r.contains(pos)) {
            return Hit::Next;
        }
        if let Some(row) = hits.dots.filter(|r| r.contains(pos)) {
            let dots = Dots {
                total: self.cards.len(),
                active: self.current,
            };
            return dots.hit(row, x).map_or(Hit::Outside, Hit::Dot);
        }
        if hits.cards.iter().any(|(r, _)| r.contains(pos)) {
            return Hit::Track;
        }
        Hit::Outside
    }

    fn handle_mouse(&mut self, event: MouseEvent) -> Command<Message> {
        let point = Point::new(f32::from(event.column), f32::from(event.row));
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                match self.hit(event.column, event.row) {
                    Hit::Prev => self.prev_slide(),
                    Hit::Next => self.next_slide(),
                    Hit::Dot(i) => self.go_to_slide(i as isize),
                    Hit::Track => self.touch_start(point),
                    Hit::Outside => {}
                }
                Command::none()
            }
            MouseEventKind::Drag(MouseButton::Left) if self.recognizer.is_active() => {
                self.touch_move(point);
                Command::none()
            }
            MouseEventKind::Up(MouseButton::Left) if self.recognizer.is_active() => {
                self.touch_end(point)
            }
            MouseEventKind::Moved => {
                let inside = self
                    .hits
                    .borrow()
                    .area
                    .contains(Position::new(event.column, event.row));
                if inside && !self.hovered {
                    self.hover_enter();
                } else if !inside && self.hovered {
                    self.hover_leave();
                }
                Command::none()
            }
            _ => Command::none(),
        }
    }

    // --- drawing ---

    fn render_card(&self, frame: &mut Frame, rect: Rect, card: NodeKey, hits: &mut HitMap) {
        let lines = self.page.text_lines(card);
        let title_width = rect.width.saturating_sub(2) as usize;
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.style.card_border);
        if let Some((key, text)) = lines.first() {
            let title = truncate(&single_line(text), title_width, "…");
            block = block.title(Span::styled(title, self.style.card_title));
            hits.lines.push((Rect::new(rect.x, rect.y, rect.width, 1), *key));
        }
        let inner = block.inner(rect);
        frame.render_widget(block, rect);
        hits.cards.push((rect, card));

        for (row, (key, text)) in lines.iter().skip(1).take(inner.height as usize).enumerate() {
            let line_rect = Rect::new(inner.x, inner.y + row as u16, inner.width, 1);
            let interactive = self
                .page
                .with_element(*key, Element::is_interactive)
                .unwrap_or(false);
            let style = if interactive {
                self.style.action
            } else {
                self.style.card_text
            };
            let text = truncate(&single_line(text), inner.width as usize, "…");
            frame.render_widget(Paragraph::new(Span::styled(text, style)), line_rect);
            hits.lines.push((line_rect, *key));
        }
    }
}

impl Component for Carousel {
    type Message = Message;

    fn update(&mut self, msg: Message) -> Command<Message> {
        if self.destroyed {
            return Command::none();
        }
        match msg {
            Message::Next => self.next_slide(),
            Message::Prev => self.prev_slide(),
            Message::GoTo(index) => self.go_to_slide(index),
            Message::StartAutoSlide => self.start_auto_slide(),
            Message::PauseAutoSlide => self.pause_auto_slide(),
            Message::KeyPress(key) if self.focus => match key.code {
                KeyCode::Left | KeyCode::Char('h') => self.prev_slide(),
                KeyCode::Right | KeyCode::Char('l') => self.next_slide(),
                _ => {}
            },
            Message::KeyPress(_) => {}
            Message::Mouse(event) => return self.handle_mouse(event),
            Message::Click(key) => self.click_element(key),
            Message::TouchStart(points) => {
                if let Some(p) = points.first() {
                    self.touch_start(*p);
                }
            }
            Message::TouchMove(points) => {
                if let Some(p) = points.first() {
                    self.touch_move(*p);
                }
            }
            Message::TouchEnd(points) => match points.first() {
                Some(p) => return self.touch_end(*p),
                None => self.touch_cancel(),
            },
            Message::HoverEnter => self.hover_enter(),
            Message::HoverLeave => self.hover_leave(),
            Message::AutoAdvance { generation } => self.auto_advance(generation),
            Message::Resize(width) => self.resize(width),
            Message::Refresh => self.refresh(),
            Message::Destroy => self.destroy(),
            Message::Activated(_) => {}
        }
        Command::none()
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        let mut hits = HitMap {
            area,
            ..HitMap::default()
        };
        if area.width == 0 || area.height == 0 || self.cards.is_empty() {
            *self.hits.borrow_mut() = hits;
            return;
        }

        let show_dots = self.options.enable_dots && !self.destroyed && area.height > 1;
        let show_arrows = self.options.enable_arrows && !self.destroyed && area.width > 6;

        let [body, dots_row] = if show_dots {
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area)
        } else {
            [area, Rect::default()]
        };

        let track = if show_arrows {
            let [prev_col, track, next_col] = Layout::horizontal([
                Constraint::Length(2),
                Constraint::Min(1),
                Constraint::Length(2),
            ])
            .areas(body);
            let mid = body.height / 2;
            let arrow = |col: Rect, glyph: &'static str, frame: &mut Frame| {
                let cell = Rect::new(col.x, col.y + mid, 1, 1);
                frame.render_widget(Paragraph::new(Span::styled(glyph, self.style.arrow)), cell);
            };
            arrow(prev_col, "‹", frame);
            arrow(Rect { x: next_col.x + 1, ..next_col }, "›", frame);
            hits.prev = Some(prev_col);
            hits.next = Some(next_col);
            track
        } else {
            body
        };

        let visible = self.visible_cards();
        let constraints = vec![Constraint::Ratio(1, visible.len() as u32); visible.len()];
        let slots = Layout::horizontal(constraints).split(track);
        for (rect, card) in slots.iter().zip(visible) {
            self.render_card(frame, *rect, card, &mut hits);
        }

        if show_dots {
            let dots = Dots {
                total: self.cards.len(),
                active: self.current,
            };
            dots.render(frame, dots_row, &self.style.dots);
            hits.dots = Some(dots_row);
        }

        *self.hits.borrow_mut() = hits;
    }

    fn subscriptions(&self) -> Vec<Subscription<Message>> {
        if !self.is_auto_sliding() {
            return vec![];
        }
        let generation = self.timer.generation;
        let timer = Every::new(self.options.auto_slide_interval, self.timer_name())
            .generation(generation);
        vec![subscribe(timer).map(move |_| Message::AutoAdvance { generation })]
    }

    fn focused(&self) -> bool {
        self.focus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use std::time::Duration;
    use vitrine_core::testing::{buffer_to_string, render_component, LiveSubscriptions};

    /// `<section class="carousel-container"><div id="plans">` with `n` plan
    /// cards, each holding a heading, a price, and a button.
    fn pricing_page(n: usize) -> Page {
        let page = Page::new();
        let wrapper = page
            .append(page.body(), Element::new("section").with_class("carousel-container"))
            .unwrap();
        let track = page
            .append(wrapper, Element::new("div").with_id("plans"))
            .unwrap();
        for i in 0..n {
            let card = page
                .append(track, Element::new("div").with_class("card"))
                .unwrap();
            page.append(card, Element::new("h3").with_text(format!("Plan {i}")))
                .unwrap();
            page.append(card, Element::new("p").with_text(format!("${}/mo", i * 10)))
                .unwrap();
            page.append(card, Element::new("button").with_text("Choose"))
                .unwrap();
        }
        page
    }

    fn carousel(n: usize, options: CarouselOptions) -> (Page, Carousel) {
        let page = pricing_page(n);
        let c = Carousel::create(&page, "plans", options).unwrap();
        (page, c)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Message {
        Message::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn pt(x: f32, y: f32) -> Vec<Point> {
        vec![Point::new(x, y)]
    }

    fn auto(interval_ms: u64) -> CarouselOptions {
        CarouselOptions::default().with_auto_slide(Duration::from_millis(interval_ms))
    }

    #[test]
    fn creates_one_dot_per_card() {
        let (page, c) = carousel(5, CarouselOptions::default());
        let dots = c.dots_element().unwrap();
        assert_eq!(page.find(DOTS_ID), Some(dots));
        let dot_keys = page.children(dots);
        assert_eq!(dot_keys.len(), 5);
        assert_eq!(page.attr(dot_keys[3], "data-slide").as_deref(), Some("3"));
        assert!(page.has_class(dot_keys[0], "active"));
    }

    #[test]
    fn creates_missing_arrows_in_wrapper() {
        let (page, c) = carousel(3, CarouselOptions::default());
        let (prev, next) = c.arrow_elements().unwrap();
        assert_eq!(page.find("prevBtn"), Some(prev));
        assert_eq!(page.find("nextBtn"), Some(next));
        assert_eq!(page.attr(prev, "aria-label").as_deref(), Some("Previous slide"));
        let wrapper = page.parent(c.container()).unwrap();
        assert_eq!(page.parent(next), Some(wrapper));
        assert!(page.has_class(wrapper, "carousel-ready"));
        assert!(page.has_class(c.container(), "carousel-initialized"));
    }

    #[test]
    fn reuses_supplied_controls() {
        let page = pricing_page(3);
        let wrapper = page.parent(page.find("plans").unwrap()).unwrap();
        let prev = page
            .append(wrapper, Element::new("button").with_class("carousel-nav prev"))
            .unwrap();
        let dots = page
            .append(page.body(), Element::new("div").with_id(DOTS_ID))
            .unwrap();
        let c = Carousel::create(&page, "plans", CarouselOptions::default()).unwrap();
        assert_eq!(c.arrow_elements().map(|(p, _)| p), Some(prev));
        assert_eq!(c.dots_element(), Some(dots));
        // only the missing next arrow was created
        assert!(page.find("prevBtn").is_none());
        assert!(page.find("nextBtn").is_some());
    }

    #[test]
    fn disabled_controls_are_not_created() {
        let options = CarouselOptions::default().with_arrows(false).with_dots(false);
        let (page, c) = carousel(3, options);
        assert!(c.arrow_elements().is_none());
        assert!(c.dots_element().is_none());
        assert!(page.find(DOTS_ID).is_none());
    }

    #[test]
    fn missing_container_is_an_error() {
        let page = Page::new();
        let err = Carousel::create(&page, "nope", CarouselOptions::default()).err();
        assert_eq!(
            err,
            Some(WidgetError::MissingElement {
                id: "nope".to_string()
            })
        );
    }

    #[test]
    fn second_attach_is_refused_until_destroy() {
        let (page, mut first) = carousel(3, CarouselOptions::default());
        let err = Carousel::create(&page, "plans", CarouselOptions::default()).err();
        assert!(matches!(err, Some(WidgetError::AlreadyAttached { .. })));
        first.destroy();
        assert!(Carousel::create(&page, "plans", CarouselOptions::default()).is_ok());
    }

    #[test]
    fn next_n_times_returns_to_start() {
        let (_, mut c) = carousel(4, CarouselOptions::default());
        c.go_to_slide(2);
        for _ in 0..4 {
            c.update(Message::Next);
        }
        assert_eq!(c.current_slide(), 2);
    }

    #[test]
    fn indices_wrap_both_ways() {
        let (_, mut c) = carousel(4, CarouselOptions::default());
        c.update(Message::Prev);
        assert_eq!(c.current_slide(), 3);
        c.update(Message::GoTo(-6));
        assert_eq!(c.current_slide(), 2);
        c.update(Message::GoTo(9));
        assert_eq!(c.current_slide(), 1);
    }

    #[test]
    fn same_index_twice_is_idempotent() {
        let (page, mut c) = carousel(5, CarouselOptions::default());
        c.go_to_slide(3);
        let visible = c.visible_cards();
        let order = page.children(c.container());
        c.go_to_slide(3);
        assert_eq!(c.visible_cards(), visible);
        assert_eq!(page.children(c.container()), order);
    }

    #[test]
    fn window_rotates_container_children() {
        let (page, mut c) = carousel(4, CarouselOptions::default());
        let original = page.children(c.container());
        c.go_to_slide(3);
        let rotated = page.children(c.container());
        assert_eq!(rotated.len(), 4);
        assert_eq!(rotated[0], original[3]);
        assert_eq!(rotated[1], original[0]);
        assert_eq!(c.visible_cards(), rotated[..3].to_vec());
    }

    #[test]
    fn active_dot_follows_slide() {
        let (page, mut c) = carousel(3, CarouselOptions::default());
        c.update(Message::Next);
        let dots = page.children(c.dots_element().unwrap());
        let active: Vec<bool> = dots.iter().map(|d| page.has_class(*d, "active")).collect();
        assert_eq!(active, vec![false, true, false]);
    }

    #[test]
    fn visible_window_is_capped_by_card_count() {
        let (_, c) = carousel(2, CarouselOptions::default());
        assert_eq!(c.visible_cards().len(), 2);
    }

    #[test]
    fn empty_carousel_ignores_navigation() {
        let (_, mut c) = carousel(0, CarouselOptions::default());
        c.update(Message::Next);
        c.update(Message::GoTo(5));
        assert_eq!(c.current_slide(), 0);
        assert_eq!(c.total_slides(), 0);
        assert!(c.visible_cards().is_empty());
    }

    #[test]
    fn page_clicks_on_controls_navigate() {
        let (page, mut c) = carousel(4, CarouselOptions::default());
        let (prev, next) = c.arrow_elements().unwrap();
        c.update(Message::Click(next));
        c.update(Message::Click(next));
        c.update(Message::Click(prev));
        assert_eq!(c.current_slide(), 1);
        let dot = page.children(c.dots_element().unwrap())[3];
        c.update(Message::Click(dot));
        assert_eq!(c.current_slide(), 3);
        // a card is not a control
        c.update(Message::Click(c.visible_cards()[0]));
        assert_eq!(c.current_slide(), 3);
    }

    #[tokio::test]
    async fn auto_slide_starts_when_enabled() {
        let (_, c) = carousel(3, auto(5000));
        assert!(c.is_auto_sliding());
        assert_eq!(c.subscriptions().len(), 1);

        let (_, manual) = carousel(3, CarouselOptions::default());
        assert!(!manual.is_auto_sliding());
        assert!(manual.subscriptions().is_empty());
    }

    #[tokio::test]
    async fn starting_again_replaces_timer_identity() {
        let (_, mut c) = carousel(3, auto(5000));
        let first = c.subscriptions()[0].id().clone();
        c.update(Message::StartAutoSlide);
        c.update(Message::StartAutoSlide);
        assert_ne!(c.subscriptions()[0].id(), &first);
    }

    #[tokio::test]
    async fn restarted_timer_advances_once_per_interval() {
        let (_, mut c) = carousel(5, auto(30));
        let mut live = LiveSubscriptions::new();
        live.reconcile(c.subscriptions());
        for msg in live.collect_for(Duration::from_millis(45)).await {
            c.update(msg);
        }
        assert_ne!(c.current_slide(), 0);

        c.update(Message::StartAutoSlide);
        c.update(Message::StartAutoSlide);
        live.reconcile(c.subscriptions());
        assert_eq!(live.active(), 1);

        let current = c.timer.generation;
        let mut accepted = 0;
        let mut fresh = 0;
        for msg in live.collect_for(Duration::from_millis(100)).await {
            if matches!(msg, Message::AutoAdvance { generation } if generation == current) {
                fresh += 1;
            }
            let before = c.current_slide();
            c.update(msg);
            if c.current_slide() != before {
                accepted += 1;
            }
        }
        // Roughly three ticks fit in the window; a second timer would double it.
        assert!(fresh >= 1 && fresh <= 4, "fresh ticks: {fresh}");
        assert_eq!(accepted, fresh);
    }

    #[test]
    fn stale_ticks_are_ignored() {
        let (_, mut c) = carousel(3, auto(5000));
        let stale = c.timer.generation;
        c.start_auto_slide();
        c.update(Message::AutoAdvance { generation: stale });
        assert_eq!(c.current_slide(), 0);
        c.update(Message::AutoAdvance {
            generation: c.timer.generation,
        });
        assert_eq!(c.current_slide(), 1);
    }

    #[tokio::test]
    async fn tick_advances_without_restarting_timer() {
        let (_, mut c) = carousel(3, auto(5000));
        let id = c.subscriptions()[0].id().clone();
        let generation = c.timer.generation;
        c.update(Message::AutoAdvance { generation });
        assert_eq!(c.subscriptions()[0].id(), &id);
    }

    #[test]
    fn manual_navigation_resets_timer() {
        let (_, mut c) = carousel(3, auto(5000));
        let before = c.timer.generation;
        c.update(Message::Next);
        assert!(c.timer.generation > before);
        c.update(Message::AutoAdvance { generation: before });
        assert_eq!(c.current_slide(), 1);
    }

    #[test]
    fn pause_drops_the_timer() {
        let (_, mut c) = carousel(3, auto(5000));
        c.update(Message::PauseAutoSlide);
        assert!(c.subscriptions().is_empty());
        let generation = c.timer.generation;
        c.update(Message::AutoAdvance { generation });
        assert_eq!(c.current_slide(), 0);
    }

    #[test]
    fn hover_pauses_and_leave_resumes() {
        let (_, mut c) = carousel(3, auto(5000));
        c.update(Message::HoverEnter);
        assert!(c.is_hovered());
        assert!(!c.is_auto_sliding());
        c.update(Message::HoverLeave);
        assert!(c.is_auto_sliding());
    }

    #[test]
    fn leftward_swipe_advances_once() {
        let options = CarouselOptions::default()
            .with_gesture(GestureConfig::default().with_swipe_threshold(50.0));
        let (_, mut c) = carousel(4, options);
        c.update(Message::TouchStart(pt(200.0, 100.0)));
        c.update(Message::TouchMove(pt(150.0, 105.0)));
        assert!(c.is_dragging());
        c.update(Message::TouchMove(pt(100.0, 110.0)));
        let cmd = c.update(Message::TouchEnd(pt(100.0, 110.0)));
        assert!(cmd.is_none());
        assert_eq!(c.current_slide(), 1);
        // a stray release does nothing more
        c.update(Message::TouchEnd(pt(0.0, 110.0)));
        assert_eq!(c.current_slide(), 1);
    }

    #[test]
    fn rightward_swipe_goes_back() {
        let (_, mut c) = carousel(4, CarouselOptions::default());
        c.update(Message::TouchStart(pt(10.0, 50.0)));
        c.update(Message::TouchMove(pt(60.0, 50.0)));
        c.update(Message::TouchEnd(pt(120.0, 52.0)));
        assert_eq!(c.current_slide(), 3);
    }

    #[tokio::test]
    async fn gesture_pauses_then_resumes_timer() {
        let (_, mut c) = carousel(3, auto(5000));
        c.update(Message::TouchStart(pt(0.0, 0.0)));
        assert!(!c.is_auto_sliding());
        c.update(Message::TouchEnd(pt(0.0, 0.0)));
        assert!(c.is_auto_sliding());
        assert_eq!(c.subscriptions().len(), 1);
    }

    #[test]
    fn empty_touch_lists_are_ignored() {
        let (_, mut c) = carousel(3, auto(5000));
        c.update(Message::TouchStart(vec![]));
        assert!(!c.recognizer.is_active());
        assert!(c.is_auto_sliding());
        c.update(Message::TouchMove(vec![]));
        assert!(c.update(Message::TouchEnd(vec![])).is_none());
        assert!(c.is_auto_sliding());
    }

    #[test]
    fn empty_release_ends_sequence_and_resumes_timer() {
        let (_, mut c) = carousel(3, auto(5000));
        c.update(Message::TouchStart(pt(1.0, 1.0)));
        assert!(!c.is_auto_sliding());
        assert!(c.update(Message::TouchEnd(vec![])).is_none());
        assert!(!c.recognizer.is_active());
        assert!(c.is_auto_sliding());
        assert_eq!(c.current_slide(), 0);
    }

    #[test]
    fn disabled_touch_ignores_gestures() {
        let (_, mut c) = carousel(3, CarouselOptions::default().with_touch(false));
        c.update(Message::TouchStart(pt(200.0, 0.0)));
        c.update(Message::TouchMove(pt(100.0, 0.0)));
        c.update(Message::TouchEnd(pt(0.0, 0.0)));
        assert_eq!(c.current_slide(), 0);
    }

    #[test]
    fn tap_forwards_to_button_under_point() {
        let (page, mut c) = carousel(3, CarouselOptions::default().with_arrows(false));
        let _ = render_component(&c, 60, 8);
        // Card 0 spans columns 0..20; rows: 0 border/title, 1 price, 2 button.
        c.update(Message::TouchStart(pt(5.0, 2.0)));
        c.update(Message::TouchMove(pt(10.0, 7.0)));
        let cmd = c.update(Message::TouchEnd(pt(10.0, 7.0)));
        let msg = cmd.into_message();
        let Some(Message::Activated(target)) = msg else {
            panic!("expected an activation, got {msg:?}");
        };
        assert_eq!(page.get(target).unwrap().tag(), "button");
        assert!(page.is_within(target, c.visible_cards()[0]));
        assert_eq!(c.current_slide(), 0);
    }

    #[test]
    fn tap_on_plain_text_forwards_nothing() {
        let (_, mut c) = carousel(3, CarouselOptions::default().with_arrows(false));
        let _ = render_component(&c, 60, 8);
        c.update(Message::TouchStart(pt(5.0, 1.0)));
        assert!(c.update(Message::TouchEnd(pt(5.0, 1.0))).is_none());
    }

    #[test]
    fn mouse_drag_swipes_with_cell_thresholds() {
        let options = CarouselOptions::default()
            .with_arrows(false)
            .with_gesture(GestureConfig::cells());
        let (_, mut c) = carousel(3, options);
        let _ = render_component(&c, 60, 8);
        c.update(mouse(MouseEventKind::Down(MouseButton::Left), 30, 3));
        c.update(mouse(MouseEventKind::Drag(MouseButton::Left), 26, 3));
        c.update(mouse(MouseEventKind::Drag(MouseButton::Left), 20, 3));
        c.update(mouse(MouseEventKind::Up(MouseButton::Left), 20, 3));
        assert_eq!(c.current_slide(), 1);
    }

    #[test]
    fn mouse_clicks_on_rendered_arrows_and_dots() {
        let (_, mut c) = carousel(3, CarouselOptions::default());
        let _ = render_component(&c, 40, 8);
        c.update(mouse(MouseEventKind::Down(MouseButton::Left), 39, 3));
        assert_eq!(c.current_slide(), 1);
        c.update(mouse(MouseEventKind::Down(MouseButton::Left), 0, 3));
        assert_eq!(c.current_slide(), 0);
        // 3 dots take 5 columns centered in 40 -> start at 17
        c.update(mouse(MouseEventKind::Down(MouseButton::Left), 21, 7));
        assert_eq!(c.current_slide(), 2);
    }

    #[test]
    fn mouse_motion_maps_to_hover() {
        let (_, mut c) = carousel(3, auto(5000));
        let _ = render_component(&c, 40, 8);
        c.update(mouse(MouseEventKind::Moved, 10, 3));
        assert!(c.is_hovered());
        assert!(!c.is_auto_sliding());
        c.update(mouse(MouseEventKind::Moved, 10, 20));
        assert!(!c.is_hovered());
        assert!(c.is_auto_sliding());
    }

    #[test]
    fn keys_navigate_only_when_focused() {
        let (_, mut c) = carousel(3, CarouselOptions::default());
        c.update(Message::KeyPress(key(KeyCode::Right)));
        assert_eq!(c.current_slide(), 0);
        c.focus();
        c.update(Message::KeyPress(key(KeyCode::Right)));
        c.update(Message::KeyPress(key(KeyCode::Char('l'))));
        c.update(Message::KeyPress(key(KeyCode::Char('h'))));
        assert_eq!(c.current_slide(), 1);
        c.blur();
        assert!(!c.focused());
    }

    #[test]
    fn view_draws_window_arrows_and_dots() {
        let (_, mut c) = carousel(4, CarouselOptions::default());
        c.go_to_slide(1);
        let screen = buffer_to_string(&render_component(&c, 80, 8));
        assert!(screen.contains("Plan 1"));
        assert!(screen.contains("Plan 3"));
        assert!(!screen.contains("Plan 0"));
        assert!(screen.contains("$20/mo"));
        assert!(screen.contains('‹') && screen.contains('›'));
        assert!(screen.contains("○ ● ○ ○"));
    }

    #[test]
    fn resize_records_width() {
        let (_, mut c) = carousel(3, CarouselOptions::default());
        c.update(Message::Resize(1200));
        assert_eq!(c.viewport_width(), Some(1200));
        c.update(Message::Resize(400));
        assert_eq!(c.viewport_width(), Some(400));
    }

    #[test]
    fn refresh_recaptures_cards_in_current_order() {
        let (page, mut c) = carousel(3, CarouselOptions::default());
        c.go_to_slide(2);
        let leading = c.visible_cards()[0];
        page.append(c.container(), Element::new("div").with_text("Plan new"))
            .unwrap();
        c.update(Message::Refresh);
        assert_eq!(c.total_slides(), 4);
        assert_eq!(c.current_slide(), 0);
        assert_eq!(c.visible_cards()[0], leading);
        assert_eq!(page.children(c.dots_element().unwrap()).len(), 4);
    }

    #[test]
    fn destroy_removes_created_controls_only() {
        let page = pricing_page(3);
        let wrapper = page.parent(page.find("plans").unwrap()).unwrap();
        let supplied = page
            .append(wrapper, Element::new("button").with_class("carousel-nav prev"))
            .unwrap();
        let mut c = Carousel::create(&page, "plans", CarouselOptions::default()).unwrap();
        let created_next = page.find("nextBtn").unwrap();
        c.update(Message::Destroy);
        assert!(c.is_destroyed());
        assert!(page.contains(supplied));
        assert!(!page.contains(created_next));
        assert!(page.find(DOTS_ID).is_none());
    }

    #[test]
    fn destroy_then_tick_does_nothing() {
        let (_, mut c) = carousel(3, auto(5000));
        let generation = c.timer.generation;
        c.destroy();
        assert!(c.subscriptions().is_empty());
        assert!(c.update(Message::AutoAdvance { generation }).is_none());
        c.update(Message::Next);
        c.update(Message::StartAutoSlide);
        assert_eq!(c.current_slide(), 0);
        assert!(c.subscriptions().is_empty());
    }
}
