//! Navigation bar with dropdown groups.
//!
//! The navbar reads its structure from the [`Page`]: a `.navbar` element
//! holding `.dropdown-parent` groups, each with a `.dropdown-toggle` label
//! and a `.dropdown` list of links, plus an optional `#mobile-toggle` element
//! standing for the mobile menu switch.
//!
//! In the mobile regime (viewport width at or below the breakpoint) groups
//! open on click, at most one at a time. Clicking outside the navbar closes
//! them, and following a dropdown link closes every group and the mobile
//! menu. Above the breakpoint groups never open through this controller;
//! their links show on hover instead, and resizing into that regime clears
//! any open state. Open groups carry the `dropdown-open` class and an open
//! mobile menu sets `checked` on `#mobile-toggle`.
//!
//! A navbar starts pending. Send [`Message::Ready`] once the markup is in the
//! page; if nothing is found yet the navbar schedules another attempt.

use crate::text::{display_width, single_line, truncate};
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;
use std::cell::RefCell;
use std::time::Duration;
use vitrine_core::{Breakpoint, Command, Component, NodeKey, Page};

/// Class mirrored onto each open group's `.dropdown-parent`.
pub const OPEN_CLASS: &str = "dropdown-open";
/// Id of the mobile menu switch.
pub const MOBILE_TOGGLE_ID: &str = "mobile-toggle";

/// Messages for the navbar.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Markup may now be present; attach if not attached yet.
    Ready,
    /// Toggle the group at this index.
    Toggle(usize),
    /// A click the host observed on a page element.
    Click(NodeKey),
    /// A click outside the navbar.
    ClickOutside,
    /// Flip the mobile menu.
    ToggleMobileMenu,
    /// New viewport width.
    Resize(u16),
    KeyPress(KeyEvent),
    Mouse(MouseEvent),
    /// Emitted when a link is followed. The navbar ignores it; hosts
    /// intercept it.
    Navigate(String),
}

/// Options for a [`Navbar`].
#[derive(Debug, Clone)]
pub struct NavbarOptions {
    pub breakpoint: Breakpoint,
    /// Delay before retrying a [`Message::Ready`] that found no markup.
    pub retry_delay: Duration,
    /// Attempts before the navbar stops scheduling retries on its own.
    pub max_attempts: u32,
}

impl Default for NavbarOptions {
    fn default() -> Self {
        Self {
            breakpoint: Breakpoint::default(),
            retry_delay: Duration::from_millis(100),
            max_attempts: 50,
        }
    }
}

impl NavbarOptions {
    pub fn with_breakpoint(mut self, breakpoint: Breakpoint) -> Self {
        self.breakpoint = breakpoint;
        self
    }

    pub fn with_retry(mut self, delay: Duration, max_attempts: u32) -> Self {
        self.retry_delay = delay;
        self.max_attempts = max_attempts;
        self
    }
}

/// Visual style for the navbar.
#[derive(Debug, Clone)]
pub struct NavbarStyle {
    pub item: Style,
    pub open: Style,
    pub link: Style,
    pub focused: Style,
    pub menu_toggle: Style,
    pub dropdown_border: Style,
}

impl Default for NavbarStyle {
    fn default() -> Self {
        Self {
            item: Style::default().fg(Color::White),
            open: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            link: Style::default().fg(Color::Gray),
            focused: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan),
            menu_toggle: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            dropdown_border: Style::default().fg(Color::DarkGray),
        }
    }
}

#[derive(Debug, Clone)]
struct Group {
    parent: NodeKey,
    toggle: Option<NodeKey>,
    links: Vec<NodeKey>,
}

#[derive(Debug, Clone)]
struct Structure {
    navbar: Option<NodeKey>,
    groups: Vec<Group>,
    links: Vec<NodeKey>,
    mobile_toggle: Option<NodeKey>,
}

#[derive(Debug, Clone)]
enum State {
    Pending { attempts: u32 },
    Attached(Structure),
}

/// What a click landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    MenuToggle,
    Group(usize),
    DropdownLink(NodeKey),
    Link(NodeKey),
    Inside,
    Outside,
}

#[derive(Debug, Default)]
struct HitMap {
    area: Rect,
    targets: Vec<(Rect, Target)>,
}

/// Dropdown navigation controller.
pub struct Navbar {
    page: Page,
    options: NavbarOptions,
    state: State,
    width: Option<u16>,
    open: Option<usize>,
    menu_open: bool,
    hovered: Option<usize>,
    cursor: usize,
    focus: bool,
    style: NavbarStyle,
    hits: RefCell<HitMap>,
}

impl Navbar {
    /// A pending navbar over `page`.
    pub fn new(page: &Page, options: NavbarOptions) -> Self {
        Self {
            page: page.clone(),
            options,
            state: State::Pending { attempts: 0 },
            width: None,
            open: None,
            menu_open: false,
            hovered: None,
            cursor: 0,
            focus: false,
            style: NavbarStyle::default(),
            hits: RefCell::new(HitMap::default()),
        }
    }

    pub fn with_style(mut self, style: NavbarStyle) -> Self {
        self.style = style;
        self
    }

    /// A command delivering [`Message::Ready`] after `delay`.
    pub fn ready_after(delay: Duration) -> Command<Message> {
        Command::tick(delay, |_| Message::Ready)
    }

    pub fn focus(&mut self) {
        self.focus = true;
    }

    pub fn blur(&mut self) {
        self.focus = false;
    }

    pub fn is_attached(&self) -> bool {
        matches!(self.state, State::Attached(_))
    }

    /// Number of dropdown groups found at attach.
    pub fn group_count(&self) -> usize {
        self.structure().map_or(0, |s| s.groups.len())
    }

    /// The `.dropdown-parent` element of each group.
    pub fn group_elements(&self) -> Vec<NodeKey> {
        self.structure()
            .map(|s| s.groups.iter().map(|g| g.parent).collect())
            .unwrap_or_default()
    }

    pub fn open_group(&self) -> Option<usize> {
        self.open
    }

    pub fn is_open(&self, index: usize) -> bool {
        self.open == Some(index)
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu_open
    }

    /// Whether the last reported width is in the mobile regime. Unknown
    /// width counts as desktop.
    pub fn is_mobile(&self) -> bool {
        self.width
            .is_some_and(|w| self.options.breakpoint.is_mobile(w))
    }

    fn structure(&self) -> Option<&Structure> {
        match &self.state {
            State::Attached(s) => Some(s),
            State::Pending { .. } => None,
        }
    }

    // --- attach ---

    fn ready(&mut self) -> Command<Message> {
        let attempts = match &self.state {
            State::Attached(_) => {
                tracing::debug!("navbar already attached");
                return Command::none();
            }
            State::Pending { attempts } => attempts + 1,
        };
        match self.scan() {
            Some(structure) => {
                tracing::debug!(groups = structure.groups.len(), "navbar attached");
                self.state = State::Attached(structure);
                self.sync_page();
                Command::none()
            }
            None if attempts < self.options.max_attempts => {
                tracing::debug!(attempts, "navbar elements not found; retrying");
                self.state = State::Pending { attempts };
                Self::ready_after(self.options.retry_delay)
            }
            None => {
                tracing::debug!(attempts, "navbar elements not found");
                self.state = State::Pending { attempts };
                Command::none()
            }
        }
    }

    fn scan(&self) -> Option<Structure> {
        let page = &self.page;
        let body = page.body();
        let navbar = page.query_class(body, &["navbar"]);
        let scope = navbar.unwrap_or(body);
        let parents = page.query_all(scope, |el| el.has_class("dropdown-parent"));
        if parents.is_empty() {
            return None;
        }

        let groups: Vec<Group> = parents
            .into_iter()
            .map(|parent| Group {
                parent,
                toggle: page.query_class(parent, &["dropdown-toggle"]),
                links: page
                    .query_all(parent, |el| el.tag() == "a")
                    .into_iter()
                    .filter(|link| {
                        page.closest(*link, |el| el.has_class("dropdown"))
                            .is_some_and(|list| page.is_within(list, parent))
                    })
                    .collect(),
            })
            .collect();

        let links = navbar
            .map(|nav| {
                page.query_all(nav, |el| el.tag() == "a" && !el.has_class("dropdown-toggle"))
                    .into_iter()
                    .filter(|link| !groups.iter().any(|g| page.is_within(*link, g.parent)))
                    .collect()
            })
            .unwrap_or_default();

        Some(Structure {
            navbar,
            groups,
            links,
            mobile_toggle: page.find(MOBILE_TOGGLE_ID),
        })
    }

    // --- state ---

    /// In the mobile regime, open group `index` (closing any other) or close
    /// it if it is already open.
    pub fn toggle_group(&mut self, index: usize) {
        if !self.is_mobile() || index >= self.group_count() {
            return;
        }
        self.open = if self.open == Some(index) {
            None
        } else {
            Some(index)
        };
        self.cursor = index;
        tracing::debug!(group = index, open = self.open.is_some(), "dropdown toggled");
        self.sync_page();
    }

    pub fn close_all(&mut self) {
        self.open = None;
        self.sync_page();
    }

    pub fn set_menu_open(&mut self, open: bool) {
        self.menu_open = open;
        self.sync_page();
    }

    fn resize(&mut self, width: u16) {
        let previous = self.width.replace(width);
        if let Some(class) = previous.and_then(|from| self.options.breakpoint.crossed(from, width)) {
            tracing::debug!(?class, "navbar viewport changed");
        }
        if !self.options.breakpoint.is_mobile(width) {
            self.open = None;
            self.menu_open = false;
            self.sync_page();
        }
    }

    fn follow(&mut self, link: NodeKey, in_dropdown: bool) -> Command<Message> {
        if in_dropdown && self.is_mobile() {
            self.open = None;
            self.menu_open = false;
            self.sync_page();
        }
        self.hovered = None;
        match self.page.attr(link, "href") {
            Some(href) => Command::message(Message::Navigate(href)),
            None => Command::none(),
        }
    }

    /// Mirror open state into the page.
    fn sync_page(&self) {
        let Some(structure) = self.structure() else {
            return;
        };
        for (i, group) in structure.groups.iter().enumerate() {
            self.page
                .toggle_class(group.parent, OPEN_CLASS, self.open == Some(i));
        }
        if let Some(toggle) = structure.mobile_toggle {
            if self.menu_open {
                self.page.set_attr(toggle, "checked", "");
            } else {
                self.page.remove_attr(toggle, "checked");
            }
        }
    }

    fn target_of(&self, key: NodeKey) -> Target {
        let Some(structure) = self.structure() else {
            return Target::Outside;
        };
        let page = &self.page;
        if structure.mobile_toggle == Some(key) {
            return Target::MenuToggle;
        }
        if let Some(i) = structure
            .groups
            .iter()
            .position(|g| g.toggle.is_some_and(|t| page.is_within(key, t)))
        {
            return Target::Group(i);
        }
        for group in &structure.groups {
            if let Some(link) = group.links.iter().find(|l| page.is_within(key, **l)) {
                return Target::DropdownLink(*link);
            }
        }
        if let Some(link) = structure.links.iter().find(|l| page.is_within(key, **l)) {
            return Target::Link(*link);
        }
        match structure.navbar {
            Some(nav) if page.is_within(key, nav) => Target::Inside,
            _ => Target::Outside,
        }
    }

    fn apply(&mut self, target: Target) -> Command<Message> {
        match target {
            Target::MenuToggle => self.set_menu_open(!self.menu_open),
            Target::Group(i) => self.toggle_group(i),
            Target::DropdownLink(link) => return self.follow(link, true),
            Target::Link(link) => return self.follow(link, false),
            Target::Inside => {}
            Target::Outside => {
                self.hovered = None;
                if self.is_mobile() && self.open.is_some() {
                    self.close_all();
                }
            }
        }
        Command::none()
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let count = self.group_count();
        if !self.is_mobile() || count == 0 {
            return;
        }
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.cursor = (self.cursor + count - 1) % count,
            KeyCode::Right | KeyCode::Char('l') => self.cursor = (self.cursor + 1) % count,
            KeyCode::Enter => self.toggle_group(self.cursor),
            KeyCode::Esc => self.close_all(),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent) -> Command<Message> {
        let pos = Position::new(event.column, event.row);
        let target = {
            let hits = self.hits.borrow();
            if !hits.area.contains(pos) {
                Target::Outside
            } else {
                hits.targets
                    .iter()
                    .find(|(rect, _)| rect.contains(pos))
                    .map_or(Target::Inside, |(_, t)| *t)
            }
        };
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => self.apply(target),
            MouseEventKind::Moved if !self.is_mobile() => {
                match target {
                    Target::Group(i) => self.hovered = Some(i),
                    Target::DropdownLink(_) => {}
                    _ => self.hovered = None,
                }
                Command::none()
            }
            _ => Command::none(),
        }
    }

    // --- drawing ---

    fn label(&self, key: NodeKey) -> String {
        self.page
            .text_lines(key)
            .first()
            .map(|(_, text)| single_line(text))
            .unwrap_or_default()
    }

    fn group_label(&self, group: &Group) -> String {
        self.label(group.toggle.unwrap_or(group.parent))
    }

    fn draw_text(&self, frame: &mut Frame, rect: Rect, text: &str, style: Style) {
        let text = truncate(text, rect.width as usize, "…");
        frame.render_widget(Paragraph::new(Span::styled(text, style)), rect);
    }

    fn view_desktop(&self, frame: &mut Frame, area: Rect, structure: &Structure, hits: &mut HitMap) {
        let mut x = area.x;
        let mut dropdown = None;
        let items = structure
            .groups
            .iter()
            .enumerate()
            .map(|(i, g)| (format!("{} ▾", self.group_label(g)), Target::Group(i)))
            .chain(
                structure
                    .links
                    .iter()
                    .map(|l| (self.label(*l), Target::Link(*l))),
            );
        for (text, target) in items {
            if x >= area.right() {
                break;
            }
            let width = (display_width(&text) as u16).min(area.right() - x);
            let rect = Rect::new(x, area.y, width, 1);
            let style = match target {
                Target::Group(i) if self.hovered == Some(i) => self.style.open,
                _ => self.style.item,
            };
            self.draw_text(frame, rect, &text, style);
            hits.targets.push((rect, target));
            if let Target::Group(i) = target {
                if self.hovered == Some(i) {
                    dropdown = Some((i, rect.x));
                }
            }
            x = x.saturating_add(width + 2);
        }

        if let Some((i, left)) = dropdown {
            self.view_dropdown(frame, area, left, &structure.groups[i], hits);
        }
    }

    fn view_dropdown(&self, frame: &mut Frame, area: Rect, left: u16, group: &Group, hits: &mut HitMap) {
        let labels: Vec<String> = group.links.iter().map(|l| self.label(*l)).collect();
        let widest = labels.iter().map(|l| display_width(l)).max().unwrap_or(0) as u16;
        let top = area.y + 1;
        if top >= area.bottom() || left >= area.right() {
            return;
        }
        let width = (widest + 4).min(area.right() - left);
        let height = (labels.len() as u16 + 2).min(area.bottom() - top);
        let rect = Rect::new(left, top, width, height);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.style.dropdown_border);
        let inner = block.inner(rect);
        frame.render_widget(Clear, rect);
        frame.render_widget(block, rect);
        for (row, (link, label)) in group
            .links
            .iter()
            .zip(labels)
            .take(inner.height as usize)
            .enumerate()
        {
            let line = Rect::new(inner.x + 1, inner.y + row as u16, inner.width.saturating_sub(1), 1);
            self.draw_text(frame, line, &label, self.style.link);
            hits.targets.push((line, Target::DropdownLink(*link)));
        }
        hits.targets.push((rect, Target::Inside));
    }

    fn view_mobile(&self, frame: &mut Frame, area: Rect, structure: &Structure, hits: &mut HitMap) {
        let toggle = if self.menu_open { "✕ Menu" } else { "☰ Menu" };
        let rect = Rect::new(area.x, area.y, area.width, 1);
        self.draw_text(frame, rect, toggle, self.style.menu_toggle);
        hits.targets.push((rect, Target::MenuToggle));
        if !self.menu_open {
            return;
        }

        let mut rows: Vec<(String, Style, Target, u16)> = Vec::new();
        for (i, group) in structure.groups.iter().enumerate() {
            let open = self.open == Some(i);
            let marker = if open { "▾" } else { "▸" };
            let style = if self.focus && self.cursor == i {
                self.style.focused
            } else if open {
                self.style.open
            } else {
                self.style.item
            };
            rows.push((format!("{marker} {}", self.group_label(group)), style, Target::Group(i), 1));
            if open {
                for link in &group.links {
                    rows.push((self.label(*link), self.style.link, Target::DropdownLink(*link), 4));
                }
            }
        }
        for link in &structure.links {
            rows.push((self.label(*link), self.style.item, Target::Link(*link), 1));
        }

        let available = area.height.saturating_sub(1) as usize;
        for (row, (text, style, target, indent)) in rows.into_iter().take(available).enumerate() {
            let y = area.y + 1 + row as u16;
            let indent = indent.min(area.width);
            let rect = Rect::new(area.x + indent, y, area.width - indent, 1);
            self.draw_text(frame, rect, &text, style);
            hits.targets.push((rect, target));
        }
    }
}

impl Component for Navbar {
    type Message = Message;

    fn update(&mut self, msg: Message) -> Command<Message> {
        if let Message::Ready = msg {
            return self.ready();
        }
        if let Message::Resize(width) = msg {
            self.resize(width);
            return Command::none();
        }
        if !self.is_attached() {
            return Command::none();
        }
        match msg {
            Message::Toggle(index) => self.toggle_group(index),
            Message::Click(key) => {
                let target = self.target_of(key);
                return self.apply(target);
            }
            Message::ClickOutside => return self.apply(Target::Outside),
            Message::ToggleMobileMenu => self.set_menu_open(!self.menu_open),
            Message::KeyPress(key) if self.focus => self.handle_key(key),
            Message::Mouse(event) => return self.handle_mouse(event),
            _ => {}
        }
        Command::none()
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        let mut hits = HitMap {
            area,
            targets: Vec::new(),
        };
        let structure = self.structure().filter(|_| area.width > 0 && area.height > 0);
        if let Some(structure) = structure {
            if self.is_mobile() {
                self.view_mobile(frame, area, structure, &mut hits);
            } else {
                self.view_desktop(frame, area, structure, &mut hits);
            }
        }
        *self.hits.borrow_mut() = hits;
    }

    fn focused(&self) -> bool {
        self.focus
    }
}
