//! Tap / drag / scroll disambiguation for press-move-release sequences.
//!
//! A [`Recognizer`] tracks one sequence at a time. Movement is classified as a
//! horizontal drag only once it clearly dominates vertical movement, so a
//! mostly vertical gesture is left to scroll the host. On release a drag long
//! enough becomes a swipe; a sequence that never moved becomes a tap.

/// A position in host units (pixels, or terminal cells).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Thresholds for classifying a sequence, in the same units as [`Point`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    /// Displacement on either axis beyond which the sequence is no longer a
    /// tap.
    pub move_threshold: f32,
    /// Horizontal displacement beyond which a move can become a drag.
    pub drag_threshold: f32,
    /// How many times larger horizontal displacement must be than vertical
    /// for a move to count as a drag.
    pub drag_ratio: f32,
    /// Horizontal displacement a drag must exceed at release to swipe.
    pub swipe_threshold: f32,
    /// Horizontal-to-vertical dominance required at release to swipe.
    pub swipe_ratio: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            move_threshold: 10.0,
            drag_threshold: 15.0,
            drag_ratio: 1.5,
            swipe_threshold: 80.0,
            swipe_ratio: 2.0,
        }
    }
}

impl GestureConfig {
    /// Thresholds scaled for terminal cells.
    pub fn cells() -> Self {
        Self {
            move_threshold: 1.0,
            drag_threshold: 2.0,
            drag_ratio: 1.5,
            swipe_threshold: 6.0,
            swipe_ratio: 2.0,
        }
    }

    pub fn with_swipe_threshold(mut self, threshold: f32) -> Self {
        self.swipe_threshold = threshold;
        self
    }

    pub fn with_move_threshold(mut self, threshold: f32) -> Self {
        self.move_threshold = threshold;
        self
    }

    pub fn with_drag_threshold(mut self, threshold: f32) -> Self {
        self.drag_threshold = threshold;
        self
    }
}

/// Direction a swipe asks the carousel to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    /// Content dragged toward the left: advance.
    Next,
    /// Content dragged toward the right: go back.
    Prev,
}

/// What a move did to the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveUpdate {
    /// Not (or not yet) a horizontal drag; the host may scroll.
    PassThrough,
    /// The sequence is a horizontal drag; the host should not scroll.
    SuppressScroll,
}

/// How a finished sequence was classified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    /// A horizontal swipe.
    Swipe(SwipeDirection),
    /// No meaningful movement; carries the point where the sequence started.
    Tap(Point),
    /// Movement that was neither (a scroll, or a drag too short to swipe).
    Ignored,
}

#[derive(Debug, Clone, Copy)]
struct GestureState {
    start: Point,
    is_dragging: bool,
    has_moved: bool,
}

/// Per-sequence gesture state machine.
#[derive(Debug, Clone)]
pub struct Recognizer {
    config: GestureConfig,
    state: Option<GestureState>,
}

impl Recognizer {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Whether a sequence is in progress.
    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.state.is_some_and(|s| s.is_dragging)
    }

    pub fn has_moved(&self) -> bool {
        self.state.is_some_and(|s| s.has_moved)
    }

    /// Begin a sequence at `point`, discarding any unfinished one.
    pub fn start(&mut self, point: Point) {
        self.state = Some(GestureState {
            start: point,
            is_dragging: false,
            has_moved: false,
        });
    }

    /// Feed a new position. Moves outside a sequence are ignored.
    pub fn move_to(&mut self, point: Point) -> MoveUpdate {
        let config = self.config;
        let Some(state) = self.state.as_mut() else {
            return MoveUpdate::PassThrough;
        };

        let dx = (point.x - state.start.x).abs();
        let dy = (point.y - state.start.y).abs();

        if dx > config.move_threshold || dy > config.move_threshold {
            state.has_moved = true;
        }
        if dx > config.drag_threshold && dx > dy * config.drag_ratio {
            state.is_dragging = true;
        }

        if state.is_dragging {
            MoveUpdate::SuppressScroll
        } else {
            MoveUpdate::PassThrough
        }
    }

    /// Finish the sequence at `point`. Returns `None` if no sequence was in
    /// progress.
    pub fn end(&mut self, point: Point) -> Option<GestureOutcome> {
        let state = self.state.take()?;
        let diff_x = state.start.x - point.x;
        let diff_y = (state.start.y - point.y).abs();

        let outcome = if state.is_dragging
            && diff_x.abs() > self.config.swipe_threshold
            && diff_x.abs() > diff_y * self.config.swipe_ratio
        {
            if diff_x > 0.0 {
                GestureOutcome::Swipe(SwipeDirection::Next)
            } else {
                GestureOutcome::Swipe(SwipeDirection::Prev)
            }
        } else if !state.has_moved {
            GestureOutcome::Tap(state.start)
        } else {
            GestureOutcome::Ignored
        };
        Some(outcome)
    }

    /// Drop the current sequence without classifying it.
    pub fn cancel(&mut self) {
        self.state = None;
    }
}
