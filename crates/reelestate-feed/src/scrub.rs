//! Scrub bar gestures.
//!
//! Pointer positions over a horizontal track become a normalized position
//! in `[0, 1]` and then a timestamp. A press that never travels past the
//! drag threshold is a tap-to-seek at the press point; anything further is
//! a drag whose final position is sought on release.

use serde::Serialize;

use reelestate_shared::constants::DEFAULT_DRAG_THRESHOLD_PX;

/// Track bounds measured after layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackGeometry {
    pub left_x: f64,
    pub width: f64,
}

impl TrackGeometry {
    pub fn new(left_x: f64, width: f64) -> Self {
        Self { left_x, width }
    }

    /// `clamp((x - left) / width, 0, 1)`; a degenerate track maps to 0.
    pub fn normalized(&self, pointer_x: f64) -> f64 {
        if !(self.width.is_finite() && self.width > 0.0) || !pointer_x.is_finite() {
            return 0.0;
        }
        ((pointer_x - self.left_x) / self.width).clamp(0.0, 1.0)
    }
}

/// Timestamp for a normalized position, or `None` while the duration is
/// unknown (zero or non-finite) so pre-load scrubbing never seeks.
pub fn seek_target(position: f64, duration: f64) -> Option<f64> {
    if !duration.is_finite() || duration <= 0.0 {
        return None;
    }
    Some(position.clamp(0.0, 1.0) * duration)
}

/// How the progress fill should follow its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FillMode {
    /// Assign directly, tracking the finger with no lag.
    Immediate,
    /// Ease toward sampled values.
    #[default]
    Animated,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScrubState {
    pub is_dragging: bool,
    /// Last known normalized position.
    pub position: f64,
}

/// Position (and timestamp when the duration is known) during a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrubUpdate {
    pub position: f64,
    pub time: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeekCommand {
    pub position: f64,
    pub time: f64,
}

#[derive(Debug, Clone, Copy)]
struct Press {
    start_x: f64,
    moved: bool,
}

#[derive(Debug, Clone)]
pub struct ScrubControl {
    geometry: Option<TrackGeometry>,
    drag_threshold: f64,
    press: Option<Press>,
    state: ScrubState,
}

impl ScrubControl {
    pub fn new(drag_threshold: f64) -> Self {
        Self {
            geometry: None,
            drag_threshold: drag_threshold.max(0.0),
            press: None,
            state: ScrubState::default(),
        }
    }

    pub fn set_geometry(&mut self, geometry: TrackGeometry) {
        self.geometry = Some(geometry);
    }

    pub fn geometry(&self) -> Option<TrackGeometry> {
        self.geometry
    }

    pub fn state(&self) -> ScrubState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.state.is_dragging
    }

    pub fn fill_mode(&self) -> FillMode {
        match self.press {
            Some(press) if press.moved => FillMode::Immediate,
            _ => FillMode::Animated,
        }
    }

    /// Start a gesture. `None` until the track has been measured.
    pub fn pointer_down(&mut self, x: f64, duration: f64) -> Option<ScrubUpdate> {
        let geometry = self.geometry?;
        let position = geometry.normalized(x);
        self.press = Some(Press {
            start_x: x,
            moved: false,
        });
        self.state = ScrubState {
            is_dragging: true,
            position,
        };
        Some(ScrubUpdate {
            position,
            time: seek_target(position, duration),
        })
    }

    pub fn pointer_move(&mut self, x: f64, duration: f64) -> Option<ScrubUpdate> {
        let geometry = self.geometry?;
        let press = self.press.as_mut()?;
        if !press.moved && (x - press.start_x).abs() <= self.drag_threshold {
            return None;
        }
        press.moved = true;
        let position = geometry.normalized(x);
        self.state.position = position;
        Some(ScrubUpdate {
            position,
            time: seek_target(position, duration),
        })
    }

    /// End the gesture and produce the seek to issue, if any.
    pub fn pointer_up(&mut self, x: f64, duration: f64) -> Option<SeekCommand> {
        let press = self.press.take()?;
        self.state.is_dragging = false;
        let geometry = self.geometry?;

        // A tap seeks where it landed, ignoring release jitter.
        let moved = press.moved || (x - press.start_x).abs() > self.drag_threshold;
        let position = if moved {
            geometry.normalized(x)
        } else {
            geometry.normalized(press.start_x)
        };
        self.state.position = position;

        seek_target(position, duration).map(|time| SeekCommand { position, time })
    }

    /// Gesture cancelled by the system; no seek is issued.
    pub fn cancel(&mut self) {
        self.press = None;
        self.state.is_dragging = false;
    }
}

impl Default for ScrubControl {
    fn default() -> Self {
        Self::new(DEFAULT_DRAG_THRESHOLD_PX)
    }
}
