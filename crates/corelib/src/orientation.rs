//! Turntable controller: three buttons, three target rotations, one smoothed
//! transition at constant angular speed.

use crate::Quat;
use crate::bottom_bar::{BottomBarLabels, Direction};
use crate::transform::{Transform, angle_between_deg, pinned_pose, pinned_yaw_deg, rotate_towards};

/// Default angular speed in degrees per second.
pub const DEFAULT_SPEED_DEG: f32 = 150.0;

/// Below this angle (degrees) the transform snaps onto the target.
pub const SNAP_EPSILON_DEG: f32 = 0.01;

/// Yaw change applied by the side buttons.
const SIDE_STEP_DEG: f32 = 90.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionState {
    Idle,
    Rotating,
}

#[derive(Clone, Debug)]
pub struct OrientationController {
    initial: Quat,
    target: Quat,
    state: MotionState,
    speed_deg: f32,
    labels: BottomBarLabels,
}

impl OrientationController {
    /// Record the object's starting rotation as the front pose.
    pub fn new(initial_rotation: Quat) -> Self {
        Self {
            initial: initial_rotation,
            target: initial_rotation,
            state: MotionState::Idle,
            speed_deg: DEFAULT_SPEED_DEG,
            labels: BottomBarLabels::new(),
        }
    }

    pub fn with_speed(mut self, speed_deg_per_sec: f32) -> Self {
        self.speed_deg = speed_deg_per_sec.max(0.0);
        self
    }

    /// Retarget toward `direction` and highlight its label.
    ///
    /// Side targets are derived from the transform's *current* rotation, so
    /// pressing Left twice turns 180 degrees and a press mid-transition starts
    /// from wherever the object is.
    pub fn activate(&mut self, direction: Direction, transform: &Transform) {
        self.target = match direction {
            Direction::Front => self.initial,
            Direction::Left => pinned_pose(pinned_yaw_deg(transform.rotation) - SIDE_STEP_DEG),
            Direction::Right => pinned_pose(pinned_yaw_deg(transform.rotation) + SIDE_STEP_DEG),
        };
        self.state = MotionState::Rotating;
        self.labels.select(direction);
        log::debug!("facing {direction}, target {:?}", self.target);
    }

    /// Advance the transition by `dt` seconds. Returns `true` while rotating.
    pub fn update(&mut self, transform: &mut Transform, dt: f32) -> bool {
        if self.state == MotionState::Idle {
            return false;
        }
        let step = self.speed_deg * dt.max(0.0);
        transform.rotation = rotate_towards(transform.rotation, self.target, step);
        if angle_between_deg(transform.rotation, self.target) < SNAP_EPSILON_DEG {
            transform.rotation = self.target;
            self.state = MotionState::Idle;
        }
        self.state == MotionState::Rotating
    }

    #[inline]
    pub fn target(&self) -> Quat {
        self.target
    }

    #[inline]
    pub fn initial_rotation(&self) -> Quat {
        self.initial
    }

    #[inline]
    pub fn state(&self) -> MotionState {
        self.state
    }

    #[inline]
    pub fn is_rotating(&self) -> bool {
        self.state == MotionState::Rotating
    }

    #[inline]
    pub fn speed_deg_per_sec(&self) -> f32 {
        self.speed_deg
    }

    #[inline]
    pub fn labels(&self) -> &BottomBarLabels {
        &self.labels
    }
}
