//! CameraState - the camera pose, driven by a small movement state machine.
//!
//! Discrete input events switch the [`MotionState`] (through an injected [`TransitionTable`]),
//! while each tick integrates the continuous motion allowed by the current state:
//! velocity and translation with grid collisions, and rotation of the view.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display, strum_macros::EnumIter)]
pub enum MotionState {
    Resting,
    Moving,
    Turning,
    MovingAndTurning,
    Retarding,
    RetardingAndTurning,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display, strum_macros::EnumIter)]
pub enum MotionEvent {
    Move,
    Retard,
    StopMove,
    Turn,
    StopTurn,
}

/// Partial transition function. Pairs missing from the table leave the state unchanged.
#[derive(Clone, Debug, Default)]
pub struct TransitionTable(HashMap<(MotionState, MotionEvent), MotionState>);

impl TransitionTable {
    /// A table with no transitions at all.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// The standard movement table.
    pub fn standard() -> Self {
        use MotionEvent::*;
        use MotionState::*;

        Self::empty()
            .with(Resting, Turn, Turning)
            .with(Resting, Move, Moving)
            .with(Moving, Retard, Retarding)
            .with(Moving, Turn, MovingAndTurning)
            .with(Moving, StopMove, Resting)
            .with(Turning, StopTurn, Resting)
            .with(Turning, Move, MovingAndTurning)
            .with(MovingAndTurning, Retard, RetardingAndTurning)
            .with(MovingAndTurning, StopTurn, Moving)
            .with(MovingAndTurning, StopMove, Turning)
            .with(RetardingAndTurning, StopTurn, Retarding)
            .with(RetardingAndTurning, StopMove, Turning)
            .with(RetardingAndTurning, Move, MovingAndTurning)
            .with(Retarding, StopMove, Resting)
            .with(Retarding, Move, Moving)
            .with(Retarding, Turn, RetardingAndTurning)
    }

    pub fn with(mut self, from: MotionState, event: MotionEvent, to: MotionState) -> Self {
        self.0.insert((from, event), to);
        self
    }

    #[inline]
    pub fn contains(&self, from: MotionState, event: MotionEvent) -> bool {
        self.0.contains_key(&(from, event))
    }

    #[inline]
    pub fn next(&self, from: MotionState, event: MotionEvent) -> MotionState {
        self.0.get(&(from, event)).copied().unwrap_or(from)
    }
}

/// Movement tuning. Acceleration and velocity are per second,
/// while the turn rate is in radians per NANOSECOND.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Physics {
    pub acc_max: f64,
    pub v_max: f64,
    pub retard_factor: f64,
    pub turn_rate: f64,
}

impl Default for Physics {
    fn default() -> Self {
        Self {
            acc_max: ACC_MAX,
            v_max: V_MAX,
            retard_factor: RETARD_FACTOR,
            turn_rate: TURN_RATE,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CameraState {
    pos: Vector2,
    dir: Vector2,
    plane: Vector2,
    v: f64,
    a: f64,
    alpha: f64,
    facing: f64,
    state: MotionState,
    table: Arc<TransitionTable>,
    physics: Physics,
    last_dt: Duration,
}

impl CameraState {
    /// Camera at `pos`, with the default facing and field of view.
    pub fn new(pos: Vector2) -> Self {
        Self {
            pos,
            dir: Vector2::from(DEFAULT_DIR).normalized(),
            plane: Vector2::from(DEFAULT_PLANE),
            v: 0.0,
            a: 0.0,
            alpha: 0.0,
            facing: AHEAD,
            state: MotionState::Resting,
            table: Arc::new(TransitionTable::standard()),
            physics: Physics::default(),
            last_dt: Duration::ZERO,
        }
    }

    /// Camera in the centre of the given map cell.
    pub fn spawn(map: &GridMap, col: i32, row: i32) -> Result<Self, GridError> {
        Ok(Self::new(map.spawn_point(col, row)?))
    }

    pub fn with_table(mut self, table: Arc<TransitionTable>) -> Self {
        self.table = table;
        self
    }

    pub fn with_physics(mut self, physics: Physics) -> Self {
        self.physics = physics;
        self
    }

    /// Set the view direction (normalized here) and the camera plane vector.
    pub fn with_view(mut self, dir: Vector2, plane: Vector2) -> Self {
        self.dir = dir.normalized();
        self.plane = plane;
        self
    }

    #[inline]
    pub fn pos(&self) -> Vector2 {
        self.pos
    }

    #[inline]
    pub fn dir(&self) -> Vector2 {
        self.dir
    }

    #[inline]
    pub fn plane(&self) -> Vector2 {
        self.plane
    }

    #[inline]
    pub fn velocity(&self) -> f64 {
        self.v
    }

    #[inline]
    pub fn acceleration(&self) -> f64 {
        self.a
    }

    #[inline]
    pub fn angular_velocity(&self) -> f64 {
        self.alpha
    }

    #[inline]
    pub fn facing(&self) -> f64 {
        self.facing
    }

    #[inline]
    pub fn state(&self) -> MotionState {
        self.state
    }

    #[inline]
    pub fn physics(&self) -> &Physics {
        &self.physics
    }

    /// Frame rate, as measured by the last update.
    pub fn fps(&self) -> Option<f64> {
        if self.last_dt.is_zero() {
            None
        } else {
            Some(1.0 / self.last_dt.as_secs_f64())
        }
    }

    //------------------
    // state manipulation

    pub fn go_ahead(&mut self) {
        self.a = self.physics.acc_max;
        self.facing = AHEAD;
        self.fire(MotionEvent::Move);
    }

    pub fn reverse(&mut self) {
        self.a = self.physics.acc_max;
        self.facing = REVERSE;
        self.fire(MotionEvent::Move);
    }

    pub fn retard(&mut self) {
        self.a = -self.physics.retard_factor;
        self.fire(MotionEvent::Retard);
    }

    pub fn turn_left(&mut self) {
        self.alpha = -self.physics.turn_rate;
        self.fire(MotionEvent::Turn);
    }

    pub fn turn_right(&mut self) {
        self.alpha = self.physics.turn_rate;
        self.fire(MotionEvent::Turn);
    }

    pub fn stop_turning(&mut self) {
        self.alpha = 0.0;
        self.fire(MotionEvent::StopTurn);
    }

    /// Fold one input event into the state machine.
    pub fn handle_event(&mut self, event: &GameEvent) {
        trace!(tag = %event.tag(), point = ?event.point(), "input event");
        match event.tag() {
            EventTag::MoveForward => self.go_ahead(),
            EventTag::MoveBackward => self.reverse(),
            EventTag::TurnLeft => self.turn_left(),
            EventTag::TurnRight => self.turn_right(),
            EventTag::Decelerate => self.retard(),
            EventTag::StopTurning => self.stop_turning(),
            EventTag::PointerMove => {}
        }
    }

    /// Drain all pending input, then integrate the motion for `dt`.
    pub fn update(&mut self, dt: Duration, map: &GridMap, queue: &EventQueue) {
        for event in queue.drain() {
            self.handle_event(&event);
        }
        self.step(dt, map);
    }

    /// Integrate the motion for `dt`, according to the current state.
    pub fn step(&mut self, dt: Duration, map: &GridMap) {
        self.last_dt = dt;
        match self.state {
            MotionState::Resting => {}
            MotionState::Moving => self.move_step(dt, map),
            MotionState::Turning => self.turn_step(dt),
            MotionState::MovingAndTurning => {
                self.move_step(dt, map);
                self.turn_step(dt);
            }
            MotionState::Retarding => self.retard_step(dt, map),
            MotionState::RetardingAndTurning => {
                self.retard_step(dt, map);
                self.turn_step(dt);
            }
        }
    }

    //------------------
    //  Internal stuff

    fn fire(&mut self, event: MotionEvent) {
        let next = self.table.next(self.state, event);
        if next != self.state {
            debug!(from = %self.state, %event, to = %next, "motion transition");
        }
        self.state = next;
    }

    /// The only way back from moving to resting, besides hitting a wall.
    fn stop(&mut self) {
        self.a = 0.0;
        self.v = 0.0;
        self.facing = STOPPED;
        self.fire(MotionEvent::StopMove);
    }

    fn move_step(&mut self, dt: Duration, map: &GridMap) {
        let dts = dt.as_secs_f64();
        self.v = (self.v + self.a * dts).clamp(0.0, self.physics.v_max);

        // axes are checked separately, so the camera can slide along a wall
        let dx = self.dir.x() * self.facing * self.v;
        if map.is_open((self.pos.x() + dx).floor() as i32, self.pos.y().floor() as i32) {
            self.pos = Vector2::new(self.pos.x() + dx, self.pos.y());
        } else {
            self.stop();
        }

        let dy = self.dir.y() * self.facing * self.v;
        if map.is_open(self.pos.x().floor() as i32, (self.pos.y() + dy).floor() as i32) {
            self.pos = Vector2::new(self.pos.x(), self.pos.y() + dy);
        } else {
            self.stop();
        }
    }

    fn retard_step(&mut self, dt: Duration, map: &GridMap) {
        self.move_step(dt, map);
        if self.v == 0.0 {
            self.stop();
        }
    }

    fn turn_step(&mut self, dt: Duration) {
        // NOTE: alpha is per nanosecond, so it is multiplied by the RAW nanoseconds
        let r = self.alpha * dt.as_nanos() as f64;
        // both the direction and the camera plane must be rotated
        self.dir = self.dir.rotated(r);
        self.plane = self.plane.rotated(r);
    }
}

//-------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    const SECOND: Duration = Duration::from_secs(1);

    fn open_room() -> GridMap {
        // 20x20 room, walls only on the border
        let rows = (0..20)
            .map(|y| {
                (0..20)
                    .map(|x| if x == 0 || y == 0 || x == 19 || y == 19 { 1 } else { 0 })
                    .collect()
            })
            .collect();
        GridMap::new(rows).unwrap()
    }

    fn slow_physics() -> Physics {
        Physics {
            acc_max: 0.5,
            v_max: 1.0,
            retard_factor: 0.25,
            turn_rate: TURN_RATE,
        }
    }

    #[test]
    fn unlisted_pairs_are_no_ops() {
        let table = TransitionTable::standard();
        let mut unlisted = 0;
        for state in MotionState::iter() {
            for event in MotionEvent::iter() {
                if !table.contains(state, event) {
                    unlisted += 1;
                    assert_eq!(table.next(state, event), state, "({state}, {event})");
                    // applying it again changes nothing either
                    assert_eq!(table.next(table.next(state, event), event), state);
                }
            }
        }
        // 6 states x 5 events, 16 of them listed
        assert_eq!(unlisted, 30 - 16);
    }

    #[test]
    fn listed_transitions() {
        use MotionEvent::*;
        use MotionState::*;
        let t = TransitionTable::standard();
        assert_eq!(t.next(Resting, Move), Moving);
        assert_eq!(t.next(Moving, Turn), MovingAndTurning);
        assert_eq!(t.next(MovingAndTurning, StopMove), Turning);
        assert_eq!(t.next(RetardingAndTurning, Move), MovingAndTurning);
        assert_eq!(t.next(Retarding, StopMove), Resting);
        assert_eq!(t.next(Resting, StopMove), Resting);
        assert_eq!(t.next(Resting, Retard), Resting);
    }

    #[test]
    fn injected_table_is_used() {
        let table = Arc::new(TransitionTable::empty().with(
            MotionState::Resting,
            MotionEvent::Turn,
            MotionState::Turning,
        ));
        let mut cam = CameraState::new(Vector2::new(5.5, 5.5)).with_table(table);
        cam.go_ahead();
        assert_eq!(cam.state(), MotionState::Resting);
        cam.turn_left();
        assert_eq!(cam.state(), MotionState::Turning);
    }

    #[test]
    fn move_then_retard_returns_to_resting() {
        let map = open_room();
        let mut cam = CameraState::new(Vector2::new(10.5, 15.5)).with_physics(slow_physics());

        cam.go_ahead();
        cam.step(SECOND, &map);
        assert_eq!(cam.state(), MotionState::Moving);
        assert_eq!(cam.velocity(), 0.5);

        cam.retard();
        assert_eq!(cam.state(), MotionState::Retarding);
        // 0.5 -> 0.25 -> 0.0, in exactly 2 ticks
        cam.step(SECOND, &map);
        assert_eq!(cam.state(), MotionState::Retarding);
        assert_eq!(cam.velocity(), 0.25);
        cam.step(SECOND, &map);
        assert_eq!(cam.state(), MotionState::Resting);
        assert_eq!(cam.velocity(), 0.0);
        assert_eq!(cam.acceleration(), 0.0);

        // moved "up" by 0.5 + 0.25
        assert!((cam.pos().y() - 14.75).abs() < 1e-12);
        assert_eq!(cam.pos().x(), 10.5);
    }

    #[test]
    fn retard_reaches_resting_after_many_small_ticks() {
        let map = open_room();
        let mut cam = CameraState::new(Vector2::new(10.5, 18.5));
        cam.go_ahead();
        for _ in 0..10 {
            cam.step(Duration::from_millis(16), &map);
        }
        cam.retard();
        let mut ticks = 0;
        while cam.state() != MotionState::Resting && ticks < 1000 {
            cam.step(Duration::from_millis(16), &map);
            ticks += 1;
        }
        assert_eq!(cam.state(), MotionState::Resting);
    }

    #[test]
    fn velocity_stays_clamped() {
        let map = open_room();
        let mut rng = fastrand::Rng::with_seed(7);
        let physics = Physics {
            acc_max: 3.0,
            v_max: 0.2,
            retard_factor: 2.0,
            turn_rate: TURN_RATE,
        };
        let mut cam = CameraState::new(Vector2::new(10.5, 10.5)).with_physics(physics);
        for _ in 0..2000 {
            match rng.u8(0..8) {
                0 => cam.go_ahead(),
                1 => cam.reverse(),
                2 => cam.retard(),
                3 => cam.turn_left(),
                4 => cam.turn_right(),
                5 => cam.stop_turning(),
                _ => {}
            }
            cam.step(Duration::from_millis(rng.u64(1..200)), &map);
            assert!((0.0..=0.2).contains(&cam.velocity()), "v = {}", cam.velocity());
            let (cx, cy) = cam.pos().cell();
            assert!(map.is_open(cx, cy), "camera went into a wall at {:?}", cam.pos());
        }
    }

    #[test]
    fn reverse_moves_backwards_without_turning() {
        let map = open_room();
        let mut cam = CameraState::new(Vector2::new(10.5, 10.5)).with_physics(slow_physics());
        cam.reverse();
        cam.step(SECOND, &map);
        assert_eq!(cam.dir(), Vector2::new(0.0, -1.0));
        assert!((cam.pos().y() - 11.0).abs() < 1e-12);
    }

    #[test]
    fn blocked_move_stops_and_rests() {
        let map = open_room();
        let physics = Physics { acc_max: 1.0, ..slow_physics() };
        let mut cam = CameraState::new(Vector2::new(10.5, 1.5)).with_physics(physics);
        cam.go_ahead();
        // 1.5 - 1.0 lands in the border wall
        cam.step(SECOND, &map);
        assert_eq!(cam.state(), MotionState::Resting);
        assert_eq!(cam.velocity(), 0.0);
        assert_eq!(cam.facing(), STOPPED);
        assert_eq!(cam.pos(), Vector2::new(10.5, 1.5));
    }

    #[test]
    fn free_axis_moves_even_if_the_other_is_blocked() {
        let map = GridMap::parse("11111\n10010\n10010\n10000\n11111").unwrap();
        let dir = Vector2::new(1.0, 1.0);
        let physics = Physics { acc_max: 0.5, v_max: 0.5, ..slow_physics() };
        let mut cam = CameraState::new(Vector2::new(1.5, 3.8))
            .with_view(dir, dir.rotated_cw())
            .with_physics(physics);
        cam.go_ahead();
        cam.step(SECOND, &map);
        // x slides along the bottom wall, y would end up inside it
        let expected_x = 1.5 + 0.5 * std::f64::consts::FRAC_1_SQRT_2;
        assert!((cam.pos().x() - expected_x).abs() < 1e-12);
        assert_eq!(cam.pos().y(), 3.8);
        assert_eq!(cam.state(), MotionState::Resting);
    }

    #[test]
    fn turn_uses_nanoseconds() {
        let map = open_room();
        let mut cam = CameraState::new(Vector2::new(10.5, 10.5));
        cam.turn_right();
        // PI/2 per second => one second is a quarter turn
        cam.step(SECOND, &map);
        assert!((cam.dir().x() - 1.0).abs() < 1e-9, "dir = {:?}", cam.dir());
        assert!(cam.dir().y().abs() < 1e-9);
        assert!(cam.plane().x().abs() < 1e-9);
        assert!((cam.plane().y() - 0.66).abs() < 1e-9);
    }

    #[test]
    fn turn_left_rotates_the_other_way() {
        let map = open_room();
        let mut cam = CameraState::new(Vector2::new(10.5, 10.5));
        cam.turn_left();
        cam.step(Duration::from_millis(100), &map);
        assert!(cam.dir().x() < 0.0);
        cam.stop_turning();
        assert_eq!(cam.state(), MotionState::Resting);
        let dir = cam.dir();
        cam.step(SECOND, &map);
        assert_eq!(cam.dir(), dir);
    }

    #[test]
    fn many_small_turns_keep_the_view_geometry() {
        let map = open_room();
        let mut cam = CameraState::new(Vector2::new(10.5, 10.5));
        let plane_len = cam.plane().len();
        let angle0 = cam.dir().dot(cam.plane());
        cam.turn_right();
        for _ in 0..10_000 {
            cam.step(Duration::from_micros(16_667), &map);
        }
        assert!((cam.dir().norm() - 1.0).abs() < 1e-9);
        assert!((cam.plane().len() - plane_len).abs() < 1e-9);
        assert!((cam.dir().dot(cam.plane()) - angle0).abs() < 1e-9);
    }

    #[test]
    fn update_drains_queue_before_integrating() {
        let map = open_room();
        let queue = EventQueue::new();
        let mut cam = CameraState::new(Vector2::new(10.5, 10.5)).with_physics(slow_physics());
        queue.push(EventTag::MoveForward);
        queue.push(EventTag::TurnRight);
        queue.push_event(GameEvent::with_point(EventTag::PointerMove, Vector2::new(1.0, 2.0)));
        cam.update(SECOND, &map, &queue);
        assert!(queue.is_empty());
        assert_eq!(cam.state(), MotionState::MovingAndTurning);
        assert_eq!(cam.velocity(), 0.5);
        assert_eq!(cam.fps(), Some(1.0));
    }

    #[test]
    fn fps_unknown_before_first_update() {
        let cam = CameraState::new(Vector2::new(1.5, 1.5));
        assert_eq!(cam.fps(), None);
    }
}
