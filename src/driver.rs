use crate::camera::Camera;
use crate::events::GameObserver;
use crate::game::{Engine, GameSession, Phase, Rules, TickOutcome};
use crate::input::Intent;
use crate::mesh::BoardLayout;
use crate::scene::{Frame, build_frame};
use std::time::{Duration, Instant};

/// Gates moves on wall-clock time. Missed intervals are dropped, never replayed.
#[derive(Debug, Clone, Copy)]
pub struct MoveTimer {
    pub interval: Duration,
    last_move: Instant,
}

impl MoveTimer {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self { interval, last_move: now }
    }

    pub fn due(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_move) > self.interval {
            self.last_move = now;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self, now: Instant) {
        self.last_move = now;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Exit,
}

pub struct Driver {
    engine: Engine,
    timer: MoveTimer,
    camera: Camera,
    layout: BoardLayout,
    epoch: Instant,
}

impl Driver {
    pub fn new(
        engine: Engine,
        camera: Camera,
        layout: BoardLayout,
        interval: Duration,
        now: Instant,
    ) -> Self {
        Self {
            engine,
            timer: MoveTimer::new(interval, now),
            camera,
            layout,
            epoch: now,
        }
    }

    pub fn with_rules(
        rules: Rules,
        seed: Option<u64>,
        camera: Camera,
        cell_size: f32,
        interval: Duration,
        now: Instant,
    ) -> Self {
        let layout = BoardLayout::new(rules.grid_size, cell_size);
        Self::new(Engine::new(rules, seed), camera, layout, interval, now)
    }

    pub fn session(&self) -> &GameSession {
        self.engine.session()
    }

    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn subscribe(&mut self, observer: Box<dyn GameObserver>) {
        self.engine.subscribe(observer);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
    }

    pub fn handle_intent(&mut self, intent: Intent, now: Instant) -> Control {
        let phase = self.engine.session().phase;
        match intent {
            Intent::Quit => return Control::Exit,
            Intent::Turn(dir) if phase == Phase::Playing => {
                self.engine.set_pending_direction(dir);
            }
            Intent::Turn(_) => {}
            Intent::Start | Intent::Pause if matches!(phase, Phase::Idle | Phase::GameOver) => {
                if self.engine.start() {
                    self.timer.reset(now);
                }
            }
            Intent::Pause => {
                if self.engine.toggle_pause() == Some(Phase::Playing) {
                    self.timer.reset(now);
                }
            }
            Intent::Start => {}
        }
        Control::Continue
    }

    /// Applies at most one tick if the move interval has elapsed.
    pub fn update(&mut self, now: Instant) -> Option<TickOutcome> {
        if self.engine.session().phase != Phase::Playing {
            return None;
        }
        if !self.timer.due(now) {
            return None;
        }
        Some(self.engine.tick())
    }

    pub fn clock_ms(&self, now: Instant) -> f64 {
        now.saturating_duration_since(self.epoch).as_secs_f64() * 1000.0
    }

    pub fn frame(&self, now: Instant) -> Frame {
        build_frame(
            self.engine.session(),
            &self.layout,
            &self.camera.view_projection(),
            self.clock_ms(now),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Cell, Direction};
    use crate::scene::MeshKind;

    const STEP: Duration = Duration::from_millis(150);

    fn driver(now: Instant) -> Driver {
        Driver::with_rules(Rules::default(), Some(5), Camera::default(), 1.0, STEP, now)
    }

    #[test]
    fn timer_needs_strictly_more_than_interval() {
        let t0 = Instant::now();
        let mut timer = MoveTimer::new(STEP, t0);
        assert!(!timer.due(t0 + STEP));
        assert!(timer.due(t0 + STEP + Duration::from_millis(1)));
        assert!(!timer.due(t0 + STEP + Duration::from_millis(2)));
    }

    #[test]
    fn stalls_collapse_to_one_move() {
        let t0 = Instant::now();
        let mut d = driver(t0);
        d.handle_intent(Intent::Start, t0);
        let late = t0 + Duration::from_secs(2);
        assert!(d.update(late).is_some());
        assert!(d.update(late).is_none());
        assert_eq!(d.session().snake.head(), Some(Cell::new(1, 0)));
    }

    #[test]
    fn idle_ignores_turns_and_time() {
        let t0 = Instant::now();
        let mut d = driver(t0);
        d.handle_intent(Intent::Turn(Direction::Up), t0);
        assert_eq!(d.update(t0 + Duration::from_secs(1)), None);
        assert_eq!(d.session().phase, Phase::Idle);
    }

    #[test]
    fn pause_key_starts_from_idle_then_toggles() {
        let t0 = Instant::now();
        let mut d = driver(t0);
        d.handle_intent(Intent::Pause, t0);
        assert_eq!(d.session().phase, Phase::Playing);
        d.handle_intent(Intent::Pause, t0);
        assert_eq!(d.session().phase, Phase::Paused);
        assert_eq!(d.update(t0 + Duration::from_secs(1)), None);
        d.handle_intent(Intent::Pause, t0 + Duration::from_secs(1));
        assert_eq!(d.session().phase, Phase::Playing);
    }

    #[test]
    fn resume_restarts_the_move_clock() {
        let t0 = Instant::now();
        let mut d = driver(t0);
        d.handle_intent(Intent::Start, t0);
        d.handle_intent(Intent::Pause, t0);
        let resume = t0 + Duration::from_secs(5);
        d.handle_intent(Intent::Pause, resume);
        assert!(d.update(resume + Duration::from_millis(100)).is_none());
        assert!(d.update(resume + Duration::from_millis(151)).is_some());
    }

    #[test]
    fn start_is_ignored_mid_round() {
        let t0 = Instant::now();
        let mut d = driver(t0);
        d.handle_intent(Intent::Start, t0);
        d.update(t0 + Duration::from_millis(151));
        let head = d.session().snake.head();
        d.handle_intent(Intent::Start, t0 + Duration::from_millis(160));
        assert_eq!(d.session().snake.head(), head);
    }

    #[test]
    fn turns_apply_on_next_tick() {
        let t0 = Instant::now();
        let mut d = driver(t0);
        d.handle_intent(Intent::Start, t0);
        d.handle_intent(Intent::Turn(Direction::Down), t0);
        assert_eq!(d.session().direction, Direction::Right);
        d.update(t0 + Duration::from_millis(151));
        assert_eq!(d.session().direction, Direction::Down);
        assert_eq!(d.session().snake.head(), Some(Cell::new(0, 1)));
    }

    #[test]
    fn quit_exits() {
        let t0 = Instant::now();
        let mut d = driver(t0);
        assert_eq!(d.handle_intent(Intent::Quit, t0), Control::Exit);
        assert_eq!(d.handle_intent(Intent::Turn(Direction::Up), t0), Control::Continue);
    }

    #[test]
    fn frame_reflects_state_after_update() {
        let t0 = Instant::now();
        let mut d = driver(t0);
        assert_eq!(d.frame(t0).draws.len(), 2);
        d.handle_intent(Intent::Start, t0);
        let cubes = d.frame(t0).draws.iter().filter(|c| c.mesh == MeshKind::Cube).count();
        assert_eq!(cubes, 4);
    }
}
