use crate::events::{GameEvent, GameObserver};
use ahash::AHashSet;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

pub const DEFAULT_GRID_SIZE: u32 = 12;
pub const FOOD_REWARD: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x + dx, self.y + dy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Grid delta; Up is towards negative y.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Head-first body plus an occupancy index for O(1) hit tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snake {
    body: VecDeque<Cell>,
    occupied: AHashSet<Cell>,
}

impl Snake {
    pub fn from_cells<I: IntoIterator<Item = Cell>>(cells: I) -> Self {
        let mut snake = Self::default();
        for c in cells {
            snake.body.push_back(c);
            snake.occupied.insert(c);
        }
        snake
    }

    pub fn head(&self) -> Option<Cell> {
        self.body.front().copied()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn contains(&self, c: Cell) -> bool {
        self.occupied.contains(&c)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.body.iter()
    }

    pub fn cells(&self) -> Vec<Cell> {
        self.body.iter().copied().collect()
    }

    fn push_front(&mut self, c: Cell) {
        self.body.push_front(c);
        self.occupied.insert(c);
    }

    fn pop_back(&mut self) -> Option<Cell> {
        let tail = self.body.pop_back()?;
        self.occupied.remove(&tail);
        Some(tail)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Playing,
    Paused,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    Wall,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not playing; nothing happened.
    Skipped,
    Moved,
    Ate { score: u32 },
    Collided(Collision),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    pub grid_size: u32,
    pub food_reward: u32,
}

impl Rules {
    pub fn limit(&self) -> i32 {
        (self.grid_size / 2) as i32
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            food_reward: FOOD_REWARD,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameSession {
    pub snake: Snake,
    pub direction: Direction,
    pub pending_direction: Direction,
    pub food: Option<Cell>,
    pub score: u32,
    pub phase: Phase,
    /// Cells are valid in `[-limit, limit)` on both axes.
    pub limit: i32,
}

impl GameSession {
    pub fn new(limit: i32) -> Self {
        Self {
            snake: Snake::default(),
            direction: Direction::Right,
            pending_direction: Direction::Right,
            food: None,
            score: 0,
            phase: Phase::Idle,
            limit,
        }
    }

    /// A session already in play with the given body, head first.
    pub fn from_parts(
        cells: impl IntoIterator<Item = Cell>,
        direction: Direction,
        food: Option<Cell>,
        limit: i32,
    ) -> Self {
        Self {
            snake: Snake::from_cells(cells),
            direction,
            pending_direction: direction,
            food,
            score: 0,
            phase: Phase::Playing,
            limit,
        }
    }

    pub fn in_bounds(&self, c: Cell) -> bool {
        (-self.limit..self.limit).contains(&c.x) && (-self.limit..self.limit).contains(&c.y)
    }

    pub fn cell_count(&self) -> usize {
        let side = (self.limit * 2) as usize;
        side * side
    }

    /// Latches the direction for the next tick unless it would reverse
    /// the committed one. Returns whether the input was accepted.
    pub fn set_pending_direction(&mut self, dir: Direction) -> bool {
        if dir == self.direction.opposite() {
            return false;
        }
        self.pending_direction = dir;
        true
    }
}

/// Owns the session and applies every state transition to it.
pub struct Engine {
    session: GameSession,
    rules: Rules,
    rng: SmallRng,
    observers: Vec<Box<dyn GameObserver>>,
}

impl Engine {
    pub fn new(rules: Rules, seed: Option<u64>) -> Self {
        Self::with_session(GameSession::new(rules.limit()), rules, seed)
    }

    pub fn with_session(session: GameSession, rules: Rules, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => SmallRng::seed_from_u64(s),
            None => SmallRng::from_entropy(),
        };
        Self {
            session,
            rules,
            rng,
            observers: Vec::new(),
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn subscribe(&mut self, observer: Box<dyn GameObserver>) {
        self.observers.push(observer);
    }

    fn emit(&mut self, event: GameEvent) {
        for obs in self.observers.iter_mut() {
            obs.on_event(&event);
        }
    }

    /// Begins a fresh round. Only valid from Idle or GameOver.
    pub fn start(&mut self) -> bool {
        if !matches!(self.session.phase, Phase::Idle | Phase::GameOver) {
            return false;
        }
        let limit = self.session.limit;
        self.session = GameSession::from_parts(
            [Cell::new(0, 0), Cell::new(-1, 0), Cell::new(-2, 0)],
            Direction::Right,
            None,
            limit,
        );
        self.spawn_food();
        log::info!("game started, food at {:?}", self.session.food);
        self.emit(GameEvent::Started);
        self.emit(GameEvent::ScoreChanged(0));
        true
    }

    /// Playing <-> Paused. Returns the new phase, or None if not applicable.
    pub fn toggle_pause(&mut self) -> Option<Phase> {
        let next = match self.session.phase {
            Phase::Playing => Phase::Paused,
            Phase::Paused => Phase::Playing,
            _ => return None,
        };
        self.session.phase = next;
        Some(next)
    }

    pub fn set_pending_direction(&mut self, dir: Direction) -> bool {
        self.session.set_pending_direction(dir)
    }

    /// Advances the snake by one cell.
    pub fn tick(&mut self) -> TickOutcome {
        if self.session.phase != Phase::Playing {
            return TickOutcome::Skipped;
        }
        let Some(head) = self.session.snake.head() else {
            return TickOutcome::Skipped;
        };

        self.session.direction = self.session.pending_direction;
        let new_head = head.step(self.session.direction);

        // Collisions win over eating.
        if !self.session.in_bounds(new_head) {
            return self.game_over(Collision::Wall);
        }
        if self.session.snake.contains(new_head) {
            return self.game_over(Collision::Body);
        }

        self.session.snake.push_front(new_head);

        if self.session.food == Some(new_head) {
            self.session.score += self.rules.food_reward;
            let score = self.session.score;
            self.spawn_food();
            log::debug!("food eaten, score {score}");
            self.emit(GameEvent::ScoreChanged(score));
            TickOutcome::Ate { score }
        } else {
            self.session.snake.pop_back();
            TickOutcome::Moved
        }
    }

    fn game_over(&mut self, collision: Collision) -> TickOutcome {
        self.session.phase = Phase::GameOver;
        let final_score = self.session.score;
        log::info!("game over ({collision:?}), final score {final_score}");
        self.emit(GameEvent::GameOver { final_score });
        TickOutcome::Collided(collision)
    }

    /// Rejection-samples a free cell for the food.
    pub fn spawn_food(&mut self) -> Option<Cell> {
        let session = &mut self.session;
        if session.snake.len() >= session.cell_count() {
            log::warn!("no free cell left for food");
            session.food = None;
            return None;
        }
        let limit = session.limit;
        let food = loop {
            let c = Cell::new(
                self.rng.gen_range(-limit..limit),
                self.rng.gen_range(-limit..limit),
            );
            if !session.snake.contains(c) {
                break c;
            }
        };
        session.food = Some(food);
        Some(food)
    }
}
