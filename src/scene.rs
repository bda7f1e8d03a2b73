use crate::camera::ViewProjection;
use crate::game::GameSession;
use crate::math::Mat4;
use crate::mesh::BoardLayout;

pub type Color = [f32; 3];

pub const CLEAR_COLOR: Color = [0.09, 0.09, 0.12];
pub const SNAKE_HEAD: Color = [0.0, 1.0, 0.5];
pub const SNAKE_BODY: Color = [0.0, 0.8, 0.3];
pub const FOOD: Color = [1.0, 0.2, 0.2];
pub const BOARD: Color = [0.1, 0.1, 0.15];
pub const GRID: Color = [0.15, 0.15, 0.2];

const FOOD_BOB_PERIOD_MS: f64 = 300.0;
const FOOD_BOB_AMPLITUDE: f64 = 0.2;
const FOOD_BOB_BASE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKind {
    Board,
    Grid,
    Cube,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub mesh: MeshKind,
    /// Full model-view-projection transform.
    pub mvp: Mat4,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub clear_color: Color,
    pub draws: Vec<DrawCall>,
}

pub fn food_bob(time_ms: f64) -> f32 {
    ((time_ms / FOOD_BOB_PERIOD_MS).sin() * FOOD_BOB_AMPLITUDE + FOOD_BOB_BASE) as f32
}

/// Board, grid lines, food, then the snake head first.
pub fn build_frame(
    session: &GameSession,
    layout: &BoardLayout,
    vp: &ViewProjection,
    time_ms: f64,
) -> Frame {
    let view_proj = vp.combined();
    let mut draws = Vec::with_capacity(3 + session.snake.len());

    draws.push(DrawCall { mesh: MeshKind::Board, mvp: view_proj, color: BOARD });
    draws.push(DrawCall { mesh: MeshKind::Grid, mvp: view_proj, color: GRID });

    if let Some(food) = session.food {
        let [x, y] = layout.cell_to_world(food);
        draws.push(DrawCall {
            mesh: MeshKind::Cube,
            mvp: view_proj.translate(x, y + food_bob(time_ms), 0.0),
            color: FOOD,
        });
    }

    for (i, &seg) in session.snake.iter().enumerate() {
        let [x, y] = layout.cell_to_world(seg);
        draws.push(DrawCall {
            mesh: MeshKind::Cube,
            mvp: view_proj.translate(x, y, 0.0),
            color: if i == 0 { SNAKE_HEAD } else { SNAKE_BODY },
        });
    }

    Frame { clear_color: CLEAR_COLOR, draws }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::game::{Cell, Direction};

    fn identity_vp() -> ViewProjection {
        ViewProjection { view: Mat4::IDENTITY, projection: Mat4::IDENTITY }
    }

    fn origin_of(m: &Mat4) -> [f32; 3] {
        m.transform_point([0.0, 0.0, 0.0])
    }

    #[test]
    fn idle_session_draws_only_the_board() {
        let session = GameSession::new(6);
        let frame = build_frame(&session, &BoardLayout::new(12, 1.0), &identity_vp(), 0.0);
        let meshes: Vec<_> = frame.draws.iter().map(|d| d.mesh).collect();
        assert_eq!(meshes, vec![MeshKind::Board, MeshKind::Grid]);
        assert_eq!(frame.clear_color, CLEAR_COLOR);
    }

    #[test]
    fn snake_segments_follow_body_order() {
        let session = GameSession::from_parts(
            [Cell::new(0, 0), Cell::new(-1, 0), Cell::new(-2, 0)],
            Direction::Right,
            None,
            6,
        );
        let layout = BoardLayout::new(12, 1.0);
        let frame = build_frame(&session, &layout, &identity_vp(), 0.0);
        let cubes: Vec<_> = frame.draws.iter().filter(|d| d.mesh == MeshKind::Cube).collect();
        assert_eq!(cubes.len(), 3);
        assert_eq!(cubes[0].color, SNAKE_HEAD);
        assert!(cubes[1..].iter().all(|d| d.color == SNAKE_BODY));
        assert_eq!(origin_of(&cubes[0].mvp), [0.5, 0.5, 0.0]);
        assert_eq!(origin_of(&cubes[2].mvp), [-1.5, 0.5, 0.0]);
    }

    #[test]
    fn food_bobs_with_time() {
        let session = GameSession::from_parts(
            [Cell::new(0, 0), Cell::new(-1, 0), Cell::new(-2, 0)],
            Direction::Right,
            Some(Cell::new(3, 3)),
            6,
        );
        let layout = BoardLayout::new(12, 1.0);
        let at = |t: f64| {
            let frame = build_frame(&session, &layout, &identity_vp(), t);
            let food = frame.draws.iter().find(|d| d.color == FOOD).copied().expect("food drawn");
            origin_of(&food.mvp)
        };
        let still = at(0.0);
        assert!((still[1] - (3.5 + 0.3)).abs() < 1e-5);
        assert_eq!(still[0], 3.5);

        let peak = at(300.0 * std::f64::consts::FRAC_PI_2);
        assert!((peak[1] - (3.5 + 0.5)).abs() < 1e-4);
    }

    #[test]
    fn food_is_drawn_before_snake() {
        let session = GameSession::from_parts(
            [Cell::new(0, 0), Cell::new(-1, 0), Cell::new(-2, 0)],
            Direction::Right,
            Some(Cell::new(2, 2)),
            6,
        );
        let frame = build_frame(
            &session,
            &BoardLayout::new(12, 1.0),
            &Camera::default().view_projection(),
            42.0,
        );
        assert_eq!(frame.draws.len(), 6);
        assert_eq!(frame.draws[2].color, FOOD);
        assert_eq!(frame.draws[3].color, SNAKE_HEAD);
    }

    #[test]
    fn rendering_does_not_touch_session() {
        let session = GameSession::from_parts(
            [Cell::new(1, 1), Cell::new(1, 2), Cell::new(1, 3)],
            Direction::Up,
            Some(Cell::new(-3, 0)),
            6,
        );
        let before = session.clone();
        let _ = build_frame(&session, &BoardLayout::new(12, 1.0), &identity_vp(), 1234.0);
        assert_eq!(session, before);
    }
}
