use crate::game::Direction;
use winit::event::VirtualKeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Turn(Direction),
    /// Toggles pause mid-round; starts a round from the idle/game-over screens.
    Pause,
    Start,
    Quit,
}

pub const KEY_BINDINGS: &[(VirtualKeyCode, Intent)] = &[
    (VirtualKeyCode::Up, Intent::Turn(Direction::Up)),
    (VirtualKeyCode::W, Intent::Turn(Direction::Up)),
    (VirtualKeyCode::Down, Intent::Turn(Direction::Down)),
    (VirtualKeyCode::S, Intent::Turn(Direction::Down)),
    (VirtualKeyCode::Left, Intent::Turn(Direction::Left)),
    (VirtualKeyCode::A, Intent::Turn(Direction::Left)),
    (VirtualKeyCode::Right, Intent::Turn(Direction::Right)),
    (VirtualKeyCode::D, Intent::Turn(Direction::Right)),
    (VirtualKeyCode::P, Intent::Pause),
    (VirtualKeyCode::Return, Intent::Start),
    (VirtualKeyCode::Space, Intent::Start),
    (VirtualKeyCode::R, Intent::Start),
    (VirtualKeyCode::Escape, Intent::Quit),
];

pub fn intent_for(key: VirtualKeyCode) -> Option<Intent> {
    KEY_BINDINGS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|&(_, intent)| intent)
}

/// Intents for every bound key the predicate reports as freshly pressed,
/// in binding order. Keys landing in the same frame carry no press order,
/// so two turns in one frame resolve by table position (the later entry wins).
pub fn pressed_intents(mut pressed: impl FnMut(VirtualKeyCode) -> bool) -> Vec<Intent> {
    KEY_BINDINGS
        .iter()
        .filter(|(k, _)| pressed(*k))
        .map(|&(_, intent)| intent)
        .collect()
}
