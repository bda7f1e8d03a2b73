use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A new round began; overlays from the previous round should clear.
    Started,
    ScoreChanged(u32),
    GameOver { final_score: u32 },
}

pub trait GameObserver {
    fn on_event(&mut self, event: &GameEvent);
}

/// Lets a caller keep a handle on an observer after handing it to the engine.
impl<T: GameObserver> GameObserver for Rc<RefCell<T>> {
    fn on_event(&mut self, event: &GameEvent) {
        self.borrow_mut().on_event(event);
    }
}

/// Records every event it sees.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    pub events: Vec<GameEvent>,
}

impl GameObserver for EventLog {
    fn on_event(&mut self, event: &GameEvent) {
        self.events.push(*event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_log_sees_events_through_the_handle() {
        let log = Rc::new(RefCell::new(EventLog::default()));
        let mut handle: Box<dyn GameObserver> = Box::new(Rc::clone(&log));
        handle.on_event(&GameEvent::Started);
        handle.on_event(&GameEvent::ScoreChanged(10));
        assert_eq!(
            log.borrow().events,
            vec![GameEvent::Started, GameEvent::ScoreChanged(10)]
        );
    }
}
