use glam::Vec2;

use crate::api::types::Command;
use crate::core::viewport::Viewport;

/// Input events the host forwards. Handlers only record them; the engine
/// reads the resulting cells once at the start of each tick.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer/touch moved to surface coordinates (x, y).
    PointerMove { x: f32, y: f32 },
    /// Pointer left the surface (or the touch ended).
    PointerLeave,
    /// The drawing surface changed size.
    Resize { width: f32, height: f32 },
    Command(Command),
}

/// Small input cells written by host callbacks and polled by the tick:
/// last pointer position, a pending viewport size and queued commands.
#[derive(Debug, Default)]
pub struct InputState {
    pointer: Option<Vec2>,
    pending_viewport: Option<Viewport>,
    commands: Vec<Command>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            pointer: None,
            pending_viewport: None,
            commands: Vec::with_capacity(8),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMove { x, y } => {
                if x.is_finite() && y.is_finite() {
                    self.pointer = Some(Vec2::new(x, y));
                }
            }
            InputEvent::PointerLeave => self.pointer = None,
            // Only the latest size matters.
            InputEvent::Resize { width, height } => self.pending_viewport = Some(Viewport::new(width, height)),
            InputEvent::Command(cmd) => self.commands.push(cmd),
        }
    }

    /// Current pointer position, if one is over the surface.
    pub fn poll_pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    /// Take the pending resize, if any.
    pub fn take_viewport(&mut self) -> Option<Viewport> {
        self.pending_viewport.take()
    }

    /// Take queued commands in arrival order.
    pub fn drain_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }

    pub fn clear(&mut self) {
        self.pointer = None;
        self.pending_viewport = None;
        self.commands.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_cell_tracks_last_position() {
        let mut input = InputState::new();
        assert_eq!(input.poll_pointer(), None);
        input.push(InputEvent::PointerMove { x: 1.0, y: 2.0 });
        input.push(InputEvent::PointerMove { x: 3.0, y: 4.0 });
        assert_eq!(input.poll_pointer(), Some(Vec2::new(3.0, 4.0)));
        input.push(InputEvent::PointerMove { x: f32::NAN, y: 0.0 });
        assert_eq!(input.poll_pointer(), Some(Vec2::new(3.0, 4.0)));
        input.push(InputEvent::PointerLeave);
        assert_eq!(input.poll_pointer(), None);
    }

    #[test]
    fn latest_resize_wins() {
        let mut input = InputState::new();
        input.push(InputEvent::Resize { width: 100.0, height: 100.0 });
        input.push(InputEvent::Resize { width: 200.0, height: 150.0 });
        assert_eq!(input.take_viewport(), Some(Viewport::new(200.0, 150.0)));
        assert_eq!(input.take_viewport(), None);
    }

    #[test]
    fn commands_drain_in_order() {
        let mut input = InputState::new();
        input.push(InputEvent::Command(Command::StartFormation("butterfly".into())));
        input.push(InputEvent::Command(Command::Disperse));
        assert_eq!(input.pending_commands(), 2);
        let cmds = input.drain_commands();
        assert_eq!(cmds, vec![Command::StartFormation("butterfly".into()), Command::Disperse]);
        assert_eq!(input.pending_commands(), 0);
    }

    #[test]
    fn clear_empties_every_cell() {
        let mut input = InputState::new();
        input.push(InputEvent::PointerMove { x: 1.0, y: 1.0 });
        input.push(InputEvent::Resize { width: 1.0, height: 1.0 });
        input.push(InputEvent::Command(Command::ToggleStatsDisplay));
        input.clear();
        assert_eq!(input.poll_pointer(), None);
        assert_eq!(input.take_viewport(), None);
        assert!(input.drain_commands().is_empty());
    }
}
