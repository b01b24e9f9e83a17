//! Per-tick keyboard and pointer state, chat-line edits and the room's
//! hotkey table.

use std::collections::HashSet;

pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;

/// Raw hardware state gathered between two update ticks.
#[derive(Debug, Default)]
pub struct InputState {
    pub keys_held: HashSet<KeyCode>,
    pub keys_pressed: HashSet<KeyCode>,
    /// Pressed this tick, including OS key repeat.
    pub keys_repeated: HashSet<KeyCode>,

    pub mouse_pos: [f32; 2],
    /// Cursor movement accumulated over the current frame.
    pub mouse_delta: [f32; 2],
    pub mouse_wheel: f32,
    pub mouse_held: HashSet<MouseButton>,
    pub mouse_pressed: HashSet<MouseButton>,

    /// Printable characters in the order they were typed.
    pub chars_typed: Vec<char>,
    /// Set when the pointer is over the chat panel; the camera ignores it then.
    pub mouse_consumed: bool,
}

/// One edit to the chat input line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LineEdit {
    Insert(char),
    Erase,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop edge-triggered state once an update tick has seen it.
    pub fn clear_pressed(&mut self) {
        self.keys_pressed.clear();
        self.keys_repeated.clear();
        self.mouse_pressed.clear();
        self.chars_typed.clear();
    }

    /// Drop per-frame pointer motion after the camera has used it.
    pub fn clear_motion(&mut self) {
        self.mouse_delta = [0.0, 0.0];
        self.mouse_wheel = 0.0;
        self.mouse_consumed = false;
    }

    pub fn is_key_held(&self, key: KeyCode) -> bool { self.keys_held.contains(&key) }
    pub fn is_key_pressed(&self, key: KeyCode) -> bool { self.keys_pressed.contains(&key) }
    pub fn is_key_repeated(&self, key: KeyCode) -> bool { self.keys_repeated.contains(&key) }
    pub fn is_mouse_held(&self, button: MouseButton) -> bool { self.mouse_held.contains(&button) }

    /// Cursor movement to orbit the camera by, if a left drag is in progress
    /// outside the chat panel.
    pub fn orbit_drag(&self) -> Option<[f32; 2]> {
        (!self.mouse_consumed && self.is_mouse_held(MouseButton::Left)).then_some(self.mouse_delta)
    }

    /// Edits for the chat line this tick: typed characters in order, then
    /// an erase when Backspace went down or repeated.
    pub fn line_edits(&self) -> Vec<LineEdit> {
        let mut edits: Vec<LineEdit> = self.chars_typed.iter().map(|&c| LineEdit::Insert(c)).collect();
        if self.is_key_repeated(KeyCode::Backspace) {
            edits.push(LineEdit::Erase);
        }
        edits
    }
}

/// Keyboard shortcuts for scene commands. Several keys may share a command.
#[derive(Debug, Clone)]
pub struct Hotkeys<A> {
    bindings: Vec<(KeyCode, A)>,
}

impl<A> Default for Hotkeys<A> {
    fn default() -> Self {
        Self { bindings: Vec::new() }
    }
}

impl<A: Copy + PartialEq> Hotkeys<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, key: KeyCode, action: A) -> Self {
        self.bindings.push((key, action));
        self
    }

    pub fn keys_for(&self, action: A) -> Vec<KeyCode> {
        self.bindings.iter().filter(|(_, a)| *a == action).map(|(k, _)| *k).collect()
    }

    /// Commands whose key went down this tick, once each, in binding order.
    pub fn triggered(&self, input: &InputState) -> Vec<A> {
        let mut out: Vec<A> = Vec::new();
        for (key, action) in &self.bindings {
            if input.is_key_pressed(*key) && !out.contains(action) {
                out.push(*action);
            }
        }
        out
    }
}
