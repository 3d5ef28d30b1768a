//! Input routing: raw window events in, typed actions out.
//!
//! Three steps turn a winit [`WindowEvent`] into a state change:
//!
//! 1. [`EventTranslator`] narrows window events to the closed [`InputEvent`]
//!    set, attaching the last known cursor position to button presses and
//!    tracking whether the modifier key is held.
//! 2. [`route`] classifies an [`InputEvent`] into an [`Action`] using a
//!    [`Keymap`].
//! 3. [`SceneState::apply`](crate::SceneState::apply) performs the action.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// The events the app reacts to. Everything else is dropped by the
/// translator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// The window was asked to close.
    Quit,
    KeyRelease(KeyCode),
    ButtonPress { button: MouseButton, cursor: Vec2 },
    ButtonRelease(MouseButton),
    PointerMove(Vec2),
    Resize { width: u32, height: u32 },
}

/// What an input event asks the app to do.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
    Quit,
    Resize { width: u32, height: u32 },
    Press { button: MouseButton, cursor: Vec2 },
    Release(MouseButton),
    Drag { cursor: Vec2, modifier_held: bool },
    ToggleRotation,
    CycleRenderMode,
    Ignore,
}

/// Key bindings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Keymap {
    pub quit: KeyCode,
    pub toggle_rotation: KeyCode,
    pub cycle_mode: KeyCode,
    /// Held during a drag to zoom instead of orbit.
    pub modifier: KeyCode,
}

impl Default for Keymap {
    fn default() -> Self {
        Self {
            quit: KeyCode::Escape,
            toggle_rotation: KeyCode::Space,
            cycle_mode: KeyCode::KeyM,
            modifier: KeyCode::ControlLeft,
        }
    }
}

/// Classify an input event. Keys only act on release.
pub fn route(event: &InputEvent, keymap: &Keymap, modifier_held: bool) -> Action {
    match *event {
        InputEvent::Quit => Action::Quit,
        InputEvent::KeyRelease(key) if key == keymap.quit => Action::Quit,
        InputEvent::KeyRelease(key) if key == keymap.toggle_rotation => Action::ToggleRotation,
        InputEvent::KeyRelease(key) if key == keymap.cycle_mode => Action::CycleRenderMode,
        InputEvent::KeyRelease(_) => Action::Ignore,
        InputEvent::ButtonPress { button, cursor } => Action::Press { button, cursor },
        InputEvent::ButtonRelease(button) => Action::Release(button),
        InputEvent::PointerMove(cursor) => Action::Drag {
            cursor,
            modifier_held,
        },
        InputEvent::Resize { width, height } => Action::Resize { width, height },
    }
}

/// Converts winit window events into [`InputEvent`]s.
///
/// winit reports button presses without a position, so the translator keeps
/// the last cursor position it saw.
#[derive(Clone, Debug)]
pub struct EventTranslator {
    modifier: KeyCode,
    cursor: Vec2,
    modifier_held: bool,
}

impl EventTranslator {
    pub fn new(keymap: &Keymap) -> Self {
        Self {
            modifier: keymap.modifier,
            cursor: Vec2::ZERO,
            modifier_held: false,
        }
    }

    /// Returns true while the modifier key is held down.
    pub fn modifier_held(&self) -> bool {
        self.modifier_held
    }

    /// Last cursor position in window coordinates.
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    pub fn translate(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::CloseRequested => Some(InputEvent::Quit),
            WindowEvent::Resized(size) => Some(InputEvent::Resize {
                width: size.width,
                height: size.height,
            }),
            WindowEvent::KeyboardInput { event, .. } => match event.physical_key {
                PhysicalKey::Code(key) => self.key(key, event.state),
                PhysicalKey::Unidentified(_) => None,
            },
            WindowEvent::MouseInput { state, button, .. } => Some(self.button(*button, *state)),
            WindowEvent::CursorMoved { position, .. } => {
                Some(self.cursor_moved(position.x as f32, position.y as f32))
            }
            // Key releases are lost while unfocused.
            WindowEvent::Focused(false) => {
                self.modifier_held = false;
                None
            }
            _ => None,
        }
    }

    fn key(&mut self, key: KeyCode, state: ElementState) -> Option<InputEvent> {
        if key == self.modifier {
            self.modifier_held = state.is_pressed();
        }
        match state {
            ElementState::Pressed => None,
            ElementState::Released => Some(InputEvent::KeyRelease(key)),
        }
    }

    fn button(&mut self, button: MouseButton, state: ElementState) -> InputEvent {
        match state {
            ElementState::Pressed => InputEvent::ButtonPress {
                button,
                cursor: self.cursor,
            },
            ElementState::Released => InputEvent::ButtonRelease(button),
        }
    }

    fn cursor_moved(&mut self, x: f32, y: f32) -> InputEvent {
        self.cursor = Vec2::new(x, y);
        InputEvent::PointerMove(self.cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalSize;

    #[test]
    fn escape_release_and_close_both_quit() {
        let keymap = Keymap::default();
        assert_eq!(route(&InputEvent::Quit, &keymap, false), Action::Quit);
        assert_eq!(
            route(&InputEvent::KeyRelease(KeyCode::Escape), &keymap, false),
            Action::Quit
        );
    }

    #[test]
    fn bound_keys_map_to_actions() {
        let keymap = Keymap::default();
        assert_eq!(
            route(&InputEvent::KeyRelease(KeyCode::Space), &keymap, false),
            Action::ToggleRotation
        );
        assert_eq!(
            route(&InputEvent::KeyRelease(KeyCode::KeyM), &keymap, false),
            Action::CycleRenderMode
        );
        assert_eq!(
            route(&InputEvent::KeyRelease(KeyCode::KeyQ), &keymap, false),
            Action::Ignore
        );
    }

    #[test]
    fn pointer_motion_carries_modifier() {
        let cursor = Vec2::new(3.0, 4.0);
        assert_eq!(
            route(&InputEvent::PointerMove(cursor), &Keymap::default(), true),
            Action::Drag {
                cursor,
                modifier_held: true
            }
        );
    }

    #[test]
    fn rebound_keys_are_respected() {
        let keymap = Keymap {
            toggle_rotation: KeyCode::KeyR,
            ..Keymap::default()
        };
        assert_eq!(
            route(&InputEvent::KeyRelease(KeyCode::KeyR), &keymap, false),
            Action::ToggleRotation
        );
        assert_eq!(
            route(&InputEvent::KeyRelease(KeyCode::Space), &keymap, false),
            Action::Ignore
        );
    }

    #[test]
    fn press_uses_last_cursor_position() {
        let mut translator = EventTranslator::new(&Keymap::default());
        translator.cursor_moved(100.0, 120.0);
        assert_eq!(
            translator.button(MouseButton::Left, ElementState::Pressed),
            InputEvent::ButtonPress {
                button: MouseButton::Left,
                cursor: Vec2::new(100.0, 120.0)
            }
        );
        assert_eq!(
            translator.button(MouseButton::Left, ElementState::Released),
            InputEvent::ButtonRelease(MouseButton::Left)
        );
    }

    #[test]
    fn modifier_tracks_press_and_release() {
        let mut translator = EventTranslator::new(&Keymap::default());
        assert_eq!(translator.key(KeyCode::ControlLeft, ElementState::Pressed), None);
        assert!(translator.modifier_held());
        assert_eq!(
            translator.key(KeyCode::ControlLeft, ElementState::Released),
            Some(InputEvent::KeyRelease(KeyCode::ControlLeft))
        );
        assert!(!translator.modifier_held());
    }

    #[test]
    fn focus_loss_clears_modifier() {
        let mut translator = EventTranslator::new(&Keymap::default());
        translator.key(KeyCode::ControlLeft, ElementState::Pressed);
        assert_eq!(translator.translate(&WindowEvent::Focused(false)), None);
        assert!(!translator.modifier_held());
    }

    #[test]
    fn window_events_translate() {
        let mut translator = EventTranslator::new(&Keymap::default());
        assert_eq!(
            translator.translate(&WindowEvent::CloseRequested),
            Some(InputEvent::Quit)
        );
        assert_eq!(
            translator.translate(&WindowEvent::Resized(PhysicalSize::new(640, 480))),
            Some(InputEvent::Resize {
                width: 640,
                height: 480
            })
        );
        assert_eq!(translator.translate(&WindowEvent::Focused(true)), None);
    }
}
