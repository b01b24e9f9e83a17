//! Scene flow. The loading card hands over to the living room, which runs
//! until the user quits.

use crate::engine::{Engine, Game};

pub enum SceneAction {
    None,
    /// Leave the current scene and enter this one.
    Switch(Box<dyn Scene>),
    Quit,
}

pub trait Scene {
    fn name(&self) -> &'static str;
    fn on_enter(&mut self, _engine: &mut Engine) {}
    fn on_exit(&mut self, _engine: &mut Engine) {}
    fn update(&mut self, engine: &mut Engine) -> SceneAction;
    fn draw(&mut self, engine: &mut Engine);
}

/// Owns the active scene and carries out the transitions it asks for.
pub struct SceneFlow {
    current: Box<dyn Scene>,
    finished: bool,
}

impl SceneFlow {
    pub fn new(first: Box<dyn Scene>) -> Self {
        Self { current: first, finished: false }
    }

    pub fn current_name(&self) -> &'static str {
        self.current.name()
    }

    fn apply(&mut self, engine: &mut Engine, action: SceneAction) {
        match action {
            SceneAction::None => {}
            SceneAction::Switch(mut next) => {
                log::info!("scene {} -> {}", self.current.name(), next.name());
                self.current.on_exit(engine);
                next.on_enter(engine);
                self.current = next;
            }
            SceneAction::Quit => {
                log::info!("leaving {}", self.current.name());
                self.current.on_exit(engine);
                self.finished = true;
                engine.request_quit();
            }
        }
    }
}

impl Game for SceneFlow {
    fn on_enter(&mut self, engine: &mut Engine) {
        self.current.on_enter(engine);
    }

    fn update(&mut self, engine: &mut Engine) {
        if self.finished {
            return;
        }
        let action = self.current.update(engine);
        self.apply(engine, action);
    }

    fn render(&mut self, engine: &mut Engine) {
        if !self.finished {
            self.current.draw(engine);
        }
    }
}
