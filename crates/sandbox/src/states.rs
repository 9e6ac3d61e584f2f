//! Demo states for the sandbox run.
//!
//! Splash hands over to the main menu, the menu hands over to
//! gameplay, and gameplay periodically pushes the pause menu to
//! exercise the pause/resume path.

use std::fmt;

use aether_core::{GameState, StateContext};
use aether_events::{Event, EventKind, StateId};

/// Splash screen: waits half a second, then shows the menu.
pub struct SplashState {
    elapsed: f64,
}

impl SplashState {
    pub fn new() -> Self {
        Self { elapsed: 0.0 }
    }
}

impl Default for SplashState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState for SplashState {
    fn id(&self) -> StateId {
        StateId::SplashScreen
    }

    fn update(&mut self, delta: f64, ctx: &mut StateContext<'_>) {
        self.elapsed += delta;
        if self.elapsed >= 0.5 {
            ctx.request_change(Box::new(MainMenuState::new()));
        }
    }

    fn render(&mut self, out: &mut dyn fmt::Write) -> fmt::Result {
        writeln!(out, "~ Chronicles of Aethermoor ~")
    }
}

/// Main menu: lingers briefly, then starts the game.
pub struct MainMenuState {
    elapsed: f64,
}

impl MainMenuState {
    pub fn new() -> Self {
        Self { elapsed: 0.0 }
    }
}

impl Default for MainMenuState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState for MainMenuState {
    fn id(&self) -> StateId {
        StateId::MainMenu
    }

    fn on_enter(&mut self, ctx: &mut StateContext<'_>) {
        ctx.publish(Event::new(EventKind::MenuOpened).with_entry("menu", "main"));
    }

    fn on_exit(&mut self, ctx: &mut StateContext<'_>) {
        ctx.publish(Event::new(EventKind::MenuClosed).with_entry("menu", "main"));
    }

    fn update(&mut self, delta: f64, ctx: &mut StateContext<'_>) {
        self.elapsed += delta;
        if self.elapsed >= 0.5 {
            ctx.request_change(Box::new(GameplayState::new()));
        }
    }

    fn render(&mut self, out: &mut dyn fmt::Write) -> fmt::Result {
        writeln!(out, "[main menu] press start")
    }
}

/// Gameplay: wanders, publishes movement, pushes the pause menu
/// every few hundred updates.
pub struct GameplayState {
    updates: u64,
}

impl GameplayState {
    pub fn new() -> Self {
        Self { updates: 0 }
    }
}

impl Default for GameplayState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState for GameplayState {
    fn id(&self) -> StateId {
        StateId::Gameplay
    }

    fn update(&mut self, _delta: f64, ctx: &mut StateContext<'_>) {
        self.updates += 1;
        if self.updates % 50 == 0 {
            ctx.publish(
                Event::new(EventKind::PlayerMoved)
                    .with_entry("x", self.updates % 128)
                    .with_entry("y", (self.updates * 7) % 128)
                    .with_source("gameplay"),
            );
        }
        if self.updates % 200 == 0 {
            ctx.request_push(Box::new(PauseMenuState::new()));
        }
    }

    fn render(&mut self, out: &mut dyn fmt::Write) -> fmt::Result {
        writeln!(out, "[gameplay] wandering the realm ({} updates)", self.updates)
    }
}

/// Pause menu: announces the pause, counts down, then pops itself.
pub struct PauseMenuState {
    remaining: u32,
}

impl PauseMenuState {
    pub fn new() -> Self {
        Self { remaining: 20 }
    }
}

impl Default for PauseMenuState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState for PauseMenuState {
    fn id(&self) -> StateId {
        StateId::PauseMenu
    }

    fn on_enter(&mut self, ctx: &mut StateContext<'_>) {
        ctx.publish(Event::new(EventKind::GamePaused).with_source("pause_menu"));
    }

    fn on_exit(&mut self, ctx: &mut StateContext<'_>) {
        ctx.publish(Event::new(EventKind::GameResumed).with_source("pause_menu"));
    }

    fn update(&mut self, _delta: f64, ctx: &mut StateContext<'_>) {
        if self.remaining == 0 {
            ctx.request_pop();
        } else {
            self.remaining -= 1;
        }
    }

    fn render(&mut self, out: &mut dyn fmt::Write) -> fmt::Result {
        writeln!(out, "[paused] resuming in {} updates", self.remaining)
    }
}
