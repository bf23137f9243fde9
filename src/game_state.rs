// game_state.rs - The top-level screen state machine and per-run state.
//
// Every screen is a variant of GameState. Transitions that deserve a visual
// fade go through the Fade controller (fade.rs), which commits the switch at
// full black; instant micro-transitions (DoorView "back") set NextState
// directly. GameRun is the menu-to-menu record: it is created when a run
// starts and wiped whenever a fade commits back to Menu.

use std::collections::HashSet;

use bevy::app::AppExit;
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::characters::Student;

/// Virtual screen size. All layout constants derive from this so the art
/// scales proportionally.
pub const SCREEN_W: f32 = 1920.0;
pub const SCREEN_H: f32 = 1080.0;

/// The hallway spans four screens of world space.
pub const HALLWAY_W: f32 = SCREEN_W * 4.0;

/// Where the player stands when a run begins.
pub const PLAYER_START_X: f32 = SCREEN_W * 0.2;

#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    #[default]
    Menu,
    Select,
    Hallway,
    DoorView,
    Battle,
    Win,
    Loss,
    TotalWin,
}

/// State for one play session, menu-enter to menu-return.
///
/// Owned exclusively here and injected into systems; nothing reaches for
/// ambient globals. `reset` restores the default record, which is also what a
/// fade-commit to Menu performs.
#[derive(Resource)]
pub struct GameRun {
    /// 0-indexed; advances on a win, capped at the boss count.
    pub level: usize,
    /// Chosen at the Select screen; None before that.
    pub player: Option<Student>,
    /// Door index (== boss level) the player confirmed at.
    pub selected_door: Option<usize>,
    pub player_world_x: f32,
    pub camera_x: f32,
    /// Doors that were in creak range last tick, for edge-triggered sfx.
    pub doors_near: HashSet<usize>,
    pub show_exit_prompt: bool,
    pub show_help: bool,
}

impl Default for GameRun {
    fn default() -> Self {
        GameRun {
            level: 0,
            player: None,
            selected_door: None,
            player_world_x: PLAYER_START_X,
            camera_x: 0.0,
            doors_near: HashSet::new(),
            show_exit_prompt: false,
            show_help: false,
        }
    }
}

impl GameRun {
    pub fn reset(&mut self) {
        *self = GameRun::default();
    }
}

/// The single RNG stream for a run. Every gameplay roll (crit band, curve
/// save, question pick, voice-line pick) draws from here, so a seeded run
/// replays deterministically. Tests construct their own seeded instances.
#[derive(Resource)]
pub struct RunRng(pub StdRng);

impl Default for RunRng {
    fn default() -> Self {
        RunRng(StdRng::from_entropy())
    }
}

pub struct GameStatePlugin;

impl Plugin for GameStatePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .init_resource::<GameRun>()
            .init_resource::<RunRng>()
            .add_systems(Update, quit_on_escape);
    }
}

fn quit_on_escape(keys: Res<ButtonInput<KeyCode>>, mut exit: MessageWriter<AppExit>) {
    if keys.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}
