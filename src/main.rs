use bevy::prelude::*;

use crate::game_state::{SCREEN_H, SCREEN_W};

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Finals Boss".into(),
                    resolution: (SCREEN_W as u32, SCREEN_H as u32).into(),
                    ..default()
                }),
                ..default()
            }),
            game_state::GameStatePlugin,
            animation::AnimationPlugin,
            questions::QuestionPlugin,
            fade::FadePlugin,
            audio::AudioPlugin,
            menu::MenuPlugin,
            hallway::HallwayPlugin,
            combat::CombatPlugin,
            battle_ui::BattleUiPlugin,
        ))
        .add_systems(Startup, spawn_camera)
        .run();
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

mod animation;
mod audio;
mod battle_ui;
mod characters;
mod combat;
mod fade;
mod game_state;
mod hallway;
mod menu;
mod questions;
