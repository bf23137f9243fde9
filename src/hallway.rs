// hallway.rs - Side-scrolling exploration between battles.
//
// World positions are in hallway space (0..HALLWAY_W); the camera follows the
// player and clamps to the hallway ends, and sprites are placed at
// world_x - camera_x - SCREEN_W/2 in render space. The clamp and follow math
// is in pure functions so the bounds are testable without a running app.

use bevy::prelude::*;

use crate::animation::{Animator, CharacterSprite, Facing, Motion};
use crate::audio::{self, GameAudio};
use crate::characters::{Archetype, PlayerSprite};
use crate::fade::Fade;
use crate::game_state::{GameRun, GameState, HALLWAY_W, SCREEN_W};

/// Pixels per second of player walk. 10 per tick at 60Hz.
pub const WALK_SPEED: f32 = 600.0;
/// The hallway entrance; backing into it raises the exit prompt.
pub const WORLD_MIN_X: f32 = 100.0;
/// Walkable margin past the last door.
pub const WORLD_END_MARGIN: f32 = 300.0;
/// How close (in world px) the player must stand to use a door.
pub const DOOR_PROXIMITY: f32 = 96.0;
/// Where "No" on the exit prompt deposits the player.
pub const EXIT_NUDGE_X: f32 = 150.0;

const FLOOR_Y: f32 = -(SCREEN_W * 0.08);
const DOOR_Y: f32 = 0.0;

/// Static description of one office door.
#[derive(Clone, Copy, Debug)]
pub struct DoorSpec {
    pub index: usize,
    pub world_x: f32,
}

/// The three office doors, spaced along the first stretch of hallway.
pub fn door_layout() -> [DoorSpec; 3] {
    [
        DoorSpec { index: 0, world_x: HALLWAY_W * 0.1 },
        DoorSpec { index: 1, world_x: HALLWAY_W * 0.2 },
        DoorSpec { index: 2, world_x: HALLWAY_W * 0.3 },
    ]
}

/// Rightmost x the player can walk to: a margin past the last door.
pub fn world_max_x() -> f32 {
    door_layout()[2].world_x + WORLD_END_MARGIN
}

pub fn clamp_player_x(x: f32) -> f32 {
    x.clamp(WORLD_MIN_X, world_max_x())
}

/// Camera left edge for a given player position, clamped to the hallway.
pub fn camera_x_for(player_x: f32) -> f32 {
    (player_x - SCREEN_W / 2.0).clamp(0.0, HALLWAY_W - SCREEN_W)
}

pub fn door_is_near(player_x: f32, door: &DoorSpec) -> bool {
    (player_x - door.world_x).abs() < DOOR_PROXIMITY
}

/// A door opens only once the run has reached its level.
pub fn door_unlocked(door: &DoorSpec, level: usize) -> bool {
    door.index <= level
}

/// Doors the player could enter right now.
pub fn near_unlocked_door(player_x: f32, level: usize) -> Option<usize> {
    door_layout()
        .iter()
        .find(|d| door_unlocked(d, level) && door_is_near(player_x, d))
        .map(|d| d.index)
}

#[derive(Component)]
struct HallwayScene;

/// Fixed world-space x for scenery; the scroll system converts it to render
/// space every frame. The player is not anchored, it follows GameRun.
#[derive(Component)]
struct WorldAnchor(f32);

#[derive(Component)]
struct DoorSprite(usize);

/// Door art handles, shared by the proximity system.
#[derive(Resource)]
struct DoorArt {
    closed: Handle<Image>,
    ajar: Handle<Image>,
}

#[derive(Component)]
struct ExitPromptUi;

#[derive(Component)]
struct ExitYesButton;

#[derive(Component)]
struct ExitNoButton;

pub struct HallwayPlugin;

impl Plugin for HallwayPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Hallway), enter_hallway)
            .add_systems(
                Update,
                (
                    player_movement,
                    door_proximity,
                    scroll_scene,
                    exit_prompt_lifecycle,
                    handle_exit_prompt,
                )
                    .chain()
                    .run_if(in_state(GameState::Hallway)),
            )
            .add_systems(OnExit(GameState::Hallway), exit_hallway);
    }
}

fn enter_hallway(
    mut commands: Commands,
    mut run: ResMut<GameRun>,
    asset_server: Res<AssetServer>,
    time: Res<Time>,
) {
    run.selected_door = None;
    run.show_exit_prompt = false;
    run.doors_near.clear();
    run.camera_x = camera_x_for(run.player_world_x);

    // Background tiles, one per screen of hallway.
    let bg = asset_server.load("backgrounds/hallway.png");
    for i in 0..4 {
        let world_x = (i as f32 + 0.5) * SCREEN_W;
        commands.spawn((
            HallwayScene,
            WorldAnchor(world_x),
            Sprite {
                image: bg.clone(),
                custom_size: Some(Vec2::new(SCREEN_W, crate::game_state::SCREEN_H)),
                ..default()
            },
            Transform::from_xyz(world_x, 0.0, -1.0),
        ));
    }

    let door_closed: Handle<Image> = asset_server.load("backgrounds/door_closed.png");
    let door_ajar: Handle<Image> = asset_server.load("backgrounds/door_ajar.png");
    commands.insert_resource(DoorArt {
        closed: door_closed.clone(),
        ajar: door_ajar,
    });
    for door in door_layout() {
        commands.spawn((
            HallwayScene,
            WorldAnchor(door.world_x),
            DoorSprite(door.index),
            Sprite {
                image: door_closed.clone(),
                custom_size: Some(Vec2::new(200.0, 360.0)),
                ..default()
            },
            Transform::from_xyz(door.world_x, DOOR_Y, 0.0),
        ));
    }

    let id = run
        .player
        .as_ref()
        .map(|p| p.archetype.sprite())
        .unwrap_or(Archetype::CsGetDegrees.sprite());
    let mut animator = Animator::standard(id);
    animator.facing = Facing::Right;
    animator.set_motion(Motion::Idle, time.elapsed_secs());
    commands.spawn((
        HallwayScene,
        PlayerSprite,
        animator,
        CharacterSprite { id, base_y: FLOOR_Y },
        Sprite {
            custom_size: Some(Vec2::splat(192.0)),
            ..default()
        },
        Transform::from_xyz(run.player_world_x, FLOOR_Y, 1.0),
    ));
}

/// A/D or arrows walk; E enters a nearby unlocked door (no fade, the door
/// view is an instant overlay screen).
fn player_movement(
    keys: Res<ButtonInput<KeyCode>>,
    mut run: ResMut<GameRun>,
    mut next_state: ResMut<NextState<GameState>>,
    mut player: Query<&mut Animator, With<PlayerSprite>>,
    fade: Res<Fade>,
    time: Res<Time>,
) {
    if run.show_exit_prompt || fade.in_progress() {
        return;
    }
    let now = time.elapsed_secs();

    let left = keys.pressed(KeyCode::KeyA) || keys.pressed(KeyCode::ArrowLeft);
    let right = keys.pressed(KeyCode::KeyD) || keys.pressed(KeyCode::ArrowRight);
    let dx = match (left, right) {
        (true, false) => -WALK_SPEED * time.delta_secs(),
        (false, true) => WALK_SPEED * time.delta_secs(),
        _ => 0.0,
    };

    run.player_world_x = clamp_player_x(run.player_world_x + dx);
    run.camera_x = camera_x_for(run.player_world_x);

    for mut animator in player.iter_mut() {
        if dx < 0.0 {
            animator.facing = Facing::Left;
        } else if dx > 0.0 {
            animator.facing = Facing::Right;
        }
        animator.set_motion(if dx != 0.0 { Motion::Walk } else { Motion::Idle }, now);
    }

    // Backing into the entrance raises the exit prompt.
    if run.player_world_x <= WORLD_MIN_X {
        run.show_exit_prompt = true;
        return;
    }

    if keys.just_pressed(KeyCode::KeyE) {
        if let Some(index) = near_unlocked_door(run.player_world_x, run.level) {
            run.selected_door = Some(index);
            next_state.set(GameState::DoorView);
        }
    }
}

/// Edge-triggered creak when the player steps into range of an unlocked door;
/// locked doors get a grey tint, a door in range swings ajar.
fn door_proximity(
    mut run: ResMut<GameRun>,
    mut doors: Query<(&DoorSprite, &mut Sprite)>,
    mut commands: Commands,
    audio_res: Res<GameAudio>,
    art: Res<DoorArt>,
) {
    let layout = door_layout();
    let mut near_now = std::collections::HashSet::new();
    for door in &layout {
        if door_unlocked(door, run.level) && door_is_near(run.player_world_x, door) {
            near_now.insert(door.index);
        }
    }
    // Creak once on the tick a door newly enters range.
    if near_now.difference(&run.doors_near).next().is_some() {
        audio::play_sfx(&mut commands, audio_res.sfx_door.clone(), 0.8);
    }
    run.doors_near = near_now;

    for (door, mut sprite) in doors.iter_mut() {
        sprite.color = if door_unlocked(&layout[door.0], run.level) {
            Color::WHITE
        } else {
            Color::srgb(0.45, 0.45, 0.45)
        };
        sprite.image = if run.doors_near.contains(&door.0) {
            art.ajar.clone()
        } else {
            art.closed.clone()
        };
    }
}

/// Moves the whole scene opposite the camera so the player stays framed.
fn scroll_scene(
    run: Res<GameRun>,
    mut anchored: Query<(&mut Transform, &WorldAnchor), Without<PlayerSprite>>,
    mut player: Query<&mut Transform, With<PlayerSprite>>,
) {
    let offset = run.camera_x + SCREEN_W / 2.0;
    for (mut transform, anchor) in anchored.iter_mut() {
        transform.translation.x = anchor.0 - offset;
    }
    for mut transform in player.iter_mut() {
        transform.translation.x = run.player_world_x - offset;
    }
}

/// Spawns/despawns the exit prompt UI to mirror run.show_exit_prompt.
fn exit_prompt_lifecycle(
    mut commands: Commands,
    run: Res<GameRun>,
    prompt: Query<Entity, With<ExitPromptUi>>,
) {
    if run.show_exit_prompt && prompt.is_empty() {
        commands
            .spawn((
                ExitPromptUi,
                Node {
                    position_type: PositionType::Absolute,
                    left: Val::Percent(25.0),
                    top: Val::Percent(30.0),
                    width: Val::Percent(50.0),
                    height: Val::Percent(30.0),
                    flex_direction: FlexDirection::Column,
                    align_items: AlignItems::Center,
                    justify_content: JustifyContent::SpaceEvenly,
                    ..default()
                },
                BackgroundColor(Color::srgba(0.05, 0.05, 0.1, 0.95)),
                GlobalZIndex(10),
            ))
            .with_children(|parent| {
                parent.spawn((
                    Text::new("Leave the building? Your run will end."),
                    TextFont {
                        font_size: 36.0,
                        ..default()
                    },
                    TextColor(Color::WHITE),
                ));
                parent
                    .spawn(Node {
                        column_gap: Val::Px(60.0),
                        ..default()
                    })
                    .with_children(|row| {
                        for (label, yes) in [("YES", true), ("NO", false)] {
                            let mut button = row.spawn((
                                Button,
                                Node {
                                    width: Val::Px(160.0),
                                    height: Val::Px(60.0),
                                    align_items: AlignItems::Center,
                                    justify_content: JustifyContent::Center,
                                    ..default()
                                },
                                BackgroundColor(Color::srgb(0.2, 0.2, 0.3)),
                            ));
                            if yes {
                                button.insert(ExitYesButton);
                            } else {
                                button.insert(ExitNoButton);
                            }
                            button.with_children(|b| {
                                b.spawn((
                                    Text::new(label),
                                    TextFont {
                                        font_size: 32.0,
                                        ..default()
                                    },
                                    TextColor(Color::WHITE),
                                ));
                            });
                        }
                    });
            });
    } else if !run.show_exit_prompt {
        for entity in prompt.iter() {
            commands.entity(entity).despawn();
        }
    }
}

fn handle_exit_prompt(
    mut run: ResMut<GameRun>,
    mut fade: ResMut<Fade>,
    yes: Query<&Interaction, (Changed<Interaction>, With<ExitYesButton>)>,
    no: Query<&Interaction, (Changed<Interaction>, With<ExitNoButton>)>,
) {
    if !run.show_exit_prompt {
        return;
    }
    if yes.iter().any(|i| *i == Interaction::Pressed) {
        // GameRun itself is wiped when the fade commits to Menu.
        fade.start(GameState::Menu);
        run.show_exit_prompt = false;
    } else if no.iter().any(|i| *i == Interaction::Pressed) {
        run.show_exit_prompt = false;
        run.player_world_x = EXIT_NUDGE_X;
        run.camera_x = camera_x_for(run.player_world_x);
    }
}

fn exit_hallway(
    mut commands: Commands,
    scene: Query<Entity, Or<(With<HallwayScene>, With<ExitPromptUi>)>>,
) {
    for entity in scene.iter() {
        commands.entity(entity).despawn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_clamps_to_both_hallway_ends() {
        assert_eq!(clamp_player_x(-500.0), WORLD_MIN_X);
        assert_eq!(clamp_player_x(1_000_000.0), world_max_x());
        let mid = HALLWAY_W * 0.15;
        assert_eq!(clamp_player_x(mid), mid);
    }

    #[test]
    fn world_end_sits_past_the_last_door() {
        assert_eq!(world_max_x(), HALLWAY_W * 0.3 + WORLD_END_MARGIN);
    }

    #[test]
    fn camera_clamps_at_hallway_edges() {
        assert_eq!(camera_x_for(0.0), 0.0);
        assert_eq!(camera_x_for(HALLWAY_W), HALLWAY_W - SCREEN_W);
        // Mid-hallway the camera centers the player.
        let x = HALLWAY_W / 2.0;
        assert_eq!(camera_x_for(x), x - SCREEN_W / 2.0);
    }

    #[test]
    fn door_proximity_band_is_exclusive() {
        let door = door_layout()[0];
        assert!(door_is_near(door.world_x, &door));
        assert!(door_is_near(door.world_x + DOOR_PROXIMITY - 1.0, &door));
        // Standing exactly on the threshold is out of range.
        assert!(!door_is_near(door.world_x + DOOR_PROXIMITY, &door));
        assert!(!door_is_near(door.world_x - DOOR_PROXIMITY, &door));
    }

    #[test]
    fn doors_unlock_with_level() {
        let doors = door_layout();
        assert!(door_unlocked(&doors[0], 0));
        assert!(!door_unlocked(&doors[1], 0));
        assert!(door_unlocked(&doors[1], 1));
        assert!(door_unlocked(&doors[2], 2));
    }

    #[test]
    fn near_unlocked_door_requires_both_conditions() {
        let doors = door_layout();
        assert_eq!(near_unlocked_door(doors[0].world_x, 0), Some(0));
        // Near a locked door: nothing.
        assert_eq!(near_unlocked_door(doors[2].world_x, 0), None);
        // Unlocked but far away: nothing.
        assert_eq!(near_unlocked_door(WORLD_MIN_X, 2), None);
    }

    #[test]
    fn doors_are_spaced_in_hallway_order() {
        let doors = door_layout();
        assert!(doors[0].world_x < doors[1].world_x);
        assert!(doors[1].world_x < doors[2].world_x);
        // And far enough apart that proximity bands never overlap.
        assert!(doors[1].world_x - doors[0].world_x > 2.0 * DOOR_PROXIMITY);
    }
}
