// menu.rs - The static screens: title, character select, door view, and the
// three result screens. Each screen follows the same pattern: spawn its UI
// tree on OnEnter under a marker component, react to Interaction changes,
// despawn the tree on OnExit.

use bevy::app::AppExit;
use bevy::prelude::*;

use crate::characters::{Archetype, BossKind, Student};
use crate::combat::Battle;
use crate::fade::Fade;
use crate::game_state::{GameRun, GameState};

const PANEL_BG: Color = Color::srgba(0.04, 0.04, 0.1, 0.95);
const BUTTON_BG: Color = Color::srgb(0.2, 0.2, 0.35);
const BUTTON_HOVER_BG: Color = Color::srgb(0.3, 0.3, 0.5);
const GOLD: Color = Color::srgb(0.9, 0.75, 0.2);

#[derive(Component)]
struct MenuUi;

#[derive(Component)]
struct StartButton;

#[derive(Component)]
struct HelpButton;

#[derive(Component)]
struct QuitButton;

#[derive(Component)]
struct HelpOverlay;

#[derive(Component)]
struct SelectUi;

/// One selectable student card.
#[derive(Component)]
struct RosterCard(Archetype);

#[derive(Component)]
struct AbilityText;

#[derive(Component)]
struct DoorViewUi;

#[derive(Component)]
struct ChallengeButton;

#[derive(Component)]
struct BackButton;

#[derive(Component)]
struct ResultUi;

#[derive(Component)]
struct ReturnButton;

pub struct MenuPlugin;

impl Plugin for MenuPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Menu), spawn_menu)
            .add_systems(
                Update,
                (handle_menu_buttons, handle_help_overlay).run_if(in_state(GameState::Menu)),
            )
            .add_systems(OnExit(GameState::Menu), despawn_all::<MenuUi>)
            .add_systems(OnEnter(GameState::Select), spawn_select)
            .add_systems(Update, handle_roster_cards.run_if(in_state(GameState::Select)))
            .add_systems(OnExit(GameState::Select), despawn_all::<SelectUi>)
            .add_systems(OnEnter(GameState::DoorView), spawn_door_view)
            .add_systems(
                Update,
                handle_door_view_buttons.run_if(in_state(GameState::DoorView)),
            )
            .add_systems(OnExit(GameState::DoorView), despawn_all::<DoorViewUi>)
            .add_systems(OnEnter(GameState::Win), spawn_win_screen)
            .add_systems(Update, handle_win_click.run_if(in_state(GameState::Win)))
            .add_systems(OnExit(GameState::Win), despawn_all::<ResultUi>)
            .add_systems(OnEnter(GameState::Loss), spawn_loss_screen)
            .add_systems(Update, handle_loss_click.run_if(in_state(GameState::Loss)))
            .add_systems(OnExit(GameState::Loss), despawn_all::<ResultUi>)
            .add_systems(OnEnter(GameState::TotalWin), spawn_total_win)
            .add_systems(
                Update,
                handle_total_win_button.run_if(in_state(GameState::TotalWin)),
            )
            .add_systems(OnExit(GameState::TotalWin), despawn_all::<ResultUi>);
    }
}

fn despawn_all<T: Component>(mut commands: Commands, query: Query<Entity, With<T>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}

fn full_screen_column() -> Node {
    Node {
        position_type: PositionType::Absolute,
        left: Val::Px(0.0),
        top: Val::Px(0.0),
        width: Val::Percent(100.0),
        height: Val::Percent(100.0),
        flex_direction: FlexDirection::Column,
        align_items: AlignItems::Center,
        justify_content: JustifyContent::Center,
        row_gap: Val::Px(30.0),
        ..default()
    }
}

fn spawn_labelled_button(
    parent: &mut ChildSpawnerCommands,
    label: &str,
    marker: impl Component,
) {
    parent
        .spawn((
            marker,
            Button,
            Node {
                width: Val::Px(360.0),
                height: Val::Px(80.0),
                align_items: AlignItems::Center,
                justify_content: JustifyContent::Center,
                ..default()
            },
            BackgroundColor(BUTTON_BG),
        ))
        .with_children(|b| {
            b.spawn((
                Text::new(label),
                TextFont {
                    font_size: 38.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });
}

// ── Title ───────────────────────────────────────────────────────────────────

fn spawn_menu(mut commands: Commands) {
    commands
        .spawn((MenuUi, full_screen_column(), BackgroundColor(PANEL_BG)))
        .with_children(|root| {
            root.spawn((
                Text::new("FINALS BOSS"),
                TextFont {
                    font_size: 110.0,
                    ..default()
                },
                TextColor(GOLD),
            ));
            root.spawn((
                Text::new("Defeat the professors. Earn the degree."),
                TextFont {
                    font_size: 34.0,
                    ..default()
                },
                TextColor(Color::srgb(0.8, 0.8, 0.85)),
            ));
            spawn_labelled_button(root, "START", StartButton);
            spawn_labelled_button(root, "HELP", HelpButton);
            spawn_labelled_button(root, "QUIT", QuitButton);
        });
}

fn handle_menu_buttons(
    mut run: ResMut<GameRun>,
    mut next_state: ResMut<NextState<GameState>>,
    mut exit: MessageWriter<AppExit>,
    mut commands: Commands,
    start: Query<&Interaction, (Changed<Interaction>, With<StartButton>)>,
    help: Query<&Interaction, (Changed<Interaction>, With<HelpButton>)>,
    quit: Query<&Interaction, (Changed<Interaction>, With<QuitButton>)>,
    overlay: Query<Entity, With<HelpOverlay>>,
) {
    if start.iter().any(|i| *i == Interaction::Pressed) {
        run.reset();
        next_state.set(GameState::Select);
    }
    if help.iter().any(|i| *i == Interaction::Pressed) && overlay.is_empty() {
        run.show_help = true;
        commands
            .spawn((
                MenuUi,
                HelpOverlay,
                full_screen_column(),
                BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.92)),
                GlobalZIndex(5),
            ))
            .with_children(|root| {
                root.spawn((
                    Text::new(
                        "Walk the hallway with A/D. Press E at an open office door.\n\
                         In battle: ATTACK the professor, answer their questions,\n\
                         and HEAL when the grades get rough.\n\n\
                         Click anywhere to close.",
                    ),
                    TextFont {
                        font_size: 36.0,
                        ..default()
                    },
                    TextColor(Color::WHITE),
                    TextLayout::new_with_justify(Justify::Center),
                ));
            });
    }
    if quit.iter().any(|i| *i == Interaction::Pressed) {
        exit.write(AppExit::Success);
    }
}

/// The help overlay closes on any click.
fn handle_help_overlay(
    mut run: ResMut<GameRun>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut commands: Commands,
    overlay: Query<Entity, With<HelpOverlay>>,
) {
    if !run.show_help || overlay.is_empty() {
        return;
    }
    if mouse.just_pressed(MouseButton::Left) {
        run.show_help = false;
        for entity in overlay.iter() {
            commands.entity(entity).despawn();
        }
    }
}

// ── Character select ────────────────────────────────────────────────────────

fn spawn_select(mut commands: Commands) {
    commands
        .spawn((SelectUi, full_screen_column(), BackgroundColor(PANEL_BG)))
        .with_children(|root| {
            root.spawn((
                Text::new("CHOOSE YOUR STUDENT"),
                TextFont {
                    font_size: 64.0,
                    ..default()
                },
                TextColor(GOLD),
            ));
            root.spawn(Node {
                column_gap: Val::Px(50.0),
                ..default()
            })
            .with_children(|row| {
                for archetype in Archetype::ALL {
                    row.spawn((
                        RosterCard(archetype),
                        Button,
                        Node {
                            width: Val::Px(420.0),
                            height: Val::Px(420.0),
                            flex_direction: FlexDirection::Column,
                            align_items: AlignItems::Center,
                            justify_content: JustifyContent::Center,
                            row_gap: Val::Px(16.0),
                            ..default()
                        },
                        BackgroundColor(BUTTON_BG),
                        BorderColor::all(Color::NONE),
                    ))
                    .with_children(|card| {
                        card.spawn((
                            Text::new(archetype.display_name()),
                            TextFont {
                                font_size: 42.0,
                                ..default()
                            },
                            TextColor(Color::WHITE),
                        ));
                        card.spawn((
                            Text::new(format!(
                                "HP {}   ATK {}",
                                archetype.max_hp(),
                                archetype.attack_power()
                            )),
                            TextFont {
                                font_size: 30.0,
                                ..default()
                            },
                            TextColor(Color::srgb(0.75, 0.75, 0.8)),
                        ));
                    });
                }
            });
            root.spawn((
                AbilityText,
                Text::new("Hover a student to see their ability."),
                TextFont {
                    font_size: 32.0,
                    ..default()
                },
                TextColor(Color::srgb(0.85, 0.85, 0.6)),
                TextLayout::new_with_justify(Justify::Center),
            ));
        });
}

fn handle_roster_cards(
    mut run: ResMut<GameRun>,
    mut fade: ResMut<Fade>,
    mut cards: Query<(&Interaction, &RosterCard, &mut BackgroundColor, &mut BorderColor)>,
    mut ability_text: Query<&mut Text, With<AbilityText>>,
) {
    if fade.in_progress() {
        return;
    }
    let mut hovered: Option<Archetype> = None;
    for (interaction, card, mut bg, mut border) in cards.iter_mut() {
        match interaction {
            Interaction::Pressed => {
                run.player = Some(Student::new(card.0));
                fade.start(GameState::Hallway);
                return;
            }
            Interaction::Hovered => {
                hovered = Some(card.0);
                bg.0 = BUTTON_HOVER_BG;
                *border = BorderColor::all(GOLD);
            }
            Interaction::None => {
                bg.0 = BUTTON_BG;
                *border = BorderColor::all(Color::NONE);
            }
        }
    }
    if let Some(archetype) = hovered {
        for mut text in ability_text.iter_mut() {
            text.0 = archetype.ability_description().to_string();
        }
    }
}

// ── Door view ───────────────────────────────────────────────────────────────

fn spawn_door_view(mut commands: Commands, run: Res<GameRun>) {
    let kind = BossKind::from_level(run.selected_door.unwrap_or(run.level));
    commands
        .spawn((DoorViewUi, full_screen_column(), BackgroundColor(PANEL_BG)))
        .with_children(|root| {
            root.spawn((
                Text::new(format!("OFFICE OF {}", kind.display_name().to_uppercase())),
                TextFont {
                    font_size: 72.0,
                    ..default()
                },
                TextColor(GOLD),
            ));
            root.spawn((
                Text::new(kind.level_name()),
                TextFont {
                    font_size: 40.0,
                    ..default()
                },
                TextColor(Color::srgb(0.8, 0.8, 0.85)),
            ));
            spawn_labelled_button(root, "CHALLENGE", ChallengeButton);
            spawn_labelled_button(root, "BACK", BackButton);
        });
}

fn handle_door_view_buttons(
    mut fade: ResMut<Fade>,
    mut next_state: ResMut<NextState<GameState>>,
    challenge: Query<&Interaction, (Changed<Interaction>, With<ChallengeButton>)>,
    back: Query<&Interaction, (Changed<Interaction>, With<BackButton>)>,
) {
    if fade.in_progress() {
        return;
    }
    if challenge.iter().any(|i| *i == Interaction::Pressed) {
        fade.start(GameState::Battle);
    } else if back.iter().any(|i| *i == Interaction::Pressed) {
        // Stepping back from the door is instant, no fade.
        next_state.set(GameState::Hallway);
    }
}

// ── Result screens ──────────────────────────────────────────────────────────

fn spawn_win_screen(mut commands: Commands, run: Res<GameRun>, asset_server: Res<AssetServer>) {
    // Win art is keyed by the chosen student.
    let (message, folder) = run
        .player
        .as_ref()
        .map(|p| (p.archetype.win_message(), p.archetype.sprite().folder()))
        .unwrap_or(("You passed!", "swi"));
    let bg = asset_server.load(format!("backgrounds/win_{folder}.png"));
    spawn_result_screen(&mut commands, "VICTORY", message, GOLD, bg);
}

fn spawn_loss_screen(
    mut commands: Commands,
    battle: Option<Res<Battle>>,
    asset_server: Res<AssetServer>,
) {
    // Loss art is keyed by the boss that ended the run.
    let (message, boss_id) = battle
        .map(|b| (b.boss.kind.loss_message(), b.boss.kind.boss_id()))
        .unwrap_or(("You failed the course.", 1));
    let bg = asset_server.load(format!("backgrounds/loss_boss{boss_id}.png"));
    spawn_result_screen(&mut commands, "DEFEAT", message, Color::srgb(0.85, 0.2, 0.2), bg);
}

fn spawn_result_screen(
    commands: &mut Commands,
    title: &str,
    message: &str,
    title_color: Color,
    background: Handle<Image>,
) {
    commands
        .spawn((
            ResultUi,
            full_screen_column(),
            ImageNode::new(background),
            BackgroundColor(PANEL_BG),
        ))
        .with_children(|root| {
            root.spawn((
                Text::new(title),
                TextFont {
                    font_size: 100.0,
                    ..default()
                },
                TextColor(title_color),
            ));
            root.spawn((
                Text::new(message),
                TextFont {
                    font_size: 40.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                TextLayout::new_with_justify(Justify::Center),
            ));
            root.spawn((
                Text::new("Click to continue"),
                TextFont {
                    font_size: 28.0,
                    ..default()
                },
                TextColor(Color::srgb(0.7, 0.7, 0.75)),
            ));
        });
}

/// A win advances the run: last boss down means the degree, otherwise back to
/// the hallway one level deeper with HP restored (heals are not).
fn handle_win_click(
    mouse: Res<ButtonInput<MouseButton>>,
    mut run: ResMut<GameRun>,
    mut fade: ResMut<Fade>,
    mut commands: Commands,
) {
    if !mouse.just_pressed(MouseButton::Left) || fade.in_progress() {
        return;
    }
    commands.remove_resource::<Battle>();
    let beaten_last = run.level + 1 >= BossKind::ALL.len();
    if beaten_last {
        fade.start(GameState::TotalWin);
        return;
    }
    run.level += 1;
    info!("Level {} unlocked!", run.level + 1);
    if let Some(player) = run.player.as_mut() {
        player.hp = player.max_hp();
    }
    fade.start(GameState::Hallway);
}

/// A loss costs nothing but the attempt: HP restored, same level.
fn handle_loss_click(
    mouse: Res<ButtonInput<MouseButton>>,
    mut run: ResMut<GameRun>,
    mut fade: ResMut<Fade>,
    mut commands: Commands,
) {
    if !mouse.just_pressed(MouseButton::Left) || fade.in_progress() {
        return;
    }
    commands.remove_resource::<Battle>();
    if let Some(player) = run.player.as_mut() {
        player.hp = player.max_hp();
    }
    fade.start(GameState::Hallway);
}

fn spawn_total_win(mut commands: Commands) {
    commands
        .spawn((ResultUi, full_screen_column(), BackgroundColor(PANEL_BG)))
        .with_children(|root| {
            root.spawn((
                Text::new("DEGREE CONFERRED"),
                TextFont {
                    font_size: 96.0,
                    ..default()
                },
                TextColor(GOLD),
            ));
            root.spawn((
                Text::new("C.S. COMPLETED! All three professors defeated."),
                TextFont {
                    font_size: 42.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
            spawn_labelled_button(root, "RETURN", ReturnButton);
        });
}

fn handle_total_win_button(
    mut fade: ResMut<Fade>,
    buttons: Query<&Interaction, (Changed<Interaction>, With<ReturnButton>)>,
) {
    if fade.in_progress() {
        return;
    }
    if buttons.iter().any(|i| *i == Interaction::Pressed) {
        // The fade commit to Menu wipes the run and question history.
        fade.start(GameState::Menu);
    }
}
