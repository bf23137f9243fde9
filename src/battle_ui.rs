// battle_ui.rs - All screen-space UI for the Battle state.
//
// The HUD (HP bars, control buttons, battle log) is spawned once on entering
// battle and updated every frame from the Battle resource and GameRun. The
// question panel is spawned and torn down dynamically, mirroring whether a
// question is pending. Nothing here mutates combat state except through the
// button markers combat.rs watches.

use bevy::prelude::*;

use crate::combat::{
    AnswerButton, AttackButton, Battle, HealButton, COMBAT_TEXT_SECS,
};
use crate::game_state::{GameRun, GameState};

const HP_BAR_W: f32 = 560.0;
const LOW_HP_FRACTION: f32 = 0.25;

#[derive(Component)]
struct BattleUiRoot;

#[derive(Component)]
struct PlayerHpFill;

/// Root node of the player's HP block; shaken when HP runs low.
#[derive(Component)]
struct PlayerHpBlock;

#[derive(Component)]
struct BossHpFill;

#[derive(Component)]
struct PlayerHpText;

#[derive(Component)]
struct BossHpText;

#[derive(Component)]
struct HealCountText;

#[derive(Component)]
struct BattleLogText;

#[derive(Component)]
struct QuestionPanel;

/// Full-screen white flash for special moments (Medallion crit, curve save).
#[derive(Component)]
struct FlashOverlay(Timer);

pub struct BattleUiPlugin;

impl Plugin for BattleUiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Battle), spawn_hud)
            .add_systems(
                Update,
                (
                    update_hp_bars,
                    shake_low_hp_block,
                    update_battle_log,
                    update_button_colors,
                    sync_question_panel,
                    run_flash_overlays,
                )
                    .run_if(in_state(GameState::Battle)),
            )
            .add_systems(OnExit(GameState::Battle), despawn_hud);
    }
}

fn spawn_hud(mut commands: Commands, battle: Res<Battle>, run: Res<GameRun>) {
    let player_name = run
        .player
        .as_ref()
        .map(|p| p.archetype.display_name())
        .unwrap_or("Student");

    commands
        .spawn((
            BattleUiRoot,
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(0.0),
                top: Val::Px(0.0),
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                ..default()
            },
        ))
        .with_children(|root| {
            // Player HP, top left.
            spawn_hp_block(
                root,
                player_name,
                Val::Px(40.0),
                None,
                PlayerHpFill,
                PlayerHpText,
                Color::srgb(0.2, 0.8, 0.3),
            );
            // Boss HP, top right.
            spawn_hp_block(
                root,
                battle.boss.kind.display_name(),
                Val::Auto,
                Some(Val::Px(40.0)),
                BossHpFill,
                BossHpText,
                Color::srgb(0.85, 0.2, 0.2),
            );

            // Battle log, centered above the controls.
            root.spawn((
                BattleLogText,
                Text::new(""),
                TextFont {
                    font_size: 44.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                TextLayout::new_with_justify(Justify::Center),
                Node {
                    position_type: PositionType::Absolute,
                    left: Val::Percent(20.0),
                    width: Val::Percent(60.0),
                    bottom: Val::Px(260.0),
                    ..default()
                },
            ));

            // Control box along the bottom.
            root.spawn((
                Node {
                    position_type: PositionType::Absolute,
                    left: Val::Percent(15.0),
                    width: Val::Percent(70.0),
                    bottom: Val::Px(40.0),
                    height: Val::Px(160.0),
                    align_items: AlignItems::Center,
                    justify_content: JustifyContent::SpaceEvenly,
                    ..default()
                },
                BackgroundColor(Color::srgba(0.05, 0.05, 0.12, 0.9)),
            ))
            .with_children(|controls| {
                spawn_control_button(controls, "ATTACK", AttackButton);
                spawn_control_button(controls, "HEAL", HealButton);
                controls.spawn((
                    HealCountText,
                    Text::new(""),
                    TextFont {
                        font_size: 30.0,
                        ..default()
                    },
                    TextColor(Color::srgb(0.8, 0.8, 0.9)),
                ));
            });
        });
}

fn spawn_hp_block(
    parent: &mut ChildSpawnerCommands,
    name: &str,
    left: Val,
    right: Option<Val>,
    fill_marker: impl Component,
    text_marker: impl Component,
    fill_color: Color,
) {
    let mut node = Node {
        position_type: PositionType::Absolute,
        left,
        top: Val::Px(40.0),
        width: Val::Px(HP_BAR_W),
        flex_direction: FlexDirection::Column,
        row_gap: Val::Px(6.0),
        ..default()
    };
    let is_player = right.is_none();
    if let Some(right) = right {
        node.left = Val::Auto;
        node.right = right;
    }
    let mut block = parent.spawn(node);
    if is_player {
        block.insert(PlayerHpBlock);
    }
    block.with_children(|block| {
        block.spawn((
            Text::new(name),
            TextFont {
                font_size: 34.0,
                ..default()
            },
            TextColor(Color::WHITE),
        ));
        block
            .spawn((
                Node {
                    width: Val::Percent(100.0),
                    height: Val::Px(30.0),
                    ..default()
                },
                BackgroundColor(Color::srgb(0.15, 0.15, 0.15)),
            ))
            .with_children(|bar| {
                bar.spawn((
                    fill_marker,
                    Node {
                        width: Val::Percent(100.0),
                        height: Val::Percent(100.0),
                        ..default()
                    },
                    BackgroundColor(fill_color),
                ));
            });
        block.spawn((
            text_marker,
            Text::new(""),
            TextFont {
                font_size: 26.0,
                ..default()
            },
            TextColor(Color::srgb(0.85, 0.85, 0.85)),
        ));
    });
}

fn spawn_control_button(parent: &mut ChildSpawnerCommands, label: &str, marker: impl Component) {
    parent
        .spawn((
            marker,
            Button,
            Node {
                width: Val::Px(260.0),
                height: Val::Px(90.0),
                align_items: AlignItems::Center,
                justify_content: JustifyContent::Center,
                ..default()
            },
            BackgroundColor(Color::srgb(0.25, 0.25, 0.4)),
        ))
        .with_children(|b| {
            b.spawn((
                Text::new(label),
                TextFont {
                    font_size: 40.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });
}

fn update_hp_bars(
    battle: Res<Battle>,
    run: Res<GameRun>,
    mut fills: ParamSet<(
        Query<(&mut Node, &mut BackgroundColor), With<PlayerHpFill>>,
        Query<(&mut Node, &mut BackgroundColor), With<BossHpFill>>,
    )>,
    mut texts: ParamSet<(
        Query<&mut Text, With<PlayerHpText>>,
        Query<&mut Text, With<BossHpText>>,
        Query<&mut Text, With<HealCountText>>,
    )>,
) {
    let (player_hp, player_max, heals) = run
        .player
        .as_ref()
        .map(|p| (p.hp, p.max_hp(), p.remaining_heals))
        .unwrap_or((0, 100, 0));

    let player_frac = (player_hp.max(0) as f32 / player_max as f32).clamp(0.0, 1.0);
    for (mut node, mut color) in fills.p0().iter_mut() {
        node.width = Val::Percent(player_frac * 100.0);
        // Bar reddens when the player is nearly done for.
        color.0 = if player_frac <= LOW_HP_FRACTION {
            Color::srgb(0.9, 0.25, 0.2)
        } else {
            Color::srgb(0.2, 0.8, 0.3)
        };
    }
    let boss_frac = (battle.boss.hp.max(0) as f32 / battle.boss.max_hp() as f32).clamp(0.0, 1.0);
    for (mut node, _) in fills.p1().iter_mut() {
        node.width = Val::Percent(boss_frac * 100.0);
    }

    for mut text in texts.p0().iter_mut() {
        text.0 = format!("{} / {}", player_hp.max(0), player_max);
    }
    for mut text in texts.p1().iter_mut() {
        text.0 = format!("{} / {}", battle.boss.hp.max(0), battle.boss.max_hp());
    }
    for mut text in texts.p2().iter_mut() {
        text.0 = format!("Heals: {heals}");
    }
}

/// Shows the current log line until it expires; spawns a flash overlay the
/// frame a special line lands.
fn update_battle_log(
    mut battle: ResMut<Battle>,
    mut log_text: Query<&mut Text, With<BattleLogText>>,
    mut commands: Commands,
    time: Res<Time>,
) {
    let now = time.elapsed_secs();
    let expired = battle
        .log
        .as_ref()
        .is_some_and(|line| now - line.shown_at > COMBAT_TEXT_SECS);
    if expired {
        battle.log = None;
    }

    if let Some(line) = battle.log.as_mut() {
        if line.special {
            line.special = false;
            commands.spawn((
                FlashOverlay(Timer::from_seconds(0.25, TimerMode::Once)),
                Node {
                    position_type: PositionType::Absolute,
                    left: Val::Px(0.0),
                    top: Val::Px(0.0),
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    ..default()
                },
                BackgroundColor(Color::srgba(1.0, 1.0, 1.0, 0.8)),
                GlobalZIndex(50),
            ));
        }
    }

    for mut text in log_text.iter_mut() {
        text.0 = battle
            .log
            .as_ref()
            .map(|line| line.text.clone())
            .unwrap_or_default();
    }
}

/// Rattles the player's HP box while their health is in the red.
fn shake_low_hp_block(
    run: Res<GameRun>,
    time: Res<Time>,
    mut blocks: Query<&mut Node, With<PlayerHpBlock>>,
) {
    let Some(player) = run.player.as_ref() else {
        return;
    };
    let frac = player.hp.max(0) as f32 / player.max_hp() as f32;
    let offset = if frac <= LOW_HP_FRACTION {
        (time.elapsed_secs() * 40.0).sin() * 4.0
    } else {
        0.0
    };
    for mut node in blocks.iter_mut() {
        node.left = Val::Px(40.0 + offset);
    }
}

fn run_flash_overlays(
    mut commands: Commands,
    time: Res<Time>,
    mut overlays: Query<(Entity, &mut FlashOverlay, &mut BackgroundColor)>,
) {
    for (entity, mut flash, mut color) in overlays.iter_mut() {
        flash.0.tick(time.delta());
        color.0 = Color::srgba(1.0, 1.0, 1.0, 0.8 * (1.0 - flash.0.fraction()));
        if flash.0.just_finished() {
            commands.entity(entity).despawn();
        }
    }
}

/// Greys out the attack button during lockout and both buttons while input
/// is blocked.
fn update_button_colors(
    battle: Res<Battle>,
    time: Res<Time>,
    mut attack: Query<&mut BackgroundColor, (With<AttackButton>, Without<HealButton>)>,
    mut heal: Query<&mut BackgroundColor, (With<HealButton>, Without<AttackButton>)>,
) {
    let now = time.elapsed_secs();
    let blocked = battle.input_blocked();
    let attack_off = blocked || battle.attack_locked(now);
    for mut color in attack.iter_mut() {
        color.0 = if attack_off {
            Color::srgb(0.3, 0.3, 0.3)
        } else {
            Color::srgb(0.25, 0.25, 0.4)
        };
    }
    for mut color in heal.iter_mut() {
        color.0 = if blocked {
            Color::srgb(0.3, 0.3, 0.3)
        } else {
            Color::srgb(0.25, 0.25, 0.4)
        };
    }
}

/// Keeps the question panel in sync with Battle::question: spawn when a
/// question appears, tear down once it is answered.
fn sync_question_panel(
    mut commands: Commands,
    battle: Res<Battle>,
    panel: Query<Entity, With<QuestionPanel>>,
) {
    match (&battle.question, panel.is_empty()) {
        (Some(question), true) => {
            commands
                .spawn((
                    QuestionPanel,
                    Node {
                        position_type: PositionType::Absolute,
                        left: Val::Percent(15.0),
                        top: Val::Percent(15.0),
                        width: Val::Percent(70.0),
                        height: Val::Percent(60.0),
                        flex_direction: FlexDirection::Column,
                        align_items: AlignItems::Center,
                        row_gap: Val::Px(20.0),
                        padding: UiRect::all(Val::Px(30.0)),
                        ..default()
                    },
                    BackgroundColor(Color::srgba(0.03, 0.03, 0.1, 0.96)),
                    GlobalZIndex(20),
                ))
                .with_children(|panel| {
                    panel.spawn((
                        Text::new(question.text.clone()),
                        TextFont {
                            font_size: 40.0,
                            ..default()
                        },
                        TextColor(Color::WHITE),
                        TextLayout::new_with_justify(Justify::Center),
                    ));
                    for (i, choice) in question.choices.iter().enumerate() {
                        panel
                            .spawn((
                                AnswerButton(i),
                                Button,
                                Node {
                                    width: Val::Percent(90.0),
                                    height: Val::Px(70.0),
                                    align_items: AlignItems::Center,
                                    justify_content: JustifyContent::Center,
                                    ..default()
                                },
                                BackgroundColor(Color::srgb(0.18, 0.18, 0.35)),
                            ))
                            .with_children(|b| {
                                b.spawn((
                                    Text::new(choice.clone()),
                                    TextFont {
                                        font_size: 32.0,
                                        ..default()
                                    },
                                    TextColor(Color::WHITE),
                                ));
                            });
                    }
                });
        }
        (None, false) => {
            for entity in panel.iter() {
                commands.entity(entity).despawn();
            }
        }
        _ => {}
    }
}

fn despawn_hud(
    mut commands: Commands,
    ui: Query<Entity, Or<(With<BattleUiRoot>, With<QuestionPanel>, With<FlashOverlay>)>>,
) {
    for entity in ui.iter() {
        commands.entity(entity).despawn();
    }
}
