// fade.rs - Screen fade transitions.
//
// One controller owns every fade in the game: a caller asks for a transition
// with Fade::start(target), the overlay darkens to full black, the state
// switch commits exactly once at saturation, then the overlay lightens back
// out over the new screen. Starting a new fade mid-flight restarts the
// darkening and replaces the pending target; the old one never commits.

use bevy::prelude::*;

use crate::game_state::{GameRun, GameState};
use crate::questions::QuestionBank;

/// Alpha is tracked on a 0..=255 scale, 8-bit style.
pub const FADE_MAX: f32 = 255.0;
/// Alpha units per second. 12 per tick at 60Hz.
pub const FADE_SPEED: f32 = 720.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FadePhase {
    Idle,
    Darkening,
    Lightening,
}

/// The fade controller. Pure state plus a tick function; the systems below
/// wire it to time, the overlay node, and NextState.
#[derive(Resource)]
pub struct Fade {
    phase: FadePhase,
    alpha: f32,
    pending: Option<GameState>,
}

impl Default for Fade {
    fn default() -> Self {
        Fade {
            phase: FadePhase::Idle,
            alpha: 0.0,
            pending: None,
        }
    }
}

impl Fade {
    /// Begins (or restarts) a fade toward `target`. A fade already in flight
    /// has its pending target replaced and its ramp restarted from clear.
    pub fn start(&mut self, target: GameState) {
        self.phase = FadePhase::Darkening;
        self.alpha = 0.0;
        self.pending = Some(target);
    }

    pub fn in_progress(&self) -> bool {
        self.phase != FadePhase::Idle
    }

    /// Current overlay alpha in 0..=255.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Advances by `dt` seconds. Returns the target state on the single tick
    /// where the fade saturates; that is the commit point.
    pub fn tick(&mut self, dt: f32) -> Option<GameState> {
        match self.phase {
            FadePhase::Idle => None,
            FadePhase::Darkening => {
                self.alpha += FADE_SPEED * dt;
                if self.alpha >= FADE_MAX {
                    self.alpha = FADE_MAX;
                    self.phase = FadePhase::Lightening;
                    self.pending.take()
                } else {
                    None
                }
            }
            FadePhase::Lightening => {
                self.alpha -= FADE_SPEED * dt;
                if self.alpha <= 0.0 {
                    self.alpha = 0.0;
                    self.phase = FadePhase::Idle;
                }
                None
            }
        }
    }
}

/// Marker for the full-screen overlay node.
#[derive(Component)]
struct FadeOverlay;

pub struct FadePlugin;

impl Plugin for FadePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Fade>()
            .add_systems(Startup, spawn_fade_overlay)
            .add_systems(Update, (advance_fade, sync_fade_overlay).chain());
    }
}

fn spawn_fade_overlay(mut commands: Commands) {
    // A plain Node, not a Button: the overlay must never swallow clicks.
    commands.spawn((
        FadeOverlay,
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(0.0),
            top: Val::Px(0.0),
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        },
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.0)),
        GlobalZIndex(100),
    ));
}

/// Ticks the controller and commits the state switch at full black. A commit
/// back to Menu also wipes the run record and question history.
fn advance_fade(
    time: Res<Time>,
    mut fade: ResMut<Fade>,
    mut next_state: ResMut<NextState<GameState>>,
    mut run: ResMut<GameRun>,
    mut bank: ResMut<QuestionBank>,
) {
    if let Some(target) = fade.tick(time.delta_secs()) {
        if target == GameState::Menu {
            run.reset();
            bank.reset();
        }
        next_state.set(target);
    }
}

fn sync_fade_overlay(fade: Res<Fade>, mut overlay: Query<&mut BackgroundColor, With<FadeOverlay>>) {
    for mut color in overlay.iter_mut() {
        color.0 = Color::srgba(0.0, 0.0, 0.0, fade.alpha() / FADE_MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commits_exactly_once_per_cycle() {
        let mut fade = Fade::default();
        fade.start(GameState::Hallway);
        let mut commits = 0;
        for _ in 0..120 {
            if fade.tick(1.0 / 60.0).is_some() {
                commits += 1;
            }
        }
        assert_eq!(commits, 1);
        assert!(!fade.in_progress());
        assert_eq!(fade.alpha(), 0.0);
    }

    #[test]
    fn commit_happens_at_full_black() {
        let mut fade = Fade::default();
        fade.start(GameState::Battle);
        loop {
            if let Some(target) = fade.tick(1.0 / 60.0) {
                assert_eq!(target, GameState::Battle);
                break;
            }
        }
        assert_eq!(fade.alpha(), FADE_MAX);
    }

    #[test]
    fn restart_replaces_pending_target() {
        let mut fade = Fade::default();
        fade.start(GameState::Battle);
        fade.tick(1.0 / 60.0);
        fade.start(GameState::Menu);
        assert_eq!(fade.alpha(), 0.0);
        let mut committed = None;
        for _ in 0..120 {
            if let Some(t) = fade.tick(1.0 / 60.0) {
                committed = Some(t);
            }
        }
        // Only the replacement target ever commits.
        assert_eq!(committed, Some(GameState::Menu));
    }

    #[test]
    fn restart_while_lightening_ramps_from_clear() {
        let mut fade = Fade::default();
        fade.start(GameState::Battle);
        while fade.tick(1.0 / 60.0).is_none() {}
        // Part-way back out of black.
        fade.tick(1.0 / 60.0);
        fade.tick(1.0 / 60.0);
        assert!(fade.alpha() > 0.0);

        fade.start(GameState::Menu);
        assert_eq!(fade.alpha(), 0.0);
        // The new target takes a full darkening ramp, not the few ticks
        // left from the previous near-black alpha.
        let mut ticks = 0;
        while fade.tick(1.0 / 60.0).is_none() {
            ticks += 1;
            assert!(ticks < 60, "fade never saturated");
        }
        assert_eq!(ticks, 21);
    }

    #[test]
    fn idle_ticks_are_inert() {
        let mut fade = Fade::default();
        assert_eq!(fade.tick(10.0), None);
        assert_eq!(fade.alpha(), 0.0);
        assert!(!fade.in_progress());
    }

    #[test]
    fn darkening_takes_about_a_third_of_a_second() {
        let mut fade = Fade::default();
        fade.start(GameState::Hallway);
        let mut ticks = 0;
        while fade.tick(1.0 / 60.0).is_none() {
            ticks += 1;
            assert!(ticks < 60, "fade never saturated");
        }
        // 255 / 12-per-tick rounds up to 22 ticks.
        assert_eq!(ticks, 21);
    }
}
