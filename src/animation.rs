// animation.rs - The two-level sprite animation machine.
//
// Each character runs a steady-state loop (Idle or Walk, keyed by facing)
// that can be preempted by at most one override track (slash/hurt/spellcast).
// An override plays on its own faster clock, then either clears back to the
// steady loop or freezes on its last frame until replaced. Everything
// advances by polling Animator::update(now) once per frame.

use std::collections::HashMap;

use bevy::prelude::*;
use thiserror::Error;

use crate::characters::CharacterId;

/// Seconds per steady-state frame (idle breathing, walk cycle).
pub const STEADY_INTERVAL: f32 = 0.15;
/// Seconds per override frame. Action animations run faster.
pub const OVERRIDE_INTERVAL: f32 = 0.10;

/// Pixel amplitude of the idle bob.
const IDLE_BOUNCE: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn row(self) -> SheetRow {
        match self {
            Facing::Left => SheetRow::Left,
            Facing::Right => SheetRow::Right,
        }
    }
}

/// Steady-state logical animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Motion {
    Idle,
    Walk,
}

/// One row of an LPC-style sprite sheet (four direction rows per sheet).
/// Overrides carry their own row hint: a hurt reel plays on the Up row no
/// matter which way the character faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SheetRow {
    Up,
    Left,
    Down,
    Right,
}

impl SheetRow {
    pub fn index(self) -> usize {
        match self {
            SheetRow::Up => 0,
            SheetRow::Left => 1,
            SheetRow::Down => 2,
            SheetRow::Right => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Idle,
    Walk,
    Slash,
    Hurt,
    Spellcast,
}

impl TrackKind {
    pub const ALL: [TrackKind; 5] = [
        TrackKind::Idle,
        TrackKind::Walk,
        TrackKind::Slash,
        TrackKind::Hurt,
        TrackKind::Spellcast,
    ];

    /// Frame columns in the sheet for this track.
    pub fn sheet_columns(self) -> usize {
        match self {
            TrackKind::Idle => 2,
            TrackKind::Walk => 9,
            TrackKind::Slash => 6,
            TrackKind::Hurt => 6,
            TrackKind::Spellcast => 7,
        }
    }

    /// File name under the character's sprite folder.
    pub fn file(self) -> &'static str {
        match self {
            TrackKind::Idle => "idle.png",
            TrackKind::Walk => "walk.png",
            TrackKind::Slash => "slash.png",
            TrackKind::Hurt => "hurt.png",
            TrackKind::Spellcast => "spellcast.png",
        }
    }
}

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("character {0:?} has no frames for required track {1:?}")]
    EmptyTrack(CharacterId, TrackKind),
}

/// A finite track playing atop the steady loop.
#[derive(Clone, Debug)]
struct OverrideTrack {
    track: TrackKind,
    row: SheetRow,
    frame_count: usize,
    freeze_last: bool,
    frame_index: usize,
    finished: bool,
}

/// Per-character animation state. No handles, no assets, just frame
/// arithmetic against a caller-supplied clock, so it tests in isolation.
#[derive(Component, Clone, Debug)]
pub struct Animator {
    pub facing: Facing,
    motion: Motion,
    idle_frames: usize,
    walk_frames: usize,
    frame_index: usize,
    last_frame_at: f32,
    active_override: Option<OverrideTrack>,
}

impl Animator {
    /// Rejects empty steady tracks up front; a character that cannot idle
    /// would otherwise index-fault at draw time.
    pub fn new(id: CharacterId, idle_frames: usize, walk_frames: usize) -> Result<Self, TrackError> {
        if idle_frames == 0 {
            return Err(TrackError::EmptyTrack(id, TrackKind::Idle));
        }
        if walk_frames == 0 {
            return Err(TrackError::EmptyTrack(id, TrackKind::Walk));
        }
        Ok(Animator {
            facing: Facing::Right,
            motion: Motion::Idle,
            idle_frames,
            walk_frames,
            frame_index: 0,
            last_frame_at: 0.0,
            active_override: None,
        })
    }

    /// Standard character: sheet-sized idle and walk loops.
    pub fn standard(id: CharacterId) -> Self {
        // The counts come from TrackKind constants and are never zero, so the
        // fallible constructor cannot reject them.
        match Animator::new(id, TrackKind::Idle.sheet_columns(), TrackKind::Walk.sheet_columns()) {
            Ok(a) => a,
            Err(_) => unreachable!("sheet column constants are non-zero"),
        }
    }

    pub fn motion(&self) -> Motion {
        self.motion
    }

    /// Switching loops (Idle <-> Walk) restarts the frame clock so the new
    /// loop starts on frame 0 instead of jumping mid-cycle. No effect on an
    /// in-flight override.
    pub fn set_motion(&mut self, motion: Motion, now: f32) {
        if self.motion != motion {
            self.motion = motion;
            self.frame_index = 0;
            self.last_frame_at = now;
        }
    }

    /// Starts (or replaces) the override track. Any in-flight override is
    /// discarded; there is no queueing.
    pub fn start_override(
        &mut self,
        track: TrackKind,
        row: SheetRow,
        frame_count: usize,
        freeze_last: bool,
        now: f32,
    ) {
        self.active_override = Some(OverrideTrack {
            track,
            row,
            frame_count: frame_count.max(1),
            freeze_last,
            frame_index: 0,
            finished: false,
        });
        self.last_frame_at = now;
    }

    /// Drops any override (frozen or not) and resumes the steady loop.
    pub fn clear_override(&mut self, now: f32) {
        if self.active_override.take().is_some() {
            self.frame_index = 0;
            self.last_frame_at = now;
        }
    }

    pub fn has_override(&self) -> bool {
        self.active_override.is_some()
    }

    /// True once a freeze-on-end override has reached its last frame.
    pub fn override_finished(&self) -> bool {
        self.active_override.as_ref().is_some_and(|ov| ov.finished)
    }

    /// Advances frame selection against the clock. Idempotent for a given
    /// `now`: a second call in the same tick advances nothing.
    pub fn update(&mut self, now: f32) {
        if let Some(ov) = self.active_override.as_mut() {
            if ov.finished {
                return;
            }
            if now - self.last_frame_at > OVERRIDE_INTERVAL {
                self.last_frame_at = now;
                ov.frame_index += 1;
                if ov.frame_index >= ov.frame_count {
                    if ov.freeze_last {
                        ov.frame_index = ov.frame_count - 1;
                        ov.finished = true;
                    } else {
                        self.active_override = None;
                        self.frame_index = 0;
                    }
                }
            }
            return;
        }

        if now - self.last_frame_at > STEADY_INTERVAL {
            self.last_frame_at = now;
            let count = match self.motion {
                Motion::Idle => self.idle_frames,
                Motion::Walk => self.walk_frames,
            };
            self.frame_index = (self.frame_index + 1) % count;
        }
    }

    /// Which (track, row, frame) to draw right now.
    pub fn current_frame(&self) -> (TrackKind, SheetRow, usize) {
        match &self.active_override {
            Some(ov) => (ov.track, ov.row, ov.frame_index),
            None => {
                let track = match self.motion {
                    Motion::Idle => TrackKind::Idle,
                    Motion::Walk => TrackKind::Walk,
                };
                (track, self.facing.row(), self.frame_index)
            }
        }
    }
}

/// One loaded sheet: strip image plus its grid layout.
pub struct SpriteSheet {
    pub image: Handle<Image>,
    pub layout: Handle<TextureAtlasLayout>,
    pub columns: usize,
}

/// All character sheets, loaded once at startup so scenes never re-request
/// the same assets.
#[derive(Resource, Default)]
pub struct SpriteLibrary {
    sheets: HashMap<(CharacterId, TrackKind), SpriteSheet>,
}

impl SpriteLibrary {
    pub fn insert(&mut self, id: CharacterId, track: TrackKind, sheet: SpriteSheet) {
        self.sheets.insert((id, track), sheet);
    }

    pub fn sheet(&self, id: CharacterId, track: TrackKind) -> Option<&SpriteSheet> {
        self.sheets.get(&(id, track))
    }

    /// A missing action track falls back to the character's Idle sheet; a
    /// character with no Idle sheet at all is caught by `validate`.
    pub fn sheet_or_idle(&self, id: CharacterId, track: TrackKind) -> Option<&SpriteSheet> {
        self.sheet(id, track).or_else(|| self.sheet(id, TrackKind::Idle))
    }

    /// Every character must at least idle and walk.
    pub fn validate(&self) -> Result<(), TrackError> {
        for id in CharacterId::ALL {
            for track in [TrackKind::Idle, TrackKind::Walk] {
                if self.sheet(id, track).is_none() {
                    return Err(TrackError::EmptyTrack(id, track));
                }
            }
        }
        Ok(())
    }
}

/// Ties a sprite entity to its sheets and its resting height.
#[derive(Component)]
pub struct CharacterSprite {
    pub id: CharacterId,
    pub base_y: f32,
}

pub struct AnimationPlugin;

impl Plugin for AnimationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreStartup, load_sprite_sheets)
            .add_systems(Update, animate_characters);
    }
}

fn load_sprite_sheets(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut layouts: ResMut<Assets<TextureAtlasLayout>>,
) {
    // One layout per track kind, shared by all characters: the sheets are
    // all 64x64 LPC grids with four direction rows.
    let mut track_layouts = HashMap::new();
    for track in TrackKind::ALL {
        let layout = layouts.add(TextureAtlasLayout::from_grid(
            UVec2::new(64, 64),
            track.sheet_columns() as u32,
            4,
            None,
            None,
        ));
        track_layouts.insert(track, layout);
    }

    let mut library = SpriteLibrary::default();
    for id in CharacterId::ALL {
        for track in TrackKind::ALL {
            let path = format!("sprites/{}/{}", id.folder(), track.file());
            library.insert(
                id,
                track,
                SpriteSheet {
                    image: asset_server.load(path),
                    layout: track_layouts[&track].clone(),
                    columns: track.sheet_columns(),
                },
            );
        }
    }

    if let Err(e) = library.validate() {
        error!("sprite library rejected: {e}");
    }
    commands.insert_resource(library);
}

/// Advances every visible character's animation and maps the resulting frame
/// onto its sprite's atlas index.
fn animate_characters(
    mut query: Query<(&mut Animator, &mut Sprite, &mut Transform, &CharacterSprite)>,
    library: Res<SpriteLibrary>,
    time: Res<Time>,
) {
    let now = time.elapsed_secs();
    for (mut animator, mut sprite, mut transform, character) in query.iter_mut() {
        animator.update(now);

        let (track, row, frame) = animator.current_frame();
        let Some(sheet) = library.sheet_or_idle(character.id, track) else {
            continue;
        };
        sprite.image = sheet.image.clone();
        sprite.texture_atlas = Some(TextureAtlas {
            layout: sheet.layout.clone(),
            index: row.index() * sheet.columns + frame.min(sheet.columns - 1),
        });

        // Idle bob: a slow sine, suppressed during walk and overrides.
        let bounce = if !animator.has_override() && animator.motion() == Motion::Idle {
            (now * 5.0).sin() * IDLE_BOUNCE
        } else {
            0.0
        };
        transform.translation.y = character.base_y + bounce;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animator() -> Animator {
        Animator::standard(CharacterId::Swi)
    }

    #[test]
    fn update_is_idempotent_within_a_tick() {
        let mut a = animator();
        a.update(0.2);
        let frame = a.current_frame().2;
        a.update(0.2);
        assert_eq!(a.current_frame().2, frame);
    }

    #[test]
    fn steady_loop_wraps() {
        let mut a = animator();
        // Idle has 2 frames at 0.15s each.
        a.update(0.2);
        assert_eq!(a.current_frame().2, 1);
        a.update(0.4);
        assert_eq!(a.current_frame().2, 0);
    }

    #[test]
    fn motion_change_restarts_frame_clock() {
        let mut a = animator();
        a.update(0.2);
        assert_eq!(a.current_frame().2, 1);
        a.set_motion(Motion::Walk, 0.2);
        assert_eq!(a.current_frame(), (TrackKind::Walk, SheetRow::Right, 0));
        // Fresh timer: no advance until a full interval after the switch.
        a.update(0.3);
        assert_eq!(a.current_frame().2, 0);
    }

    #[test]
    fn override_clears_back_to_steady() {
        let mut a = animator();
        a.start_override(TrackKind::Slash, SheetRow::Right, 3, false, 0.0);
        let mut now = 0.0;
        for _ in 0..3 {
            now += 0.11;
            a.update(now);
        }
        assert!(!a.has_override());
        assert_eq!(a.current_frame().0, TrackKind::Idle);
        assert_eq!(a.current_frame().2, 0);
    }

    #[test]
    fn freeze_on_end_stays_on_last_frame() {
        let mut a = animator();
        a.start_override(TrackKind::Hurt, SheetRow::Up, 5, true, 0.0);
        let mut now = 0.0;
        for _ in 0..50 {
            now += 0.11;
            a.update(now);
        }
        assert!(a.override_finished());
        assert_eq!(a.current_frame(), (TrackKind::Hurt, SheetRow::Up, 4));
        // Much later, still frozen on the same frame.
        a.update(now + 100.0);
        assert_eq!(a.current_frame().2, 4);
    }

    #[test]
    fn new_override_replaces_in_flight_one() {
        let mut a = animator();
        a.start_override(TrackKind::Slash, SheetRow::Right, 6, false, 0.0);
        a.update(0.11);
        assert_eq!(a.current_frame().2, 1);
        a.start_override(TrackKind::Hurt, SheetRow::Up, 3, false, 0.11);
        assert_eq!(a.current_frame(), (TrackKind::Hurt, SheetRow::Up, 0));
    }

    #[test]
    fn clear_override_unfreezes() {
        let mut a = animator();
        a.start_override(TrackKind::Hurt, SheetRow::Up, 2, true, 0.0);
        a.update(0.11);
        a.update(0.22);
        assert!(a.override_finished());
        a.clear_override(0.22);
        assert!(!a.has_override());
        assert_eq!(a.current_frame().0, TrackKind::Idle);
    }

    #[test]
    fn empty_steady_track_is_rejected_at_construction() {
        assert!(Animator::new(CharacterId::Swi, 0, 9).is_err());
        assert!(Animator::new(CharacterId::Swi, 2, 0).is_err());
    }

    #[test]
    fn library_validation_catches_missing_idle() {
        let library = SpriteLibrary::default();
        assert!(library.validate().is_err());
    }
}
