// audio.rs - Handles for every sound plus the music switcher.
//
// All audio files are loaded once at startup into GameAudio. Music is a
// looping AudioPlayer entity tagged MusicChannel; switching tracks despawns
// the old entity and spawns a new one. One-shots use DESPAWN playback so they
// clean themselves up.

use bevy::audio::{PlaybackSettings, Volume};
use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::combat::Battle;
use crate::game_state::GameState;

pub struct AudioPlugin;

impl Plugin for AudioPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MusicState>()
            .add_systems(Startup, setup_audio)
            .add_systems(Update, switch_music);
    }
}

#[derive(Resource)]
pub struct GameAudio {
    pub title_music: Handle<AudioSource>,
    /// Battle loop per boss, indexed by boss_id - 1.
    pub boss_music: [Handle<AudioSource>; 3],
    /// Entrance line per boss, indexed by boss_id - 1.
    pub boss_intro: [Handle<AudioSource>; 3],
    /// Taunt pool per boss; one is picked at random per question.
    pub boss_voicelines: [Vec<Handle<AudioSource>>; 3],
    pub sfx_punch: Handle<AudioSource>,
    pub sfx_crit: Handle<AudioSource>,
    pub sfx_dodge: Handle<AudioSource>,
    pub sfx_door: Handle<AudioSource>,
    pub sfx_win: Handle<AudioSource>,
    pub sfx_lose: Handle<AudioSource>,
}

fn setup_audio(mut commands: Commands, asset_server: Res<AssetServer>) {
    commands.insert_resource(GameAudio {
        title_music: asset_server.load("audio/title_theme.wav"),
        boss_music: [
            asset_server.load("audio/boss1_theme.wav"),
            asset_server.load("audio/boss2_theme.wav"),
            asset_server.load("audio/boss3_theme.wav"),
        ],
        boss_intro: [
            asset_server.load("audio/boss1_intro.wav"),
            asset_server.load("audio/boss2_intro.wav"),
            asset_server.load("audio/boss3_intro.wav"),
        ],
        boss_voicelines: [
            vec![
                asset_server.load("audio/boss1_taunt1.wav"),
                asset_server.load("audio/boss1_taunt2.wav"),
            ],
            vec![
                asset_server.load("audio/boss2_taunt1.wav"),
                asset_server.load("audio/boss2_taunt2.wav"),
            ],
            vec![
                asset_server.load("audio/boss3_taunt1.wav"),
                asset_server.load("audio/boss3_taunt2.wav"),
            ],
        ],
        sfx_punch: asset_server.load("audio/punch.wav"),
        sfx_crit: asset_server.load("audio/crit.wav"),
        sfx_dodge: asset_server.load("audio/dodge.wav"),
        sfx_door: asset_server.load("audio/door_creak.mp3"),
        sfx_win: asset_server.load("audio/win_jingle.wav"),
        sfx_lose: asset_server.load("audio/lose_jingle.wav"),
    });
}

/// Marker for the single looping music entity.
#[derive(Component)]
pub struct MusicChannel;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MusicTrack {
    Title,
    Boss(u8),
}

#[derive(Resource, Default)]
pub struct MusicState {
    playing: Option<MusicTrack>,
}

/// Boss 1's lines were recorded hot; the rest sit at a comfortable level.
pub fn boss_voice_volume(boss_id: u8) -> f32 {
    if boss_id == 1 {
        1.0
    } else {
        0.3
    }
}

pub fn play_sfx(commands: &mut Commands, source: Handle<AudioSource>, volume: f32) {
    commands.spawn((
        AudioPlayer::new(source),
        PlaybackSettings::DESPAWN.with_volume(Volume::Linear(volume)),
    ));
}

pub fn play_intro_voice(commands: &mut Commands, audio: &GameAudio, boss_id: u8) {
    let idx = (boss_id.saturating_sub(1) as usize).min(2);
    play_sfx(
        commands,
        audio.boss_intro[idx].clone(),
        boss_voice_volume(boss_id),
    );
}

/// Plays a random taunt from the boss's pool.
pub fn play_boss_voice(
    commands: &mut Commands,
    audio: &GameAudio,
    boss_id: u8,
    rng: &mut impl Rng,
) {
    let idx = (boss_id.saturating_sub(1) as usize).min(2);
    if let Some(line) = audio.boss_voicelines[idx].choose(rng) {
        play_sfx(commands, line.clone(), boss_voice_volume(boss_id));
    }
}

pub fn stop_music(commands: &mut Commands) {
    commands.queue(|world: &mut World| {
        let mut channels = world.query_filtered::<Entity, With<MusicChannel>>();
        let entities: Vec<Entity> = channels.iter(world).collect();
        for entity in entities {
            world.despawn(entity);
        }
    });
}

/// Keeps the looping track in line with the current screen. Victory staging
/// silences music itself; a None desire here leaves whatever is playing.
fn switch_music(
    mut commands: Commands,
    state: Res<State<GameState>>,
    battle: Option<Res<Battle>>,
    audio: Res<GameAudio>,
    mut music: ResMut<MusicState>,
    channels: Query<Entity, With<MusicChannel>>,
) {
    let desired = match state.get() {
        GameState::Menu | GameState::Select => Some(MusicTrack::Title),
        GameState::Battle => battle
            .filter(|b| b.victory.is_none())
            .map(|b| MusicTrack::Boss(b.boss.kind.boss_id())),
        _ => None,
    };

    let Some(track) = desired else {
        // No opinion for this screen; keep playing what is playing.
        return;
    };
    if music.playing == Some(track) && !channels.is_empty() {
        return;
    }

    for entity in channels.iter() {
        commands.entity(entity).despawn();
    }
    let source = match track {
        MusicTrack::Title => audio.title_music.clone(),
        MusicTrack::Boss(id) => {
            let idx = (id.saturating_sub(1) as usize).min(2);
            audio.boss_music[idx].clone()
        }
    };
    commands.spawn((
        MusicChannel,
        AudioPlayer::new(source),
        PlaybackSettings::LOOP.with_volume(Volume::Linear(0.5)),
    ));
    music.playing = Some(track);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boss_one_voice_is_full_volume() {
        assert_eq!(boss_voice_volume(1), 1.0);
        assert_eq!(boss_voice_volume(2), 0.3);
        assert_eq!(boss_voice_volume(3), 0.3);
    }
}
