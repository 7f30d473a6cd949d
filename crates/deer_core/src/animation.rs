//! Deer animation: a closed state set, a pure transition table, and
//! frame-based clip playback.
//!
//! Clip timing uses integer microseconds so playback advances identically on
//! every platform. Clip files store `duration_ms` for readability and are
//! converted on load.
//!
//! Death is terminal: once the deer is dead no event moves it out of that
//! state until the animator is reset.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

pub const MIN_RUN_SPEED: f32 = 0.5;
pub const MAX_RUN_SPEED: f32 = 2.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DeerState {
    #[default]
    Idle,
    Run,
    Jump,
    Death,
    Spin,
}

impl DeerState {
    pub const ALL: [DeerState; 5] = [
        DeerState::Idle,
        DeerState::Run,
        DeerState::Jump,
        DeerState::Death,
        DeerState::Spin,
    ];

    /// Clip name used in clip-set files.
    pub fn clip_name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Run => "run",
            Self::Jump => "jump",
            Self::Death => "death",
            Self::Spin => "spin",
        }
    }

    pub fn from_clip_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.clip_name() == name)
    }
}

impl fmt::Display for DeerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.clip_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeerEvent {
    SetIdle,
    Run(f32),
    Jump,
    Die,
    TakeAntidote,
    /// The current non-looping clip reached its last frame.
    ClipFinished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Jump,
    Death,
    Antidote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: DeerState,
    pub cue: Option<SoundCue>,
}

/// State x event -> next state. `None` means the event is ignored.
pub fn transition(state: DeerState, event: DeerEvent) -> Option<Transition> {
    use DeerEvent as E;
    use DeerState as S;

    let (next, cue) = match (state, event) {
        (S::Death, _) => return None,
        (_, E::Die) => (S::Death, Some(SoundCue::Death)),
        (_, E::Jump) => (S::Jump, Some(SoundCue::Jump)),
        (_, E::TakeAntidote) => (S::Spin, Some(SoundCue::Antidote)),
        (_, E::SetIdle) => (S::Idle, None),
        (_, E::Run(_)) => (S::Run, None),
        (S::Spin, E::ClipFinished) => (S::Idle, None),
        (_, E::ClipFinished) => return None,
    };
    Some(Transition { next, cue })
}

pub fn clamp_run_speed(speed: f32) -> f32 {
    speed.clamp(MIN_RUN_SPEED, MAX_RUN_SPEED)
}

#[derive(Debug, Clone)]
pub struct ClipFrame {
    pub sprite_id: String,
    pub duration_us: u64,
}

#[derive(Debug, Clone)]
pub struct Clip {
    pub frames: Vec<ClipFrame>,
    pub looping: bool,
}

impl Clip {
    pub fn total_duration_us(&self) -> u64 {
        self.frames.iter().map(|f| f.duration_us).sum()
    }
}

/// One clip per deer state, loaded from a clip-set file.
#[derive(Debug, Clone)]
pub struct ClipSet {
    pub animation_id: String,
    clips: HashMap<DeerState, Clip>,
}

impl ClipSet {
    pub fn clip(&self, state: DeerState) -> Option<&Clip> {
        self.clips.get(&state)
    }
}

/// Playback cursor into one clip.
#[derive(Debug, Clone, Default)]
pub struct ClipPlayback {
    pub frame_index: usize,
    pub elapsed_us: u64,
    pub finished: bool,
}

impl ClipPlayback {
    /// Advance by `dt_us` and return the sprite to show. Returns `true` in the
    /// second slot on the tick a non-looping clip finishes.
    pub fn tick<'a>(&mut self, dt_us: u64, clip: &'a Clip) -> (&'a str, bool) {
        let Some(last) = clip.frames.last() else {
            return ("", false);
        };
        if self.finished {
            return (&last.sprite_id, false);
        }

        self.elapsed_us += dt_us;
        let mut just_finished = false;

        loop {
            let frame = &clip.frames[self.frame_index];
            if self.elapsed_us < frame.duration_us {
                break;
            }
            self.elapsed_us -= frame.duration_us;
            self.frame_index += 1;

            if self.frame_index >= clip.frames.len() {
                if clip.looping {
                    self.frame_index = 0;
                } else {
                    self.frame_index = clip.frames.len() - 1;
                    self.elapsed_us = 0;
                    self.finished = true;
                    just_finished = true;
                    break;
                }
            }
        }

        (&clip.frames[self.frame_index].sprite_id, just_finished)
    }
}

/// Drives the deer's animation state and, when clips are loaded, its sprite.
#[derive(Debug, Clone)]
pub struct DeerAnimator {
    state: DeerState,
    run_speed: f32,
    clips: Option<ClipSet>,
    playback: ClipPlayback,
    sprite_id: String,
}

impl DeerAnimator {
    pub fn new(clips: Option<ClipSet>) -> Self {
        Self {
            state: DeerState::Idle,
            run_speed: 0.0,
            clips,
            playback: ClipPlayback::default(),
            sprite_id: String::new(),
        }
    }

    pub fn state(&self) -> DeerState {
        self.state
    }

    pub fn run_speed(&self) -> f32 {
        self.run_speed
    }

    pub fn sprite_id(&self) -> &str {
        &self.sprite_id
    }

    pub fn is_dead(&self) -> bool {
        self.state == DeerState::Death
    }

    /// True while a loaded one-shot clip (jump or spin) is still playing.
    pub fn is_busy(&self) -> bool {
        matches!(self.state, DeerState::Jump | DeerState::Spin)
            && self
                .clips
                .as_ref()
                .and_then(|c| c.clip(self.state))
                .is_some_and(|clip| !clip.looping && !self.playback.finished)
    }

    /// Apply an event; returns the sound cue to play, if any.
    pub fn apply(&mut self, event: DeerEvent) -> Option<SoundCue> {
        let Transition { next, cue } = transition(self.state, event)?;

        match event {
            DeerEvent::Run(speed) => self.run_speed = clamp_run_speed(speed),
            DeerEvent::SetIdle => self.run_speed = 0.0,
            _ => {}
        }

        if next != self.state {
            log::debug!("Deer animation: {} -> {}", self.state, next);
            self.state = next;
            self.playback = ClipPlayback::default();
        } else if cue.is_some() {
            // Re-triggering a one-shot restarts its clip.
            self.playback = ClipPlayback::default();
        }
        cue
    }

    /// Advance clip playback. Run clips play faster with higher run speed.
    pub fn tick(&mut self, dt_us: u64) -> Option<SoundCue> {
        let clip = self.clips.as_ref().and_then(|c| c.clip(self.state))?;

        let scaled = if self.state == DeerState::Run {
            (dt_us as f64 * f64::from(self.run_speed)) as u64
        } else {
            dt_us
        };

        let (sprite_id, just_finished) = self.playback.tick(scaled, clip);
        self.sprite_id = sprite_id.to_string();

        if just_finished {
            return self.apply(DeerEvent::ClipFinished);
        }
        None
    }

    pub fn reset(&mut self) {
        self.state = DeerState::Idle;
        self.run_speed = 0.0;
        self.playback = ClipPlayback::default();
        self.sprite_id.clear();
    }
}

// --- JSON deserialization types (private) ---

#[derive(Debug, Deserialize)]
struct ClipSetJson {
    version: String,
    animation_id: String,
    clips: HashMap<String, ClipJson>,
}

#[derive(Debug, Deserialize)]
struct ClipJson {
    frames: Vec<ClipFrameJson>,
    #[serde(default)]
    looping: bool,
}

#[derive(Debug, Deserialize)]
struct ClipFrameJson {
    sprite_id: String,
    duration_ms: u64,
}

pub fn load_clip_set(path: &Path) -> Result<ClipSet, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read clip set {}: {e}", path.display()))?;
    parse_clip_set(&raw).map_err(|e| format!("Clip set {}: {e}", path.display()))
}

pub fn parse_clip_set(raw: &str) -> Result<ClipSet, String> {
    let json: ClipSetJson =
        serde_json::from_str(raw).map_err(|e| format!("failed to parse: {e}"))?;

    if json.version != "0.1" {
        return Err(format!("unsupported version '{}'", json.version));
    }
    if json.animation_id.is_empty() {
        return Err("animation_id is empty".to_string());
    }

    let mut clips = HashMap::new();
    for (name, clip) in json.clips {
        let state = DeerState::from_clip_name(&name)
            .ok_or_else(|| format!("unknown clip '{name}'"))?;
        if clip.frames.is_empty() {
            return Err(format!("clip '{name}' has no frames"));
        }
        let mut frames = Vec::with_capacity(clip.frames.len());
        for (i, frame) in clip.frames.into_iter().enumerate() {
            if frame.sprite_id.is_empty() {
                return Err(format!("clip '{name}' frame {i} has empty sprite_id"));
            }
            if frame.duration_ms == 0 {
                return Err(format!("clip '{name}' frame {i} has zero duration"));
            }
            frames.push(ClipFrame {
                sprite_id: frame.sprite_id,
                duration_us: frame.duration_ms * 1000,
            });
        }
        clips.insert(
            state,
            Clip {
                frames,
                looping: clip.looping,
            },
        );
    }

    for state in DeerState::ALL {
        if !clips.contains_key(&state) {
            log::warn!("Clip set '{}' has no '{}' clip", json.animation_id, state);
        }
    }

    Ok(ClipSet {
        animation_id: json.animation_id,
        clips,
    })
}
