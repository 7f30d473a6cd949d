//! Sound-cue dispatch. The host has no audio device; it resolves each cue to
//! its configured clip and records what would have been played.

use std::collections::HashMap;

use deer_core::animation::SoundCue;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AudioConfig {
    #[serde(default)]
    pub jump: Option<String>,
    #[serde(default)]
    pub death: Option<String>,
    #[serde(default)]
    pub antidote: Option<String>,
}

pub struct SoundLibrary {
    clips: HashMap<SoundCue, String>,
    played: Vec<String>,
    missing: u32,
}

impl SoundLibrary {
    pub fn new(config: &AudioConfig) -> Self {
        let mut clips = HashMap::new();
        for (cue, clip) in [
            (SoundCue::Jump, &config.jump),
            (SoundCue::Death, &config.death),
            (SoundCue::Antidote, &config.antidote),
        ] {
            if let Some(clip) = clip.as_ref().filter(|c| !c.is_empty()) {
                clips.insert(cue, clip.clone());
            }
        }
        Self {
            clips,
            played: Vec::new(),
            missing: 0,
        }
    }

    pub fn play(&mut self, cue: SoundCue) {
        match self.clips.get(&cue) {
            Some(clip) => {
                log::debug!("Playing one-shot '{clip}'");
                self.played.push(clip.clone());
            }
            None => {
                self.missing += 1;
                log::warn!("{cue:?} sound is not assigned");
            }
        }
    }

    pub fn played(&self) -> &[String] {
        &self.played
    }

    pub fn missing(&self) -> u32 {
        self.missing
    }
}
