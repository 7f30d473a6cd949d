use deer_core::input::Key;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_frame_dt")]
    pub frame_dt: f32,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    /// Keys held during this frame.
    #[serde(default)]
    pub keys: Vec<Key>,
    /// Overrides the sequence frame time, e.g. to simulate a hitch.
    #[serde(default)]
    pub frame_dt: Option<f32>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameInput {
    pub dt: f32,
    pub keys: Vec<Key>,
}

impl ReplaySequence {
    pub fn expanded_frames(&self) -> Vec<FrameInput> {
        let mut out = Vec::new();
        for frame in &self.frames {
            let dt = frame.frame_dt.unwrap_or(self.frame_dt);
            for _ in 0..frame.repeat.max(1) {
                out.push(FrameInput {
                    dt,
                    keys: frame.keys.clone(),
                });
            }
        }
        out
    }

    pub fn duration(&self) -> f32 {
        self.expanded_frames().iter().map(|f| f.dt).sum()
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.frame_dt <= 0.0 {
        return Err("Replay validation failed: frame_dt must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    for (i, frame) in replay.frames.iter().enumerate() {
        if frame.frame_dt.is_some_and(|dt| dt <= 0.0) {
            return Err(format!(
                "Replay validation failed: frame {i} has a non-positive frame_dt"
            ));
        }
    }
    Ok(())
}

const fn default_frame_dt() -> f32 {
    1.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}
