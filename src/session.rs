//! One conversation with one NPC
//!
//! A session owns the NPC record, the scene and the recent history. Each turn
//! sends a single dialogue prompt built from a truncated history window and
//! appends the exchange only when the backend answered. Stored history is
//! capped at [`RETAINED_WINDOWS`] prompt windows.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{GenerationError, NpcCreationError};
use crate::gateway::{Backend, ResponseGateway};
use crate::history;
use crate::personality::extract::TraitExtractor;
use crate::personality::PersonalityRecord;
use crate::prompt::{build_dialogue_prompt, build_profile_prompt};
use crate::roster::{Npc, Roster};

pub const PLAYER_LABEL: &str = "Player";
pub const NPC_LABEL: &str = "NPC";

/// Stored history is cut back once it exceeds this many prompt windows
pub const RETAINED_WINDOWS: usize = 4;

static SPEAKER_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(npc|assistant)\s*:\s*").unwrap());

pub struct Session<B> {
    npc: Npc,
    scene: String,
    history: String,
    max_chars: usize,
    gateway: ResponseGateway<B>,
}

impl<B: Backend> Session<B> {
    pub fn new(npc: Npc, scene: &str, max_chars: usize, gateway: ResponseGateway<B>) -> Self {
        Self {
            npc,
            scene: scene.to_string(),
            history: String::new(),
            max_chars,
            gateway,
        }
    }

    /// Start a session with a roster entry
    pub fn from_roster(
        roster: &Roster,
        name: &str,
        scene: &str,
        max_chars: usize,
        gateway: ResponseGateway<B>,
    ) -> Option<Self> {
        roster.get(name).map(|npc| Self::new(npc, scene, max_chars, gateway))
    }

    pub fn npc(&self) -> &Npc {
        &self.npc
    }

    pub fn history(&self) -> &str {
        &self.history
    }

    /// Play one exchange and return the NPC's reply
    pub fn turn(&mut self, player_input: &str) -> Result<String, GenerationError> {
        let window = history::truncate(&self.history, self.max_chars);
        let prompt = build_dialogue_prompt(&self.npc.record, &self.scene, &window, player_input);

        let raw = self.gateway.generate(&prompt)?;
        let reply = clean_reply(&raw);

        let with_player = history::append(&self.history, PLAYER_LABEL, player_input);
        self.history = history::append(&with_player, NPC_LABEL, &reply);

        let retained = self.max_chars.saturating_mul(RETAINED_WINDOWS);
        if self.history.len() > retained {
            self.history = history::truncate(&self.history, retained);
        }
        log::info!("Turn complete for {}: history now {} bytes", self.npc.name, self.history.len());

        Ok(reply)
    }
}

/// Trim whitespace and a leading speaker label the model may add anyway
pub fn clean_reply(raw: &str) -> String {
    SPEAKER_PREFIX.replace(raw.trim(), "").trim().to_string()
}

/// Generate a personality for `role` through the backend
///
/// Extraction failures (strict policy only) are retried with a fresh
/// generation up to `attempts` times in total. Generation failures are
/// returned immediately.
pub fn create_npc<B: Backend>(
    gateway: &ResponseGateway<B>,
    extractor: &TraitExtractor,
    world_description: &str,
    role: &str,
    attempts: u32,
) -> Result<PersonalityRecord, NpcCreationError> {
    let prompt = build_profile_prompt(world_description, role);
    let attempts = attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        let response = gateway.generate(&prompt)?;

        match extractor.extract(&response) {
            Ok(record) => {
                log::info!("Created NPC '{}' on attempt {}: {}", role, attempt, record);
                return Ok(record);
            }
            Err(e) if attempt < attempts => {
                log::warn!("Attempt {} for '{}' failed: {}; retrying", attempt, role, e);
            }
            Err(e) => {
                return Err(NpcCreationError::Extraction { attempts, source: e });
            }
        }
    }
}
