//! Prompt rendering
//!
//! Both builders are pure: identical input always renders byte-identical
//! output. Trait labels come from [`Trait::label`], the same source the
//! extractor matches against.

use crate::personality::{PersonalityRecord, Trait};

const EMPTY_HISTORY: &str = "(no conversation yet)";

/// Prompt asking the backend to invent a personality for a role
pub fn build_profile_prompt(world_description: &str, role: &str) -> String {
    let trait_lines = Trait::ALL
        .iter()
        .map(|t| format!("{}: <0-100>", t.label()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are tasked with creating an NPC in a fictional world.
World Description: {world_description}
Role: {role}

Rate the NPC on each personality trait from 0 to 100. Answer with exactly these five lines,
replacing each placeholder with a single integer:
{trait_lines}

Then write one short paragraph describing how the NPC behaves.
"#
    )
}

/// Prompt asking the backend for the NPC's next line
pub fn build_dialogue_prompt(
    record: &PersonalityRecord,
    scene_description: &str,
    truncated_history: &str,
    player_input: &str,
) -> String {
    let history = if truncated_history.trim().is_empty() {
        EMPTY_HISTORY
    } else {
        truncated_history
    };

    format!(
        r#"You are role-playing an NPC in a game.

Scene: {scene}

NPC personality (each score is 0-100):
{traits}

Conversation so far:
{history}

The player says: {input}

Respond in character as the NPC, staying consistent with the personality scores above.
Keep it concise: 1-3 sentences. Do not prefix the reply with a speaker label.
"#,
        scene = scene_description,
        traits = record.to_prompt_fragment(),
        history = history,
        input = player_input,
    )
}
