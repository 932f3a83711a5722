use eyre::{Context, Result};
use std::fs;

use crate::cli::PromptAction;
use crate::config::Config;
use crate::history;
use crate::prompt::{build_dialogue_prompt, build_profile_prompt};

pub fn run(action: PromptAction, config: &Config) -> Result<()> {
    match action {
        PromptAction::Profile { world, role } => {
            let world = world.unwrap_or_else(|| config.world.description.clone());
            let role = role.unwrap_or_else(|| config.world.role.clone());
            print!("{}", build_profile_prompt(&world, &role));
        }
        PromptAction::Dialogue {
            npc,
            scene,
            history_file,
            input,
        } => {
            let roster = config.roster();
            let npc = roster.get(&npc).ok_or_else(|| {
                eyre::eyre!("Unknown NPC '{}'. Available: {}", npc, roster.names().join(", "))
            })?;
            let scene = scene.unwrap_or_else(|| config.world.description.clone());
            let full_history = match history_file {
                Some(path) => fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read history file {}", path.display()))?,
                None => String::new(),
            };
            let window = history::truncate(full_history.trim_end(), config.history.max_chars);
            print!("{}", build_dialogue_prompt(&npc.record, &scene, &window, &input));
        }
    }

    Ok(())
}
