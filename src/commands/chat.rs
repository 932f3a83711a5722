use colored::*;
use eyre::{Result, bail};
use std::io::{self, BufRead, Write};

use super::{build_gateway, prompt_line};
use crate::cli::ChatArgs;
use crate::config::Config;
use crate::gateway::Backend;
use crate::personality::{ManualEntry, PersonalityRecord, Trait, parse_manual_score};
use crate::roster::{Npc, Roster};
use crate::session::{Session, create_npc};

/// How the player picked their NPC
#[derive(Debug, Clone, PartialEq, Eq)]
enum NpcChoice {
    Named(String),
    Custom,
    Generate,
}

pub fn run(args: ChatArgs, config: &Config) -> Result<()> {
    let roster = config.roster();
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let world = args.world.clone().unwrap_or_else(|| config.world.description.clone());
    let role = args.role.clone().unwrap_or_else(|| config.world.role.clone());
    let scene = args.scene.clone().unwrap_or_else(|| world.clone());

    let choice = match (&args.npc, args.custom, args.generate) {
        (Some(name), _, _) => NpcChoice::Named(name.clone()),
        (None, true, _) => NpcChoice::Custom,
        (None, false, true) => NpcChoice::Generate,
        (None, false, false) => match choose(&roster, &mut input, &mut output)? {
            Some(choice) => choice,
            None => return Ok(()),
        },
    };

    let gateway = build_gateway(config)?;

    let max_chars = config.history.max_chars;
    let npc = match choice {
        NpcChoice::Named(name) => {
            let Some(mut session) = Session::from_roster(&roster, &name, &scene, max_chars, gateway) else {
                bail!("Unknown NPC '{}'. Available: {}", name, roster.names().join(", "));
            };
            return converse(&mut session, &mut input, &mut output);
        }
        NpcChoice::Custom => match enter_traits(&mut input, &mut output, config.manual_entry)? {
            Some(record) => Npc {
                name: "custom".to_string(),
                record,
            },
            None => return Ok(()),
        },
        NpcChoice::Generate => {
            writeln!(output, "{} Creating a {}...", "→".blue(), role.cyan())?;
            let extractor = config.extractor(false);
            match create_npc(&gateway, &extractor, &world, &role, config.extraction.profile_attempts) {
                Ok(record) => Npc { name: role.clone(), record },
                Err(e) => {
                    writeln!(output, "{} Error creating NPC personality: {}", "✗".red(), e)?;
                    return Ok(());
                }
            }
        }
    };

    let mut session = Session::new(npc, &scene, max_chars, gateway);
    converse(&mut session, &mut input, &mut output)
}

/// Ask which NPC to talk to; `None` when the player leaves
fn choose<R: BufRead, W: Write>(roster: &Roster, input: &mut R, output: &mut W) -> Result<Option<NpcChoice>> {
    let mut options: Vec<&str> = roster.names();
    options.extend(["custom", "generate"]);
    let question = format!("Choose an NPC ({}): ", options.join(", "));

    loop {
        let Some(line) = prompt_line(input, output, &question)? else {
            return Ok(None);
        };
        let answer = line.trim().to_lowercase();

        match answer.as_str() {
            "exit" => return Ok(None),
            "custom" => return Ok(Some(NpcChoice::Custom)),
            "generate" => return Ok(Some(NpcChoice::Generate)),
            name => {
                if let Some(npc) = roster.get(name) {
                    return Ok(Some(NpcChoice::Named(npc.name)));
                }
                writeln!(output, "{} Unknown choice: {}", "✗".red(), line.trim())?;
            }
        }
    }
}

/// Read five trait scores, re-prompting on invalid input
pub fn enter_traits<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    policy: ManualEntry,
) -> Result<Option<PersonalityRecord>> {
    let mut scores = [0i64; 5];

    for (idx, name) in Trait::ALL.iter().enumerate() {
        loop {
            let Some(line) = prompt_line(input, output, &format!("{} (0-100): ", name))? else {
                return Ok(None);
            };
            match parse_manual_score(*name, &line, policy) {
                Ok(score) => {
                    scores[idx] = score as i64;
                    break;
                }
                Err(e) => writeln!(output, "{} {}", "✗".red(), e)?,
            }
        }
    }

    Ok(Some(PersonalityRecord::from_fn(|t| scores[t as usize])))
}

/// Run turns until `exit` or end of input
pub fn converse<B: Backend, R: BufRead, W: Write>(
    session: &mut Session<B>,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    let npc = session.npc().clone();
    writeln!(output, "{} {}", npc.name.green().bold(), npc.record)?;
    writeln!(output, "  {}", npc.record.demeanor().dimmed())?;
    writeln!(output, "Entering a conversation with the NPC. Type 'exit' to leave.")?;

    loop {
        let Some(line) = prompt_line(input, output, "You: ")? else {
            writeln!(output)?;
            break;
        };
        let line = line.trim();

        if line.eq_ignore_ascii_case("exit") {
            writeln!(output, "You left the conversation.")?;
            break;
        }
        if line.is_empty() {
            continue;
        }

        match session.turn(line) {
            Ok(reply) => writeln!(output, "NPC: {}", reply)?,
            Err(e) => writeln!(output, "{} {}", "✗".red(), e)?,
        }
    }

    log::info!(
        "Conversation with {} ended with {} chars of history",
        npc.name,
        session.history().chars().count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use crate::gateway::{GenerationParams, ResponseGateway};
    use std::io::Cursor;

    fn params() -> GenerationParams {
        GenerationParams {
            model: "test".to_string(),
            max_tokens: 16,
            temperature: 0.0,
            timeout: None,
        }
    }

    fn npc() -> Npc {
        Npc {
            name: "merchant".to_string(),
            record: PersonalityRecord::new(30, 70, 40, 70, 20),
        }
    }

    #[test]
    fn test_converse_until_exit() {
        let backend = |_: &str, _: &GenerationParams| -> Result<String, BackendError> { Ok("Buy something.".to_string()) };
        let mut session = Session::new(npc(), "A market", 2000, ResponseGateway::new(backend, params()));
        let mut input = Cursor::new("hello\n\n  EXIT \nnever read\n");
        let mut output = Vec::new();

        converse(&mut session, &mut input, &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("NPC: Buy something."));
        assert!(text.contains("You left the conversation."));
        assert_eq!(session.history(), "Player: hello\nNPC: Buy something.");
    }

    #[test]
    fn test_converse_survives_backend_errors() {
        let backend = |_: &str, _: &GenerationParams| -> Result<String, BackendError> { Err(BackendError::Timeout) };
        let mut session = Session::new(npc(), "A market", 2000, ResponseGateway::new(backend, params()));
        let mut input = Cursor::new("hello\nanyone?\n");
        let mut output = Vec::new();

        converse(&mut session, &mut input, &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.matches("text generation timed out").count(), 2);
        assert_eq!(session.history(), "");
    }

    #[test]
    fn test_enter_traits_reprompts_on_bad_input() {
        let mut input = Cursor::new("abc\n70\n50\n60\n40\n80\n");
        let mut output = Vec::new();
        let record = enter_traits(&mut input, &mut output, ManualEntry::Clamp).unwrap();
        assert_eq!(record, Some(PersonalityRecord::new(70, 50, 60, 40, 80)));
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("expected an integer for Openness"));
    }

    #[test]
    fn test_enter_traits_clamp_vs_reject() {
        let mut output = Vec::new();
        let mut input = Cursor::new("150\n50\n50\n50\n-4\n");
        let record = enter_traits(&mut input, &mut output, ManualEntry::Clamp).unwrap();
        assert_eq!(record, Some(PersonalityRecord::new(100, 50, 50, 50, 0)));

        let mut output = Vec::new();
        let mut input = Cursor::new("150\n90\n50\n50\n50\n10\n");
        let record = enter_traits(&mut input, &mut output, ManualEntry::Reject).unwrap();
        assert_eq!(record, Some(PersonalityRecord::new(90, 50, 50, 50, 10)));
        assert!(String::from_utf8(output).unwrap().contains("Openness must be between 0 and 100, got 150"));
    }

    #[test]
    fn test_enter_traits_eof_aborts() {
        let mut input = Cursor::new("10\n20\n");
        let mut output = Vec::new();
        assert_eq!(enter_traits(&mut input, &mut output, ManualEntry::Clamp).unwrap(), None);
    }

    #[test]
    fn test_choose_by_name_and_keywords() {
        let roster = Roster::new(Roster::builtin());
        let mut output = Vec::new();

        let mut input = Cursor::new("wizard\nMerchant\n");
        assert_eq!(
            choose(&roster, &mut input, &mut output).unwrap(),
            Some(NpcChoice::Named("merchant".to_string()))
        );

        let mut input = Cursor::new("custom\n");
        assert_eq!(choose(&roster, &mut input, &mut output).unwrap(), Some(NpcChoice::Custom));

        let mut input = Cursor::new("exit\n");
        assert_eq!(choose(&roster, &mut input, &mut output).unwrap(), None);

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Choose an NPC (blacksmith, merchant, custom, generate): "));
        assert!(text.contains("Unknown choice: wizard"));
    }
}
