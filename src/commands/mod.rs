pub mod chat;
pub mod completions;
pub mod config;
pub mod create;
pub mod extract;
pub mod list;
pub mod prompt;

use colored::*;
use eyre::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;

use crate::cli::OutputFormat;
use crate::config::{BackendConfig, Config};
use crate::gateway::ResponseGateway;
use crate::gateway::openai::OpenAiCompatBackend;
use crate::personality::{PersonalityRecord, Trait};

/// Record plus context, as printed by `create`, `extract` and `list`
#[derive(Debug, Serialize)]
pub struct ProfileOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    pub traits: PersonalityRecord,
    pub demeanor: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub defaulted: Vec<Trait>,
}

impl<'a> ProfileOutput<'a> {
    pub fn new(name: Option<&'a str>, record: PersonalityRecord, defaulted: Vec<Trait>) -> Self {
        Self {
            name,
            traits: record,
            demeanor: record.demeanor(),
            defaulted,
        }
    }

    fn print_text(&self) {
        if let Some(name) = self.name {
            println!("{}", name.green().bold());
        }
        for t in Trait::ALL {
            let marker = if self.defaulted.contains(&t) {
                " (default)".dimmed().to_string()
            } else {
                String::new()
            };
            println!("  {:<18} {:>3}{}", t.label(), self.traits.get(t), marker);
        }
        println!("  {}", self.demeanor.dimmed());
    }
}

pub fn print_profiles(profiles: &[ProfileOutput], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(profiles)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(profiles)?),
        OutputFormat::Text => {
            for (idx, profile) in profiles.iter().enumerate() {
                if idx > 0 {
                    println!();
                }
                profile.print_text();
            }
        }
    }
    Ok(())
}

pub fn print_profile(profile: &ProfileOutput, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(profile)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(profile)?),
        OutputFormat::Text => profile.print_text(),
    }
    Ok(())
}

/// Gateway over the configured HTTP backend
pub fn build_gateway(config: &Config) -> Result<ResponseGateway<OpenAiCompatBackend>> {
    let api_key = resolve_api_key(&config.backend, &Config::npctalk_dir(), |name| std::env::var(name).ok())?;
    if api_key.is_none() {
        log::info!("No API key found in {}; sending unauthenticated requests", config.backend.api_key_env);
    }
    let backend = OpenAiCompatBackend::new(&config.backend.base_url, api_key);
    Ok(ResponseGateway::new(backend, config.backend.generation_params()))
}

/// Look up the API key through `lookup_env`, then in `<dir>/.env`
fn resolve_api_key<F>(backend: &BackendConfig, dir: &Path, lookup_env: F) -> Result<Option<String>>
where
    F: Fn(&str) -> Option<String>,
{
    let env_var = &backend.api_key_env;
    if env_var.is_empty() {
        return Ok(None);
    }

    if let Some(key) = lookup_env(env_var) {
        return Ok(Some(key));
    }

    let env_file = dir.join(".env");
    if env_file.exists() {
        let content = fs::read_to_string(&env_file).context("Failed to read .env file")?;
        for line in content.lines() {
            let line = line.trim();
            if line.starts_with('#') || line.is_empty() {
                continue;
            }
            if let Some((key, value)) = line.split_once('=')
                && key.trim() == env_var.as_str()
            {
                let value = value.trim().trim_matches('"').trim_matches('\'');
                return Ok(Some(value.to_string()));
            }
        }
    }

    Ok(None)
}

/// Print `prompt`, then read one line; `None` on EOF
pub fn prompt_line<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> Result<Option<String>> {
    write!(output, "{}", prompt)?;
    output.flush()?;

    let mut line = String::new();
    let read = input.read_line(&mut line).context("Failed to read input")?;
    if read == 0 {
        return Ok(None);
    }

    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn test_prompt_line_reads_and_trims_newline() {
        let mut input = Cursor::new("hello there\r\nnext\n");
        let mut output = Vec::new();
        assert_eq!(
            prompt_line(&mut input, &mut output, "You: ").unwrap(),
            Some("hello there".to_string())
        );
        assert_eq!(String::from_utf8(output).unwrap(), "You: ");
    }

    #[test]
    fn test_prompt_line_eof() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        assert_eq!(prompt_line(&mut input, &mut output, "> ").unwrap(), None);
    }

    #[test]
    fn test_profile_output_json_shape() {
        let record = PersonalityRecord::new(20, 50, 50, 50, 10);
        let output = ProfileOutput::new(Some("hermit"), record, vec![Trait::Neuroticism]);
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["name"], "hermit");
        assert_eq!(value["traits"]["openness"], 20);
        assert_eq!(value["defaulted"][0], "neuroticism");
        assert!(value["demeanor"].as_str().unwrap().starts_with("Hesitant"));
    }

    #[test]
    fn test_profile_output_omits_empty_fields() {
        let output = ProfileOutput::new(None, PersonalityRecord::new(1, 2, 3, 4, 5), Vec::new());
        let value = serde_json::to_value(&output).unwrap();
        assert!(value.get("name").is_none());
        assert!(value.get("defaulted").is_none());
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn backend(api_key_env: &str) -> BackendConfig {
        BackendConfig {
            api_key_env: api_key_env.to_string(),
            ..BackendConfig::default()
        }
    }

    #[test]
    fn test_resolve_api_key_disabled() {
        let temp = TempDir::new().unwrap();
        let lookup = |_: &str| Some("sk-ignored".to_string());
        assert_eq!(resolve_api_key(&backend(""), temp.path(), lookup).unwrap(), None);
    }

    #[test]
    fn test_resolve_api_key_from_env() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".env"), "NPCTALK_API_KEY=sk-file\n").unwrap();
        let lookup = |name: &str| (name == "NPCTALK_API_KEY").then(|| "sk-env".to_string());
        assert_eq!(
            resolve_api_key(&backend("NPCTALK_API_KEY"), temp.path(), lookup).unwrap(),
            Some("sk-env".to_string())
        );
    }

    #[test]
    fn test_resolve_api_key_from_env_file() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(".env"),
            "# local keys\nOTHER=x\nNPCTALK_API_KEY = \"sk-file\"\n",
        )
        .unwrap();
        assert_eq!(
            resolve_api_key(&backend("NPCTALK_API_KEY"), temp.path(), no_env).unwrap(),
            Some("sk-file".to_string())
        );
    }

    #[test]
    fn test_resolve_api_key_absent() {
        let temp = TempDir::new().unwrap();
        assert_eq!(resolve_api_key(&backend("NPCTALK_API_KEY"), temp.path(), no_env).unwrap(), None);
    }
}
