//! Interactive resolution of missing parameters.
//!
//! Commands never read stdin directly. They ask a [`Prompter`], which is an
//! [`StdinPrompter`] on a terminal and [`NonInteractive`] under `--automate`
//! or when stdin is piped.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{bail, Result};

use i18ntool_core::{
    options::OptionKey, types::is_valid_slug, ConfigError, LanguageCode, Options, ResourceSpec,
};

pub trait Prompter {
    /// Ask for a value. `None` means the question cannot be asked.
    fn ask(&mut self, question: &str) -> Result<Option<String>>;

    /// Ask a yes/no question.
    fn confirm(&mut self, question: &str) -> Result<bool>;

    fn is_interactive(&self) -> bool;
}

/// Reads answers from stdin, one line each.
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn ask(&mut self, question: &str) -> Result<Option<String>> {
        loop {
            print!("{question}: ");
            io::stdout().flush()?;
            let mut line = String::new();
            if io::stdin().lock().read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let answer = line.trim();
            if !answer.is_empty() {
                return Ok(Some(answer.to_owned()));
            }
        }
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        print!("{question} [y/N] ");
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
    }

    fn is_interactive(&self) -> bool {
        true
    }
}

/// Never asks; missing input is an error.
pub struct NonInteractive;

impl Prompter for NonInteractive {
    fn ask(&mut self, _question: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        bail!("{question} Pass --automate to proceed without confirmation.")
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Interactive only when stdin is a terminal and `--automate` is off.
pub fn for_options(options: &Options) -> Box<dyn Prompter> {
    if !options.automate && io::stdin().is_terminal() {
        Box::new(StdinPrompter)
    } else {
        Box::new(NonInteractive)
    }
}

fn question(key: OptionKey) -> &'static str {
    match key {
        OptionKey::Languages => "Languages (e.g. de_DE,en-GB)",
        OptionKey::Organization => "Organization slug",
        OptionKey::Project => "Project slug",
        OptionKey::Resource => "Resource (Name:Slug)",
        _ => "Value",
    }
}

/// Ask for every `required` option that is still unset.
///
/// Without an interactive prompter this fails with all missing names at once.
pub fn fill_missing(
    options: &mut Options,
    required: &[OptionKey],
    prompter: &mut dyn Prompter,
) -> Result<()> {
    let missing = options.missing(required);
    if missing.is_empty() {
        return Ok(());
    }
    if !prompter.is_interactive() {
        return Err(ConfigError::MissingArguments { names: missing }.into());
    }

    for &key in required {
        if options.missing(&[key]).is_empty() {
            continue;
        }
        let Some(answer) = prompter.ask(question(key))? else {
            break;
        };
        apply(options, key, &answer)?;
    }
    options.require(required)?;
    Ok(())
}

fn apply(options: &mut Options, key: OptionKey, answer: &str) -> Result<(), ConfigError> {
    let invalid_slug = |option: &'static str| ConfigError::InvalidValue {
        option,
        value: answer.to_owned(),
        reason: "only alphanumeric characters, '_' and '-' are allowed",
    };
    match key {
        OptionKey::Languages => options.languages = LanguageCode::parse_list(answer)?,
        OptionKey::Resource => options.resource = Some(answer.parse::<ResourceSpec>()?),
        OptionKey::Organization if is_valid_slug(answer) => {
            options.organization = Some(answer.to_owned())
        }
        OptionKey::Project if is_valid_slug(answer) => options.project = Some(answer.to_owned()),
        OptionKey::Organization => return Err(invalid_slug("organization")),
        OptionKey::Project => return Err(invalid_slug("project")),
        _ => {}
    }
    Ok(())
}
