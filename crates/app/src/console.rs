//! Line-oriented front end for the [`TemplateManager`].
//!
//! One command per line. `delete` asks for confirmation on the next line.

use std::io;

use labelsheet_core::form::FormField;
use labelsheet_core::geometry::PageSizeKind;
use labelsheet_core::notice::NoticeKind;
use labelsheet_core::types::TemplateId;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::manager::{SubmitOutcome, TemplateManager};

pub const HELP: &str = "\
commands:
  show                   print the form
  list                   print your templates
  set <field> <value>    change a form field
  save                   save or update the template in the form
  edit <id>              load a template into the form
  cancel                 leave edit mode
  delete <id>            delete a template (asks for confirmation)
  refresh                reload your templates
  whoami                 print the signed-in user id
  help                   print this text
  quit                   exit
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Show,
    List,
    Set(FormField, String),
    Save,
    Edit(TemplateId),
    Cancel,
    Delete(TemplateId),
    Refresh,
    WhoAmI,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command `{0}`, try `help`")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("unknown field `{0}`")]
    UnknownField(String),
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "help" | "?" => Ok(Self::Help),
            "show" => Ok(Self::Show),
            "list" | "ls" => Ok(Self::List),
            "save" | "submit" => Ok(Self::Save),
            "cancel" => Ok(Self::Cancel),
            "refresh" => Ok(Self::Refresh),
            "whoami" => Ok(Self::WhoAmI),
            "quit" | "exit" => Ok(Self::Quit),
            "set" => {
                let (name, value) = match rest.split_once(char::is_whitespace) {
                    Some((name, value)) => (name, value.trim()),
                    None => (rest, ""),
                };
                if name.is_empty() {
                    return Err(CommandError::Usage("set <field> <value>"));
                }
                let field = name
                    .parse::<FormField>()
                    .map_err(|_| CommandError::UnknownField(name.to_string()))?;
                Ok(Self::Set(field, value.to_string()))
            }
            "edit" => single_id(rest, "edit <id>").map(Self::Edit),
            "delete" | "rm" => single_id(rest, "delete <id>").map(Self::Delete),
            _ => Err(CommandError::Unknown(word.to_string())),
        }
    }
}

fn single_id(rest: &str, usage: &'static str) -> Result<TemplateId, CommandError> {
    if rest.is_empty() || rest.contains(char::is_whitespace) {
        return Err(CommandError::Usage(usage));
    }
    Ok(TemplateId::new(rest))
}

/// Read commands from `input` until `quit` or end of input.
pub async fn run<R, W>(manager: &TemplateManager, input: R, output: &mut W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    emit(output, "type `help` for a list of commands\n").await?;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                emit(output, &format!("{e}\n")).await?;
                continue;
            }
        };

        let text = match command {
            Command::Quit => break,
            Command::Delete(id) => {
                emit(output, &format!("Delete template `{id}`? [y/N] ")).await?;
                let answer = lines.next_line().await?.unwrap_or_default();
                let confirmed = matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes");
                match manager.delete(&id, confirmed).await {
                    Ok(true) => with_notice(manager, String::new()),
                    Ok(false) => "not deleted\n".to_string(),
                    // Failed submits and deletes leave an error notice.
                    Err(_) => with_notice(manager, String::new()),
                }
            }
            other => execute(manager, other).await,
        };
        emit(output, &text).await?;
    }
    Ok(())
}

async fn execute(manager: &TemplateManager, command: Command) -> String {
    match command {
        Command::Help => HELP.to_string(),
        Command::Show => render_form(manager),
        Command::List => render_list(manager).await,
        Command::Set(field, value) => match manager.set_field(field, &value) {
            Ok(()) => String::new(),
            Err(e) => format!("{}\n", e.user_message()),
        },
        Command::Save => match manager.submit().await {
            Ok(SubmitOutcome::Created(id)) | Ok(SubmitOutcome::Updated(id)) => {
                with_notice(manager, format!("id: {id}\n"))
            }
            Err(_) => with_notice(manager, String::new()),
        },
        Command::Edit(id) => match manager.edit(&id).await {
            Ok(()) => render_form(manager),
            Err(e) => format!("{}\n", e.user_message()),
        },
        Command::Cancel => {
            manager.cancel();
            render_form(manager)
        }
        Command::Refresh => match manager.refresh().await {
            Ok(count) => format!("{count} template(s)\n"),
            Err(e) => format!("{}\n", e.user_message()),
        },
        Command::WhoAmI => match manager.user_id() {
            Some(user) => format!("{user}\n"),
            None => "not signed in\n".to_string(),
        },
        // Handled by `run`.
        Command::Quit | Command::Delete(_) => String::new(),
    }
}

fn with_notice(manager: &TemplateManager, mut text: String) -> String {
    if let Some(notice) = manager.notice() {
        let tag = match notice.kind {
            NoticeKind::Success => "ok",
            NoticeKind::Error => "error",
        };
        text.push_str(&format!("[{tag}] {}\n", notice.text));
    }
    if let Some(err) = manager.last_error() {
        text.push_str(&format!("[error] {err}\n"));
    }
    text
}

pub fn render_form(manager: &TemplateManager) -> String {
    let view = manager.form();
    let mut out = format!("== {} ==\n", view.heading);
    for field in FormField::ALL {
        let custom_only = matches!(field, FormField::PageWidth | FormField::PageHeight);
        if custom_only && view.fields.page_size != PageSizeKind::Custom {
            continue;
        }
        out.push_str(&format!("  {:<15}: {}\n", field.as_str(), view.fields.get(field)));
    }
    if view.editing.is_some() {
        out.push_str(&format!("  [{}]  [Cancel]\n", view.submit_label));
    } else {
        out.push_str(&format!("  [{}]\n", view.submit_label));
    }
    out
}

pub async fn render_list(manager: &TemplateManager) -> String {
    if manager.is_loading() {
        return "loading templates...\n".to_string();
    }
    let templates = manager.templates().await;
    let mut out = String::new();
    if let Some(err) = manager.last_error() {
        out.push_str(&format!("[error] {err}\n"));
    }
    if templates.is_empty() {
        out.push_str("no templates yet\n");
        return out;
    }
    for template in &templates {
        let label = &template.spec.label_dimensions;
        out.push_str(&format!(
            "{}  {}  {}  label {}x{}mm\n",
            template.id, template.spec.name, template.spec.page_size, label.width, label.height
        ));
    }
    out
}

async fn emit<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> io::Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.flush().await
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parses_set_with_spaces_in_value() {
        assert_eq!(
            Command::parse("set name  Shipping labels ").unwrap(),
            Command::Set(FormField::Name, "Shipping labels".to_string())
        );
    }

    #[test]
    fn set_without_value_clears_the_field() {
        assert_eq!(
            Command::parse("set gap_vertical").unwrap(),
            Command::Set(FormField::GapVertical, String::new())
        );
    }

    #[test]
    fn rejects_unknown_input() {
        assert_matches!(Command::parse("frobnicate"), Err(CommandError::Unknown(_)));
        assert_matches!(
            Command::parse("set colour red"),
            Err(CommandError::UnknownField(name)) if name == "colour"
        );
        assert_matches!(Command::parse("edit"), Err(CommandError::Usage(_)));
        assert_matches!(Command::parse("delete a b"), Err(CommandError::Usage(_)));
    }

    #[test]
    fn commands_are_case_insensitive() {
        assert_eq!(Command::parse("QUIT").unwrap(), Command::Quit);
        assert_eq!(
            Command::parse("Edit abc123").unwrap(),
            Command::Edit(TemplateId::new("abc123"))
        );
    }
}
