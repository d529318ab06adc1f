//! Argument parsing.

use thiserror::Error;

use safecampus_core::{DomainError, UserUpdate};

pub const USAGE: &str = "\
usage: safecampus <command> [args]

commands:
  login <username> <role> [--id ID] [--avatar URL]
  logout
  whoami
  update [--username NAME] [--role ROLE] [--id ID] [--avatar URL]  (at least one)
  go <path>
  explain <path>
  routes
  help

environment:
  SAFECAMPUS_STORAGE     storage file (default: OS data dir)
  SAFECAMPUS_ROUTES      JSON route table replacing the built-in one
  SAFECAMPUS_LOG_FORMAT  json | pretty
  RUST_LOG               log filter (default: info)
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login(UserUpdate),
    Logout,
    WhoAmI,
    Update(UserUpdate),
    Go(String),
    Explain(String),
    Routes,
    Help,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("'{command}' expects {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("unexpected argument '{0}'")]
    UnexpectedArgument(String),

    #[error("option '{0}' needs a value")]
    MissingValue(String),

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

impl Command {
    /// Parse arguments (without the program name).
    pub fn parse<I>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let Some(command) = args.next() else {
            return Ok(Command::Help);
        };

        let command = match command.as_str() {
            "login" => {
                let missing = || CliError::MissingArgument {
                    command: "login",
                    expected: "<username> <role>",
                };
                let username = args.next().ok_or_else(missing)?;
                let role = args.next().ok_or_else(missing)?;
                let update = parse_options(args, UserUpdate::new().username(username).role(role))?;
                Command::Login(update)
            }
            "update" => {
                let update = parse_options(args, UserUpdate::new())?;
                if update.is_empty() {
                    return Err(CliError::MissingArgument {
                        command: "update",
                        expected: "at least one --field option",
                    });
                }
                Command::Update(update)
            }
            "go" | "explain" => {
                let name = if command == "go" { "go" } else { "explain" };
                let path = args.next().ok_or(CliError::MissingArgument {
                    command: name,
                    expected: "<path>",
                })?;
                no_more(args)?;
                if name == "go" { Command::Go(path) } else { Command::Explain(path) }
            }
            "logout" => no_more(args).map(|_| Command::Logout)?,
            "whoami" => no_more(args).map(|_| Command::WhoAmI)?,
            "routes" => no_more(args).map(|_| Command::Routes)?,
            "help" | "-h" | "--help" => Command::Help,
            other => return Err(CliError::UnknownCommand(other.to_string())),
        };

        Ok(command)
    }
}

fn parse_options(
    mut args: impl Iterator<Item = String>,
    mut update: UserUpdate,
) -> Result<UserUpdate, CliError> {
    while let Some(arg) = args.next() {
        let Some(field) = arg.strip_prefix("--") else {
            return Err(CliError::UnexpectedArgument(arg));
        };

        let (field, value) = match field.split_once('=') {
            Some((field, value)) => (field.to_string(), value.to_string()),
            None => {
                let value = args.next().ok_or_else(|| CliError::MissingValue(arg.clone()))?;
                (field.to_string(), value)
            }
        };

        update.set(&field, value)?;
    }
    Ok(update)
}

fn no_more(mut args: impl Iterator<Item = String>) -> Result<(), CliError> {
    match args.next() {
        Some(extra) => Err(CliError::UnexpectedArgument(extra)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, CliError> {
        Command::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn no_arguments_means_help() {
        assert_eq!(parse(&[]).unwrap(), Command::Help);
        assert_eq!(parse(&["--help"]).unwrap(), Command::Help);
    }

    #[test]
    fn login_with_options() {
        let cmd = parse(&["login", "wang", "教师", "--id", "7", "--avatar=a.png"]).unwrap();
        assert_eq!(
            cmd,
            Command::Login(
                UserUpdate::new()
                    .username("wang")
                    .role("教师")
                    .id("7")
                    .avatar("a.png")
            )
        );
    }

    #[test]
    fn login_requires_username_and_role() {
        let err = parse(&["login", "wang"]).unwrap_err();
        assert!(matches!(err, CliError::MissingArgument { command: "login", .. }));
    }

    #[test]
    fn update_rejects_unknown_fields_and_dangling_options() {
        assert!(matches!(
            parse(&["update", "--email", "x"]).unwrap_err(),
            CliError::Invalid(DomainError::Validation(_))
        ));
        assert_eq!(
            parse(&["update", "--avatar"]).unwrap_err(),
            CliError::MissingValue("--avatar".to_string())
        );
        assert_eq!(
            parse(&["update", "avatar"]).unwrap_err(),
            CliError::UnexpectedArgument("avatar".to_string())
        );
    }

    #[test]
    fn update_needs_at_least_one_field() {
        let err = parse(&["update"]).unwrap_err();
        assert!(matches!(err, CliError::MissingArgument { command: "update", .. }));

        assert_eq!(
            parse(&["update", "--role=家长"]).unwrap(),
            Command::Update(UserUpdate::new().role("家长"))
        );
    }

    #[test]
    fn path_commands() {
        assert_eq!(parse(&["go", "/profile"]).unwrap(), Command::Go("/profile".to_string()));
        assert_eq!(
            parse(&["explain", "/item-entry"]).unwrap(),
            Command::Explain("/item-entry".to_string())
        );
        assert!(parse(&["go"]).is_err());
        assert!(parse(&["go", "/a", "/b"]).is_err());
    }

    #[test]
    fn simple_commands_take_no_arguments() {
        assert_eq!(parse(&["logout"]).unwrap(), Command::Logout);
        assert_eq!(parse(&["whoami"]).unwrap(), Command::WhoAmI);
        assert_eq!(parse(&["routes"]).unwrap(), Command::Routes);
        assert!(parse(&["logout", "now"]).is_err());
        assert_eq!(
            parse(&["dance"]).unwrap_err(),
            CliError::UnknownCommand("dance".to_string())
        );
    }
}
