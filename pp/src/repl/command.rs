//! Slash command parsing

use std::str::FromStr;

use pokercore::VoteValue;

/// A parsed REPL line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Join(String),
    As(String),
    WhoAmI,
    Facilitate,
    Task(String),
    Vote(VoteValue),
    Reveal,
    Reset,
    Tasks,
    Select(String),
    Final(VoteValue),
    Show,
    Help,
    Quit,
}

impl FromStr for ReplCommand {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let (cmd, rest) = match input.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (input, ""),
        };

        match cmd {
            "/join" | "/j" => required(rest, "/join <name>").map(Self::Join),
            "/as" => required(rest, "/as <participant>").map(Self::As),
            "/whoami" => Ok(Self::WhoAmI),
            "/facilitate" | "/f" => Ok(Self::Facilitate),
            "/task" | "/t" => required(rest, "/task <title>").map(Self::Task),
            "/vote" | "/v" => card(rest, "/vote <n>").map(Self::Vote),
            "/reveal" | "/r" => Ok(Self::Reveal),
            "/reset" => Ok(Self::Reset),
            "/tasks" => Ok(Self::Tasks),
            "/select" | "/s" => required(rest, "/select <task>").map(Self::Select),
            "/final" => card(rest, "/final <n>").map(Self::Final),
            "/show" | "" => Ok(Self::Show),
            "/help" | "/h" | "/?" => Ok(Self::Help),
            "/quit" | "/q" | "/exit" => Ok(Self::Quit),
            other => Err(format!("Unknown command: {}", other)),
        }
    }
}

fn required(arg: &str, usage: &str) -> Result<String, String> {
    if arg.is_empty() {
        Err(format!("Usage: {}", usage))
    } else {
        Ok(arg.to_string())
    }
}

fn card(arg: &str, usage: &str) -> Result<VoteValue, String> {
    let arg = required(arg, usage)?;
    arg.parse::<VoteValue>().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands_with_arguments() {
        assert_eq!(
            "/join Alice Smith".parse::<ReplCommand>(),
            Ok(ReplCommand::Join("Alice Smith".to_string()))
        );
        assert_eq!(
            "/task   Login page  ".parse::<ReplCommand>(),
            Ok(ReplCommand::Task("Login page".to_string()))
        );
        assert_eq!("/vote 13".parse::<ReplCommand>(), Ok(ReplCommand::Vote(VoteValue::Thirteen)));
        assert_eq!("/final 8".parse::<ReplCommand>(), Ok(ReplCommand::Final(VoteValue::Eight)));
        assert_eq!(
            "/select 1a2b".parse::<ReplCommand>(),
            Ok(ReplCommand::Select("1a2b".to_string()))
        );
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("/q".parse::<ReplCommand>(), Ok(ReplCommand::Quit));
        assert_eq!("/exit".parse::<ReplCommand>(), Ok(ReplCommand::Quit));
        assert_eq!("/v 5".parse::<ReplCommand>(), Ok(ReplCommand::Vote(VoteValue::Five)));
        assert_eq!("/r".parse::<ReplCommand>(), Ok(ReplCommand::Reveal));
    }

    #[test]
    fn test_parse_missing_argument() {
        assert_eq!(
            "/join".parse::<ReplCommand>(),
            Err("Usage: /join <name>".to_string())
        );
        assert!("/task   ".parse::<ReplCommand>().is_err());
        assert!("/vote".parse::<ReplCommand>().is_err());
    }

    #[test]
    fn test_parse_off_scale_vote() {
        let err = "/vote 4".parse::<ReplCommand>().unwrap_err();
        assert!(err.contains("expected one of 1, 2, 3, 5, 8, 13, 21"));
        assert!("/vote abc".parse::<ReplCommand>().is_err());
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            "/nope".parse::<ReplCommand>(),
            Err("Unknown command: /nope".to_string())
        );
    }
}
