//! Terminal input lines → session commands.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use client::Command;

/// Key code the terminal reports for the line terminator.
pub const ENTER: u32 = 13;

pub const USAGE: &str = "commands: /join <name>, /leave, /member <name>, /quit; anything else is sent as chat";

/// Parse one input line. `None` means an unrecognized slash command.
#[must_use]
pub fn parse_line(line: &str) -> Option<Command> {
    let Some(rest) = line.strip_prefix('/') else {
        return Some(Command::KeyPress { code: ENTER, text: line.to_owned() });
    };
    let (verb, arg) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    match verb {
        "join" => Some(Command::Join(arg.to_owned())),
        "leave" => Some(Command::Leave),
        "member" => Some(Command::LookupMember(arg.to_owned())),
        "quit" => Some(Command::Quit),
        _ => None,
    }
}
