use crate::sim::Action;
use std::io::{self, BufRead};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MenuChoice {
    Act(Action),
    Save,
    Quit,
}

/// Menu digits as printed, or the action's name.
pub(crate) fn parse_choice(line: &str) -> Option<MenuChoice> {
    let choice = match line.trim().to_ascii_lowercase().as_str() {
        "1" | "feed" => MenuChoice::Act(Action::Feed),
        "2" | "nap" | "sleep" => MenuChoice::Act(Action::Nap),
        "3" | "pet" => MenuChoice::Act(Action::Pet),
        "4" | "dungeon" | "fight" => MenuChoice::Act(Action::Fight),
        "5" | "save" => MenuChoice::Save,
        "6" | "quit" | "exit" | "q" => MenuChoice::Quit,
        _ => return None,
    };
    Some(choice)
}

/// One line without its terminator, or `None` at end of input.
pub(crate) fn read_line(input: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let trimmed = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed);
    Ok(Some(line))
}
