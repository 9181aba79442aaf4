//! Discrete input events
//!
//! The core never reads devices. Whatever owns the keyboard (or a test)
//! turns raw input into these events.

use crate::state::NavigationDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    EnterHistory,
    ExitHistory,
    Navigate(NavigationDirection),
    /// A modal or overlay claimed (`true`) or released (`false`) input focus
    InputDisabled(bool),
    /// Explicit reconnect, the only way out of a failed connection
    Reconnect,
}

/// A line of console input, as read by the headless binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Input(InputEvent),
    Quit,
}

/// Map one console key to a command.
///
/// `h` history, `l` live, `p`/`n` previous/next, `m`/`M` modal open/close,
/// `r` reconnect, `q` quit. Anything else is ignored.
pub fn parse_key(line: &str) -> Option<KeyCommand> {
    let command = match line.trim() {
        "h" => KeyCommand::Input(InputEvent::EnterHistory),
        "l" => KeyCommand::Input(InputEvent::ExitHistory),
        "p" => KeyCommand::Input(InputEvent::Navigate(NavigationDirection::Previous)),
        "n" => KeyCommand::Input(InputEvent::Navigate(NavigationDirection::Next)),
        "m" => KeyCommand::Input(InputEvent::InputDisabled(true)),
        "M" => KeyCommand::Input(InputEvent::InputDisabled(false)),
        "r" => KeyCommand::Input(InputEvent::Reconnect),
        "q" => KeyCommand::Quit,
        _ => return None,
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_events() {
        assert_eq!(
            parse_key("p\n"),
            Some(KeyCommand::Input(InputEvent::Navigate(
                NavigationDirection::Previous
            )))
        );
        assert_eq!(
            parse_key("M"),
            Some(KeyCommand::Input(InputEvent::InputDisabled(false)))
        );
        assert_eq!(parse_key(" q "), Some(KeyCommand::Quit));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        assert_eq!(parse_key(""), None);
        assert_eq!(parse_key("history"), None);
    }
}
