//! Command line classification
//!
//! The first space-delimited token names the command (case-insensitive);
//! the rest of the line, trimmed, is its argument.

/// Commands the gateway understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    List,
    Group,
    ListGroup,
    NewGroups,
    Head,
    Article,
    Body,
    XOver,
    Capabilities,
    Mode,
    Check,
    TakeThis,
    IHave,
    Quit,
}

/// Name to command lookup table
const COMMANDS: &[(&str, Command)] = &[
    ("LIST", Command::List),
    ("GROUP", Command::Group),
    ("LISTGROUP", Command::ListGroup),
    ("NEWGROUPS", Command::NewGroups),
    ("HEAD", Command::Head),
    ("ARTICLE", Command::Article),
    ("BODY", Command::Body),
    ("XOVER", Command::XOver),
    ("CAPABILITIES", Command::Capabilities),
    ("MODE", Command::Mode),
    ("CHECK", Command::Check),
    ("TAKETHIS", Command::TakeThis),
    ("IHAVE", Command::IHave),
    ("QUIT", Command::Quit),
];

impl Command {
    /// Look up a command name, ignoring ASCII case
    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        COMMANDS
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, command)| command)
    }
}

/// A command line split into its name and optional argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandLine<'a> {
    /// Command token exactly as sent
    pub name: &'a str,
    /// Trimmed remainder, `None` when empty
    pub arg: Option<&'a str>,
}

impl<'a> CommandLine<'a> {
    /// Split a line at its first space
    #[must_use]
    pub fn parse(line: &'a str) -> Self {
        let bytes = line.as_bytes();
        let cmd_end = memchr::memchr(b' ', bytes).unwrap_or(bytes.len());
        let name = &line[..cmd_end];
        let arg = line[cmd_end..].trim();
        Self {
            name,
            arg: (!arg.is_empty()).then_some(arg),
        }
    }

    #[must_use]
    pub fn command(&self) -> Option<Command> {
        Command::lookup(self.name)
    }
}
