use strum::EnumString;

/// Command verbs recognized by the shell.
///
/// Matched case-insensitively against the first word of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Keyword {
    Create,
    Use,
    Add,
    List,
    Find,
    Update,
    Delete,
    Save,
    Load,
    Tables,
    Help,

    #[strum(serialize = "Exit", serialize = "Quit")]
    Exit,
}
