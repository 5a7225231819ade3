//! Tile identifiers: every full-screen page the watch can show.

/// A full-screen page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    /// Watch face: time, steps, alarm and bluetooth indicators.
    Main,
    /// Application launcher page `n`.
    App(u8),
    /// Notification list.
    Note,
    /// Settings page `n`.
    Setup(u8),
}

impl Tile {
    /// Stable name for log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Tile::Main => "main",
            Tile::App(_) => "app",
            Tile::Note => "note",
            Tile::Setup(_) => "setup",
        }
    }
}
