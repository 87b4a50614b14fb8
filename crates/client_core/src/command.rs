/// Canonical user intent, whatever channel it arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    SelectFocused,
    /// 1-based position in the list on screen.
    SelectByNumber(u32),
    Confirm,
    Cancel,
    Help,
}
