/// How the player picks the track after the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOrder {
    /// Follow the on-screen list; picking a track moves it to the top.
    Dynamic,
    /// Follow track numbers.
    Sequential,
}

#[allow(clippy::derivable_impls)]
impl Default for PlayOrder {
    fn default() -> Self {
        PlayOrder::Dynamic
    }
}

impl PlayOrder {
    pub fn toggled(self) -> Self {
        match self {
            PlayOrder::Dynamic => PlayOrder::Sequential,
            PlayOrder::Sequential => PlayOrder::Dynamic,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlayOrder::Dynamic => "DYNAMIC",
            PlayOrder::Sequential => "SEQUENTIAL",
        }
    }
}
