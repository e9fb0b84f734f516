/// Offset between UI item indices and data indices.
///
/// A grid that shows a synthetic leading cell (for example a capture button)
/// has one more item than the data sequence; every data index sits one slot
/// further along in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexBias(usize);

impl IndexBias {
    pub const NONE: IndexBias = IndexBias(0);
    pub const LEADING_PLACEHOLDER: IndexBias = IndexBias(1);

    pub fn from_placeholder(has_leading_placeholder: bool) -> Self {
        if has_leading_placeholder {
            Self::LEADING_PLACEHOLDER
        } else {
            Self::NONE
        }
    }

    pub fn value(self) -> usize {
        self.0
    }

    /// Maps a UI index to a data index. `None` for the synthetic cells.
    pub fn to_data(self, ui_index: usize) -> Option<usize> {
        ui_index.checked_sub(self.0)
    }

    pub fn to_ui(self, data_index: usize) -> usize {
        data_index + self.0
    }
}
