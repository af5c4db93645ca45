/// One of the four fixed statistics time ranges an export covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Day,
    Week,
    Month,
    AllTime,
}

impl Window {
    /// Upstream export order: short windows first, all-time last.
    pub const ALL: [Window; 4] = [Window::Day, Window::Week, Window::Month, Window::AllTime];

    /// Windows where view counts are not comparable to the catalog's
    /// all-time view count, so matching falls back to first-available.
    pub const SHORT: [Window; 3] = [Window::Day, Window::Week, Window::Month];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::AllTime => "all_time",
        }
    }

    pub fn export_file_name(self) -> String {
        format!("{}.txt", self.as_str())
    }

    pub fn parsed_file_name(self) -> String {
        format!("{}.json", self.as_str())
    }
}
