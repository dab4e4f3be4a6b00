// Element ids the host looks up in the page.
pub const CANVAS_ID: &str = "gameCanvas";
pub const STATUS_INDICATOR_ID: &str = "statusIndicator";
pub const STATUS_TEXT_ID: &str = "statusText";
pub const GAZE_CURSOR_ID: &str = "gazeCursor";

pub const STATUS_BASE_CLASS: &str = "status-indicator";
pub const FIXATING_CLASS: &str = "fixating";
