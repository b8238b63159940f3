//! Input limits enforced before any store access.

pub const MAX_CODE_LEN: usize = 32;
pub const MAX_NAME_LEN: usize = 512;
pub const MAX_PURPOSE_LEN: usize = 512;
pub const MAX_NOTES_LEN: usize = 1024;

/// Semester ordinals are 1-based positions in a study program.
pub const MIN_SEMESTER_ORDINAL: u8 = 1;
pub const MAX_SEMESTER_ORDINAL: u8 = 14;

/// Days of week are 0=Sunday .. 6=Saturday.
pub const MAX_DAY_OF_WEEK: u8 = 6;
