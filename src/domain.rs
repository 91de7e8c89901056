use rand::{Rng, distributions::Alphanumeric};

use crate::{
    constants::{BLOCK_STYLE, DEFAULT_CATEGORIES, GRID_DEFAULTS},
    error::{TrellisError, TrellisResult},
    timecode::{self, DAY_END, Minute},
};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlockId(pub String);

impl BlockId {
    pub fn generate() -> Self {
        BlockId(format!("b-{}", random_token()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GroupId(pub String);

impl GroupId {
    pub fn generate() -> Self {
        GroupId(format!("g-{}", random_token()))
    }
}

fn random_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect()
}

/// Minutes of day with `0 <= start < end <= 1440`. The upper bound 1440 is
/// the end-of-day boundary, not minute 0 of the next day.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeInterval {
    pub start: Minute,
    pub end: Minute,
}

impl TimeInterval {
    pub fn new(start: Minute, end: Minute) -> TrellisResult<Self> {
        if start >= end || end > DAY_END {
            return Err(TrellisError::InvalidInterval(start, end));
        }
        Ok(TimeInterval { start, end })
    }

    pub fn duration(&self) -> Minute {
        self.end.saturating_sub(self.start)
    }

    /// Half-open overlap test: touching endpoints do not overlap.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// One placed block. Blocks created together across several days share a
/// group id; edits replace the whole group at once.
#[derive(Clone, Debug)]
pub struct Block {
    pub id: BlockId,
    pub group: GroupId,
    pub title: String,
    pub category: String,
    pub day: u8,
    pub interval: TimeInterval,
    pub core_work: bool,
    pub alt_focus: bool,
}

impl Block {
    pub fn is_work(&self) -> bool {
        self.category.eq_ignore_ascii_case("work")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub color: String,
}

/// User input for one block group, before any validation. One block is
/// minted per selected day.
#[derive(Clone, Debug, Default)]
pub struct BlockDraft {
    pub title: String,
    pub category: String,
    pub days: Vec<u8>,
    pub start: String,
    pub end: String,
    pub core_work: bool,
    pub alt_focus: bool,
}

/// Parses and validates a draft, minting one block per selected day. All
/// minted blocks share a fresh group id.
pub fn mint_blocks(draft: &BlockDraft) -> TrellisResult<Vec<Block>> {
    let start = timecode::parse_hhmm(&draft.start)?;
    let end = timecode::parse_hhmm(&draft.end)?;
    let interval = TimeInterval::new(start, end)?;

    if draft.days.is_empty() {
        return Err(TrellisError::InvalidConfig("no days selected".to_string()));
    }

    let group = GroupId::generate();
    let mut blocks = Vec::with_capacity(draft.days.len());
    for &day in &draft.days {
        if day > 6 {
            return Err(TrellisError::InvalidConfig(format!(
                "day index {day} out of range 0-6"
            )));
        }
        blocks.push(Block {
            id: BlockId::generate(),
            group: group.clone(),
            title: draft.title.clone(),
            category: draft.category.clone(),
            day,
            interval,
            core_work: draft.core_work,
            alt_focus: draft.alt_focus,
        });
    }
    Ok(blocks)
}

/// The whole week as one owned value. Core functions take a snapshot of
/// this state and hand back derived values; the application replaces the
/// state wholesale after each mutation.
#[derive(Clone, Debug)]
pub struct WeekState {
    pub start_hour: u8,
    pub end_hour: u8,
    pub work_target_hours: f64,
    pub minute_px: f64,
    pub categories: Vec<Category>,
    pub blocks: Vec<Block>,
}

impl WeekState {
    pub fn with_defaults() -> Self {
        WeekState {
            start_hour: GRID_DEFAULTS.start_hour,
            end_hour: GRID_DEFAULTS.end_hour,
            work_target_hours: GRID_DEFAULTS.work_target_hours,
            minute_px: GRID_DEFAULTS.minute_px,
            categories: DEFAULT_CATEGORIES
                .iter()
                .map(|(name, color)| Category {
                    name: name.to_string(),
                    color: color.to_string(),
                })
                .collect(),
            blocks: Vec::new(),
        }
    }

    pub fn blocks_for_day(&self, day: u8) -> Vec<&Block> {
        self.blocks.iter().filter(|b| b.day == day).collect()
    }

    /// Applies a draft: mints one block per selected day and either appends
    /// them as a fresh group or atomically replaces an existing group.
    /// Returns the number of blocks minted.
    pub fn apply_draft(
        &mut self,
        draft: &BlockDraft,
        replace: Option<&GroupId>,
    ) -> TrellisResult<usize> {
        let mut blocks = mint_blocks(draft)?;
        let count = blocks.len();
        match replace {
            Some(group) => {
                for block in &mut blocks {
                    block.group = group.clone();
                }
                self.replace_group(group, blocks);
            }
            None => self.blocks.extend(blocks),
        }
        Ok(count)
    }

    /// Replaces every block sharing `group` with `new_blocks` in a single
    /// step. A group nobody belongs to simply gains the new blocks.
    pub fn replace_group(&mut self, group: &GroupId, new_blocks: Vec<Block>) {
        self.blocks.retain(|b| &b.group != group);
        self.blocks.extend(new_blocks);
    }

    pub fn remove_block(&mut self, id: &BlockId) -> bool {
        let before = self.blocks.len();
        self.blocks.retain(|b| &b.id != id);
        before != self.blocks.len()
    }

    pub fn remove_group(&mut self, group: &GroupId) -> usize {
        let before = self.blocks.len();
        self.blocks.retain(|b| &b.group != group);
        before - self.blocks.len()
    }

    pub fn clear_blocks(&mut self) {
        self.blocks.clear();
    }

    pub fn category_exists(&self, name: &str) -> bool {
        self.categories
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Category names are unique case-insensitively; returns false when
    /// the name is empty or already taken.
    pub fn add_category(&mut self, name: &str, color: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.category_exists(name) {
            return false;
        }
        self.categories.push(Category {
            name: name.to_string(),
            color: color.to_string(),
        });
        true
    }

    /// Removes the category only. Blocks keep their label and fall back to
    /// the default display color.
    pub fn delete_category(&mut self, name: &str) -> bool {
        let before = self.categories.len();
        self.categories
            .retain(|c| !c.name.eq_ignore_ascii_case(name));
        before != self.categories.len()
    }

    pub fn recolor_category(&mut self, name: &str, color: &str) -> bool {
        match self
            .categories
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(name))
        {
            Some(category) => {
                category.color = color.to_string();
                true
            }
            None => false,
        }
    }

    pub fn category_color(&self, name: &str) -> &str {
        self.categories
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.color.as_str())
            .unwrap_or(BLOCK_STYLE.fallback_color)
    }

    /// Visible grid hours; must satisfy `0 <= start < end <= 24`.
    pub fn set_hours(&mut self, start_hour: u8, end_hour: u8) -> TrellisResult<()> {
        if start_hour >= end_hour || end_hour > 24 {
            return Err(TrellisError::InvalidConfig(format!(
                "day must start before it ends within 0-24, got {start_hour}..{end_hour}"
            )));
        }
        self.start_hour = start_hour;
        self.end_hour = end_hour;
        Ok(())
    }

    pub fn set_minute_px(&mut self, minute_px: f64) -> TrellisResult<()> {
        if !(minute_px > 0.0) {
            return Err(TrellisError::InvalidConfig(format!(
                "pixels per minute must be positive, got {minute_px}"
            )));
        }
        self.minute_px = minute_px;
        Ok(())
    }

    /// Weekly work target in hours. Non-positive stored values fall back
    /// to the default target.
    pub fn work_target(&self) -> f64 {
        if self.work_target_hours > 0.0 {
            self.work_target_hours
        } else {
            GRID_DEFAULTS.work_target_hours
        }
    }

    pub fn grid_start_minute(&self) -> Minute {
        self.start_hour as Minute * 60
    }

    pub fn grid_end_minute(&self) -> Minute {
        self.end_hour as Minute * 60
    }
}
