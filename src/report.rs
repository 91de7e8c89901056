use std::collections::BTreeMap;

use crate::{constants::GRID_DEFAULTS, domain::Block};

/// Minutes for one category across the week, day-indexed 0-6 (Monday
/// first).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategorySummary {
    pub category: String,
    pub minutes_by_day: [u32; 7],
    pub week_minutes: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WeekSummary {
    pub rows: Vec<CategorySummary>,
    pub work_minutes: u32,
    pub core_work_minutes: u32,
    pub alt_focus_minutes: u32,
}

/// Sums block durations per category and day, with rows sorted by
/// category name. Work subtotals match the "work" category
/// case-insensitively; the core/alt sums only count blocks carrying the
/// respective flag. Durations never go negative, so malformed data
/// contributes zero instead of poisoning the totals.
pub fn build_week_summary(blocks: &[Block]) -> WeekSummary {
    let mut by_category: BTreeMap<&str, [u32; 7]> = BTreeMap::new();
    let mut work_minutes = 0u32;
    let mut core_work_minutes = 0u32;
    let mut alt_focus_minutes = 0u32;

    for block in blocks {
        if block.day > 6 {
            continue;
        }
        let duration = block.interval.end.saturating_sub(block.interval.start) as u32;
        let days = by_category.entry(block.category.as_str()).or_insert([0; 7]);
        days[block.day as usize] += duration;

        if block.is_work() {
            work_minutes += duration;
            if block.core_work {
                core_work_minutes += duration;
            }
            if block.alt_focus {
                alt_focus_minutes += duration;
            }
        }
    }

    let rows = by_category
        .into_iter()
        .map(|(category, minutes_by_day)| CategorySummary {
            category: category.to_string(),
            week_minutes: minutes_by_day.iter().sum(),
            minutes_by_day,
        })
        .collect();

    WeekSummary {
        rows,
        work_minutes,
        core_work_minutes,
        alt_focus_minutes,
    }
}

/// Fraction of the weekly work target met, clamped to 1.0. A non-positive
/// target falls back to the default target.
pub fn work_completion_ratio(work_minutes: u32, work_target_hours: f64) -> f64 {
    let target = if work_target_hours > 0.0 {
        work_target_hours
    } else {
        GRID_DEFAULTS.work_target_hours
    };
    (work_minutes as f64 / 60.0 / target).min(1.0)
}
