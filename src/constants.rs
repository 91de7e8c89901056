pub struct GridDefaults {
    pub start_hour: u8,
    pub end_hour: u8,
    pub work_target_hours: f64,
    pub minute_px: f64,
}

pub const GRID_DEFAULTS: GridDefaults = GridDefaults {
    start_hour: 0,
    end_hour: 24,
    work_target_hours: 38.5,
    minute_px: 2.0,
};

pub struct BlockStyle {
    pub min_height_px: f64,
    pub fallback_color: &'static str,
}

pub const BLOCK_STYLE: BlockStyle = BlockStyle {
    min_height_px: 10.0,
    fallback_color: "#dddddd",
};

pub const DEFAULT_CATEGORIES: [(&str, &str); 7] = [
    ("Sleep", "#bef264"),
    ("Children", "#fca5a5"),
    ("Commute", "#a5b4fc"),
    ("Work", "#60a5fa"),
    ("Training", "#fbbf24"),
    ("Meals", "#34d399"),
    ("Focus (Thesis/Business)", "#f472b6"),
];

pub const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
