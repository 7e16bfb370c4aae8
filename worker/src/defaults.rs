use std::collections::HashMap;

pub const DEFAULT_WORK_START: &str = "08:00";
pub const DEFAULT_WORK_END: &str = "17:00";
pub const DEFAULT_BREAK_EARLIEST_START: &str = "11:00";
pub const DEFAULT_BREAK_OVERRUN_CUTOFF: &str = "13:00";

pub const DEFAULT_BREAK_DURATION_MINUTES: i32 = 30;
pub const DEFAULT_TRAVEL_BUFFER_MINUTES: i32 = 20;
pub const DEFAULT_JOBS_PER_TEAM_PER_DAY: i32 = 5;
pub const MAX_JOBS_PER_TEAM_PER_DAY: i32 = 6;

pub const DEFAULT_HORIZON_WEEKS: u32 = 12;
pub const MIN_JOB_DURATION_MINUTES: i32 = 15;

// Duration estimation weights (minutes)
pub const DEFAULT_BASE_MINUTES: i32 = 30;
pub const DEFAULT_MINUTES_PER_BEDROOM: i32 = 20;
pub const DEFAULT_MINUTES_PER_BATHROOM: i32 = 25;
pub const DEFAULT_MINUTES_PER_LIVING_AREA: i32 = 15;
pub const DEFAULT_MINUTES_PER_KITCHEN: i32 = 20;

/// Stock servicing rhythm across the coast: suburbs grouped by weekday.
/// Saved settings replace this wholesale.
pub fn default_area_schedule() -> HashMap<String, Vec<String>> {
    let mut schedule = HashMap::new();
    schedule.insert(
        "monday".to_string(),
        vec!["Buderim".to_string(), "Sippy Downs".to_string(), "Mountain Creek".to_string()],
    );
    schedule.insert(
        "tuesday".to_string(),
        vec![
            "Maroochydore".to_string(),
            "Alexandra Headland".to_string(),
            "Mooloolaba".to_string(),
        ],
    );
    schedule.insert(
        "wednesday".to_string(),
        vec!["Caloundra".to_string(), "Kawana Waters".to_string(), "Currimundi".to_string()],
    );
    schedule.insert(
        "thursday".to_string(),
        vec!["Noosa Heads".to_string(), "Noosaville".to_string(), "Coolum Beach".to_string()],
    );
    schedule.insert(
        "friday".to_string(),
        vec!["Nambour".to_string(), "Woombye".to_string(), "Palmwoods".to_string()],
    );
    schedule
}
