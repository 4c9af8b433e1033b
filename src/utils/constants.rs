/// Required input columns
pub const COLUMN_DATE_TIME: &str = "Date/Time";
pub const COLUMN_LAT: &str = "Lat";
pub const COLUMN_LON: &str = "Lon";
pub const COLUMN_BASE: &str = "Base";

/// Default input set: six monthly trip logs
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_INPUT_FILES: [&str; 6] = [
    "uber-raw-data-apr14.csv",
    "uber-raw-data-may14.csv",
    "uber-raw-data-jun14.csv",
    "uber-raw-data-jul14.csv",
    "uber-raw-data-aug14.csv",
    "uber-raw-data-sep14.csv",
];

/// Engine bootstrap
pub const APP_NAME: &str = "TripAnalysis";
pub const ENV_PREFIX: &str = "TRIP";
pub const ENGINE_HOME_KEY: &str = "engine_home";
pub const ENGINE_HOME_ENV: &str = "TRIP_ENGINE_HOME";
pub const SCRATCH_DIR_PREFIX: &str = "trip-session-";

/// Sampling defaults
pub const DEFAULT_SAMPLE_FRACTION: f64 = 0.01;
pub const DEFAULT_SAMPLE_SEED: u64 = 42;
pub const OUTLIER_SAMPLE_STREAM: u64 = 0;
pub const RELATIONSHIP_SAMPLE_STREAM: u64 = 1;

/// Processing defaults
pub const DEFAULT_PREVIEW_ROWS: usize = 5;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
pub const HOURS_PER_DAY: usize = 24;

/// Chart geometry (pixels)
pub const HOURLY_CHART_SIZE: (u32, u32) = (1000, 600);
pub const OUTLIER_CHART_SIZE: (u32, u32) = (1200, 500);
pub const PAIR_CHART_CELL: u32 = 220;
pub const KDE_GRID_POINTS: usize = 128;

/// Chart file names
pub const HOURLY_CHART_FILE: &str = "hourly_trips.png";
pub const OUTLIER_CHART_FILE: &str = "lat_lon_boxplots.png";
pub const PAIR_CHART_FILE: &str = "feature_pairplot.png";
