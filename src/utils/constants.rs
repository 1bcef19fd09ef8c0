/// Station observation file layout
pub const OBSERVATION_FIELD_COUNT: usize = 16;
pub const OBSERVATION_DELIMITER: u8 = b';';
pub const OBSERVATION_DATE_FORMAT: &str = "%d%m%Y";

/// Directory and file naming
pub const DEFAULT_REGION_PATTERN: &str = r"^region\d+$";
pub const DEFAULT_DATA_FILE_PATTERN: &str = r"^donnees_region\d+";
pub const STATION_LIST_FILE: &str = "station_list.csv";
pub const PARTIAL_SUFFIX: &str = "partial";

/// Summary serialization
pub const OUTPUT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const LIST_SEPARATOR: &str = "|";
pub const COORDINATE_PRECISION: i32 = 6;

/// Harvester defaults
pub const DEFAULT_DATE_PATTERN: &str = r"20\d{2}\.\d{2}\.\d{2}";
pub const TILE_LOCATION_PLACEHOLDER: &str = "LOCATION";
pub const DEFAULT_TILE_LOCATIONS: [&str; 3] = ["h17v04", "h18v03", "h18v04"];
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_INITIAL_RETRY_DELAY_SECS: u64 = 2;
pub const DEFAULT_MAX_RETRY_DELAY_SECS: u64 = 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
