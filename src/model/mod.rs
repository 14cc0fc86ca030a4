pub mod database_read;
pub mod database_write;
pub mod report;
pub mod score;
pub mod types;

pub use report::*;
pub use score::*;
pub use types::*;

/// Schema statements for a fresh SQLite database, in dependency order.
pub const SQLITE_SCHEMA: [&str; 7] = [
    include_str!("../sql/schema/sqlite/01_golf_club.sql"),
    include_str!("../sql/schema/sqlite/02_golf_course.sql"),
    include_str!("../sql/schema/sqlite/03_hole.sql"),
    include_str!("../sql/schema/sqlite/04_player.sql"),
    include_str!("../sql/schema/sqlite/05_round.sql"),
    include_str!("../sql/schema/sqlite/06_round_player.sql"),
    include_str!("../sql/schema/sqlite/07_score.sql"),
];

pub const SQLITE_DROP_TABLES: &str = include_str!("../sql/schema/sqlite/00_table_drop.sql");
