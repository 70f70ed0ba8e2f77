//! Memo extraction and serialization engine for Lethe.
//!
//! Memos are short timestamped entries kept in a markdown vault, either as
//! bullet lines inside daily notes or as one file per memo with frontmatter.
//! This crate is the pure text core: no I/O, no async.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │  template    composition template -> TemplatePatterns (one regex)     │
//! │  locator     anchor + section boundary -> InsertionPoint              │
//! │  bullet      line <-> ParsedBullet                                    │
//! │  builder     ParsedBullet + date -> MemoRecord (ids)                  │
//! │  splice      insert / remove a line in a daily note                   │
//! │  individual  MemoRecord <-> frontmatter file, filenames               │
//! │  export      memos grouped by day as markdown                         │
//! └───────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use chrono::NaiveDate;
//! use lethe_memo::{
//!     TemplatePatterns, build_insertion_text, locate_insertion_point,
//!     parse_daily_note_text, splice_insert,
//! };
//!
//! let patterns = TemplatePatterns::compile("{TIME} {CONTENT}")?;
//! let note = "# Journal\n- 09:00 coffee\n\n# Tasks\n";
//!
//! let time = chrono::NaiveTime::from_hms_opt(10, 30, 0).unwrap();
//! let line = build_insertion_text("standup", false, time, &patterns);
//! let point = locate_insertion_point(note, "# Journal");
//! let note = splice_insert(note, &point, &line);
//!
//! let day = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
//! let memos = parse_daily_note_text(&note, day, "Daily/2024-05-17.md", &patterns);
//! assert_eq!(memos.len(), 2);
//! assert_eq!(memos[1].content, "standup");
//! # Ok::<(), lethe_memo::MemoError>(())
//! ```

pub mod builder;
pub mod bullet;
pub mod error;
pub mod export;
pub mod individual;
pub mod locator;
pub mod splice;
pub mod template;
pub mod types;

pub use builder::{
    build_daily_memo, daily_memo_id, individual_memo_id, new_daily_memo, parse_daily_memo_id,
    parse_daily_note_text, INDIVIDUAL_ID_SUFFIX,
};
pub use bullet::{build_insertion_text, parse_bullet, split_block_anchor, ParsedBullet};
pub use error::{MemoError, Result};
pub use export::{group_by_date, memos_to_text};
pub use individual::{
    decode_individual_file, encode_individual_file, generate_unique_filename, sanitize_filename,
    split_frontmatter, CreatedSource, DecodedMemo, FileTimes, Frontmatter,
    FRONTMATTER_TIME_FORMAT,
};
pub use locator::{line_ending, locate_insertion_point, split_lines, InsertionPoint};
pub use splice::{splice_insert, splice_remove, splice_remove_at, Removal};
pub use template::{TemplatePatterns, CONTENT_PLACEHOLDER, TIME_PLACEHOLDER};
pub use types::{
    expand_content, flatten_content, MemoRecord, MemoType, ID_TIMESTAMP_FORMAT,
    LINE_BREAK_SENTINEL, TIMESTAMP_FORMAT,
};
