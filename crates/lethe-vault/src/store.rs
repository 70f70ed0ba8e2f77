//! Memo store: capture, list, hide and export memos in a vault.
//!
//! The store owns the active [`TemplatePatterns`] and routes every operation
//! to the configured storage mode. Each read-modify-write of one file runs
//! under that file's [`PathLocks`] guard.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{Days, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use lethe_config::{LetheConfig, StorageMode};
use lethe_memo::{
    ID_TIMESTAMP_FORMAT, MemoError, MemoRecord, MemoType, TemplatePatterns, build_daily_memo,
    build_insertion_text, decode_individual_file, encode_individual_file, flatten_content,
    generate_unique_filename, individual_memo_id, locate_insertion_point, memos_to_text,
    new_daily_memo, parse_bullet, parse_daily_memo_id, parse_daily_note_text, sanitize_filename,
    splice_insert, splice_remove_at, split_lines,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::daily::DailyNotes;
use crate::error::{Result, StoreError, VaultError};
use crate::locks::PathLocks;
use crate::vault::{SharedVault, parent_folder};

/// Attempts at creating an individual file when another writer takes the name first.
const CREATE_ATTEMPTS: usize = 3;

/// Settings the store needs, flattened from [`LetheConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub mode: StorageMode,
    pub daily_folder: String,
    pub daily_format: String,
    pub insert_after: String,
    /// Vault path of a note used to seed new daily notes.
    pub daily_template: Option<String>,
    pub individual_folder: String,
    pub filename_length: usize,
    pub tags: Vec<String>,
    pub composition: String,
    /// Capture as a task when the caller doesn't say.
    pub default_task: bool,
}

impl From<&LetheConfig> for StoreConfig {
    fn from(config: &LetheConfig) -> Self {
        let daily = config.daily_notes();
        let individual = config.individual();
        let memo = config.memo();
        Self {
            mode: config.storage().mode,
            daily_folder: daily.folder,
            daily_format: daily.format,
            insert_after: daily.insert_after,
            daily_template: daily.template,
            individual_folder: individual.folder,
            filename_length: individual.filename_length,
            tags: individual.tags,
            composition: memo.composition,
            default_task: memo.default_prefix.is_task(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::from(&LetheConfig::default())
    }
}

/// Result of [`MemoStore::create_memo`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedMemo {
    pub memo: MemoRecord,
    /// The anchor heading was missing and the memo went to the end of the note.
    pub appended_at_end: bool,
    /// A new daily note was created for this memo.
    pub created_note: bool,
}

/// Result of [`MemoStore::list_memos`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemoListing {
    /// Newest first.
    pub memos: Vec<MemoRecord>,
    /// Shown to the user when the listing is empty for a reason (missing folder).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Result of [`MemoStore::hide_memo`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HideOutcome {
    pub removed: bool,
    /// File that held the memo.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl HideOutcome {
    fn not_found() -> Self {
        Self {
            removed: false,
            path: None,
        }
    }
}

/// Memo operations over a vault.
pub struct MemoStore {
    vault: SharedVault,
    config: StoreConfig,
    patterns: Arc<TemplatePatterns>,
    daily: DailyNotes,
    locks: PathLocks,
}

impl MemoStore {
    /// Compile the composition template and validate the daily-note format.
    pub fn new(vault: SharedVault, config: StoreConfig) -> Result<Self> {
        let patterns = Arc::new(TemplatePatterns::compile(&config.composition)?);
        let daily = DailyNotes::new(config.daily_folder.clone(), config.daily_format.clone())?;
        Ok(Self {
            vault,
            config,
            patterns,
            daily,
            locks: PathLocks::new(),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn patterns(&self) -> &Arc<TemplatePatterns> {
        &self.patterns
    }

    pub fn daily_notes(&self) -> &DailyNotes {
        &self.daily
    }

    // ── Create ──────────────────────────────────────────────────────────

    /// Capture a memo now. `is_task = None` uses the configured default.
    pub async fn create_memo(&self, content: &str, is_task: Option<bool>) -> Result<CreatedMemo> {
        self.create_memo_at(content, is_task, Local::now().naive_local())
            .await
    }

    /// Capture a memo as if it were `now`.
    pub async fn create_memo_at(
        &self,
        content: &str,
        is_task: Option<bool>,
        now: NaiveDateTime,
    ) -> Result<CreatedMemo> {
        let content = content.trim();
        if content.is_empty() {
            return Err(StoreError::EmptyContent);
        }
        let is_task = is_task.unwrap_or(self.config.default_task);
        let now = now.with_nanosecond(0).unwrap_or(now);

        let created = match self.config.mode {
            StorageMode::DailyNotes => self.create_in_daily_note(content, is_task, now).await?,
            StorageMode::IndividualFiles => {
                self.create_individual_file(content, is_task, now).await?
            }
        };
        info!(id = %created.memo.id, path = %created.memo.path, "memo created");
        Ok(created)
    }

    async fn create_in_daily_note(
        &self,
        content: &str,
        is_task: bool,
        now: NaiveDateTime,
    ) -> Result<CreatedMemo> {
        let path = self.daily.path_for(now.date());
        let _guard = self.locks.lock(&path).await;

        let (text, created_note) = if self.vault.exists(&path).await? {
            (self.vault.read_text(&path).await?, false)
        } else {
            (self.create_daily_note(&path, now.date()).await?, true)
        };

        // Bullet lines carry minute precision; ids follow suit.
        let minute = NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or(now.time());
        let created_at = now.date().and_time(minute);

        let line = build_insertion_text(content, is_task, minute, &self.patterns);
        let point = locate_insertion_point(&text, &self.config.insert_after);
        let updated = splice_insert(&text, &point, &line);
        self.vault.write_text(&path, &updated).await?;

        let line_index = if point.anchor_found {
            point.line_index + 1
        } else {
            last_content_line(&updated)
        };

        Ok(CreatedMemo {
            memo: new_daily_memo(
                &flatten_content(content),
                is_task,
                created_at,
                line_index,
                &path,
            ),
            appended_at_end: !point.anchor_found,
            created_note,
        })
    }

    /// Create the daily note at `path`, returning its initial text.
    ///
    /// The note is seeded from the configured template, with `{{date}}` and
    /// `{{title}}` filled in, or else with just the anchor heading.
    async fn create_daily_note(&self, path: &str, date: NaiveDate) -> Result<String> {
        let title = self.daily.title_for(date);
        let seed = match self.config.daily_template.as_deref() {
            Some(template) => match self.vault.read_text(template).await {
                Ok(text) => text
                    .replace("{{date}}", &date.format("%Y-%m-%d").to_string())
                    .replace("{{title}}", &title),
                Err(VaultError::NotFound(_)) => {
                    warn!(template, "daily note template not found, seeding with anchor");
                    self.anchor_seed()
                }
                Err(e) => return Err(e.into()),
            },
            None => self.anchor_seed(),
        };

        let folder = parent_folder(path);
        if !folder.is_empty() {
            self.vault.create_folder(folder).await?;
        }
        self.vault.create_file(path, &seed).await?;
        debug!(path, "daily note created");
        Ok(seed)
    }

    fn anchor_seed(&self) -> String {
        let anchor = self.config.insert_after.trim();
        if anchor.is_empty() {
            String::new()
        } else {
            format!("{anchor}\n")
        }
    }

    async fn create_individual_file(
        &self,
        content: &str,
        is_task: bool,
        now: NaiveDateTime,
    ) -> Result<CreatedMemo> {
        let folder = self.config.individual_folder.trim_matches('/');
        let _guard = self.locks.lock(folder).await;
        if !folder.is_empty() {
            self.vault.create_folder(folder).await?;
        }

        let mut record = MemoRecord {
            id: individual_memo_id(now),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
            memo_type: if is_task {
                MemoType::TaskTodo
            } else {
                MemoType::Journal
            },
            path: String::new(),
            has_id: None,
        };
        let text = encode_individual_file(&record, &self.config.tags)?;

        let base = sanitize_filename(content, self.config.filename_length);
        let timestamp = now.format(ID_TIMESTAMP_FORMAT).to_string();
        let mut taken: HashSet<String> = self.vault.list_files(folder).await?.into_iter().collect();

        for _ in 0..CREATE_ATTEMPTS {
            let path = generate_unique_filename(|p| taken.contains(p), folder, &base, &timestamp)?;
            let result = self.vault.create_file(&path, &text).await;
            match result {
                Ok(()) => {
                    record.path = path;
                    return Ok(CreatedMemo {
                        memo: record,
                        appended_at_end: false,
                        created_note: false,
                    });
                }
                Err(VaultError::AlreadyExists(_)) => {
                    debug!(path = %path, "filename taken by another writer, probing again");
                    taken.insert(path);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(MemoError::FilenameExhausted {
            base,
            attempts: CREATE_ATTEMPTS,
        }
        .into())
    }

    // ── List ────────────────────────────────────────────────────────────

    /// Every memo in the vault, newest first.
    pub async fn list_memos(&self) -> Result<MemoListing> {
        let listing = match self.config.mode {
            StorageMode::DailyNotes => self.list_daily_memos().await?,
            StorageMode::IndividualFiles => self.list_individual_memos().await?,
        };
        debug!(count = listing.memos.len(), "memos listed");
        Ok(listing)
    }

    async fn list_daily_memos(&self) -> Result<MemoListing> {
        let folder = self.daily.folder();
        let files = match self.vault.list_files(folder).await {
            Ok(files) => files,
            Err(VaultError::NotFound(_)) => {
                return Ok(missing_folder_listing(folder, "daily notes"));
            }
            Err(e) => return Err(e.into()),
        };

        let mut memos = Vec::new();
        for path in files {
            let Some(date) = self.daily.date_of_file(&path) else {
                continue;
            };
            let text = match self.vault.read_text(&path).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(path = %path, error = %e, "skipping unreadable daily note");
                    continue;
                }
            };
            if self.patterns.count_memo_lines(&text) == 0 {
                continue;
            }
            memos.extend(parse_daily_note_text(&text, date, &path, &self.patterns));
        }

        sort_newest_first(&mut memos);
        Ok(MemoListing {
            memos,
            notice: None,
        })
    }

    async fn list_individual_memos(&self) -> Result<MemoListing> {
        let folder = self.config.individual_folder.trim_matches('/');
        let files = match self.vault.list_files(folder).await {
            Ok(files) => files,
            Err(VaultError::NotFound(_)) => {
                return Ok(missing_folder_listing(folder, "memo files"));
            }
            Err(e) => return Err(e.into()),
        };

        let mut memos = Vec::new();
        for path in files {
            let loaded = async {
                let text = self.vault.read_text(&path).await?;
                let times = self.vault.file_times(&path).await?;
                Ok::<_, VaultError>((text, times))
            }
            .await;
            let (text, times) = match loaded {
                Ok(loaded) => loaded,
                Err(e) => {
                    warn!(path = %path, error = %e, "skipping unreadable memo file");
                    continue;
                }
            };
            let host = self.vault.frontmatter_of(&path).await;
            let decoded = decode_individual_file(&text, &path, times, host.as_ref());
            memos.push(decoded.record);
        }

        bump_colliding_ids(&mut memos);
        sort_newest_first(&mut memos);
        Ok(MemoListing {
            memos,
            notice: None,
        })
    }

    // ── Hide ────────────────────────────────────────────────────────────

    /// Remove a memo by id: its line in daily-notes mode, its file otherwise.
    ///
    /// A memo that no longer exists is reported, not an error.
    pub async fn hide_memo(&self, id: &str) -> Result<HideOutcome> {
        let outcome = match self.config.mode {
            StorageMode::DailyNotes => self.hide_daily_memo(id).await?,
            StorageMode::IndividualFiles => self.hide_individual_memo(id).await?,
        };
        if outcome.removed {
            info!(id, path = outcome.path.as_deref().unwrap_or(""), "memo hidden");
        } else {
            debug!(id, "memo to hide not found");
        }
        Ok(outcome)
    }

    async fn hide_daily_memo(&self, id: &str) -> Result<HideOutcome> {
        let (created, line_index) = parse_daily_memo_id(id).map_err(|e| match e {
            MemoError::InvalidId(id) => StoreError::InvalidId(id),
            other => other.into(),
        })?;
        let date = created.date();
        let path = self.daily.path_for(date);
        let _guard = self.locks.lock(&path).await;

        if !self.vault.exists(&path).await? {
            return Ok(HideOutcome::not_found());
        }
        let text = self.vault.read_text(&path).await?;

        // The line must still be the same memo; notes can change under us.
        let line = match split_lines(&text).get(line_index) {
            Some(line) => line.to_string(),
            None => return Ok(HideOutcome::not_found()),
        };
        let still_matches = parse_bullet(&line, &self.patterns)
            .and_then(|bullet| build_daily_memo(date, bullet, line_index, &path))
            .is_some_and(|memo| memo.id == id);
        if !still_matches {
            return Ok(HideOutcome::not_found());
        }

        let removal = splice_remove_at(&text, line_index);
        if removal.removed {
            self.vault.write_text(&path, &removal.text).await?;
        }
        Ok(HideOutcome {
            removed: removal.removed,
            path: Some(path),
        })
    }

    async fn hide_individual_memo(&self, id: &str) -> Result<HideOutcome> {
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        let folder = self.config.individual_folder.trim_matches('/');
        let _guard = self.locks.lock(folder).await;

        let listing = self.list_individual_memos().await?;
        let Some(memo) = listing.memos.into_iter().find(|m| m.id == id) else {
            return Ok(HideOutcome::not_found());
        };
        self.vault.remove_file(&memo.path).await?;
        Ok(HideOutcome {
            removed: true,
            path: Some(memo.path),
        })
    }

    // ── Export ──────────────────────────────────────────────────────────

    /// Memos created within `[since, until]` (inclusive, either open), as a
    /// markdown list grouped by day, oldest day first.
    pub async fn export_text(
        &self,
        since: Option<NaiveDate>,
        until: Option<NaiveDate>,
    ) -> Result<String> {
        let mut memos: Vec<MemoRecord> = self
            .list_memos()
            .await?
            .memos
            .into_iter()
            .filter(|m| {
                let day = m.created_at.date();
                since.is_none_or(|s| day >= s) && until.is_none_or(|u| day <= u)
            })
            .collect();
        memos.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(memos_to_text(&memos, &self.patterns, self.daily.format()))
    }

    // ── Daily notes ─────────────────────────────────────────────────────

    /// Create the notes for `today` and the day after if they don't exist.
    ///
    /// Returns the paths that were created.
    pub async fn precreate_daily_notes(&self, today: NaiveDate) -> Result<Vec<String>> {
        let mut created = Vec::new();
        let days = [Some(today), today.checked_add_days(Days::new(1))];
        for date in days.into_iter().flatten() {
            let path = self.daily.path_for(date);
            let _guard = self.locks.lock(&path).await;
            if self.vault.exists(&path).await? {
                continue;
            }
            self.create_daily_note(&path, date).await?;
            info!(path = %path, "daily note pre-created");
            created.push(path);
        }
        Ok(created)
    }
}

fn missing_folder_listing(folder: &str, what: &str) -> MemoListing {
    let shown = if folder.is_empty() { "/" } else { folder };
    debug!(folder = shown, "memo folder missing");
    MemoListing {
        memos: Vec::new(),
        notice: Some(format!(
            "Folder '{shown}' does not exist yet; no {what} to show. It is created on the first capture."
        )),
    }
}

/// Index of the last non-blank line, for memos appended at the end of a note.
fn last_content_line(text: &str) -> usize {
    let lines = split_lines(text);
    lines
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .unwrap_or(0)
}

fn sort_newest_first(memos: &mut [MemoRecord]) {
    memos.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
}

/// Individual ids only have second precision; make them unique by bumping
/// the suffix (`001`, `002`, ...) in order of creation then path.
fn bump_colliding_ids(memos: &mut [MemoRecord]) {
    memos.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.path.cmp(&b.path)));
    let mut seen: HashMap<String, usize> = HashMap::new();
    for memo in memos.iter_mut() {
        let stamp = memo.created_at.format(ID_TIMESTAMP_FORMAT).to_string();
        let count = seen.entry(stamp.clone()).or_insert(0);
        *count += 1;
        memo.id = format!("{stamp}{:03}", *count);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
