use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::row::ColumnLayout;
use crate::error::{AppError, AppResult};

const APP_DIR_NAME: &str = "ticket-outline";
const CONFIG_FILE_NAME: &str = "config.json";
const ENV_PREFIX: &str = "OUTLINE_";
pub const DEFAULT_DOCUMENT_TITLE: &str = "Generate Docs Outline From Sheet";
pub const DEFAULT_SHEET_RANGE: &str = "A:Z";

pub fn config_directory() -> AppResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| AppError::Configuration("no configuration directory available".to_string()))
}

pub fn config_file_path() -> AppResult<PathBuf> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}

/// Raw settings as persisted by `config init`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sink: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_id_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_column: Option<String>,
}

impl StoredConfig {
    pub fn load() -> AppResult<Self> {
        let path = config_file_path()?;
        match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|err| {
                AppError::Configuration(format!("invalid config file {}: {err}", path.display()))
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    pub fn save(&self) -> AppResult<()> {
        let path = config_file_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)
            .map_err(|err| AppError::Configuration(format!("failed to write config: {err}")))?;
        fs::write(&path, data)?;
        Ok(())
    }

    /// Overlays `OUTLINE_<FIELD>` values looked up through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for (name, field) in self.fields_mut() {
            if let Some(value) = lookup(&format!("{ENV_PREFIX}{}", name.to_uppercase())) {
                *field = Some(value);
            }
        }
    }

    fn fields_mut(&mut self) -> [(&'static str, &mut Option<String>); 12] {
        [
            ("source", &mut self.source),
            ("sheet_id", &mut self.sheet_id),
            ("sheet_range", &mut self.sheet_range),
            ("rows_file", &mut self.rows_file),
            ("sink", &mut self.sink),
            ("output_dir", &mut self.output_dir),
            ("google_access_token", &mut self.google_access_token),
            ("ticket_base_url", &mut self.ticket_base_url),
            ("document_title", &mut self.document_title),
            ("ticket_id_column", &mut self.ticket_id_column),
            ("summary_column", &mut self.summary_column),
            ("organization_column", &mut self.organization_column),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SourceConfig {
    Sheets {
        sheet_id: Option<String>,
        range: String,
    },
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SinkConfig {
    GoogleDocs,
    Markdown { output_dir: PathBuf },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub sink: SinkConfig,
    pub google_access_token: Option<String>,
    pub ticket_base_url: Option<String>,
    pub document_title: String,
    pub columns: ColumnLayout,
}

impl AppConfig {
    /// Stored file, then environment overrides.
    pub fn load() -> AppResult<Self> {
        let mut stored = StoredConfig::load()?;
        stored.apply_overrides(|key| std::env::var(key).ok());
        Self::from_stored(stored)
    }

    pub fn from_stored(stored: StoredConfig) -> AppResult<Self> {
        let source = match non_empty(stored.source).as_deref() {
            Some("sheets") => sheets_source(stored.sheet_id, stored.sheet_range),
            Some("file") => SourceConfig::File(
                non_empty(stored.rows_file)
                    .map(PathBuf::from)
                    .ok_or_else(|| {
                        AppError::Configuration("rows file not configured".to_string())
                    })?,
            ),
            Some(other) => {
                return Err(AppError::Configuration(format!(
                    "unknown source '{other}' (expected sheets or file)"
                )));
            }
            None => match (non_empty(stored.rows_file), non_empty(stored.sheet_id)) {
                (Some(path), None) => SourceConfig::File(PathBuf::from(path)),
                (_, sheet_id) => sheets_source(sheet_id, stored.sheet_range),
            },
        };

        let output_dir = non_empty(stored.output_dir)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let sink = match non_empty(stored.sink).as_deref() {
            None | Some("markdown") => SinkConfig::Markdown { output_dir },
            Some("google-docs") => SinkConfig::GoogleDocs,
            Some(other) => {
                return Err(AppError::Configuration(format!(
                    "unknown sink '{other}' (expected markdown or google-docs)"
                )));
            }
        };

        let defaults = ColumnLayout::default();
        let columns = ColumnLayout {
            ticket_id: column_index(
                "ticket_id_column",
                stored.ticket_id_column,
                defaults.ticket_id,
            )?,
            ticket_summary: column_index(
                "summary_column",
                stored.summary_column,
                defaults.ticket_summary,
            )?,
            organization_name: column_index(
                "organization_column",
                stored.organization_column,
                defaults.organization_name,
            )?,
        };

        Ok(Self {
            source,
            sink,
            google_access_token: non_empty(stored.google_access_token),
            ticket_base_url: non_empty(stored.ticket_base_url),
            document_title: non_empty(stored.document_title)
                .unwrap_or_else(|| DEFAULT_DOCUMENT_TITLE.to_string()),
            columns,
        })
    }
}

fn sheets_source(sheet_id: Option<String>, range: Option<String>) -> SourceConfig {
    SourceConfig::Sheets {
        sheet_id: non_empty(sheet_id),
        range: non_empty(range).unwrap_or_else(|| DEFAULT_SHEET_RANGE.to_string()),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn column_index(name: &str, value: Option<String>, default: usize) -> AppResult<usize> {
    match non_empty(value) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| {
            AppError::Configuration(format!("{name} must be a zero-based column index, got '{raw}'"))
        }),
    }
}
