//! Stage definition sources
//!
//! A stage file is 30 lines of 30 tile symbols, each line ending in `\n`.
//! Sources hand back the symbol rows; [`crate::sim::Grid::from_symbols`]
//! turns them into terrain.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::consts::{GRID_COLUMNS, GRID_ROWS};
use crate::error::StageError;
use crate::sim::TileKind;

/// Size of a well-formed stage file in bytes
pub const STAGE_TEXT_LEN: usize = GRID_ROWS * (GRID_COLUMNS + 1);

/// Where stage layouts come from
pub trait StageSource {
    /// Symbol rows for stage `stage`, top row first
    fn load_stage_definition(&self, stage: u32) -> Result<Vec<Vec<char>>, StageError>;
}

/// Split and validate stage text
pub fn parse_stage_text(text: &str) -> Result<Vec<Vec<char>>, StageError> {
    if text.len() != STAGE_TEXT_LEN {
        return Err(StageError::InvalidFormat(format!(
            "expected {STAGE_TEXT_LEN} bytes, found {}",
            text.len()
        )));
    }
    let mut rows = Vec::with_capacity(GRID_ROWS);
    for (row, line) in text.split_terminator('\n').enumerate() {
        let symbols: Vec<char> = line.chars().collect();
        if symbols.len() != GRID_COLUMNS {
            return Err(StageError::InvalidFormat(format!(
                "line {row} has {} symbols, expected {GRID_COLUMNS}",
                symbols.len()
            )));
        }
        if let Some((column, &symbol)) = symbols
            .iter()
            .enumerate()
            .find(|(_, s)| TileKind::from_symbol(**s).is_none())
        {
            return Err(StageError::UnknownSymbol { symbol, row, column });
        }
        rows.push(symbols);
    }
    if rows.len() != GRID_ROWS || !text.ends_with('\n') {
        return Err(StageError::InvalidFormat(format!(
            "expected {GRID_ROWS} newline-terminated lines"
        )));
    }
    Ok(rows)
}

/// Stages held in memory, keyed by number
#[derive(Debug, Clone, Default)]
pub struct MemoryStages {
    stages: BTreeMap<u32, Vec<Vec<char>>>,
}

impl MemoryStages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, stage: u32, rows: Vec<Vec<char>>) {
        self.stages.insert(stage, rows);
    }

    /// Parse and store stage text
    pub fn insert_text(&mut self, stage: u32, text: &str) -> Result<(), StageError> {
        let rows = parse_stage_text(text)?;
        self.insert(stage, rows);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl StageSource for MemoryStages {
    fn load_stage_definition(&self, stage: u32) -> Result<Vec<Vec<char>>, StageError> {
        self.stages.get(&stage).cloned().ok_or(StageError::NotFound(stage))
    }
}

/// Stages read from `<dir>/<n>.stage`
#[derive(Debug, Clone)]
pub struct DirStages {
    dir: PathBuf,
}

impl DirStages {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, stage: u32) -> PathBuf {
        self.dir.join(format!("{stage}.stage"))
    }
}

impl StageSource for DirStages {
    fn load_stage_definition(&self, stage: u32) -> Result<Vec<Vec<char>>, StageError> {
        let path = self.path_for(stage);
        let text = std::fs::read_to_string(&path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => StageError::NotFound(stage),
            _ => StageError::Io { stage, source },
        })?;
        log::debug!("Read stage {stage} from {}", path.display());
        parse_stage_text(&text)
    }
}
