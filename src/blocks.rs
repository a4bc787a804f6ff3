use crate::calendar::{GridCell, Semester};
use crate::plan::PlanError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

pub type BlockId = u32;

/// Why a week cannot be used for teaching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Holiday,
    Religious,
    Exam,
    Activity,
    Preparation,
}

impl BlockType {
    pub const ALL: [BlockType; 5] = [
        BlockType::Holiday,
        BlockType::Religious,
        BlockType::Exam,
        BlockType::Activity,
        BlockType::Preparation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Holiday => "holiday",
            BlockType::Religious => "religious",
            BlockType::Exam => "exam",
            BlockType::Activity => "activity",
            BlockType::Preparation => "preparation",
        }
    }

    /// Display color stamped onto every block of this type.
    pub fn color(&self) -> &'static str {
        match self {
            BlockType::Holiday => "#ef4444",
            BlockType::Religious => "#22c55e",
            BlockType::Exam => "#f59e0b",
            BlockType::Activity => "#3b82f6",
            BlockType::Preparation => "#8b5cf6",
        }
    }
}

impl FromStr for BlockType {
    type Err = PlanError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "holiday" => Ok(BlockType::Holiday),
            "religious" => Ok(BlockType::Religious),
            "exam" => Ok(BlockType::Exam),
            "activity" => Ok(BlockType::Activity),
            "preparation" => Ok(BlockType::Preparation),
            _ => Err(PlanError::Validation(format!("unknown block type '{value}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedWeek {
    pub id: BlockId,
    pub period: u8,
    pub slot: u8,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub label: String,
    pub color: String,
}

impl BlockedWeek {
    pub fn cell(&self) -> GridCell {
        GridCell::new(self.period, self.slot)
    }

    /// Two blocks render as one span only when type and label match exactly.
    pub fn merges_with(&self, other: &BlockedWeek) -> bool {
        self.block_type == other.block_type && self.label == other.label
    }
}

/// The unusable cells of one semester plan, at most one per cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockRegistry {
    blocks: Vec<BlockedWeek>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps stored blocks as-is; run `validate_plan` before trusting them.
    pub fn from_blocks(blocks: Vec<BlockedWeek>) -> Self {
        Self { blocks }
    }

    /// Ids are one past the highest id currently held, so removing the
    /// newest block frees its id again. [`BlockRegistry::add_block_after`]
    /// takes a high-water mark to avoid that.
    pub fn add_block(
        &mut self,
        semester: &Semester,
        cell: GridCell,
        block_type: BlockType,
        label: &str,
    ) -> Result<BlockId, PlanError> {
        self.add_block_after(0, semester, cell, block_type, label)
    }

    /// Adds a block whose id is also greater than `last_issued`.
    pub fn add_block_after(
        &mut self,
        last_issued: BlockId,
        semester: &Semester,
        cell: GridCell,
        block_type: BlockType,
        label: &str,
    ) -> Result<BlockId, PlanError> {
        if self.is_blocked(cell) {
            return Err(PlanError::DuplicateBlock {
                period: cell.period,
                slot: cell.slot,
            });
        }
        let label = label.trim();
        if label.is_empty() {
            return Err(PlanError::Validation("block label is required".into()));
        }
        if !semester.contains(cell) {
            return Err(PlanError::Validation(format!(
                "cell {cell} is outside the semester grid"
            )));
        }

        let id = self
            .blocks
            .iter()
            .map(|block| block.id)
            .max()
            .unwrap_or(0)
            .max(last_issued)
            .checked_add(1)
            .ok_or_else(|| PlanError::Validation("no block ids left".into()))?;
        self.blocks.push(BlockedWeek {
            id,
            period: cell.period,
            slot: cell.slot,
            block_type,
            label: label.to_string(),
            color: block_type.color().to_string(),
        });
        debug!(block_id = id, %cell, block_type = block_type.as_str(), "added blocked week");
        Ok(id)
    }

    /// Removes by id. Unknown ids are a no-op reported as `false`.
    pub fn remove_block(&mut self, block_id: BlockId) -> bool {
        let before = self.blocks.len();
        self.blocks.retain(|block| block.id != block_id);
        self.blocks.len() != before
    }

    pub fn is_blocked(&self, cell: GridCell) -> bool {
        self.block_at(cell).is_some()
    }

    pub fn block_at(&self, cell: GridCell) -> Option<&BlockedWeek> {
        self.blocks.iter().find(|block| block.cell() == cell)
    }

    pub fn get(&self, block_id: BlockId) -> Option<&BlockedWeek> {
        self.blocks.iter().find(|block| block.id == block_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockedWeek> {
        self.blocks.iter()
    }

    pub fn as_slice(&self) -> &[BlockedWeek] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
