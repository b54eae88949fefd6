//! Column ordering within a board.
//!
//! Column numbers of a board are dense and unique (`0..N`) between
//! operations. Every reorder is expressed as a [`ColumnPlan`]: an ordered
//! list of single-row writes. Stores receive a [`ColumnChange`] and plan it
//! against the board's columns inside the same transaction that applies
//! it, so a plan never outlives the rows it was computed from. Planning
//! itself never touches storage.
//!
//! Moving a column onto an occupied number swaps the two columns. The
//! displaced column is first parked at [`PARKING_NUMBER`] so that the
//! `(board_id, column_number)` unique key holds after every single write.

use thiserror::Error;

use crate::db::models::Column;

/// Temporary slot for the displaced column during a swap. Numbers at rest
/// are never negative, so it cannot collide.
pub const PARKING_NUMBER: i32 = -1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnStep {
    Rename { column_id: i32, name: String },
    Renumber { column_id: i32, number: i32 },
    Remove { column_id: i32 },
}

impl ColumnStep {
    pub fn column_id(&self) -> i32 {
        match self {
            ColumnStep::Rename { column_id, .. }
            | ColumnStep::Renumber { column_id, .. }
            | ColumnStep::Remove { column_id } => *column_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPlan {
    pub board_id: i32,
    pub steps: Vec<ColumnStep>,
}

impl ColumnPlan {
    pub fn new(board_id: i32) -> Self {
        ColumnPlan {
            board_id,
            steps: Vec::new(),
        }
    }

    /// Ids of the columns whose number this plan changes, in order of first
    /// appearance.
    #[cfg(test)]
    pub fn renumbered(&self) -> Vec<i32> {
        let mut ids = Vec::new();
        for step in &self.steps {
            if let ColumnStep::Renumber { column_id, .. } = step {
                if !ids.contains(column_id) {
                    ids.push(*column_id);
                }
            }
        }
        ids
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderingError {
    #[error("column {0} is not part of this board")]
    UnknownColumn(i32),
    #[error("columnNumber must not be less than 0")]
    Negative,
    #[error("columnNumber must not be greater than {max}")]
    OutOfRange { max: i32 },
}

/// A requested column edit, planned by the store against the columns it
/// holds locked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnChange {
    Move {
        column_id: i32,
        name: Option<String>,
        number: Option<i32>,
    },
    Delete {
        column_id: i32,
    },
}

impl ColumnChange {
    pub fn plan(self, board_id: i32, columns: &[Column]) -> Result<ColumnPlan, OrderingError> {
        match self {
            ColumnChange::Move {
                column_id,
                name,
                number,
            } => plan_move(board_id, columns, column_id, name, number),
            ColumnChange::Delete { column_id } => plan_delete(board_id, columns, column_id),
        }
    }
}

/// Number for a column appended to the board.
pub fn next_number(columns: &[Column]) -> i32 {
    columns
        .iter()
        .map(|column| column.column_number)
        .max()
        .map_or(0, |max| max + 1)
}

/// Plans a rename and/or move of `column_id` to `target`.
pub fn plan_move(
    board_id: i32,
    columns: &[Column],
    column_id: i32,
    name: Option<String>,
    target: Option<i32>,
) -> Result<ColumnPlan, OrderingError> {
    let mover = columns
        .iter()
        .find(|column| column.id == column_id)
        .ok_or(OrderingError::UnknownColumn(column_id))?;

    let mut plan = ColumnPlan::new(board_id);
    if let Some(name) = name {
        plan.steps.push(ColumnStep::Rename { column_id, name });
    }

    let target = match target {
        Some(target) if target != mover.column_number => target,
        _ => return Ok(plan),
    };
    if target < 0 {
        return Err(OrderingError::Negative);
    }
    let max = columns
        .iter()
        .map(|column| column.column_number)
        .max()
        .unwrap_or(0);
    if target > max {
        return Err(OrderingError::OutOfRange { max });
    }

    match columns.iter().find(|column| column.column_number == target) {
        Some(displaced) => {
            plan.steps.push(ColumnStep::Renumber {
                column_id: displaced.id,
                number: PARKING_NUMBER,
            });
            plan.steps.push(ColumnStep::Renumber {
                column_id: mover.id,
                number: target,
            });
            plan.steps.push(ColumnStep::Renumber {
                column_id: displaced.id,
                number: mover.column_number,
            });
        }
        None => plan.steps.push(ColumnStep::Renumber {
            column_id: mover.id,
            number: target,
        }),
    }
    Ok(plan)
}

/// Plans removal of `column_id`, closing the gap it leaves behind.
pub fn plan_delete(
    board_id: i32,
    columns: &[Column],
    column_id: i32,
) -> Result<ColumnPlan, OrderingError> {
    let deleted = columns
        .iter()
        .find(|column| column.id == column_id)
        .ok_or(OrderingError::UnknownColumn(column_id))?;

    let mut followers: Vec<&Column> = columns
        .iter()
        .filter(|column| column.id != column_id && column.column_number >= deleted.column_number)
        .collect();
    // ascending, so each decrement lands on a slot that was just vacated
    followers.sort_by_key(|column| column.column_number);

    let mut plan = ColumnPlan::new(board_id);
    plan.steps.push(ColumnStep::Remove { column_id });
    for column in followers {
        plan.steps.push(ColumnStep::Renumber {
            column_id: column.id,
            number: column.column_number - 1,
        });
    }
    Ok(plan)
}

/// Applies a plan to a snapshot of columns.
#[cfg(test)]
pub(crate) fn preview(columns: &[Column], plan: &ColumnPlan) -> Result<Vec<Column>, OrderingError> {
    let mut result = columns.to_vec();
    for step in &plan.steps {
        match step {
            ColumnStep::Rename { column_id, name } => {
                let column = result
                    .iter_mut()
                    .find(|column| column.id == *column_id)
                    .ok_or(OrderingError::UnknownColumn(*column_id))?;
                column.name = name.clone();
            }
            ColumnStep::Renumber { column_id, number } => {
                let column = result
                    .iter_mut()
                    .find(|column| column.id == *column_id)
                    .ok_or(OrderingError::UnknownColumn(*column_id))?;
                column.column_number = *number;
            }
            ColumnStep::Remove { column_id } => {
                let before = result.len();
                result.retain(|column| column.id != *column_id);
                if result.len() == before {
                    return Err(OrderingError::UnknownColumn(*column_id));
                }
            }
        }
    }
    result.sort_by_key(|column| column.column_number);
    Ok(result)
}

/// True when numbers are exactly `0..len` with no duplicates.
#[cfg(test)]
pub(crate) fn is_dense(columns: &[Column]) -> bool {
    let mut numbers: Vec<i32> = columns.iter().map(|column| column.column_number).collect();
    numbers.sort_unstable();
    numbers
        .iter()
        .enumerate()
        .all(|(index, number)| *number == index as i32)
}
