//! Display boundary port trait.

use crate::domain::error::PesowatchError;
use crate::domain::projection::{GoalOutcome, ProjectionRow, RankedInstrument};
use crate::domain::table::ConsolidatedTable;

/// Port receiving computed tables for presentation.
pub trait ReportPort {
    fn write_table(&self, name: &str, table: &ConsolidatedTable) -> Result<(), PesowatchError>;

    fn write_projection(&self, name: &str, rows: &[ProjectionRow]) -> Result<(), PesowatchError>;

    fn write_ranking(&self, ranking: &[RankedInstrument]) -> Result<(), PesowatchError>;

    /// Default implementation: falls back to `write_projection` with the goal trajectory.
    fn write_goal(&self, outcome: &GoalOutcome) -> Result<(), PesowatchError> {
        self.write_projection("goal", &outcome.projection)
    }
}
