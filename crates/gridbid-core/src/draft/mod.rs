// Draft model: positions, picks, roster requirements, live snapshot.

pub mod context;
pub mod pick;
pub mod roster;

pub use context::{DraftContext, Team};
pub use pick::{DraftPick, DraftedPlayer, Position, DRAFTABLE_POSITIONS};
pub use roster::{FlexRequirement, PositionLimits, RosterRequirements};
