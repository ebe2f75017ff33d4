pub mod classify;
pub mod expand;
pub mod report;
pub mod storage;
pub mod totals;
pub mod usage;

pub use crate::domain::model::{
    Image, Instance, InstanceType, LimitKey, LimitTotals, LimitValue, Profile, ProjectInfo,
    UsageReport, Volume,
};
pub use crate::domain::ports::{ConfigExpander, LimitTotaller, Printer, ProjectStore};
pub use crate::utils::error::Result;
