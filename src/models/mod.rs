mod event;
mod report;

pub use event::{
    LinkClickPayload, LinkClickRow, NewLinkClick, NewPageView, PageViewPayload, PageViewRow,
};
pub use report::{
    BlockStat, CampaignCount, DayCount, DimensionCount, OverviewCounts, ProfileViewCount,
};
