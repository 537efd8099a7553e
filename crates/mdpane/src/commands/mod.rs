//! CLI command implementations.

pub(crate) mod bridge;
pub(crate) mod open;
pub(crate) mod preview;
pub(crate) mod recent;

pub(crate) use bridge::BridgeArgs;
pub(crate) use open::OpenArgs;
pub(crate) use preview::PreviewArgs;
pub(crate) use recent::RecentArgs;
