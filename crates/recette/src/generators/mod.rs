//! Derived-content generators.
//!
//! Pure functions that turn parts of a record into markup or configuration:
//!
//! - [`render_badges`]: colored badges for multi-select fields, in a fixed
//!   domain order
//! - [`ChartSpec::config`]: `{labels, values}` chart configuration for each of
//!   the [`CHARTS`]

mod badges;
mod charts;

pub use badges::{
    render_badges, selected_values, BadgeDomain, BadgeStyle, DEFAULT_BADGE_STYLE,
};
pub use charts::{ChartConfig, ChartSpec, CHARTS};
