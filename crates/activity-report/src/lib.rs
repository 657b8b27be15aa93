//! PDF rendering of chat activity.

pub mod canvas;
pub mod document;
pub mod pages;
pub mod palette;
pub mod renderer;
pub mod series;

pub use activity_core as core;
pub use renderer::{RenderedReport, ReportPage, ReportRenderer};
