//! Export core modules shared across the CLI and tests.

pub mod pdf_core;

pub use pdf_core::{plan_page, ImagePlacement, PagePlan, WatermarkPlacement};
