//! PR orchestration
//!
//! Derives everything a stack branch's PR needs (base, title, position
//! label, overview body) and creates it at most once.

mod create;
mod labels;
mod title;
mod visualization;

pub use create::{CreateOrGet, CreatePrRequest, create_or_get, resolve_parent};
pub use labels::{
    STACK_LABEL_COLOR, compute_position, ensure_stack_label, position_label, refresh_stack_labels,
};
pub use title::{derive_title, generate_title_from_branch_name};
pub use visualization::{
    PrSnapshot, PrSummary, collect_pr_snapshot, format_stack_visualization,
    render_stack_visualization,
};
