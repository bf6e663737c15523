//! PR command - create or show the PR for a stack branch

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check, hyperlink};
use anstream::println;
use stackboi::error::Result;
use stackboi::pr::{CreateOrGet, CreatePrRequest, create_or_get};
use std::path::Path;

/// Options for the pr command
#[derive(Debug, Clone, Default)]
pub struct PrOptions {
    /// Branch to open the PR from
    pub branch: Option<String>,
    /// Create as draft
    pub draft: bool,
    /// Open in the browser afterwards
    pub open: bool,
}

/// Run the pr command
pub async fn run_pr(path: &Path, options: PrOptions) -> Result<()> {
    let ctx = CommandContext::new(path).await?;

    let request = CreatePrRequest {
        branch: options.branch,
        draft: options.draft,
        open: options.open,
    };
    let outcome = create_or_get(&ctx.session(), &request).await?;
    let pr = outcome.pr();
    let link = hyperlink(&format!("#{}", pr.number), &pr.html_url);

    match &outcome {
        CreateOrGet::Existing(_) => {
            println!(
                "PR {} already exists for {} ({})",
                link.accent(),
                pr.head_ref.accent(),
                pr.status.to_string().muted()
            );
        }
        CreateOrGet::Created(_) => {
            println!(
                "{} Created PR {} {} {} {}",
                check(),
                link.accent(),
                pr.head_ref.accent(),
                "\u{2192}".muted(),
                pr.base_ref.accent()
            );
            println!("  {}", pr.title.emphasis());
        }
    }
    println!("  {}", pr.html_url.muted());

    Ok(())
}
