use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::context::CliContext;
use crate::cli::output::OutputFormat;
use crate::scenario::{storefront_catalog, RunFilter};

#[derive(Args, Clone, Debug)]
pub struct ListArgs {
    /// Only list scenarios carrying this tag (repeatable)
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CatalogEntry {
    pub name: String,
    pub feature: String,
    pub tags: Vec<String>,
    /// Whether `run` with the same tags would execute it
    pub selected: bool,
}

pub async fn cmd_list(args: ListArgs, ctx: &CliContext, output: OutputFormat) -> Result<()> {
    let filter = RunFilter::from_config(&ctx.config().runner).include(&args.tags);
    let entries: Vec<CatalogEntry> = storefront_catalog()
        .iter()
        .filter(|scenario| args.tags.is_empty() || args.tags.iter().any(|t| scenario.has_tag(t)))
        .map(|scenario| CatalogEntry {
            name: scenario.name.clone(),
            feature: scenario.feature.clone(),
            tags: scenario.tags.clone(),
            selected: filter.matches(scenario),
        })
        .collect();

    if output.print_structured(&entries)? {
        return Ok(());
    }
    for entry in &entries {
        let tags = if entry.tags.is_empty() {
            String::new()
        } else {
            format!(
                " [{}]",
                entry
                    .tags
                    .iter()
                    .map(|t| format!("@{}", t))
                    .collect::<Vec<_>>()
                    .join(" ")
            )
        };
        let mark = if entry.selected { ' ' } else { '-' };
        println!("{} {:<16} {}{}", mark, entry.feature, entry.name, tags);
    }
    let selected = entries.iter().filter(|e| e.selected).count();
    println!("{} scenario(s), {} selected", entries.len(), selected);
    Ok(())
}
