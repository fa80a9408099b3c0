//! Reader inspection command.

use colored::Colorize;

use crate::commands::open_state_store;
use crate::config::Config;
use crate::error::Result;
use crate::reader::{ReaderHandoff, ReaderPaperState};

/// Show a paper saved for the reader
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
/// * `id` - Reader state id; the most recently saved paper when `None`
pub async fn show_paper(config: Config, id: Option<String>) -> Result<()> {
    let store = open_state_store(&config)?;
    let handoff = ReaderHandoff::new(store);

    match handoff.load(id.as_deref()) {
        Some(paper) => {
            print_paper(&paper);
            Ok(())
        }
        None => {
            match id {
                Some(id) => println!("No saved paper with id {}", id),
                None => println!("No saved paper found"),
            }
            Ok(())
        }
    }
}

fn print_paper(paper: &ReaderPaperState) {
    println!("\n{}", paper.title.bold());

    if !paper.id.is_empty() {
        println!("arXiv:     {}", paper.id);
    }
    if !paper.published.is_empty() {
        println!("Published: {}", paper.published);
    }
    if !paper.authors.is_empty() {
        println!("Authors:   {}", paper.authors.join(", "));
    }
    if !paper.categories.is_empty() {
        println!("Topics:    {}", paper.categories.join(", "));
    }
    if !paper.pdf.is_empty() {
        println!("PDF:       {}", paper.pdf);
    }
    if !paper.code.is_empty() {
        println!("Code:      {}", paper.code);
    }
    if !paper.method.is_empty() {
        println!("\nMethod\n{}", paper.method);
    }
    if !paper.limits.is_empty() {
        println!("\nLimitations\n{}", paper.limits);
    }
    println!();
}
