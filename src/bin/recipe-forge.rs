// ABOUTME: Command-line driver for the recipe draft pipeline
// ABOUTME: Generates, modifies, enriches, shows and deletes drafts, printing them as JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Drafts only outlive a single invocation when `REDIS_URL` selects the Redis
//! backend; with the in-memory backend use `generate --nutrition` to run the
//! whole pipeline in one process.
//!
//! Usage:
//! ```bash
//! # Generate a vegan draft and estimate its nutrition
//! recipe-forge generate "chickpea curry" --diet vegan --allergen peanuts --nutrition
//!
//! # Ask for a variation of an existing draft (saved as a new draft)
//! recipe-forge modify 3f2a... "make it spicier"
//!
//! # Inspect or remove a draft
//! recipe-forge show 3f2a...
//! recipe-forge delete 3f2a...
//! ```

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use recipe_forge::{
    cache::Cache,
    config::ForgeConfig,
    drafts::DraftStore,
    generation::{CancellationToken, GenerationMode},
    llm::{prompts::DietaryConstraints, OpenAiCompatibleProvider},
    logging::LoggingConfig,
    recipes::RecipeDraft,
    services::{DraftRequest, RecipeDraftService},
};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "recipe-forge",
    about = "Recipe draft generation pipeline",
    long_about = "Generate recipe drafts from free-text queries, back-fill nutrition and finalize them. Configuration is read from RECIPE_* and REDIS_* environment variables."
)]
struct ForgeArgs {
    #[command(subcommand)]
    command: ForgeCommand,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum ForgeCommand {
    /// Generate a new draft from a query
    Generate {
        /// What to cook, e.g. "vegan chickpea curry"
        query: String,

        /// Dietary preference tag (repeatable)
        #[arg(long = "diet")]
        dietary_preferences: Vec<String>,

        /// Allergen to avoid (repeatable)
        #[arg(long = "allergen")]
        allergens: Vec<String>,

        /// Owning user ID (random when omitted)
        #[arg(long)]
        user_id: Option<Uuid>,

        /// Shorter recipe with a tighter deadline
        #[arg(long)]
        quick: bool,

        /// Estimate nutrition right after generation
        #[arg(long)]
        nutrition: bool,
    },

    /// Save a modified copy of an existing draft
    Modify {
        /// Draft to start from
        draft_id: String,

        /// Requested change, e.g. "make it gluten free"
        request: String,
    },

    /// Estimate nutrition for a draft
    Nutrition {
        /// Draft ID
        draft_id: String,
    },

    /// Add missing embedding and image to a draft
    Finalize {
        /// Draft ID
        draft_id: String,
    },

    /// Print a draft
    Show {
        /// Draft ID
        draft_id: String,
    },

    /// Delete a draft
    Delete {
        /// Draft ID
        draft_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = ForgeArgs::parse();

    let mut logging = LoggingConfig::from_env();
    if args.verbose {
        "debug".clone_into(&mut logging.level);
    }
    logging.init()?;

    let config = ForgeConfig::load()?;
    let store = DraftStore::new(Cache::new(config.cache.clone()).await?, &config.drafts);
    let provider = Arc::new(OpenAiCompatibleProvider::new(config.llm.clone())?);
    let service = RecipeDraftService::from_provider(provider, config.generation, store);

    let cancel = CancellationToken::new();
    spawn_ctrl_c_handler(cancel.clone());

    match args.command {
        ForgeCommand::Generate {
            query,
            dietary_preferences,
            allergens,
            user_id,
            quick,
            nutrition,
        } => {
            let mode = if quick {
                GenerationMode::Quick
            } else {
                GenerationMode::Full
            };
            let request = DraftRequest::new(query, user_id.unwrap_or_else(Uuid::new_v4))
                .with_constraints(DietaryConstraints::new(dietary_preferences, allergens))
                .with_mode(mode);

            let mut draft = service.generate_draft(&request, &cancel).await?;
            if nutrition {
                draft = service.calculate_nutrition(&draft.id, &cancel).await?;
            }
            print_draft(&draft)?;
        }
        ForgeCommand::Modify { draft_id, request } => {
            let draft = service.modify_draft(&draft_id, &request, &cancel).await?;
            print_draft(&draft)?;
        }
        ForgeCommand::Nutrition { draft_id } => {
            let draft = service.calculate_nutrition(&draft_id, &cancel).await?;
            print_draft(&draft)?;
        }
        ForgeCommand::Finalize { draft_id } => {
            let outcome = service.finalize(&draft_id).await?;
            info!(
                draft_id = %outcome.draft.id,
                embedding_added = outcome.embedding_added,
                image_added = outcome.image_added,
                "Finalize complete"
            );
            print_draft(&outcome.draft)?;
        }
        ForgeCommand::Show { draft_id } => {
            let draft = service.get_draft(&draft_id).await?;
            print_draft(&draft)?;
        }
        ForgeCommand::Delete { draft_id } => {
            service.delete_draft(&draft_id).await?;
            println!("deleted {draft_id}");
        }
    }

    Ok(())
}

fn spawn_ctrl_c_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling in-flight generation");
            cancel.cancel();
        }
    });
}

fn print_draft(draft: &RecipeDraft) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(draft)?);
    Ok(())
}
