// ABOUTME: Integration tests for the time-boxed draft store over the in-memory backend
// ABOUTME: Validates save/get round trips, update timestamps, deletion and expiry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use anyhow::Result;
use common::{memory_store, memory_store_with_ttl};
use recipe_forge::errors::ErrorCode;
use recipe_forge::llm::prompts::DietaryConstraints;
use recipe_forge::recipes::{Macros, RecipeDraft, RecipeFields};
use std::time::Duration;
use uuid::Uuid;

fn sample_draft() -> RecipeDraft {
    let fields = RecipeFields {
        name: "Shakshuka".to_owned(),
        description: "Eggs poached in spiced tomato sauce".to_owned(),
        category: "Breakfast".to_owned(),
        cuisine: "North African".to_owned(),
        ingredients: vec!["6 eggs".to_owned(), "1 can tomatoes".to_owned()],
        instructions: vec!["Simmer sauce".to_owned(), "Poach eggs".to_owned()],
        prep_time: "10 minutes".to_owned(),
        cook_time: "20 minutes".to_owned(),
        servings: "3".to_owned(),
        difficulty: "Easy".to_owned(),
        macros: Macros {
            calories: 600.0,
            protein: 36.0,
            carbs: 30.0,
            fat: 36.0,
        },
    };
    RecipeDraft::from_fields(
        fields,
        Uuid::new_v4(),
        &DietaryConstraints::new(vec!["vegetarian".to_owned()], Vec::new()),
    )
}

#[tokio::test]
async fn test_save_assigns_id_and_round_trips() -> Result<()> {
    let store = memory_store().await;
    let draft = sample_draft();

    let saved = store.save(draft.clone()).await?;
    assert!(!saved.id.is_empty());
    assert_eq!(saved.created_at, saved.updated_at);

    let fetched = store.get(&saved.id).await?;
    assert_eq!(fetched, saved);
    assert_eq!(fetched.name, draft.name);
    assert_eq!(fetched.ingredients, draft.ingredients);
    assert_eq!(fetched.instructions, draft.instructions);
    assert_eq!(fetched.dietary_preferences, vec!["vegetarian"]);
    Ok(())
}

#[tokio::test]
async fn test_save_twice_yields_distinct_ids() -> Result<()> {
    let store = memory_store().await;
    let first = store.save(sample_draft()).await?;
    let second = store.save(first.clone()).await?;
    assert_ne!(first.id, second.id);
    assert!(store.exists(&first.id).await?);
    Ok(())
}

#[tokio::test]
async fn test_get_missing_draft_is_not_found() -> Result<()> {
    let store = memory_store().await;
    let error = store.get("does-not-exist").await.unwrap_err();
    assert_eq!(error.code, ErrorCode::ResourceNotFound);
    assert_eq!(error.resource_id.as_deref(), Some("does-not-exist"));
    Ok(())
}

#[tokio::test]
async fn test_update_moves_updated_at_forward() -> Result<()> {
    let store = memory_store().await;
    let saved = store.save(sample_draft()).await?;

    let mut changed = saved.clone();
    changed.difficulty = "Medium".to_owned();
    let updated = store.update(changed).await?;

    assert!(updated.updated_at > saved.updated_at);
    assert!(updated.updated_at > saved.created_at);
    assert_eq!(updated.created_at, saved.created_at);

    let again = store.update(updated.clone()).await?;
    assert!(again.updated_at > updated.updated_at);

    let fetched = store.get(&saved.id).await?;
    assert_eq!(fetched.difficulty, "Medium");
    assert_eq!(fetched.updated_at, again.updated_at);
    Ok(())
}

#[tokio::test]
async fn test_update_requires_an_id() -> Result<()> {
    let store = memory_store().await;
    let error = store.update(sample_draft()).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::InvalidInput);
    Ok(())
}

#[tokio::test]
async fn test_update_recreates_a_deleted_draft() -> Result<()> {
    let store = memory_store().await;
    let saved = store.save(sample_draft()).await?;
    store.delete(&saved.id).await?;
    assert!(!store.exists(&saved.id).await?);

    store.update(saved.clone()).await?;
    assert!(store.exists(&saved.id).await?);
    Ok(())
}

#[tokio::test]
async fn test_delete_is_idempotent() -> Result<()> {
    let store = memory_store().await;
    let saved = store.save(sample_draft()).await?;

    store.delete(&saved.id).await?;
    store.delete(&saved.id).await?;

    let error = store.get(&saved.id).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::ResourceNotFound);
    Ok(())
}

#[tokio::test]
async fn test_remaining_ttl_is_within_window() -> Result<()> {
    let store = memory_store().await;
    let saved = store.save(sample_draft()).await?;

    let remaining = store.remaining_ttl(&saved.id).await?.unwrap();
    assert!(remaining <= store.ttl());
    assert!(remaining > store.ttl() - Duration::from_secs(5));
    assert!(store.remaining_ttl("missing").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_drafts_expire() -> Result<()> {
    let store = memory_store_with_ttl(Duration::from_secs(1)).await;
    let saved = store.save(sample_draft()).await?;
    assert!(store.exists(&saved.id).await?);

    tokio::time::sleep(Duration::from_millis(1_100)).await;

    let error = store.get(&saved.id).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::ResourceNotFound);
    Ok(())
}

#[tokio::test]
async fn test_empty_id_is_rejected() -> Result<()> {
    let store = memory_store().await;
    assert_eq!(store.get("").await.unwrap_err().code, ErrorCode::InvalidInput);
    assert_eq!(store.delete(" ").await.unwrap_err().code, ErrorCode::InvalidInput);
    Ok(())
}

#[tokio::test]
async fn test_health_check_and_backend_name() -> Result<()> {
    let store = memory_store().await;
    store.health_check().await?;
    assert_eq!(store.backend_name(), "memory");
    Ok(())
}
