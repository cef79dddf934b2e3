// ABOUTME: End-to-end tests of the draft pipeline through the recipe draft service
// ABOUTME: Generation, nutrition back-fill, modification, finalization and deletion in sequence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use anyhow::Result;
use common::{
    init_test_logging, memory_store, test_generation_config, FakeEmbeddings, FakeImages,
    ScriptedProvider, Step, CURRY_RESPONSE, NUTRITION_RESPONSE,
};
use recipe_forge::errors::ErrorCode;
use recipe_forge::finalize::Finalizer;
use recipe_forge::generation::{CancellationToken, GenerationClient, GenerationMode};
use recipe_forge::llm::prompts::DietaryConstraints;
use recipe_forge::services::{DraftRequest, RecipeDraftService};
use uuid::Uuid;

const NON_VEGAN_TOKENS: [&str; 9] = [
    "chicken", "beef", "pork", "fish", "egg", "butter", "cheese", "honey", "yogurt",
];

const SPICY_RESPONSE: &str = "\
NAME: Fiery Chickpea Curry
INGREDIENTS: 2 cans chickpeas | 1 can coconut milk | 3 red chillies
INSTRUCTIONS: Fry the chillies | Add everything else | Simmer
SERVINGS: 4";

fn vegan_request() -> DraftRequest {
    DraftRequest::new("vegan chickpea curry", Uuid::new_v4())
        .with_constraints(DietaryConstraints::new(vec!["vegan".to_owned()], Vec::new()))
}

#[tokio::test]
async fn test_vegan_curry_pipeline() -> Result<()> {
    init_test_logging();
    let store = memory_store().await;
    let provider = ScriptedProvider::new(vec![
        Step::reply(CURRY_RESPONSE),
        Step::reply(NUTRITION_RESPONSE),
    ]);
    let service =
        RecipeDraftService::from_provider(provider.clone(), test_generation_config(), store.clone());
    let cancel = CancellationToken::new();

    // Generation succeeds on the first attempt with structured text
    let draft = service.generate_draft(&vegan_request(), &cancel).await?;
    assert_eq!(provider.calls(), 1);
    assert_eq!(draft.name, "Vegan Chickpea Curry");
    assert_eq!(draft.dietary_preferences, vec!["vegan"]);
    for ingredient in &draft.ingredients {
        let lowered = ingredient.to_lowercase();
        for token in NON_VEGAN_TOKENS {
            assert!(!lowered.contains(token), "{ingredient} contains {token}");
        }
    }
    let user_prompt = &provider.requests()[0].messages[1].content;
    assert!(user_prompt.contains("Dietary constraints"));
    assert!(user_prompt.contains("vegan"));

    // Narrow the ingredient list, then back-fill nutrition for four servings
    let mut narrowed = draft.clone();
    narrowed.ingredients = vec!["chickpeas".to_owned(), "coconut milk".to_owned()];
    narrowed.servings = "4".to_owned();
    store.update(narrowed).await?;

    let with_macros = service.calculate_nutrition(&draft.id, &cancel).await?;
    let nutrition_prompt = &provider.requests()[1].messages[1].content;
    assert!(nutrition_prompt.contains("- chickpeas\n- coconut milk"));

    let round = |total: f64| (total / 4.0 * 10.0).round() / 10.0;
    assert!((with_macros.calories_per_serving - round(with_macros.calories)).abs() < f64::EPSILON);
    assert!((with_macros.protein_per_serving - round(with_macros.protein)).abs() < f64::EPSILON);
    assert!((with_macros.carbs_per_serving - round(with_macros.carbs)).abs() < f64::EPSILON);
    assert!((with_macros.fat_per_serving - round(with_macros.fat)).abs() < f64::EPSILON);

    assert_eq!(service.get_draft(&draft.id).await?, with_macros);
    Ok(())
}

#[tokio::test]
async fn test_modify_creates_a_new_draft() -> Result<()> {
    init_test_logging();
    let store = memory_store().await;
    let provider = ScriptedProvider::new(vec![
        Step::reply(CURRY_RESPONSE),
        Step::reply(SPICY_RESPONSE),
    ]);
    let service =
        RecipeDraftService::from_provider(provider.clone(), test_generation_config(), store);
    let cancel = CancellationToken::new();

    let original = service.generate_draft(&vegan_request(), &cancel).await?;
    let modified = service
        .modify_draft(&original.id, "make it much spicier", &cancel)
        .await?;

    assert_ne!(modified.id, original.id);
    assert_eq!(modified.name, "Fiery Chickpea Curry");
    assert_eq!(modified.user_id, original.user_id);
    assert_eq!(modified.dietary_preferences, original.dietary_preferences);
    assert_eq!(service.get_draft(&original.id).await?, original);

    let prompt = &provider.requests()[1].messages[1].content;
    assert!(prompt.starts_with("Modify this recipe:\nNAME: Vegan Chickpea Curry"));
    assert!(prompt.contains("Modification request: make it much spicier"));
    assert!(prompt.contains("vegan"));
    Ok(())
}

#[tokio::test]
async fn test_finalize_and_delete_through_service() -> Result<()> {
    let store = memory_store().await;
    let provider = ScriptedProvider::new(vec![Step::reply(CURRY_RESPONSE)]);
    let finalizer = Finalizer::new(store.clone())
        .with_embeddings(FakeEmbeddings::working())
        .with_images(FakeImages::working());
    let service = RecipeDraftService::new(
        GenerationClient::new(provider, test_generation_config()),
        store,
        finalizer,
    );
    let cancel = CancellationToken::new();

    let draft = service
        .generate_draft(&vegan_request().with_mode(GenerationMode::Quick), &cancel)
        .await?;
    let outcome = service.finalize(&draft.id).await?;
    assert!(outcome.embedding_added && outcome.image_added);

    // A second pass has nothing left to add
    let again = service.finalize(&draft.id).await?;
    assert!(!again.changed());

    service.delete_draft(&draft.id).await?;
    let error = service.get_draft(&draft.id).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::ResourceNotFound);
    Ok(())
}

#[tokio::test]
async fn test_exhausted_generation_reports_attempts() -> Result<()> {
    let store = memory_store().await;
    let provider = ScriptedProvider::new(vec![
        Step::reply("Sorry, no."),
        Step::reply("Still no."),
        Step::reply("Nope."),
    ]);
    let service = RecipeDraftService::from_provider(provider.clone(), test_generation_config(), store);

    let error = service
        .generate_draft(&vegan_request(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::GenerationFailed);
    assert!(error.to_string().contains("3 attempts"));
    assert_eq!(provider.calls(), 3);
    Ok(())
}

#[tokio::test]
async fn test_blank_query_is_rejected_before_any_call() -> Result<()> {
    let provider = ScriptedProvider::new(vec![Step::reply(CURRY_RESPONSE)]);
    let service = RecipeDraftService::from_provider(
        provider.clone(),
        test_generation_config(),
        memory_store().await,
    );

    let request = DraftRequest::new("   ", Uuid::new_v4());
    let error = service
        .generate_draft(&request, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::InvalidInput);
    assert_eq!(provider.calls(), 0);
    Ok(())
}
