//! Studio operations interleaved with in-flight generation attempts

use crate::integration::test_utils::{wait_until, DelayedGenerator, GatedGenerator};
use mangaflow::error::ApiError;
use mangaflow::project::{PanelPatch, PanelStatus};
use mangaflow::store::ProjectStore;
use mangaflow::storyline::TemplateStoryline;
use mangaflow::studio::Studio;
use mangaflow::types::MangaStyle;
use std::sync::Arc;
use std::time::Duration;

fn studio_with(generator: Arc<dyn mangaflow::remote::ImageGenerator>) -> Arc<Studio> {
    Arc::new(Studio::new(
        Arc::new(ProjectStore::in_memory()),
        Arc::new(TemplateStoryline),
        generator,
    ))
}

#[tokio::test]
async fn caption_edit_during_generation_survives_resolution() {
    let generator = GatedGenerator::new(Some("https://cdn.example/new.png"));
    let studio = studio_with(generator.clone());
    let draft = studio
        .create_project_draft("Edit", "Neon Horizon", MangaStyle::CyberpunkMecha)
        .await
        .unwrap();
    let project_id = draft.id;
    let panel_id = draft.primary_panels()[1].id;

    let task = {
        let studio = Arc::clone(&studio);
        tokio::spawn(async move { studio.on_regenerate_panel(&project_id, &panel_id).await })
    };
    wait_until(|| generator.calls() == 1).await;
    assert_eq!(
        studio.store().panel(&project_id, &panel_id).unwrap().status(),
        PanelStatus::Generating
    );

    studio
        .on_update_panel(&panel_id, &PanelPatch::caption("Edited while drawing"))
        .unwrap();
    generator.release_one();

    assert_eq!(task.await.unwrap().unwrap(), PanelStatus::Completed);
    let panel = studio.store().panel(&project_id, &panel_id).unwrap();
    assert_eq!(panel.caption, "Edited while drawing");
    assert_eq!(
        panel.image_url().map(|l| l.as_str()),
        Some("https://cdn.example/new.png")
    );
}

#[tokio::test(start_paused = true)]
async fn back_to_back_regenerations_reach_a_terminal_state() {
    let studio = studio_with(DelayedGenerator::new(Duration::from_secs(2)));
    let draft = studio
        .create_project_draft("Twice", "Same panel twice", MangaStyle::ClassicShonen)
        .await
        .unwrap();
    let project_id = draft.id;
    let panel_id = draft.primary_panels()[0].id;

    let spawn_attempt = || {
        let studio = Arc::clone(&studio);
        tokio::spawn(async move { studio.on_regenerate_panel(&project_id, &panel_id).await })
    };
    let first = spawn_attempt();
    let second = spawn_attempt();

    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();
    assert!(first.is_terminal());
    assert!(second.is_terminal());

    let panel = studio.store().panel(&project_id, &panel_id).unwrap();
    assert_eq!(panel.status(), PanelStatus::Completed);
    assert!(panel.image_url().is_some());
}

#[tokio::test]
async fn failed_panel_can_be_regenerated() {
    let failing = GatedGenerator::new(None);
    let studio = studio_with(failing.clone());
    let draft = studio
        .create_project_draft("Retry", "A second chance", MangaStyle::SeinenNoir)
        .await
        .unwrap();
    let project_id = draft.id;
    let panel_id = draft.primary_panels()[0].id;

    failing.release_one();
    let status = studio
        .on_regenerate_panel(&project_id, &panel_id)
        .await
        .unwrap();
    assert_eq!(status, PanelStatus::Error);

    failing.release_one();
    let status = studio
        .on_regenerate_panel(&project_id, &panel_id)
        .await
        .unwrap();
    assert_eq!(status, PanelStatus::Error);
    assert!(studio
        .store()
        .panel(&project_id, &panel_id)
        .unwrap()
        .image_url()
        .is_none());
}

#[tokio::test]
async fn regenerating_a_deleted_project_fails_cleanly() {
    let generator = GatedGenerator::new(Some("https://cdn.example/x.png"));
    let studio = studio_with(generator.clone());
    let draft = studio
        .create_project_draft("Temp", "Short lived", MangaStyle::GothicHorror)
        .await
        .unwrap();
    let panel_id = draft.primary_panels()[0].id;
    assert!(studio.on_delete_project(&draft.id));

    let err = studio
        .on_regenerate_panel(&draft.id, &panel_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::ProjectNotFound(_)));
    assert_eq!(generator.calls(), 0);
    assert!(studio.selected_project_id().is_none());
}
