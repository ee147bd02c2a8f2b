//! Bulk generation through the real job client against a scripted task service

use crate::integration::test_utils::{ObservingGenerator, ScriptedTransport, TaskScript, TransportEvent};
use mangaflow::project::PanelStatus;
use mangaflow::remote::{build_panel_prompt, JobClient, PollSettings};
use mangaflow::store::ProjectStore;
use mangaflow::storyline::TemplateStoryline;
use mangaflow::studio::Studio;
use mangaflow::types::MangaStyle;
use std::sync::Arc;
use std::time::Duration;

fn succeed(running: usize, image: &str) -> TaskScript {
    TaskScript::Succeed {
        running,
        image: image.to_string(),
    }
}

fn studio_over(transport: Arc<ScriptedTransport>) -> (Studio, Arc<ObservingGenerator>) {
    let store = Arc::new(ProjectStore::in_memory());
    let client = Arc::new(JobClient::new(transport, PollSettings::default()));
    let observer = ObservingGenerator::new(client, Arc::clone(&store));
    let studio = Studio::new(store, Arc::new(TemplateStoryline), observer.clone());
    (studio, observer)
}

#[tokio::test(start_paused = true)]
async fn neon_horizon_panels_resolve_in_order() {
    let transport = ScriptedTransport::new(vec![
        succeed(1, "https://cdn.example/1.png"),
        succeed(0, "https://cdn.example/2.png"),
        succeed(2, "https://cdn.example/3.png"),
        succeed(0, "https://cdn.example/4.png"),
    ]);
    let (studio, observer) = studio_over(transport.clone());

    let (project, report) = studio
        .on_create_project("", "Neon Horizon", MangaStyle::ClassicShonen)
        .await
        .unwrap();

    assert_eq!(project.title, "Neon Horizon");
    assert_eq!(report.completed, 4);
    let captions: Vec<&str> = project
        .primary_panels()
        .iter()
        .map(|p| p.caption.as_str())
        .collect();
    assert_eq!(
        captions,
        vec![
            "The story begins...",
            "Our hero appears",
            "The challenge arises",
            "The moment of truth"
        ]
    );
    let images: Vec<&str> = project
        .primary_panels()
        .iter()
        .map(|p| p.image_url().map(|l| l.as_str()).unwrap_or_default())
        .collect();
    assert_eq!(
        images,
        vec![
            "https://cdn.example/1.png",
            "https://cdn.example/2.png",
            "https://cdn.example/3.png",
            "https://cdn.example/4.png"
        ]
    );

    // Panel k is generating while every earlier panel is done and every later one idle
    use PanelStatus::*;
    assert_eq!(
        observer.observed(),
        vec![
            vec![Generating, Idle, Idle, Idle],
            vec![Completed, Generating, Idle, Idle],
            vec![Completed, Completed, Generating, Idle],
            vec![Completed, Completed, Completed, Generating],
        ]
    );

    // No task is submitted before the previous one reached a terminal status
    let events = transport.events();
    let submit_positions: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| matches!(e, TransportEvent::Submit { .. }))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(submit_positions.len(), 4);
    for (k, window) in submit_positions.windows(2).enumerate() {
        let task = format!("task-{}", k + 1);
        let last_status_of_task = events
            .iter()
            .rposition(|e| *e == TransportEvent::Status { task: task.clone() })
            .unwrap();
        assert!(last_status_of_task < window[1]);
    }

    assert_eq!(
        transport.submitted_prompts()[0],
        build_panel_prompt(&project.primary_panels()[0].prompt, MangaStyle::ClassicShonen)
    );
}

#[tokio::test(start_paused = true)]
async fn failed_panel_does_not_stop_the_run() {
    let transport = ScriptedTransport::new(vec![
        succeed(0, "https://cdn.example/1.png"),
        TaskScript::Fail {
            running: 1,
            message: "content policy".to_string(),
        },
        succeed(0, "https://cdn.example/3.png"),
        succeed(0, "https://cdn.example/4.png"),
    ]);
    let (studio, _) = studio_over(transport);

    let (project, report) = studio
        .on_create_project("Drowned City", "A courier races", MangaStyle::SeinenNoir)
        .await
        .unwrap();

    assert_eq!((report.completed, report.failed, report.skipped), (3, 1, 0));
    let second = &project.primary_panels()[1];
    assert_eq!(second.status(), PanelStatus::Error);
    assert!(second.image_url().is_none());
    assert_eq!(project.primary_panels()[3].status(), PanelStatus::Completed);
}

#[tokio::test(start_paused = true)]
async fn hanging_task_times_out_into_error() {
    let transport = ScriptedTransport::new(vec![
        TaskScript::Hang,
        succeed(0, "https://cdn.example/2.png"),
        succeed(0, "https://cdn.example/3.png"),
        succeed(0, "https://cdn.example/4.png"),
    ]);
    let (studio, _) = studio_over(transport.clone());

    let started = tokio::time::Instant::now();
    let (project, report) = studio
        .on_create_project("Timeout", "A slow render", MangaStyle::GothicHorror)
        .await
        .unwrap();

    assert!(started.elapsed() >= Duration::from_secs(300));
    assert_eq!(report.failed, 1);
    assert_eq!(project.primary_panels()[0].status(), PanelStatus::Error);
    assert_eq!(project.primary_panels()[1].status(), PanelStatus::Completed);
}

#[tokio::test(start_paused = true)]
async fn deleting_project_mid_run_stops_the_run() {
    let transport = ScriptedTransport::new(vec![
        succeed(3, "https://cdn.example/1.png"),
        succeed(0, "https://cdn.example/2.png"),
    ]);
    let store = Arc::new(ProjectStore::in_memory());
    let client = Arc::new(JobClient::new(transport.clone(), PollSettings::default()));
    let studio = Arc::new(Studio::new(
        Arc::clone(&store),
        Arc::new(TemplateStoryline),
        client,
    ));

    let draft = studio
        .create_project_draft("Gone", "Soon deleted", MangaStyle::KawaiiShoujo)
        .await
        .unwrap();
    let run = studio.spawn_bulk_generation(draft.id);

    let first_panel = draft.primary_panels()[0].id;
    crate::integration::test_utils::wait_until(|| {
        store.panel(&draft.id, &first_panel).map(|p| p.status()) == Some(PanelStatus::Generating)
    })
    .await;
    assert!(studio.on_delete_project(&draft.id));

    let report = run.await.unwrap().unwrap();
    assert_eq!(report.completed + report.failed, 0);
    assert_eq!(report.skipped, 4);
    assert_eq!(transport.submitted_prompts().len(), 1);
    assert!(store.snapshot().is_empty());
}
