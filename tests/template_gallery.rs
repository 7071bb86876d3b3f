use std::collections::HashSet;
use std::path::PathBuf;

use lobsterboard_lib::models::{ImportMode, TemplateMeta, WidgetInstance, WidgetPosition};
use lobsterboard_lib::{builtin_catalog, open_engine, AppError, Dashboard, EngineSettings, TemplateEngine};

fn open(dir: &tempfile::TempDir) -> TemplateEngine {
    let settings = EngineSettings {
        data_dir: dir.path().join("data"),
        ..EngineSettings::default()
    };
    open_engine(&settings).expect("open engine")
}

fn ops_dashboard() -> Dashboard<'static> {
    let mut dashboard = Dashboard::new(builtin_catalog());
    for x in [0, 220, 440] {
        dashboard.place("clock", x, 0).expect("place clock");
    }
    dashboard.place("auth-status", 660, 0).expect("place auth-status");
    dashboard
}

fn meta(name: &str, tags: &str) -> TemplateMeta {
    TemplateMeta {
        name: name.to_string(),
        description: "shared layout".to_string(),
        author: "ops".to_string(),
        tags: TemplateMeta::parse_tags(tags),
    }
}

#[tokio::test]
async fn export_summarizes_clock_and_auth_status() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = open(&dir);
    let dashboard = ops_dashboard();

    let record = engine
        .export_template(dashboard.instances(), meta("Ops Wall", "ops, monitoring"))
        .await
        .expect("export");
    assert_eq!(record.summary.widget_type_counts.get("clock"), Some(&3));
    assert_eq!(record.summary.widget_type_counts.get("auth-status"), Some(&1));
    assert_eq!(record.summary.widget_type_counts.len(), 2);
    assert_eq!(record.summary.requires_setup, vec!["OPENCLAW_API"]);
    assert_eq!(record.tags, vec!["ops", "monitoring"]);

    let stored = engine.get_template(&record.id).expect("stored");
    assert_eq!(stored.summary, record.summary);
    lobsterboard_lib::codec::verify_summary(engine.catalog(), &stored).expect("summary re-derives");
}

#[tokio::test]
async fn merge_import_into_dashboard_with_existing_widget() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = open(&dir);
    let record = engine
        .export_template(ops_dashboard().instances(), meta("Ops Wall", "ops"))
        .await
        .expect("export");

    let existing = WidgetInstance {
        id: "abc".to_string(),
        type_id: "notes".to_string(),
        properties: Default::default(),
        position: WidgetPosition::new(0, 0, 250, 200),
    };
    let outcome = engine
        .import_template(&record.id, ImportMode::Merge, std::slice::from_ref(&existing))
        .expect("merge import");

    assert_eq!(outcome.widgets.len(), 5);
    assert_eq!(outcome.widgets[0], existing);
    assert_eq!(outcome.imported_ids.len(), 4);
    assert!(outcome.imported_ids.iter().all(|id| id != "abc"));
    let ids: HashSet<_> = outcome.widgets.iter().map(|widget| widget.id.clone()).collect();
    assert_eq!(ids.len(), 5);
}

#[tokio::test]
async fn replace_round_trip_keeps_types_properties_and_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = open(&dir);
    let source = ops_dashboard();
    let record = engine
        .export_template(source.instances(), meta("Ops Wall", ""))
        .await
        .expect("export");

    let mut target = engine.new_dashboard();
    target.place("weather", 0, 0).expect("place weather");
    engine
        .import_into(&record.id, ImportMode::Replace, &mut target)
        .expect("replace import");

    assert_eq!(target.len(), source.len());
    let source_ids: HashSet<_> = source.instances().iter().map(|widget| widget.id.as_str()).collect();
    for (imported, original) in target.instances().iter().zip(source.instances()) {
        assert_eq!(imported.type_id, original.type_id);
        assert_eq!(imported.properties, original.properties);
        assert!(!source_ids.contains(imported.id.as_str()));
    }
}

#[test]
fn unknown_widget_type_renders_placeholder() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = open(&dir);
    let ghost = WidgetInstance {
        id: "ghost1".to_string(),
        type_id: "nonexistent-widget".to_string(),
        properties: Default::default(),
        position: WidgetPosition::default(),
    };
    let rendered = engine.materialize(&ghost);
    assert!(!rendered.resolved);
    assert!(rendered.markup.contains("nonexistent-widget"));
    assert!(rendered.behavior.is_empty());
}

#[tokio::test]
async fn search_and_delete_over_sqlite_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = open(&dir);
    let dashboard = ops_dashboard();
    let ops = engine
        .export_template(dashboard.instances(), meta("Ops Wall", "ops"))
        .await
        .expect("export ops");
    engine
        .export_template(dashboard.instances(), meta("Family Room", "home"))
        .await
        .expect("export home");

    let all = engine.search("").expect("search all");
    assert_eq!(all, engine.list().expect("list"));
    assert_eq!(all.len(), 2);
    assert_eq!(engine.search("HOME").expect("tag search")[0].name, "Family Room");
    assert!(engine.search("kitchen").expect("miss").is_empty());

    engine.delete(&ops.id).expect("delete");
    assert!(matches!(engine.delete(&ops.id), Err(AppError::NotFound(_))));
    assert!(matches!(
        engine.import_template(&ops.id, ImportMode::Replace, &[]),
        Err(AppError::NotFound(_))
    ));
    assert_eq!(engine.list().expect("list after delete").len(), 1);
}

#[tokio::test]
async fn templates_persist_across_engine_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let record = {
        let engine = open(&dir);
        let record = engine
            .export_template(ops_dashboard().instances(), meta("Ops Wall", "ops"))
            .await
            .expect("export");
        engine
            .attach_preview(&record.id, "data:image/png;base64,iVBORw0KGgo=")
            .await
            .expect("attach preview");
        record
    };

    let engine = open(&dir);
    let listed = engine.list().expect("list");
    assert_eq!(listed.len(), 1);
    assert!(listed[0].has_preview);
    assert_eq!(
        engine.preview(&record.id).expect("preview").as_deref(),
        Some("data:image/png;base64,iVBORw0KGgo=")
    );
}

#[tokio::test]
async fn fixture_document_imports_and_renders() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = open(&dir);
    let raw = std::fs::read_to_string(PathBuf::from("tests/fixtures/ops-template.json")).expect("read fixture");

    let record = engine.import_document(&raw).await.expect("import document");
    assert_ne!(record.id, "3f6c2a0e-8d1b-4c55-9a51-2b7e0c6d9f10");
    assert_eq!(record.summary.requires_setup, vec!["OPENCLAW_API"]);

    let outcome = engine
        .import_template(&record.id, ImportMode::Replace, &[])
        .expect("import");
    let rendered = engine.materialize_all(&outcome.widgets);
    assert_eq!(rendered.len(), 4);
    assert!(rendered.iter().all(|widget| widget.resolved));
    assert!(rendered[0].markup.contains("Berlin"));
    assert!(rendered[0].behavior.contains("timeZone: 'Europe/Berlin'"));
}

#[tokio::test]
async fn fixture_document_with_tampered_counts_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = open(&dir);
    let raw = std::fs::read_to_string("tests/fixtures/ops-template.json").expect("read fixture");
    let tampered = raw.replace("\"clock\": 3", "\"clock\": 2");

    let result = engine.import_document(&tampered).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(engine.list().expect("list").is_empty());
}
