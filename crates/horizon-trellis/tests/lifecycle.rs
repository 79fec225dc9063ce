//! End-to-end tests for view wiring, registries and teardown.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use horizon_trellis::headless::{
    HeadlessNode, HeadlessTarget, HeadlessTimeline, MemoryDataSource, MemoryRouter, StaticI18n,
};
use horizon_trellis::logging::ViewTreeDebug;
use horizon_trellis::prelude::*;
use horizon_trellis::render::same_node;
use horizon_trellis_core::{map, ChildKind};
use parking_lot::Mutex;

/// A page that fills its registries when built.
struct Page {
    children: usize,
    elements: usize,
    models: usize,
}

impl ViewBehavior for Page {
    fn build(&self, view: &View) {
        for i in 0..self.children {
            view.view(Some(&format!("child{i}")), &format!("child{i}"))
                .expect("child view");
        }
        for i in 0..self.elements {
            view.element(Some(&format!("el{i}")), "div").expect("element");
        }
        for i in 0..self.models {
            view.model(Some(&format!("model{i}")), "rows").expect("model");
        }
    }
}

/// A child view that owns one element of its own.
struct Leaf;

impl ViewBehavior for Leaf {
    fn build(&self, view: &View) {
        view.element(Some("root"), "section").expect("leaf root");
    }

    fn render(&self, view: &View) -> Option<Element> {
        view.get_element("root")
    }
}

struct Sources(Mutex<Vec<Arc<MemoryDataSource>>>);

fn dispatcher(children: usize, elements: usize, models: usize) -> (Dispatcher, Arc<Sources>) {
    let sources = Arc::new(Sources(Mutex::new(Vec::new())));
    let factory_sources = sources.clone();

    let mut builder = Dispatcher::builder(HeadlessTarget::new())
        .data_sources(move || {
            let source = Arc::new(MemoryDataSource::new());
            factory_sources.0.lock().push(source.clone());
            source
        })
        .view("page", move || {
            View::new(Page {
                children,
                elements,
                models,
            })
        });
    for i in 0..children {
        builder = builder.view(format!("child{i}"), || View::new(Leaf));
    }
    (builder.build(), sources)
}

fn destroy_events(node: &NodeRef) -> usize {
    HeadlessNode::downcast(node)
        .expect("headless node")
        .dispatched()
        .iter()
        .filter(|event| event.name == "destroy")
        .count()
}

#[test]
fn test_destroy_cascades_once_per_entry() {
    let (dispatcher, sources) = dispatcher(3, 4, 2);
    let page = dispatcher.get("page").unwrap();

    let children: Vec<View> = page.children().into_iter().map(|(_, v)| v).collect();
    let child_elements: Vec<(Element, NodeRef)> = children
        .iter()
        .filter_map(|child| child.get_element("root"))
        .map(|el| {
            let node = el.node().unwrap();
            (el, node)
        })
        .collect();
    let elements: Vec<(Element, NodeRef)> = page
        .element_ids()
        .iter()
        .filter_map(|id| page.get_element(id))
        .map(|el| {
            let node = el.node().unwrap();
            (el, node)
        })
        .collect();
    let models: Vec<Model> = page
        .model_ids()
        .iter()
        .filter_map(|id| page.get_model(id))
        .collect();

    assert_eq!(children.len(), 3);
    assert_eq!(child_elements.len(), 3);
    assert_eq!(elements.len(), 4);
    assert_eq!(models.len(), 2);

    page.destroy();
    page.destroy();

    assert!(children.iter().all(View::is_destroyed));
    for (element, node) in elements.iter().chain(child_elements.iter()) {
        assert!(element.is_destroyed());
        assert_eq!(destroy_events(node), 1);
    }
    assert!(models.iter().all(|m| !m.is_listening()));
    for source in sources.0.lock().iter() {
        assert_eq!(source.events().selected.connection_count(), 0);
    }

    assert!(page.view_ids().is_empty());
    assert!(page.element_ids().is_empty());
    assert!(page.model_ids().is_empty());
    assert!(!page.is_wired());
}

#[test]
fn test_destroy_empty_view() {
    let (dispatcher, _) = dispatcher(0, 0, 0);
    let page = dispatcher.get("page").unwrap();
    page.destroy();
    assert!(page.is_destroyed());
}

#[test]
fn test_missing_view_leaves_registry_unchanged() {
    let (dispatcher, _) = dispatcher(1, 0, 0);
    let before = dispatcher.view_names();

    let err = dispatcher.get("missing").unwrap_err();
    assert!(matches!(err, Error::ViewNotFound { .. }));
    assert_eq!(dispatcher.view_names(), before);
    assert!(dispatcher.instance("missing").is_none());
}

#[test]
fn test_duplicate_child_leaves_existing_untouched() {
    let (dispatcher, _) = dispatcher(2, 0, 0);
    let page = dispatcher.get("page").unwrap();
    let existing = page.get_view("child0").unwrap();

    let err = page.view(Some("child0"), "child1").unwrap_err();
    assert!(matches!(
        err,
        Error::DuplicateChildId {
            kind: ChildKind::View,
            ..
        }
    ));
    assert!(page.get_view("child0").unwrap().ptr_eq(&existing));
    assert!(!existing.is_destroyed());

    assert!(page.model(Some("model0"), "rows").is_ok());
    let err = page.model(Some("model0"), "rows").unwrap_err();
    assert!(matches!(
        err,
        Error::DuplicateChildId {
            kind: ChildKind::Model,
            ..
        }
    ));
}

#[test]
fn test_model_results_reach_view_callbacks() {
    let (dispatcher, sources) = dispatcher(0, 0, 0);
    let page = dispatcher.get("page").unwrap();

    let users = page.model(Some("users"), "users").unwrap();
    let rows = Arc::new(Mutex::new(Vec::new()));
    let rows_clone = rows.clone();
    users.iterate(move |row| rows_clone.lock().push(row.clone()));
    users.select(&map! { "active" => true }.into());

    let source = sources.0.lock()[0].clone();
    assert_eq!(source.name().as_deref(), Some("users"));
    assert_eq!(source.calls()[0].0, "select");

    source.emit_rows(vec![Value::from("ada"), Value::from("grace")]);
    assert_eq!(rows.lock().len(), 2);

    page.destroy();
    source.emit_rows(vec![Value::from("late")]);
    assert_eq!(rows.lock().len(), 2);
}

#[test]
fn test_append_view_renders_child_under_element() {
    let (dispatcher, _) = dispatcher(1, 0, 0);
    let page = dispatcher.get("page").unwrap();
    let container = page.element(Some("main"), "main").unwrap();

    let child = container.append_view(None, "child0").unwrap();
    let root = child.render().unwrap();

    let container_node = container.node().unwrap();
    let root_node = root.node().unwrap();
    let headless = HeadlessNode::downcast(&container_node).unwrap();
    assert_eq!(headless.children().len(), 1);
    assert!(same_node(&headless.children()[0], &root_node));

    let appended = HeadlessNode::downcast(&root_node).unwrap().dispatched();
    assert_eq!(appended.last().map(|e| e.name.as_str()), Some("append"));
    assert_eq!(appended.last().map(|e| e.detail.clone()), Some(Value::from("main")));
}

#[test]
fn test_child_destroy_leaves_parent_registry() {
    let (dispatcher, _) = dispatcher(2, 0, 0);
    let page = dispatcher.get("page").unwrap();
    let child = page.get_view("child1").unwrap();

    child.destroy();
    assert_eq!(page.view_ids(), vec!["child0".to_string()]);
    assert!(page.get_view("child0").is_some_and(|v| !v.is_destroyed()));
}

#[test]
fn test_element_destroy_leaves_view_registry() {
    let (dispatcher, _) = dispatcher(0, 2, 0);
    let page = dispatcher.get("page").unwrap();
    let element = page.get_element("el0").unwrap();

    element.destroy();
    assert_eq!(page.element_ids(), vec!["el1".to_string()]);
}

#[test]
fn test_i18n_hooks_until_destroy() {
    struct Localized(Arc<Mutex<Vec<String>>>);

    impl ViewBehavior for Localized {
        fn locale_changed(&self, _view: &View, locale: &str) {
            self.0.lock().push(format!("locale:{locale}"));
        }

        fn timezone_changed(&self, _view: &View, timezone: &str) {
            self.0.lock().push(format!("timezone:{timezone}"));
        }
    }

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    let i18n = Arc::new(StaticI18n::new().with("title", "Titel"));
    let dispatcher = Dispatcher::builder(HeadlessTarget::new())
        .i18n(i18n.clone())
        .view("page", move || View::new(Localized(seen_clone.clone())))
        .build();

    let page = dispatcher.get("page").unwrap();
    assert_eq!(page.i18n("title").as_deref(), Some("Titel"));

    i18n.set_locale("nl-NL");
    i18n.set_timezone("Europe/Amsterdam");
    page.destroy();
    i18n.set_locale("en-US");

    assert_eq!(
        *seen.lock(),
        vec![
            "locale:nl-NL".to_string(),
            "timezone:Europe/Amsterdam".to_string()
        ]
    );
    assert_eq!(i18n.locale_changed().connection_count(), 0);
}

#[test]
fn test_router_and_completion_after_destroy() {
    let timeline = Arc::new(HeadlessTimeline::new());
    let provided = timeline.clone();
    let router = Arc::new(MemoryRouter::new());
    let dispatcher = Dispatcher::builder(HeadlessTarget::new())
        .router(router.clone())
        .timeline(move || provided.clone())
        .view("page", || View::new(()))
        .build();

    let page = dispatcher.get("page").unwrap();
    page.router().unwrap().navigate("/inbox");
    assert_eq!(router.current().as_deref(), Some("/inbox"));

    let done = Arc::new(AtomicUsize::new(0));
    let done_clone = done.clone();
    page.play(Some(Box::new(move || {
        done_clone.fetch_add(1, Ordering::SeqCst);
    })));
    page.destroy();
    timeline.complete();
    assert_eq!(done.load(Ordering::SeqCst), 0);
}

#[test]
fn test_rewired_after_destroy() {
    let builds = Arc::new(AtomicUsize::new(0));
    struct Counted(Arc<AtomicUsize>);
    impl ViewBehavior for Counted {
        fn build(&self, _view: &View) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    let builds_clone = builds.clone();
    let dispatcher = Dispatcher::builder(HeadlessTarget::new())
        .view("page", move || View::new(Counted(builds_clone.clone())))
        .build();

    let page = dispatcher.get("page").unwrap();
    dispatcher.get("page").unwrap();
    assert_eq!(builds.load(Ordering::SeqCst), 1);

    page.destroy();
    let again = dispatcher.get("page").unwrap();
    assert!(again.ptr_eq(&page));
    assert!(!again.is_destroyed());
    assert_eq!(builds.load(Ordering::SeqCst), 2);
}

#[test]
fn test_tree_debug_lists_children() {
    let (dispatcher, _) = dispatcher(2, 1, 0);
    let page = dispatcher.get("page").unwrap();
    let output = ViewTreeDebug::new().format_tree(&page);
    assert!(output.contains("child0 <child0>"));
    assert!(output.contains("child1 <child1>"));
}
