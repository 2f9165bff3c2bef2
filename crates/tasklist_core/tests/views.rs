use tasklist_core::{
    ItemCommit, MemoryTaskRepository, Task, TaskCollection, TaskRepository, ViewError,
};
use tasklist_core::{ListView, StorageOperation};

fn setup(titles: &[&str]) -> TaskCollection<MemoryTaskRepository> {
    let mut collection = TaskCollection::fetch(MemoryTaskRepository::new());
    for title in titles {
        collection.add(title).unwrap();
    }
    collection
}

#[test]
fn initial_render_lists_tasks_with_footer() {
    let mut collection = setup(&["buy milk", "walk dog"]);
    let view = ListView::new(&mut collection);

    assert_eq!(
        view.render(),
        "1. [ ] buy milk\n2. [ ] walk dog\n2 items left"
    );
}

#[test]
fn empty_collection_renders_marker() {
    let mut collection = setup(&[]);
    let view = ListView::new(&mut collection);
    assert_eq!(view.render(), "no tasks");
}

#[test]
fn blank_submission_is_silently_ignored() {
    let mut collection = setup(&[]);
    let mut view = ListView::new(&mut collection);

    assert_eq!(view.create_on_enter(&mut collection, "   ").unwrap(), None);
    assert!(collection.is_empty());
    assert!(view.items().is_empty());
}

#[test]
fn submission_appends_item_in_order() {
    let mut collection = setup(&["buy milk"]);
    let mut view = ListView::new(&mut collection);

    let task = view
        .create_on_enter(&mut collection, "walk dog")
        .unwrap()
        .unwrap();
    assert_eq!(task.order, 2);
    assert_eq!(view.items().len(), 2);
    assert_eq!(view.item_at(2).unwrap().task_id(), task.id);
    assert_eq!(view.stats().remaining, 2);
}

#[test]
fn toggle_and_clear_completed_update_footer() {
    let mut collection = setup(&["buy milk", "walk dog"]);
    let mut view = ListView::new(&mut collection);

    view.toggle_at(&mut collection, 1).unwrap();
    assert_eq!(
        view.render(),
        "1. [x] buy milk\n2. [ ] walk dog\n1 item left | clear completed (1)"
    );

    let removed = view.clear_completed(&mut collection);
    assert_eq!(removed.len(), 1);
    assert_eq!(view.render(), "1. [ ] walk dog\n1 item left");
}

#[test]
fn edit_commit_saves_title() {
    let mut collection = setup(&["buy milk"]);
    let mut view = ListView::new(&mut collection);

    let commit = view.edit_at(&mut collection, 1, "buy oat milk").unwrap();
    assert!(matches!(commit, ItemCommit::Saved(ref task) if task.title == "buy oat milk"));
    assert_eq!(view.item_at(1).unwrap().line(), "[ ] buy oat milk");
    assert!(!view.item_at(1).unwrap().is_editing());
}

#[test]
fn empty_edit_commit_destroys_task() {
    let mut collection = setup(&["buy milk", "walk dog"]);
    let mut view = ListView::new(&mut collection);
    let target = collection.tasks()[0].id;

    let commit = view.edit_at(&mut collection, 1, "  ").unwrap();
    assert!(matches!(commit, ItemCommit::Destroyed(ref task) if task.id == target));
    assert!(collection.get(target).is_none());
    assert!(collection.repository().get_task(target).unwrap().is_none());
    assert_eq!(view.items().len(), 1);
    assert_eq!(view.render(), "1. [ ] walk dog\n1 item left");
}

#[test]
fn edit_mode_renders_draft_until_commit() {
    let mut collection = setup(&["buy milk"]);
    let mut view = ListView::new(&mut collection);

    view.begin_edit_at(&collection, 1).unwrap();
    view.set_draft_at(1, "buy bread").unwrap();
    assert_eq!(view.item_at(1).unwrap().line(), "> buy bread");
    assert_eq!(collection.tasks()[0].title, "buy milk");

    view.commit_at(&mut collection, 1).unwrap();
    assert_eq!(view.item_at(1).unwrap().line(), "[ ] buy bread");
}

#[test]
fn out_of_range_positions_are_reported() {
    let mut collection = setup(&["buy milk"]);
    let mut view = ListView::new(&mut collection);

    assert_eq!(
        view.toggle_at(&mut collection, 0),
        Err(ViewError::NoSuchPosition(0))
    );
    assert_eq!(
        view.destroy_at(&mut collection, 2),
        Err(ViewError::NoSuchPosition(2))
    );
    assert!(view.item_at(0).is_none());
}

#[test]
fn changes_made_directly_on_collection_appear_after_sync() {
    let mut collection = setup(&["buy milk"]);
    let mut view = ListView::new(&mut collection);

    let task = collection.add("walk dog").unwrap();
    assert_eq!(view.items().len(), 1);

    assert_eq!(view.sync(&collection), 1);
    assert_eq!(view.items().len(), 2);
    assert_eq!(view.item_at(2).unwrap().task_id(), task.id);
}

#[test]
fn reset_rebuilds_item_views() {
    let repo = MemoryTaskRepository::new();
    let mut collection = TaskCollection::fetch(&repo);
    let mut view = ListView::new(&mut collection);
    repo.save_task(&Task::new("added elsewhere", 1)).unwrap();

    collection.reload();
    view.sync(&collection);
    assert_eq!(view.render(), "1. [ ] added elsewhere\n1 item left");
}

#[test]
fn storage_warning_from_startup_is_shown_once() {
    struct Unavailable;

    impl TaskRepository for Unavailable {
        fn load_tasks(&self) -> tasklist_core::RepoResult<Vec<Task>> {
            Err(tasklist_core::RepoError::InvalidData("offline".to_string()))
        }
        fn get_task(&self, _id: tasklist_core::TaskId) -> tasklist_core::RepoResult<Option<Task>> {
            Ok(None)
        }
        fn save_task(&self, _task: &Task) -> tasklist_core::RepoResult<()> {
            Ok(())
        }
        fn delete_task(&self, _id: tasklist_core::TaskId) -> tasklist_core::RepoResult<bool> {
            Ok(false)
        }
        fn delete_tasks(&self, _ids: &[tasklist_core::TaskId]) -> tasklist_core::RepoResult<usize> {
            Ok(0)
        }
    }

    let mut collection = TaskCollection::fetch(Unavailable);
    let mut view = ListView::new(&mut collection);

    let warnings = view.take_warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].starts_with(&format!("storage {} failed", StorageOperation::Load)));
    assert!(warnings[0].contains("offline"));
    assert!(warnings[0].ends_with("changes will not be saved"));
    assert!(view.take_warnings().is_empty());
}
