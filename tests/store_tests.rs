//! Behaviour shared by every store backend.
//!
//! Each check runs against SQLite and JSON stores in a scratch directory.

use tasklist::store::{JsonStore, SqliteStore};
use tasklist::{NameMatch, Stats, TaskDraft, TaskError, TaskFilter, TaskStore};
use tempfile::TempDir;

fn backends() -> Vec<(&'static str, TempDir, Box<dyn TaskStore>)> {
    let sqlite_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let sqlite = SqliteStore::open(sqlite_dir.path().join("tasks.db")).expect("Failed to open SQLite store");

    let json_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let json = JsonStore::open(json_dir.path().join("tasks.json")).expect("Failed to open JSON store");

    vec![
        ("sqlite", sqlite_dir, Box::new(sqlite) as Box<dyn TaskStore>),
        ("json", json_dir, Box::new(json) as Box<dyn TaskStore>),
    ]
}

fn milk() -> TaskDraft {
    TaskDraft::new("Buy milk", "2024-01-01", "2% milk", "Haute")
}

mod create_tests {
    use super::*;

    #[test]
    fn create_then_list_contains_exactly_that_task() {
        for (backend, _dir, mut store) in backends() {
            let created = store.create(milk()).unwrap();
            let tasks = store.list(&TaskFilter::all()).unwrap();

            assert_eq!(tasks.len(), 1, "{backend}");
            assert_eq!(tasks[0], created, "{backend}");
            assert_eq!(tasks[0].name, "Buy milk", "{backend}");
            assert_eq!(tasks[0].date, "2024-01-01", "{backend}");
            assert_eq!(tasks[0].description, "2% milk", "{backend}");
            assert_eq!(tasks[0].priority, "Haute", "{backend}");
            assert!(!tasks[0].done, "{backend}");
        }
    }

    #[test]
    fn create_with_missing_field_changes_nothing() {
        for (backend, _dir, mut store) in backends() {
            store.create(milk()).unwrap();
            let before = store.list(&TaskFilter::all()).unwrap();

            let drafts = [
                TaskDraft::new("", "2024-01-01", "x", "Haute"),
                TaskDraft::new("Walk dog", " ", "x", "Haute"),
                TaskDraft::new("Walk dog", "2024-01-01", "Description...", "Haute"),
                TaskDraft::new("Walk dog", "2024-01-01", "x", ""),
            ];
            for draft in drafts {
                let err = store.create(draft).unwrap_err();
                assert!(matches!(err, TaskError::IncompleteEntry { .. }), "{backend}: {err}");
            }

            assert_eq!(store.list(&TaskFilter::all()).unwrap(), before, "{backend}");
        }
    }

    #[test]
    fn list_keeps_creation_order() {
        for (backend, _dir, mut store) in backends() {
            for name in ["first", "second", "third"] {
                store
                    .create(TaskDraft::new(name, "2024-01-01", "x", "Basse"))
                    .unwrap();
            }
            let names: Vec<String> = store
                .list(&TaskFilter::all())
                .unwrap()
                .into_iter()
                .map(|t| t.name)
                .collect();
            assert_eq!(names, ["first", "second", "third"], "{backend}");
        }
    }

    #[test]
    fn get_returns_stored_task() {
        for (backend, _dir, mut store) in backends() {
            let created = store.create(milk()).unwrap();
            assert_eq!(store.get(created.id).unwrap(), Some(created.clone()), "{backend}");
            assert_eq!(store.get(created.id + 100).unwrap(), None, "{backend}");
        }
    }
}

mod mutation_tests {
    use super::*;

    #[test]
    fn mark_done_is_visible_and_idempotent() {
        for (backend, _dir, mut store) in backends() {
            let task = store.create(milk()).unwrap();

            assert!(store.mark_done(task.id).unwrap(), "{backend}");
            assert!(store.mark_done(task.id).unwrap(), "{backend}");

            let tasks = store.list(&TaskFilter::all()).unwrap();
            assert_eq!(tasks.len(), 1, "{backend}");
            assert!(tasks[0].done, "{backend}");
        }
    }

    #[test]
    fn mark_done_unknown_id_reports_not_found() {
        for (backend, _dir, mut store) in backends() {
            assert!(!store.mark_done(42).unwrap(), "{backend}");
        }
    }

    #[test]
    fn delete_removes_task() {
        for (backend, _dir, mut store) in backends() {
            let keep = store
                .create(TaskDraft::new("Walk dog", "2024-01-02", "park", "Basse"))
                .unwrap();
            let gone = store.create(milk()).unwrap();

            assert!(store.delete(gone.id).unwrap(), "{backend}");

            let tasks = store.list(&TaskFilter::all()).unwrap();
            assert_eq!(tasks, vec![keep], "{backend}");
        }
    }

    #[test]
    fn delete_unknown_id_is_a_no_op() {
        for (backend, _dir, mut store) in backends() {
            store.create(milk()).unwrap();
            assert!(!store.delete(999).unwrap(), "{backend}");
            assert_eq!(store.count().unwrap().total, 1, "{backend}");
        }
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        for (backend, _dir, mut store) in backends() {
            let a = store.create(milk()).unwrap();
            let b = store.create(milk()).unwrap();
            store.delete(b.id).unwrap();
            let c = store.create(milk()).unwrap();
            assert!(c.id > b.id, "{backend}");
            assert_ne!(c.id, a.id, "{backend}");
        }
    }

    #[test]
    fn duplicate_names_are_distinguished_by_id() {
        for (backend, _dir, mut store) in backends() {
            let first = store.create(milk()).unwrap();
            let second = store.create(milk()).unwrap();

            store.mark_done(second.id).unwrap();

            let first = store.get(first.id).unwrap().unwrap();
            let second = store.get(second.id).unwrap().unwrap();
            assert!(!first.done, "{backend}");
            assert!(second.done, "{backend}");
        }
    }
}

mod name_match_tests {
    use super::*;

    #[test]
    fn first_touches_only_the_oldest_match() {
        for (backend, _dir, mut store) in backends() {
            let oldest = store.create(milk()).unwrap();
            let newest = store.create(milk()).unwrap();

            assert_eq!(store.mark_done_by_name("Buy milk", NameMatch::First).unwrap(), 1, "{backend}");
            assert!(store.get(oldest.id).unwrap().unwrap().done, "{backend}");
            assert!(!store.get(newest.id).unwrap().unwrap().done, "{backend}");

            assert_eq!(store.delete_by_name("Buy milk", NameMatch::First).unwrap(), 1, "{backend}");
            let remaining = store.list(&TaskFilter::all()).unwrap();
            assert_eq!(remaining.len(), 1, "{backend}");
            assert_eq!(remaining[0].id, newest.id, "{backend}");
        }
    }

    #[test]
    fn all_touches_every_match() {
        for (backend, _dir, mut store) in backends() {
            store.create(milk()).unwrap();
            store.create(milk()).unwrap();
            let other = store
                .create(TaskDraft::new("Walk dog", "2024-01-02", "park", "Basse"))
                .unwrap();

            assert_eq!(store.mark_done_by_name("Buy milk", NameMatch::All).unwrap(), 2, "{backend}");
            assert_eq!(store.count().unwrap(), Stats { total: 3, done: 2, not_done: 1 }, "{backend}");

            assert_eq!(store.delete_by_name("Buy milk", NameMatch::All).unwrap(), 2, "{backend}");
            assert_eq!(store.list(&TaskFilter::all()).unwrap(), vec![other], "{backend}");
        }
    }

    #[test]
    fn unknown_name_affects_nothing() {
        for (backend, _dir, mut store) in backends() {
            store.create(milk()).unwrap();
            assert_eq!(store.delete_by_name("Nope", NameMatch::All).unwrap(), 0, "{backend}");
            assert_eq!(store.mark_done_by_name("Nope", NameMatch::First).unwrap(), 0, "{backend}");
            assert_eq!(store.count().unwrap().total, 1, "{backend}");
        }
    }
}

mod query_tests {
    use super::*;

    fn seed(store: &mut dyn TaskStore) {
        store.create(milk()).unwrap();
        store
            .create(TaskDraft::new("Walk dog", "2024-01-02", "Around the PARK", "Basse"))
            .unwrap();
        store
            .create(TaskDraft::new("Pay rent", "2024-02-01", "bank transfer", "Haute"))
            .unwrap();
    }

    #[test]
    fn priority_filter_is_exact() {
        for (backend, _dir, mut store) in backends() {
            seed(store.as_mut());
            let high = store.list(&TaskFilter::priority("Haute")).unwrap();
            assert_eq!(high.len(), 2, "{backend}");
            assert!(store.list(&TaskFilter::priority("haute")).unwrap().is_empty(), "{backend}");
        }
    }

    #[test]
    fn keyword_search_ignores_case_and_checks_every_field() {
        for (backend, _dir, mut store) in backends() {
            seed(store.as_mut());

            let park = store.list(&TaskFilter::keyword("park")).unwrap();
            assert_eq!(park.len(), 1, "{backend}");
            assert_eq!(park[0].name, "Walk dog", "{backend}");

            let february = store.list(&TaskFilter::keyword("2024-02")).unwrap();
            assert_eq!(february.len(), 1, "{backend}");

            assert_eq!(store.list(&TaskFilter::keyword("BASSE")).unwrap().len(), 1, "{backend}");
            assert!(store.list(&TaskFilter::keyword("groceries")).unwrap().is_empty(), "{backend}");
        }
    }

    #[test]
    fn count_always_balances() {
        for (backend, _dir, mut store) in backends() {
            assert_eq!(store.count().unwrap(), Stats::default(), "{backend}");

            seed(store.as_mut());
            let ids: Vec<_> = store.list(&TaskFilter::all()).unwrap().iter().map(|t| t.id).collect();
            store.mark_done(ids[0]).unwrap();
            store.delete(ids[2]).unwrap();

            let stats = store.count().unwrap();
            assert_eq!(stats.total, stats.done + stats.not_done, "{backend}");
            assert_eq!(stats, Stats { total: 2, done: 1, not_done: 1 }, "{backend}");
        }
    }

    #[test]
    fn buy_milk_example() {
        for (backend, _dir, mut store) in backends() {
            store.create(milk()).unwrap();
            assert_eq!(store.mark_done_by_name("Buy milk", NameMatch::First).unwrap(), 1, "{backend}");
            assert_eq!(store.count().unwrap(), Stats { total: 1, done: 1, not_done: 0 }, "{backend}");
        }
    }
}

mod persistence_tests {
    use super::*;

    #[test]
    fn sqlite_reopen_sees_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.db");
        let id = {
            let mut store = SqliteStore::open(&path).unwrap();
            let task = store.create(milk()).unwrap();
            store.mark_done(task.id).unwrap();
            task.id
        };

        let store = SqliteStore::open(&path).unwrap();
        let task = store.get(id).unwrap().expect("task persisted");
        assert!(task.done);
    }

    #[test]
    fn json_reopen_sees_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let id = {
            let mut store = JsonStore::open(&path).unwrap();
            store
                .create(TaskDraft::new("Walk dog", "2024-01-02", "park", "Basse"))
                .unwrap();
            let task = store.create(milk()).unwrap();
            store.mark_done(task.id).unwrap();
            task.id
        };

        let mut store = JsonStore::open(&path).unwrap();
        assert!(store.get(id).unwrap().unwrap().done);
        let next = store.create(milk()).unwrap();
        assert_eq!(next.id, id + 1);
    }

    #[test]
    fn sqlite_reopen_after_deleting_newest_does_not_reuse_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.db");
        let newest = {
            let mut store = SqliteStore::open(&path).unwrap();
            store.create(milk()).unwrap();
            let newest = store.create(milk()).unwrap();
            assert!(store.delete(newest.id).unwrap());
            newest.id
        };

        let mut store = SqliteStore::open(&path).unwrap();
        let next = store.create(milk()).unwrap();
        assert!(next.id > newest, "id {} was issued again", next.id);
    }

    #[test]
    fn json_reopen_after_deleting_newest_does_not_reuse_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let newest = {
            let mut store = JsonStore::open(&path).unwrap();
            store.create(milk()).unwrap();
            let newest = store.create(milk()).unwrap();
            assert!(store.delete(newest.id).unwrap());
            newest.id
        };

        let mut store = JsonStore::open(&path).unwrap();
        let next = store.create(milk()).unwrap();
        assert!(next.id > newest, "id {} was issued again", next.id);
    }

    #[test]
    fn json_reopen_after_deleting_everything_does_not_reuse_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        {
            let mut store = JsonStore::open(&path).unwrap();
            let task = store.create(milk()).unwrap();
            assert!(store.delete(task.id).unwrap());
        }

        let mut store = JsonStore::open(&path).unwrap();
        assert_eq!(store.count().unwrap().total, 0);
        assert_eq!(store.create(milk()).unwrap().id, 2);
    }
}
