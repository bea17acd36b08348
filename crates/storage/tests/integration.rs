//! Integration tests for the storage crate.
//!
//! Uses in-memory SQLite for fast, isolated tests.

use chrono::{Duration, TimeZone, Utc};
use clipkeep_history::{
    ClipFilter, ClipRepository, ContentType, ExclusionRepository, HistorySettings, NewClip,
    SettingsRepository, DEFAULT_EXCLUDED_APPS,
};
use clipkeep_storage::{Database, StorageError};

fn create_test_db() -> Database {
    Database::open_in_memory().expect("Failed to create in-memory database")
}

fn base_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn clip_at(content: &str, ty: ContentType, offset_secs: i64) -> NewClip {
    NewClip::new(content, ty, base_time() + Duration::seconds(offset_secs))
        .with_source_app("com.apple.TextEdit")
}

// =============================================================================
// Database Initialization Tests
// =============================================================================

mod initialization {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok(), "Should create in-memory database");
    }

    #[test]
    fn test_open_file_database() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        let db = Database::open(&db_path);
        assert!(db.is_ok(), "Should create file-based database");
        assert!(db_path.exists(), "Database file should exist");
    }

    #[test]
    fn test_reopen_existing_database() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        {
            let db = Database::open(&db_path).unwrap();
            db.append(clip_at("persisted", ContentType::Text, 0)).unwrap();
            db.add_exclusion("com.example.vault", Some("Vault")).unwrap();
        }

        {
            let db = Database::open(&db_path).unwrap();
            let clips = db.list(&ClipFilter::all(), 10).unwrap();
            assert_eq!(clips.len(), 1, "Clip should persist after reopen");
            assert_eq!(clips[0].content, "persisted");
            assert!(db.is_excluded("com.example.vault").unwrap());
        }
    }

    #[test]
    fn test_invalid_path_fails() {
        let result = Database::open(&PathBuf::from("/nonexistent/path/db.sqlite"));
        assert!(result.is_err(), "Should fail with invalid path");
    }
}

// =============================================================================
// Clip Repository Tests
// =============================================================================

mod clips {
    use super::*;

    #[test]
    fn test_append_assigns_increasing_ids() {
        let db = create_test_db();

        let a = db.append(clip_at("a", ContentType::Text, 0)).unwrap();
        let b = db.append(clip_at("b", ContentType::Text, 1)).unwrap();
        let c = db.append(clip_at("c", ContentType::Text, 2)).unwrap();

        assert!(a.id < b.id && b.id < c.id);
        assert!(!a.pinned);
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let db = create_test_db();

        let a = db.append(clip_at("a", ContentType::Text, 0)).unwrap();
        db.delete(a.id).unwrap();
        let b = db.append(clip_at("b", ContentType::Text, 1)).unwrap();

        assert!(b.id > a.id);
    }

    #[test]
    fn test_append_and_get_roundtrip_all_fields() {
        let db = create_test_db();
        let clip = clip_at("[Image]", ContentType::Image, 0)
            .with_preview_bytes(vec![0x89, b'P', b'N', b'G'])
            .with_metadata(serde_json::json!({"format": "png", "bytes": 4}));

        let stored = db.append(clip).unwrap();
        let fetched = db.get(stored.id).unwrap();

        assert_eq!(fetched, stored);
        assert_eq!(fetched.content_type, ContentType::Image);
        assert_eq!(fetched.source_app.as_deref(), Some("com.apple.TextEdit"));
        assert_eq!(fetched.captured_at, base_time());
        assert_eq!(fetched.preview_bytes, Some(vec![0x89, b'P', b'N', b'G']));
        assert_eq!(fetched.metadata.unwrap()["format"], "png");
    }

    #[test]
    fn test_get_nonexistent_clip() {
        let db = create_test_db();
        assert!(matches!(db.get(42), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_list_empty() {
        let db = create_test_db();
        assert!(db.list(&ClipFilter::all(), 10).unwrap().is_empty());
    }

    #[test]
    fn test_list_newest_first() {
        let db = create_test_db();
        db.append(clip_at("First", ContentType::Text, 0)).unwrap();
        db.append(clip_at("Second", ContentType::Text, 10)).unwrap();
        db.append(clip_at("Third", ContentType::Text, 20)).unwrap();

        let clips = db.list(&ClipFilter::all(), 10).unwrap();
        let contents: Vec<_> = clips.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, ["Third", "Second", "First"]);
    }

    #[test]
    fn test_list_pinned_first() {
        let db = create_test_db();
        let old = db.append(clip_at("old", ContentType::Text, 0)).unwrap();
        db.append(clip_at("mid", ContentType::Text, 10)).unwrap();
        db.append(clip_at("new", ContentType::Text, 20)).unwrap();
        db.set_pinned(old.id, true).unwrap();

        let clips = db.list(&ClipFilter::all(), 10).unwrap();
        let contents: Vec<_> = clips.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, ["old", "new", "mid"]);
        assert!(clips[0].pinned);
    }

    #[test]
    fn test_list_respects_limit() {
        let db = create_test_db();
        for i in 0..5 {
            db.append(clip_at(&format!("clip {i}"), ContentType::Text, i)).unwrap();
        }

        let clips = db.list(&ClipFilter::all(), 3).unwrap();
        assert_eq!(clips.len(), 3);
        assert_eq!(clips[0].content, "clip 4");
        assert!(db.list(&ClipFilter::all(), 0).unwrap().is_empty());
    }

    #[test]
    fn test_list_filter_by_type() {
        let db = create_test_db();
        db.append(clip_at("hello", ContentType::Text, 0)).unwrap();
        db.append(clip_at("https://example.com", ContentType::Url, 1)).unwrap();
        db.append(clip_at("#FF00AA", ContentType::Color, 2)).unwrap();

        let urls = db.list(&ClipFilter::all().of_type(ContentType::Url), 10).unwrap();
        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0].content, "https://example.com");
    }

    #[test]
    fn test_list_keyword_is_case_insensitive() {
        let db = create_test_db();
        db.append(clip_at("Hello World", ContentType::Text, 0)).unwrap();
        db.append(clip_at("goodbye", ContentType::Text, 1)).unwrap();
        db.append(clip_at("ÉCOLE élève", ContentType::Text, 2)).unwrap();

        let hits = db.list(&ClipFilter::all().with_keyword("hello"), 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].content, "Hello World");

        let accented = db.list(&ClipFilter::all().with_keyword("école"), 10).unwrap();
        assert_eq!(accented.len(), 1);
    }

    #[test]
    fn test_list_keyword_and_type_combine() {
        let db = create_test_db();
        db.append(clip_at("example notes", ContentType::Text, 0)).unwrap();
        db.append(clip_at("https://example.com", ContentType::Url, 1)).unwrap();
        db.append(clip_at("https://rust-lang.org", ContentType::Url, 2)).unwrap();

        let filter = ClipFilter::all().of_type(ContentType::Url).with_keyword("EXAMPLE");
        let hits = db.list(&filter, 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].content, "https://example.com");
    }

    #[test]
    fn test_keyword_limit_applies_after_filtering() {
        let db = create_test_db();
        for i in 0..10 {
            let content = if i % 2 == 0 { format!("match {i}") } else { format!("other {i}") };
            db.append(clip_at(&content, ContentType::Text, i)).unwrap();
        }

        let hits = db.list(&ClipFilter::all().with_keyword("match"), 3).unwrap();
        let contents: Vec<_> = hits.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, ["match 8", "match 6", "match 4"]);
    }

    #[test]
    fn test_keyword_search_over_images_keeps_matching_previews() {
        let db = create_test_db();
        for i in 0..5 {
            let mut clip = clip_at(&format!("screenshot {i}"), ContentType::Image, i);
            clip.preview_bytes = Some(vec![i as u8; 4096]);
            db.append(clip).unwrap();
        }
        db.append(clip_at("shot notes", ContentType::Text, 10)).unwrap();

        let hits = db.list(&ClipFilter::all().with_keyword("SCREENSHOT 3"), 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].preview_bytes.as_deref(), Some(&[3u8; 4096][..]));

        let shots = db.list(&ClipFilter::all().with_keyword("shot"), 2).unwrap();
        let contents: Vec<_> = shots.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, ["shot notes", "screenshot 4"]);
        assert_eq!(shots[0].preview_bytes, None);
        assert_eq!(shots[1].preview_bytes.as_ref().map(Vec::len), Some(4096));
    }

    #[test]
    fn test_recent_ignores_pin_order() {
        let db = create_test_db();
        let old = db.append(clip_at("old", ContentType::Text, 0)).unwrap();
        db.append(clip_at("new", ContentType::Text, 10)).unwrap();
        db.set_pinned(old.id, true).unwrap();

        let recent = db.recent(1).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].content, "new");
    }

    #[test]
    fn test_set_pinned_is_idempotent() {
        let db = create_test_db();
        let clip = db.append(clip_at("pin me", ContentType::Text, 0)).unwrap();

        db.set_pinned(clip.id, true).unwrap();
        let once = db.get(clip.id).unwrap();
        db.set_pinned(clip.id, true).unwrap();
        let twice = db.get(clip.id).unwrap();

        assert_eq!(once, twice);
        assert!(twice.pinned);

        db.set_pinned(clip.id, false).unwrap();
        assert!(!db.get(clip.id).unwrap().pinned);
    }

    #[test]
    fn test_set_pinned_nonexistent() {
        let db = create_test_db();
        assert!(matches!(db.set_pinned(7, true), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_delete_clip() {
        let db = create_test_db();
        let clip = db.append(clip_at("bye", ContentType::Text, 0)).unwrap();

        db.delete(clip.id).unwrap();
        assert!(matches!(db.get(clip.id), Err(StorageError::NotFound(_))));
        assert!(matches!(db.delete(clip.id), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_delete_all_includes_pinned() {
        let db = create_test_db();
        let a = db.append(clip_at("a", ContentType::Text, 0)).unwrap();
        db.append(clip_at("b", ContentType::Text, 1)).unwrap();
        db.set_pinned(a.id, true).unwrap();

        assert_eq!(db.delete_all().unwrap(), 2);
        assert_eq!(db.count().unwrap(), 0);
    }
}

// =============================================================================
// Cleanup Tests
// =============================================================================

mod cleanup {
    use super::*;

    #[test]
    fn test_purge_removes_only_old_unpinned() {
        let db = create_test_db();
        let old_pinned = db.append(clip_at("old pinned", ContentType::Text, 0)).unwrap();
        db.append(clip_at("old", ContentType::Text, 1)).unwrap();
        db.append(clip_at("fresh", ContentType::Text, 100)).unwrap();
        db.set_pinned(old_pinned.id, true).unwrap();

        let threshold = base_time() + Duration::seconds(50);
        let removed = db.purge_older_than(threshold).unwrap();
        assert_eq!(removed, 1);

        let remaining = db.list(&ClipFilter::all(), 10).unwrap();
        assert_eq!(remaining.len(), 2);
        for clip in &remaining {
            assert!(clip.pinned || clip.captured_at >= threshold);
        }
        assert!(remaining.iter().any(|c| c.id == old_pinned.id));
    }

    #[test]
    fn test_purge_threshold_is_exclusive() {
        let db = create_test_db();
        db.append(clip_at("boundary", ContentType::Text, 0)).unwrap();

        assert_eq!(db.purge_older_than(base_time()).unwrap(), 0);
        assert_eq!(db.count().unwrap(), 1);
    }

    #[test]
    fn test_trim_keeps_newest_unpinned_and_all_pinned() {
        let db = create_test_db();
        let pinned = db.append(clip_at("pinned", ContentType::Text, 0)).unwrap();
        db.set_pinned(pinned.id, true).unwrap();
        for i in 1..=5 {
            db.append(clip_at(&format!("clip {i}"), ContentType::Text, i)).unwrap();
        }

        let removed = db.trim_to(2).unwrap();
        assert_eq!(removed, 3);

        let remaining = db.list(&ClipFilter::all(), 10).unwrap();
        let contents: Vec<_> = remaining.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, ["pinned", "clip 5", "clip 4"]);
    }

    #[test]
    fn test_trim_noop_under_cap() {
        let db = create_test_db();
        db.append(clip_at("only", ContentType::Text, 0)).unwrap();
        assert_eq!(db.trim_to(10).unwrap(), 0);
    }
}

// =============================================================================
// Exclusion Repository Tests
// =============================================================================

mod exclusions {
    use super::*;

    #[test]
    fn test_add_and_check() {
        let db = create_test_db();
        assert!(!db.is_excluded("com.example.vault").unwrap());

        assert!(db.add_exclusion("com.example.vault", Some("Vault")).unwrap());
        assert!(db.is_excluded("com.example.vault").unwrap());
        assert!(!db.is_excluded("com.example.other").unwrap());
    }

    #[test]
    fn test_add_is_idempotent() {
        let db = create_test_db();
        assert!(db.add_exclusion("com.example.vault", None).unwrap());
        assert!(!db.add_exclusion("com.example.vault", Some("Vault")).unwrap());
        assert_eq!(db.list_exclusions().unwrap().len(), 1);
    }

    #[test]
    fn test_add_rejects_blank_identifier() {
        let db = create_test_db();
        assert!(matches!(
            db.add_exclusion("  ", None),
            Err(StorageError::InvalidData(_))
        ));
    }

    #[test]
    fn test_empty_identifier_never_excluded() {
        let db = create_test_db();
        assert!(!db.is_excluded("").unwrap());
    }

    #[test]
    fn test_remove_and_clear() {
        let db = create_test_db();
        db.add_exclusion("a.app", None).unwrap();
        db.add_exclusion("b.app", None).unwrap();

        assert!(db.remove_exclusion("a.app").unwrap());
        assert!(!db.remove_exclusion("a.app").unwrap());
        assert!(!db.is_excluded("a.app").unwrap());

        assert_eq!(db.clear_exclusions().unwrap(), 1);
        assert!(db.list_exclusions().unwrap().is_empty());
    }

    #[test]
    fn test_list_preserves_display_name() {
        let db = create_test_db();
        db.add_exclusion("com.example.vault", Some("Vault")).unwrap();

        let entries = db.list_exclusions().unwrap();
        assert_eq!(entries[0].app_identifier, "com.example.vault");
        assert_eq!(entries[0].display_name.as_deref(), Some("Vault"));
    }

    #[test]
    fn test_seed_defaults_once() {
        let db = create_test_db();

        let inserted = db.seed_default_exclusions().unwrap();
        assert_eq!(inserted, DEFAULT_EXCLUDED_APPS.len());
        for (bundle_id, _) in DEFAULT_EXCLUDED_APPS {
            assert!(db.is_excluded(bundle_id).unwrap());
        }

        // A user removal survives later seeding attempts.
        let (removed, _) = DEFAULT_EXCLUDED_APPS[0];
        db.remove_exclusion(removed).unwrap();
        assert_eq!(db.seed_default_exclusions().unwrap(), 0);
        assert!(!db.is_excluded(removed).unwrap());
    }
}

// =============================================================================
// Settings Tests
// =============================================================================

mod settings {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let db = create_test_db();
        assert_eq!(db.history_settings().unwrap(), HistorySettings::default());
    }

    #[test]
    fn test_save_and_load() {
        let db = create_test_db();
        let settings = HistorySettings {
            retention_days: 7,
            max_items: 50,
            auto_cleanup: false,
        };

        db.save_history_settings(&settings).unwrap();
        assert_eq!(db.history_settings().unwrap(), settings);
    }

    #[test]
    fn test_raw_setting_overwrite() {
        let db = create_test_db();
        assert_eq!(db.get_setting("theme").unwrap(), None);

        db.set_setting("theme", "dark").unwrap();
        db.set_setting("theme", "light").unwrap();
        assert_eq!(db.get_setting("theme").unwrap().as_deref(), Some("light"));
    }
}

// =============================================================================
// Concurrency Tests
// =============================================================================

mod concurrency {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    const WRITERS: usize = 4;
    const PER_WRITER: usize = 25;

    #[test]
    fn test_concurrent_appends_get_unique_increasing_ids() {
        let db = Arc::new(create_test_db());

        let handles: Vec<_> = (0..WRITERS)
            .map(|w| {
                let db = Arc::clone(&db);
                thread::spawn(move || {
                    let mut ids = Vec::with_capacity(PER_WRITER);
                    for i in 0..PER_WRITER {
                        let offset = (w * PER_WRITER + i) as i64;
                        let clip = db
                            .append(clip_at(&format!("writer {w} clip {i}"), ContentType::Text, offset))
                            .unwrap();
                        ids.push(clip.id);
                    }
                    ids
                })
            })
            .collect();

        let mut all_ids = HashSet::new();
        for handle in handles {
            let ids = handle.join().expect("writer thread panicked");
            assert!(ids.windows(2).all(|w| w[0] < w[1]), "ids must increase per writer");
            for id in ids {
                assert!(all_ids.insert(id), "duplicate id {id}");
            }
        }

        assert_eq!(all_ids.len(), WRITERS * PER_WRITER);
        assert_eq!(db.count().unwrap(), WRITERS * PER_WRITER);
    }

    #[test]
    fn test_reads_and_pins_alongside_appends() {
        let db = Arc::new(create_test_db());
        let seed = db.append(clip_at("seed", ContentType::Text, 0)).unwrap();

        let writer = {
            let db = Arc::clone(&db);
            thread::spawn(move || {
                for i in 1..=50 {
                    db.append(clip_at(&format!("clip {i}"), ContentType::Text, i)).unwrap();
                }
            })
        };

        let readers: Vec<_> = (0..3)
            .map(|r| {
                let db = Arc::clone(&db);
                thread::spawn(move || {
                    for i in 0..50 {
                        let listed = db.list(&ClipFilter::all(), 20).unwrap();
                        let ids: HashSet<_> = listed.iter().map(|c| c.id).collect();
                        assert_eq!(ids.len(), listed.len(), "listing returned a duplicate");
                        assert!(
                            listed.windows(2).all(|w| w[0].pinned >= w[1].pinned),
                            "pinned records must come first"
                        );
                        db.set_pinned(seed.id, (r + i) % 2 == 0).unwrap();
                    }
                })
            })
            .collect();

        writer.join().expect("writer thread panicked");
        for reader in readers {
            reader.join().expect("reader thread panicked");
        }

        assert_eq!(db.count().unwrap(), 51);
        assert!(db.get(seed.id).is_ok());
    }
}
