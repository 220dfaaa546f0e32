//! File-level behaviour of the configuration store

use std::fs::{self, File};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use clansphere_config::{
    ConfigError, ConfigField, ConfigStore, ConfigValue, FieldRegistry, RuntimeEnvironment,
};
use tempfile::TempDir;

const SAMPLE: &str = "# instance configuration\n\
                      [clansphere]\n\
                      ; padded on purpose\n\
                      clan_tagline = \" hoot hoot \"\n\
                      clan_title = Night Owls\n\
                      smtp_port = abc\n\
                      \n\
                      # news plugin\n\
                      [news]\n\
                      per_page = 15\n\
                      \n\
                      [oldplugin]\n\
                      leftover = yes\n\
                      # end\n";

fn fields() -> Arc<FieldRegistry> {
    let mut fields = FieldRegistry::with_core_fields(RuntimeEnvironment::Production);
    fields
        .register(ConfigField::integer("news/per_page", 10))
        .unwrap();
    Arc::new(fields)
}

fn sample_store() -> (TempDir, ConfigStore) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clansphere.ini");
    fs::write(&path, SAMPLE).unwrap();
    let store = ConfigStore::load(&path, fields()).unwrap();
    (dir, store)
}

fn mtime(store: &ConfigStore) -> SystemTime {
    fs::metadata(store.filename()).unwrap().modified().unwrap()
}

#[test]
fn test_committed_file_round_trips() {
    let (_dir, store) = sample_store();
    store.change_single("theme", "dark").unwrap();
    let written = fs::read_to_string(store.filename()).unwrap();

    let reloaded = ConfigStore::load(store.filename(), fields()).unwrap();
    assert_eq!(reloaded.render(), written);

    // force a rewrite with identical values
    let mut tx = reloaded.edit();
    tx.set_from_string("theme", "dark", true).unwrap();
    tx.commit().unwrap();
    assert_eq!(fs::read_to_string(store.filename()).unwrap(), written);

    let mut empty = reloaded.edit();
    empty.commit().unwrap();
    assert_eq!(fs::read_to_string(store.filename()).unwrap(), written);
}

#[test]
fn test_commit_preserves_comments_and_layout() {
    let (_dir, store) = sample_store();
    store.change_single("news/per_page", 20).unwrap();

    assert_eq!(
        fs::read_to_string(store.filename()).unwrap(),
        "# instance configuration\n\
         [clansphere]\n\
         ; padded on purpose\n\
         clan_tagline = \" hoot hoot \"\n\
         clan_title = Night Owls\n\
         smtp_port = abc\n\
         \n\
         # news plugin\n\
         [news]\n\
         per_page = 20\n\
         \n\
         [oldplugin]\n\
         leftover = yes\n\
         # end\n"
    );
}

#[test]
fn test_defaults_and_malformed_values() {
    let (_dir, store) = sample_store();

    assert_eq!(store.get("cache_timeout").unwrap(), ConfigValue::Integer(300));
    assert_eq!(store.get("clan_tagline").unwrap(), ConfigValue::from(" hoot hoot "));
    assert_eq!(store.get("smtp_port").unwrap(), ConfigValue::Integer(25));
    assert_eq!(store.raw_value("smtp_port").as_deref(), Some("abc"));
    assert_eq!(store.get_int("news/per_page").unwrap(), 15);
}

#[test]
fn test_unknown_key_is_rejected() {
    let (_dir, store) = sample_store();

    assert!(matches!(
        store.get("nonexistent/key"),
        Err(ConfigError::UnknownKey(key)) if key == "nonexistent/key"
    ));
    // stored but unregistered
    assert!(matches!(store.get("oldplugin/leftover"), Err(ConfigError::UnknownKey(_))));
}

#[test]
fn test_setting_current_value_does_not_write() {
    let (_dir, store) = sample_store();
    let before_values = store.raw_values();
    let before_mtime = mtime(&store);

    let mut tx = store.edit();
    tx.set("clan_title", "Night Owls").unwrap();
    tx.set("cache_timeout", 300).unwrap();
    assert!(tx.pending_values().is_empty());
    tx.commit().unwrap();

    assert_eq!(store.raw_values(), before_values);
    assert_eq!(mtime(&store), before_mtime);
    assert!(store.is_default("cache_timeout"));
}

#[test]
fn test_external_change_detection() {
    let (_dir, store) = sample_store();
    assert!(!store.changed_externally());

    let file = File::options().append(true).open(store.filename()).unwrap();
    file.set_modified(SystemTime::now() + Duration::from_secs(60))
        .unwrap();
    drop(file);
    assert!(store.changed_externally());

    store.change_single("theme", "dark").unwrap();
    assert!(!store.changed_externally());
}

#[test]
fn test_touch_flags_other_stores() {
    let (_dir, store) = sample_store();
    let file = File::options().append(true).open(store.filename()).unwrap();
    file.set_modified(SystemTime::now() - Duration::from_secs(120))
        .unwrap();
    drop(file);

    let other = ConfigStore::load(store.filename(), fields()).unwrap();
    assert!(!other.changed_externally());

    store.touch().unwrap();
    assert!(other.changed_externally());
    assert_eq!(fs::read_to_string(store.filename()).unwrap(), SAMPLE);
}

#[test]
fn test_failed_commit_leaves_state_untouched() {
    let (dir, store) = sample_store();
    store.get("news/per_page").unwrap();
    let before_raw = store.raw_values();
    let before_cache = store.cached_values();

    // a directory in place of the file makes the rename fail
    fs::remove_file(store.filename()).unwrap();
    fs::create_dir(store.filename()).unwrap();

    let mut tx = store.edit();
    tx.set("news/per_page", 50).unwrap();
    tx.revert_to_default("clan_title").unwrap();
    let err = tx.commit().unwrap_err();

    assert!(matches!(err, ConfigError::Write { .. }));
    assert!(err.is_internal());
    assert!(!tx.is_committed());
    assert_eq!(store.raw_values(), before_raw);
    assert_eq!(store.cached_values(), before_cache);
    // no temp file left behind
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);

    // the same transaction can be retried once the cause is gone
    fs::remove_dir(store.filename()).unwrap();
    tx.commit().unwrap();
    assert!(tx.is_committed());
    assert_eq!(store.get_int("news/per_page").unwrap(), 50);
    assert!(store.is_default("clan_title"));
    assert!(fs::read_to_string(store.filename())
        .unwrap()
        .contains("per_page = 50\n"));
}

#[test]
fn test_stores_sharing_a_file_commit_independently() {
    let (dir, first) = sample_store();
    let second = ConfigStore::load(first.filename(), fields()).unwrap();

    std::thread::scope(|scope| {
        for (store, prefix) in [(&first, "First"), (&second, "Second")] {
            scope.spawn(move || {
                for round in 0..100 {
                    store
                        .change_single("clan_title", format!("{prefix} {round}"))
                        .unwrap();
                    assert_eq!(
                        store.get_str("clan_title").unwrap(),
                        format!("{prefix} {round}")
                    );
                }
            });
        }
    });

    let reloaded = ConfigStore::load(first.filename(), fields()).unwrap();
    let title = reloaded.get_str("clan_title").unwrap();
    assert!(title == "First 99" || title == "Second 99", "{title}");
    assert_eq!(reloaded.get_int("news/per_page").unwrap(), 15);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_write_into_missing_folder_fails() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::load(dir.path().join("missing/clansphere.ini"), fields()).unwrap();

    let err = store.change_single("theme", "dark").unwrap_err();
    assert!(matches!(err, ConfigError::Write { .. }));
    assert!(store.raw_values().is_empty());
    assert!(!store.exists());
}

#[test]
fn test_readers_see_whole_commits() {
    let (_dir, store) = sample_store();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..50 {
                    let title = store.get_str("clan_title").unwrap();
                    assert!(title == "Night Owls" || title.starts_with("Round "));
                }
            });
        }
        scope.spawn(|| {
            for round in 0..10 {
                store
                    .change_single("clan_title", format!("Round {round}"))
                    .unwrap();
            }
        });
    });

    assert_eq!(store.get_str("clan_title").unwrap(), "Round 9");
}
