//! End-to-end resolution: sources → load → merge → per-item decisions.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::Path;

use pimgate::ConfigError;
use pimgate::config::{
    BaseSource, CONFIG_DIR_ENV, Configuration, Domain, DomainAccess, FilterMode, MapEnv,
    PROFILE_ENV, ProfileOverride, SourceKind, SourceOverrides, filter, format_show, init_config,
    is_allowed, load_for, load_resolved, resolve, write_config, write_profile,
};

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("mkdir");
    }
    std::fs::write(path, contents).expect("write");
}

#[test]
fn no_config_file_allows_everything() {
    let dir = tempfile::tempdir().expect("tempdir");
    let env = MapEnv::new()
        .with_home("/home/ada")
        .with_var(CONFIG_DIR_ENV, dir.path().to_string_lossy());

    let resolution = resolve(&SourceOverrides::none(), None, None, &env);
    assert_eq!(resolution.config_dir_source, SourceKind::Environment);

    let loaded = load_for(&resolution).expect("load");
    assert_eq!(loaded.base_source, BaseSource::Defaults);
    for &domain in Domain::all() {
        assert!(loaded.config.is_enabled(domain), "{domain}");
    }
    for access in [
        &loaded.config.calendars,
        &loaded.config.reminders,
        &loaded.config.contacts,
    ] {
        assert!(access.enabled);
        assert_eq!(access.mode, FilterMode::All);
    }
    assert!(is_allowed("Personal", None, &loaded.config.calendars));
}

#[test]
fn blocklisted_calendars_are_hidden() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(
        &dir.path().join("config.json"),
        r#"{"calendars": {"enabled": true, "mode": "blocklist", "items": ["Holidays", "Birthdays"]}}"#,
    );

    let loaded = load_resolved(dir.path(), None).expect("load");
    assert_eq!(loaded.base_source, BaseSource::File);
    assert!(!is_allowed("Holidays", None, &loaded.config.calendars));
    assert!(is_allowed("Personal", None, &loaded.config.calendars));
    assert!(!loaded.config.allows_calendar("🎂 Birthdays", None));
}

#[test]
fn missing_profile_fails_closed() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(
        &dir.path().join("config.json"),
        r#"{"calendars": {"mode": "all"}}"#,
    );

    let err = load_resolved(dir.path(), Some("travel")).expect_err("should fail");
    match &err {
        ConfigError::ProfileNotFound { name, searched } => {
            assert_eq!(name, "travel");
            assert_eq!(searched, &dir.path().join("profiles"));
        }
        other => panic!("unexpected error: {other}"),
    }
    let message = err.to_string();
    assert!(message.contains("travel"), "{message}");
    assert!(message.contains("profiles"), "{message}");
}

#[test]
fn profile_from_environment_restricts_view() {
    let dir = tempfile::tempdir().expect("tempdir");
    let base = Configuration {
        calendars: DomainAccess::allowlist(["A", "B", "C"]),
        reminders: DomainAccess::blocklist(["Private"]),
        ..Configuration::default()
    };
    write_config(dir.path(), &base).expect("write config");
    write_profile(
        dir.path(),
        "agent-1",
        &ProfileOverride {
            calendars: Some(DomainAccess::allowlist(["B"])),
            ..ProfileOverride::default()
        },
    )
    .expect("write profile");

    let env = MapEnv::new()
        .with_var(CONFIG_DIR_ENV, dir.path().to_string_lossy())
        .with_var(PROFILE_ENV, "agent-1");
    let resolution = resolve(&SourceOverrides::none(), None, None, &env);
    let loaded = load_for(&resolution).expect("load");

    assert_eq!(loaded.profile.as_deref(), Some("agent-1"));
    assert_eq!(loaded.config.calendars.items, vec!["B".to_owned()]);
    assert_eq!(loaded.config.reminders, base.reminders);
    assert!(!loaded.config.allows_calendar("A", None));
    assert!(loaded.config.allows_calendar("b", None));
}

#[test]
fn profile_default_calendar_wins_over_initialized_base() {
    let dir = tempfile::tempdir().expect("tempdir");
    init_config(dir.path(), &["Work".to_owned()], &["Inbox".to_owned()]).expect("init");
    write(
        &dir.path().join("profiles/travel.json"),
        r#"{"default_calendar": "Travel"}"#,
    );

    let loaded = load_resolved(dir.path(), Some("travel")).expect("load");
    assert_eq!(loaded.config.effective_default_calendar(), Some("Travel"));
    assert_eq!(loaded.config.effective_default_reminder_list(), Some("Inbox"));

    let shown = format_show(
        &loaded.config,
        &loaded.config_path,
        &loaded.profiles_dir,
        loaded.profile.as_deref(),
        None,
    );
    assert!(shown.contains("Default calendar:       Travel"), "{shown}");
}

#[test]
fn call_parameter_profile_overrides_environment() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(
        &dir.path().join("profiles/work.json"),
        r#"{"contacts": {"enabled": false}}"#,
    );
    let env = MapEnv::new()
        .with_var(CONFIG_DIR_ENV, dir.path().to_string_lossy())
        .with_var(PROFILE_ENV, "does-not-exist");

    let call = SourceOverrides::none().with_profile("work");
    let loaded = load_for(&resolve(&call, None, None, &env)).expect("load");
    assert!(!loaded.config.is_enabled(Domain::Contacts));

    let err = load_for(&resolve(&SourceOverrides::none(), None, None, &env))
        .expect_err("environment profile is missing");
    assert!(matches!(err, ConfigError::ProfileNotFound { .. }));
}

#[test]
fn traversal_profile_name_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(&dir.path().join("config.json"), "{}");
    let call = SourceOverrides::none()
        .with_config_dir(dir.path().to_string_lossy())
        .with_profile("../config");
    let err = load_for(&resolve(&call, None, None, &MapEnv::new())).expect_err("should fail");
    assert!(matches!(err, ConfigError::InvalidProfileName { .. }), "{err}");
}

#[test]
fn workspace_convention_is_picked_up() {
    let ws = tempfile::tempdir().expect("tempdir");
    write(
        &ws.path().join("pimgate/config.json"),
        r#"{"mail": {"enabled": false}}"#,
    );
    let env = MapEnv::new().with_var(CONFIG_DIR_ENV, "/nonexistent/pimgate");

    let resolution = resolve(&SourceOverrides::none(), Some(ws.path()), None, &env);
    assert_eq!(resolution.config_dir_source, SourceKind::Workspace);
    let loaded = load_for(&resolution).expect("load");
    assert!(!loaded.config.is_enabled(Domain::Mail));
}

#[test]
fn isolated_agents_resolve_concurrently() {
    let root = tempfile::tempdir().expect("tempdir");
    for (agent, calendar) in [("one", "Work"), ("two", "Home")] {
        write_config(
            &root.path().join(agent),
            &Configuration {
                calendars: DomainAccess::allowlist([calendar]),
                ..Configuration::default()
            },
        )
        .expect("write");
    }

    let handles: Vec<_> = [("one", "Work", "Home"), ("two", "Home", "Work")]
        .into_iter()
        .map(|(agent, visible, hidden)| {
            let dir = root.path().join(agent);
            std::thread::spawn(move || {
                for _ in 0..20 {
                    let call = SourceOverrides::none().with_config_dir(dir.to_string_lossy());
                    let loaded =
                        load_for(&resolve(&call, None, None, &MapEnv::new())).expect("load");
                    assert!(loaded.config.allows_calendar(visible, None));
                    assert!(!loaded.config.allows_calendar(hidden, None));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("thread");
    }
}

#[derive(Debug)]
struct ReminderList {
    id: &'static str,
    title: &'static str,
}

#[test]
fn filtering_reminder_lists_keeps_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(
        &dir.path().join("config.json"),
        r#"{"reminders": {"mode": "allowlist", "items": ["Groceries", "x-42"]}}"#,
    );
    let loaded = load_resolved(dir.path(), None).expect("load");

    let lists = [
        ReminderList { id: "x-1", title: "Work" },
        ReminderList { id: "x-42", title: "Someday" },
        ReminderList { id: "x-7", title: "🛒 Groceries" },
    ];
    let visible = filter(
        &lists,
        &loaded.config.reminders,
        |l| l.title,
        |l| Some(l.id),
    );
    let titles: Vec<&str> = visible.iter().map(|l| l.title).collect();
    assert_eq!(titles, vec!["Someday", "🛒 Groceries"]);
}
