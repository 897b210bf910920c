//! Tests for HandlerRegistry
//!
//! These tests verify:
//! - Built-in contents and the `help` listing
//! - Registration rules (lower-cased names, no duplicates)
//! - Alternate registries built for a different command set

use linecmd::handler::{help_text, HELP_HEADER};
use linecmd::store::MemoryStore;
use linecmd::{BackingService, HandlerRegistry, LineCmdError};

// =============================================================================
// Helper Functions
// =============================================================================

fn call(registry: &HandlerRegistry, name: &str, args: &[String]) -> String {
    let store = MemoryStore::new();
    let handler = registry.get(name).expect("command should be registered");
    handler(&store as &dyn BackingService, args)
}

fn ping(_svc: &dyn BackingService, _args: &[String]) -> String {
    "pong\n".to_string()
}

// =============================================================================
// Built-in Registry Tests
// =============================================================================

#[test]
fn test_builtin_names() {
    let registry = HandlerRegistry::with_builtins();

    assert_eq!(
        registry.names(),
        vec!["createdb", "createtable", "dropdb", "droptable", "help", "insert"]
    );
    assert_eq!(registry.len(), 6);
    assert!(!registry.is_empty());
}

#[test]
fn test_exit_is_not_a_registry_entry() {
    let registry = HandlerRegistry::with_builtins();
    assert!(!registry.contains("exit"));
    assert!(registry.get("exit").is_none());
}

#[test]
fn test_lookup_is_by_normalized_name() {
    let registry = HandlerRegistry::with_builtins();
    assert!(registry.contains("createdb"));
    // Lines are lower-cased before lookup; the registry itself is exact
    assert!(!registry.contains("CreateDb"));
}

#[test]
fn test_help_lists_every_command() {
    let registry = HandlerRegistry::with_builtins();
    let response = call(&registry, "help", &[]);

    assert_eq!(
        response,
        "Available Commands:\n\tcreatedb\n\tcreatetable\n\tdropdb\n\tdroptable\n\thelp\n\tinsert\n"
    );
}

#[test]
fn test_help_text_format() {
    assert_eq!(help_text(&["a", "b"]), "Available Commands:\n\ta\n\tb\n");
    assert_eq!(help_text::<&str>(&[]), HELP_HEADER);
}

// =============================================================================
// Builder Tests
// =============================================================================

#[test]
fn test_names_are_lower_cased_on_register() {
    let registry = HandlerRegistry::builder().register("PING", ping).build().unwrap();

    assert!(registry.contains("ping"));
    assert_eq!(call(&registry, "ping", &[]), "pong\n");
}

#[test]
fn test_duplicate_registration_fails() {
    let result = HandlerRegistry::builder()
        .register("ping", ping)
        .register("Ping", ping)
        .build();

    match result {
        Err(LineCmdError::DuplicateCommand(name)) => assert_eq!(name, "ping"),
        other => panic!("Expected duplicate error, got {:?}", other),
    }
}

#[test]
fn test_help_clashes_with_registered_help() {
    let result = HandlerRegistry::builder().register("help", ping).with_help().build();
    assert!(matches!(result, Err(LineCmdError::DuplicateCommand(_))));
}

#[test]
fn test_custom_registry_with_help() {
    let registry = HandlerRegistry::builder()
        .register("ping", ping)
        .register("echo", |_: &dyn BackingService, args: &[String]| format!("{}\n", args.join(" ")))
        .with_help()
        .build()
        .unwrap();

    assert_eq!(registry.names(), vec!["echo", "help", "ping"]);
    assert_eq!(call(&registry, "echo", &["a".to_string(), "b".to_string()]), "a b\n");
    assert_eq!(call(&registry, "help", &[]), "Available Commands:\n\techo\n\thelp\n\tping\n");
}

#[test]
fn test_empty_registry() {
    let registry = HandlerRegistry::builder().build().unwrap();
    assert!(registry.is_empty());
    assert!(registry.names().is_empty());
}

#[test]
fn test_debug_lists_commands() {
    let registry = HandlerRegistry::builder().register("ping", ping).build().unwrap();
    assert_eq!(format!("{:?}", registry), "HandlerRegistry { commands: [\"ping\"] }");
}
