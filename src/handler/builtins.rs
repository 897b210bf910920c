//! Built-in command handlers
//!
//! Each handler absorbs backing-service failures and turns them into a
//! response line; nothing here can end a session.

use crate::store::BackingService;

/// Plain function handler, as stored in `BUILTINS`
pub type BuiltinFn = fn(&dyn BackingService, &[String]) -> String;

/// Built-in commands, in registration order
pub const BUILTINS: &[(&str, BuiltinFn)] = &[
    ("createdb", create_db),
    ("dropdb", drop_db),
    ("createtable", create_table),
    ("droptable", drop_table),
    ("insert", insert),
];

/// Response to `insert` with the wrong number of arguments
pub const ARITY_ERROR: &str = "One and only one argument allowed\n";

pub fn create_db(svc: &dyn BackingService, _args: &[String]) -> String {
    match svc.create_database() {
        Ok(()) => "successfully created db\n".to_string(),
        Err(e) => format!("Failed to create db: {}\n", e),
    }
}

pub fn drop_db(svc: &dyn BackingService, _args: &[String]) -> String {
    match svc.drop_database() {
        Ok(()) => "successfully dropped db\n".to_string(),
        Err(e) => format!("failed to drop db: {}\n", e),
    }
}

pub fn create_table(svc: &dyn BackingService, _args: &[String]) -> String {
    match svc.create_table() {
        Ok(()) => "successfully created table\n".to_string(),
        Err(e) => format!("Create table failed: {}\n", e),
    }
}

pub fn drop_table(svc: &dyn BackingService, _args: &[String]) -> String {
    match svc.drop_table() {
        Ok(()) => "successfully dropped table\n".to_string(),
        Err(e) => format!("Drop table failed: {}\n", e),
    }
}

/// `insert:<text>`: exactly one argument
pub fn insert(svc: &dyn BackingService, args: &[String]) -> String {
    let [text] = args else {
        return ARITY_ERROR.to_string();
    };

    match svc.insert_record(text) {
        Ok(()) => format!("successfully inserted {}\n", text),
        Err(e) => format!("Insert failed: {}\n", e),
    }
}
