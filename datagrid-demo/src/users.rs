//! Generated user rows.

use datagrid_lib::model::Record;
use datagrid_lib::model::Value;

const TEAMS: [&str; 3] = ["red", "green", "blue"];

/// Builds `count` users named `User0000`, `User0001`, ...
pub fn generate(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            Record::new()
                .set("id", i)
                .set("name", format!("User{i:04}"))
                .set("team", TEAMS[i % TEAMS.len()])
        })
        .collect()
}

/// Row identity: the `id` column.
pub fn id(_index: usize, row: &Record) -> Value {
    row.get("id").cloned().unwrap_or_default()
}

/// One-line rendering of a row.
pub fn describe(row: &Record) -> String {
    let field = |name| row.get(name).map(Value::to_string).unwrap_or_default();
    format!("#{:<3} {:<9} {}", field("id"), field("name"), field("team"))
}
