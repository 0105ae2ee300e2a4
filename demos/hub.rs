//! Decode a document into nested structs, inspect it, re-render it.
//!
//! Run with: `cargo run --example hub`

use structon::{detach, from_str, schema, to_string_pretty};

#[derive(Debug, Default)]
struct Project {
    id: i32,
    name: Option<String>,
}

schema! {
    Project {
        id: int,
        name: string,
    }
}

#[derive(Debug, Default)]
struct Hub {
    id: i32,
    user: Option<String>,
    project: Option<Box<Project>>,
}

schema! {
    Hub {
        id: int,
        user: string,
        project: nested(Project),
    }
}

fn main() -> structon::Result<()> {
    let text = r#"{"id": 1, "user": "Ada", "project": {"id": 2, "name": "core"}}"#;

    let mut hub = from_str::<Hub>(text)?.expect("document is not null");
    println!(
        "hub: id: {}, user: {}, project id: {}, project name: {}",
        hub.id,
        hub.user.as_deref().unwrap_or("-"),
        hub.project.as_ref().map_or(0, |p| p.id),
        hub.project
            .as_ref()
            .and_then(|p| p.name.as_deref())
            .unwrap_or("-"),
    );

    println!("formatted: {}", to_string_pretty(&*hub)?);

    // The project subtree can outlive the hub.
    let project: Box<Project> = detach(&mut *hub, "project").expect("project present");
    drop(hub);
    println!("detached project: {:?}", project);

    Ok(())
}
