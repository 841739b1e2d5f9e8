//! Scripted sessions through the line-oriented console.

mod common;

use common::{provider, start, ScriptedStore};
use labelsheet_app::console;
use labelsheet_app::manager::TemplateManager;

async fn session(manager: &TemplateManager, script: &str) -> String {
    let mut output = Vec::new();
    console::run(manager, script.as_bytes(), &mut output)
        .await
        .expect("console run");
    String::from_utf8(output).expect("utf-8 output")
}

#[tokio::test]
async fn create_list_and_delete_through_the_console() {
    let manager = start(ScriptedStore::new(), &provider()).await;

    let out = session(
        &manager,
        "set name Sheet1\nset page_size A4\nsave\nlist\nquit\nlist\n",
    )
    .await;
    assert!(out.contains("[ok] Template saved successfully!"), "{out}");
    assert!(out.contains("Sheet1  A4 (210x297mm)  label 50x30mm"), "{out}");
    // Nothing after `quit` runs.
    assert_eq!(out.matches("Sheet1  A4").count(), 1, "{out}");

    let id = manager.templates().await[0].id.clone();
    let out = session(&manager, &format!("delete {id}\nn\n")).await;
    assert!(out.contains("not deleted"), "{out}");
    assert_eq!(manager.templates().await.len(), 1);

    let out = session(&manager, &format!("delete {id}\nyes\nlist\n")).await;
    assert!(out.contains("[ok] Template deleted successfully!"), "{out}");
    assert!(out.contains("no templates yet"), "{out}");
}

#[tokio::test]
async fn invalid_input_is_reported_and_the_form_kept() {
    let manager = start(ScriptedStore::new(), &provider()).await;

    let out = session(&manager, "set label_width -3\nsave\nbogus\nshow\n").await;
    assert!(
        out.contains("[error] Please fill in all fields with valid, positive values."),
        "{out}"
    );
    assert!(out.contains("unknown command `bogus`"), "{out}");
    assert!(out.contains("label_width    : -3"), "{out}");
    assert!(out.contains("== New template =="), "{out}");
}

#[tokio::test]
async fn custom_page_fields_show_only_for_custom_sizes() {
    let manager = start(ScriptedStore::new(), &provider()).await;

    let out = session(&manager, "show\n").await;
    assert!(!out.contains("page_width"), "{out}");

    let out = session(&manager, "set page_size custom\nshow\n").await;
    assert!(out.contains("page_width"), "{out}");
    assert!(out.contains("page_size      : Custom"), "{out}");
}

#[tokio::test]
async fn edit_switches_the_heading_and_cancel_restores_it() {
    let manager = start(ScriptedStore::new(), &provider()).await;
    session(&manager, "set name Draft\nsave\n").await;
    let id = manager.templates().await[0].id.clone();

    let out = session(&manager, &format!("edit {id}\n")).await;
    assert!(out.contains("== Edit template =="), "{out}");
    assert!(out.contains("[Update template]  [Cancel]"), "{out}");

    let out = session(&manager, "cancel\n").await;
    assert!(out.contains("== New template =="), "{out}");
    assert!(out.contains("[Save template]"), "{out}");
}
