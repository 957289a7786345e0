use needsflow::cli::{offline_catalog, open_directory, parse_input, render_flow_table, schema_exports};

#[test]
fn flow_table_lists_every_flow_with_policy() -> anyhow::Result<()> {
    let catalog = offline_catalog()?;
    let table = render_flow_table(&catalog.definitions());

    assert_eq!(table.lines().count(), 10);
    assert!(table.contains("find_providers_in_conversation"));
    assert!(table.contains("propagate"));
    assert!(table.contains("findProvidersForProject, searchWebForExperts"));
    Ok(())
}

#[test]
fn schema_export_is_json_schema() -> anyhow::Result<()> {
    let exports = schema_exports()?;
    let chat = exports
        .iter()
        .find(|entry| entry.name == "chat")
        .expect("chat flow exported");
    assert_eq!(chat.kind, "flow");
    assert_eq!(chat.input["type"], "object");
    assert_eq!(chat.input["properties"]["history"]["type"], "array");
    Ok(())
}

#[test]
fn input_must_be_json() {
    assert!(parse_input(r#"{ "need": "a mover" }"#).is_ok());
    assert!(parse_input("need=a mover").is_err());
}

#[tokio::test]
async fn default_directory_is_seeded() -> anyhow::Result<()> {
    let store = open_directory(None).await?;
    let movers = store.query("Moving", false).await?;
    assert_eq!(movers.len(), 2);
    Ok(())
}
