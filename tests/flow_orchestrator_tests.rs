use std::sync::Arc;

use needsflow::directory::default_entries;
use needsflow::flow::constants::{chat, failures, provider_finder};
use needsflow::tools::web_search::NOT_CONFIGURED_ANSWER;
use needsflow::tools::{DIRECTORY_LOOKUP_TOOL, WEB_SEARCH_TOOL};
use needsflow::{
    AnalyzeNeedInput, ChatInput, ConversationTurn, DescribeImageInput, DocumentRolesInput,
    FindProfilesInput, FlowCatalog, FlowError, HiringAssistantInput, LinkedInPostInput,
    LlmResponse, MemoryDirectory, ProviderSearchInput, ScriptedClient, GENERIC_CALLER_MESSAGE,
};
use serde_json::json;

fn catalog_with(client: Arc<ScriptedClient>) -> anyhow::Result<FlowCatalog> {
    Ok(FlowCatalog::builder()
        .llm(client)
        .directory(Arc::new(MemoryDirectory::with_entries(default_entries())))
        .build()?)
}

fn chat_input(message: &str) -> ChatInput {
    ChatInput {
        history: vec![
            ConversationTurn::user("hi"),
            ConversationTurn::assistant("Hello! How can I help?"),
        ],
        new_message: message.to_string(),
    }
}

#[tokio::test]
async fn chat_short_circuits_with_found_providers() -> anyhow::Result<()> {
    let client = Arc::new(ScriptedClient::new().then(LlmResponse::tool_call(
        DIRECTORY_LOOKUP_TOOL,
        json!({ "category": "Plumbing" }),
    )));
    let catalog = catalog_with(client.clone())?;

    let output = catalog.chat(chat_input("my sink is leaking")).await?;
    assert_eq!(output.response, chat::PROVIDERS_FOUND);
    let providers = output.matched_providers.expect("providers attached");
    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0].name, "Fix-It-Fast");
    assert_eq!(client.call_count(), 1);

    let prompt = &client.requests()[0].prompt;
    assert!(prompt.contains("assistant: Hello! How can I help?"));
    assert!(prompt.contains("user: my sink is leaking"));
    Ok(())
}

#[tokio::test]
async fn chat_reports_empty_lookup_without_provider_list() -> anyhow::Result<()> {
    let client = Arc::new(ScriptedClient::new().then(LlmResponse::tool_call(
        DIRECTORY_LOOKUP_TOOL,
        json!({ "category": "Events" }),
    )));
    let catalog = catalog_with(client)?;

    let output = catalog.chat(chat_input("plan my wedding")).await?;
    assert_eq!(output.response, chat::NO_PROVIDERS);
    assert!(output.matched_providers.is_none());
    Ok(())
}

#[tokio::test]
async fn chat_plain_answer_drops_model_provider_list() -> anyhow::Result<()> {
    let client = Arc::new(ScriptedClient::new().then(LlmResponse::output(json!({
        "response": "Paris is the capital of France.",
        "matchedProviders": []
    }))));
    let catalog = catalog_with(client)?;

    let output = catalog.chat(chat_input("capital of France?")).await?;
    assert_eq!(output.response, "Paris is the capital of France.");
    assert!(output.matched_providers.is_none());
    Ok(())
}

#[tokio::test]
async fn chat_degrades_to_apology_on_failure() -> anyhow::Result<()> {
    let catalog = catalog_with(Arc::new(ScriptedClient::new().then_fail("503")))?;
    let output = catalog.chat(chat_input("hello")).await?;
    assert_eq!(output.response, chat::DEGRADED);

    // empty model output degrades the same way
    let catalog = catalog_with(Arc::new(ScriptedClient::new()))?;
    let output = catalog.chat(chat_input("hello")).await?;
    assert_eq!(output.response, chat::DEGRADED);
    Ok(())
}

#[tokio::test]
async fn tool_outside_flow_allow_list_is_rejected() -> anyhow::Result<()> {
    let client = Arc::new(ScriptedClient::new().then(LlmResponse::tool_call(
        WEB_SEARCH_TOOL,
        json!({ "query": "anything" }),
    )));
    let catalog = catalog_with(client)?;

    let output = catalog.chat(chat_input("search the web")).await?;
    assert_eq!(output.response, chat::DEGRADED);
    Ok(())
}

#[tokio::test]
async fn provider_finder_short_circuits_on_lookup() -> anyhow::Result<()> {
    let client = Arc::new(ScriptedClient::new().then(LlmResponse::tool_call(
        DIRECTORY_LOOKUP_TOOL,
        json!({ "category": "Tutoring" }),
    )));
    let catalog = catalog_with(client)?;

    let output = catalog
        .find_providers_in_conversation(ProviderSearchInput {
            need: "math help for my son".into(),
        })
        .await?;
    assert_eq!(output.response, provider_finder::PROVIDERS_FOUND);
    assert_eq!(output.matched_providers.map(|p| p.len()), Some(1));

    let client = Arc::new(ScriptedClient::new().then(LlmResponse::tool_call(
        DIRECTORY_LOOKUP_TOOL,
        json!({ "category": "Astrology" }),
    )));
    let catalog = catalog_with(client)?;
    let output = catalog
        .find_providers_in_conversation(ProviderSearchInput {
            need: "read my stars".into(),
        })
        .await?;
    assert_eq!(output.response, provider_finder::NO_PROVIDERS);
    assert_eq!(output.matched_providers, Some(vec![]));
    Ok(())
}

#[tokio::test]
async fn provider_finder_direct_answer_carries_empty_provider_list() -> anyhow::Result<()> {
    let client = Arc::new(ScriptedClient::new().then(LlmResponse::output(json!({
        "response": "Could you tell me a bit more about the job?"
    }))));
    let catalog = catalog_with(client)?;

    let output = catalog
        .find_providers_in_conversation(ProviderSearchInput {
            need: "help".into(),
        })
        .await?;
    assert_eq!(output.response, "Could you tell me a bit more about the job?");
    assert_eq!(output.matched_providers, Some(vec![]));

    let value = serde_json::to_value(&output)?;
    assert_eq!(value["matchedProviders"], json!([]));
    Ok(())
}

#[tokio::test]
async fn provider_finder_asks_to_rephrase_on_silence() -> anyhow::Result<()> {
    let catalog = catalog_with(Arc::new(ScriptedClient::new()))?;
    let output = catalog
        .find_providers_in_conversation(ProviderSearchInput {
            need: "something vague".into(),
        })
        .await?;
    assert_eq!(output.response, provider_finder::REPHRASE);
    assert!(output.matched_providers.is_none());
    Ok(())
}

#[tokio::test]
async fn provider_finder_propagates_raw_errors() -> anyhow::Result<()> {
    let catalog = catalog_with(Arc::new(ScriptedClient::new().then_fail("quota exceeded")))?;
    let err = catalog
        .find_providers_in_conversation(ProviderSearchInput {
            need: "a mover".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::Generation(ref detail) if detail == "quota exceeded"));
    Ok(())
}

#[tokio::test]
async fn analyze_need_feeds_tool_results_back_and_renders_html() -> anyhow::Result<()> {
    let client = Arc::new(
        ScriptedClient::new()
            .then(LlmResponse::tool_call(
                WEB_SEARCH_TOOL,
                json!({ "query": "trip from Bengaluru to Bidar" }),
            ))
            .then(LlmResponse::output(json!({
                "summary": "Take the overnight train.",
                "steps": [{ "title": "Book", "description": "Reserve a sleeper." }],
                "additionalInfo": "**Tip:** see [IRCTC](https://www.irctc.co.in)"
            }))),
    );
    let catalog = catalog_with(client.clone())?;

    let output = catalog
        .analyze_need(AnalyzeNeedInput {
            description: "plan a trip from Bengaluru to Bidar".into(),
            image_data_uri: None,
        })
        .await?;
    assert_eq!(output.summary, "Take the overnight train.");
    assert_eq!(output.steps.as_ref().map(Vec::len), Some(1));
    let info = output.additional_info.expect("additional info");
    assert!(info.contains("<strong>Tip:</strong>"));
    assert!(info.contains(r#"<a href="https://www.irctc.co.in">IRCTC</a>"#));

    let requests = client.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].tools.len(), 2);
    assert!(requests[0].tool_results.is_empty());
    assert_eq!(requests[1].tool_results.len(), 1);
    assert_eq!(requests[1].tool_results[0].output["answer"], NOT_CONFIGURED_ANSWER);
    Ok(())
}

#[tokio::test]
async fn undeclared_output_keys_are_dropped_not_rejected() -> anyhow::Result<()> {
    let client = Arc::new(ScriptedClient::new().then(LlmResponse::output(json!({
        "summary": "ok",
        "confidence": 0.9,
        "steps": [{ "title": "Call", "description": "Phone a plumber.", "priority": 1 }]
    }))));
    let catalog = catalog_with(client)?;

    let output = catalog
        .analyze_need(AnalyzeNeedInput {
            description: "my sink is leaking".into(),
            image_data_uri: None,
        })
        .await?;
    assert_eq!(output.summary, "ok");
    assert_eq!(output.steps.map(|steps| steps[0].title.clone()), Some("Call".to_string()));
    Ok(())
}

#[tokio::test]
async fn undeclared_input_keys_are_still_rejected() -> anyhow::Result<()> {
    let client = Arc::new(ScriptedClient::new());
    let catalog = catalog_with(client.clone())?;
    let err = catalog
        .run_json("analyze_need", json!({ "description": "x", "urgency": "high" }))
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(client.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn analyze_need_raises_generic_message() -> anyhow::Result<()> {
    let catalog = catalog_with(Arc::new(ScriptedClient::new().then_fail("upstream 500")))?;
    let err = catalog
        .analyze_need(AnalyzeNeedInput {
            description: "fix my roof".into(),
            image_data_uri: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::Failed { .. }));
    assert_eq!(err.caller_message(), GENERIC_CALLER_MESSAGE);
    assert!(!err.to_string().contains("upstream"));
    Ok(())
}

#[tokio::test]
async fn exhausted_tool_budget_forces_a_final_answer() -> anyhow::Result<()> {
    let client = Arc::new(ScriptedClient::from_fn(|request| {
        if request.tools.is_empty() {
            Ok(LlmResponse::output(json!({ "summary": "Done." })))
        } else {
            Ok(LlmResponse::tool_call(
                WEB_SEARCH_TOOL,
                json!({ "query": "again" }),
            ))
        }
    }));
    let catalog = FlowCatalog::builder()
        .llm(client.clone())
        .max_tool_rounds(2)
        .build()?;

    let output = catalog
        .analyze_need(AnalyzeNeedInput {
            description: "keep searching".into(),
            image_data_uri: None,
        })
        .await?;
    assert_eq!(output.summary, "Done.");

    let requests = client.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests[2].tools.is_empty());
    assert_eq!(requests[2].tool_results.len(), 2);
    Ok(())
}

#[tokio::test]
async fn image_is_attached_as_media() -> anyhow::Result<()> {
    let client = Arc::new(ScriptedClient::new().then(LlmResponse::output(json!({
        "description": "A leaking pipe under a sink."
    }))));
    let catalog = catalog_with(client.clone())?;

    let output = catalog
        .describe_image(DescribeImageInput {
            image_data_uri: "data:image/png;base64,iVBORw0KGgo=".into(),
        })
        .await?;
    assert_eq!(output.description, "A leaking pipe under a sink.");

    let request = &client.requests()[0];
    assert_eq!(request.media.len(), 1);
    assert_eq!(request.media[0].content_type.as_deref(), Some("image/png"));
    assert!(!request.prompt.contains("base64"));
    Ok(())
}

#[tokio::test]
async fn malformed_image_uri_fails_before_generation() -> anyhow::Result<()> {
    let client = Arc::new(ScriptedClient::new());
    let catalog = catalog_with(client.clone())?;
    let err = catalog
        .describe_image(DescribeImageInput {
            image_data_uri: "not a data uri".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.caller_message(), GENERIC_CALLER_MESSAGE);
    assert_eq!(client.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn flow_specific_failure_messages() -> anyhow::Result<()> {
    let catalog = catalog_with(Arc::new(ScriptedClient::new()))?;

    let err = catalog
        .analyze_document_for_roles(DocumentRolesInput {
            document_text: "Project plan".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), failures::DOCUMENT_ROLES);

    let err = catalog
        .generate_linkedin_post(LinkedInPostInput {
            job_description: "Rust engineer".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), failures::LINKEDIN_POST);
    Ok(())
}

#[tokio::test]
async fn output_that_violates_schema_goes_through_policy() -> anyhow::Result<()> {
    let client = Arc::new(ScriptedClient::new().then(LlmResponse::output(json!({
        "jobDescription": 42
    }))));
    let catalog = catalog_with(client)?;
    let err = catalog
        .hiring_assistant(HiringAssistantInput {
            need: "an AI engineer".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.caller_message(), GENERIC_CALLER_MESSAGE);
    Ok(())
}

#[tokio::test]
async fn hiring_and_linkedin_keep_markdown_and_add_html() -> anyhow::Result<()> {
    let client = Arc::new(
        ScriptedClient::new()
            .then(LlmResponse::output(json!({
                "jobDescription": "## Role\n\n- Build **agents**"
            })))
            .then(LlmResponse::output(json!({
                "linkedInPost": "We're hiring! #rust"
            }))),
    );
    let catalog = catalog_with(client)?;

    let job = catalog
        .hiring_assistant(HiringAssistantInput {
            need: "an AI engineer".into(),
        })
        .await?;
    assert_eq!(job.job_description, "## Role\n\n- Build **agents**");
    assert!(job.job_description_html.contains("<h2>Role</h2>"));
    assert!(job.job_description_html.contains("<strong>agents</strong>"));

    let post = catalog
        .generate_linkedin_post(LinkedInPostInput {
            job_description: job.job_description,
        })
        .await?;
    assert_eq!(post.linkedin_post, "We're hiring! #rust");
    assert!(post.linkedin_post_html.starts_with("<p>"));
    Ok(())
}

#[tokio::test]
async fn candidate_finder_degrades_to_empty_list() -> anyhow::Result<()> {
    let catalog = catalog_with(Arc::new(ScriptedClient::new().then_fail("timeout")))?;
    let output = catalog
        .find_profiles(FindProfilesInput {
            job_description: "Senior Rust engineer".into(),
        })
        .await?;
    assert!(output.suggested_candidates.is_empty());
    Ok(())
}

#[tokio::test]
async fn candidate_summaries_are_rendered() -> anyhow::Result<()> {
    let client = Arc::new(ScriptedClient::new().then(LlmResponse::output(json!({
        "suggestedCandidates": [{
            "name": "Ada",
            "link": "https://example.com/ada",
            "summary": "Knows *Rust* well",
            "thumbnail": null
        }]
    }))));
    let catalog = catalog_with(client)?;
    let output = catalog
        .find_profiles(FindProfilesInput {
            job_description: "Senior Rust engineer".into(),
        })
        .await?;
    assert_eq!(output.suggested_candidates.len(), 1);
    assert!(output.suggested_candidates[0].summary.contains("<em>Rust</em>"));
    assert!(output.suggested_candidates[0].thumbnail.is_none());
    Ok(())
}

#[tokio::test]
async fn input_validation_errors_bypass_failure_policy() -> anyhow::Result<()> {
    let client = Arc::new(ScriptedClient::new());
    let catalog = catalog_with(client.clone())?;

    // chat would degrade any other failure to an apology
    let err = catalog
        .run_json("chat", json!({ "history": [] }))
        .await
        .unwrap_err();
    match &err {
        FlowError::Validation(schema_err) => assert_eq!(schema_err.field(), Some("newMessage")),
        other => panic!("unexpected error {other:?}"),
    }

    let err = catalog
        .run_json(
            "chat",
            json!({ "history": [{ "role": "system", "content": "x" }], "newMessage": "hi" }),
        )
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(client.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn run_json_accepts_model_role_alias_and_rejects_unknown_flows() -> anyhow::Result<()> {
    let client = Arc::new(ScriptedClient::new().then(LlmResponse::output(json!({
        "response": "Sure."
    }))));
    let catalog = catalog_with(client)?;

    let output = catalog
        .run_json(
            "chat",
            json!({
                "history": [{ "role": "model", "content": "Hi there" }],
                "newMessage": "thanks"
            }),
        )
        .await?;
    assert_eq!(output, json!({ "response": "Sure." }));

    let err = catalog.run_json("summon_dragon", json!({})).await.unwrap_err();
    assert!(matches!(err, FlowError::FlowNotRegistered(_)));
    Ok(())
}

#[tokio::test]
async fn concurrent_invocations_are_independent() -> anyhow::Result<()> {
    let client = Arc::new(ScriptedClient::from_fn(|request| {
        let answer = if request.prompt.contains("alpha") { "one" } else { "two" };
        Ok(LlmResponse::output(json!({ "response": answer })))
    }));
    let catalog = catalog_with(client)?;

    let (first, second) = tokio::join!(
        catalog.chat(chat_input("alpha question")),
        catalog.chat(chat_input("beta question")),
    );
    assert_eq!(first?.response, "one");
    assert_eq!(second?.response, "two");
    Ok(())
}
