mod common;

use common::{MockAgent, Reply};
use forge_application::{AnalysisSource, ForgeSession, UploadedFile};
use forge_core::agent::AgentError;
use forge_core::config::ForgeConfig;
use forge_core::project::{KnownStack, StackTag, Tone, ids};
use std::sync::Arc;
use std::time::Duration;

fn session_with(agent: &Arc<MockAgent>) -> ForgeSession {
    ForgeSession::new(agent.clone(), &ForgeConfig::default())
}

fn shop_session(agent: &Arc<MockAgent>) -> ForgeSession {
    let mut session = session_with(agent);
    let config = session.config_mut();
    config.name = "Shop".to_string();
    config.description = "scrape prices".to_string();
    config.set_tone(Tone::Concise);
    config.toggle_constraint(ids::NO_BREAK_CHANGES);
    config.toggle_constraint(ids::SYNTAX_STRICT);
    session
}

#[tokio::test(start_paused = true)]
async fn test_generate_requires_description() {
    let agent = Arc::new(MockAgent::new());
    let mut session = session_with(&agent);

    let err = session.generate().await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(agent.call_count(), 0, "Backend must not be called");
    assert!(session.document().is_none());
    assert!(!session.is_progress_active());
    assert!(session.console().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_generate_sends_shop_prompt() {
    let agent = Arc::new(MockAgent::with_replies(vec![Reply::Text(
        "# Role\nSenior Python Engineer".to_string(),
    )]));
    let mut session = shop_session(&agent);

    let document = session.generate().await.expect("Should generate").to_string();
    assert_eq!(document, "# Role\nSenior Python Engineer");

    let request = agent.last_request();
    assert_eq!(request.model, "gemini-3-pro-preview");
    assert_eq!(request.thinking_budget, Some(32768));
    assert!(!request.expects_json());

    let prompt = request.text_content();
    assert!(prompt.contains("Python"));
    assert!(prompt.contains("Concise"));
    assert!(prompt.contains("- Require Code Examples:"));
    for constraint in session.config().constraints().iter().filter(|c| !c.active) {
        assert!(
            !prompt.contains(&constraint.label),
            "Inactive constraint leaked into prompt: {}",
            constraint.label
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_generate_success_logs_and_stops_timer() {
    let agent = Arc::new(MockAgent::with_replies(vec![Reply::Text("doc".to_string())]));
    let mut session = shop_session(&agent);

    session.generate().await.expect("Should generate");

    let lines = session.console().snapshot();
    assert!(lines.contains(&"[SUCCESS] Response received.".to_string()));
    assert!(lines.contains(&"[INFO] Finalizing output...".to_string()));
    assert!(!session.is_progress_active(), "Timer must be stopped");
    assert_eq!(session.document(), Some("doc"));

    let len = lines.len();
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(session.console().len(), len, "No lines after completion");
}

#[tokio::test(start_paused = true)]
async fn test_generate_failure_keeps_previous_document() {
    let agent = Arc::new(MockAgent::with_replies(vec![Reply::Text("v1".to_string())]));
    let mut session = shop_session(&agent);
    session.generate().await.expect("Should generate");

    agent.fail("upstream exploded");
    let err = session.generate().await.unwrap_err();

    assert!(err.is_generation());
    assert_eq!(session.document(), Some("v1"));
    assert!(!session.is_progress_active());
    assert!(
        session
            .console()
            .snapshot()
            .iter()
            .any(|line| {
                line.starts_with("[ERR] Generation failed:") && line.contains("upstream exploded")
            })
    );
}

#[tokio::test(start_paused = true)]
async fn test_generate_empty_response_is_generation_error() {
    let agent = Arc::new(MockAgent::with_replies(vec![Reply::Text("   \n".to_string())]));
    let mut session = shop_session(&agent);

    let err = session.generate().await.unwrap_err();
    assert!(err.is_generation());
    assert!(session.document().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_missing_credential_is_config_error() {
    let agent = Arc::new(MockAgent::with_replies(vec![Reply::Fail(
        AgentError::Configuration("API key not found".to_string()),
    )]));
    let mut session = shop_session(&agent);

    let err = session.generate().await.unwrap_err();
    assert!(err.is_config());
}

#[tokio::test(start_paused = true)]
async fn test_resubmission_leaves_single_timer() {
    let agent = Arc::new(MockAgent::with_replies(vec![
        Reply::Slow(Duration::from_secs(10), "slow".to_string()),
        Reply::Text("fast".to_string()),
    ]));
    let mut session = shop_session(&agent);

    // Abandon the first submission while its timer is running.
    let abandoned = tokio::time::timeout(Duration::from_millis(1000), session.generate())
        .await
        .is_err();
    assert!(abandoned, "First submission should still be pending");
    assert!(session.is_progress_active());

    session.generate().await.expect("Should generate");

    assert_eq!(session.document(), Some("fast"));
    assert!(!session.is_progress_active());
    assert_eq!(
        session.console().snapshot(),
        vec![
            "[SUCCESS] Response received.".to_string(),
            "[INFO] Validating markdown structure...".to_string(),
            "[INFO] Finalizing output...".to_string(),
            "[INFO] Starting compile job for project: \"Shop\"".to_string(),
        ],
        "Only the replacement timer may log after the success lines"
    );
}

#[tokio::test]
async fn test_analyze_rejects_malformed_url_without_call() {
    let agent = Arc::new(MockAgent::new());
    let mut session = session_with(&agent);
    let before = session.config().clone();

    let err = session
        .analyze(AnalysisSource::Url("not a url".to_string()), None)
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(agent.call_count(), 0);
    assert_eq!(session.config(), &before);
    assert!(session.console().is_empty());
}

#[tokio::test]
async fn test_analyze_url_merges_and_logs() {
    let agent = Arc::new(MockAgent::new());
    agent.text(r#"{"name": "Shop", "selectedStacks": ["python", "Scrapy"], "tone": "Concise"}"#);
    let mut session = session_with(&agent);
    session.config_mut().description = "keep me".to_string();

    let result = session
        .analyze(
            AnalysisSource::Url("https://github.com/acme/shop".to_string()),
            None,
        )
        .await
        .expect("Should analyze");

    assert_eq!(result.name.as_deref(), Some("Shop"));
    let config = session.config();
    assert_eq!(config.name, "Shop");
    assert_eq!(config.description, "keep me");
    assert_eq!(
        config.selected_stacks,
        vec![
            StackTag::Known(KnownStack::Python),
            StackTag::Custom("Scrapy".to_string())
        ]
    );
    assert_eq!(config.tone, Tone::Concise);

    assert!(agent.last_request().search_grounding);
    assert_eq!(
        session.console().snapshot(),
        vec![
            "[INFO] Analyzing external resource: https://github.com/acme/shop",
            "[NET] Initiating search grounding...",
            "[SUCCESS] Analysis complete.",
            "[DATA] Detected Name: Shop",
            "[DATA] Detected Stack: Python, Scrapy",
        ]
    );
}

#[tokio::test]
async fn test_analyze_failure_preserves_config() {
    let agent = Arc::new(MockAgent::new());
    agent.text("definitely not json");
    let mut session = session_with(&agent);
    let before = session.config().clone();

    let err = session
        .analyze(AnalysisSource::Hint("a todo app".to_string()), None)
        .await
        .unwrap_err();

    assert!(err.is_analysis());
    assert_eq!(session.config(), &before);
    assert!(
        session
            .console()
            .snapshot()
            .last()
            .is_some_and(|line| line.starts_with("[ERR] Analysis failed:"))
    );
}

#[tokio::test]
async fn test_analyze_empty_response_is_analysis_error() {
    let agent = Arc::new(MockAgent::new());
    agent.text("");
    let mut session = session_with(&agent);
    session.config_mut().name = "Keep".to_string();
    let before = session.config().clone();

    let err = session
        .analyze(AnalysisSource::Url("https://example.com/app".to_string()), None)
        .await
        .unwrap_err();

    assert!(err.is_analysis());
    assert_eq!(agent.call_count(), 1);
    assert_eq!(session.config(), &before);
    let lines = session.console().snapshot();
    assert_eq!(lines.len(), 3);
    assert!(lines[2].starts_with("[ERR] Analysis failed:"));
}

#[tokio::test]
async fn test_analyze_media_file() {
    let agent = Arc::new(MockAgent::new());
    agent.text(r#"{"description": "A mobile login screen", "selectedStacks": ["Flutter"]}"#);
    let mut session = session_with(&agent);

    session
        .analyze(
            AnalysisSource::File(UploadedFile::new("login.png", vec![1, 2, 3])),
            Some("mobile first"),
        )
        .await
        .expect("Should analyze");

    assert_eq!(session.config().description, "A mobile login screen");
    assert_eq!(session.config().name, "", "Absent name must not overwrite");
    assert_eq!(agent.last_request().model, "gemini-3-pro-preview");
}

#[tokio::test]
async fn test_apply_without_critique_is_rejected() {
    let agent = Arc::new(MockAgent::new());
    let mut session = session_with(&agent);

    let err = session.apply_critique().await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(agent.call_count(), 0, "Backend must not be called");
}

#[tokio::test]
async fn test_critique_requires_document() {
    let agent = Arc::new(MockAgent::new());
    let mut session = session_with(&agent);

    assert!(session.critique().await.unwrap_err().is_validation());
    assert_eq!(agent.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_critique_then_apply_replaces_document() {
    let agent = Arc::new(MockAgent::with_replies(vec![
        Reply::Text("v1".to_string()),
        Reply::Text("- Add retries\n- Cover timeouts".to_string()),
        Reply::Text("v2".to_string()),
    ]));
    let mut session = shop_session(&agent);
    session.generate().await.expect("Should generate");

    let critique = session.critique().await.expect("Should critique");
    assert!(!critique.degraded);
    assert_eq!(session.pending_critique(), Some("- Add retries\n- Cover timeouts"));
    assert_eq!(agent.last_request().model, "gemini-3-flash-preview");

    let refined = session.apply_critique().await.expect("Should refine").to_string();
    assert_eq!(refined, "v2");
    assert_eq!(session.document(), Some("v2"));
    assert!(session.pending_critique().is_none());

    let prompt = agent.last_request().text_content();
    assert!(prompt.contains("- Add retries"));
    assert!(prompt.contains("v1"));
}

#[tokio::test(start_paused = true)]
async fn test_apply_failure_keeps_document_and_critique() {
    let agent = Arc::new(MockAgent::with_replies(vec![
        Reply::Text("v1".to_string()),
        Reply::Text("- tip".to_string()),
    ]));
    agent.fail("rate limited");
    let mut session = shop_session(&agent);
    session.generate().await.expect("Should generate");
    session.critique().await.expect("Should critique");

    let err = session.apply_critique().await.unwrap_err();

    assert!(err.is_refinement());
    assert_eq!(session.document(), Some("v1"));
    assert_eq!(session.pending_critique(), Some("- tip"));
}

#[tokio::test(start_paused = true)]
async fn test_degraded_critique_is_not_held() {
    let agent = Arc::new(MockAgent::with_replies(vec![Reply::Text("v1".to_string())]));
    agent.fail("boom");
    agent.text("");
    let mut session = shop_session(&agent);
    session.generate().await.expect("Should generate");

    let failed = session.critique().await.expect("Critique never fails");
    assert!(failed.degraded);
    assert_eq!(failed.text, "Could not fetch suggestions.");
    assert!(session.pending_critique().is_none());

    let empty = session.critique().await.expect("Critique never fails");
    assert_eq!(empty.text, "No improvements found.");
    assert!(session.pending_critique().is_none());

    let calls = agent.call_count();
    assert!(session.apply_critique().await.unwrap_err().is_validation());
    assert_eq!(agent.call_count(), calls);
}

#[tokio::test]
async fn test_regenerate_clears_pending_critique() {
    let agent = Arc::new(MockAgent::with_replies(vec![
        Reply::Text("v1".to_string()),
        Reply::Text("- tip".to_string()),
        Reply::Text("v2".to_string()),
    ]));
    let mut settings = ForgeConfig::default();
    settings.progress.interval_ms = 5;
    settings.progress.settle_ms = 0;
    let mut session = ForgeSession::new(agent.clone(), &settings);
    session.config_mut().description = "scrape prices".to_string();

    session.generate().await.expect("Should generate");
    session.critique().await.expect("Should critique");
    assert!(session.pending_critique().is_some());

    session.generate().await.expect("Should regenerate");
    assert_eq!(session.document(), Some("v2"));
    assert!(session.pending_critique().is_none());
}

#[test]
fn test_apply_template_by_name() {
    let agent = Arc::new(MockAgent::new());
    let mut session = session_with(&agent);
    session.config_mut().name = "Mine".to_string();

    session
        .apply_template("systems programming")
        .expect("Template should exist");
    assert_eq!(session.config().name, "Mine");
    assert_eq!(session.config().tone, Tone::Concise);

    assert!(session.apply_template("Nope").unwrap_err().is_validation());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_timer() {
    let agent = Arc::new(MockAgent::with_replies(vec![Reply::Slow(
        Duration::from_secs(30),
        "late".to_string(),
    )]));
    let mut session = shop_session(&agent);

    let _ = tokio::time::timeout(Duration::from_millis(700), session.generate()).await;
    assert!(session.is_progress_active());

    session.shutdown();
    assert!(!session.is_progress_active());

    let lines = session.console().len();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(session.console().len(), lines);
}
