use chatmark_core::config::Settings;
use chatmark_core::conversation::{export_markdown, render_markdown, transcript_file_name};
use chatmark_core::*;
use chrono::{DateTime, Local, TimeZone};
use tempfile::TempDir;

fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 7, 10, h, m, s).unwrap()
}

fn openai_log() -> ConversationLog {
    ConversationLog::new(LogMeta::new("gpt-4o", 0.0))
}

// ========================================================================
// Settings Tests (config/mod.rs)
// ========================================================================

#[test]
fn test_settings_default_values() {
    let settings = Settings::default();

    assert_eq!(settings.llm.provider, ProviderId::OpenAI);
    assert_eq!(settings.llm.model, "gpt-4o");
    assert_eq!(settings.llm.temperature, 0.0);
    assert_eq!(settings.llm.api_key_env, "OPENAI_API_KEY");
    assert!(settings.llm.max_tokens.is_none());
    assert!(settings.llm.base_url.is_none());
    assert_eq!(settings.ui.theme, "dark");

    // Export directory follows the provider
    assert_eq!(settings.output_dir(), std::path::PathBuf::from("_output_OpenAI"));
    assert_eq!(settings.max_tokens(), None);
}

#[test]
fn test_settings_set_provider_switches_defaults() {
    let mut settings = Settings::default();
    settings.llm.temperature = 0.3;
    settings.set_provider(ProviderId::Claude);

    assert_eq!(settings.llm.model, "claude-3-5-sonnet-20240620");
    assert_eq!(settings.llm.api_key_env, "ANTHROPIC_API_KEY");
    assert_eq!(settings.llm.temperature, 0.3);
    assert_eq!(settings.max_tokens(), Some(1000));
    assert_eq!(
        settings.output_dir(),
        std::path::PathBuf::from("_output_Anthropic")
    );
}

#[test]
fn test_settings_explicit_output_dir_wins() {
    let mut settings = Settings::default();
    settings.export.output_dir = Some("transcripts".into());
    assert_eq!(settings.output_dir(), std::path::PathBuf::from("transcripts"));
}

#[test]
fn test_settings_save_and_reload_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let mut settings = Settings::default();
    settings.set_provider(ProviderId::Claude);
    settings.llm.model = "test-model".to_string();
    settings.llm.max_tokens = Some(4096);
    settings.ui.theme = "solarized".to_string();

    settings.save_to(&config_path).unwrap();
    let loaded = Settings::load_from(&config_path);

    assert_eq!(loaded.llm.provider, ProviderId::Claude);
    assert_eq!(loaded.llm.model, "test-model");
    assert_eq!(loaded.llm.max_tokens, Some(4096));
    assert_eq!(loaded.ui.theme, "solarized");
}

#[test]
fn test_settings_partial_file_uses_section_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        r#"
[llm]
provider = "claude"
model = "claude-3-5-sonnet-20240620"
temperature = 0.0
api_key_env = "MY_KEY"
"#,
    )
    .unwrap();

    let loaded = Settings::load_from(&config_path);
    assert_eq!(loaded.llm.provider, ProviderId::Claude);
    assert_eq!(loaded.llm.api_key_env, "MY_KEY");
    assert!(loaded.export.output_dir.is_none());
    assert_eq!(loaded.ui.theme, "dark");
}

#[test]
fn test_settings_provider_only_table_takes_provider_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "[llm]\nprovider = \"claude\"\n").unwrap();

    let loaded = Settings::load_from(&config_path);
    assert_eq!(loaded.llm.provider, ProviderId::Claude);
    assert_eq!(loaded.llm.model, "claude-3-5-sonnet-20240620");
    assert_eq!(loaded.llm.api_key_env, "ANTHROPIC_API_KEY");
    assert_eq!(loaded.llm.temperature, 0.0);
    assert_eq!(loaded.max_tokens(), Some(1000));
    assert_eq!(
        loaded.output_dir(),
        std::path::PathBuf::from("_output_Anthropic")
    );
}

#[test]
fn test_settings_partial_llm_table_keeps_given_keys() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        "[llm]\nmodel = \"gpt-4o-mini\"\ntemperature = 0.4\n\n[ui]\ntheme = \"light\"\n",
    )
    .unwrap();

    let loaded = Settings::load_from(&config_path);
    assert_eq!(loaded.llm.provider, ProviderId::OpenAI);
    assert_eq!(loaded.llm.model, "gpt-4o-mini");
    assert_eq!(loaded.llm.temperature, 0.4);
    assert_eq!(loaded.llm.api_key_env, "OPENAI_API_KEY");
    assert_eq!(loaded.ui.theme, "light");
}

#[test]
fn test_settings_file_without_llm_table_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "[export]\noutput_dir = \"logs\"\n").unwrap();

    let loaded = Settings::load_from(&config_path);
    assert_eq!(loaded.llm.model, "gpt-4o");
    assert_eq!(loaded.output_dir(), std::path::PathBuf::from("logs"));
}

#[test]
fn test_settings_invalid_file_falls_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "this is = = not toml").unwrap();

    let loaded = Settings::load_from(&config_path);
    assert_eq!(loaded.llm.model, Settings::default().llm.model);
}

#[test]
fn test_build_llm_client_requires_api_key() {
    let mut settings = Settings::default();
    settings.llm.api_key_env = "CHATMARK_TEST_KEY_THAT_IS_NEVER_SET".to_string();

    match settings.build_llm_client() {
        Err(ChatmarkError::MissingApiKey { env_var, .. }) => {
            assert_eq!(env_var, "CHATMARK_TEST_KEY_THAT_IS_NEVER_SET");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("client built without a key"),
    }
}

// ========================================================================
// Conversation Log Tests (conversation/log.rs)
// ========================================================================

#[test]
fn test_repeated_prompt_lands_in_one_group_in_call_order() {
    let mut log = openai_log();
    for i in 0..5u32 {
        log.record_exchange("same", format!("q{i}"), format!("a{i}"), at(1, 0, i), at(1, 1, i));
    }

    assert_eq!(log.prompt_groups().len(), 1);
    let order: Vec<String> = log.exchanges().map(|e| e.user_message.clone()).collect();
    assert_eq!(order, vec!["q0", "q1", "q2", "q3", "q4"]);
}

#[test]
fn test_alternating_prompts_create_three_groups() {
    let mut log = openai_log();
    log.record_exchange("A", "1", "r", at(1, 0, 0), at(1, 0, 1));
    log.record_exchange("B", "2", "r", at(1, 0, 2), at(1, 0, 3));
    log.record_exchange("A", "3", "r", at(1, 0, 4), at(1, 0, 5));

    let groups = log.prompt_groups();
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0].system_prompt, "A");
    assert_eq!(groups[1].system_prompt, "B");
    assert_eq!(groups[2].system_prompt, "A");
}

#[test]
fn test_prompt_comparison_is_exact() {
    let mut log = openai_log();
    log.record_exchange("Be brief.", "1", "r", at(1, 0, 0), at(1, 0, 1));
    log.record_exchange("Be brief. ", "2", "r", at(1, 0, 2), at(1, 0, 3));
    log.record_exchange("be brief.", "3", "r", at(1, 0, 4), at(1, 0, 5));
    assert_eq!(log.prompt_groups().len(), 3);
}

// ========================================================================
// Markdown Export Tests (conversation/export.rs)
// ========================================================================

#[test]
fn test_export_round_trip_scenario() {
    let dir = TempDir::new().unwrap();
    let mut log = openai_log();
    log.record_exchange("You are helpful.", "Hi", "Hello!", at(9, 0, 0), at(9, 0, 1));

    let path = export_markdown(&log, dir.path(), "sess1", at(9, 30, 0)).unwrap();
    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "20240710_093000_sess1.md"
    );

    let content = std::fs::read_to_string(&path).unwrap();
    let prompt = content.find("## Prompt 1").unwrap();
    let system = content.find("You are helpful.").unwrap();
    let user = content[system..].find("Hi").unwrap() + system;
    let bot = content.find("Hello!").unwrap();
    assert!(prompt < system && system < user && user < bot);
}

#[test]
fn test_export_empty_log_writes_header_only() {
    let dir = TempDir::new().unwrap();
    let log = openai_log();

    let path = export_markdown(&log, dir.path(), "empty", at(9, 0, 0)).unwrap();
    let content = std::fs::read_to_string(path).unwrap();

    assert!(content.starts_with("# Chat History\n\n"));
    assert!(content.contains("**Model**: gpt-4o"));
    assert!(content.contains("**Temperature**: 0"));
    assert!(!content.contains("## Prompt"));
}

#[test]
fn test_export_creates_missing_directory_and_reuses_it() {
    let root = TempDir::new().unwrap();
    let out = root.path().join("_output_OpenAI").join("nested");
    let mut log = openai_log();
    log.record_exchange("", "hi", "hello", at(9, 0, 0), at(9, 0, 1));

    let first = export_markdown(&log, &out, "s", at(10, 0, 0)).unwrap();
    let second = export_markdown(&log, &out, "s", at(10, 0, 1)).unwrap();

    assert!(out.is_dir());
    assert_ne!(first, second);
    assert_eq!(
        std::fs::read_to_string(&first).unwrap(),
        std::fs::read_to_string(&second).unwrap()
    );
}

#[test]
fn test_export_body_matches_render() {
    let dir = TempDir::new().unwrap();
    let mut log = openai_log();
    log.record_exchange("sys", "q", "a", at(9, 0, 0), at(9, 0, 1));

    let path = export_markdown(&log, dir.path(), "s", at(11, 0, 0)).unwrap();
    assert_eq!(std::fs::read_to_string(path).unwrap(), render_markdown(&log));
}

#[test]
fn test_export_keeps_unicode_verbatim() {
    let dir = TempDir::new().unwrap();
    let mut log = openai_log();
    log.record_exchange("한국어로 답해 주세요", "안녕하세요", "반갑습니다 👋", at(9, 0, 0), at(9, 0, 1));

    let path = export_markdown(&log, dir.path(), "ko", at(9, 0, 2)).unwrap();
    let content = std::fs::read_to_string(path).unwrap();
    assert!(content.contains("한국어로 답해 주세요\n\n"));
    assert!(content.contains("반갑습니다 👋\n\n---\n\n"));
}

#[test]
fn test_export_into_a_file_path_fails_with_export_error() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "x").unwrap();

    let err = export_markdown(&openai_log(), &blocker, "s", at(9, 0, 0)).unwrap_err();
    match err {
        ChatmarkError::Export { path, .. } => assert_eq!(path, blocker),
        other => panic!("unexpected error: {other}"),
    }
}

fn dir_entries(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_export_leaves_no_temporary_file() {
    let dir = TempDir::new().unwrap();
    let mut log = openai_log();
    log.record_exchange("", "hi", "hello", at(9, 0, 0), at(9, 0, 1));

    export_markdown(&log, dir.path(), "atomic", at(12, 0, 0)).unwrap();

    assert_eq!(
        dir_entries(dir.path()),
        vec!["20240710_120000_atomic.md".to_string()]
    );
}

#[test]
fn test_export_failed_rename_reports_final_path_and_cleans_up() {
    let dir = TempDir::new().unwrap();
    // A directory squatting on the transcript name makes the rename fail
    let taken = dir.path().join("20240710_120000_busy.md");
    std::fs::create_dir(&taken).unwrap();

    let err = export_markdown(&openai_log(), dir.path(), "busy", at(12, 0, 0)).unwrap_err();
    match err {
        ChatmarkError::Export { path, .. } => assert_eq!(path, taken),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        dir_entries(dir.path()),
        vec!["20240710_120000_busy.md".to_string()]
    );
}

#[test]
fn test_transcript_file_name_uses_session_id_verbatim() {
    assert_eq!(
        transcript_file_name(&at(23, 59, 59), "my session"),
        "20240710_235959_my session.md"
    );
}
