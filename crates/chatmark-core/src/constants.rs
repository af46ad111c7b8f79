/// chatmark: centralized constants.
/// Model names, endpoints, defaults and export layout live here.

// ─── Models ───────────────────────────────────────────────────────────────────

pub mod models {
    pub const DEFAULT_CLAUDE_MODEL: &str = "claude-3-5-sonnet-20240620";
    pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
}

// ─── API Endpoints ────────────────────────────────────────────────────────────

pub mod endpoints {
    pub const CLAUDE_BASE_URL: &str = "https://api.anthropic.com";
    pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
    pub const ANTHROPIC_VERSION: &str = "2023-06-01";
}

// ─── Default Settings ─────────────────────────────────────────────────────────

pub mod defaults {
    pub const TEMPERATURE: f32 = 0.0;
    /// The messages API requires max_tokens; chat completions does not.
    pub const CLAUDE_MAX_TOKENS: u32 = 1000;
    pub const THEME: &str = "dark";
    pub const LOG_FILE: &str = "chatmark.log";
}

// ─── Transcript Export ────────────────────────────────────────────────────────

pub mod export {
    pub const CLAUDE_OUTPUT_DIR: &str = "_output_Anthropic";
    pub const OPENAI_OUTPUT_DIR: &str = "_output_OpenAI";
    /// `yyyymmdd_HHMMSS`, used for file names and exchange times.
    pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
    pub const TITLE: &str = "# Chat History";
}
