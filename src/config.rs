use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config::from_env()
});

pub const DEFAULT_SUPPORT_URL: &str = "https://onepos.zohodesk.com/portal/en/newticket?departmentId=601183000000006907&layoutId=601183000015067001";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub static_dir: String,

    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_temperature: f32,
    pub llm_timeout: Duration,

    pub kb_root: String,
    pub kb_allowed_hosts: Vec<String>,
    pub kb_max_pages: usize,
    pub kb_max_snippets: usize,
    pub kb_ttl: Duration,
    pub kb_fetch_timeout: Duration,
    pub kb_user_agent: String,

    pub support_url: String,
    pub default_brand: String,
    pub local_fallback: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: "0.0.0.0:3000".to_string(),
            static_dir: "static".to_string(),
            llm_api_key: None,
            llm_base_url: "https://api.groq.com/openai/v1".to_string(),
            llm_model: "llama-3.1-8b-instant".to_string(),
            llm_temperature: 0.2,
            llm_timeout: Duration::from_secs(20),
            kb_root: "https://onepos.zohodesk.com/portal/en/kb/onepos/end-user".to_string(),
            kb_allowed_hosts: vec!["onepos.zohodesk.com".to_string()],
            kb_max_pages: 25,
            kb_max_snippets: 6,
            kb_ttl: Duration::from_secs(12 * 60 * 60),
            kb_fetch_timeout: Duration::from_secs(10),
            kb_user_agent: "onePOS-AI/1.0".to_string(),
            support_url: DEFAULT_SUPPORT_URL.to_string(),
            default_brand: "onePOS".to_string(),
            local_fallback: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Config {
        let defaults = Config::default();
        Config {
            bind_addr: get_env_or_default("BIND_ADDR", &defaults.bind_addr),
            static_dir: get_env_or_default("STATIC_DIR", &defaults.static_dir),
            llm_api_key: get_env_opt("LLM_API_KEY").or_else(|| get_env_opt("GROQ_API_KEY")),
            llm_base_url: get_env_or_default("LLM_BASE_URL", &defaults.llm_base_url),
            llm_model: get_env_or_default("LLM_MODEL", &defaults.llm_model),
            llm_temperature: get_env_parsed("LLM_TEMPERATURE", defaults.llm_temperature),
            llm_timeout: Duration::from_secs(get_env_parsed(
                "LLM_TIMEOUT_SECS",
                defaults.llm_timeout.as_secs(),
            )),
            kb_root: get_env_or_default("KB_ROOT", &defaults.kb_root),
            kb_allowed_hosts: get_env_opt("KB_ALLOWED_HOSTS")
                .map(|hosts| parse_list(&hosts))
                .unwrap_or(defaults.kb_allowed_hosts),
            kb_max_pages: get_env_parsed("KB_MAX_PAGES", defaults.kb_max_pages),
            kb_max_snippets: get_env_parsed("KB_MAX_SNIPPETS", defaults.kb_max_snippets),
            kb_ttl: Duration::from_secs(get_env_parsed("KB_TTL_SECS", defaults.kb_ttl.as_secs())),
            kb_fetch_timeout: Duration::from_secs(get_env_parsed(
                "KB_FETCH_TIMEOUT_SECS",
                defaults.kb_fetch_timeout.as_secs(),
            )),
            kb_user_agent: get_env_or_default("KB_USER_AGENT", &defaults.kb_user_agent),
            support_url: get_env_or_default("SUPPORT_URL", &defaults.support_url),
            default_brand: get_env_or_default("DEFAULT_BRAND", &defaults.default_brand),
            local_fallback: get_env_parsed("LOCAL_FALLBACK", defaults.local_fallback),
        }
    }
}

fn get_env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_env_parsed<T: FromStr + std::fmt::Debug>(key: &str, default: T) -> T {
    match get_env_opt(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("ignoring invalid {key}={raw:?}, using {default:?}");
            default
        }),
        None => default,
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
