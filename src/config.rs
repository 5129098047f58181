use anyhow::{Context, Result};
use clap::Parser;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_TOOL_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_MAX_RESPONSE_BYTES: u64 = 1_000_000;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Base URL of the spreadsheet service. `None` uses the default
    /// production endpoint.
    pub api_base_url: Option<String>,
    pub token: String,
    pub enabled_tools: Option<HashSet<String>>,
    pub tool_timeout_ms: Option<u64>,
    pub max_response_bytes: Option<u64>,
}

impl ServerConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            token,
            token_file,
            api_base_url,
            enabled_tools,
            tool_timeout_ms,
            max_response_bytes,
        } = args;

        let token = match (token, token_file) {
            (Some(token), _) if !token.trim().is_empty() => token.trim().to_string(),
            (_, Some(path)) => fs::read_to_string(&path)
                .with_context(|| format!("failed to read token file {path:?}"))?
                .trim()
                .to_string(),
            _ => anyhow::bail!(
                "no access token configured (set SHEETWIRE_TOKEN or pass --token-file)"
            ),
        };
        anyhow::ensure!(!token.is_empty(), "configured access token is empty");

        let api_base_url = api_base_url
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        let enabled_tools = enabled_tools
            .map(|tools| {
                tools
                    .into_iter()
                    .map(|tool| tool.to_ascii_lowercase())
                    .filter(|tool| !tool.is_empty())
                    .collect::<HashSet<_>>()
            })
            .filter(|set| !set.is_empty());

        let tool_timeout_ms = tool_timeout_ms.unwrap_or(DEFAULT_TOOL_TIMEOUT_MS);
        let tool_timeout_ms = if tool_timeout_ms == 0 {
            None
        } else {
            Some(tool_timeout_ms)
        };

        let max_response_bytes = max_response_bytes.unwrap_or(DEFAULT_MAX_RESPONSE_BYTES);
        let max_response_bytes = if max_response_bytes == 0 {
            None
        } else {
            Some(max_response_bytes)
        };

        Ok(Self {
            api_base_url,
            token,
            enabled_tools,
            tool_timeout_ms,
            max_response_bytes,
        })
    }

    pub fn is_tool_enabled(&self, tool: &str) -> bool {
        match &self.enabled_tools {
            Some(set) => set.contains(&tool.to_ascii_lowercase()),
            None => true,
        }
    }

    pub fn tool_timeout(&self) -> Option<Duration> {
        self.tool_timeout_ms.and_then(|ms| {
            if ms > 0 {
                Some(Duration::from_millis(ms))
            } else {
                None
            }
        })
    }

    pub fn max_response_bytes(&self) -> Option<usize> {
        self.max_response_bytes.and_then(|bytes| {
            if bytes > 0 {
                Some(bytes as usize)
            } else {
                None
            }
        })
    }
}

#[derive(Parser, Debug, Default, Clone)]
#[command(name = "sheetwire-mcp", about = "Spreadsheet service MCP server", version)]
pub struct CliArgs {
    #[arg(
        long,
        env = "SHEETWIRE_TOKEN",
        value_name = "TOKEN",
        hide_env_values = true,
        help = "Bearer token for the spreadsheet service"
    )]
    pub token: Option<String>,

    #[arg(
        long,
        env = "SHEETWIRE_TOKEN_FILE",
        value_name = "FILE",
        help = "File containing the bearer token (used when --token is absent)"
    )]
    pub token_file: Option<PathBuf>,

    #[arg(
        long,
        env = "SHEETWIRE_API_BASE_URL",
        value_name = "URL",
        help = "Override the spreadsheet service base URL"
    )]
    pub api_base_url: Option<String>,

    #[arg(
        long,
        env = "SHEETWIRE_ENABLED_TOOLS",
        value_name = "TOOL",
        value_delimiter = ',',
        help = "Restrict execution to the provided tool names"
    )]
    pub enabled_tools: Option<Vec<String>>,

    #[arg(
        long,
        env = "SHEETWIRE_TOOL_TIMEOUT_MS",
        value_name = "MS",
        help = "Tool request timeout in milliseconds (default: 30000; 0 disables)",
        value_parser = clap::value_parser!(u64)
    )]
    pub tool_timeout_ms: Option<u64>,

    #[arg(
        long,
        env = "SHEETWIRE_MAX_RESPONSE_BYTES",
        value_name = "BYTES",
        help = "Max response size in bytes (default: 1000000; 0 disables)",
        value_parser = clap::value_parser!(u64)
    )]
    pub max_response_bytes: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_with_token() -> CliArgs {
        CliArgs {
            token: Some("tok".to_string()),
            ..CliArgs::default()
        }
    }

    #[test]
    fn missing_token_is_rejected() {
        let err = ServerConfig::from_args(CliArgs::default()).unwrap_err();
        assert!(err.to_string().contains("no access token"));
    }

    #[test]
    fn zero_timeout_disables_the_timeout() {
        let config = ServerConfig::from_args(CliArgs {
            tool_timeout_ms: Some(0),
            ..args_with_token()
        })
        .unwrap();
        assert!(config.tool_timeout().is_none());
    }

    #[test]
    fn enabled_tools_allowlist_is_case_insensitive() {
        let config = ServerConfig::from_args(CliArgs {
            enabled_tools: Some(vec!["Read_Range".to_string()]),
            ..args_with_token()
        })
        .unwrap();
        assert!(config.is_tool_enabled("read_range"));
        assert!(!config.is_tool_enabled("update_range"));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config = ServerConfig::from_args(CliArgs {
            api_base_url: Some("https://sheets.internal/v4/".to_string()),
            ..args_with_token()
        })
        .unwrap();
        assert_eq!(
            config.api_base_url.as_deref(),
            Some("https://sheets.internal/v4")
        );
    }
}
