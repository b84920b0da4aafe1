//! Interactive REPL for the Firecrawl MCP server.
//!
//! Launch with `firecrawl-mcp repl` to enter interactive mode.
//! Type `/help` for available commands, Tab for completion.

use rustyline::completion::{Completer, Pair};
use rustyline::config::CompletionType;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{
    Cmd, ConditionalEventHandler, Config, Editor, Event, EventContext, EventHandler, Helper,
    KeyEvent, RepeatCount,
};
use serde_json::Value;

use crate::tools::{InvocationError, ToolRegistry};

/// Available REPL commands.
const COMMANDS: &[(&str, &str)] = &[
    ("/tools", "List available Firecrawl tools"),
    ("/info", "Show server capabilities"),
    ("/call", "Invoke a tool: /call <tool> <json-args>"),
    ("/clear", "Clear the screen"),
    ("/help", "Show available commands"),
    ("/exit", "Quit the REPL"),
];

/// Completes command names, then tool names after `/call`.
struct FirecrawlHelper {
    tool_names: Vec<&'static str>,
}

impl Completer for FirecrawlHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let input = &line[..pos];

        if !input.contains(' ') {
            let matches: Vec<Pair> = COMMANDS
                .iter()
                .filter(|(cmd, _)| cmd.starts_with(input))
                .map(|(cmd, desc)| Pair {
                    display: format!("{cmd:<16} {desc}"),
                    replacement: format!("{cmd} "),
                })
                .collect();
            return Ok((0, matches));
        }

        if let Some(partial) = input.strip_prefix("/call ") {
            if !partial.contains(' ') {
                let matches: Vec<Pair> = self
                    .tool_names
                    .iter()
                    .filter(|name| name.starts_with(partial))
                    .map(|name| Pair {
                        display: name.to_string(),
                        replacement: format!("{name} "),
                    })
                    .collect();
                return Ok(("/call ".len(), matches));
            }
        }

        Ok((pos, Vec::new()))
    }
}

impl Hinter for FirecrawlHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        if pos < line.len() || !line.starts_with('/') || line.contains(' ') {
            return None;
        }
        COMMANDS
            .iter()
            .map(|(cmd, _)| *cmd)
            .find(|cmd| cmd.starts_with(line) && *cmd != line)
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Highlighter for FirecrawlHelper {}
impl Validator for FirecrawlHelper {}
impl Helper for FirecrawlHelper {}

struct TabCompleteOrAcceptHint;

impl ConditionalEventHandler for TabCompleteOrAcceptHint {
    fn handle(
        &self,
        _evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        ctx: &EventContext<'_>,
    ) -> Option<Cmd> {
        if ctx.has_hint() {
            Some(Cmd::CompleteHint)
        } else {
            Some(Cmd::Complete)
        }
    }
}

/// Run the interactive REPL. Without a registry, `/call` is disabled.
pub async fn run(registry: Option<ToolRegistry>) -> anyhow::Result<()> {
    eprintln!();
    eprintln!(
        "  \x1b[32m\u{25c9}\x1b[0m \x1b[1mfirecrawl-mcp v{}\x1b[0m \x1b[90mweb scraping tools for LLMs\x1b[0m",
        env!("CARGO_PKG_VERSION")
    );
    if registry.is_none() {
        eprintln!("    \x1b[33mNo API key configured; /call is unavailable.\x1b[0m");
    }
    eprintln!();
    eprintln!(
        "    Press \x1b[36m/\x1b[0m to browse commands, \x1b[90mTab\x1b[0m to complete, \x1b[90m/exit\x1b[0m to quit."
    );
    eprintln!();

    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .completion_type(CompletionType::List)
        .completion_prompt_limit(20)
        .build();

    let helper = FirecrawlHelper {
        tool_names: ToolRegistry::catalog().iter().map(|op| op.name).collect(),
    };
    let mut rl: Editor<FirecrawlHelper, rustyline::history::DefaultHistory> =
        Editor::with_config(config)?;
    rl.set_helper(Some(helper));
    rl.bind_sequence(
        KeyEvent::from('\t'),
        EventHandler::Conditional(Box::new(TabCompleteOrAcceptHint)),
    );

    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    let hist_path = std::path::PathBuf::from(&home).join(".firecrawl_mcp_history");
    if hist_path.exists() {
        let _ = rl.load_history(&hist_path);
    }

    let prompt = " \x1b[36mfirecrawl>\x1b[0m ";

    loop {
        match rl.readline(prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let input = line.strip_prefix('/').unwrap_or(line);
                if input.is_empty() {
                    cmd_help();
                    continue;
                }

                let mut parts = input.splitn(2, ' ');
                let cmd = parts.next().unwrap_or("");
                let args = parts.next().unwrap_or("").trim();

                match cmd {
                    "exit" | "quit" => {
                        eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                        break;
                    }
                    "help" | "h" | "?" => cmd_help(),
                    "clear" | "cls" => eprint!("\x1b[2J\x1b[H"),
                    "info" => cmd_info(),
                    "tools" => cmd_tools(),
                    "call" => cmd_call(args, registry.as_ref()).await,
                    _ => {
                        eprintln!("  Unknown command '/{cmd}'. Type /help for commands.");
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                eprintln!("  \x1b[90m(Ctrl+C)\x1b[0m Type \x1b[1m/exit\x1b[0m to quit.");
            }
            Err(ReadlineError::Eof) => {
                eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("  Error: {err}");
                break;
            }
        }
    }

    let _ = rl.save_history(&hist_path);

    Ok(())
}

fn cmd_help() {
    eprintln!();
    eprintln!("  Commands:");
    eprintln!();
    for (cmd, desc) in COMMANDS {
        eprintln!("    {cmd:<18} {desc}");
    }
    eprintln!();
    eprintln!("  Example: /call firecrawl_scrape {{\"url\": \"https://example.com\"}}");
    eprintln!();
}

fn cmd_info() {
    let capabilities = crate::types::InitializeResult::default_result();
    eprintln!();
    eprintln!(
        "  Server:   {} v{}",
        capabilities.server_info.name, capabilities.server_info.version
    );
    eprintln!("  Protocol: {}", capabilities.protocol_version);
    eprintln!("  Tools:    {}", ToolRegistry::catalog().len());
    eprintln!();
}

fn cmd_tools() {
    let catalog = ToolRegistry::catalog();
    eprintln!();
    eprintln!("  {} tools available:", catalog.len());
    eprintln!();
    for op in &catalog {
        let summary = op.description.trim().lines().next().unwrap_or("");
        let access = if op.read_only { "read" } else { "write" };
        eprintln!("    {:<30} [{access:<5}] {summary}", op.name);
    }
    eprintln!();
}

async fn cmd_call(args: &str, registry: Option<&ToolRegistry>) {
    let Some(registry) = registry else {
        eprintln!("  /call needs an API key (--api-key or FIRECRAWL_API_KEY).");
        return;
    };
    let (tool, arguments) = match parse_call(args) {
        Ok(parsed) => parsed,
        Err(msg) => {
            eprintln!("  {msg}");
            return;
        }
    };

    match registry.invoke(tool, &arguments).await {
        Ok(payload) => {
            let pretty = serde_json::to_string_pretty(&payload).unwrap_or_default();
            println!("{pretty}");
        }
        Err(InvocationError::Validation(e)) => {
            eprintln!("  Invalid arguments for {tool}:");
            for violation in e.violations() {
                eprintln!("    - {violation}");
            }
        }
        Err(e) => eprintln!("  \x1b[31m{e}\x1b[0m"),
    }
}

/// Split `<tool> <json-args>`; missing arguments mean `{}`.
fn parse_call(args: &str) -> Result<(&str, Value), String> {
    let mut parts = args.splitn(2, char::is_whitespace);
    let tool = parts.next().unwrap_or("").trim();
    if tool.is_empty() {
        return Err("Usage: /call <tool> <json-args>".to_string());
    }
    let raw = parts.next().unwrap_or("").trim();
    if raw.is_empty() {
        return Ok((tool, Value::Object(serde_json::Map::new())));
    }
    serde_json::from_str(raw)
        .map(|value| (tool, value))
        .map_err(|e| format!("Arguments are not valid JSON: {e}"))
}
