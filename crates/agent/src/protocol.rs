//! Sentinel line protocol
//!
//! Specialists signal tool requests and outcomes with control lines in
//! their free-text replies. A line is a command iff, after leading
//! whitespace, it begins exactly with one of the sentinel keywords. This
//! module is the only place that reads those lines; the rest of the engine
//! works with [`SpecialistReply`].

pub const USE_TOOL: &str = "USE_TOOL:";
pub const DIAGNOSIS: &str = "DIAGNOSIS:";
pub const MITIGATION_COMPLETE: &str = "MITIGATION_COMPLETE:";

pub const SENTINELS: [&str; 3] = [USE_TOOL, DIAGNOSIS, MITIGATION_COMPLETE];

/// Command carried by a sentinel line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentinelCommand {
    /// Tool name and its raw, unparsed argument text
    UseTool { name: String, args: String },
    Diagnosis(String),
    MitigationComplete(String),
}

/// Sentinel keyword selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentinelKind {
    UseTool,
    Diagnosis,
    MitigationComplete,
}

impl SentinelKind {
    pub fn prefix(self) -> &'static str {
        match self {
            SentinelKind::UseTool => USE_TOOL,
            SentinelKind::Diagnosis => DIAGNOSIS,
            SentinelKind::MitigationComplete => MITIGATION_COMPLETE,
        }
    }
}

impl SentinelCommand {
    pub fn kind(&self) -> SentinelKind {
        match self {
            SentinelCommand::UseTool { .. } => SentinelKind::UseTool,
            SentinelCommand::Diagnosis(_) => SentinelKind::Diagnosis,
            SentinelCommand::MitigationComplete(_) => SentinelKind::MitigationComplete,
        }
    }
}

fn parse_line(line: &str) -> Option<SentinelCommand> {
    let line = line.trim_start();

    if let Some(rest) = line.strip_prefix(USE_TOOL) {
        let rest = rest.trim();
        let (name, args) = match rest.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args),
            None => (rest, ""),
        };
        // a bare "USE_TOOL:" names nothing to run
        if name.is_empty() {
            return None;
        }
        return Some(SentinelCommand::UseTool {
            name: name.to_string(),
            args: args.to_string(),
        });
    }

    if let Some(rest) = line.strip_prefix(DIAGNOSIS) {
        return Some(SentinelCommand::Diagnosis(rest.trim().to_string()));
    }

    line.strip_prefix(MITIGATION_COMPLETE)
        .map(|rest| SentinelCommand::MitigationComplete(rest.trim().to_string()))
}

/// First sentinel command of any kind, scanning lines in order
pub fn parse_command(text: &str) -> Option<SentinelCommand> {
    text.lines().find_map(parse_line)
}

/// First sentinel command of `kind`; later lines of the same kind are ignored
pub fn find_command(text: &str, kind: SentinelKind) -> Option<SentinelCommand> {
    text.lines()
        .filter_map(parse_line)
        .find(|command| command.kind() == kind)
}

/// Whether `line` starts with a sentinel keyword after leading whitespace
pub fn is_sentinel_line(line: &str) -> bool {
    let line = line.trim_start();
    SENTINELS.iter().any(|prefix| line.starts_with(prefix))
}

/// Drop every sentinel line, keeping the remaining lines in order
pub fn clean(text: &str) -> String {
    text.split('\n')
        .filter(|line| !is_sentinel_line(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Tool invocation requested by a specialist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRequest {
    pub name: String,
    pub args: String,
}

/// A specialist completion translated into structured form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialistReply {
    pub tool_request: Option<ToolRequest>,
    pub diagnosis: Option<String>,
    pub mitigation: Option<String>,
    /// Reply text with all sentinel lines removed
    pub visible: String,
}

impl SpecialistReply {
    pub fn parse(raw: &str) -> Self {
        let tool_request = match find_command(raw, SentinelKind::UseTool) {
            Some(SentinelCommand::UseTool { name, args }) => Some(ToolRequest { name, args }),
            _ => None,
        };
        let diagnosis = match find_command(raw, SentinelKind::Diagnosis) {
            Some(SentinelCommand::Diagnosis(text)) => Some(text),
            _ => None,
        };
        let mitigation = match find_command(raw, SentinelKind::MitigationComplete) {
            Some(SentinelCommand::MitigationComplete(text)) => Some(text),
            _ => None,
        };

        Self {
            tool_request,
            diagnosis,
            mitigation,
            visible: clean(raw),
        }
    }
}
