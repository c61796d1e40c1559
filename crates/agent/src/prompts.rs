//! Prompt text for the coordinator and the specialists
//!
//! Specialist prompts share one skeleton; each specialization contributes a
//! [`Guidance`] block. Placeholders filled per turn:
//! `conversationState`, `userInput`, `patterns`, `tools`, `toolResults`
//! and `diagnosisResult`.

use sreagent_provider::PromptTemplate;

/// Specialization-specific prompt content
#[derive(Debug, Clone, Copy)]
pub struct Guidance {
    /// e.g. "Azure networking"
    pub title: &'static str,
    /// e.g. "networking issues"
    pub issues: &'static str,
    pub diagnostic_focus: &'static [&'static str],
    pub diagnosis_example: &'static str,
    pub mitigation_steps: &'static [&'static str],
    pub tool_example: &'static str,
    pub mitigation_example: &'static str,
}

pub const NETWORKING: Guidance = Guidance {
    title: "Azure networking",
    issues: "networking issues",
    diagnostic_focus: &[
        "NSG rules blocking traffic",
        "DNS resolution issues",
        "Connectivity between services",
        "Load balancer configuration issues",
        "Virtual network configuration",
        "Public IP and private IP address issues",
    ],
    diagnosis_example: "NSG rule blocking port 443 traffic to the web tier",
    mitigation_steps: &[
        "If NSG rules are blocking traffic, use UpdateNsgRule or CreateNsgRule",
        "If a rule is obsolete or too broad, use RemoveNsgRule",
        "If DNS resolution is failing, explain the record or private zone change needed",
        "If services can't connect, recommend appropriate connectivity solutions",
        "If load balancer is misconfigured, provide configuration fixes",
    ],
    tool_example: "UpdateNsgRule resource-group-name nsg-name rule-name allow tcp 443",
    mitigation_example: "Updated NSG rule to allow inbound HTTPS traffic",
};

pub const DATABASE: Guidance = Guidance {
    title: "Azure database",
    issues: "database issues",
    diagnostic_focus: &[
        "Connection string problems",
        "Firewall rules blocking connections",
        "Query timeouts and performance issues",
        "Database capacity and scaling",
        "High CPU or memory usage",
        "Authentication and permission issues",
    ],
    diagnosis_example: "Database CPU utilization at 100% causing query timeouts",
    mitigation_steps: &[
        "If database is experiencing high CPU/memory, recommend scaling options or use UpdateDatabaseTier",
        "If firewall rules are blocking connections, use UpdateFirewallRule",
        "If queries are slow, suggest index optimizations or query modifications",
        "If connection string is incorrect, provide correct format",
    ],
    tool_example: "UpdateDatabaseTier resource-group-name server-name database-name S1",
    mitigation_example: "Scaled database to S1 tier to address CPU constraints",
};

pub const AUTHENTICATION: Guidance = Guidance {
    title: "Azure authentication",
    issues: "authentication and authorization issues",
    diagnostic_focus: &[
        "Azure AD integration problems",
        "Token acquisition failures",
        "CORS configuration issues",
        "Service principal problems",
        "Managed identity configuration",
        "RBAC permission issues",
    ],
    diagnosis_example: "Service principal missing required permissions for Key Vault access",
    mitigation_steps: &[
        "If role assignments are missing, list them with VerifyRbacPermissions and describe the assignment to add",
        "If tokens are rejected, explain the audience, issuer or scope fix",
        "If CORS blocks the browser, give the exact allowed origins to configure",
        "If managed identity is not enabled, describe how to enable and grant it",
    ],
    tool_example: "VerifyRbacPermissions resourceGroups/my-rg",
    mitigation_example: "Granted Key Vault Secrets User to the app's managed identity",
};

pub const PERFORMANCE: Guidance = Guidance {
    title: "Azure performance",
    issues: "performance issues",
    diagnostic_focus: &[
        "App Service plan scaling and limitations",
        "High CPU or memory usage",
        "Slow database queries",
        "Network latency issues",
        "Cache configuration",
        "Resource contention",
    ],
    diagnosis_example: "App Service hitting memory limits causing frequent application restarts",
    mitigation_steps: &[
        "If the plan is undersized, recommend a scale up or scale out with concrete SKUs",
        "If memory grows steadily, point at likely leaks and caching changes",
        "If latency comes from dependencies, recommend connection reuse and timeouts",
        "Confirm the effect with CheckAppServiceMetrics or MeasureEndpointLatency",
    ],
    tool_example: "MeasureEndpointLatency https://my-app.azurewebsites.net/health 5",
    mitigation_example: "Scaled App Service plan to P1v3 to relieve memory pressure",
};

pub const AVAILABILITY: Guidance = Guidance {
    title: "Azure Container Apps availability",
    issues: "availability issues with Azure Container Apps",
    diagnostic_focus: &[
        "High CPU or memory usage makes the app unresponsive",
        "High request count makes the app unresponsive",
        "Image pull failures in the logs result in the latest revision unable to activate",
    ],
    diagnosis_example: "Image pull failure due to incorrect credentials",
    mitigation_steps: &[
        "If resources are exhausted, recommend higher CPU/memory per replica or more replicas",
        "If load is the cause, recommend scale rule changes",
        "If the latest revision cannot activate, explain how to fix the registry credentials or image tag",
    ],
    tool_example: "GetContainerAppStatus resource-group-name app-name",
    mitigation_example: "Updated registry credentials so the latest revision activates",
};

pub const GENERAL: Guidance = Guidance {
    title: "Azure",
    issues: "issues",
    diagnostic_focus: &[],
    diagnosis_example: "Brief description of the issue",
    mitigation_steps: &[],
    tool_example: "ToolName arg1 arg2",
    mitigation_example: "Brief summary of the fix applied",
};

fn numbered(items: &[&str]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}\n", i + 1, item))
        .collect()
}

pub fn diagnostic_template(guidance: &Guidance) -> PromptTemplate {
    let mut text = format!(
        "You are a specialized {title} diagnostic agent. Your job is to diagnose {issues} with Azure applications.\n\
         \n\
         Current conversation state:\n\
         {{{{$conversationState}}}}\n\
         \n\
         User query: {{{{$userInput}}}}\n\
         \n\
         Common {title} troubleshooting patterns:\n\
         {{{{$patterns}}}}\n\
         \n",
        title = guidance.title,
        issues = guidance.issues,
    );

    if !guidance.diagnostic_focus.is_empty() {
        text.push_str(&format!(
            "Focus on these common {}:\n{}\n",
            guidance.issues,
            numbered(guidance.diagnostic_focus)
        ));
    }

    text.push_str(&format!(
        "Available tools:\n\
         {{{{$tools}}}}\n\
         \n\
         Tool results: {{{{$toolResults}}}}\n\
         \n\
         If you need more information, ask the user specific questions.\n\
         If you need to run a diagnostic tool, respond with a line starting with USE_TOOL: followed by the tool name and arguments.\n\
         Only one tool can run per turn. When tool results are shown above, use them instead of requesting another tool.\n\
         \n\
         If you've identified the issue, respond with a line starting with DIAGNOSIS: followed by a brief description of the issue.\n\
         Example: DIAGNOSIS: {}\n\
         \n\
         After any tool usage or diagnosis, provide a clear explanation to the user.\n\
         \n\
         Response:",
        guidance.diagnosis_example
    ));

    PromptTemplate::new(text)
}

pub fn mitigation_template(guidance: &Guidance) -> PromptTemplate {
    let mut text = format!(
        "You are a specialized {title} mitigation agent. Your job is to fix {issues} with Azure applications.\n\
         \n\
         Current conversation state:\n\
         {{{{$conversationState}}}}\n\
         \n\
         Diagnosis result: {{{{$diagnosisResult}}}}\n\
         \n\
         User query: {{{{$userInput}}}}\n\
         \n\
         Tool results: {{{{$toolResults}}}}\n\
         \n\
         Available tools:\n\
         {{{{$tools}}}}\n\
         \n",
        title = guidance.title,
        issues = guidance.issues,
    );

    if guidance.mitigation_steps.is_empty() {
        text.push_str("Based on the diagnosis, determine the best way to fix the issue.\n\n");
    } else {
        text.push_str(&format!(
            "Based on the diagnosis, determine the best way to fix the {}:\n{}\n",
            guidance.issues,
            numbered(guidance.mitigation_steps)
        ));
    }

    text.push_str(&format!(
        "If you need to execute a fix, respond with a line starting with USE_TOOL: followed by the tool name and arguments.\n\
         Example: USE_TOOL: {}\n\
         Only one tool can run per turn.\n\
         \n\
         Present options to the user before making significant changes.\n\
         Provide clear explanations for recommended actions.\n\
         \n\
         If you've completed the mitigation, respond with a line starting with MITIGATION_COMPLETE: followed by a brief summary.\n\
         Example: MITIGATION_COMPLETE: {}\n\
         \n\
         Response:",
        guidance.tool_example, guidance.mitigation_example
    ));

    PromptTemplate::new(text)
}

/// Routing prompt; placeholders `conversationState`, `input`, `categories`
pub fn coordinator_template() -> PromptTemplate {
    PromptTemplate::new(
        "You are a coordinator for an Azure support system. Your job is to:\n\
         1. Understand the user's problem with their Azure application\n\
         2. Determine which specialized diagnostic agent to use\n\
         3. Gather required information from the user\n\
         4. Route the conversation to the appropriate specialist agent\n\
         \n\
         Current conversation state: {{$conversationState}}\n\
         User query: {{$input}}\n\
         \n\
         Determine the next action:\n\
         - If you need more information, ask the user specific questions\n\
         - If ready to diagnose, respond with a JSON classification: {\"action\": \"diagnose\", \"category\": \"[category]\"}\n\
         - If already diagnosed and ready to mitigate, respond with: {\"action\": \"mitigate\", \"category\": \"[category]\"}\n\
         \n\
         Available diagnostic categories: {{$categories}}\n\
         \n\
         Response:",
    )
}
