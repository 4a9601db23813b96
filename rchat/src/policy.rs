//! Tunables for the decide, dispatch and summarize loop.

use rcommon::GenerationOptions;

pub const DEFAULT_DECISION_PROMPT: &str = "You are an assistant that can call tools. \
Decide whether one of the available tools is needed to answer the user's question. \
If a tool is needed, call exactly one tool with JSON arguments. \
Otherwise answer the question directly.";

pub const DEFAULT_SUMMARY_PROMPT: &str = "Answer the user's question using the tool output \
in the conversation. If the tool reported an error, explain plainly what went wrong \
and do not invent results.";

pub const DEFAULT_CORRECTIVE_PROMPT: &str = "Your previous reply could not be used: {problem}. \
Reply with either a plain-text answer or exactly one tool call whose arguments are a JSON object.";

#[derive(Debug, Clone, PartialEq)]
pub struct OrchestrationPolicy {
    /// Extra decision attempts after a protocol error.
    pub decision_retries: u32,
    /// Dispatches allowed before the model must summarize.
    pub max_tool_hops: u32,
    pub decision_prompt: String,
    pub summary_prompt: String,
    /// `{problem}` is replaced by the protocol error message.
    pub corrective_prompt: String,
    /// String fields named `body` in tool output are cut to this many chars
    /// before the model sees them.
    pub max_body_chars: usize,
    pub generation: GenerationOptions,
}

impl Default for OrchestrationPolicy {
    fn default() -> Self {
        Self {
            decision_retries: 1,
            max_tool_hops: 1,
            decision_prompt: DEFAULT_DECISION_PROMPT.to_string(),
            summary_prompt: DEFAULT_SUMMARY_PROMPT.to_string(),
            corrective_prompt: DEFAULT_CORRECTIVE_PROMPT.to_string(),
            max_body_chars: 2000,
            generation: GenerationOptions::default(),
        }
    }
}

impl OrchestrationPolicy {
    pub fn with_decision_retries(mut self, retries: u32) -> Self {
        self.decision_retries = retries;
        self
    }

    pub fn with_max_tool_hops(mut self, hops: u32) -> Self {
        self.max_tool_hops = hops;
        self
    }

    pub fn with_decision_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.decision_prompt = prompt.into();
        self
    }

    pub fn with_summary_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.summary_prompt = prompt.into();
        self
    }

    pub fn with_generation(mut self, generation: GenerationOptions) -> Self {
        self.generation = generation;
        self
    }

    pub fn corrective_message(&self, problem: &str) -> String {
        self.corrective_prompt.replace("{problem}", problem)
    }
}
