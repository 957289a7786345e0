//! Canned replies and caller-safe failure messages.

pub use crate::error::GENERIC_CALLER_MESSAGE;

pub mod chat {
    pub const PROVIDERS_FOUND: &str =
        "I found some professionals who might be a good fit for your project. Here are their details:";
    pub const NO_PROVIDERS: &str = "I looked, but I couldn't find any available providers for that category right now. You can try submitting your need through the 'Capture Need' page, and we'll notify you when someone becomes available.";
    pub const DEGRADED: &str =
        "Sorry, I'm having trouble connecting to the AI service right now. Please try again in a few moments.";
}

pub mod provider_finder {
    pub const PROVIDERS_FOUND: &str =
        "I found a few professionals who might be able to help with that. Here are their details:";
    pub const NO_PROVIDERS: &str = "I'm sorry, I couldn't find any available providers for that category right now. You could try rephrasing your need or creating a job post to find individual candidates.";
    pub const REPHRASE: &str =
        "I'm sorry, I wasn't able to find a specific provider for that. Could you try rephrasing your request?";
}

pub mod failures {
    pub const DOCUMENT_ROLES: &str =
        "The AI service could not analyze the document. Please try again later.";
    pub const LINKEDIN_POST: &str = "The post generation service failed. Please try again later.";
    pub const SMART_SEARCH: &str = "Could not perform provider search.";
}
