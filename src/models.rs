//! These models represent the objects passed around by the agent
//!
//! There are a few related formats we need to interact with:
//! - openai messages/tools, sent from the agent to the LLM
//! - tool requests, sent from the agent to the Graph systems
//! - envelopes, sent from the Graph systems back into the transcript
//!
//! Wire formats are converted at the provider boundary; everything inside
//! the agent uses these internal structs.
pub mod message;
pub mod role;
pub mod tool;
pub mod transcript;
