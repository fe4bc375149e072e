//! Travel assistant chat
//!
//! A [`ChatSession`] holds the conversation; [`ChatRelay`] runs one turn at a
//! time against the gateway's stream mode, decoding the event stream with
//! [`SseDecoder`] and appending tokens to the reply as they arrive.

mod relay;
mod session;
mod sse;

pub use relay::{
    APOLOGY, CHAT_MAX_TOKENS, CHAT_SYSTEM_PROMPT, CHAT_TEMPERATURE, ChatRelay, GREETING,
    ReplyStream, TurnOutcome, build_chat_payload,
};
pub use session::ChatSession;
pub use sse::{SseDecoder, SseEvent};
