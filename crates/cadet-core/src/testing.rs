//! In-memory fakes for the ports defined in this crate.

use std::collections::{HashMap, VecDeque};
use std::io::{self, Write};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::stream::{self, StreamExt};

use cadet_types::conversation::{
    BackendError, ConversationId, ConversationSession, MessageRole, ResponseEnvelope,
};
use cadet_types::flag::{EvaluationContext, FlagError, FlagKind, FlagValue};

use crate::chat::backend::{ConversationBackend, EnvelopeStream};
use crate::chat::input::{InputEvent, InputSource};
use crate::flags::provider::FlagProvider;

pub fn session() -> ConversationSession {
    ConversationSession {
        id: ConversationId::new("conv-1701"),
        display_name: "Star Trek Co-Pilot Chat".to_string(),
        model_name: "GPT-4o Chat Model".to_string(),
        created_at: chrono::Utc::now(),
    }
}

// ---------------------------------------------------------------------------
// Flag provider
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum Availability {
    Ready,
    Never,
    AfterPolls(u32),
    Unreachable,
}

pub struct StaticFlagProvider {
    availability: Availability,
    flags: HashMap<String, FlagValue>,
    polls: AtomicU32,
    closes: Arc<AtomicUsize>,
}

impl StaticFlagProvider {
    fn with_availability(availability: Availability) -> Self {
        Self {
            availability,
            flags: HashMap::new(),
            polls: AtomicU32::new(0),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn ready() -> Self {
        Self::with_availability(Availability::Ready)
    }

    pub fn never_ready() -> Self {
        Self::with_availability(Availability::Never)
    }

    /// Not ready for the first `polls` readiness checks.
    pub fn ready_after_polls(polls: u32) -> Self {
        Self::with_availability(Availability::AfterPolls(polls))
    }

    /// Every evaluation fails with a transport error.
    pub fn unreachable() -> Self {
        Self::with_availability(Availability::Unreachable)
    }

    pub fn with_flag(mut self, key: &str, value: FlagValue) -> Self {
        self.flags.insert(key.to_string(), value);
        self
    }

    pub fn readiness_polls(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn close_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.closes)
    }

    fn currently_ready(&self) -> bool {
        match self.availability {
            Availability::Ready => true,
            Availability::Never | Availability::Unreachable => false,
            Availability::AfterPolls(n) => self.polls.load(Ordering::SeqCst) > n,
        }
    }
}

impl FlagProvider for StaticFlagProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn is_ready(&self) -> bool {
        self.polls.fetch_add(1, Ordering::SeqCst);
        self.currently_ready()
    }

    async fn resolve(
        &self,
        key: &str,
        _kind: FlagKind,
        _context: &EvaluationContext,
    ) -> Result<FlagValue, FlagError> {
        match self.availability {
            Availability::Unreachable => {
                return Err(FlagError::Transport("connection refused".to_string()));
            }
            _ if !self.currently_ready() => return Err(FlagError::ProviderNotReady),
            _ => {}
        }
        self.flags.get(key).cloned().ok_or_else(|| FlagError::NotFound {
            key: key.to_string(),
        })
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Conversation backend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    CreateSession {
        name: String,
        model: String,
    },
    SendMessage {
        conversation_id: String,
        role: MessageRole,
        content: String,
    },
    StreamQuestion {
        question: String,
    },
    Close,
}

/// Canned answer for one question.
pub struct Script {
    items: Vec<Result<ResponseEnvelope, BackendError>>,
    stall: bool,
}

impl Script {
    /// One fragment per envelope.
    pub fn answer(fragments: &[&str]) -> Self {
        Self::envelopes(fragments.iter().map(|f| vec![*f]).collect())
    }

    pub fn envelopes(envelopes: Vec<Vec<&str>>) -> Self {
        Self {
            items: envelopes
                .into_iter()
                .map(|texts| Ok(ResponseEnvelope::with_fragments(texts)))
                .collect(),
            stall: false,
        }
    }

    /// Fragments followed by a transport error.
    pub fn interrupted(fragments: &[&str], message: &str) -> Self {
        let mut script = Self::answer(fragments);
        script
            .items
            .push(Err(BackendError::Stream(message.to_string())));
        script
    }

    /// Fragments and then nothing, forever.
    pub fn stalled(fragments: &[&str]) -> Self {
        let mut script = Self::answer(fragments);
        script.stall = true;
        script
    }

    fn into_stream(self) -> EnvelopeStream {
        let items = stream::iter(self.items);
        if self.stall {
            Box::pin(items.chain(stream::pending()))
        } else {
            Box::pin(items)
        }
    }
}

#[derive(Default)]
struct BackendState {
    calls: Vec<BackendCall>,
    scripts: VecDeque<Script>,
}

/// Records every call and replays queued scripts, one per question.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    state: Arc<Mutex<BackendState>>,
    closes: Arc<AtomicUsize>,
    fail_create: bool,
    fail_seed: bool,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(self, script: Script) -> Self {
        self.state.lock().unwrap().scripts.push_back(script);
        self
    }

    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn failing_seed(mut self) -> Self {
        self.fail_seed = true;
        self
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn questions(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BackendCall::StreamQuestion { question } => Some(question),
                _ => None,
            })
            .collect()
    }

    pub fn close_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.closes)
    }

    fn record(&self, call: BackendCall) {
        self.state.lock().unwrap().calls.push(call);
    }
}

impl ConversationBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn create_session(
        &self,
        display_name: &str,
        model_name: &str,
    ) -> Result<ConversationSession, BackendError> {
        self.record(BackendCall::CreateSession {
            name: display_name.to_string(),
            model: model_name.to_string(),
        });
        if self.fail_create {
            return Err(BackendError::Connection("connection refused".to_string()));
        }
        Ok(ConversationSession {
            display_name: display_name.to_string(),
            model_name: model_name.to_string(),
            ..session()
        })
    }

    async fn send_message(
        &self,
        conversation_id: &ConversationId,
        role: MessageRole,
        content: &str,
    ) -> Result<(), BackendError> {
        self.record(BackendCall::SendMessage {
            conversation_id: conversation_id.to_string(),
            role,
            content: content.to_string(),
        });
        if self.fail_seed {
            return Err(BackendError::Http {
                status: 500,
                body: "internal error".to_string(),
            });
        }
        Ok(())
    }

    fn stream_question(&self, _session: &ConversationSession, question: &str) -> EnvelopeStream {
        self.record(BackendCall::StreamQuestion {
            question: question.to_string(),
        });
        let script = self.state.lock().unwrap().scripts.pop_front();
        match script {
            Some(script) => script.into_stream(),
            None => Box::pin(stream::empty()),
        }
    }

    async fn close(&self) {
        self.record(BackendCall::Close);
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Input and output
// ---------------------------------------------------------------------------

/// Replays queued events, then reports end of input.
pub struct ScriptedInput {
    events: VecDeque<InputEvent>,
}

impl ScriptedInput {
    pub fn new(events: Vec<InputEvent>) -> Self {
        Self {
            events: events.into(),
        }
    }
}

impl InputSource for ScriptedInput {
    async fn read_line(&mut self) -> InputEvent {
        self.events.pop_front().unwrap_or(InputEvent::Eof)
    }
}

/// A writer that rejects every write.
pub struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal closed"))
    }
}

/// Cloneable in-memory writer for inspecting diagnostics.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
