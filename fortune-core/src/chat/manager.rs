//! Conversation lifecycle and the completion round-trip.

use super::prompts;
use super::{Agent, Conversation, Message, MessageRole, SendOutcome, GREETING_ID};
use crate::catalog::Fortune;
use crate::clock::Clock;
use crate::store::{self, keys, KvStore, StoreError};
use crate::years;

/// Anything that can turn a chat request into a reply. The production
/// implementation is [`deepseek::Deepseek`]; tests substitute a scripted
/// mock.
pub trait CompletionGateway {
    fn generate(
        &self,
        request: deepseek::Request,
    ) -> impl std::future::Future<Output = Result<String, deepseek::Error>> + Send;
}

impl CompletionGateway for deepseek::Deepseek {
    async fn generate(&self, request: deepseek::Request) -> Result<String, deepseek::Error> {
        let response = self.complete(request).await?;
        Ok(response.content)
    }
}

/// Model tuning passed through to every completion request.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Override the gateway's default model.
    pub model: Option<String>,
    pub temperature: f32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.7,
        }
    }
}

/// Owns the conversation list and runs sends against the gateway.
///
/// One instance per surface session. The store handle is shared with the
/// draw session so a wipe there is visible on the next load here.
pub struct ChatManager<S: KvStore, C: Clock, G: CompletionGateway> {
    store: S,
    clock: C,
    gateway: G,
    config: ChatConfig,
    conversations: Vec<Conversation>,
    active_id: Option<String>,
    agent: Agent,
    memory_year: i32,
    in_flight: bool,
}

impl<S: KvStore, C: Clock, G: CompletionGateway> ChatManager<S, C, G> {
    /// Load the persisted conversation list. Corrupt data reads as empty.
    /// The most recently created conversation becomes active.
    pub fn load(store: S, clock: C, gateway: G, config: ChatConfig) -> Self {
        let conversations: Vec<Conversation> =
            store::read_json(&store, keys::CONVERSATIONS).unwrap_or_default();
        let active_id = conversations.first().map(|c| c.id.clone());
        let agent = conversations
            .first()
            .map(|c| c.agent)
            .unwrap_or(Agent::Xiaobi);
        Self {
            store,
            clock,
            gateway,
            config,
            conversations,
            active_id,
            agent,
            memory_year: years::latest_year(),
            in_flight: false,
        }
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn agent(&self) -> Agent {
        self.agent
    }

    pub fn memory_year(&self) -> i32 {
        self.memory_year
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn active_conversation(&self) -> Option<&Conversation> {
        let id = self.active_id.as_deref()?;
        self.conversations.iter().find(|c| c.id == id)
    }

    fn active_conversation_mut(&mut self) -> Option<&mut Conversation> {
        let id = self.active_id.clone()?;
        self.conversations.iter_mut().find(|c| c.id == id)
    }

    /// Start a fresh conversation for a persona, opened with its greeting,
    /// and make it active. New conversations go to the front of the list.
    pub fn create_conversation(&mut self, agent: Agent) -> Result<&Conversation, StoreError> {
        let convo = Conversation {
            id: uuid::Uuid::new_v4().to_string(),
            agent,
            title: prompts::default_title(agent, self.memory_year),
            messages: vec![Message {
                id: GREETING_ID.to_owned(),
                role: MessageRole::Assistant,
                content: prompts::greeting(agent, self.memory_year),
            }],
            created_at: self.clock.now_millis(),
        };
        self.active_id = Some(convo.id.clone());
        self.agent = agent;
        self.conversations.insert(0, convo);
        self.persist()?;
        Ok(&self.conversations[0])
    }

    /// Switch to a persona: reuse its most recent conversation, or open a
    /// new one if it has none. Re-selecting the current persona while a
    /// conversation is active does nothing.
    pub fn switch_agent(&mut self, agent: Agent) -> Result<(), StoreError> {
        if agent == self.agent && self.active_conversation().is_some() {
            return Ok(());
        }
        self.agent = agent;
        match self.conversations.iter().find(|c| c.agent == agent) {
            Some(existing) => {
                self.active_id = Some(existing.id.clone());
                Ok(())
            }
            None => self.create_conversation(agent).map(|_| ()),
        }
    }

    /// Make an existing conversation active, adopting its persona. Unknown
    /// ids are ignored.
    pub fn select_conversation(&mut self, id: &str) {
        if let Some(convo) = self.conversations.iter().find(|c| c.id == id) {
            self.agent = convo.agent;
            self.active_id = Some(convo.id.clone());
        }
    }

    /// Delete a conversation. Deleting the active one re-points to the most
    /// recent survivor, or leaves nothing active.
    pub fn delete_conversation(&mut self, id: &str) -> Result<(), StoreError> {
        self.conversations.retain(|c| c.id != id);
        if self.active_id.as_deref() == Some(id) {
            match self.conversations.first() {
                Some(first) => {
                    self.active_id = Some(first.id.clone());
                    self.agent = first.agent;
                }
                None => self.active_id = None,
            }
        }
        self.persist()
    }

    /// Send a user message in the active conversation and append the reply.
    ///
    /// Blank input, a send already in flight, or no active conversation all
    /// fall through as [`SendOutcome::Ignored`]. A gateway failure is not an
    /// error here: the persona's canned apology is appended instead and the
    /// outcome is [`SendOutcome::Fallback`].
    pub async fn send(
        &mut self,
        text: &str,
        fortune: Option<&Fortune>,
    ) -> Result<SendOutcome, StoreError> {
        let text = text.trim();
        if text.is_empty() || self.in_flight || self.active_conversation().is_none() {
            return Ok(SendOutcome::Ignored);
        }
        self.in_flight = true;
        let result = self.send_inner(text, fortune).await;
        self.in_flight = false;
        result
    }

    async fn send_inner(
        &mut self,
        text: &str,
        fortune: Option<&Fortune>,
    ) -> Result<SendOutcome, StoreError> {
        let user_id = self.clock.now_millis().to_string();
        let agent = self.agent;
        let system = prompts::compose_system_prompt(&self.store, agent, self.memory_year, fortune);

        let convo = match self.active_conversation_mut() {
            Some(convo) => convo,
            None => return Ok(SendOutcome::Ignored),
        };
        convo.messages.push(Message {
            id: user_id,
            role: MessageRole::User,
            content: text.to_owned(),
        });
        if prompts::is_default_title(&convo.title) {
            let mut title: String = text.chars().take(12).collect();
            title.push_str("...");
            convo.title = title;
        }

        // the greeting is display-only
        let wire: Vec<deepseek::Message> = convo
            .messages
            .iter()
            .filter(|m| m.id != GREETING_ID)
            .map(|m| match m.role {
                MessageRole::User => deepseek::Message::user(m.content.as_str()),
                MessageRole::Assistant => deepseek::Message::assistant(m.content.as_str()),
            })
            .collect();

        // the user message must survive even if the reply never arrives
        self.persist()?;

        let mut request = deepseek::Request::new(wire)
            .with_system(system)
            .with_temperature(self.config.temperature);
        if let Some(model) = &self.config.model {
            request = request.with_model(model.clone());
        }

        let (content, outcome) = match self.gateway.generate(request).await {
            Ok(content) => (content, SendOutcome::Replied),
            Err(err) => {
                log::warn!("completion failed for {}: {err}", agent.tag());
                (
                    prompts::fallback_reply(agent).to_owned(),
                    SendOutcome::Fallback,
                )
            }
        };

        let reply_id = self.clock.now_millis().to_string();
        if let Some(convo) = self.active_conversation_mut() {
            convo.messages.push(Message {
                id: reply_id,
                role: MessageRole::Assistant,
                content,
            });
        }
        self.persist()?;
        Ok(outcome)
    }

    /// Change 小娜's remembered year and drop a notice into the active
    /// conversation. Meaningless for 小碧, so a no-op there.
    pub fn switch_memory_year(&mut self, year: i32) -> Result<(), StoreError> {
        if self.agent != Agent::Xiaona {
            return Ok(());
        }
        self.memory_year = year;
        let Some(notice) = prompts::year_switch_notice(year) else {
            return Ok(());
        };
        let id = self.clock.now_millis().to_string();
        if let Some(convo) = self.active_conversation_mut() {
            convo.messages.push(Message {
                id,
                role: MessageRole::Assistant,
                content: notice,
            });
            return self.persist();
        }
        Ok(())
    }

    /// Replace a persona's system prompt for all future sends.
    pub fn set_prompt_override(&self, agent: Agent, prompt: &str) -> Result<(), StoreError> {
        prompts::set_prompt_override(&self.store, agent, prompt)
    }

    /// Restore a persona's built-in system prompt.
    pub fn reset_prompt_override(&self, agent: Agent) -> Result<(), StoreError> {
        prompts::reset_prompt_override(&self.store, agent)
    }

    /// Record that the chat surface has been opened at least once.
    pub fn mark_chat_visited(&self) -> Result<(), StoreError> {
        self.store.set(keys::CHAT_VISITED, "1")
    }

    pub fn has_visited_chat(&self) -> bool {
        self.store.get(keys::CHAT_VISITED).is_some()
    }

    fn persist(&self) -> Result<(), StoreError> {
        store::write_json(&self.store, keys::CONVERSATIONS, &self.conversations)
    }
}
