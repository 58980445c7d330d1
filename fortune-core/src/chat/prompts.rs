//! Persona prompt texts and the canned lines each persona uses.
//!
//! Both default system prompts live in adjacent text files so they can be
//! edited without touching code. A per-persona override can be stored to
//! replace the default wholesale.

use super::Agent;
use crate::catalog::Fortune;
use crate::store::{self, KvStore, StoreError};
use crate::years;

const XIAOBI_PROMPT: &str = include_str!("prompts/xiaobi.txt");
const XIAONA_PROMPT: &str = include_str!("prompts/xiaona.txt");

/// The built-in system prompt for a persona.
pub fn default_prompt(agent: Agent) -> &'static str {
    match agent {
        Agent::Xiaobi => XIAOBI_PROMPT,
        Agent::Xiaona => XIAONA_PROMPT,
    }
}

fn override_key(agent: Agent) -> &'static str {
    match agent {
        Agent::Xiaobi => store::keys::PROMPT_XIAOBI,
        Agent::Xiaona => store::keys::PROMPT_XIAONA,
    }
}

/// The effective system prompt: the stored override if one exists, else the
/// default. An empty override reads as no override.
pub fn stored_prompt(store: &impl KvStore, agent: Agent) -> String {
    match store.get(override_key(agent)) {
        Some(text) if !text.is_empty() => text,
        _ => default_prompt(agent).to_owned(),
    }
}

/// Replace a persona's system prompt.
pub fn set_prompt_override(
    store: &impl KvStore,
    agent: Agent,
    prompt: &str,
) -> Result<(), StoreError> {
    store.set(override_key(agent), prompt)
}

/// Drop a persona's override, restoring the default.
pub fn reset_prompt_override(store: &impl KvStore, agent: Agent) -> Result<(), StoreError> {
    store.remove(override_key(agent))
}

/// The assistant greeting that opens every new conversation.
pub fn greeting(agent: Agent, memory_year: i32) -> String {
    match agent {
        Agent::Xiaobi => {
            "碧娜，欢迎来到占卜屋。我是小碧，你可以把签文告诉我，我来为你解读~".to_owned()
        }
        Agent::Xiaona => {
            format!("嘿碧娜~小娜来啦。。当前是{memory_year}年的记忆模式嘟~想聊点什么？")
        }
    }
}

/// The placeholder title a fresh conversation starts with. Replaced by the
/// first user message.
pub fn default_title(agent: Agent, memory_year: i32) -> String {
    match agent {
        Agent::Xiaobi => "小碧 · 新对话".to_owned(),
        Agent::Xiaona => format!("小娜 · {memory_year}年"),
    }
}

/// Whether a title is still a placeholder and should be replaced.
pub fn is_default_title(title: &str) -> bool {
    title == "小碧 · 新对话" || title.starts_with("小娜 · ")
}

/// The canned apology appended when the completion call fails.
pub fn fallback_reply(agent: Agent) -> &'static str {
    match agent {
        Agent::Xiaobi => "碧娜，小碧暂时感应不到远方的信号...请稍后再试，或者检查一下网络连接~",
        Agent::Xiaona => "碧娜。。小娜信号断了嘟。。等一下再聊好不好",
    }
}

/// System-prompt suffix describing the slip currently on display.
pub fn fortune_context(fortune: &Fortune) -> String {
    format!(
        "\n当前签文：第{}签「{}」({})，签诗：{}，解：{}",
        fortune.id,
        fortune.title,
        fortune.tier.name(),
        fortune.poem,
        fortune.meaning
    )
}

/// System-prompt suffix pinning 小娜 to one remembered year. Empty when the
/// year has no summary.
pub fn memory_year_context(year: i32) -> String {
    let Some(summary) = years::year_summary(year) else {
        return String::new();
    };
    let months = summary
        .month_highlights
        .iter()
        .map(|(m, h)| format!("{m}月: {h}"))
        .collect::<Vec<_>>()
        .join("；");
    format!(
        "\n\n【当前记忆年份：{year}年，碧娜{}岁】\n年度概要：{}\n年度感悟：{}\n月份记忆：{months}",
        summary.age, summary.one_liner, summary.reflection
    )
}

/// The full system prompt for a send: effective persona prompt, plus the
/// memory-year block for 小娜, plus the slip context when one is displayed.
pub fn compose_system_prompt(
    store: &impl KvStore,
    agent: Agent,
    memory_year: i32,
    fortune: Option<&Fortune>,
) -> String {
    let mut prompt = stored_prompt(store, agent);
    if agent == Agent::Xiaona {
        prompt.push_str(&memory_year_context(memory_year));
    }
    if let Some(fortune) = fortune {
        prompt.push_str(&fortune_context(fortune));
    }
    prompt
}

/// The in-conversation notice when 小娜's memory year changes.
pub fn year_switch_notice(year: i32) -> Option<String> {
    let summary = years::year_summary(year)?;
    Some(format!(
        "切换到{year}年的记忆了~那年你{}岁。。{}",
        summary.age, summary.one_liner
    ))
}
