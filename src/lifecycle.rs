//! Status transition tables for campaign and chat aggregates
//!
//! Each aggregate has one table of `(state, event) -> new state`. Anything
//! not in the table is rejected. The `can_be_*` guards are derived from the
//! table, so the legal transition set lives in one place.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::TransitionError;

/// An aggregate whose status moves through a fixed transition table
pub trait StateMachine: Sized + Copy + PartialEq + 'static {
    type Event: Copy + PartialEq + 'static;

    /// Aggregate name used in error messages
    const AGGREGATE: &'static str;

    /// The complete table of legal transitions
    const TRANSITIONS: &'static [(Self, Self::Event, Self)];

    fn name(&self) -> &'static str;

    fn event_name(event: Self::Event) -> &'static str;

    /// Look up the target state, if the transition is legal
    fn next(self, event: Self::Event) -> Option<Self> {
        Self::TRANSITIONS
            .iter()
            .find(|(from, ev, _)| *from == self && *ev == event)
            .map(|(_, _, to)| *to)
    }

    fn permits(self, event: Self::Event) -> bool {
        self.next(event).is_some()
    }

    /// Apply an event, rejecting transitions missing from the table
    fn apply(self, event: Self::Event) -> Result<Self, TransitionError> {
        self.next(event).ok_or(TransitionError {
            aggregate: Self::AGGREGATE,
            from: self.name(),
            event: Self::event_name(event),
        })
    }
}

/// Parse a snake_case name against a fixed list
fn parse_named<T: Copy>(all: &[T], name: impl Fn(&T) -> &'static str, s: &str) -> Option<T> {
    all.iter().find(|v| name(v) == s).copied()
}

// ═══════════════════════════════════════════
// CAMPAIGN
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignState {
    Draft,
    Active,
    Paused,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignEvent {
    Activate,
    Pause,
    Resume,
    End,
}

impl CampaignState {
    pub const ALL: [CampaignState; 4] = [
        CampaignState::Draft,
        CampaignState::Active,
        CampaignState::Paused,
        CampaignState::Ended,
    ];

    pub fn can_be_activated(self) -> bool {
        self.permits(CampaignEvent::Activate)
    }

    pub fn can_be_paused(self) -> bool {
        self.permits(CampaignEvent::Pause)
    }

    pub fn can_be_resumed(self) -> bool {
        self.permits(CampaignEvent::Resume)
    }

    pub fn can_be_ended(self) -> bool {
        self.permits(CampaignEvent::End)
    }
}

impl CampaignEvent {
    pub const ALL: [CampaignEvent; 4] = [
        CampaignEvent::Activate,
        CampaignEvent::Pause,
        CampaignEvent::Resume,
        CampaignEvent::End,
    ];
}

impl StateMachine for CampaignState {
    type Event = CampaignEvent;

    const AGGREGATE: &'static str = "campaign";

    const TRANSITIONS: &'static [(Self, CampaignEvent, Self)] = &[
        (CampaignState::Draft, CampaignEvent::Activate, CampaignState::Active),
        (CampaignState::Active, CampaignEvent::Pause, CampaignState::Paused),
        (CampaignState::Paused, CampaignEvent::Resume, CampaignState::Active),
        (CampaignState::Paused, CampaignEvent::Activate, CampaignState::Active),
        (CampaignState::Active, CampaignEvent::End, CampaignState::Ended),
        (CampaignState::Paused, CampaignEvent::End, CampaignState::Ended),
    ];

    fn name(&self) -> &'static str {
        match self {
            CampaignState::Draft => "draft",
            CampaignState::Active => "active",
            CampaignState::Paused => "paused",
            CampaignState::Ended => "ended",
        }
    }

    fn event_name(event: CampaignEvent) -> &'static str {
        match event {
            CampaignEvent::Activate => "activate",
            CampaignEvent::Pause => "pause",
            CampaignEvent::Resume => "resume",
            CampaignEvent::End => "end",
        }
    }
}

impl FromStr for CampaignState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named(&Self::ALL, |v| v.name(), s).ok_or_else(|| format!("unknown campaign state '{s}'"))
    }
}

impl FromStr for CampaignEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named(&Self::ALL, |e| CampaignState::event_name(*e), s)
            .ok_or_else(|| format!("unknown campaign event '{s}'"))
    }
}

impl fmt::Display for CampaignState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ═══════════════════════════════════════════
// CHAT
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatState {
    Open,
    Pending,
    Assigned,
    Escalated,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatEvent {
    Assign,
    Unassign,
    Escalate,
    Close,
    Reopen,
}

impl ChatState {
    pub const ALL: [ChatState; 5] = [
        ChatState::Open,
        ChatState::Pending,
        ChatState::Assigned,
        ChatState::Escalated,
        ChatState::Closed,
    ];

    pub fn can_be_assigned(self) -> bool {
        self.permits(ChatEvent::Assign)
    }

    pub fn can_be_escalated(self) -> bool {
        self.permits(ChatEvent::Escalate)
    }

    pub fn can_be_closed(self) -> bool {
        self.permits(ChatEvent::Close)
    }

    pub fn can_be_reopened(self) -> bool {
        self.permits(ChatEvent::Reopen)
    }
}

impl ChatEvent {
    pub const ALL: [ChatEvent; 5] = [
        ChatEvent::Assign,
        ChatEvent::Unassign,
        ChatEvent::Escalate,
        ChatEvent::Close,
        ChatEvent::Reopen,
    ];
}

impl StateMachine for ChatState {
    type Event = ChatEvent;

    const AGGREGATE: &'static str = "chat";

    const TRANSITIONS: &'static [(Self, ChatEvent, Self)] = &[
        (ChatState::Open, ChatEvent::Assign, ChatState::Assigned),
        (ChatState::Pending, ChatEvent::Assign, ChatState::Assigned),
        (ChatState::Assigned, ChatEvent::Unassign, ChatState::Open),
        (ChatState::Escalated, ChatEvent::Unassign, ChatState::Open),
        (ChatState::Open, ChatEvent::Escalate, ChatState::Escalated),
        (ChatState::Pending, ChatEvent::Escalate, ChatState::Escalated),
        (ChatState::Assigned, ChatEvent::Escalate, ChatState::Escalated),
        (ChatState::Open, ChatEvent::Close, ChatState::Closed),
        (ChatState::Pending, ChatEvent::Close, ChatState::Closed),
        (ChatState::Assigned, ChatEvent::Close, ChatState::Closed),
        (ChatState::Escalated, ChatEvent::Close, ChatState::Closed),
        (ChatState::Closed, ChatEvent::Reopen, ChatState::Open),
    ];

    fn name(&self) -> &'static str {
        match self {
            ChatState::Open => "open",
            ChatState::Pending => "pending",
            ChatState::Assigned => "assigned",
            ChatState::Escalated => "escalated",
            ChatState::Closed => "closed",
        }
    }

    fn event_name(event: ChatEvent) -> &'static str {
        match event {
            ChatEvent::Assign => "assign",
            ChatEvent::Unassign => "unassign",
            ChatEvent::Escalate => "escalate",
            ChatEvent::Close => "close",
            ChatEvent::Reopen => "reopen",
        }
    }
}

impl FromStr for ChatState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named(&Self::ALL, |v| v.name(), s).ok_or_else(|| format!("unknown chat state '{s}'"))
    }
}

impl FromStr for ChatEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named(&Self::ALL, |e| ChatState::event_name(*e), s)
            .ok_or_else(|| format!("unknown chat event '{s}'"))
    }
}

impl fmt::Display for ChatState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
