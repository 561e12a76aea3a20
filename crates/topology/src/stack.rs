//! Deployment description the topology is generated from.

use serde::{Deserialize, Serialize};

/// A participant of the network.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Member {
    /// Identifier, unique within its stack and non-empty.
    pub id: String,
}

impl Member {
    /// Creates a member.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A named deployment of the network.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Stack {
    /// Name, which is also the stack's directory name.
    pub name: String,

    /// Members in join order.
    #[serde(default)]
    pub members: Vec<Member>,
}

impl Stack {
    /// Creates a stack without members.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Appends a member.
    #[must_use]
    pub fn with_member(mut self, id: impl Into<String>) -> Self {
        self.members.push(Member::new(id));
        self
    }
}
