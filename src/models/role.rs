use serde::{Deserialize, Serialize};

/// The speaker of a transcript entry. Tool results travel on user-role
/// messages and are given the wire-level "tool" role at serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}
