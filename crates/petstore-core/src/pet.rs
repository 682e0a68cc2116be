// ABOUTME: Defines the Pet record stored by every backend.
// ABOUTME: A plain value type; ids are assigned by the storage layer, never by callers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single pet record. `modifier` is the free-form attribute and is
/// serialized as `mod` to keep the wire and column names short.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pet {
    pub id: i64,
    pub name: String,
    pub race: String,
    #[serde(rename = "mod")]
    pub modifier: String,
}

impl Pet {
    pub fn new(id: i64, name: &str, race: &str, modifier: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            race: race.to_string(),
            modifier: modifier.to_string(),
        }
    }
}

impl fmt::Display for Pet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}, {}, {}, {}}}",
            self.id, self.name, self.race, self.modifier
        )
    }
}
