//! The fixed set of poll choices shown on both views.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub id: &'static str,
    pub label: &'static str,
}

const DEBUGGING_POLL: &[Choice] = &[
    Choice {
        id: "print",
        label: "Add more print statements",
    },
    Choice {
        id: "stare",
        label: "Stare at the code until it confesses",
    },
    Choice {
        id: "ai",
        label: "Ask an AI to explain it",
    },
    Choice {
        id: "revert",
        label: "Revert and pretend it never happened",
    },
    Choice {
        id: "restart",
        label: "Turn it off and on again",
    },
];

/// Display rows, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceCatalog {
    choices: &'static [Choice],
}

impl ChoiceCatalog {
    pub const fn new(choices: &'static [Choice]) -> Self {
        Self { choices }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static Choice> {
        self.choices.iter()
    }

    pub fn get(&self, id: &str) -> Option<&'static Choice> {
        self.choices.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn label(&self, id: &str) -> Option<&'static str> {
        self.get(id).map(|c| c.label)
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}

impl Default for ChoiceCatalog {
    fn default() -> Self {
        Self::new(DEBUGGING_POLL)
    }
}
