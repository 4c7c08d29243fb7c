//! Cloud API light selectors.

use std::fmt;

/// Which lights a cloud API call applies to.
///
/// # Examples
///
/// ```
/// use lifx_bridge_rs::Selector;
///
/// assert_eq!(Selector::All.to_string(), "all");
/// assert_eq!(Selector::id("d073d5000001").to_string(), "id:d073d5000001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    All,
    Id(String),
}

impl Selector {
    pub fn id(id: &str) -> Self {
        Selector::Id(id.to_string())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::All => write!(f, "all"),
            Selector::Id(id) => write!(f, "id:{id}"),
        }
    }
}
