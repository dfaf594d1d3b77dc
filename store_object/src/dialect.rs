//! SQL dialects
//!
//! Identifier quoting and placeholder syntax differ per backend. Literal
//! values are never quoted into SQL text, they are always bound.

/// Target SQL flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    Postgresql,
    Mysql,
}

impl Dialect {
    pub fn quote_identifier(&self, name: &str) -> String {
        match self {
            Dialect::Postgresql => format!("\"{}\"", name.replace('"', "\"\"")),
            Dialect::Mysql => format!("`{}`", name.replace('`', "``")),
        }
    }

    /// Placeholder for the parameter at 1-based `position`
    pub fn placeholder(&self, position: usize) -> String {
        match self {
            Dialect::Postgresql => format!("${}", position),
            Dialect::Mysql => "?".to_string(),
        }
    }

    /// Comma-joined placeholders for `count` parameters starting after `already_bound`
    pub fn placeholders(&self, already_bound: usize, count: usize) -> String {
        (already_bound + 1..=already_bound + count)
            .map(|position| self.placeholder(position))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn supports_returning(&self) -> bool {
        matches!(self, Dialect::Postgresql)
    }
}
