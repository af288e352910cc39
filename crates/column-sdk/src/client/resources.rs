//! List endpoints exposed by the Column API.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// A listable Column resource collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resource {
    Entities,
    BankAccounts,
    AchTransfers,
    WireTransfers,
    BookTransfers,
    Checks,
    CheckDeposits,
    Counterparties,
    Transactions,
    Loans,
    LinesOfCredit,
    Cards,
    Statements,
    Documents,
    Holds,
    Fees,
    Reports,
    Webhooks,
    Events,
}

impl Resource {
    pub const ALL: [Resource; 19] = [
        Self::Entities,
        Self::BankAccounts,
        Self::AchTransfers,
        Self::WireTransfers,
        Self::BookTransfers,
        Self::Checks,
        Self::CheckDeposits,
        Self::Counterparties,
        Self::Transactions,
        Self::Loans,
        Self::LinesOfCredit,
        Self::Cards,
        Self::Statements,
        Self::Documents,
        Self::Holds,
        Self::Fees,
        Self::Reports,
        Self::Webhooks,
        Self::Events,
    ];

    /// REST path of the collection, relative to the API base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Entities => "/entities",
            Self::BankAccounts => "/bank-accounts",
            Self::AchTransfers => "/transfers/ach",
            Self::WireTransfers => "/transfers/wire",
            Self::BookTransfers => "/transfers/book",
            Self::Checks => "/checks",
            Self::CheckDeposits => "/check-deposits",
            Self::Counterparties => "/counterparties",
            Self::Transactions => "/transactions",
            Self::Loans => "/loans",
            Self::LinesOfCredit => "/lines-of-credit",
            Self::Cards => "/cards",
            Self::Statements => "/statements",
            Self::Documents => "/documents",
            Self::Holds => "/holds",
            Self::Fees => "/fees",
            Self::Reports => "/reports",
            Self::Webhooks => "/webhooks",
            Self::Events => "/events",
        }
    }

    /// Kebab-case name used on the command line and in config.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Entities => "entities",
            Self::BankAccounts => "bank-accounts",
            Self::AchTransfers => "ach-transfers",
            Self::WireTransfers => "wire-transfers",
            Self::BookTransfers => "book-transfers",
            Self::Checks => "checks",
            Self::CheckDeposits => "check-deposits",
            Self::Counterparties => "counterparties",
            Self::Transactions => "transactions",
            Self::Loans => "loans",
            Self::LinesOfCredit => "lines-of-credit",
            Self::Cards => "cards",
            Self::Statements => "statements",
            Self::Documents => "documents",
            Self::Holds => "holds",
            Self::Fees => "fees",
            Self::Reports => "reports",
            Self::Webhooks => "webhooks",
            Self::Events => "events",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Resource {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|resource| resource.name() == s)
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "resource".to_string(),
                message: format!("unknown resource '{}'", s),
            })
    }
}

#[cfg(test)]
#[path = "resources_tests.rs"]
mod tests;
