//! Account-related types for the OFX generator
//!
//! This module defines the issuing institution, the bank account and its
//! currency, i.e. everything written to `<FI>` and `<BANKACCTFROM>`.

use super::error::InvalidFieldError;
use crate::format::field::check_currency;
use crate::format::text::{check_text, limits};
use std::fmt;
use std::str::FromStr;

/// Bank account types (`ACCTTYPE`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountType {
    Checking,
    Savings,
    /// Line of credit
    CreditLine,
    /// Money market
    MoneyMarket,
    /// Certificate of deposit
    Cd,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Checking => "CHECKING",
            AccountType::Savings => "SAVINGS",
            AccountType::CreditLine => "CREDITLINE",
            AccountType::MoneyMarket => "MONEYMRKT",
            AccountType::Cd => "CD",
        }
    }
}

impl FromStr for AccountType {
    type Err = InvalidFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CHECKING" => Ok(AccountType::Checking),
            "SAVINGS" => Ok(AccountType::Savings),
            "CREDITLINE" => Ok(AccountType::CreditLine),
            "MONEYMRKT" => Ok(AccountType::MoneyMarket),
            "CD" => Ok(AccountType::Cd),
            _ => Err(InvalidFieldError::new(
                "ACCTTYPE",
                s,
                "expected CHECKING, SAVINGS, CREDITLINE, MONEYMRKT or CD",
            )),
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ISO 4217 currency code as supplied by the caller
///
/// Stored verbatim: a malformed code such as `usd` is constructible and
/// reported by the validator together with every other problem.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        CurrencyCode(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the code is three uppercase ASCII letters
    pub fn is_well_formed(&self) -> bool {
        check_currency("CURDEF", &self.0).is_ok()
    }
}

impl From<&str> for CurrencyCode {
    fn from(code: &str) -> Self {
        CurrencyCode::new(code)
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The issuing financial institution (`<FI>` plus `BANKID`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinancialInstitution {
    organization: String,
    fid: String,
    bank_id: String,
}

impl FinancialInstitution {
    /// Create an institution
    ///
    /// # Arguments
    ///
    /// * `organization` - Institution name (`ORG`)
    /// * `fid` - Institution identifier assigned by the OFX directory (`FID`)
    /// * `bank_id` - Routing/transit number (`BANKID`)
    ///
    /// # Errors
    ///
    /// Returns an error if any value violates the text rules or the bank ID
    /// is not 1-9 ASCII letters or digits.
    pub fn new(
        organization: impl Into<String>,
        fid: impl Into<String>,
        bank_id: impl Into<String>,
    ) -> Result<Self, InvalidFieldError> {
        let organization = organization.into();
        let fid = fid.into();
        let bank_id = bank_id.into();

        check_text("ORG", &organization, limits::ORGANIZATION)?;
        check_text("FID", &fid, limits::FID)?;
        check_text("BANKID", &bank_id, limits::BANK_ID)?;
        if !bank_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(InvalidFieldError::new(
                "BANKID",
                bank_id,
                "must contain only ASCII letters and digits",
            ));
        }

        Ok(FinancialInstitution {
            organization,
            fid,
            bank_id,
        })
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn fid(&self) -> &str {
        &self.fid
    }

    pub fn bank_id(&self) -> &str {
        &self.bank_id
    }
}

/// A bank account (`<BANKACCTFROM>` plus the statement currency)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    account_id: String,
    branch_id: Option<String>,
    account_type: AccountType,
    currency: CurrencyCode,
}

impl Account {
    /// Create an account
    ///
    /// # Errors
    ///
    /// Returns an error if the account ID violates the text rules.
    pub fn new(
        account_id: impl Into<String>,
        account_type: AccountType,
        currency: impl Into<CurrencyCode>,
    ) -> Result<Self, InvalidFieldError> {
        let account_id = account_id.into();
        check_text("ACCTID", &account_id, limits::ACCOUNT_ID)?;

        Ok(Account {
            account_id,
            branch_id: None,
            account_type,
            currency: currency.into(),
        })
    }

    /// Attach a branch identifier (`BRANCHID`)
    pub fn with_branch_id(self, branch_id: impl Into<String>) -> Result<Self, InvalidFieldError> {
        let branch_id = branch_id.into();
        check_text("BRANCHID", &branch_id, limits::BRANCH_ID)?;
        Ok(Account {
            branch_id: Some(branch_id),
            ..self
        })
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn branch_id(&self) -> Option<&str> {
        self.branch_id.as_deref()
    }

    pub fn account_type(&self) -> AccountType {
        self.account_type
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }
}
