use std::collections::BTreeMap;
use tally_core::{Account, AccountName, Posting};

use crate::error::{BrokerError, Result};

/// The ledger's account map; only the broker mutates it
#[derive(Debug, Clone, Default)]
pub struct AccountBook {
    accounts: BTreeMap<AccountName, Account>,
}

impl AccountBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Account> {
        self.accounts.get(name)
    }

    /// Look up an account that an order requires to exist
    pub fn require(&self, name: &str) -> Result<&Account> {
        self.accounts
            .get(name)
            .ok_or_else(|| BrokerError::UnknownAccount(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.accounts.contains_key(name)
    }

    pub(crate) fn open(&mut self, account: Account) -> Result<()> {
        if self.accounts.contains_key(&account.name) {
            return Err(BrokerError::DuplicateAccount(account.name));
        }
        self.accounts.insert(account.name.clone(), account);
        Ok(())
    }

    pub(crate) fn debit(&mut self, posting: &Posting) -> Result<()> {
        let account = self
            .accounts
            .get_mut(&posting.account)
            .ok_or_else(|| BrokerError::UnknownAccount(posting.account.clone()))?;
        account.apply(-posting.amount);
        Ok(())
    }

    pub(crate) fn credit(&mut self, posting: &Posting) -> Result<()> {
        let account = self
            .accounts
            .get_mut(&posting.account)
            .ok_or_else(|| BrokerError::UnknownAccount(posting.account.clone()))?;
        account.apply(posting.amount);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<AccountName, Account> {
        &self.accounts
    }
}
