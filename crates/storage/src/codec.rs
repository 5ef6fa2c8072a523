//! Wire formats for the two durable files. Both are compatibility surfaces:
//! the transaction table keeps its fixed column set and the rule file keeps
//! array order, which is the matcher's declaration-order tie-break.

use chrono::NaiveDate;

use tally_core::{Card, Category, Rule, Transaction, TransactionId};
use tally_engine::RuleSet;

use crate::sync::PersistenceError;

const HEADERS: [&str; 7] = [
    "id",
    "date",
    "description",
    "amount",
    "card",
    "category",
    "is_manual_override",
];

pub fn transactions_to_csv(transactions: &[Transaction]) -> Result<Vec<u8>, PersistenceError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADERS)?;

    for tx in transactions {
        let date = tx.date.format("%Y-%m-%d").to_string();
        let amount = tx.amount.to_string();
        let card = tx.card.to_string();
        writer.write_record([
            tx.id.as_str(),
            date.as_str(),
            tx.description.as_str(),
            amount.as_str(),
            card.as_str(),
            tx.category.as_ref().map(Category::as_str).unwrap_or(""),
            if tx.is_manual_override { "true" } else { "false" },
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| PersistenceError::Corrupt(e.to_string()))
}

pub fn transactions_from_csv(bytes: &[u8]) -> Result<Vec<Transaction>, PersistenceError> {
    let mut reader = csv::Reader::from_reader(bytes);
    let mut transactions = Vec::new();

    for result in reader.records() {
        let record = result?;
        let field = |i: usize, name: &str| {
            record
                .get(i)
                .ok_or_else(|| PersistenceError::Corrupt(format!("missing column: {name}")))
        };

        let date = NaiveDate::parse_from_str(field(1, "date")?, "%Y-%m-%d")
            .map_err(|e| PersistenceError::Corrupt(format!("bad date: {e}")))?;
        let amount = field(3, "amount")?
            .parse()
            .map_err(|e| PersistenceError::Corrupt(format!("bad amount: {e}")))?;
        let card: Card = field(4, "card")?
            .parse()
            .map_err(|e| PersistenceError::Corrupt(format!("bad card: {e}")))?;
        let category = match field(5, "category")? {
            "" => None,
            name => Some(Category::new(name)),
        };
        let is_manual_override = field(6, "is_manual_override")?
            .parse()
            .map_err(|e| PersistenceError::Corrupt(format!("bad override flag: {e}")))?;

        transactions.push(Transaction {
            id: TransactionId::from_string(field(0, "id")?.to_string()),
            date,
            description: field(2, "description")?.to_string(),
            amount,
            card,
            category,
            is_manual_override,
            unmatched: false,
        });
    }

    Ok(transactions)
}

pub fn rules_to_json(rules: &RuleSet) -> Result<Vec<u8>, PersistenceError> {
    Ok(serde_json::to_vec_pretty(rules.rules())?)
}

pub fn rules_from_json(bytes: &[u8]) -> Result<RuleSet, PersistenceError> {
    let rules: Vec<Rule> = serde_json::from_slice(bytes)?;
    Ok(RuleSet::from_rules(rules))
}
