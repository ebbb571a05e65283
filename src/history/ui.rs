//! Text rendering of the history.

use super::models::Transaction;

/// Renders transactions as a transcript.
///
/// Each transaction becomes `"> <request>\n\n< <response>\n"` with both dumps
/// trimmed; transactions are joined with a newline, so consecutive entries
/// are separated by a blank line. A missing response renders as nothing after
/// the `<` marker.
pub fn format_transcript<'a, I>(transactions: I) -> String
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .map(format_transaction)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders a single transaction block.
pub fn format_transaction(transaction: &Transaction) -> String {
    let request = transaction.request.to_string();
    let response = transaction
        .response
        .as_ref()
        .map(|r| r.to_string())
        .unwrap_or_default();

    format!("> {}\n\n< {}\n", request.trim(), response.trim())
}
