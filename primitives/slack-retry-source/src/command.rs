//! `/retry` command parsing.
//!
//! This crate only decides between help and dispatch. The flag grammar
//! documented in [`HELP_TEXT`] is interpreted by the downstream worker.

/// Help text shown for `/retry` and `/retry help`.
pub const HELP_TEXT: &str = "
Syntax: `/retry <request_string>`

Retry uses the request string to look for any matching records on Bamboo HR to retry synchronising employee data.

The synchronisation will update Slack, Gsuite and Jira employee profiles.

Examples:
`/retry @username` retries synchronising by slack username
`/retry <employee_id>` retries synchronising employee by employee_id as listed on Bamboo HR
`/retry --email <user@auth0.com>` retries synchronising employee by work email
`/retry --country <country name>` retries synchronising employees by country
`/retry --department <department name>` retries synchronising employees by department
`/retry --division <division name>` retries synchronising employees by division
`/retry --hireDate YYYY-MM-DD` retries synchronising employees by hire date
`/retry --all` retries synchronising ALL employees (use with caution)
";

/// A parsed `/retry` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show usage.
    Help,
    /// Look up and resynchronise records matching the query.
    Search(String),
}

/// Parses the slash-command `text` argument.
///
/// The query is passed through verbatim: no trimming, no flag parsing.
pub fn parse(text: Option<&str>) -> Command {
    match text {
        None | Some("") | Some("help") => Command::Help,
        Some(query) => Command::Search(query.to_string()),
    }
}
