//! Scripted executor for driving a gateway in tests.
//!
//! [`MockExecutor`] plays back a FIFO script of responses and records every
//! statement it is handed, so tests can assert both the SQL a gateway
//! builds and the behavior layered on top of the results. Enable the
//! `mock` feature to use it from a downstream crate's tests.

use crate::executor::{ExecError, Executor};
use crate::record::Record;
use sea_query::Values;
use std::cell::RefCell;
use std::collections::VecDeque;

/// One scripted reply.
#[derive(Debug)]
pub enum MockResponse {
    /// Rows for a `query_one`/`query_all` call
    Rows(Vec<Record>),
    /// Rows-affected count for an `execute` call
    Affected(u64),
    /// Failure handed back for whichever call comes next
    Error(ExecError),
}

/// A statement the mock received, kept for assertions.
#[derive(Debug, Clone)]
pub struct ExecutedStatement {
    pub sql: String,
    pub values: Values,
}

/// Scripted [`Executor`] with a statement log.
///
/// Responses are consumed front to back; running past the script is an
/// `ExecError::Other` so a missing expectation fails loudly.
#[derive(Debug, Default)]
pub struct MockExecutor {
    responses: RefCell<VecDeque<MockResponse>>,
    statements: RefCell<Vec<ExecutedStatement>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue row sets, one per upcoming query call
    pub fn append_query_results(self, results: Vec<Vec<Record>>) -> Self {
        for rows in results {
            self.responses.borrow_mut().push_back(MockResponse::Rows(rows));
        }
        self
    }

    /// Queue rows-affected counts, one per upcoming execute call
    pub fn append_exec_results(self, results: Vec<u64>) -> Self {
        for affected in results {
            self.responses
                .borrow_mut()
                .push_back(MockResponse::Affected(affected));
        }
        self
    }

    /// Queue failures, one per upcoming call
    pub fn append_query_errors(self, errors: Vec<ExecError>) -> Self {
        for error in errors {
            self.responses
                .borrow_mut()
                .push_back(MockResponse::Error(error));
        }
        self
    }

    /// Every statement executed so far, in order
    pub fn executed_statements(&self) -> Vec<ExecutedStatement> {
        self.statements.borrow().clone()
    }

    fn record_statement(&self, sql: &str, values: &Values) {
        self.statements.borrow_mut().push(ExecutedStatement {
            sql: sql.to_string(),
            values: values.clone(),
        });
    }

    fn next_response(&self) -> Result<MockResponse, ExecError> {
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| ExecError::Other("mock: no scripted response left".to_string()))
    }
}

impl Executor for MockExecutor {
    fn execute(&self, sql: &str, values: &Values) -> Result<u64, ExecError> {
        self.record_statement(sql, values);
        match self.next_response()? {
            MockResponse::Affected(n) => Ok(n),
            MockResponse::Error(e) => Err(e),
            MockResponse::Rows(_) => Err(ExecError::Other(
                "mock: scripted rows where an exec result was expected".to_string(),
            )),
        }
    }

    fn query_one(&self, sql: &str, values: &Values) -> Result<Record, ExecError> {
        self.record_statement(sql, values);
        match self.next_response()? {
            MockResponse::Rows(rows) => rows.into_iter().next().ok_or_else(|| {
                ExecError::QueryError("expected one row, query returned none".to_string())
            }),
            MockResponse::Error(e) => Err(e),
            MockResponse::Affected(_) => Err(ExecError::Other(
                "mock: scripted exec result where rows were expected".to_string(),
            )),
        }
    }

    fn query_all(&self, sql: &str, values: &Values) -> Result<Vec<Record>, ExecError> {
        self.record_statement(sql, values);
        match self.next_response()? {
            MockResponse::Rows(rows) => Ok(rows),
            MockResponse::Error(e) => Err(e),
            MockResponse::Affected(_) => Err(ExecError::Other(
                "mock: scripted exec result where rows were expected".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_query::Value;

    #[test]
    fn test_responses_play_back_in_order() {
        let mock = MockExecutor::new()
            .append_query_results(vec![vec![Record::new().with("id", 1)]])
            .append_exec_results(vec![5]);

        let rows = mock.query_all("SELECT 1", &Values(vec![])).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(mock.execute("DELETE", &Values(vec![])).unwrap(), 5);
    }

    #[test]
    fn test_running_past_the_script_fails_loudly() {
        let mock = MockExecutor::new();
        let err = mock.query_all("SELECT 1", &Values(vec![])).unwrap_err();
        assert!(err.to_string().contains("no scripted response"));
    }

    #[test]
    fn test_statement_log_keeps_sql_and_values() {
        let mock = MockExecutor::new().append_exec_results(vec![1]);
        mock.execute("DELETE FROM \"t\" WHERE \"id\" = $1", &Values(vec![Value::from(9)]))
            .unwrap();

        let executed = mock.executed_statements();
        assert_eq!(executed.len(), 1);
        assert!(executed[0].sql.starts_with("DELETE"));
        assert_eq!(executed[0].values.iter().count(), 1);
    }
}
