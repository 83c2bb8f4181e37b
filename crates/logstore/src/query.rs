//! Query Parser
//!
//! Parses the classic Lucene query syntax subset understood by the log store:
//!
//! - `field:term`, bare terms (searched in `log.message`), `"phrases"`
//! - wildcards `time*`, `*Timeout*`, `?`, and `*:*` for every record
//! - ranges `[a TO b]`, `{a TO b}` with `*` as an open bound
//! - comparisons `field:>5000`, `field:<=3`, and `field > 5000`
//! - `AND`/`&&`, `OR`/`||`, `NOT`/`!`, `+`/`-` modifiers, `( )` groups,
//!   `field:( ... )` groups, and `^boost`
//!
//! Operator precedence follows the classic parser: there is none. `AND`
//! marks both neighbouring clauses required, `NOT` and `-` prohibit a
//! clause, and everything else is optional (default operator `OR`).

use crate::error::{QueryError, QueryResult};
use crate::lexer::{tokenize, CmpOp, Glob, Token, TokenKind};
use crate::record::MESSAGE;

/// Deepest `( )` nesting accepted; also bounds evaluation recursion.
pub const MAX_DEPTH: usize = 32;

/// How a clause participates in a boolean query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occur {
    Must,
    Should,
    MustNot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub occur: Occur,
    pub query: Query,
}

/// Parsed query tree. Terms keep their raw text; analysis happens per field
/// kind at evaluation time.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    MatchAll,
    Term {
        field: String,
        term: String,
    },
    Phrase {
        field: String,
        text: String,
    },
    Wildcard {
        field: String,
        pattern: Vec<Glob>,
    },
    Range {
        field: String,
        lower: Option<String>,
        upper: Option<String>,
        include_lower: bool,
        include_upper: bool,
    },
    Boolean(Vec<Clause>),
    Boost {
        query: Box<Query>,
        boost: f32,
    },
}

/// Parse a query string with `log.message` as the default field.
pub fn parse(query: &str) -> QueryResult<Query> {
    parse_with_default_field(query, MESSAGE)
}

pub fn parse_with_default_field(query: &str, default_field: &str) -> QueryResult<Query> {
    let tokens = tokenize(query)?;
    let mut parser = Parser {
        query,
        tokens,
        pos: 0,
        depth: 0,
    };
    if parser.tokens.is_empty() {
        return Err(QueryError::new(query, 0, "empty query"));
    }
    let parsed = parser.parse_query(default_field)?;
    if let Some(token) = parser.peek() {
        return Err(QueryError::new(
            query,
            token.position,
            "unexpected ')' without matching '('",
        ));
    }
    Ok(parsed)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Conjunction {
    None,
    And,
    Or,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Modifier {
    None,
    Required,
    Prohibited,
}

struct Parser<'a> {
    query: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn peek_kind_at(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| &t.kind)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Offset used for errors at the current point.
    fn here(&self) -> usize {
        self.peek()
            .map(|t| t.position)
            .unwrap_or_else(|| self.query.chars().count())
    }

    fn error(&self, position: usize, message: impl Into<String>) -> QueryError {
        QueryError::new(self.query, position, message)
    }

    /// Sequence of clauses up to end of input or a closing `)`.
    fn parse_query(&mut self, field: &str) -> QueryResult<Query> {
        let mut clauses: Vec<Clause> = Vec::new();

        loop {
            match self.peek_kind() {
                None | Some(TokenKind::RParen) => break,
                _ => {}
            }

            let conj_position = self.here();
            let conj = match self.peek_kind() {
                Some(TokenKind::And) => {
                    self.pos += 1;
                    Conjunction::And
                }
                Some(TokenKind::Or) => {
                    self.pos += 1;
                    Conjunction::Or
                }
                _ => Conjunction::None,
            };
            if conj != Conjunction::None {
                if clauses.is_empty() {
                    return Err(self.error(conj_position, "query cannot start with an operator"));
                }
                if matches!(self.peek_kind(), None | Some(TokenKind::RParen)) {
                    return Err(self.error(self.here(), "expected a clause after operator"));
                }
            }

            let modifier = match self.peek_kind() {
                Some(TokenKind::Plus) => {
                    self.pos += 1;
                    Modifier::Required
                }
                Some(TokenKind::Minus) | Some(TokenKind::Not) | Some(TokenKind::Bang) => {
                    self.pos += 1;
                    Modifier::Prohibited
                }
                _ => Modifier::None,
            };

            let query = self.parse_clause(field)?;
            add_clause(&mut clauses, conj, modifier, query);
        }

        if clauses.is_empty() {
            return Err(self.error(self.here(), "expected a term"));
        }

        if clauses.len() == 1 && clauses[0].occur != Occur::MustNot {
            if let Some(only) = clauses.pop() {
                return Ok(only.query);
            }
        }
        Ok(Query::Boolean(clauses))
    }

    fn parse_clause(&mut self, default_field: &str) -> QueryResult<Query> {
        let field_prefix = match (self.peek_kind(), self.peek_kind_at(1)) {
            (Some(TokenKind::Term { text, .. }), Some(TokenKind::Colon)) => Some(text.clone()),
            _ => None,
        };

        let query = if let Some(field) = field_prefix {
            self.pos += 2;
            if field == "*" && is_match_all_value(self.peek_kind()) {
                self.pos += 1;
                Query::MatchAll
            } else if let Some(TokenKind::Cmp(op)) = self.peek_kind().cloned() {
                self.pos += 1;
                self.parse_comparison(field, op)?
            } else {
                self.parse_primary(&field)?
            }
        } else if let (Some(TokenKind::Term { text, .. }), Some(TokenKind::Cmp(op))) =
            (self.peek_kind(), self.peek_kind_at(1))
        {
            let field = text.clone();
            let op = *op;
            self.pos += 2;
            self.parse_comparison(field, op)?
        } else {
            self.parse_primary(default_field)?
        };

        self.parse_boost(query)
    }

    fn parse_primary(&mut self, field: &str) -> QueryResult<Query> {
        let position = self.here();
        match self.next().map(|t| t.kind) {
            Some(TokenKind::Term { text, glob }) => Ok(match glob {
                Some(pattern) => Query::Wildcard {
                    field: field.to_string(),
                    pattern,
                },
                None => Query::Term {
                    field: field.to_string(),
                    term: text,
                },
            }),
            Some(TokenKind::Phrase(text)) => Ok(Query::Phrase {
                field: field.to_string(),
                text,
            }),
            Some(TokenKind::RangeOpen { inclusive }) => self.parse_range(field, inclusive),
            Some(TokenKind::LParen) => {
                if matches!(self.peek_kind(), Some(TokenKind::RParen)) {
                    return Err(self.error(self.here(), "empty group"));
                }
                if self.depth >= MAX_DEPTH {
                    return Err(self.error(position, "query nested too deeply"));
                }
                self.depth += 1;
                let inner = self.parse_query(field);
                self.depth -= 1;
                let inner = inner?;
                match self.next().map(|t| t.kind) {
                    Some(TokenKind::RParen) => Ok(inner),
                    _ => Err(self.error(position, "missing closing ')'")),
                }
            }
            Some(TokenKind::Colon) => Err(self.error(position, "missing field name before ':'")),
            Some(_) => Err(self.error(position, "expected a term")),
            None => Err(self.error(position, "expected a term, found end of query")),
        }
    }

    fn parse_range(&mut self, field: &str, include_lower: bool) -> QueryResult<Query> {
        let lower = self.parse_range_bound()?;

        let to_position = self.here();
        match self.next().map(|t| t.kind) {
            Some(TokenKind::Term { text, glob: None }) if text == "TO" => {}
            _ => return Err(self.error(to_position, "expected 'TO' in range")),
        }

        let upper = self.parse_range_bound()?;

        let close_position = self.here();
        let include_upper = match self.next().map(|t| t.kind) {
            Some(TokenKind::RangeClose { inclusive }) => inclusive,
            _ => return Err(self.error(close_position, "unterminated range")),
        };

        Ok(Query::Range {
            field: field.to_string(),
            lower,
            upper,
            include_lower,
            include_upper,
        })
    }

    /// A range endpoint; `*` is an open bound.
    fn parse_range_bound(&mut self) -> QueryResult<Option<String>> {
        let position = self.here();
        match self.next().map(|t| t.kind) {
            Some(TokenKind::Term { glob: Some(g), .. }) if g == [Glob::AnyMany] => Ok(None),
            Some(TokenKind::Term { text, .. }) => Ok(Some(text)),
            Some(TokenKind::Phrase(text)) => Ok(Some(text)),
            _ => Err(self.error(position, "expected a range bound")),
        }
    }

    fn parse_comparison(&mut self, field: String, op: CmpOp) -> QueryResult<Query> {
        let position = self.here();
        let value = match self.next().map(|t| t.kind) {
            Some(TokenKind::Term { text, glob: None }) => text,
            Some(TokenKind::Phrase(text)) => text,
            _ => return Err(self.error(position, "expected a value after comparison operator")),
        };

        let (lower, upper, include_lower, include_upper) = match op {
            CmpOp::Gt => (Some(value), None, false, true),
            CmpOp::Ge => (Some(value), None, true, true),
            CmpOp::Lt => (None, Some(value), true, false),
            CmpOp::Le => (None, Some(value), true, true),
        };
        Ok(Query::Range {
            field,
            lower,
            upper,
            include_lower,
            include_upper,
        })
    }

    fn parse_boost(&mut self, query: Query) -> QueryResult<Query> {
        if !matches!(self.peek_kind(), Some(TokenKind::Caret)) {
            return Ok(query);
        }
        self.pos += 1;
        let position = self.here();
        let boost = match self.next().map(|t| t.kind) {
            Some(TokenKind::Term { text, glob: None }) => text.parse::<f32>().ok(),
            _ => None,
        };
        match boost {
            Some(boost) if boost.is_finite() && boost >= 0.0 => Ok(Query::Boost {
                query: Box::new(query),
                boost,
            }),
            _ => Err(self.error(position, "expected a non-negative number after '^'")),
        }
    }
}

fn is_match_all_value(kind: Option<&TokenKind>) -> bool {
    matches!(kind, Some(TokenKind::Term { glob: Some(g), .. }) if g == &[Glob::AnyMany])
}

/// Append a clause using the classic parser's occur rules.
fn add_clause(clauses: &mut Vec<Clause>, conj: Conjunction, modifier: Modifier, query: Query) {
    // `a AND b` also makes `a` required unless it was prohibited.
    if conj == Conjunction::And {
        if let Some(previous) = clauses.last_mut() {
            if previous.occur != Occur::MustNot {
                previous.occur = Occur::Must;
            }
        }
    }

    let occur = match modifier {
        Modifier::Prohibited => Occur::MustNot,
        Modifier::Required => Occur::Must,
        Modifier::None if conj == Conjunction::And => Occur::Must,
        Modifier::None => Occur::Should,
    };
    clauses.push(Clause { occur, query });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(field: &str, term: &str) -> Query {
        Query::Term {
            field: field.to_string(),
            term: term.to_string(),
        }
    }

    fn occurs(query: &Query) -> Vec<Occur> {
        match query {
            Query::Boolean(clauses) => clauses.iter().map(|c| c.occur).collect(),
            other => panic!("expected boolean query, got {:?}", other),
        }
    }

    #[test]
    fn test_single_term_uses_default_field() {
        assert_eq!(parse("NullPointerException").unwrap(), term(MESSAGE, "NullPointerException"));
    }

    #[test]
    fn test_single_clause_is_unwrapped() {
        assert_eq!(parse("status_code:504").unwrap(), term("status_code", "504"));
        assert_eq!(parse("(status_code:504)").unwrap(), term("status_code", "504"));
    }

    #[test]
    fn test_and_makes_both_sides_required() {
        let query = parse("status_code:500 AND log.level:ERROR").unwrap();
        assert_eq!(occurs(&query), vec![Occur::Must, Occur::Must]);
    }

    #[test]
    fn test_default_operator_is_or() {
        let query = parse("timeout refused").unwrap();
        assert_eq!(occurs(&query), vec![Occur::Should, Occur::Should]);
    }

    #[test]
    fn test_classic_mixed_operators() {
        // No precedence: `a OR b AND c` is `a +b +c`.
        let query = parse("a OR b AND c").unwrap();
        assert_eq!(occurs(&query), vec![Occur::Should, Occur::Must, Occur::Must]);
    }

    #[test]
    fn test_prohibited_clauses() {
        let query = parse("log.level:ERROR AND NOT application.name:inventory-service").unwrap();
        assert_eq!(occurs(&query), vec![Occur::Must, Occur::MustNot]);

        let query = parse("+metric:latency -value:5000").unwrap();
        assert_eq!(occurs(&query), vec![Occur::Must, Occur::MustNot]);
    }

    #[test]
    fn test_lone_negation_stays_boolean() {
        let query = parse("NOT log.level:INFO").unwrap();
        assert_eq!(occurs(&query), vec![Occur::MustNot]);
    }

    #[test]
    fn test_range_query() {
        let query = parse("status_code:[500 TO *]").unwrap();
        assert_eq!(
            query,
            Query::Range {
                field: "status_code".to_string(),
                lower: Some("500".to_string()),
                upper: None,
                include_lower: true,
                include_upper: true,
            }
        );
    }

    #[test]
    fn test_signed_range_bound() {
        assert!(matches!(
            parse("value:[-5 TO 9000]").unwrap(),
            Query::Range { lower: Some(lower), .. } if lower == "-5"
        ));
    }

    #[test]
    fn test_comparison_forms() {
        let expected = Query::Range {
            field: "value".to_string(),
            lower: Some("5000".to_string()),
            upper: None,
            include_lower: false,
            include_upper: true,
        };
        assert_eq!(parse("value:>5000").unwrap(), expected);
        assert_eq!(parse("value > 5000").unwrap(), expected);
    }

    #[test]
    fn test_field_group_sets_default_field() {
        let query = parse("application.name:(payment-service OR inventory-service)").unwrap();
        match query {
            Query::Boolean(clauses) => {
                assert_eq!(clauses[0].query, term("application.name", "payment-service"));
                assert_eq!(clauses[1].query, term("application.name", "inventory-service"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_match_all_and_boost() {
        assert_eq!(parse("*:*").unwrap(), Query::MatchAll);
        assert!(matches!(
            parse("Timeout^2").unwrap(),
            Query::Boost { boost, .. } if boost == 2.0
        ));
    }

    #[test]
    fn test_syntax_errors() {
        for bad in [
            "",
            "   ",
            "AND status_code:500",
            "status_code:500 AND",
            "(status_code:500",
            "status_code:500)",
            "status_code:",
            "status_code:[500 599]",
            "status_code:[500 TO 599",
            "Timeout^fast",
            "()",
        ] {
            assert!(parse(bad).is_err(), "expected error for {:?}", bad);
        }
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |depth: usize| {
            format!("{}log.level:ERROR{}", "(-".repeat(depth), ")".repeat(depth))
        };
        assert!(parse(&nested(MAX_DEPTH)).is_ok());

        let err = parse(&nested(MAX_DEPTH + 1)).unwrap_err();
        assert_eq!(err.position, MAX_DEPTH * 2);
        assert!(err.message.contains("nested too deeply"));

        assert!(parse(&"(".repeat(10_000)).is_err());
    }

    #[test]
    fn test_error_position() {
        let err = parse("status_code:500 AND").unwrap_err();
        assert_eq!(err.position, 19);
    }
}
