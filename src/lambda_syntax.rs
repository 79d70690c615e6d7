//! Surface syntax for the `reduce` subcommand: `\x. body` (or `λx. body`),
//! application by juxtaposition, parentheses for grouping. Not part of the
//! library — lambda terms are built from `Term`/`TermId` there; this is
//! just a convenience for typing one on a command line.

use std::collections::HashMap;

use ternary_substrate::lambda::{Pool, Term, TermId};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Lambda,
    Dot,
    LParen,
    RParen,
    Ident(String),
}

fn tokenize(source: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '\\' | 'λ' => {
                chars.next();
                tokens.push(Token::Lambda);
            }
            '.' => {
                chars.next();
                tokens.push(Token::Dot);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            c if c.is_alphanumeric() || c == '_' => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => return Err(format!("unexpected character '{other}'")),
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    position: usize,
    pool: &'a mut Pool,
    scope: Vec<(String, i32)>,
    free_vars: HashMap<String, i32>,
    next_bound_id: i32,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        token
    }

    fn expect(&mut self, expected: &Token) -> Result<(), String> {
        match self.next() {
            Some(ref t) if t == expected => Ok(()),
            other => Err(format!("expected {expected:?}, found {other:?}")),
        }
    }

    fn resolve(&mut self, name: &str) -> i32 {
        if let Some((_, id)) = self.scope.iter().rev().find(|(n, _)| n == name) {
            return *id;
        }
        let next_free = self.free_vars.len() as i32 + 1;
        *self.free_vars.entry(name.to_string()).or_insert(next_free)
    }

    // term := atom+
    fn parse_term(&mut self) -> Result<TermId, String> {
        let mut result = self.parse_atom()?;
        while matches!(self.peek(), Some(Token::Lambda | Token::LParen | Token::Ident(_))) {
            let argument = self.parse_atom()?;
            result = self.pool.alloc(Term::application(result, argument));
        }
        Ok(result)
    }

    // atom := '\' IDENT '.' term | '(' term ')' | IDENT
    fn parse_atom(&mut self) -> Result<TermId, String> {
        match self.next() {
            Some(Token::Lambda) => {
                let name = match self.next() {
                    Some(Token::Ident(name)) => name,
                    other => return Err(format!("expected a binder name after '\\', found {other:?}")),
                };
                self.expect(&Token::Dot)?;
                let var_id = self.next_bound_id;
                self.next_bound_id += 1;
                self.scope.push((name, var_id));
                let body = self.parse_term()?;
                self.scope.pop();
                Ok(self.pool.alloc(Term::abstraction(var_id, body)))
            }
            Some(Token::LParen) => {
                let inner = self.parse_term()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => {
                let var_id = self.resolve(&name);
                Ok(self.pool.alloc(Term::variable(var_id)))
            }
            other => Err(format!("expected a term, found {other:?}")),
        }
    }
}

/// Bound variable ids start here, well clear of the free-variable id
/// range `[1, free_vars.len()]` assigned during the same parse.
const FIRST_BOUND_ID: i32 = 10_000;

pub fn parse(pool: &mut Pool, source: &str) -> Result<TermId, String> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        position: 0,
        pool,
        scope: Vec::new(),
        free_vars: HashMap::new(),
        next_bound_id: FIRST_BOUND_ID,
    };
    let term = parser.parse_term()?;
    if parser.position != parser.tokens.len() {
        return Err("trailing input after a complete term".to_string());
    }
    Ok(term)
}

pub fn format(pool: &Pool, id: TermId) -> String {
    match pool.get(id) {
        Term::Variable(var_id) => {
            if *var_id >= FIRST_BOUND_ID {
                format!("x{}", var_id - FIRST_BOUND_ID)
            } else {
                format!("f{var_id}")
            }
        }
        Term::Abstraction { var_id, body } => {
            let name = if *var_id >= FIRST_BOUND_ID {
                format!("x{}", var_id - FIRST_BOUND_ID)
            } else {
                format!("f{var_id}")
            };
            format!("\\{name}.{}", format(pool, *body))
        }
        Term::Application { function, argument } => {
            format!("({} {})", format(pool, *function), format(pool, *argument))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_identity_function() {
        let mut pool = Pool::new(16);
        let id = parse(&mut pool, "\\x.x").unwrap();
        match pool.get(id) {
            Term::Abstraction { var_id, body } => {
                assert_eq!(*pool.get(*body), Term::Variable(*var_id));
            }
            other => panic!("expected an abstraction, got {other:?}"),
        }
    }

    #[test]
    fn parses_application_left_associatively() {
        let mut pool = Pool::new(16);
        let id = parse(&mut pool, "a b c").unwrap();
        match pool.get(id) {
            Term::Application { function, argument } => {
                assert!(matches!(pool.get(*argument), Term::Variable(_)));
                assert!(matches!(pool.get(*function), Term::Application { .. }));
            }
            other => panic!("expected an application, got {other:?}"),
        }
    }

    #[test]
    fn distinct_free_names_get_distinct_ids() {
        let mut pool = Pool::new(16);
        let id = parse(&mut pool, "a b").unwrap();
        let (function, argument) = match pool.get(id) {
            Term::Application { function, argument } => (*function, *argument),
            other => panic!("expected an application, got {other:?}"),
        };
        assert_ne!(pool.get(function).as_variable(), pool.get(argument).as_variable());
    }

    #[test]
    fn rejects_trailing_garbage() {
        let mut pool = Pool::new(16);
        assert!(parse(&mut pool, "x )").is_err());
    }
}
