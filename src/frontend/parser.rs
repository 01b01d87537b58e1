//! Parser for the Fish language.
//!
//! A recursive descent parser with one procedure per nonterminal of the LL(1)
//! grammar and a single token of lookahead. Optional productions are resolved
//! against their FIRST and FOLLOW sets; any other token is a hard error. The
//! parser is fail-fast: the first violation ends the parse.

use crate::frontend::ast::{Node, NodeKind};
use crate::frontend::token::{Token, TokenKind};
use crate::utils::errors::{ParseError, ParseErrorKind};
use log::debug;

type ParseResult<T> = Result<T, ParseError>;

/// Tokens that may start an `ITEM`, as shown in error messages.
const ITEM_START: &[&str] = &[
    "type", "'fishtion'", "'if'", "'whale'", "'fork'", "'try'", "'splash'", "'emerge'", "'{'",
    "identifier",
];

/// Tokens that may start an expression, as shown in error messages.
const EXPR_START: &[&str] = &[
    "identifier", "number", "string literal", "character literal", "'('", "'<+'", "'<-'",
];

/// A parser for Fish token streams.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a parser. The end-of-input marker is appended here; callers
    /// pass the lexer output unchanged.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        tokens.push(Token::eof());
        Self { tokens, pos: 0 }
    }

    /// Parse a complete program.
    pub fn parse(&mut self) -> ParseResult<Node> {
        debug!("Parsing {} tokens", self.tokens.len());
        let result = self.parse_program();
        if let Err(ref e) = result {
            debug!("Parse failed: {}", e);
        }
        result
    }

    /// PROGRAM → fish BLOCK $
    fn parse_program(&mut self) -> ParseResult<Node> {
        let main = self.consume(TokenKind::Main, "program")?;
        let block = self.parse_block()?;
        if !self.is_at_end() {
            return Err(self.error(
                ParseErrorKind::TrailingInput,
                "Unexpected input after the program block",
                &["end of input"],
            ));
        }
        Ok(Node::new(NodeKind::Program, line_of(&main)).with_child(block))
    }

    /// BLOCK → { ITEMS }
    fn parse_block(&mut self) -> ParseResult<Node> {
        let open = self.consume(TokenKind::LeftBrace, "block")?;
        let mut block = Node::new(NodeKind::Block, line_of(&open));

        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if !self.starts_item() {
                let mut expected = vec!["'}'"];
                expected.extend_from_slice(ITEM_START);
                return Err(self.error(
                    ParseErrorKind::UnexpectedToken,
                    "Unexpected token in block",
                    &expected,
                ));
            }
            block.children.push(self.parse_item()?);
        }

        self.consume(TokenKind::RightBrace, "block")?;
        Ok(block)
    }

    /// ITEM → DECLARATION | FUNCTION_DEF | STATEMENT
    fn parse_item(&mut self) -> ParseResult<Node> {
        match self.current().kind {
            TokenKind::Type(_) => self.parse_declaration(),
            TokenKind::Function => self.parse_function_def(),
            _ => self.parse_statement(),
        }
    }

    /// DECLARATION → TYPE ident DECL_TAIL
    fn parse_declaration(&mut self) -> ParseResult<Node> {
        let ty = self.parse_type()?;
        let name = self.consume(TokenKind::Identifier, "declaration")?;
        let mut decl = Node::leaf(NodeKind::Declaration, name.lexeme, ty.line).with_child(ty);

        if self.match_token(TokenKind::Assign) {
            let init = self.parse_expression()?;
            decl.children
                .push(Node::new(NodeKind::Initializer, init.line).with_child(init));
            self.consume(TokenKind::Delimiter, "declaration")?;
        } else if !self.match_token(TokenKind::Delimiter) {
            return Err(self.error(
                ParseErrorKind::UnexpectedToken,
                "Unexpected token in declaration",
                &["'<='", "'<D'"],
            ));
        }

        Ok(decl)
    }

    fn parse_type(&mut self) -> ParseResult<Node> {
        match self.current().kind {
            TokenKind::Type(ty) => {
                let token = self.advance();
                Ok(Node::type_node(ty, line_of(&token)))
            }
            _ => Err(self.error(ParseErrorKind::ExpectedType, "Expected a type", &["type"])),
        }
    }

    /// FUNCTION_DEF → fishtion ident ( PARAMS ) TYPE BLOCK
    fn parse_function_def(&mut self) -> ParseResult<Node> {
        let keyword = self.consume(TokenKind::Function, "function definition")?;
        let name = self.consume(TokenKind::Identifier, "function definition")?;
        self.consume(TokenKind::LeftParen, "function definition")?;
        let params = self.parse_params(line_of(&keyword))?;
        self.consume(TokenKind::RightParen, "function definition")?;
        let return_type = self.parse_type()?;
        let body = self.parse_block()?;

        Ok(Node::leaf(NodeKind::FunctionDef, name.lexeme, line_of(&keyword))
            .with_children(vec![params, return_type, body]))
    }

    /// PARAMS → PARAM PARAMS' | ε, with FOLLOW(PARAMS) = { ) }
    fn parse_params(&mut self, line: usize) -> ParseResult<Node> {
        let mut params = Node::new(NodeKind::Params, line);

        if self.check(TokenKind::RightParen) {
            return Ok(params);
        }
        if !self.check_type() {
            return Err(self.error(
                ParseErrorKind::UnexpectedToken,
                "Unexpected token in parameter list",
                &["type", "')'"],
            ));
        }

        loop {
            let ty = self.parse_type()?;
            let name = self.consume(TokenKind::Identifier, "parameter")?;
            params.children.push(Node::leaf(NodeKind::Param, name.lexeme, ty.line).with_child(ty));

            if self.match_token(TokenKind::Comma) {
                continue;
            }
            if self.check(TokenKind::RightParen) {
                return Ok(params);
            }
            return Err(self.error(
                ParseErrorKind::UnexpectedToken,
                "Unexpected token in parameter list",
                &["','", "')'"],
            ));
        }
    }

    fn parse_statement(&mut self) -> ParseResult<Node> {
        match self.current().kind {
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Try => self.parse_try(),
            TokenKind::Print => self.parse_print(),
            TokenKind::Return => self.parse_return(),
            TokenKind::LeftBrace => self.parse_block(),
            TokenKind::Identifier => self.parse_ident_statement(),
            _ => Err(self.error(
                ParseErrorKind::UnexpectedToken,
                "Expected a statement",
                ITEM_START,
            )),
        }
    }

    /// IF → if ( EXPR ) BLOCK ELSE_PART
    fn parse_if(&mut self) -> ParseResult<Node> {
        let keyword = self.consume(TokenKind::If, "if statement")?;
        let condition = self.parse_condition("if statement")?;
        let then_block = self.parse_block()?;
        let mut node = Node::new(NodeKind::If, line_of(&keyword))
            .with_child(condition)
            .with_child(then_block);

        if self.match_token(TokenKind::Else) {
            node.children.push(self.parse_block()?);
        } else if !self.in_item_follow() {
            return Err(self.optional_clause_error("else", "if"));
        }

        Ok(node)
    }

    /// WHILE → whale ( EXPR ) BLOCK
    fn parse_while(&mut self) -> ParseResult<Node> {
        let keyword = self.consume(TokenKind::While, "while loop")?;
        let condition = self.parse_condition("while loop")?;
        let body = self.parse_block()?;
        Ok(Node::new(NodeKind::While, line_of(&keyword))
            .with_child(condition)
            .with_child(body))
    }

    fn parse_condition(&mut self, context: &str) -> ParseResult<Node> {
        self.consume(TokenKind::LeftParen, context)?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RightParen, context)?;
        Ok(condition)
    }

    /// FOR → fork ( FOR_INIT <D FOR_COND <D FOR_STEP ) BLOCK
    fn parse_for(&mut self) -> ParseResult<Node> {
        let keyword = self.consume(TokenKind::For, "for loop")?;
        let line = line_of(&keyword);
        self.consume(TokenKind::LeftParen, "for loop")?;

        let init = match self.current().kind {
            TokenKind::Type(_) => {
                let ty = self.parse_type()?;
                let name = self.consume(TokenKind::Identifier, "for loop initializer")?;
                self.consume(TokenKind::Assign, "for loop initializer")?;
                let value = self.parse_expression()?;
                let init = Node::new(NodeKind::Initializer, value.line).with_child(value);
                Node::leaf(NodeKind::Declaration, name.lexeme, ty.line)
                    .with_child(ty)
                    .with_child(init)
            }
            TokenKind::Identifier => self.parse_update()?,
            TokenKind::Delimiter => Node::empty(line),
            _ => {
                return Err(self.error(
                    ParseErrorKind::UnexpectedToken,
                    "Unexpected token in for loop initializer",
                    &["type", "identifier", "'<D'"],
                ))
            }
        };
        self.consume(TokenKind::Delimiter, "for loop")?;

        let condition = if self.check(TokenKind::Delimiter) {
            Node::empty(line)
        } else if self.starts_expression() {
            self.parse_expression()?
        } else {
            let mut expected = EXPR_START.to_vec();
            expected.push("'<D'");
            return Err(self.error(
                ParseErrorKind::UnexpectedToken,
                "Unexpected token in for loop condition",
                &expected,
            ));
        };
        self.consume(TokenKind::Delimiter, "for loop")?;

        let step = match self.current().kind {
            TokenKind::Identifier => self.parse_update()?,
            TokenKind::RightParen => Node::empty(line),
            _ => {
                return Err(self.error(
                    ParseErrorKind::UnexpectedToken,
                    "Unexpected token in for loop step",
                    &["identifier", "')'"],
                ))
            }
        };
        self.consume(TokenKind::RightParen, "for loop")?;

        let body = self.parse_block()?;
        Ok(Node::new(NodeKind::For, line).with_children(vec![init, condition, step, body]))
    }

    /// ident ( <= EXPR | <++ | <-- ), as used by for-loop clauses.
    fn parse_update(&mut self) -> ParseResult<Node> {
        let name = self.consume(TokenKind::Identifier, "update")?;
        match self.current().kind {
            TokenKind::Assign => {
                self.advance();
                let line = line_of(&name);
                let value = self.parse_expression()?;
                Ok(Node::leaf(NodeKind::Assign, name.lexeme, line).with_child(value))
            }
            TokenKind::Increment | TokenKind::Decrement => Ok(self.finish_postfix_statement(name)),
            _ => Err(self.error(
                ParseErrorKind::UnexpectedToken,
                "Unexpected token after identifier",
                &["'<='", "'<++'", "'<--'"],
            )),
        }
    }

    /// `x <++` as a statement becomes `PostfixOp(++, Var(x))`.
    fn finish_postfix_statement(&mut self, name: Token) -> Node {
        let op = self.advance();
        let line = line_of(&name);
        Node::leaf(NodeKind::PostfixOp, symbol_of(&op), line).with_child(Node::var(name.lexeme, line))
    }

    /// TRY → try BLOCK catch BLOCK FINALLY_PART
    fn parse_try(&mut self) -> ParseResult<Node> {
        let keyword = self.consume(TokenKind::Try, "try statement")?;
        let body = self.parse_block()?;
        self.consume(TokenKind::Catch, "try statement")?;
        let handler = self.parse_block()?;
        let mut node = Node::new(NodeKind::TryCatch, line_of(&keyword))
            .with_child(body)
            .with_child(handler);

        if self.match_token(TokenKind::Finally) {
            node.children.push(self.parse_block()?);
        } else if !self.in_item_follow() {
            return Err(self.optional_clause_error("finally", "try"));
        }

        Ok(node)
    }

    /// PRINT → splash ( EXPR ) <D
    fn parse_print(&mut self) -> ParseResult<Node> {
        let keyword = self.consume(TokenKind::Print, "print statement")?;
        let value = self.parse_condition("print statement")?;
        self.consume(TokenKind::Delimiter, "print statement")?;
        Ok(Node::new(NodeKind::Print, line_of(&keyword)).with_child(value))
    }

    /// RETURN → emerge EXPR <D
    fn parse_return(&mut self) -> ParseResult<Node> {
        let keyword = self.consume(TokenKind::Return, "return statement")?;
        let value = self.parse_expression()?;
        self.consume(TokenKind::Delimiter, "return statement")?;
        Ok(Node::new(NodeKind::Return, line_of(&keyword)).with_child(value))
    }

    /// IDENT_STMT → ident ( ( ARGS ) | <= EXPR | <++ | <-- ) <D
    fn parse_ident_statement(&mut self) -> ParseResult<Node> {
        let node = match self.peek_kind(1) {
            TokenKind::LeftParen => {
                let name = self.advance();
                self.parse_call(name)?
            }
            TokenKind::Assign | TokenKind::Increment | TokenKind::Decrement => self.parse_update()?,
            _ => {
                self.advance();
                return Err(self.error(
                    ParseErrorKind::UnexpectedToken,
                    "Unexpected token after identifier",
                    &["'('", "'<='", "'<++'", "'<--'"],
                ));
            }
        };
        self.consume(TokenKind::Delimiter, "statement")?;
        Ok(node)
    }

    // Expressions, lowest to highest precedence. Every binary level is
    // built iteratively so operators associate to the left.

    /// EXPR → EQUALITY, followed by a token of FOLLOW(EXPR).
    fn parse_expression(&mut self) -> ParseResult<Node> {
        let expr = self.parse_equality()?;
        match self.current().kind {
            TokenKind::RightParen | TokenKind::Comma | TokenKind::Delimiter => Ok(expr),
            _ => Err(self.error(
                ParseErrorKind::UnexpectedToken,
                "Unexpected token after expression",
                &["operator", "')'", "','", "'<D'"],
            )),
        }
    }

    fn parse_equality(&mut self) -> ParseResult<Node> {
        self.parse_binary_level(
            &[TokenKind::EqualEqual, TokenKind::BangEqual],
            Self::parse_relational,
        )
    }

    fn parse_relational(&mut self) -> ParseResult<Node> {
        self.parse_binary_level(
            &[
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
            ],
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> ParseResult<Node> {
        self.parse_binary_level(&[TokenKind::Plus, TokenKind::Minus], Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Node> {
        self.parse_binary_level(
            &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent],
            Self::parse_unary,
        )
    }

    fn parse_binary_level(
        &mut self,
        operators: &[TokenKind],
        operand: fn(&mut Self) -> ParseResult<Node>,
    ) -> ParseResult<Node> {
        let mut left = operand(self)?;
        while operators.contains(&self.current().kind) {
            let op = self.advance();
            let right = operand(self)?;
            left = Node::binary(symbol_of(&op), left, right);
        }
        Ok(left)
    }

    /// UNARY → (<+ | <-) UNARY | POSTFIX
    fn parse_unary(&mut self) -> ParseResult<Node> {
        match self.current().kind {
            TokenKind::Plus | TokenKind::Minus => {
                let op = self.advance();
                let operand = self.parse_unary()?;
                Ok(Node::leaf(NodeKind::UnaryOp, symbol_of(&op), line_of(&op)).with_child(operand))
            }
            _ => self.parse_postfix(),
        }
    }

    /// POSTFIX → PRIMARY { <++ | <-- }
    fn parse_postfix(&mut self) -> ParseResult<Node> {
        let mut expr = self.parse_primary()?;
        while matches!(self.current().kind, TokenKind::Increment | TokenKind::Decrement) {
            let op = self.advance();
            let line = expr.line;
            expr = Node::leaf(NodeKind::PostfixOp, symbol_of(&op), line).with_child(expr);
        }
        Ok(expr)
    }

    /// PRIMARY → ident [ ( ARGS ) ] | NUM | STRING | CHAR | ( EXPR )
    fn parse_primary(&mut self) -> ParseResult<Node> {
        match self.current().kind {
            TokenKind::Identifier => {
                let name = self.advance();
                if self.check(TokenKind::LeftParen) {
                    self.parse_call(name)
                } else {
                    let line = line_of(&name);
                    Ok(Node::var(name.lexeme, line))
                }
            }
            TokenKind::Number => {
                let token = self.advance();
                Ok(Node::num(token.lexeme, token.span.start_line))
            }
            TokenKind::String => {
                let token = self.advance();
                Ok(Node::leaf(NodeKind::String, unquote(&token.lexeme, '"'), line_of(&token)))
            }
            TokenKind::Char => {
                let token = self.advance();
                Ok(Node::leaf(NodeKind::Char, unquote(&token.lexeme, '\''), line_of(&token)))
            }
            TokenKind::LeftParen => self.parse_condition("parenthesized expression"),
            _ => Err(self.error(
                ParseErrorKind::ExpectedExpression,
                "Expected an expression",
                EXPR_START,
            )),
        }
    }

    /// `name ( ARGS )`, with the name already consumed.
    fn parse_call(&mut self, name: Token) -> ParseResult<Node> {
        let open = self.consume(TokenKind::LeftParen, "call")?;
        let mut args = Node::new(NodeKind::Args, line_of(&open));

        if !self.check(TokenKind::RightParen) {
            loop {
                args.children.push(self.parse_expression()?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.consume(TokenKind::RightParen, "call")?;
        let line = line_of(&name);
        Ok(Node::leaf(NodeKind::Call, name.lexeme, line).with_child(args))
    }

    // Helper methods

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self, distance: usize) -> TokenKind {
        let index = (self.pos + distance).min(self.tokens.len() - 1);
        self.tokens[index].kind
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn check_type(&self) -> bool {
        self.current().kind.is_type()
    }

    fn is_at_end(&self) -> bool {
        self.current().is_eof()
    }

    fn starts_item(&self) -> bool {
        matches!(
            self.current().kind,
            TokenKind::Type(_)
                | TokenKind::Function
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Try
                | TokenKind::Print
                | TokenKind::Return
                | TokenKind::LeftBrace
                | TokenKind::Identifier
        )
    }

    fn starts_expression(&self) -> bool {
        matches!(
            self.current().kind,
            TokenKind::Identifier
                | TokenKind::Number
                | TokenKind::String
                | TokenKind::Char
                | TokenKind::LeftParen
                | TokenKind::Plus
                | TokenKind::Minus
        )
    }

    /// FIRST(ITEM) ∪ { } }: what may follow an omitted else/finally clause.
    fn in_item_follow(&self) -> bool {
        self.starts_item() || self.check(TokenKind::RightBrace)
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    /// Consume a token of the given kind or fail naming both kinds.
    fn consume(&mut self, kind: TokenKind, context: &str) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let expected = format!("'{}'", kind.name());
            let message = format!(
                "Expected {} in {}, found {}",
                expected,
                context,
                describe(self.current())
            );
            Err(self.error(ParseErrorKind::ExpectedToken, &message, &[expected.as_str()]))
        }
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// The token after an if/try statement is neither its optional clause
    /// nor anything that may follow the statement.
    fn optional_clause_error(&self, clause: &str, statement: &str) -> ParseError {
        let clause = format!("'{}'", clause);
        let mut expected = vec![clause.as_str(), "'}'"];
        expected.extend_from_slice(ITEM_START);
        self.error(
            ParseErrorKind::UnexpectedToken,
            &format!("Unexpected token after {} statement", statement),
            &expected,
        )
    }

    fn error(&self, kind: ParseErrorKind, message: &str, expected: &[&str]) -> ParseError {
        let token = self.current();
        ParseError {
            message: message.to_string(),
            span: token.span,
            kind,
            expected: expected.iter().map(|s| s.to_string()).collect(),
            found: Some(describe(token)),
        }
    }
}

fn line_of(token: &Token) -> usize {
    token.span.start_line
}

fn symbol_of(token: &Token) -> &'static str {
    token.kind.operator_symbol().unwrap_or("?")
}

fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::Eof => "end of input".to_string(),
        TokenKind::Identifier
        | TokenKind::Number
        | TokenKind::String
        | TokenKind::Char
        | TokenKind::Unrecognized
        | TokenKind::Invalid => format!("{} '{}'", token.kind, token.lexeme),
        _ => format!("'{}'", token.lexeme),
    }
}

fn unquote(lexeme: &str, quote: char) -> &str {
    lexeme
        .strip_prefix(quote)
        .and_then(|s| s.strip_suffix(quote))
        .unwrap_or(lexeme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::tokenize;

    fn parse(source: &str) -> ParseResult<Node> {
        Parser::new(tokenize(source)).parse()
    }

    /// Parse `fish { <items> }` and return the block's items.
    fn items(body: &str) -> Vec<Node> {
        let program = parse(&format!("fish {{ {} }}", body)).unwrap();
        program.children[0].children.clone()
    }

    fn expr(source: &str) -> Node {
        let mut items = items(&format!("splash({}) <D", source));
        items.remove(0).children.remove(0)
    }

    #[test]
    fn test_scenario_program() {
        let program = parse("fish { <int x <= 5 <D splash ( x ) <D }").unwrap();
        assert_eq!(
            program.to_string(),
            "Program(Block(Declaration(x, Type(int), Initializer(Num(5))), Print(Var(x))))"
        );
    }

    #[test]
    fn test_empty_program() {
        let program = parse("fish {}").unwrap();
        assert_eq!(program.to_string(), "Program(Block)");
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(expr("a <- b <- c").to_string(), "BinaryOp(-, BinaryOp(-, Var(a), Var(b)), Var(c))");
        assert_eq!(expr("a </ b <* c").to_string(), "BinaryOp(*, BinaryOp(/, Var(a), Var(b)), Var(c))");
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            expr("a <+ b <* c <== d").to_string(),
            "BinaryOp(==, BinaryOp(+, Var(a), BinaryOp(*, Var(b), Var(c))), Var(d))"
        );
        assert_eq!(
            expr("(a <+ b) <<>= <-c <++").to_string(),
            "BinaryOp(>=, BinaryOp(+, Var(a), Var(b)), UnaryOp(-, PostfixOp(++, Var(c))))"
        );
        assert_eq!(expr("i <++ <--").to_string(), "PostfixOp(--, PostfixOp(++, Var(i)))");
    }

    #[test]
    fn test_literals() {
        assert_eq!(expr("\"hi there\"").to_string(), "String(hi there)");
        assert_eq!(expr("'c'").to_string(), "Char(c)");
        assert_eq!(expr("3.25").to_string(), "Num(3.25)");
    }

    #[test]
    fn test_declaration_without_initializer() {
        let items = items("<hook done <D");
        assert_eq!(items[0].to_string(), "Declaration(done, Type(hook))");
    }

    #[test]
    fn test_if_without_and_with_else() {
        let items = items("if (x << 1) { splash(x) <D } if (x) {} else {}");
        assert_eq!(items[0].kind, NodeKind::If);
        assert_eq!(items[0].children.len(), 2);
        assert_eq!(items[1].children.len(), 3);
    }

    #[test]
    fn test_while() {
        let items = items("whale (i <<= 10) { i <++ <D }");
        assert_eq!(
            items[0].to_string(),
            "While(BinaryOp(<=, Var(i), Num(10)), Block(PostfixOp(++, Var(i))))"
        );
    }

    #[test]
    fn test_for_with_all_clauses() {
        let items = items("fork (<int i <= 0 <D i << 3 <D i <++) { splash(i) <D }");
        assert_eq!(
            items[0].to_string(),
            "For(Declaration(i, Type(int), Initializer(Num(0))), BinaryOp(<, Var(i), Num(3)), \
             PostfixOp(++, Var(i)), Block(Print(Var(i))))"
        );
    }

    #[test]
    fn test_for_with_empty_clauses() {
        let items = items("fork (<D <D) {}");
        assert_eq!(items[0].to_string(), "For(Empty, Empty, Empty, Block)");

        let items = self::items("fork (i <= 0 <D <D i <= i <+ 2) {}");
        assert_eq!(
            items[0].to_string(),
            "For(Assign(i, Num(0)), Empty, Assign(i, BinaryOp(+, Var(i), Num(2))), Block)"
        );
    }

    #[test]
    fn test_try_catch_finally() {
        let items = items("try { f() <D } catch { } try {} catch {} finally { x <-- <D }");
        assert_eq!(items[0].kind, NodeKind::TryCatch);
        assert_eq!(items[0].children.len(), 2);
        assert_eq!(items[1].children.len(), 3);
        assert_eq!(items[0].children[0].to_string(), "Block(Call(f, Args))");
    }

    #[test]
    fn test_function_definition() {
        let program = parse(
            "fish { fishtion add(<int a, <int b) <int { emerge a <+ b <D } splash(add(1, 2)) <D }",
        )
        .unwrap();
        let items = &program.children[0].children;
        assert_eq!(
            items[0].to_string(),
            "FunctionDef(add, Params(Param(a, Type(int)), Param(b, Type(int))), Type(int), \
             Block(Return(BinaryOp(+, Var(a), Var(b)))))"
        );
        assert_eq!(items[1].to_string(), "Print(Call(add, Args(Num(1), Num(2))))");
    }

    #[test]
    fn test_ident_statements() {
        let items = items("x <= 1 <D go() <D y <-- <D");
        assert_eq!(items[0].to_string(), "Assign(x, Num(1))");
        assert_eq!(items[1].to_string(), "Call(go, Args)");
        assert_eq!(items[2].to_string(), "PostfixOp(--, Var(y))");
    }

    #[test]
    fn test_line_numbers() {
        let program = parse("fish {\n  <int x <D\n\n  x <= 2 <D\n}").unwrap();
        let block = &program.children[0];
        assert_eq!(block.children[0].line, 2);
        assert_eq!(block.children[1].line, 4);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let source = "fish { fishtion f(<bubble v) <bubble { emerge v <* 2.0 <D } \
                      fork (<int i <= 0 <D i << 4 <D i <++) { splash(f(i)) <D } }";
        let first = parse(source).unwrap();
        let second = parse(source).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_delimiter() {
        let err = parse("fish {\n  <int x <= 5\n}").unwrap_err();
        assert_eq!(err.line(), Some(3));
        assert!(err.message.contains("after expression"), "{}", err);
    }

    #[test]
    fn test_expected_token_names_both_kinds() {
        let err = parse("fish {\n  splash x <D\n}").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ExpectedToken);
        assert_eq!(err.line(), Some(2));
        assert!(err.message.contains("'('"));
        assert!(err.message.contains("identifier 'x'"));
        assert!(err.to_string().starts_with("[line 2]"));
    }

    #[test]
    fn test_missing_program_header() {
        let err = parse("{ }").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ExpectedToken);
        assert!(err.message.contains("'fish'"));
    }

    #[test]
    fn test_unclosed_block_reports_end_of_input() {
        let err = parse("fish { splash(1) <D").unwrap_err();
        assert_eq!(err.line(), None);
        assert!(err.message.contains("end of input"));
    }

    #[test]
    fn test_trailing_input() {
        let err = parse("fish { } x").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TrailingInput);
    }

    #[test]
    fn test_lexical_anomaly_becomes_parse_error() {
        let err = parse("fish { <int x <= 12ab <D }").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ExpectedExpression);
        assert_eq!(err.found.as_deref(), Some("invalid numeral '12ab'"));

        let err = parse("fish { x @ <D }").unwrap_err();
        assert_eq!(err.found.as_deref(), Some("unrecognized input '@'"));
    }

    #[test]
    fn test_bad_token_after_if_body() {
        let err = parse("fish { if (x) { } catch { } }").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedToken);
        assert!(err.expected.contains(&"'else'".to_string()));
    }
}
